//! 站内导航：同一时刻只有一个进行中的片段请求。
//!
//! 状态只有 `Idle` 与 `Loading` 两种。新的导航会先取消旧请求，
//! 网络回调和加载提示的定时器都带着 [`RequestToken`] 回来，
//! 和当前请求对不上的一律丢弃。

use crate::cache::PageCache;
use crate::config::ViewerConfig;
use crate::error::FetchError;
use crate::history::{HistoryBackend, HistorySync};
use crate::types::{selection_key, HistoryStateRecord, PageFragment, RequestToken, TargetPath};

/// 内容区与窗口
pub trait PageView {
    fn set_title(&mut self, title: &str);
    fn set_body(&mut self, markup: &str);
    /// 内容替换后重新拦截新插入的站内链接
    fn bind_links(&mut self);
    fn show_loading_indicator(&mut self);
    /// 侧栏中高亮与 `key` 完全相同的条目
    fn highlight(&mut self, key: &str);
    /// 锚点元素存在时滚动过去并返回 true
    fn scroll_to_anchor(&mut self, anchor: &str) -> bool;
    fn scroll_to(&mut self, offset: f64);
    fn scroll_offset(&self) -> f64;
    /// 当前路径加锚点
    fn location(&self) -> String;
}

/// 发起与取消片段请求，完成后由宿主调用 [`NavigationController::complete`]
pub trait FragmentTransport {
    fn begin(&mut self, token: RequestToken, url: &str);
    fn abort(&mut self, token: RequestToken);
}

/// 加载提示的延时，到点后由宿主调用 [`NavigationController::loading_timer_fired`]
pub trait DeferredClock {
    fn schedule_indicator(&mut self, token: RequestToken, delay_ms: u32);
    fn cancel_indicator(&mut self);
}

pub trait NavigationHost: PageView + HistoryBackend + FragmentTransport + DeferredClock {}

impl<T> NavigationHost for T where T: PageView + HistoryBackend + FragmentTransport + DeferredClock {}

/// 进行中的请求
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationRequest {
    pub token: RequestToken,
    pub target: TargetPath,
    pub forward: bool,
    pub scroll_offset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// 缓存命中，已同步应用
    Applied,
    /// 已发出网络请求
    Fetching(RequestToken),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// 不重试，页面保持原样
    Failed(FetchError),
    /// 已被新导航取代，丢弃
    Stale,
}

pub struct NavigationController<H> {
    host: H,
    cache: PageCache,
    history: HistorySync,
    fragment_suffix: String,
    loading_delay_ms: u32,
    generation: u64,
    outstanding: Option<NavigationRequest>,
    indicator_visible: bool,
}

impl<H: NavigationHost> NavigationController<H> {
    pub fn new(host: H, config: &ViewerConfig) -> Self {
        Self {
            host,
            cache: PageCache::new(config.cache_capacity),
            history: HistorySync::new(),
            fragment_suffix: config.fragment_suffix.clone(),
            loading_delay_ms: config.loading_delay_ms,
            generation: 0,
            outstanding: None,
            indicator_visible: false,
        }
    }

    /// 导航到 `path`
    ///
    /// `forward` 为真表示用户点击，会新增历史条目；为假表示后退/前进恢复。
    /// `scroll_offset` 是没有锚点可用时要恢复的滚动位置。
    pub fn navigate(&mut self, path: &str, forward: bool, scroll_offset: f64) -> NavigationOutcome {
        if let Some(previous) = self.outstanding.take() {
            log::debug!("[导航] 取消请求 #{} {}", previous.token.0, previous.target.base);
            self.host.abort(previous.token);
            self.host.cancel_indicator();
        }

        if forward {
            self.host.push_entry(path);
        }
        self.highlight(path);

        let target = TargetPath::parse(path);
        if let Some(content) = self.cache.get(&target.base) {
            log::debug!("[导航] 缓存命中 {}", target.base);
            apply_fragment(
                &mut self.host,
                &mut self.history,
                content,
                forward,
                target.anchor.as_deref(),
                scroll_offset,
            );
            self.indicator_visible = false;
            return NavigationOutcome::Applied;
        }

        self.generation += 1;
        let token = RequestToken(self.generation);
        let url = format!("{}{}", target.base, self.fragment_suffix);
        log::info!("[导航] 请求 #{} {}", token.0, url);
        self.host.begin(token, &url);
        self.host.schedule_indicator(token, self.loading_delay_ms);
        self.outstanding = Some(NavigationRequest {
            token,
            target,
            forward,
            scroll_offset,
        });
        NavigationOutcome::Fetching(token)
    }

    /// 网络请求完成（成功或失败）
    pub fn complete(&mut self, token: RequestToken, result: Result<String, FetchError>) -> Completion {
        let is_live = self
            .outstanding
            .as_ref()
            .is_some_and(|request| request.token == token);
        if !is_live {
            log::debug!("[导航] 丢弃过期的响应 #{}", token.0);
            return Completion::Stale;
        }
        let Some(request) = self.outstanding.take() else {
            return Completion::Stale;
        };
        self.host.cancel_indicator();

        match result {
            Ok(content) => {
                apply_fragment(
                    &mut self.host,
                    &mut self.history,
                    &content,
                    request.forward,
                    request.target.anchor.as_deref(),
                    request.scroll_offset,
                );
                self.indicator_visible = false;
                self.cache.put(request.target.base, content);
                Completion::Applied
            }
            Err(err) => {
                if self.indicator_visible {
                    // 内容区已被转圈替换，失败后不恢复旧内容，等下一次导航覆盖
                    log::warn!(
                        "[导航] 加载 {} 失败: {}，加载提示保留",
                        request.target.base,
                        err
                    );
                } else {
                    log::warn!("[导航] 加载 {} 失败: {}", request.target.base, err);
                }
                Completion::Failed(err)
            }
        }
    }

    /// 加载提示定时器到点，返回是否显示了提示
    pub fn loading_timer_fired(&mut self, token: RequestToken) -> bool {
        let is_live = self
            .outstanding
            .as_ref()
            .is_some_and(|request| request.token == token);
        if self.indicator_visible || !is_live {
            return false;
        }
        self.indicator_visible = true;
        log::debug!("[导航] 请求 #{} 较慢，显示加载提示", token.0);
        self.host.show_loading_indicator();
        true
    }

    /// 滚动时以及点击链接前保存当前状态
    pub fn save_state(&mut self) -> HistoryStateRecord {
        self.history.save(&mut self.host)
    }

    pub fn highlight(&mut self, path: &str) {
        self.host.highlight(selection_key(path));
    }

    pub fn is_loading(&self) -> bool {
        self.outstanding.is_some()
    }

    pub fn outstanding(&self) -> Option<&NavigationRequest> {
        self.outstanding.as_ref()
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn history(&self) -> &HistorySync {
        &self.history
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

/// 第一行写标题，其余写入内容区，然后处理滚动并保存历史状态
fn apply_fragment<H: NavigationHost>(
    host: &mut H,
    history: &mut HistorySync,
    payload: &str,
    forward: bool,
    anchor: Option<&str>,
    scroll_offset: f64,
) {
    let fragment = PageFragment::parse(payload);
    host.set_title(fragment.title);
    host.set_body(fragment.body);
    host.bind_links();

    match anchor {
        Some(anchor) if forward => {
            if !host.scroll_to_anchor(anchor) {
                log::debug!("[导航] 找不到锚点 #{anchor}，回到顶部");
                host.scroll_to(0.0);
            }
        }
        _ => host.scroll_to(scroll_offset),
    }

    history.save(host);
}
