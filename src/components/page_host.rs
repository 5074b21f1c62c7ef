use std::any::Any;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{AbortController, Document, Element, HtmlElement, Window};

use crate::api::fetch_fragment;
use crate::components::loading_indicator::LoadingIndicator;
use crate::history::HistoryBackend;
use crate::link_router::LinkRouter;
use crate::navigation::{DeferredClock, FragmentTransport, PageView};
use crate::pages::docs::session::{with_session, SessionHandle};
use crate::types::{HistoryStateRecord, RequestToken};

/// 导航控制器在浏览器里的宿主：内容区、侧栏、历史、网络、定时器
pub struct BrowserHost {
    session: SessionHandle,
    window: Window,
    document: Document,
    content: Option<HtmlElement>,
    tree: Option<Element>,
    router: LinkRouter,
    link_handler: js_sys::Function,
    inflight: Option<(RequestToken, AbortController)>,
    loading_timer: Option<Timeout>,
    indicator: Option<Box<dyn Any>>,
}

impl BrowserHost {
    pub fn new(
        session: SessionHandle,
        window: Window,
        document: Document,
        content: Option<HtmlElement>,
        tree: Option<Element>,
        router: LinkRouter,
        link_handler: js_sys::Function,
    ) -> Self {
        Self {
            session,
            window,
            document,
            content,
            tree,
            router,
            link_handler,
            inflight: None,
            loading_timer: None,
            indicator: None,
        }
    }

    /// 给 `root` 下所有站内链接装上点击拦截；`onclick` 会覆盖旧的，重复调用无妨
    fn bind_links_in(&self, root: &Element) {
        let links = root.get_elements_by_tag_name("a");
        for idx in 0..links.length() {
            let Some(link) = links.item(idx) else {
                continue;
            };
            let internal = link
                .get_attribute("href")
                .is_some_and(|href| self.router.is_internal(&href));
            if !internal {
                continue;
            }
            if let Some(link) = link.dyn_ref::<HtmlElement>() {
                link.set_onclick(Some(&self.link_handler));
            }
        }
    }
}

impl PageView for BrowserHost {
    fn set_title(&mut self, title: &str) {
        self.document.set_title(title);
    }

    fn set_body(&mut self, markup: &str) {
        // 先卸载转圈，再整体替换内容
        self.indicator.take();
        if let Some(content) = &self.content {
            content.set_inner_html(markup);
        }
    }

    fn bind_links(&mut self) {
        if let Some(tree) = &self.tree {
            self.bind_links_in(tree);
        }
        if let Some(content) = &self.content {
            self.bind_links_in(content);
        }
    }

    fn show_loading_indicator(&mut self) {
        let Some(content) = &self.content else {
            return;
        };
        self.indicator.take();
        content.set_inner_html("");
        let handle = leptos::mount::mount_to(content.clone(), || view! { <LoadingIndicator /> });
        self.indicator = Some(Box::new(handle));
    }

    fn highlight(&mut self, key: &str) {
        let Some(tree) = &self.tree else {
            return;
        };
        if let Ok(Some(selected)) = tree.query_selector("li.selected") {
            let _ = selected.class_list().remove_1("selected");
        }
        let links = tree.get_elements_by_tag_name("a");
        for idx in 0..links.length() {
            let Some(link) = links.item(idx) else {
                continue;
            };
            if link.get_attribute("href").as_deref() == Some(key) {
                if let Ok(Some(item)) = link.query_selector("li") {
                    let _ = item.class_list().add_1("selected");
                }
                break;
            }
        }
    }

    fn scroll_to_anchor(&mut self, anchor: &str) -> bool {
        match self.document.get_element_by_id(anchor) {
            Some(element) => {
                element.scroll_into_view();
                true
            }
            None => false,
        }
    }

    fn scroll_to(&mut self, offset: f64) {
        self.window.scroll_to_with_x_and_y(0.0, offset);
    }

    fn scroll_offset(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn location(&self) -> String {
        let location = self.window.location();
        let mut path = location.pathname().unwrap_or_else(|_| "/".to_string());
        if let Ok(hash) = location.hash() {
            path.push_str(&hash);
        }
        path
    }
}

impl HistoryBackend for BrowserHost {
    fn push_entry(&mut self, path: &str) {
        let pushed = self
            .window
            .history()
            .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(path)));
        if let Err(err) = pushed {
            log::warn!("[历史] pushState 失败: {err:?}");
        }
    }

    fn replace_entry(&mut self, record: &HistoryStateRecord) {
        let state = match record.to_json() {
            Ok(json) => js_sys::JSON::parse(&json),
            Err(err) => {
                log::warn!("[历史] 状态编码失败: {err}");
                return;
            }
        };
        let replaced = state.and_then(|state| {
            self.window
                .history()
                .and_then(|history| history.replace_state(&state, ""))
        });
        if let Err(err) = replaced {
            log::warn!("[历史] replaceState 失败: {err:?}");
        }
    }
}

impl FragmentTransport for BrowserHost {
    fn begin(&mut self, token: RequestToken, url: &str) {
        let controller = match AbortController::new() {
            Ok(controller) => controller,
            Err(err) => {
                log::warn!("[网络] 无法创建 AbortController: {err:?}");
                return;
            }
        };
        let signal = controller.signal();
        let session = self.session.clone();
        let url = url.to_string();
        spawn_local(async move {
            let result = fetch_fragment(&url, &signal).await;
            with_session(&session, |viewer| viewer.fetch_completed(token, result));
        });
        self.inflight = Some((token, controller));
    }

    fn abort(&mut self, token: RequestToken) {
        match self.inflight.take() {
            Some((live, controller)) if live == token => controller.abort(),
            other => self.inflight = other,
        }
    }
}

impl DeferredClock for BrowserHost {
    fn schedule_indicator(&mut self, token: RequestToken, delay_ms: u32) {
        let session = self.session.clone();
        self.loading_timer = Some(Timeout::new(delay_ms, move || {
            with_session(&session, |viewer| viewer.loading_timer_fired(token));
        }));
    }

    fn cancel_indicator(&mut self) {
        // Timeout 被丢弃时自动 clearTimeout
        self.loading_timer = None;
    }
}
