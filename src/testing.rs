//! 单元测试用的记录型替身。

use std::collections::HashSet;

use crate::history::HistoryBackend;
use crate::navigation::{DeferredClock, FragmentTransport, PageView};
use crate::popup::{DismissObserver, PopupSurface};
use crate::tree::{NodeSurface, TransitionEpoch};
use crate::types::{HistoryStateRecord, RequestToken};

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Push(String),
    Replace(HistoryStateRecord),
    Highlight(String),
    Begin(RequestToken, String),
    Abort(RequestToken),
    Schedule(RequestToken, u32),
    CancelIndicator,
    ShowIndicator,
    Title(String),
    Body(String),
    BindLinks,
    ScrollToAnchor(String),
    ScrollTo(f64),
}

#[derive(Debug, Default)]
pub struct FakeHost {
    pub calls: Vec<HostCall>,
    pub anchors: HashSet<String>,
    pub location: String,
    pub scroll: f64,
    pub title: String,
    pub body: String,
}

impl FakeHost {
    /// 锚点滚动后的假定位置
    pub const ANCHOR_OFFSET: f64 = 480.0;

    pub fn at(location: &str) -> Self {
        Self {
            location: location.to_string(),
            ..Self::default()
        }
    }

    pub fn count(&self, call: &HostCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HostCall::Begin(..)))
            .count()
    }
}

impl PageView for FakeHost {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        self.calls.push(HostCall::Title(title.to_string()));
    }

    fn set_body(&mut self, markup: &str) {
        self.body = markup.to_string();
        self.calls.push(HostCall::Body(markup.to_string()));
    }

    fn bind_links(&mut self) {
        self.calls.push(HostCall::BindLinks);
    }

    fn show_loading_indicator(&mut self) {
        self.calls.push(HostCall::ShowIndicator);
    }

    fn highlight(&mut self, key: &str) {
        self.calls.push(HostCall::Highlight(key.to_string()));
    }

    fn scroll_to_anchor(&mut self, anchor: &str) -> bool {
        self.calls.push(HostCall::ScrollToAnchor(anchor.to_string()));
        if self.anchors.contains(anchor) {
            self.scroll = Self::ANCHOR_OFFSET;
            true
        } else {
            false
        }
    }

    fn scroll_to(&mut self, offset: f64) {
        self.scroll = offset;
        self.calls.push(HostCall::ScrollTo(offset));
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll
    }

    fn location(&self) -> String {
        self.location.clone()
    }
}

impl HistoryBackend for FakeHost {
    fn push_entry(&mut self, path: &str) {
        self.location = path.to_string();
        self.calls.push(HostCall::Push(path.to_string()));
    }

    fn replace_entry(&mut self, record: &HistoryStateRecord) {
        self.calls.push(HostCall::Replace(record.clone()));
    }
}

impl FragmentTransport for FakeHost {
    fn begin(&mut self, token: RequestToken, url: &str) {
        self.calls.push(HostCall::Begin(token, url.to_string()));
    }

    fn abort(&mut self, token: RequestToken) {
        self.calls.push(HostCall::Abort(token));
    }
}

impl DeferredClock for FakeHost {
    fn schedule_indicator(&mut self, token: RequestToken, delay_ms: u32) {
        self.calls.push(HostCall::Schedule(token, delay_ms));
    }

    fn cancel_indicator(&mut self) {
        self.calls.push(HostCall::CancelIndicator);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopupCall {
    Expanded(&'static str, bool),
    Replay(&'static str),
    Watch(DismissObserver),
    Unwatch(DismissObserver),
}

#[derive(Debug, Default)]
pub struct FakePopupSurface {
    pub calls: Vec<PopupCall>,
    pub watching: Vec<DismissObserver>,
}

impl FakePopupSurface {
    pub fn expanded_menus(&self) -> Vec<&'static str> {
        let mut open: Vec<&'static str> = Vec::new();
        for call in &self.calls {
            if let PopupCall::Expanded(menu, expanded) = call {
                open.retain(|m| m != menu);
                if *expanded {
                    open.push(*menu);
                }
            }
        }
        open
    }
}

impl PopupSurface<&'static str> for FakePopupSurface {
    fn set_expanded(&mut self, menu: &&'static str, expanded: bool) {
        self.calls.push(PopupCall::Expanded(*menu, expanded));
    }

    fn replay_animation(&mut self, menu: &&'static str) {
        self.calls.push(PopupCall::Replay(*menu));
    }

    fn watch_outside_clicks(&mut self, observer: DismissObserver) {
        self.watching.push(observer);
        self.calls.push(PopupCall::Watch(observer));
    }

    fn unwatch_outside_clicks(&mut self, observer: DismissObserver) {
        self.watching.retain(|o| *o != observer);
        self.calls.push(PopupCall::Unwatch(observer));
    }
}

/// 子列表替身：`height` 为内联高度，`None` 表示没有覆盖
#[derive(Debug, Default)]
pub struct FakeNodeSurface {
    pub natural: f64,
    pub marker: bool,
    pub shown: bool,
    pub height: Option<f64>,
    pub transition: bool,
    pub frames: Vec<TransitionEpoch>,
    pub transitions: Vec<TransitionEpoch>,
}

impl FakeNodeSurface {
    pub fn expanded(natural: f64) -> Self {
        Self {
            natural,
            marker: true,
            ..Self::default()
        }
    }

    pub fn hidden(natural: f64) -> Self {
        Self {
            natural,
            ..Self::default()
        }
    }

    pub fn take_frame(&mut self) -> Option<TransitionEpoch> {
        self.frames.pop()
    }

    pub fn take_transition(&mut self) -> Option<TransitionEpoch> {
        self.transitions.pop()
    }

    /// 没有残留的内联样式
    pub fn is_clean(&self) -> bool {
        self.height.is_none() && !self.transition && !self.shown
    }
}

impl NodeSurface for FakeNodeSurface {
    fn set_expanded_marker(&mut self, expanded: bool) {
        self.marker = expanded;
    }

    fn rendered_height(&self) -> f64 {
        match self.height {
            Some(height) => height,
            None if self.marker || self.shown => self.natural,
            None => 0.0,
        }
    }

    fn natural_height(&self) -> f64 {
        self.natural
    }

    fn show(&mut self) {
        self.shown = true;
    }

    fn pin_height(&mut self, height: f64) {
        self.height = Some(height);
    }

    fn force_layout(&mut self) {}

    fn enable_transition(&mut self) {
        self.transition = true;
    }

    fn release_overrides(&mut self) {
        self.height = None;
        self.transition = false;
        self.shown = false;
    }

    fn request_frame(&mut self, epoch: TransitionEpoch) {
        self.frames.push(epoch);
    }

    fn await_transition_end(&mut self, epoch: TransitionEpoch) {
        self.transitions.push(epoch);
    }
}
