//! 一次页面会话内的全部状态：导航、目录树、弹出菜单。
//!
//! 浏览器层只负责把事件翻译成这里的方法调用，
//! 所有判断与状态迁移都在这里完成。

use crate::config::ViewerConfig;
use crate::error::FetchError;
use crate::history;
use crate::link_router::{LinkActivation, LinkDecision, LinkRouter};
use crate::navigation::{Completion, NavigationController, NavigationHost, NavigationOutcome};
use crate::popup::{DismissObserver, PopupMenuController, PopupSurface, PopupVisibility};
use crate::tree::{CollapsibleTree, NodeSurface, TransitionEpoch};
use crate::types::{HistoryStateRecord, RequestToken};

/// 目录树节点在会话内的编号
pub type NodeKey = u32;

pub struct DocViewer<H, M, P> {
    config: ViewerConfig,
    router: LinkRouter,
    navigation: NavigationController<H>,
    tree: CollapsibleTree<NodeKey>,
    popup: PopupMenuController<M>,
    popup_surface: P,
}

impl<H, M, P> DocViewer<H, M, P>
where
    H: NavigationHost,
    M: Clone + PartialEq,
    P: PopupSurface<M>,
{
    pub fn new(config: ViewerConfig, host: H, popup_surface: P) -> Self {
        let router = LinkRouter::new(config.link_prefix.clone(), config.caret_hit_zone);
        let navigation = NavigationController::new(host, &config);
        Self {
            config,
            router,
            navigation,
            tree: CollapsibleTree::new(),
            popup: PopupMenuController::new(),
            popup_surface,
        }
    }

    /// 首次加载：拦截已有链接并高亮当前页
    pub fn boot(&mut self, location: &str) {
        self.navigation.host_mut().bind_links();
        self.navigation.highlight(location);
        log::info!("[启动] 当前页 {location}");
    }

    /// 站内链接被点击
    ///
    /// `subtree` 是链接后面紧跟的子列表，没有子列表时为 None。
    pub fn activate_link(
        &mut self,
        activation: &LinkActivation,
        mut subtree: Option<(NodeKey, &mut dyn NodeSurface)>,
    ) -> LinkDecision {
        let decision = self.router.classify(activation);
        if let (Some((key, _)), Some(expanded)) = (subtree.as_ref(), activation.subtree_expanded) {
            self.tree.register(*key, expanded);
        }

        match &decision {
            LinkDecision::ToggleSubtree => {
                if let Some((key, surface)) = subtree.as_mut() {
                    self.tree.toggle(*key, &mut **surface);
                }
            }
            LinkDecision::Suppress => {}
            LinkDecision::Navigate {
                href,
                reveal_subtree,
            } => {
                if *reveal_subtree {
                    if let Some((key, surface)) = subtree.as_mut() {
                        self.tree.expand(*key, &mut **surface);
                    }
                }
                self.navigation.save_state();
                self.navigation.navigate(href, true, 0.0);
                self.popup.close(&mut self.popup_surface);
            }
        }
        decision
    }

    /// popstate；没有状态的条目（例如页面内锚点跳转产生的）不处理
    pub fn restore(&mut self, record: Option<&HistoryStateRecord>) -> Option<NavigationOutcome> {
        let record = record?;
        Some(history::restore(
            record,
            &mut self.navigation,
            &mut self.popup,
            &mut self.popup_surface,
        ))
    }

    pub fn scroll(&mut self) -> HistoryStateRecord {
        self.navigation.save_state()
    }

    pub fn fetch_completed(
        &mut self,
        token: RequestToken,
        result: Result<String, FetchError>,
    ) -> Completion {
        self.navigation.complete(token, result)
    }

    pub fn loading_timer_fired(&mut self, token: RequestToken) -> bool {
        self.navigation.loading_timer_fired(token)
    }

    pub fn tree_frame(&mut self, key: NodeKey, epoch: TransitionEpoch, surface: &mut dyn NodeSurface) {
        self.tree.frame(key, epoch, surface);
    }

    pub fn tree_transition_end(
        &mut self,
        key: NodeKey,
        epoch: TransitionEpoch,
        surface: &mut dyn NodeSurface,
    ) {
        self.tree.transition_end(key, epoch, surface);
    }

    pub fn tree_transition_cancel(
        &mut self,
        key: NodeKey,
        epoch: TransitionEpoch,
        surface: &mut dyn NodeSurface,
    ) {
        self.tree.transition_cancel(key, epoch, surface);
    }

    pub fn toggle_popup(&mut self, trigger: M, menu: M) -> PopupVisibility {
        self.popup.toggle(trigger, menu, &mut self.popup_surface)
    }

    pub fn document_click<F>(&mut self, observer: DismissObserver, is_inside: F) -> bool
    where
        F: Fn(&M) -> bool,
    {
        self.popup
            .document_click(observer, &mut self.popup_surface, is_inside)
    }

    pub fn layout_changed<F>(&mut self, trigger_visible: F) -> bool
    where
        F: Fn(&M) -> bool,
    {
        self.popup.layout_changed(&mut self.popup_surface, trigger_visible)
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn router(&self) -> &LinkRouter {
        &self.router
    }

    pub fn navigation(&self) -> &NavigationController<H> {
        &self.navigation
    }

    pub fn navigation_mut(&mut self) -> &mut NavigationController<H> {
        &mut self.navigation
    }

    pub fn tree(&self) -> &CollapsibleTree<NodeKey> {
        &self.tree
    }

    pub fn popup(&self) -> &PopupMenuController<M> {
        &self.popup
    }

    pub fn popup_surface(&self) -> &P {
        &self.popup_surface
    }
}
