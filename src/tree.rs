//! 侧栏目录树的展开/收起。
//!
//! 高度动画没有预先可知的目标值，所以分几步走：
//! 收起 `Expanded → Collapsing → Hidden`，先把当前高度写成显式值并强制布局，
//! 下一帧打开过渡，再下一帧把高度设为 0，过渡结束后去掉所有内联样式；
//! 展开 `Hidden → Expanding → Expanded`，直接过渡到内容的自然高度，
//! 结束后同样去掉内联样式回到正常流。
//!
//! 每次切换都会换一个新的 epoch，帧回调和 transitionend 带着 epoch 回来，
//! 对不上的直接丢弃，旧动画的收尾不会覆盖新动画。

use std::collections::HashMap;
use std::hash::Hash;

/// 高度差小于这个值视为没有过渡，transitionend 不会触发
const NO_TRANSITION_EPSILON: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionEpoch(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollapseStep {
    /// 高度已固定，等下一帧打开过渡
    Pinned,
    /// 过渡已打开，等下一帧把高度设为 0
    Armed,
    /// 正在收缩，等 transitionend
    Shrinking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePhase {
    Expanded,
    Collapsing(CollapseStep),
    Hidden,
    Expanding,
}

impl NodePhase {
    /// 最终会停在展开状态
    pub fn is_expanded(self) -> bool {
        matches!(self, NodePhase::Expanded | NodePhase::Expanding)
    }

    pub fn is_animating(self) -> bool {
        matches!(self, NodePhase::Collapsing(_) | NodePhase::Expanding)
    }
}

/// 子列表节点上的 DOM 操作
pub trait NodeSurface {
    /// caret 与子列表上的展开标记
    fn set_expanded_marker(&mut self, expanded: bool);
    /// 当前实际渲染高度，隐藏时为 0
    fn rendered_height(&self) -> f64;
    /// 内容的自然高度
    fn natural_height(&self) -> f64;
    /// 动画期间用内联样式保持可见
    fn show(&mut self);
    fn pin_height(&mut self, height: f64);
    fn force_layout(&mut self);
    fn enable_transition(&mut self);
    /// 去掉高度、过渡、显示相关的内联样式
    fn release_overrides(&mut self);
    fn request_frame(&mut self, epoch: TransitionEpoch);
    /// 过渡结束或被取消时分别回调 `transition_end` / `transition_cancel`，只回调一次
    fn await_transition_end(&mut self, epoch: TransitionEpoch);
}

#[derive(Debug, Clone, Copy)]
struct NodeState {
    phase: NodePhase,
    epoch: u64,
    from_height: f64,
}

#[derive(Debug)]
pub struct CollapsibleTree<K> {
    nodes: HashMap<K, NodeState>,
}

impl<K> Default for CollapsibleTree<K> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Copy + std::fmt::Debug> CollapsibleTree<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按 DOM 中已有的标记登记节点，已登记的保持原状
    pub fn register(&mut self, key: K, expanded: bool) {
        self.nodes.entry(key).or_insert(NodeState {
            phase: if expanded {
                NodePhase::Expanded
            } else {
                NodePhase::Hidden
            },
            epoch: 0,
            from_height: 0.0,
        });
    }

    pub fn phase(&self, key: &K) -> Option<NodePhase> {
        self.nodes.get(key).map(|node| node.phase)
    }

    /// 切换节点，返回切换后是否展开。未登记的节点按收起处理。
    pub fn toggle<S: NodeSurface + ?Sized>(&mut self, key: K, surface: &mut S) -> bool {
        self.register(key, false);
        let expanded = self
            .phase(&key)
            .map(NodePhase::is_expanded)
            .unwrap_or(false);
        if expanded {
            self.begin_collapse(key, surface);
            false
        } else {
            self.begin_expand(key, surface);
            true
        }
    }

    /// 只在收起时展开，返回是否开始了展开
    pub fn expand<S: NodeSurface + ?Sized>(&mut self, key: K, surface: &mut S) -> bool {
        self.register(key, false);
        if self.phase(&key).is_some_and(NodePhase::is_expanded) {
            return false;
        }
        self.begin_expand(key, surface);
        true
    }

    /// 动画帧回调
    pub fn frame<S: NodeSurface + ?Sized>(&mut self, key: K, epoch: TransitionEpoch, surface: &mut S) {
        let Some(node) = self.live_node(key, epoch) else {
            return;
        };
        match node.phase {
            NodePhase::Collapsing(CollapseStep::Pinned) => {
                surface.enable_transition();
                node.phase = NodePhase::Collapsing(CollapseStep::Armed);
                surface.request_frame(epoch);
            }
            NodePhase::Collapsing(CollapseStep::Armed) => {
                surface.pin_height(0.0);
                if node.from_height < NO_TRANSITION_EPSILON {
                    surface.release_overrides();
                    node.phase = NodePhase::Hidden;
                } else {
                    node.phase = NodePhase::Collapsing(CollapseStep::Shrinking);
                    surface.await_transition_end(epoch);
                }
            }
            phase => log::debug!("[目录] {key:?} 在 {phase:?} 收到多余的帧回调"),
        }
    }

    /// transitionend 回调
    pub fn transition_end<S: NodeSurface + ?Sized>(
        &mut self,
        key: K,
        epoch: TransitionEpoch,
        surface: &mut S,
    ) {
        self.settle(key, epoch, surface, "transitionend");
    }

    /// transitioncancel 回调
    ///
    /// 列表或祖先在过渡途中变成 `display: none` 时浏览器只发这个事件，
    /// 同样要清掉内联样式并落到目标状态。
    pub fn transition_cancel<S: NodeSurface + ?Sized>(
        &mut self,
        key: K,
        epoch: TransitionEpoch,
        surface: &mut S,
    ) {
        self.settle(key, epoch, surface, "transitioncancel");
    }

    fn settle<S: NodeSurface + ?Sized>(
        &mut self,
        key: K,
        epoch: TransitionEpoch,
        surface: &mut S,
        event: &str,
    ) {
        let Some(node) = self.live_node(key, epoch) else {
            return;
        };
        match node.phase {
            NodePhase::Collapsing(CollapseStep::Shrinking) => {
                surface.release_overrides();
                node.phase = NodePhase::Hidden;
            }
            NodePhase::Expanding => {
                surface.release_overrides();
                node.phase = NodePhase::Expanded;
            }
            phase => log::debug!("[目录] {key:?} 在 {phase:?} 收到多余的 {event}"),
        }
    }

    fn live_node(&mut self, key: K, epoch: TransitionEpoch) -> Option<&mut NodeState> {
        match self.nodes.get_mut(&key) {
            Some(node) if node.epoch == epoch.0 => Some(node),
            Some(_) => {
                log::debug!("[目录] {key:?} 丢弃过期的动画回调 epoch={}", epoch.0);
                None
            }
            None => None,
        }
    }

    fn next_epoch(&mut self, key: K) -> Option<(&mut NodeState, TransitionEpoch)> {
        let node = self.nodes.get_mut(&key)?;
        node.epoch += 1;
        let epoch = TransitionEpoch(node.epoch);
        Some((node, epoch))
    }

    fn begin_collapse<S: NodeSurface + ?Sized>(&mut self, key: K, surface: &mut S) {
        let Some((node, epoch)) = self.next_epoch(key) else {
            return;
        };
        let height = surface.rendered_height();
        surface.set_expanded_marker(false);
        surface.show();
        surface.pin_height(height);
        surface.force_layout();
        node.from_height = height;
        node.phase = NodePhase::Collapsing(CollapseStep::Pinned);
        surface.request_frame(epoch);
        log::debug!("[目录] {key:?} 收起，起始高度 {height}");
    }

    fn begin_expand<S: NodeSurface + ?Sized>(&mut self, key: K, surface: &mut S) {
        let Some((node, epoch)) = self.next_epoch(key) else {
            return;
        };
        let start = match node.phase {
            NodePhase::Hidden => 0.0,
            _ => surface.rendered_height(),
        };
        surface.show();
        surface.pin_height(start);
        surface.force_layout();
        let target = surface.natural_height();
        surface.enable_transition();
        surface.pin_height(target);
        surface.set_expanded_marker(true);
        node.from_height = start;

        if (target - start).abs() < NO_TRANSITION_EPSILON {
            surface.release_overrides();
            node.phase = NodePhase::Expanded;
        } else {
            node.phase = NodePhase::Expanding;
            surface.await_transition_end(epoch);
        }
        log::debug!("[目录] {key:?} 展开 {start} -> {target}");
    }
}
