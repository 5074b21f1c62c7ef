use serde::Deserialize;

/// 屏幕坐标下的矩形，左上闭、右下开
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        self.left <= point.x && point.x < self.right && self.top <= point.y && point.y < self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 折叠箭头的点击热区
///
/// 箭头是 `span.caret::before` 画出来的，位于 span 左侧约 19px 到 8px 之间，
/// 不在 span 自己的盒子里，只能按样式表的偏移推算。四周再放宽 `inflate`。
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CaretHitZone {
    pub inflate: f64,
    pub marker_left: f64,
    pub marker_right: f64,
}

impl Default for CaretHitZone {
    fn default() -> Self {
        Self {
            inflate: 8.0,
            marker_left: 19.0,
            marker_right: 8.0,
        }
    }
}

impl CaretHitZone {
    /// 由 caret span 的包围盒推出热区
    pub fn around(&self, caret: Rect) -> Rect {
        Rect {
            left: caret.left - self.marker_left - self.inflate,
            top: caret.top - self.inflate,
            right: caret.left - self.marker_right + self.inflate,
            bottom: caret.bottom + self.inflate,
        }
    }
}

/// 一次链接点击的快照，由浏览器层从 DOM 采集
#[derive(Debug, Clone, PartialEq)]
pub struct LinkActivation {
    pub href: String,
    pub pointer: Point,
    /// caret span 的包围盒，没有 caret 时为 None
    pub caret: Option<Rect>,
    /// 紧随链接的子列表是否展开，没有子列表时为 None
    pub subtree_expanded: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkDecision {
    /// 只展开/收起子列表，不导航
    ToggleSubtree,
    /// 点中了箭头但没有子列表，吞掉点击
    Suppress,
    /// 导航；`reveal_subtree` 为真时顺带展开收起着的子列表
    Navigate { href: String, reveal_subtree: bool },
}

/// 判定站内链接的点击该做什么
#[derive(Debug, Clone)]
pub struct LinkRouter {
    prefix: String,
    hit_zone: CaretHitZone,
}

impl LinkRouter {
    pub fn new(prefix: impl Into<String>, hit_zone: CaretHitZone) -> Self {
        Self {
            prefix: prefix.into(),
            hit_zone,
        }
    }

    /// 只有这些链接会被拦截，其余保持浏览器默认行为
    pub fn is_internal(&self, href: &str) -> bool {
        href.starts_with(&self.prefix)
    }

    pub fn classify(&self, activation: &LinkActivation) -> LinkDecision {
        if let Some(caret) = activation.caret {
            if self.hit_zone.around(caret).contains(activation.pointer) {
                return match activation.subtree_expanded {
                    Some(_) => LinkDecision::ToggleSubtree,
                    None => LinkDecision::Suppress,
                };
            }
        }
        LinkDecision::Navigate {
            href: activation.href.clone(),
            reveal_subtree: activation.subtree_expanded == Some(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> LinkRouter {
        LinkRouter::new("/docs/", CaretHitZone::default())
    }

    fn caret_box() -> Rect {
        // span 在 (100, 50) - (160, 70)
        Rect::new(100.0, 50.0, 160.0, 70.0)
    }

    fn click(x: f64, y: f64, expanded: Option<bool>) -> LinkActivation {
        LinkActivation {
            href: "/docs/parsers".to_string(),
            pointer: Point::new(x, y),
            caret: Some(caret_box()),
            subtree_expanded: expanded,
        }
    }

    #[test]
    fn hit_zone_offsets() {
        let zone = CaretHitZone::default().around(caret_box());
        assert_eq!(zone, Rect::new(73.0, 42.0, 100.0, 78.0));
    }

    #[test]
    fn click_on_caret_toggles_only() {
        let router = router();
        assert_eq!(
            router.classify(&click(85.0, 60.0, Some(true))),
            LinkDecision::ToggleSubtree
        );
        // 热区边缘：左上闭，右下开
        assert_eq!(
            router.classify(&click(73.0, 42.0, Some(false))),
            LinkDecision::ToggleSubtree
        );
        assert!(matches!(
            router.classify(&click(100.0, 60.0, Some(false))),
            LinkDecision::Navigate { .. }
        ));
        assert!(matches!(
            router.classify(&click(85.0, 78.0, Some(false))),
            LinkDecision::Navigate { .. }
        ));
    }

    #[test]
    fn caret_without_list_is_swallowed() {
        assert_eq!(router().classify(&click(85.0, 60.0, None)), LinkDecision::Suppress);
    }

    #[test]
    fn click_on_text_navigates_and_reveals_collapsed_list() {
        let router = router();
        assert_eq!(
            router.classify(&click(130.0, 60.0, Some(false))),
            LinkDecision::Navigate {
                href: "/docs/parsers".to_string(),
                reveal_subtree: true
            }
        );
        assert_eq!(
            router.classify(&click(130.0, 60.0, Some(true))),
            LinkDecision::Navigate {
                href: "/docs/parsers".to_string(),
                reveal_subtree: false
            }
        );
    }

    #[test]
    fn plain_link_navigates() {
        let activation = LinkActivation {
            href: "/docs/intro#usage".to_string(),
            pointer: Point::new(5.0, 5.0),
            caret: None,
            subtree_expanded: None,
        };
        assert_eq!(
            router().classify(&activation),
            LinkDecision::Navigate {
                href: "/docs/intro#usage".to_string(),
                reveal_subtree: false
            }
        );
    }

    #[test]
    fn only_prefixed_links_are_internal() {
        let router = router();
        assert!(router.is_internal("/docs/intro"));
        assert!(!router.is_internal("/"));
        assert!(!router.is_internal("https://example.com/docs/intro"));
    }
}
