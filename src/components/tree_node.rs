use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, TransitionEvent};

use crate::pages::docs::session::{with_session, SessionHandle};
use crate::tree::{NodeSurface, TransitionEpoch};
use crate::viewer::NodeKey;

const NODE_KEY_ATTR: &str = "data-tree-node";
const HEIGHT_TRANSITION: &str = "height 0.25s ease-out";
const TRANSITION_EVENTS: [&str; 2] = ["transitionend", "transitioncancel"];

thread_local! {
    static NEXT_NODE_KEY: Cell<NodeKey> = const { Cell::new(1) };
}

/// 子列表在会话内的编号，第一次见到时写到 `data-tree-node` 上
pub fn node_key(list: &Element) -> NodeKey {
    if let Some(key) = list
        .get_attribute(NODE_KEY_ATTR)
        .and_then(|raw| raw.parse().ok())
    {
        return key;
    }
    let key = NEXT_NODE_KEY.with(|next| {
        let key = next.get();
        next.set(key + 1);
        key
    });
    if let Err(err) = list.set_attribute(NODE_KEY_ATTR, &key.to_string()) {
        log::warn!("[目录] 写入节点编号失败，折叠状态将无法延续: {err:?}");
    }
    key
}

/// 侧栏里 caret + 子列表 `ul`
///
/// 展开标记：caret 上的 `caret-down` 和子列表上的 `active`。
pub struct DomNodeSurface {
    key: NodeKey,
    list: HtmlElement,
    caret: Option<Element>,
    session: SessionHandle,
}

impl DomNodeSurface {
    pub fn new(list: HtmlElement, caret: Option<Element>, session: SessionHandle) -> Self {
        Self {
            key: node_key(&list),
            list,
            caret,
            session,
        }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    fn detached(&self) -> Self {
        Self {
            key: self.key,
            list: self.list.clone(),
            caret: self.caret.clone(),
            session: self.session.clone(),
        }
    }

    fn set_style(&self, property: &str, value: &str) {
        if let Err(err) = self.list.style().set_property(property, value) {
            log::warn!("[目录] 设置 {property} 失败: {err:?}");
        }
    }
}

impl NodeSurface for DomNodeSurface {
    fn set_expanded_marker(&mut self, expanded: bool) {
        let _ = self.list.class_list().toggle_with_force("active", expanded);
        if let Some(caret) = &self.caret {
            let _ = caret.class_list().toggle_with_force("caret-down", expanded);
        }
    }

    fn rendered_height(&self) -> f64 {
        self.list.get_bounding_client_rect().height()
    }

    fn natural_height(&self) -> f64 {
        f64::from(self.list.scroll_height())
    }

    fn show(&mut self) {
        self.set_style("display", "block");
    }

    fn pin_height(&mut self, height: f64) {
        self.set_style("height", &format!("{height}px"));
    }

    fn force_layout(&mut self) {
        let _ = self.list.offset_height();
    }

    fn enable_transition(&mut self) {
        self.set_style("transition", HEIGHT_TRANSITION);
    }

    fn release_overrides(&mut self) {
        let style = self.list.style();
        for property in ["display", "transition", "height"] {
            let _ = style.remove_property(property);
        }
    }

    fn request_frame(&mut self, epoch: TransitionEpoch) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut surface = self.detached();
        let callback = Closure::once_into_js(move || {
            let key = surface.key;
            with_session(&surface.session.clone(), |viewer| {
                viewer.tree_frame(key, epoch, &mut surface)
            });
        });
        if let Err(err) = window.request_animation_frame(callback.unchecked_ref()) {
            log::warn!("[目录] requestAnimationFrame 失败: {err:?}");
        }
    }

    fn await_transition_end(&mut self, epoch: TransitionEpoch) {
        // 子列表里嵌套的列表也会冒泡过渡事件，只认自己的 height 过渡；
        // end 和 cancel 只会来一个，认到之后两个监听一起摘掉
        let registered: Rc<RefCell<Option<js_sys::Function>>> = Rc::default();
        let registered_inner = registered.clone();
        let mut surface = self.detached();
        let handler = Closure::<dyn FnMut(TransitionEvent)>::new(move |event: TransitionEvent| {
            let on_list = event
                .target()
                .and_then(|target| target.dyn_into::<web_sys::Node>().ok())
                .is_some_and(|node| surface.list.is_same_node(Some(&node)));
            if !on_list || event.property_name() != "height" {
                return;
            }
            if let Some(callback) = registered_inner.borrow_mut().take() {
                for kind in TRANSITION_EVENTS {
                    let _ = surface
                        .list
                        .remove_event_listener_with_callback(kind, &callback);
                }
            }
            let key = surface.key;
            let cancelled = event.type_() == "transitioncancel";
            with_session(&surface.session.clone(), |viewer| {
                if cancelled {
                    viewer.tree_transition_cancel(key, epoch, &mut surface)
                } else {
                    viewer.tree_transition_end(key, epoch, &mut surface)
                }
            });
        })
        .into_js_value();

        let callback: js_sys::Function = handler.unchecked_into();
        for kind in TRANSITION_EVENTS {
            if let Err(err) = self.list.add_event_listener_with_callback(kind, &callback) {
                log::warn!("[目录] 注册 {kind} 失败: {err:?}");
            }
        }
        *registered.borrow_mut() = Some(callback);
    }
}
