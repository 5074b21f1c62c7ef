use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, MouseEvent, Node};

use crate::pages::docs::session::{with_session, SessionHandle};
use crate::popup::{DismissObserver, PopupSurface};

type ClickHandler = Closure<dyn FnMut(MouseEvent)>;

/// 弹出菜单的 DOM 一侧
///
/// 外部点击监听挂在 document 上，每次打开换一个新的。
/// 摘下来的闭包先放进 `retired`，下次再释放：
/// 关闭往往就发生在这个闭包自己的回调里，当场释放会出问题。
pub struct DomPopupSurface {
    session: SessionHandle,
    document: Document,
    watcher: Option<(DismissObserver, ClickHandler)>,
    retired: Option<ClickHandler>,
}

impl DomPopupSurface {
    pub fn new(session: SessionHandle, document: Document) -> Self {
        Self {
            session,
            document,
            watcher: None,
            retired: None,
        }
    }
}

fn set_animation(element: &Element, value: Option<&str>) {
    let Some(element) = element.dyn_ref::<HtmlElement>() else {
        return;
    };
    let style = element.style();
    let _ = match value {
        Some(value) => style.set_property("animation", value),
        None => style.remove_property("animation").map(|_| ()),
    };
}

impl PopupSurface<Element> for DomPopupSurface {
    fn set_expanded(&mut self, menu: &Element, expanded: bool) {
        let _ = menu.class_list().toggle_with_force("expanded", expanded);
        if let Some(content) = menu.first_element_child() {
            let _ = content
                .class_list()
                .toggle_with_force("expanded-content", expanded);
        }
    }

    fn replay_animation(&mut self, menu: &Element) {
        let content = menu.first_element_child();
        set_animation(menu, Some("none"));
        if let Some(content) = &content {
            set_animation(content, Some("none"));
        }
        // 读一次布局，让浏览器认下 animation: none
        if let Some(menu) = menu.dyn_ref::<HtmlElement>() {
            let _ = menu.offset_height();
        }
        set_animation(menu, None);
        if let Some(content) = &content {
            set_animation(content, None);
        }
    }

    fn watch_outside_clicks(&mut self, observer: DismissObserver) {
        let session = self.session.clone();
        let handler = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let target = event
                .target()
                .and_then(|target| target.dyn_into::<Node>().ok());
            with_session(&session, |viewer| {
                viewer.document_click(observer, |element: &Element| {
                    target
                        .as_ref()
                        .is_some_and(|node| element.contains(Some(node)))
                })
            });
        });
        if let Err(err) = self
            .document
            .add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())
        {
            log::warn!("[菜单] 注册外部点击监听失败: {err:?}");
            return;
        }
        if let Some((previous, stale)) = self.watcher.replace((observer, handler)) {
            log::debug!("[菜单] 覆盖未摘除的监听 observer={}", previous.0);
            let _ = self
                .document
                .remove_event_listener_with_callback("click", stale.as_ref().unchecked_ref());
            self.retired = Some(stale);
        }
    }

    fn unwatch_outside_clicks(&mut self, observer: DismissObserver) {
        match self.watcher.take() {
            Some((live, handler)) if live == observer => {
                let _ = self
                    .document
                    .remove_event_listener_with_callback("click", handler.as_ref().unchecked_ref());
                self.retired = Some(handler);
            }
            other => self.watcher = other,
        }
    }
}
