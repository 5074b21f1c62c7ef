use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, MouseEvent};

use crate::components::tree_node::DomNodeSurface;
use crate::link_router::{LinkActivation, Point, Rect};
use crate::pages::docs::session::{with_session, SessionHandle};
use crate::tree::NodeSurface;

/// 站内链接统一用这一个点击处理函数，重复绑定只是覆盖 `onclick`
pub fn link_click_handler(session: SessionHandle) -> js_sys::Function {
    Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
        handle_link_click(&session, &event);
    })
    .into_js_value()
    .unchecked_into()
}

/// 链接后面紧跟的子列表
fn subtree_of(link: &Element) -> Option<HtmlElement> {
    link.next_element_sibling()
        .filter(|sibling| sibling.tag_name().eq_ignore_ascii_case("ul"))
        .and_then(|sibling| sibling.dyn_into::<HtmlElement>().ok())
}

fn handle_link_click(session: &SessionHandle, event: &MouseEvent) {
    let Some(link) = event
        .current_target()
        .and_then(|target| target.dyn_into::<Element>().ok())
    else {
        return;
    };
    let Some(href) = link.get_attribute("href") else {
        return;
    };
    event.prevent_default();

    let caret = link.query_selector("span.caret").ok().flatten();
    let list = subtree_of(&link);
    let activation = LinkActivation {
        href,
        pointer: Point::new(f64::from(event.client_x()), f64::from(event.client_y())),
        caret: caret.as_ref().map(|caret| {
            let rect = caret.get_bounding_client_rect();
            Rect::new(rect.left(), rect.top(), rect.right(), rect.bottom())
        }),
        subtree_expanded: list
            .as_ref()
            .map(|list| list.class_list().contains("active")),
    };

    let mut surface = list.map(|list| DomNodeSurface::new(list, caret, session.clone()));
    let decision = with_session(session, |viewer| {
        let subtree = surface
            .as_mut()
            .map(|surface| (surface.key(), surface as &mut dyn NodeSurface));
        viewer.activate_link(&activation, subtree)
    });
    log::debug!("[导航] 点击 {} -> {decision:?}", activation.href);
}
