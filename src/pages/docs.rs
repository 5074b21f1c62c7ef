pub mod session;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlElement, PopStateEvent, ScrollRestoration, Window};

use crate::components::mouse_handlers::link_click_handler;
use crate::components::page_host::BrowserHost;
use crate::components::popup_menu::DomPopupSurface;
use crate::config::{ViewerConfig, CONFIG_META_NAME};
use crate::error::ViewerError;
use crate::link_router::LinkRouter;
use crate::logging;
use crate::types::HistoryStateRecord;
use crate::viewer::DocViewer;
use session::{with_session, Session, SessionHandle};

thread_local! {
    static SESSION: RefCell<Option<Rc<RefCell<Session>>>> = const { RefCell::new(None) };
}

/// 页面入口：读取配置、组装会话、挂上全局监听
pub fn start() -> Result<(), ViewerError> {
    let window = web_sys::window().ok_or(ViewerError::MissingGlobal("window"))?;
    let document = window
        .document()
        .ok_or(ViewerError::MissingGlobal("document"))?;

    let (config, config_error) = match read_config(&document) {
        Ok(config) => (config, None),
        Err(err) => (ViewerConfig::default(), Some(err)),
    };
    logging::init(config.level_filter());
    if let Some(err) = config_error {
        log::warn!("[启动] 配置无效，使用默认值: {err}");
    }

    let content = select(&document, &config.selectors.content)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok());
    let tree = select(&document, &config.selectors.tree);
    let trigger = select(&document, &config.selectors.popup_trigger);
    let menu = select(&document, &config.selectors.popup_menu);
    if content.is_none() {
        log::warn!("[启动] 找不到内容区 {}", config.selectors.content);
    }

    let history = window.history().map_err(dom_error)?;
    history
        .set_scroll_restoration(ScrollRestoration::Manual)
        .map_err(dom_error)?;

    let session = Rc::new_cyclic(|handle: &SessionHandle| {
        let link_handler = link_click_handler(handle.clone());
        let host = BrowserHost::new(
            handle.clone(),
            window.clone(),
            document.clone(),
            content,
            tree,
            LinkRouter::new(config.link_prefix.clone(), config.caret_hit_zone),
            link_handler,
        );
        let popup_surface = DomPopupSurface::new(handle.clone(), document.clone());
        RefCell::new(DocViewer::new(config, host, popup_surface))
    });
    let handle = Rc::downgrade(&session);

    let location = window.location().pathname().map_err(dom_error)?;
    with_session(&handle, |viewer| viewer.boot(&location));

    listen_scroll(&window, handle.clone())?;
    listen_popstate(&window, handle.clone())?;
    listen_resize(&window, handle.clone())?;
    if let (Some(trigger), Some(menu)) = (trigger, menu) {
        listen_trigger(&trigger, &menu, handle)?;
    }

    SESSION.with(|slot| *slot.borrow_mut() = Some(session));
    Ok(())
}

fn read_config(document: &Document) -> Result<ViewerConfig, ViewerError> {
    let selector = format!("meta[name=\"{CONFIG_META_NAME}\"]");
    let raw = document
        .query_selector(&selector)
        .ok()
        .flatten()
        .and_then(|meta| meta.get_attribute("content"));
    match raw {
        Some(raw) => Ok(ViewerConfig::from_json(&raw)?),
        None => Ok(ViewerConfig::default()),
    }
}

fn select(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

fn dom_error(err: JsValue) -> ViewerError {
    ViewerError::Dom(format!("{err:?}"))
}

/// 注册一个常驻监听；页面存活期间不会摘下，直接交给 JS 持有
fn listen(
    target: &web_sys::EventTarget,
    kind: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), ViewerError> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target
        .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        .map_err(dom_error)?;
    closure.forget();
    Ok(())
}

fn listen_scroll(window: &Window, handle: SessionHandle) -> Result<(), ViewerError> {
    listen(window, "scroll", move |_: Event| {
        with_session(&handle, |viewer| viewer.scroll());
    })
}

fn listen_popstate(window: &Window, handle: SessionHandle) -> Result<(), ViewerError> {
    listen(window, "popstate", move |event: Event| {
        let record = event
            .dyn_ref::<PopStateEvent>()
            .and_then(|event| history_record(&event.state()));
        with_session(&handle, |viewer| viewer.restore(record.as_ref()));
    })
}

/// popstate 带来的状态；空状态或解析失败都当作没有
fn history_record(state: &JsValue) -> Option<HistoryStateRecord> {
    if state.is_null() || state.is_undefined() {
        return None;
    }
    let raw: String = js_sys::JSON::stringify(state).ok()?.into();
    match HistoryStateRecord::from_json(&raw) {
        Ok(record) => Some(record),
        Err(err) => {
            log::warn!("[历史] 无法解析状态 {raw}: {err}");
            None
        }
    }
}

fn listen_resize(window: &Window, handle: SessionHandle) -> Result<(), ViewerError> {
    let view = window.clone();
    listen(window, "resize", move |_: Event| {
        with_session(&handle, |viewer| {
            viewer.layout_changed(|trigger: &Element| is_displayed(&view, trigger))
        });
    })
}

fn is_displayed(window: &Window, element: &Element) -> bool {
    window
        .get_computed_style(element)
        .ok()
        .flatten()
        .and_then(|style| style.get_property_value("display").ok())
        .map_or(true, |display| display != "none")
}

fn listen_trigger(trigger: &Element, menu: &Element, handle: SessionHandle) -> Result<(), ViewerError> {
    let trigger_el = trigger.clone();
    let menu = menu.clone();
    listen(trigger, "click", move |_: Event| {
        let visibility = with_session(&handle, |viewer| {
            viewer.toggle_popup(trigger_el.clone(), menu.clone())
        });
        log::debug!("[菜单] 按钮点击 -> {visibility:?}");
    })?;
    for (kind, on) in [("mouseover", true), ("mouseout", false)] {
        let trigger_el = trigger.clone();
        listen(trigger, kind, move |_: Event| {
            let _ = trigger_el.class_list().toggle_with_force("highlight", on);
        })?;
    }
    Ok(())
}
