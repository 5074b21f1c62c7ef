use std::cell::RefCell;
use std::rc::Weak;

use web_sys::Element;

use crate::components::page_host::BrowserHost;
use crate::components::popup_menu::DomPopupSurface;
use crate::viewer::DocViewer;

pub type Session = DocViewer<BrowserHost, Element, DomPopupSurface>;

/// 回调里持有的弱引用，页面卸载后回调自然失效
pub type SessionHandle = Weak<RefCell<Session>>;

/// 事件回调统一从这里进入会话
///
/// 会话正被占用时（同步派发的嵌套事件）放弃本次处理。
pub fn with_session<R>(handle: &SessionHandle, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
    let session = handle.upgrade()?;
    let result = match session.try_borrow_mut() {
        Ok(mut viewer) => Some(f(&mut viewer)),
        Err(_) => {
            log::warn!("[会话] 会话正忙，丢弃嵌套事件");
            None
        }
    };
    result
}
