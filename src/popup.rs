//! 弹出菜单：全局同时最多一个处于打开状态。
//!
//! 菜单与触发按钮的身份由调用方的类型 `M` 表示（浏览器里是 DOM 元素），
//! 控制器只要求它能比较相等。

/// 打开菜单时登记的外部点击监听
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DismissObserver(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupVisibility {
    Shown,
    Hidden,
}

/// 菜单相关的 DOM 操作
pub trait PopupSurface<M> {
    /// 切换菜单的展开样式
    fn set_expanded(&mut self, menu: &M, expanded: bool);
    /// 先清掉再恢复动画样式，让每次打开都能看到动画
    fn replay_animation(&mut self, menu: &M);
    fn watch_outside_clicks(&mut self, observer: DismissObserver);
    fn unwatch_outside_clicks(&mut self, observer: DismissObserver);
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenPopup<M> {
    pub trigger: M,
    pub menu: M,
    pub observer: DismissObserver,
}

#[derive(Debug)]
pub struct PopupMenuController<M> {
    open: Option<OpenPopup<M>>,
    next_observer: u64,
}

impl<M> Default for PopupMenuController<M> {
    fn default() -> Self {
        Self {
            open: None,
            next_observer: 0,
        }
    }
}

impl<M: Clone + PartialEq> PopupMenuController<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同一个菜单再点一次就关上；否则关掉当前的，再打开请求的那个
    pub fn toggle<S: PopupSurface<M>>(
        &mut self,
        trigger: M,
        menu: M,
        surface: &mut S,
    ) -> PopupVisibility {
        let must_show = self.open.as_ref().map_or(true, |open| open.menu != menu);
        self.close(surface);
        if !must_show {
            log::debug!("[菜单] 收起");
            return PopupVisibility::Hidden;
        }

        surface.set_expanded(&menu, true);
        surface.replay_animation(&menu);

        self.next_observer += 1;
        let observer = DismissObserver(self.next_observer);
        surface.watch_outside_clicks(observer);
        self.open = Some(OpenPopup {
            trigger,
            menu,
            observer,
        });
        log::debug!("[菜单] 展开 observer={}", observer.0);
        PopupVisibility::Shown
    }

    /// 关闭当前菜单，没有打开的菜单时什么也不做
    pub fn close<S: PopupSurface<M>>(&mut self, surface: &mut S) -> bool {
        match self.open.take() {
            Some(open) => {
                surface.set_expanded(&open.menu, false);
                surface.unwatch_outside_clicks(open.observer);
                true
            }
            None => false,
        }
    }

    /// 文档级点击
    ///
    /// 只认当前登记的那个监听，并且拿当前记录的按钮和菜单做包含判断。
    /// `is_inside` 回答点击目标是否落在给定元素内。
    pub fn document_click<S, F>(&mut self, observer: DismissObserver, surface: &mut S, is_inside: F) -> bool
    where
        S: PopupSurface<M>,
        F: Fn(&M) -> bool,
    {
        let Some(open) = self.open.as_ref() else {
            return false;
        };
        if open.observer != observer {
            log::debug!("[菜单] 忽略过期的点击监听 {}", observer.0);
            return false;
        }
        if is_inside(&open.trigger) || is_inside(&open.menu) {
            return false;
        }
        log::debug!("[菜单] 点击菜单外部，关闭");
        self.close(surface)
    }

    /// 布局变化（例如断点切换）让触发按钮不可见时自动关闭
    pub fn layout_changed<S, F>(&mut self, surface: &mut S, trigger_visible: F) -> bool
    where
        S: PopupSurface<M>,
        F: Fn(&M) -> bool,
    {
        match self.open.as_ref() {
            Some(open) if !trigger_visible(&open.trigger) => {
                log::debug!("[菜单] 触发按钮已隐藏，关闭");
                self.close(surface)
            }
            _ => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn open_popup(&self) -> Option<&OpenPopup<M>> {
        self.open.as_ref()
    }

    pub fn open_trigger(&self) -> Option<&M> {
        self.open.as_ref().map(|open| &open.trigger)
    }
}
