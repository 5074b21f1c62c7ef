use crate::navigation::{NavigationController, NavigationHost, NavigationOutcome, PageView};
use crate::popup::{PopupMenuController, PopupSurface};
use crate::types::HistoryStateRecord;

/// 浏览器历史的写入端
pub trait HistoryBackend {
    /// 用户前进导航时新增一条历史
    fn push_entry(&mut self, path: &str);
    /// 覆盖当前历史条目的状态，不新增条目
    fn replace_entry(&mut self, record: &HistoryStateRecord);
}

/// 把当前路径和滚动位置写回当前历史条目
#[derive(Debug, Default, Clone)]
pub struct HistorySync {
    last_saved: Option<HistoryStateRecord>,
}

impl HistorySync {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次滚动和每次导航完成后调用
    pub fn save<H: PageView + HistoryBackend>(&mut self, host: &mut H) -> HistoryStateRecord {
        let record = HistoryStateRecord::new(host.location(), host.scroll_offset());
        host.replace_entry(&record);
        self.last_saved = Some(record.clone());
        record
    }

    pub fn last_saved(&self) -> Option<&HistoryStateRecord> {
        self.last_saved.as_ref()
    }
}

/// 后退/前进：先关掉弹出菜单，再按记录的滚动位置恢复页面
pub fn restore<H, M, S>(
    record: &HistoryStateRecord,
    navigation: &mut NavigationController<H>,
    popup: &mut PopupMenuController<M>,
    popup_surface: &mut S,
) -> NavigationOutcome
where
    H: NavigationHost,
    M: Clone + PartialEq,
    S: PopupSurface<M>,
{
    popup.close(popup_surface);
    log::info!("[历史] 恢复 {} 滚动 {}", record.path, record.scroll_offset);
    navigation.navigate(&record.path, false, record.scroll_offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::testing::{FakeHost, FakePopupSurface, HostCall};

    #[test]
    fn save_replaces_current_entry() {
        let mut host = FakeHost::at("/docs/intro#usage");
        host.scroll = 312.0;
        let mut sync = HistorySync::new();

        let record = sync.save(&mut host);
        assert_eq!(record, HistoryStateRecord::new("/docs/intro#usage", 312.0));
        assert_eq!(host.calls, vec![HostCall::Replace(record.clone())]);
        assert_eq!(sync.last_saved(), Some(&record));
    }

    #[test]
    fn restore_closes_popup_and_navigates_without_push() {
        let mut navigation = NavigationController::new(FakeHost::at("/docs/b"), &ViewerConfig::default());
        let mut popup = PopupMenuController::new();
        let mut surface = FakePopupSurface::default();
        popup.toggle("btn", "menu", &mut surface);

        let record = HistoryStateRecord::new("/docs/a", 240.0);
        let outcome = restore(&record, &mut navigation, &mut popup, &mut surface);

        assert!(!popup.is_open());
        assert!(matches!(outcome, NavigationOutcome::Fetching(_)));
        assert!(navigation
            .host()
            .calls
            .iter()
            .all(|call| !matches!(call, HostCall::Push(_))));
    }
}
