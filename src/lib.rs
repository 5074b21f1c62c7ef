pub mod cache;
pub mod config;
pub mod error;
pub mod history;
pub mod link_router;
pub mod navigation;
pub mod popup;
pub mod tree;
pub mod types;
pub mod viewer;

#[cfg(test)]
mod testing;

#[cfg(target_arch = "wasm32")]
mod api;
#[cfg(target_arch = "wasm32")]
mod components;
#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod pages;

pub use cache::PageCache;
pub use config::ViewerConfig;
pub use error::{ConfigError, FetchError, ViewerError};
pub use history::{HistoryBackend, HistorySync};
pub use link_router::{CaretHitZone, LinkActivation, LinkDecision, LinkRouter, Point, Rect};
pub use navigation::{
    Completion, DeferredClock, FragmentTransport, NavigationController, NavigationHost,
    NavigationOutcome, PageView,
};
pub use popup::{DismissObserver, PopupMenuController, PopupSurface, PopupVisibility};
pub use tree::{CollapsibleTree, NodePhase, NodeSurface, TransitionEpoch};
pub use types::{CacheEntry, HistoryStateRecord, RequestToken};
pub use viewer::{DocViewer, NodeKey};

#[cfg(target_arch = "wasm32")]
pub use pages::docs::start;
