pub mod loading_indicator;
pub mod mouse_handlers;
pub mod page_host;
pub mod popup_menu;
pub mod tree_node;
