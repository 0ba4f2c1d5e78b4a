pub mod feed_watcher;
pub mod market_view;
pub mod ui_handler;
