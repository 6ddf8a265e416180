pub mod buffer;
pub mod chart_sync;
pub mod config;
pub mod error;
pub mod event;
pub mod format;
pub mod input;
pub mod model;
pub mod panels;
pub mod poller;
pub mod reconciler;
pub mod session;
pub mod sink;
pub mod stream;
pub mod transport;
pub mod ui;
