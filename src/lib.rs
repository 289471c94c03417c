#![allow(clippy::uninlined_format_args)]

pub mod app;
pub mod config;
pub mod data;
pub mod feed;
pub mod gesture;
pub mod import;
pub mod logging;
pub mod player;
pub mod profile;
pub mod recommend;
pub mod search;
pub mod share;
pub mod storage;
pub mod sync;
pub mod ui;
pub mod view;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
