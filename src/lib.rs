// Library target shared by the binary, the integration tests and the
// criterion benchmarks.

pub mod app;
pub mod catalog;
pub mod config;
pub mod content;
pub mod event;
pub mod logging;
pub mod pipeline;
pub mod session;
pub mod study;
pub mod ui;
