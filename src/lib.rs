pub mod clock;
pub mod config;
pub mod console;
pub mod dashboard;
pub mod error;
pub mod metrics;
pub mod poll;
pub mod render;
pub mod runtime;
pub mod source;
pub mod static_refresh;
pub mod storage;
pub mod web;
