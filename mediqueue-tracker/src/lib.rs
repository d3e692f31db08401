pub mod api;
pub mod command;
pub mod config;
pub mod logging;
pub mod queue;
pub mod render;
