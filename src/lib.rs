pub mod arena;
pub mod blur;
pub mod cache;
pub mod config;
pub mod content;
pub mod server;
