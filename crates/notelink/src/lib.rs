pub mod api;
pub mod cli;
pub mod config;
pub mod server;

pub use config::{Config, ConfigError, Settings};
pub use server::Server;
