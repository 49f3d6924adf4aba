pub mod cli;
pub mod config;
pub mod contact;
pub mod content;
pub mod core;
pub mod types;
pub mod utils;
pub mod web;

pub use config::AppConfig;
pub use web::{build_rocket, start_web_server};
