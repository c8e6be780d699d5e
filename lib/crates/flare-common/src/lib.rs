pub mod config;
pub mod types;

pub use config::{AgentConfig, LoggingConfig, Platform};
pub use types::*;
