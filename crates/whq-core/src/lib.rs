#![deny(warnings)]
pub mod agents;
pub mod analysis;
pub mod config;
pub mod dist;
pub mod domain;
pub mod model;

pub use config::{ConfigError, ModelParams};
pub use model::{Model, ModelError};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "whq"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
