use std::env;

use engine_session::{Depth, EngineConfig};

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub engine: EngineConfig,
    pub default_depth: Depth,
    /// Screens allowed to run an engine process at the same time.
    pub max_engines: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            engine: EngineConfig::from_env(),
            default_depth: env::var("DEFAULT_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Depth::clamped)
                .unwrap_or_default(),
            max_engines: env::var("MAX_ENGINES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),
        }
    }
}
