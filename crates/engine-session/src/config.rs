//! Engine configuration from environment variables

use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Path to the UCI engine binary
    pub path: String,

    /// `setoption name Threads`
    pub threads: u32,

    /// `setoption name Hash`, in MB
    pub hash_mb: u32,

    /// How long `uci`/`isready` may take before the engine is given up on
    pub handshake_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: "stockfish".to_string(),
            threads: 1,
            hash_mb: 64,
            handshake_timeout: Duration::from_secs(10),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            path: env::var("STOCKFISH_PATH").unwrap_or(defaults.path),
            threads: env::var("ENGINE_THREADS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.threads),
            hash_mb: env::var("ENGINE_HASH_MB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.hash_mb),
            handshake_timeout: env::var("ENGINE_HANDSHAKE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.handshake_timeout),
        }
    }
}
