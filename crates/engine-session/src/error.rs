//! Engine error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to spawn engine {path}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine handshake failed: {0}")]
    Handshake(String),

    #[error("Engine handshake timed out")]
    Timeout,

    #[error("Engine command channel closed")]
    ChannelClosed,

    #[error("Depth {0} outside 1..=30")]
    InvalidDepth(i64),
}
