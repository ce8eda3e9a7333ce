//! UCI engine plumbing for the analyzer screen.
//!
//! [`engine::EngineHandle`] owns the engine child process and pumps its I/O
//! through channels; [`session::AnalysisSession`] turns analyze/stop intents
//! into protocol commands and picks completions out of the engine's output.

pub mod config;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod session;

pub use config::EngineConfig;
pub use engine::{EngineConnection, EngineHandle, EngineSender};
pub use error::EngineError;
pub use protocol::{Depth, EngineCommand};
pub use session::{AnalysisSession, CommandSink, LineOutcome, RequestId};
