//! The slice of UCI this application speaks.

use std::fmt;

use crate::error::EngineError;

/// Search depth for an analysis request, bounded to `1..=30`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Depth(u8);

impl Depth {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 30;
    pub const DEFAULT: u8 = 20;

    pub fn new(value: i64) -> Result<Self, EngineError> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(EngineError::InvalidDepth(value))
        }
    }

    /// Pull an arbitrary number into range, the way a bounded number input does.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Depth {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Commands written to the engine's stdin, one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Uci,
    IsReady,
    SetOption { name: String, value: String },
    Position { fen: String },
    GoDepth(Depth),
    Stop,
    Quit,
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineCommand::Uci => f.write_str("uci"),
            EngineCommand::IsReady => f.write_str("isready"),
            EngineCommand::SetOption { name, value } => {
                write!(f, "setoption name {name} value {value}")
            }
            EngineCommand::Position { fen } => write!(f, "position fen {fen}"),
            EngineCommand::GoDepth(depth) => write!(f, "go depth {depth}"),
            EngineCommand::Stop => f.write_str("stop"),
            EngineCommand::Quit => f.write_str("quit"),
        }
    }
}

/// Whether `line` is a search completion, with or without a move token.
pub fn is_completion(line: &str) -> bool {
    line.trim_start().starts_with("bestmove")
}

/// Extract the suggested move from a completion line
/// (`bestmove e2e4 ponder e7e5` -> `e2e4`). Every other line, and a bare
/// `bestmove`, yields `None`.
pub fn parse_best_move(line: &str) -> Option<&str> {
    if !is_completion(line) {
        return None;
    }
    line.split_whitespace().nth(1)
}
