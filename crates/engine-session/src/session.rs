//! Analysis session: one screen's view of the engine.
//!
//! UCI answers every `go` with exactly one `bestmove`, including searches cut
//! short by `stop` or superseded by a newer `go`. The session keeps the ids of
//! searches still owed a completion in a FIFO and pairs each `bestmove` with
//! the oldest one; completions for anything but the latest request are stale.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, warn};

use crate::error::EngineError;
use crate::protocol::{is_completion, parse_best_move, Depth, EngineCommand};

/// Anything that can deliver commands to an engine.
pub trait CommandSink {
    fn send(&self, cmd: &EngineCommand) -> Result<(), EngineError>;
}

/// Monotonically increasing id attached to every `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an engine line did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Not a completion, or a completion nobody asked for.
    Ignored,
    /// A completion for a request that has since been superseded.
    Stale(RequestId),
    /// The latest request completed; `best_move` is now recorded.
    BestMove { request: RequestId, best_move: String },
    /// The latest request completed without naming a move.
    NoMove(RequestId),
}

pub struct AnalysisSession<S> {
    sink: S,
    next_id: u64,
    latest: Option<RequestId>,
    in_flight: VecDeque<RequestId>,
    analyzing: bool,
    best_move: Option<String>,
}

impl<S: CommandSink> AnalysisSession<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            next_id: 0,
            latest: None,
            in_flight: VecDeque::new(),
            analyzing: false,
            best_move: None,
        }
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn best_move(&self) -> Option<&str> {
        self.best_move.as_deref()
    }

    pub fn latest_request(&self) -> Option<RequestId> {
        self.latest
    }

    /// Searches sent to the engine that have not produced a `bestmove` yet.
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Begin analysing `fen` to `depth`. Issued even while a previous search
    /// is running; the older search's completion will be dropped as stale.
    pub fn start(&mut self, fen: &str, depth: Depth) -> RequestId {
        self.next_id += 1;
        let id = RequestId(self.next_id);
        self.latest = Some(id);
        self.analyzing = true;
        self.best_move = None;

        let position = EngineCommand::Position {
            fen: fen.to_string(),
        };
        let sent = self
            .sink
            .send(&position)
            .and_then(|()| self.sink.send(&EngineCommand::GoDepth(depth)));
        match sent {
            Ok(()) => {
                self.in_flight.push_back(id);
                debug!(request = %id, %depth, fen, "Analysis started");
            }
            Err(e) => warn!(request = %id, "Failed to start analysis: {e}"),
        }
        id
    }

    /// Ask the engine to stop. Whether a completion still arrives is up to
    /// the engine; if it does, it is accepted for the latest request.
    pub fn stop(&mut self) {
        self.analyzing = false;
        if let Err(e) = self.sink.send(&EngineCommand::Stop) {
            warn!("Failed to stop analysis: {e}");
        }
    }

    /// Feed one line of engine output.
    ///
    /// Any `bestmove` line settles the oldest search in flight, even one
    /// carrying no move, so later completions stay paired with their requests.
    pub fn on_line(&mut self, line: &str) -> LineOutcome {
        if !is_completion(line) {
            return LineOutcome::Ignored;
        }

        let Some(id) = self.in_flight.pop_front() else {
            debug!(line, "Ignoring unsolicited completion");
            return LineOutcome::Ignored;
        };

        if Some(id) != self.latest {
            debug!(request = %id, line, "Dropping stale completion");
            return LineOutcome::Stale(id);
        }

        self.analyzing = false;
        match parse_best_move(line) {
            Some(best_move) => {
                self.best_move = Some(best_move.to_string());
                LineOutcome::BestMove {
                    request: id,
                    best_move: best_move.to_string(),
                }
            }
            None => {
                warn!(request = %id, line, "Completion carried no move");
                self.best_move = None;
                LineOutcome::NoMove(id)
            }
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Swap the command sink, e.g. once an engine finishes its handshake.
    /// Searches already sent to the old sink still count as in flight.
    pub fn set_sink(&mut self, sink: S) {
        self.sink = sink;
    }
}
