//! The analyzer screen: board position, analysis session and depth field,
//! driven one event at a time.
//!
//! Everything here is a plain state transition. The socket task feeds client
//! events and engine lines in from a single loop, so nothing needs locking.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use chess_core::{DragMove, PositionState};
use engine_session::{AnalysisSession, CommandSink, Depth, LineOutcome};
use shakmaty::Color;

/// Client → server messages
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    LoadFen {
        fen: String,
    },
    DropPiece {
        from: String,
        to: String,
        promotion: Option<String>,
    },
    /// Number inputs can produce fractions; they are rounded before clamping.
    SetDepth {
        depth: f64,
    },
    StartAnalysis,
    StopAnalysis,
}

/// Server → client messages
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    State { view: ViewState },
    MoveRejected { from: String, to: String },
    Error { message: String },
}

/// Everything the page needs to render itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub fen: String,
    pub side_to_move: &'static str,
    pub history: Vec<String>,
    pub depth: u8,
    pub analyzing: bool,
    pub best_move: Option<String>,
    pub can_start: bool,
    pub can_stop: bool,
}

pub struct Screen<S> {
    position: PositionState,
    session: AnalysisSession<S>,
    depth: Depth,
}

impl<S: CommandSink> Screen<S> {
    pub fn new(sink: S, depth: Depth) -> Self {
        Self {
            position: PositionState::default(),
            session: AnalysisSession::new(sink),
            depth,
        }
    }

    /// Route analysis commands to `sink` from now on.
    pub fn attach_engine(&mut self, sink: S) {
        self.session.set_sink(sink);
    }

    pub fn view(&self) -> ViewState {
        let analyzing = self.session.is_analyzing();
        ViewState {
            fen: self.position.fen().to_string(),
            side_to_move: match self.position.side_to_move() {
                Color::White => "white",
                Color::Black => "black",
            },
            history: self.position.history().to_vec(),
            depth: self.depth.get(),
            analyzing,
            best_move: self.session.best_move().map(str::to_string),
            can_start: !analyzing,
            can_stop: analyzing,
        }
    }

    pub fn position(&self) -> &PositionState {
        &self.position
    }

    pub fn session(&self) -> &AnalysisSession<S> {
        &self.session
    }

    /// Apply one user interaction. Always ends with a fresh view so the page
    /// snaps back to the held state after a rejected edit.
    pub fn handle(&mut self, event: ClientEvent) -> Vec<ServerEvent> {
        let mut out = Vec::new();
        match event {
            ClientEvent::LoadFen { fen } => {
                // Rejection is already logged by the position state.
                let _ = self.position.load_from_notation(&fen);
            }
            ClientEvent::DropPiece {
                from,
                to,
                promotion,
            } => {
                let applied = DragMove::from_squares(&from, &to, promotion.as_deref())
                    .and_then(|mv| self.position.apply_move(&mv).map(|_| ()));
                if let Err(e) = applied {
                    warn!(%from, %to, "Drop rejected: {e}");
                    out.push(ServerEvent::MoveRejected { from, to });
                }
            }
            ClientEvent::SetDepth { depth } => {
                self.depth = Depth::clamped(depth.round() as i64);
            }
            ClientEvent::StartAnalysis => {
                let id = self
                    .session
                    .start(self.position.fen(), self.depth);
                info!(request = %id, depth = %self.depth, "Analysis requested");
            }
            ClientEvent::StopAnalysis => {
                self.session.stop();
                info!("Analysis stop requested");
            }
        }
        out.push(ServerEvent::State { view: self.view() });
        out
    }

    /// Feed one engine line. Returns a new view only when the line changed
    /// what the page shows.
    pub fn on_engine_line(&mut self, line: &str) -> Option<ServerEvent> {
        match self.session.on_line(line) {
            LineOutcome::BestMove { request, best_move } => {
                info!(%request, %best_move, "Analysis complete");
                Some(ServerEvent::State { view: self.view() })
            }
            LineOutcome::NoMove(request) => {
                info!(%request, "Analysis complete without a move");
                Some(ServerEvent::State { view: self.view() })
            }
            LineOutcome::Stale(_) | LineOutcome::Ignored => None,
        }
    }
}
