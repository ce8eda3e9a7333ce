//! The position shown on the board, replaced wholesale on every edit.

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Position, Role};
use tracing::{debug, warn};

use crate::error::PositionError;
use crate::moves::DragMove;

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Current board position plus the coordinate moves played since the last
/// manual FEN load. Always holds a valid position: rejected edits and illegal
/// moves leave it untouched.
#[derive(Debug, Clone)]
pub struct PositionState {
    position: Chess,
    fen: String,
    history: Vec<String>,
}

impl Default for PositionState {
    fn default() -> Self {
        Self::with_position(Chess::default())
    }
}

impl PositionState {
    pub fn from_fen(text: &str) -> Result<Self, PositionError> {
        parse_fen(text).map(Self::with_position)
    }

    fn with_position(position: Chess) -> Self {
        let fen = render_fen(&position);
        Self {
            position,
            fen,
            history: Vec::new(),
        }
    }

    pub fn fen(&self) -> &str {
        &self.fen
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn side_to_move(&self) -> Color {
        self.position.turn()
    }

    /// Moves applied since the position was last loaded, in UCI notation.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Replace the position with one parsed from `text`.
    /// On failure the previous position is kept and the error returned.
    pub fn load_from_notation(&mut self, text: &str) -> Result<&str, PositionError> {
        match parse_fen(text) {
            Ok(position) => {
                *self = Self::with_position(position);
                debug!(fen = %self.fen, "Loaded position");
                Ok(&self.fen)
            }
            Err(e) => {
                warn!(input = text, error = %e, "Rejected FEN edit");
                Err(e)
            }
        }
    }

    /// Play `mv` on the current position and return the resulting FEN.
    /// Illegal moves leave the position unchanged.
    pub fn apply_move(&mut self, mv: &DragMove) -> Result<&str, PositionError> {
        let legal = match to_legal_move(&self.position, mv) {
            Some(m) => m,
            None => {
                warn!(mv = %mv, fen = %self.fen, "Rejected illegal move");
                return Err(PositionError::IllegalMove(mv.to_string(), self.fen.clone()));
            }
        };

        let uci = legal.to_uci(CastlingMode::Standard).to_string();
        let next = self
            .position
            .clone()
            .play(legal)
            .map_err(|_| PositionError::IllegalMove(mv.to_string(), self.fen.clone()))?;

        self.position = next;
        self.fen = render_fen(&self.position);
        self.history.push(uci);
        debug!(fen = %self.fen, "Applied move");
        Ok(&self.fen)
    }
}

/// Resolve a dropped move against the legal moves of `pos`. A promotion
/// without an explicit piece falls back to a queen, and a promotion piece
/// attached to a non-promoting move is ignored.
fn to_legal_move(pos: &Chess, mv: &DragMove) -> Option<shakmaty::Move> {
    let as_uci = |promotion: Option<Role>| UciMove::Normal {
        from: mv.from,
        to: mv.to,
        promotion,
    };
    let fallback = match mv.promotion {
        None => Some(Role::Queen),
        Some(_) => None,
    };
    as_uci(mv.promotion)
        .to_move(pos)
        .or_else(|_| as_uci(fallback).to_move(pos))
        .ok()
}

fn parse_fen(text: &str) -> Result<Chess, PositionError> {
    let fen = Fen::from_ascii(text.trim().as_bytes())
        .map_err(|e| PositionError::InvalidFen(format!("{text:?}: {e}")))?;
    fen.into_position::<Chess>(CastlingMode::Standard)
        .map_err(|e| PositionError::InvalidFen(format!("{text:?}: {e}")))
}

fn render_fen(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}
