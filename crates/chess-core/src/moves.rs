//! Coordinate moves as produced by a piece drop on the board.

use std::fmt;
use std::str::FromStr;

use shakmaty::{Role, Square};

use crate::error::PositionError;

/// A move expressed as source and destination squares, plus an optional
/// promotion piece. A missing promotion on a promoting pawn move means queen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl DragMove {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, role: Role) -> Self {
        self.promotion = Some(role);
        self
    }

    /// Build a move from the square names the board reports on a drop
    /// (e.g. `"e2"`, `"e4"`) and an optional promotion letter (`"q"`, `"n"`, ...).
    pub fn from_squares(
        from: &str,
        to: &str,
        promotion: Option<&str>,
    ) -> Result<Self, PositionError> {
        let mv = Self::new(parse_square(from)?, parse_square(to)?);
        match promotion.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => Ok(mv.with_promotion(parse_promotion(p)?)),
            None => Ok(mv),
        }
    }
}

impl FromStr for DragMove {
    type Err = PositionError;

    /// Parse long algebraic coordinates: `e2e4`, `e7e8q`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(PositionError::InvalidMove(s.to_string()));
        }
        let promotion = if s.len() == 5 { Some(&s[4..]) } else { None };
        Self::from_squares(&s[0..2], &s[2..4], promotion)
    }
}

impl fmt::Display for DragMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

fn parse_square(s: &str) -> Result<Square, PositionError> {
    s.trim()
        .parse::<Square>()
        .map_err(|_| PositionError::InvalidSquare(s.to_string()))
}

fn parse_promotion(s: &str) -> Result<Role, PositionError> {
    let mut chars = s.chars();
    let role = match (chars.next(), chars.next()) {
        (Some(c), None) => Role::from_char(c.to_ascii_lowercase()),
        _ => None,
    };
    match role {
        Some(r @ (Role::Queen | Role::Rook | Role::Bishop | Role::Knight)) => Ok(r),
        _ => Err(PositionError::InvalidMove(format!("bad promotion piece: {s}"))),
    }
}
