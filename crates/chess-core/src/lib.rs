//! Board state for the analyzer screen.
//!
//! Rules, FEN parsing and move legality all come from shakmaty; this crate only
//! keeps the currently displayed position and the moves dragged onto it.

pub mod error;
pub mod moves;
pub mod position;

pub use error::PositionError;
pub use moves::DragMove;
pub use position::{PositionState, STANDARD_START_FEN};
