//! Records of committed moves

use crate::types::{CastlingSide, Color, Coord, PieceKind};

use std::fmt;

/// Check status of one side
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CheckState {
    /// The king is not threatened
    NotThreatened,
    /// The king is threatened, but the side has a move which resolves the threat
    Threatened,
    /// The king is threatened, and no move resolves the threat
    Checkmated,
}

impl CheckState {
    pub fn is_check(&self) -> bool {
        !matches!(self, CheckState::NotThreatened)
    }
}

/// Special kind of a move
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Special {
    Normal,
    Castle(CastlingSide),
    EnPassant,
    /// Pawn reached the last rank
    ///
    /// Holds `None` while the replacement piece hasn't been chosen yet.
    Promotion(Option<PieceKind>),
}

/// Description of a move accepted by the game
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MoveRecord {
    pub color: Color,
    pub piece: PieceKind,
    pub src: Coord,
    pub dst: Coord,
    /// Kind of the captured piece, if any
    pub capture: Option<PieceKind>,
    pub special: Special,
    /// Check status of the opponent after the move
    ///
    /// This is `None` for the intermediate record returned while a promotion is pending.
    pub check: Option<CheckState>,
}

impl MoveRecord {
    pub fn is_capture(&self) -> bool {
        self.capture.is_some()
    }

    /// Returns `true` if the move is complete (i.e. no promotion choice is outstanding)
    pub fn is_complete(&self) -> bool {
        !matches!(self.special, Special::Promotion(None))
    }
}

/// Formats the move in coordinate notation, like `e2e4`, `e7e8q` or `e1g1`
impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.src, self.dst)?;
        if let Special::Promotion(Some(kind)) = self.special {
            write!(f, "{}", kind.as_char().to_ascii_lowercase())?;
        }
        Ok(())
    }
}
