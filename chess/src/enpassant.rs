//! En passant eligibility
//!
//! A pawn that has just advanced two squares may be taken by an enemy pawn standing beside it,
//! as if it had advanced only one square. The right lasts for the very next move only: the board
//! forgets the double step as soon as any other move is made.

use crate::board::Board;
use crate::error::MoveError;
use crate::geometry;
use crate::moves::MoveKind;
use crate::piece::{Movement, Piece};
use crate::types::{Color, Coord};

/// Returns the pawn which can be taken en passant, if any
pub fn source(board: &Board) -> Option<Coord> {
    let src = board.ep_source()?;
    match board.occupant(src) {
        Some(Piece::Pawn(p)) if p.did_double_step() => Some(src),
        _ => None,
    }
}

/// Returns the square a capturing pawn lands on, if en passant is available
pub fn target(board: &Board) -> Option<Coord> {
    let src = source(board)?;
    let color = board.color_at(src)?;
    src.try_shift(0, -geometry::pawn_forward(color))
}

/// Checks a diagonal step of a pawn of color `color` from `src` onto the empty square `dst`
pub(crate) fn check(
    board: &Board,
    color: Color,
    src: Coord,
    dst: Coord,
) -> Result<MoveKind, MoveError> {
    if src.rank() != geometry::enpassant_src_rank(color) {
        return Err(MoveError::NoEnPassantAvailable);
    }
    let taken = Coord::from_parts(dst.file(), src.rank());
    match source(board) {
        Some(s) if s == taken && board.color_at(s) == Some(color.inv()) => Ok(MoveKind::Enpassant),
        _ => Err(MoveError::NoEnPassantAvailable),
    }
}
