//! Castling preconditions

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::error::CastlingError;
use crate::geometry;
use crate::moves::Move;
use crate::piece::{Movement, Piece};
use crate::threat::ThreatTable;
use crate::types::{CastlingSide, Color, Coord, File};

use tracing::trace;

/// Returns the home squares of the king and of the rook
pub fn srcs(c: Color, s: CastlingSide) -> (Coord, Coord) {
    let rank = geometry::castling_rank(c);
    (
        Coord::from_parts(File::E, rank),
        Coord::from_parts(geometry::castling_rook_file(s), rank),
    )
}

/// Returns the squares that must be empty and not attacked for castling
///
/// These are the squares strictly between the king and the rook. The king's destination is
/// always among them.
pub fn pass(c: Color, s: CastlingSide) -> Bitboard {
    let (king, rook) = srcs(c, s);
    geometry::squares_between(king, rook)
}

/// Checks whether color `c` may castle to side `s` and returns the castling move
///
/// The checks follow the order: king on its home square and unmoved, rook in its corner and
/// unmoved, king not in check, path empty, path not attacked.
pub fn plan(
    board: &Board,
    threats: &ThreatTable,
    c: Color,
    s: CastlingSide,
) -> Result<Move, CastlingError> {
    let (king_src, rook_src) = srcs(c, s);

    match board.occupant(king_src) {
        Some(Piece::King(k)) if k.color() == c => {
            if k.has_moved() {
                return Err(CastlingError::KingMoved);
            }
        }
        _ => return Err(CastlingError::NotOnHomeSquare),
    }
    match board.occupant(rook_src) {
        Some(Piece::Rook(r)) if r.color() == c => {
            if r.has_moved() {
                return Err(CastlingError::RookMoved);
            }
        }
        _ => return Err(CastlingError::NoRook),
    }

    let attacked = threats.attacked_by(board, c.inv());
    if attacked.has(king_src) {
        return Err(CastlingError::KingInCheck);
    }
    let pass = pass(c, s);
    if let Some(blocker) = (pass & board.occupied()).first() {
        return Err(CastlingError::PathOccupied(blocker));
    }
    if let Some(hit) = (pass & attacked).first() {
        trace!(color = ?c, side = %s, square = %hit, "castling path attacked");
        return Err(CastlingError::PathAttacked(hit));
    }

    Ok(Move::from_castling(c, s))
}
