//! Attack detection by scanning outwards from the target square
//!
//! Unlike the [`ThreatTable`](crate::threat::ThreatTable), these functions look only at the
//! current contents of the board, so they stay correct while a move is being tried out.

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::geometry::{self, Direction, KNIGHT_JUMPS};
use crate::piece::Movement;
use crate::types::{Color, Coord, PieceKind};

/// Returns `true` if a piece of kind `kind` slides along `dir`
pub(crate) fn slides_along(kind: PieceKind, dir: Direction) -> bool {
    match kind {
        PieceKind::Queen => true,
        PieceKind::Rook => !dir.is_diagonal(),
        PieceKind::Bishop => dir.is_diagonal(),
        _ => false,
    }
}

fn is_piece(board: &Board, coord: Coord, color: Color, kind: PieceKind) -> bool {
    board
        .occupant(coord)
        .map_or(false, |p| p.color() == color && p.kind() == kind)
}

/// Returns the squares of the pieces of color `by` that attack `coord`
pub fn attackers(board: &Board, coord: Coord, by: Color) -> Bitboard {
    let mut res = Bitboard::EMPTY;

    let back = -geometry::pawn_forward(by);
    for df in [-1, 1] {
        if let Some(c) = coord.try_shift(df, back) {
            if is_piece(board, c, by, PieceKind::Pawn) {
                res.set(c);
            }
        }
    }

    for (df, dr) in KNIGHT_JUMPS {
        if let Some(c) = coord.try_shift(df, dr) {
            if is_piece(board, c, by, PieceKind::Knight) {
                res.set(c);
            }
        }
    }

    for dir in Direction::ALL {
        let (df, dr) = dir.delta();
        if let Some(c) = coord.try_shift(df, dr) {
            if is_piece(board, c, by, PieceKind::King) {
                res.set(c);
            }
        }
        if let Some(p) = dir.ray(coord).find_map(|c| board.occupant(c)) {
            if p.color() == by && slides_along(p.kind(), dir) {
                res.set(p.coord());
            }
        }
    }

    res
}

/// Returns `true` if some piece of color `by` attacks `coord`
pub fn is_attacked(board: &Board, coord: Coord, by: Color) -> bool {
    attackers(board, coord, by).is_nonempty()
}

/// Returns `true` if the king of color `c` is attacked
pub fn is_king_attacked(board: &Board, c: Color) -> bool {
    is_attacked(board, board.king_pos(c), c.inv())
}
