//! Two-phase pawn promotion
//!
//! When a pawn reaches the last rank, the move is applied to the board, but the turn stays with
//! the moving side until the replacement piece is chosen. The pending state keeps the undo record,
//! so the move can still be taken back.

use crate::board::{Board, Undo};
use crate::error::MoveError;
use crate::moves::Move;
use crate::piece::Piece;
use crate::types::{Color, Coord, PieceKind};

/// Pawn move waiting for the promotion choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPromotion {
    mv: Move,
    capture: Option<PieceKind>,
    undo: Undo,
}

impl PendingPromotion {
    /// Marks the pawn which has just reached the last rank as promoting
    pub(crate) fn begin(
        board: &mut Board,
        mv: Move,
        capture: Option<PieceKind>,
        undo: Undo,
    ) -> PendingPromotion {
        if let Some(pawn) = board.occupant_mut(mv.dst()) {
            pawn.set_promoting(true);
        }
        PendingPromotion { mv, capture, undo }
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.mv.side()
    }

    /// Returns the square the pawn came from
    #[inline]
    pub fn src(&self) -> Coord {
        self.mv.src()
    }

    /// Returns the square on the last rank where the pawn waits
    #[inline]
    pub fn coord(&self) -> Coord {
        self.mv.dst()
    }

    /// Returns the kind of piece captured by the pawn move, if any
    #[inline]
    pub fn capture(&self) -> Option<PieceKind> {
        self.capture
    }

    #[inline]
    pub(crate) fn mv(&self) -> &Move {
        &self.mv
    }

    /// Replaces the waiting pawn with a piece of kind `kind`
    ///
    /// On error, the board is left untouched and the promotion stays pending.
    pub(crate) fn resolve(&self, board: &mut Board, kind: PieceKind) -> Result<(), MoveError> {
        if !kind.is_promotion_target() {
            return Err(MoveError::InvalidPromotion(kind));
        }
        let coord = self.coord();
        board.remove(coord);
        board.place(Piece::promoted(self.color(), kind, coord), coord, true);
        Ok(())
    }

    /// Takes the pawn move back
    pub(crate) fn abort(self, board: &mut Board) {
        board.unmake(self.undo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::{self, MoveKind};
    use crate::piece::Movement;

    fn c(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn start(board: &mut Board) -> PendingPromotion {
        let mv = Move::new(
            MoveKind::Simple,
            Color::White,
            PieceKind::Pawn,
            c("a7"),
            c("a8"),
        );
        assert!(mv.is_promotion());
        let undo = moves::make_move(board, &mv);
        PendingPromotion::begin(board, mv, None, undo)
    }

    #[test]
    fn test_resolve() {
        let mut board = Board::from_layout("4k3/P7/8/8/8/8/8/4K3").unwrap();
        let pending = start(&mut board);
        let pawn = board.occupant(c("a8")).unwrap().as_pawn().unwrap();
        assert!(pawn.is_promoting());
        assert_eq!(pending.coord(), c("a8"));
        assert_eq!(pending.src(), c("a7"));

        assert_eq!(
            pending.resolve(&mut board, PieceKind::King),
            Err(MoveError::InvalidPromotion(PieceKind::King))
        );
        assert_eq!(
            pending.resolve(&mut board, PieceKind::Pawn),
            Err(MoveError::InvalidPromotion(PieceKind::Pawn))
        );
        assert!(board.occupant(c("a8")).unwrap().as_pawn().is_some());

        pending.resolve(&mut board, PieceKind::Queen).unwrap();
        let queen = board.occupant(c("a8")).unwrap();
        assert_eq!(queen.kind(), PieceKind::Queen);
        assert_eq!(queen.color(), Color::White);
        assert_eq!(queen.coord(), c("a8"));
    }

    #[test]
    fn test_abort() {
        let mut board = Board::from_layout("4k3/P7/8/8/8/8/8/4K3").unwrap();
        let orig = board.clone();
        let pending = start(&mut board);
        pending.abort(&mut board);
        assert_eq!(board, orig);
    }
}
