//! Planned moves and applying them to the board

use crate::bitboard::Bitboard;
use crate::board::{Board, Undo};
use crate::geometry;
use crate::types::{CastlingSide, Color, Coord, File, PieceKind};

/// Move kind
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Move or capture which relocates a single piece (except castling and en passant)
    Simple,
    /// Double pawn advance from the start rank
    PawnDouble,
    /// Pawn capture of a pawn which has just made a double advance
    Enpassant,
    /// Kingside castling
    CastlingKingside,
    /// Queenside castling
    CastlingQueenside,
}

impl From<CastlingSide> for MoveKind {
    #[inline]
    fn from(side: CastlingSide) -> Self {
        match side {
            CastlingSide::King => Self::CastlingKingside,
            CastlingSide::Queen => Self::CastlingQueenside,
        }
    }
}

impl TryFrom<MoveKind> for CastlingSide {
    type Error = ();

    #[inline]
    fn try_from(kind: MoveKind) -> Result<Self, Self::Error> {
        match kind {
            MoveKind::CastlingKingside => Ok(Self::King),
            MoveKind::CastlingQueenside => Ok(Self::Queen),
            _ => Err(()),
        }
    }
}

/// Move which passed the shape checks and is about to be applied
///
/// For castling, `src` and `dst` are the squares of the king.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    kind: MoveKind,
    side: Color,
    piece: PieceKind,
    src: Coord,
    dst: Coord,
}

impl Move {
    pub(crate) fn new(
        kind: MoveKind,
        side: Color,
        piece: PieceKind,
        src: Coord,
        dst: Coord,
    ) -> Move {
        Move {
            kind,
            side,
            piece,
            src,
            dst,
        }
    }

    /// Creates a castling move of color `c`
    pub fn from_castling(c: Color, side: CastlingSide) -> Move {
        let rank = geometry::castling_rank(c);
        let (king_file, _) = geometry::castling_dst_files(side);
        Move {
            kind: side.into(),
            side: c,
            piece: PieceKind::King,
            src: Coord::from_parts(File::E, rank),
            dst: Coord::from_parts(king_file, rank),
        }
    }

    #[inline]
    pub fn kind(&self) -> MoveKind {
        self.kind
    }

    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    #[inline]
    pub fn piece(&self) -> PieceKind {
        self.piece
    }

    #[inline]
    pub fn src(&self) -> Coord {
        self.src
    }

    #[inline]
    pub fn dst(&self) -> Coord {
        self.dst
    }

    /// Returns the square of the pawn taken en passant
    pub fn enpassant_taken(&self) -> Option<Coord> {
        match self.kind {
            MoveKind::Enpassant => Some(Coord::from_parts(self.dst.file(), self.src.rank())),
            _ => None,
        }
    }

    /// Returns the source and the destination of the rook for castling moves
    pub fn rook_squares(&self) -> Option<(Coord, Coord)> {
        let side = CastlingSide::try_from(self.kind).ok()?;
        let rank = geometry::castling_rank(self.side);
        let (_, rook_file) = geometry::castling_dst_files(side);
        Some((
            Coord::from_parts(geometry::castling_rook_file(side), rank),
            Coord::from_parts(rook_file, rank),
        ))
    }

    /// Returns `true` if the move brings a pawn to the last rank
    pub fn is_promotion(&self) -> bool {
        self.piece == PieceKind::Pawn && self.dst.rank() == geometry::promote_rank(self.side)
    }

    /// Returns all the squares whose contents are changed by the move
    pub fn changed(&self) -> Bitboard {
        let mut res = Bitboard::EMPTY.with(self.src).with(self.dst);
        if let Some(taken) = self.enpassant_taken() {
            res.set(taken);
        }
        if let Some((rook_src, rook_dst)) = self.rook_squares() {
            res.set(rook_src);
            res.set(rook_dst);
        }
        res
    }
}

/// Applies the move to the board without any legality checks
///
/// The move must come from the validator, so all the pieces it refers to are in place.
pub(crate) fn make_move(board: &mut Board, mv: &Move) -> Undo {
    let mut undo = board.undo_point();

    if let Some(prev) = board.ep_source() {
        board.save(&mut undo, prev);
        if let Some(p) = board.occupant_mut(prev) {
            p.clear_double_step();
        }
    }

    match mv.kind {
        MoveKind::Simple | MoveKind::PawnDouble => {
            board.save(&mut undo, mv.src);
            board.save(&mut undo, mv.dst);
            board.move_piece(mv.src, mv.dst, mv.kind == MoveKind::PawnDouble);
        }
        MoveKind::Enpassant => {
            let taken = Coord::from_parts(mv.dst.file(), mv.src.rank());
            board.save(&mut undo, mv.src);
            board.save(&mut undo, mv.dst);
            board.save(&mut undo, taken);
            board.remove(taken);
            board.move_piece(mv.src, mv.dst, false);
        }
        MoveKind::CastlingKingside | MoveKind::CastlingQueenside => {
            board.save(&mut undo, mv.src);
            board.save(&mut undo, mv.dst);
            if let Some((rook_src, rook_dst)) = mv.rook_squares() {
                board.save(&mut undo, rook_src);
                board.save(&mut undo, rook_dst);
                board.move_piece(mv.src, mv.dst, false);
                board.move_piece(rook_src, rook_dst, false);
            }
        }
    }

    board.set_ep_source(match mv.kind {
        MoveKind::PawnDouble => Some(mv.dst),
        _ => None,
    });
    undo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Movement;

    fn c(s: &str) -> Coord {
        s.parse().unwrap()
    }

    #[test]
    fn test_castling_squares() {
        let mv = Move::from_castling(Color::White, CastlingSide::King);
        assert_eq!((mv.src(), mv.dst()), (c("e1"), c("g1")));
        assert_eq!(mv.rook_squares(), Some((c("h1"), c("f1"))));
        let mv = Move::from_castling(Color::Black, CastlingSide::Queen);
        assert_eq!((mv.src(), mv.dst()), (c("e8"), c("c8")));
        assert_eq!(mv.rook_squares(), Some((c("a8"), c("d8"))));
        assert_eq!(mv.changed().len(), 4);
    }

    #[test]
    fn test_make_unmake() {
        let mut board = Board::initial();
        let orig = board.clone();

        let mv = Move::new(MoveKind::PawnDouble, Color::White, PieceKind::Pawn, c("e2"), c("e4"));
        let undo = make_move(&mut board, &mv);
        assert_eq!(board.ep_source(), Some(c("e4")));
        let pawn = board.occupant(c("e4")).unwrap().as_pawn().unwrap();
        assert!(pawn.has_moved());
        assert!(pawn.did_double_step());
        assert!(!board.is_occupied(c("e2")));

        board.unmake(undo);
        assert_eq!(board, orig);
    }

    #[test]
    fn test_enpassant() {
        let mut board = Board::from_layout("4k3/3p4/8/4P3/8/8/8/4K3").unwrap();
        let double = Move::new(MoveKind::PawnDouble, Color::Black, PieceKind::Pawn, c("d7"), c("d5"));
        make_move(&mut board, &double);
        let before = board.clone();

        let ep = Move::new(MoveKind::Enpassant, Color::White, PieceKind::Pawn, c("e5"), c("d6"));
        assert_eq!(ep.enpassant_taken(), Some(c("d5")));
        let undo = make_move(&mut board, &ep);
        assert!(!board.is_occupied(c("d5")));
        assert!(!board.is_occupied(c("e5")));
        assert_eq!(board.occupant(c("d6")).unwrap().kind(), PieceKind::Pawn);
        assert_eq!(board.ep_source(), None);

        board.unmake(undo);
        assert_eq!(board, before);
        assert!(board
            .occupant(c("d5"))
            .and_then(|p| p.as_pawn())
            .unwrap()
            .did_double_step());
    }

    #[test]
    fn test_castling() {
        let mut board = Board::from_layout("4k3/8/8/8/8/8/8/R3K2R").unwrap();
        let orig = board.clone();
        let mv = Move::from_castling(Color::White, CastlingSide::Queen);
        let undo = make_move(&mut board, &mv);
        assert_eq!(board.king_pos(Color::White), c("c1"));
        assert_eq!(board.occupant(c("d1")).unwrap().kind(), PieceKind::Rook);
        assert!(board.occupant(c("d1")).unwrap().has_moved());
        assert!(!board.is_occupied(c("a1")));
        assert!(!board.is_occupied(c("e1")));

        board.unmake(undo);
        assert_eq!(board, orig);
    }
}
