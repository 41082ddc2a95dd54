//! Pieces and their movement rules
//!
//! Each kind of piece is a separate struct carrying its color, its square and the flags the
//! rules need (e.g. whether it has moved). [`Piece`] wraps them into a closed enum, and the
//! behavior that differs between kinds is dispatched through the [`Movement`] trait.

use crate::board::Board;
use crate::enpassant;
use crate::error::MoveError;
use crate::geometry::{self, Direction, KNIGHT_JUMPS};
use crate::moves::MoveKind;
use crate::threat::{self, Scan};
use crate::types::{Cell, Color, Coord, File, PieceKind};

/// Behavior which differs between kinds of pieces
pub trait Movement {
    fn kind(&self) -> PieceKind;

    fn color(&self) -> Color;

    fn coord(&self) -> Coord;

    /// Computes the threat set and the protection links of the piece from its current square
    fn scan(&self, board: &Board) -> Scan;

    /// Checks that moving to `dst` fits the movement rule of the piece and that nothing stands
    /// in the way
    ///
    /// Whether the move exposes the own king is not checked here.
    fn check_shape(&self, board: &Board, dst: Coord) -> Result<MoveKind, MoveError>;

    /// Updates the square the piece thinks it stands on
    fn relocate(&mut self, dst: Coord);
}

fn check_ray(
    board: &Board,
    src: Coord,
    dst: Coord,
    allowed: &[Direction],
) -> Result<MoveKind, MoveError> {
    let dir = Direction::between(src, dst)
        .filter(|d| allowed.contains(d))
        .ok_or(MoveError::IllegalShape)?;
    for c in dir.ray(src).take_while(|&c| c != dst) {
        if board.is_occupied(c) {
            return Err(MoveError::PathBlocked(c));
        }
    }
    Ok(MoveKind::Simple)
}

fn delta(src: Coord, dst: Coord) -> (isize, isize) {
    (
        dst.file().index() as isize - src.file().index() as isize,
        dst.rank().index() as isize - src.rank().index() as isize,
    )
}

macro_rules! impl_common {
    ($kind:expr) => {
        fn kind(&self) -> PieceKind {
            $kind
        }

        fn color(&self) -> Color {
            self.color
        }

        fn coord(&self) -> Coord {
            self.coord
        }

        fn relocate(&mut self, dst: Coord) {
            self.coord = dst;
        }
    };
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Pawn {
    color: Color,
    coord: Coord,
    moved: bool,
    double_step: bool,
    promoting: bool,
}

impl Pawn {
    pub fn has_moved(&self) -> bool {
        self.moved
    }

    /// Returns `true` if the last move of this pawn was a two-square advance
    pub fn did_double_step(&self) -> bool {
        self.double_step
    }

    /// Returns `true` while the pawn stands on the last rank waiting for its promotion choice
    pub fn is_promoting(&self) -> bool {
        self.promoting
    }

    fn forward(&self) -> isize {
        geometry::pawn_forward(self.color)
    }
}

impl Movement for Pawn {
    impl_common!(PieceKind::Pawn);

    fn scan(&self, board: &Board) -> Scan {
        let fwd = self.forward();
        let targets = [-1, 1]
            .into_iter()
            .filter_map(|df| self.coord.try_shift(df, fwd));
        threat::leap(board, self.coord, self.color, targets)
    }

    fn check_shape(&self, board: &Board, dst: Coord) -> Result<MoveKind, MoveError> {
        let (df, dr) = delta(self.coord, dst);
        let fwd = self.forward();
        match (df, dr) {
            (0, _) if dr == fwd || dr == 2 * fwd => {
                if dr == 2 * fwd {
                    if self.moved || self.coord.rank() != geometry::pawn_start_rank(self.color) {
                        return Err(MoveError::IllegalShape);
                    }
                    if let Some(mid) = self.coord.try_shift(0, fwd) {
                        if board.is_occupied(mid) {
                            return Err(MoveError::PathBlocked(mid));
                        }
                    }
                }
                match board.color_at(dst) {
                    Some(c) if c == self.color => Err(MoveError::DestinationOccupiedByAlly(dst)),
                    // Pawns never capture straight ahead
                    Some(_) => Err(MoveError::IllegalShape),
                    None if dr == 2 * fwd => Ok(MoveKind::PawnDouble),
                    None => Ok(MoveKind::Simple),
                }
            }
            (-1 | 1, _) if dr == fwd => {
                if board.is_occupied(dst) {
                    Ok(MoveKind::Simple)
                } else {
                    enpassant::check(board, self.color, self.coord, dst)
                }
            }
            _ => Err(MoveError::IllegalShape),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Knight {
    color: Color,
    coord: Coord,
}

impl Movement for Knight {
    impl_common!(PieceKind::Knight);

    fn scan(&self, board: &Board) -> Scan {
        let targets = KNIGHT_JUMPS
            .into_iter()
            .filter_map(|(df, dr)| self.coord.try_shift(df, dr));
        threat::leap(board, self.coord, self.color, targets)
    }

    fn check_shape(&self, _board: &Board, dst: Coord) -> Result<MoveKind, MoveError> {
        if KNIGHT_JUMPS.contains(&delta(self.coord, dst)) {
            Ok(MoveKind::Simple)
        } else {
            Err(MoveError::IllegalShape)
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Bishop {
    color: Color,
    coord: Coord,
}

impl Movement for Bishop {
    impl_common!(PieceKind::Bishop);

    fn scan(&self, board: &Board) -> Scan {
        threat::slide(board, self.coord, self.color, &Direction::DIAGONALS)
    }

    fn check_shape(&self, board: &Board, dst: Coord) -> Result<MoveKind, MoveError> {
        check_ray(board, self.coord, dst, &Direction::DIAGONALS)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rook {
    color: Color,
    coord: Coord,
    moved: bool,
}

impl Rook {
    pub fn has_moved(&self) -> bool {
        self.moved
    }
}

impl Movement for Rook {
    impl_common!(PieceKind::Rook);

    fn scan(&self, board: &Board) -> Scan {
        threat::slide(board, self.coord, self.color, &Direction::LINES)
    }

    fn check_shape(&self, board: &Board, dst: Coord) -> Result<MoveKind, MoveError> {
        check_ray(board, self.coord, dst, &Direction::LINES)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Queen {
    color: Color,
    coord: Coord,
}

impl Movement for Queen {
    impl_common!(PieceKind::Queen);

    fn scan(&self, board: &Board) -> Scan {
        let mut scan = threat::slide(board, self.coord, self.color, &Direction::LINES);
        scan.merge(threat::slide(
            board,
            self.coord,
            self.color,
            &Direction::DIAGONALS,
        ));
        scan
    }

    fn check_shape(&self, board: &Board, dst: Coord) -> Result<MoveKind, MoveError> {
        check_ray(board, self.coord, dst, &Direction::ALL)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct King {
    color: Color,
    coord: Coord,
    moved: bool,
    threatened_by: Option<Coord>,
}

impl King {
    pub fn has_moved(&self) -> bool {
        self.moved
    }

    pub fn is_threatened(&self) -> bool {
        self.threatened_by.is_some()
    }

    /// Returns the square of the piece that threatened the king most recently
    ///
    /// Only one threatening piece is remembered, even if there are several.
    pub fn threatened_by(&self) -> Option<Coord> {
        self.threatened_by
    }

    pub(crate) fn set_threat(&mut self, by: Option<Coord>) {
        self.threatened_by = by;
    }
}

impl Movement for King {
    impl_common!(PieceKind::King);

    fn scan(&self, board: &Board) -> Scan {
        let targets = Direction::ALL.into_iter().filter_map(|d| {
            let (df, dr) = d.delta();
            self.coord.try_shift(df, dr)
        });
        threat::leap(board, self.coord, self.color, targets)
    }

    fn check_shape(&self, _board: &Board, dst: Coord) -> Result<MoveKind, MoveError> {
        let (df, dr) = delta(self.coord, dst);
        if (df, dr) != (0, 0) && df.abs() <= 1 && dr.abs() <= 1 {
            Ok(MoveKind::Simple)
        } else {
            Err(MoveError::IllegalShape)
        }
    }
}

/// A chess piece standing on the board
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Piece {
    Pawn(Pawn),
    Knight(Knight),
    Bishop(Bishop),
    Rook(Rook),
    Queen(Queen),
    King(King),
}

impl Piece {
    /// Creates a piece which hasn't moved yet
    pub fn new(color: Color, kind: PieceKind, coord: Coord) -> Piece {
        match kind {
            PieceKind::Pawn => Piece::Pawn(Pawn {
                color,
                coord,
                moved: false,
                double_step: false,
                promoting: false,
            }),
            PieceKind::Knight => Piece::Knight(Knight { color, coord }),
            PieceKind::Bishop => Piece::Bishop(Bishop { color, coord }),
            PieceKind::Rook => Piece::Rook(Rook {
                color,
                coord,
                moved: false,
            }),
            PieceKind::Queen => Piece::Queen(Queen { color, coord }),
            PieceKind::King => Piece::King(King {
                color,
                coord,
                moved: false,
                threatened_by: None,
            }),
        }
    }

    /// Creates a piece that results from a promotion
    ///
    /// Such a piece counts as already moved, so a promoted rook can never castle.
    pub fn promoted(color: Color, kind: PieceKind, coord: Coord) -> Piece {
        let mut piece = Piece::new(color, kind, coord);
        piece.mark_moved(false);
        piece
    }

    fn movement(&self) -> &dyn Movement {
        match self {
            Piece::Pawn(p) => p,
            Piece::Knight(p) => p,
            Piece::Bishop(p) => p,
            Piece::Rook(p) => p,
            Piece::Queen(p) => p,
            Piece::King(p) => p,
        }
    }

    fn movement_mut(&mut self) -> &mut dyn Movement {
        match self {
            Piece::Pawn(p) => p,
            Piece::Knight(p) => p,
            Piece::Bishop(p) => p,
            Piece::Rook(p) => p,
            Piece::Queen(p) => p,
            Piece::King(p) => p,
        }
    }

    pub fn cell(&self) -> Cell {
        Cell::from_parts(self.color(), self.kind())
    }

    /// Returns `true` if the piece has moved in this game
    ///
    /// Knights, bishops and queens don't track this and always return `false`.
    pub fn has_moved(&self) -> bool {
        match self {
            Piece::Pawn(p) => p.moved,
            Piece::Rook(r) => r.moved,
            Piece::King(k) => k.moved,
            _ => false,
        }
    }

    pub fn as_king(&self) -> Option<&King> {
        match self {
            Piece::King(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_pawn(&self) -> Option<&Pawn> {
        match self {
            Piece::Pawn(p) => Some(p),
            _ => None,
        }
    }

    pub(crate) fn as_king_mut(&mut self) -> Option<&mut King> {
        match self {
            Piece::King(k) => Some(k),
            _ => None,
        }
    }

    pub(crate) fn mark_moved(&mut self, double_step: bool) {
        match self {
            Piece::Pawn(p) => {
                p.moved = true;
                p.double_step = double_step;
            }
            Piece::Rook(r) => r.moved = true,
            Piece::King(k) => k.moved = true,
            _ => {}
        }
    }

    pub(crate) fn clear_double_step(&mut self) {
        if let Piece::Pawn(p) = self {
            p.double_step = false;
        }
    }

    pub(crate) fn set_promoting(&mut self, value: bool) {
        if let Piece::Pawn(p) = self {
            p.promoting = value;
        }
    }

    /// Restores the first-move flags of a piece placed from a layout
    ///
    /// Pieces away from their starting squares are considered moved.
    pub(crate) fn infer_moved(&mut self) {
        let color = self.color();
        let home = geometry::castling_rank(color);
        let coord = self.coord();
        let moved = match self {
            Piece::Pawn(_) => coord.rank() != geometry::pawn_start_rank(color),
            Piece::Rook(_) => {
                coord.rank() != home
                    || !(coord.file() == File::A || coord.file() == File::H)
            }
            Piece::King(_) => coord != Coord::from_parts(File::E, home),
            _ => false,
        };
        if moved {
            self.mark_moved(false);
        }
    }
}

impl Movement for Piece {
    fn kind(&self) -> PieceKind {
        self.movement().kind()
    }

    fn color(&self) -> Color {
        self.movement().color()
    }

    fn coord(&self) -> Coord {
        self.movement().coord()
    }

    fn scan(&self, board: &Board) -> Scan {
        self.movement().scan(board)
    }

    fn check_shape(&self, board: &Board, dst: Coord) -> Result<MoveKind, MoveError> {
        self.movement().check_shape(board, dst)
    }

    fn relocate(&mut self, dst: Coord) {
        self.movement_mut().relocate(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rank;

    fn c(s: &str) -> Coord {
        s.parse().unwrap()
    }

    #[test]
    fn test_kinds() {
        for kind in PieceKind::ALL {
            let p = Piece::new(Color::Black, kind, c("d5"));
            assert_eq!(p.kind(), kind);
            assert_eq!(p.color(), Color::Black);
            assert_eq!(p.coord(), c("d5"));
            assert_eq!(p.cell(), Cell::from_parts(Color::Black, kind));
            assert!(!p.has_moved());
        }
    }

    #[test]
    fn test_relocate() {
        let mut p = Piece::new(Color::White, PieceKind::Rook, c("a1"));
        p.relocate(c("a5"));
        assert_eq!(p.coord(), c("a5"));
        assert!(!p.has_moved());
        p.mark_moved(false);
        assert!(p.has_moved());
    }

    #[test]
    fn test_promoted() {
        let p = Piece::promoted(Color::White, PieceKind::Rook, c("c8"));
        assert!(p.has_moved());
        let p = Piece::promoted(Color::White, PieceKind::Knight, c("c8"));
        assert_eq!(p.kind(), PieceKind::Knight);
    }

    #[test]
    fn test_infer_moved() {
        let cases = [
            (PieceKind::Pawn, Color::White, "e2", false),
            (PieceKind::Pawn, Color::White, "e3", true),
            (PieceKind::Pawn, Color::Black, "e7", false),
            (PieceKind::Rook, Color::White, "h1", false),
            (PieceKind::Rook, Color::White, "h2", true),
            (PieceKind::Rook, Color::Black, "a8", false),
            (PieceKind::Rook, Color::Black, "a1", true),
            (PieceKind::King, Color::Black, "e8", false),
            (PieceKind::King, Color::Black, "e7", true),
        ];
        for (kind, color, sq, moved) in cases {
            let mut p = Piece::new(color, kind, c(sq));
            p.infer_moved();
            assert_eq!(p.has_moved(), moved, "{} {:?} on {}", kind, color, sq);
        }
    }

    #[test]
    fn test_shapes() {
        let board = Board::from_layout("4k3/8/8/3p4/8/2N5/4P3/R3K2R").unwrap();
        let knight = board.occupant(Coord::from_parts(File::C, Rank::R3)).unwrap();
        assert_eq!(knight.check_shape(&board, c("d5")), Ok(MoveKind::Simple));
        assert_eq!(knight.check_shape(&board, c("c5")), Err(MoveError::IllegalShape));

        let rook = board.occupant(c("a1")).unwrap();
        assert_eq!(rook.check_shape(&board, c("a8")), Ok(MoveKind::Simple));
        assert_eq!(rook.check_shape(&board, c("d1")), Ok(MoveKind::Simple));
        assert_eq!(rook.check_shape(&board, c("f1")), Err(MoveError::PathBlocked(c("e1"))));
        assert_eq!(rook.check_shape(&board, c("b2")), Err(MoveError::IllegalShape));

        let king = board.occupant(c("e1")).unwrap();
        assert_eq!(king.check_shape(&board, c("d2")), Ok(MoveKind::Simple));
        assert_eq!(king.check_shape(&board, c("e3")), Err(MoveError::IllegalShape));
        assert_eq!(king.check_shape(&board, c("e1")), Err(MoveError::IllegalShape));
    }

    #[test]
    fn test_pawn_shapes() {
        let board = Board::from_layout("4k3/8/8/8/8/4p3/3PP3/4K3").unwrap();
        let d2 = board.occupant(c("d2")).unwrap();
        assert_eq!(d2.check_shape(&board, c("d3")), Ok(MoveKind::Simple));
        assert_eq!(d2.check_shape(&board, c("d4")), Ok(MoveKind::PawnDouble));
        assert_eq!(d2.check_shape(&board, c("e3")), Ok(MoveKind::Simple));
        assert_eq!(d2.check_shape(&board, c("d5")), Err(MoveError::IllegalShape));
        assert_eq!(d2.check_shape(&board, c("d1")), Err(MoveError::IllegalShape));
        assert_eq!(
            d2.check_shape(&board, c("c3")),
            Err(MoveError::NoEnPassantAvailable)
        );

        let e2 = board.occupant(c("e2")).unwrap();
        assert_eq!(e2.check_shape(&board, c("e3")), Err(MoveError::IllegalShape));
        assert_eq!(
            e2.check_shape(&board, c("e4")),
            Err(MoveError::PathBlocked(c("e3")))
        );
    }
}
