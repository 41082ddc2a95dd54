//! Board and related things

use crate::bitboard::Bitboard;
use crate::geometry;
use crate::piece::{Movement, Piece};
use crate::snapshot::Snapshot;
use crate::types::{self, Cell, Color, Coord, File, PieceKind, Rank};

use arrayvec::ArrayVec;
use thiserror::Error;

/// Board validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// Too many pieces of given color
    ///
    /// No more than 16 pieces of each color is allowed.
    #[error("too many pieces of color {0:?}")]
    TooManyPieces(Color),
    /// One of the sides doesn't have a king
    #[error("no king of color {0:?}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
    /// There is a pawn on the 1st or on the 8th rank
    #[error("invalid pawn position {0}")]
    InvalidPawn(Coord),
    /// The king of the side which doesn't move is under attack
    #[error("opponent's king is attacked")]
    OpponentKingAttacked,
}

/// Error parsing the piece placement of a layout
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CellsParseError {
    /// Rank is too large
    #[error("too many items in rank {0}")]
    RankOverflow(Rank),
    /// Rank is too small
    #[error("not enough items in rank {0}")]
    RankUnderflow(Rank),
    /// Too many ranks
    #[error("too many ranks")]
    Overflow,
    /// Not enough ranks
    #[error("not enough ranks")]
    Underflow,
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
}

/// Error parsing a layout
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum LayoutParseError {
    /// Layout contains non-ASCII characters
    #[error("non-ASCII data in layout")]
    NonAscii,
    /// Layout doesn't have the piece placement
    #[error("board not specified")]
    NoBoard,
    /// Error parsing the piece placement
    #[error("bad board: {0}")]
    Board(#[from] CellsParseError),
    /// Error parsing the side to move
    #[error("bad move side: {0}")]
    MoveSide(#[from] types::ColorParseError),
    /// Unexpected data after the side to move
    #[error("extra data in layout")]
    ExtraData,
    /// The layout doesn't describe a valid position
    #[error("invalid position: {0}")]
    Valid(#[from] ValidateError),
}

/// Saved contents of the squares touched by a tentative move
///
/// Applying the undo record with [`Board::unmake()`] restores the board exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Undo {
    cells: ArrayVec<(Coord, Option<Piece>), 6>,
    kings: [Coord; 2],
    ep_source: Option<Coord>,
}

/// Chess board
///
/// Each square holds at most one piece, and each piece knows the square it stands on. The board
/// always has exactly one king of each color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Piece>; 64],
    kings: [Coord; 2],
    ep_source: Option<Coord>,
}

fn parse_cells(s: &str) -> Result<[Cell; 64], CellsParseError> {
    type Error = CellsParseError;

    let mut file = 0_usize;
    let mut row = 0_usize;
    let mut cells = [Cell::EMPTY; 64];
    // Rows go from the 8th rank down to the 1st
    let rank_of = |row: usize| Rank::from_index(7 - row);
    for b in s.bytes() {
        match b {
            b'1'..=b'8' => {
                let add = (b - b'0') as usize;
                if file + add > 8 {
                    return Err(Error::RankOverflow(rank_of(row)));
                }
                file += add;
            }
            b'/' => {
                if file < 8 {
                    return Err(Error::RankUnderflow(rank_of(row)));
                }
                row += 1;
                file = 0;
                if row >= 8 {
                    return Err(Error::Overflow);
                }
            }
            _ => {
                if file >= 8 {
                    return Err(Error::RankOverflow(rank_of(row)));
                }
                let cell = Cell::from_char(b as char)
                    .filter(|c| c.is_occupied())
                    .ok_or(Error::UnexpectedChar(b as char))?;
                cells[Coord::from_parts(File::from_index(file), rank_of(row)).index()] = cell;
                file += 1;
            }
        };
    }

    if file < 8 {
        return Err(Error::RankUnderflow(rank_of(row)));
    }
    if row < 7 {
        return Err(Error::Underflow);
    }

    Ok(cells)
}

impl Board {
    /// Returns the initial position
    pub fn initial() -> Board {
        const BACK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut cells = [None; 64];
        for color in Color::ALL {
            let back = geometry::castling_rank(color);
            let pawns = geometry::pawn_start_rank(color);
            for (file, kind) in File::iter().zip(BACK) {
                let c = Coord::from_parts(file, back);
                cells[c.index()] = Some(Piece::new(color, kind, c));
                let c = Coord::from_parts(file, pawns);
                cells[c.index()] = Some(Piece::new(color, PieceKind::Pawn, c));
            }
        }
        Board {
            cells,
            kings: [
                Coord::from_parts(File::E, Rank::R1),
                Coord::from_parts(File::E, Rank::R8),
            ],
            ep_source: None,
        }
    }

    /// Creates a board from the piece placement part of a layout
    ///
    /// The placement lists the ranks from the 8th down to the 1st, separated by `/`. Pieces are
    /// denoted by letters (uppercase for White, lowercase for Black), and digits denote runs of
    /// empty squares.
    ///
    /// Pieces which stand away from their starting squares are considered moved, so they lose the
    /// first-move rights (castling, pawn double step).
    ///
    /// # Example
    ///
    /// ```
    /// # use threatboard::{Board, Color, Coord};
    /// #
    /// let board = Board::from_layout("4k3/8/8/8/8/8/8/4K2R").unwrap();
    /// assert_eq!(board.king_pos(Color::White), "e1".parse::<Coord>().unwrap());
    /// assert_eq!(board.occupied().len(), 3);
    /// ```
    pub fn from_layout(s: &str) -> Result<Board, LayoutParseError> {
        if !s.is_ascii() {
            return Err(LayoutParseError::NonAscii);
        }
        if s.is_empty() {
            return Err(LayoutParseError::NoBoard);
        }
        let cells = parse_cells(s)?;
        Ok(Board::try_from_cells(&cells)?)
    }

    fn try_from_cells(cells: &[Cell; 64]) -> Result<Board, ValidateError> {
        let mut counts = [0_usize; 2];
        let mut kings: [Option<Coord>; 2] = [None; 2];
        let mut board_cells = [None; 64];
        for coord in Coord::iter() {
            let cell = cells[coord.index()];
            let (Some(color), Some(kind)) = (cell.color(), cell.kind()) else {
                continue;
            };
            counts[color.index()] += 1;
            if kind == PieceKind::King {
                if kings[color.index()].is_some() {
                    return Err(ValidateError::TooManyKings(color));
                }
                kings[color.index()] = Some(coord);
            }
            if kind == PieceKind::Pawn && matches!(coord.rank(), Rank::R1 | Rank::R8) {
                return Err(ValidateError::InvalidPawn(coord));
            }
            let mut piece = Piece::new(color, kind, coord);
            piece.infer_moved();
            board_cells[coord.index()] = Some(piece);
        }

        for color in Color::ALL {
            if counts[color.index()] > 16 {
                return Err(ValidateError::TooManyPieces(color));
            }
        }
        let white = kings[0].ok_or(ValidateError::NoKing(Color::White))?;
        let black = kings[1].ok_or(ValidateError::NoKing(Color::Black))?;

        Ok(Board {
            cells: board_cells,
            kings: [white, black],
            ep_source: None,
        })
    }

    /// Returns the piece on `c`, if any
    #[inline]
    pub fn occupant(&self, c: Coord) -> Option<&Piece> {
        self.cells[c.index()].as_ref()
    }

    #[inline]
    pub(crate) fn occupant_mut(&mut self, c: Coord) -> Option<&mut Piece> {
        self.cells[c.index()].as_mut()
    }

    #[inline]
    pub fn is_occupied(&self, c: Coord) -> bool {
        self.cells[c.index()].is_some()
    }

    /// Returns the color of the piece on `c`, if any
    #[inline]
    pub fn color_at(&self, c: Coord) -> Option<Color> {
        self.occupant(c).map(|p| p.color())
    }

    /// Returns the contents of `c` packed into a [`Cell`]
    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        self.occupant(c).map_or(Cell::EMPTY, |p| p.cell())
    }

    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Cell {
        self.get(Coord::from_parts(file, rank))
    }

    /// Returns the position of the king of color `c`
    #[inline]
    pub fn king_pos(&self, c: Color) -> Coord {
        self.kings[c.index()]
    }

    /// Returns the square of the piece which threatens the king of color `c`
    ///
    /// This is updated by the game after each committed move.
    pub fn king_threat(&self, c: Color) -> Option<Coord> {
        self.occupant(self.king_pos(c))
            .and_then(Piece::as_king)
            .and_then(|k| k.threatened_by())
    }

    /// Returns the pawn that just made a double step and can be taken en passant
    #[inline]
    pub fn ep_source(&self) -> Option<Coord> {
        self.ep_source
    }

    /// Iterates over all the pieces on the board, from `a1` to `h8`
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.cells.iter().flatten()
    }

    /// Iterates over all the pieces of color `c`
    pub fn pieces_of(&self, c: Color) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces().filter(move |p| p.color() == c)
    }

    /// Returns the squares occupied by any piece
    pub fn occupied(&self) -> Bitboard {
        self.pieces().map(|p| p.coord()).collect()
    }

    /// Returns the squares occupied by the pieces of color `c`
    pub fn color_set(&self, c: Color) -> Bitboard {
        self.pieces_of(c).map(|p| p.coord()).collect()
    }

    /// Puts `piece` on `coord` and returns the piece which stood there before
    ///
    /// Unless `initial_setup` is set, the square the piece stood on is cleared first. The piece is
    /// relocated, but its move flags are left as they are.
    pub(crate) fn place(
        &mut self,
        mut piece: Piece,
        coord: Coord,
        initial_setup: bool,
    ) -> Option<Piece> {
        if !initial_setup {
            let prev = piece.coord();
            if self.get(prev) == piece.cell() {
                self.cells[prev.index()] = None;
            }
        }
        piece.relocate(coord);
        if piece.kind() == PieceKind::King {
            self.kings[piece.color().index()] = coord;
        }
        self.cells[coord.index()].replace(piece)
    }

    /// Removes the piece from `coord` and returns it
    ///
    /// Kings are never removed.
    pub(crate) fn remove(&mut self, coord: Coord) -> Option<Piece> {
        debug_assert!(
            self.occupant(coord).map(|p| p.kind()) != Some(PieceKind::King),
            "attempt to remove the king on {}",
            coord
        );
        self.cells[coord.index()].take()
    }

    /// Moves the piece from `src` to `dst`, marking it as moved
    ///
    /// Returns the piece captured on `dst`, if any.
    pub(crate) fn move_piece(
        &mut self,
        src: Coord,
        dst: Coord,
        double_step: bool,
    ) -> Option<Piece> {
        let mut piece = *self.occupant(src)?;
        piece.mark_moved(double_step);
        self.place(piece, dst, false)
    }

    pub(crate) fn set_ep_source(&mut self, ep_source: Option<Coord>) {
        self.ep_source = ep_source;
    }

    pub(crate) fn undo_point(&self) -> Undo {
        Undo {
            cells: ArrayVec::new(),
            kings: self.kings,
            ep_source: self.ep_source,
        }
    }

    /// Remembers the contents of `coord` in `undo`, unless it is already remembered
    pub(crate) fn save(&self, undo: &mut Undo, coord: Coord) {
        if undo.cells.iter().all(|(c, _)| *c != coord) {
            undo.cells.push((coord, self.cells[coord.index()]));
        }
    }

    pub(crate) fn unmake(&mut self, undo: Undo) {
        for (coord, piece) in undo.cells.into_iter().rev() {
            self.cells[coord.index()] = piece;
        }
        self.kings = undo.kings;
        self.ep_source = undo.ep_source;
    }

    /// Returns a read-only copy of the piece placement with `side` to move
    pub fn snapshot(&self, side: Color) -> Snapshot {
        let mut cells = [Cell::EMPTY; 64];
        for p in self.pieces() {
            cells[p.coord().index()] = p.cell();
        }
        Snapshot::new(cells, side)
    }

    #[cfg(feature = "selftest")]
    pub(crate) fn selftest(&self) {
        for coord in Coord::iter() {
            if let Some(p) = self.occupant(coord) {
                assert_eq!(p.coord(), coord, "piece on {} thinks it is elsewhere", coord);
            }
        }
        for color in Color::ALL {
            let king = self.king_pos(color);
            assert_eq!(self.get(king), Cell::from_parts(color, PieceKind::King));
            assert_eq!(
                self.pieces_of(color)
                    .filter(|p| p.kind() == PieceKind::King)
                    .count(),
                1
            );
        }
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::initial()
    }
}
