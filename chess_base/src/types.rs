use std::fmt::{self, Display};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoordParseError {
    #[error("unexpected file char {0:?}")]
    UnexpectedFileChar(char),
    #[error("unexpected rank char {0:?}")]
    UnexpectedRankChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CellParseError {
    #[error("unexpected cell char {0:?}")]
    UnexpectedChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("unexpected color char {0:?}")]
    UnexpectedChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    pub const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub const fn try_from_index(val: usize) -> Option<Self> {
        if val < 8 {
            Some(Self::ALL[val])
        } else {
            None
        }
    }

    pub const fn from_index(val: usize) -> Self {
        assert!(val < 8, "file index must be between 0 and 7");
        Self::ALL[val]
    }

    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        Self::ALL.into_iter()
    }

    /// Accepts both `a`..`h` and `A`..`H`
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a'..='h' => Self::try_from_index((u32::from(c) - u32::from('a')) as usize),
            'A'..='H' => Self::try_from_index((u32::from(c) - u32::from('A')) as usize),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        (b'a' + *self as u8) as char
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum Rank {
    R1 = 0,
    R2 = 1,
    R3 = 2,
    R4 = 3,
    R5 = 4,
    R6 = 5,
    R7 = 6,
    R8 = 7,
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::R1,
        Rank::R2,
        Rank::R3,
        Rank::R4,
        Rank::R5,
        Rank::R6,
        Rank::R7,
        Rank::R8,
    ];

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub const fn try_from_index(val: usize) -> Option<Self> {
        if val < 8 {
            Some(Self::ALL[val])
        } else {
            None
        }
    }

    pub const fn from_index(val: usize) -> Self {
        assert!(val < 8, "rank index must be between 0 and 7");
        Self::ALL[val]
    }

    /// Iterates from [`Rank::R1`] up to [`Rank::R8`]
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        Self::ALL.into_iter()
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '1'..='8' => Self::try_from_index((u32::from(c) - u32::from('1')) as usize),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        (b'1' + *self as u8) as char
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

/// Square on the board
///
/// Coordinates are immutable file/rank pairs. The index is `rank * 8 + file`, so `a1` has
/// index 0 and `h8` has index 63.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord(u8);

impl Coord {
    pub const COUNT: usize = 64;

    pub const fn from_index(val: usize) -> Coord {
        assert!(val < 64, "coord must be between 0 and 63");
        Coord(val as u8)
    }

    pub const fn try_from_index(val: usize) -> Option<Coord> {
        if val < 64 {
            Some(Coord(val as u8))
        } else {
            None
        }
    }

    pub const fn from_parts(file: File, rank: Rank) -> Coord {
        Coord(((rank as u8) << 3) | file as u8)
    }

    /// Builds a coordinate from raw zero-based file and rank numbers, validating both
    pub const fn try_from_parts(file: usize, rank: usize) -> Option<Coord> {
        if file < 8 && rank < 8 {
            Some(Coord(((rank as u8) << 3) | file as u8))
        } else {
            None
        }
    }

    pub const fn file(&self) -> File {
        File::from_index((self.0 & 7) as usize)
    }

    pub const fn rank(&self) -> Rank {
        Rank::from_index((self.0 >> 3) as usize)
    }

    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Returns the color of the square itself, with `a1` being dark
    pub const fn square_color(&self) -> Color {
        if (self.file().index() + self.rank().index()) % 2 == 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    pub fn try_shift(self, delta_file: isize, delta_rank: isize) -> Option<Coord> {
        let new_file = self.file().index().checked_add_signed(delta_file)?;
        let new_rank = self.rank().index().checked_add_signed(delta_rank)?;
        Coord::try_from_parts(new_file, new_rank)
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0_u8..64_u8).map(Coord)
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if self.0 < 64 {
            return write!(f, "Coord({})", self);
        }
        write!(f, "Coord(?{:?})", self.0)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.file().as_char(), self.rank().as_char())
    }
}

impl FromStr for Coord {
    type Err = CoordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (file_ch, rank_ch) = match (chars.next(), chars.next(), chars.next()) {
            (Some(f), Some(r), None) => (f, r),
            _ => return Err(CoordParseError::BadLength),
        };
        Ok(Coord::from_parts(
            File::from_char(file_ch).ok_or(CoordParseError::UnexpectedFileChar(file_ch))?,
            Rank::from_char(rank_ch).ok_or(CoordParseError::UnexpectedRankChar(rank_ch))?,
        ))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    pub const fn inv(&self) -> Color {
        match *self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub fn as_char(&self) -> char {
        match *self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    pub fn from_char(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let ch = match (chars.next(), chars.next()) {
            (Some(ch), None) => ch,
            _ => return Err(ColorParseError::BadLength),
        };
        Color::from_char(ch).ok_or(ColorParseError::UnexpectedChar(ch))
    }
}

/// Kind of a chess piece, without color
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    pub const COUNT: usize = 6;

    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    /// Returns `true` for pieces which move along rays (Bishop, Rook and Queen)
    pub const fn is_sliding(&self) -> bool {
        matches!(
            *self,
            PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        )
    }

    /// Returns `true` if a Pawn may be promoted into this kind
    pub const fn is_promotion_target(&self) -> bool {
        matches!(
            *self,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        )
    }

    pub fn as_char(&self) -> char {
        b"PNBRQK"[self.index()] as char
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            PieceKind::Pawn => "pawn",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Rook => "rook",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
        }
    }
}

impl Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.name())
    }
}

/// Contents of a single square: either empty or a colored piece kind
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Cell(u8);

impl Cell {
    pub const EMPTY: Cell = Cell(0);
    pub const COUNT: usize = 13;

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_occupied(&self) -> bool {
        self.0 != 0
    }

    pub const fn from_index(val: usize) -> Cell {
        assert!(val < Self::COUNT, "index too large");
        Cell(val as u8)
    }

    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    pub const fn from_parts(c: Color, p: PieceKind) -> Cell {
        Cell(match c {
            Color::White => 1 + p as u8,
            Color::Black => 7 + p as u8,
        })
    }

    pub const fn color(&self) -> Option<Color> {
        match self.0 {
            0 => None,
            1..=6 => Some(Color::White),
            _ => Some(Color::Black),
        }
    }

    pub const fn kind(&self) -> Option<PieceKind> {
        match self.0 {
            0 => None,
            x => Some(PieceKind::ALL[((x - 1) % 6) as usize]),
        }
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).map(Cell::from_index)
    }

    pub fn as_char(&self) -> char {
        b".PNBRQKpnbrqk"[self.0 as usize] as char
    }

    pub fn as_utf8_char(&self) -> char {
        [
            '.', '♙', '♘', '♗', '♖', '♕', '♔', '♟', '♞', '♝', '♜', '♛', '♚',
        ][self.0 as usize]
    }

    pub fn from_char(c: char) -> Option<Self> {
        if c == '.' {
            return Some(Cell::EMPTY);
        }
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Cell::from_parts(color, PieceKind::from_char(c)?))
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if (self.0 as usize) < Self::COUNT {
            return write!(f, "Cell({})", self.as_char());
        }
        write!(f, "Cell(?{:?})", self.0)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Cell {
    type Err = CellParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let ch = match (chars.next(), chars.next()) {
            (Some(ch), None) => ch,
            _ => return Err(CellParseError::BadLength),
        };
        Cell::from_char(ch).ok_or(CellParseError::UnexpectedChar(ch))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CastlingSide {
    Queen = 0,
    King = 1,
}

impl Display for CastlingSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            CastlingSide::Queen => write!(f, "queenside"),
            CastlingSide::King => write!(f, "kingside"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WinReason {
    Checkmate,
    Forfeit,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DrawReason {
    Stalemate,
    Agreement,
}

/// Final result of a game
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win { side: Color, reason: WinReason },
    Draw(DrawReason),
}

impl Outcome {
    pub fn winner(&self) -> Option<Color> {
        match self {
            Self::Win { side, .. } => Some(*side),
            Self::Draw(_) => None,
        }
    }

    pub fn win(side: Color, reason: WinReason) -> Outcome {
        Self::Win { side, reason }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Self::Win { side, reason } => {
                let how = match reason {
                    WinReason::Checkmate => "checkmate",
                    WinReason::Forfeit => "opponent forfeits",
                };
                write!(f, "{} wins by {}", side.name(), how)
            }
            Self::Draw(DrawReason::Stalemate) => write!(f, "draw by stalemate"),
            Self::Draw(DrawReason::Agreement) => write!(f, "draw by agreement"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file() {
        for (idx, file) in File::iter().enumerate() {
            assert_eq!(file.index(), idx);
            assert_eq!(File::from_index(idx), file);
        }
        assert_eq!(File::try_from_index(8), None);
        assert_eq!(File::from_char('C'), Some(File::C));
        assert_eq!(File::from_char('i'), None);
    }

    #[test]
    fn test_rank() {
        for (idx, rank) in Rank::iter().enumerate() {
            assert_eq!(rank.index(), idx);
            assert_eq!(Rank::from_index(idx), rank);
        }
        assert_eq!(Rank::from_char('1'), Some(Rank::R1));
        assert_eq!(Rank::from_char('9'), None);
    }

    #[test]
    fn test_coord() {
        let mut coords = Vec::new();
        for rank in Rank::iter() {
            for file in File::iter() {
                let coord = Coord::from_parts(file, rank);
                assert_eq!(coord.file(), file);
                assert_eq!(coord.rank(), rank);
                coords.push(coord);
            }
        }
        assert_eq!(coords, Coord::iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_coord_bounds() {
        let a1 = Coord::from_parts(File::A, Rank::R1);
        assert_eq!(a1.try_shift(-1, 0), None);
        assert_eq!(a1.try_shift(0, -1), None);
        assert_eq!(
            a1.try_shift(1, 2),
            Some(Coord::from_parts(File::B, Rank::R3))
        );
        let h8 = Coord::from_parts(File::H, Rank::R8);
        assert_eq!(h8.try_shift(1, 0), None);
        assert_eq!(h8.try_shift(0, 1), None);
        assert_eq!(Coord::try_from_parts(8, 0), None);
        assert_eq!(Coord::try_from_index(64), None);
    }

    #[test]
    fn test_square_color() {
        assert_eq!(Coord::from_parts(File::A, Rank::R1).square_color(), Color::Black);
        assert_eq!(Coord::from_parts(File::H, Rank::R1).square_color(), Color::White);
        assert_eq!(Coord::from_parts(File::D, Rank::R1).square_color(), Color::White);
        assert_eq!(Coord::from_parts(File::E, Rank::R1).square_color(), Color::Black);
        assert_eq!(Coord::from_parts(File::H, Rank::R8).square_color(), Color::Black);
    }

    #[test]
    fn test_cell() {
        assert_eq!(Cell::EMPTY.color(), None);
        assert_eq!(Cell::EMPTY.kind(), None);
        let mut cells = vec![Cell::EMPTY];
        for color in Color::ALL {
            for kind in PieceKind::ALL {
                let cell = Cell::from_parts(color, kind);
                assert_eq!(cell.color(), Some(color));
                assert_eq!(cell.kind(), Some(kind));
                cells.push(cell);
            }
        }
        assert_eq!(cells, Cell::iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_coord_str() {
        assert_eq!(Coord::from_parts(File::B, Rank::R4).to_string(), "b4");
        assert_eq!(Coord::from_parts(File::A, Rank::R1).to_string(), "a1");
        assert_eq!(
            Coord::from_str("a1"),
            Ok(Coord::from_parts(File::A, Rank::R1))
        );
        assert_eq!(
            Coord::from_str("E4"),
            Ok(Coord::from_parts(File::E, Rank::R4))
        );
        assert_eq!(
            Coord::from_str("h9"),
            Err(CoordParseError::UnexpectedRankChar('9'))
        );
        assert_eq!(
            Coord::from_str("i4"),
            Err(CoordParseError::UnexpectedFileChar('i'))
        );
        assert_eq!(Coord::from_str("a10"), Err(CoordParseError::BadLength));
    }

    #[test]
    fn test_cell_str() {
        for cell in Cell::iter() {
            let s = cell.to_string();
            assert_eq!(Cell::from_str(&s), Ok(cell));
        }
        assert_eq!(Cell::from_str("x"), Err(CellParseError::UnexpectedChar('x')));
    }

    #[test]
    fn test_outcome() {
        let win = Outcome::win(Color::White, WinReason::Checkmate);
        assert_eq!(win.winner(), Some(Color::White));
        assert_eq!(win.to_string(), "White wins by checkmate");
        assert_eq!(Outcome::Draw(DrawReason::Agreement).winner(), None);
    }
}
