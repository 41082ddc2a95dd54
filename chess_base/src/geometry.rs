use crate::bitboard::Bitboard;
use crate::types::{CastlingSide, Color, Coord, File, Rank};

/// One of the eight directions a piece can look along
///
/// The four line directions are used by Rooks, the four diagonal quadrants by Bishops, and all
/// eight by Queens and Kings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Right = 0,
    Left = 1,
    Up = 2,
    Down = 3,
    /// Quadrant one, towards higher files and higher ranks
    UpRight = 4,
    /// Quadrant two, towards lower files and higher ranks
    UpLeft = 5,
    /// Quadrant three, towards lower files and lower ranks
    DownLeft = 6,
    /// Quadrant four, towards higher files and lower ranks
    DownRight = 7,
}

impl Direction {
    pub const COUNT: usize = 8;

    pub const LINES: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Up,
        Direction::Down,
    ];

    pub const DIAGONALS: [Direction; 4] = [
        Direction::UpRight,
        Direction::UpLeft,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    pub const ALL: [Direction; 8] = [
        Direction::Right,
        Direction::Left,
        Direction::Up,
        Direction::Down,
        Direction::UpRight,
        Direction::UpLeft,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    /// Returns `(delta_file, delta_rank)` for one step in this direction
    pub const fn delta(&self) -> (isize, isize) {
        match *self {
            Direction::Right => (1, 0),
            Direction::Left => (-1, 0),
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::UpRight => (1, 1),
            Direction::UpLeft => (-1, 1),
            Direction::DownLeft => (-1, -1),
            Direction::DownRight => (1, -1),
        }
    }

    pub const fn is_diagonal(&self) -> bool {
        (*self as u8) >= 4
    }

    pub const fn opposite(&self) -> Direction {
        match *self {
            Direction::Right => Direction::Left,
            Direction::Left => Direction::Right,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::UpRight => Direction::DownLeft,
            Direction::UpLeft => Direction::DownRight,
            Direction::DownLeft => Direction::UpRight,
            Direction::DownRight => Direction::UpLeft,
        }
    }

    /// Returns the direction leading from `src` to `dst` if they share a line or a diagonal
    pub fn between(src: Coord, dst: Coord) -> Option<Direction> {
        if src == dst {
            return None;
        }
        let df = dst.file().index() as isize - src.file().index() as isize;
        let dr = dst.rank().index() as isize - src.rank().index() as isize;
        if df != 0 && dr != 0 && df.abs() != dr.abs() {
            return None;
        }
        let step = (df.signum(), dr.signum());
        Direction::ALL.into_iter().find(|d| d.delta() == step)
    }

    /// Iterates over the squares along this direction starting next to `from`, until the edge
    pub fn ray(self, from: Coord) -> Ray {
        Ray {
            cur: from,
            dir: self,
        }
    }
}

pub struct Ray {
    cur: Coord,
    dir: Direction,
}

impl Iterator for Ray {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        let (df, dr) = self.dir.delta();
        self.cur = self.cur.try_shift(df, dr)?;
        Some(self.cur)
    }
}

/// Returns the squares strictly between `src` and `dst`
///
/// If the squares don't share a line or a diagonal, the result is empty.
pub fn squares_between(src: Coord, dst: Coord) -> Bitboard {
    match Direction::between(src, dst) {
        Some(dir) => dir.ray(src).take_while(|&c| c != dst).collect(),
        None => Bitboard::EMPTY,
    }
}

/// Knight jumps as `(delta_file, delta_rank)`
pub const KNIGHT_JUMPS: [(isize, isize); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub const fn castling_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R1,
        Color::Black => Rank::R8,
    }
}

pub const fn castling_rook_file(s: CastlingSide) -> File {
    match s {
        CastlingSide::King => File::H,
        CastlingSide::Queen => File::A,
    }
}

/// Files the King and the Rook land on after castling
pub const fn castling_dst_files(s: CastlingSide) -> (File, File) {
    match s {
        CastlingSide::King => (File::G, File::F),
        CastlingSide::Queen => (File::C, File::D),
    }
}

pub const fn pawn_forward(c: Color) -> isize {
    match c {
        Color::White => 1,
        Color::Black => -1,
    }
}

pub const fn pawn_start_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R2,
        Color::Black => Rank::R7,
    }
}

/// Returns the rank where a pawn of color `c` may capture en passant from
pub const fn enpassant_src_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R5,
        Color::Black => Rank::R4,
    }
}

pub const fn promote_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R8,
        Color::Black => Rank::R1,
    }
}
