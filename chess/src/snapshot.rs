//! Read-only copies of the board for display

use crate::types::{Cell, Color, Coord, File, Rank};

use std::fmt::{self, Display};

/// Style for [`Snapshot::pretty()`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrettyStyle {
    /// Use only ASCII characters
    Ascii,
    /// Use Unicode chess symbols and box-drawing characters
    Utf8,
}

/// Piece placement and the side to move, detached from the game
///
/// The snapshot formats as a layout string, which [`Game::from_layout()`](crate::Game::from_layout)
/// accepts back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Snapshot {
    cells: [Cell; 64],
    side: Color,
}

impl Snapshot {
    pub(crate) fn new(cells: [Cell; 64], side: Color) -> Snapshot {
        Snapshot { cells, side }
    }

    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        self.cells[c.index()]
    }

    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Cell {
        self.get(Coord::from_parts(file, rank))
    }

    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    /// Wraps the snapshot to allow pretty-printing with the given style
    ///
    /// # Example
    ///
    /// ```
    /// # use threatboard::{Game, PrettyStyle};
    /// #
    /// let snap = Game::new().snapshot();
    ///
    /// let res = r#"
    /// 8|rnbqkbnr
    /// 7|pppppppp
    /// 6|........
    /// 5|........
    /// 4|........
    /// 3|........
    /// 2|PPPPPPPP
    /// 1|RNBQKBNR
    /// -+--------
    /// W|abcdefgh
    /// "#;
    /// assert_eq!(snap.pretty(PrettyStyle::Ascii).to_string().trim(), res.trim());
    /// ```
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty { snap: self, style }
    }

    /// Converts the snapshot into a layout string
    pub fn as_layout(&self) -> String {
        self.to_string()
    }
}

impl Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for (i, rank) in Rank::iter().rev().enumerate() {
            if i != 0 {
                write!(f, "/")?;
            }
            let mut empty = 0;
            for file in File::iter() {
                let cell = self.get2(file, rank);
                if cell.is_empty() {
                    empty += 1;
                    continue;
                }
                if empty != 0 {
                    write!(f, "{}", (b'0' + empty) as char)?;
                    empty = 0;
                }
                write!(f, "{}", cell)?;
            }
            if empty != 0 {
                write!(f, "{}", (b'0' + empty) as char)?;
            }
        }
        write!(f, " {}", self.side)
    }
}

trait StyleTable {
    const HORZ_FRAME: char;
    const VERT_FRAME: char;
    const ANGLE_FRAME: char;
    const WHITE_INDICATOR: char;
    const BLACK_INDICATOR: char;

    fn cell(c: Cell) -> char;

    fn indicator(c: Color) -> char {
        match c {
            Color::White => Self::WHITE_INDICATOR,
            Color::Black => Self::BLACK_INDICATOR,
        }
    }

    fn fmt(s: &Snapshot, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter().rev() {
            write!(f, "{}{}", rank, Self::VERT_FRAME)?;
            for file in File::iter() {
                write!(f, "{}", Self::cell(s.get2(file, rank)))?;
            }
            writeln!(f)?;
        }
        write!(f, "{}{}", Self::HORZ_FRAME, Self::ANGLE_FRAME)?;
        for _ in File::iter() {
            write!(f, "{}", Self::HORZ_FRAME)?;
        }
        writeln!(f)?;
        write!(f, "{}{}", Self::indicator(s.side), Self::VERT_FRAME)?;
        for file in File::iter() {
            write!(f, "{}", file)?;
        }
        writeln!(f)?;
        Ok(())
    }
}

struct AsciiStyleTable;
struct Utf8StyleTable;

impl StyleTable for AsciiStyleTable {
    const HORZ_FRAME: char = '-';
    const VERT_FRAME: char = '|';
    const ANGLE_FRAME: char = '+';
    const WHITE_INDICATOR: char = 'W';
    const BLACK_INDICATOR: char = 'B';

    fn cell(c: Cell) -> char {
        c.as_char()
    }
}

impl StyleTable for Utf8StyleTable {
    const HORZ_FRAME: char = '─';
    const VERT_FRAME: char = '│';
    const ANGLE_FRAME: char = '┼';
    const WHITE_INDICATOR: char = '○';
    const BLACK_INDICATOR: char = '●';

    fn cell(c: Cell) -> char {
        c.as_utf8_char()
    }
}

/// Wrapper to pretty-print a [`Snapshot`]
pub struct Pretty<'a> {
    snap: &'a Snapshot,
    style: PrettyStyle,
}

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.style {
            PrettyStyle::Ascii => AsciiStyleTable::fmt(self.snap, f),
            PrettyStyle::Utf8 => Utf8StyleTable::fmt(self.snap, f),
        }
    }
}
