//! Pin detection by ray analysis from the king

use crate::attack::slides_along;
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::geometry::Direction;
use crate::piece::Movement;
use crate::types::{Color, Coord};

use arrayvec::ArrayVec;

/// Piece which cannot leave the line between its king and an enemy slider
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Pin {
    pub pinned: Coord,
    pub pinner: Coord,
    /// Squares the pinned piece may still move to: everything between the king and the pinner,
    /// and the pinner itself
    pub line: Bitboard,
}

/// All the pins against one king
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pins {
    pinned: Bitboard,
    pins: ArrayVec<Pin, { Direction::COUNT }>,
}

impl Pins {
    /// Finds the pieces of color `color` pinned against their king
    ///
    /// Walks every direction from the king. If the first piece met is an ally and the next one is
    /// an enemy sliding along this direction, the ally is pinned.
    pub fn find(board: &Board, color: Color) -> Pins {
        let king = board.king_pos(color);
        let mut res = Pins::default();
        for dir in Direction::ALL {
            let mut line = Bitboard::EMPTY;
            let mut candidate = None;
            for c in dir.ray(king) {
                line.set(c);
                let Some(p) = board.occupant(c) else {
                    continue;
                };
                if p.color() == color {
                    if candidate.is_some() {
                        break;
                    }
                    candidate = Some(c);
                    continue;
                }
                if let Some(pinned) = candidate {
                    if slides_along(p.kind(), dir) {
                        res.pinned.set(pinned);
                        res.pins.push(Pin {
                            pinned,
                            pinner: c,
                            line,
                        });
                    }
                }
                break;
            }
        }
        res
    }

    pub fn pinned(&self) -> Bitboard {
        self.pinned
    }

    pub fn is_pinned(&self, c: Coord) -> bool {
        self.pinned.has(c)
    }

    /// Returns the squares the piece on `c` may move to without breaking its pin
    ///
    /// Returns `None` if the piece is not pinned.
    pub fn line(&self, c: Coord) -> Option<Bitboard> {
        self.pins.iter().find(|p| p.pinned == c).map(|p| p.line)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pin> + '_ {
        self.pins.iter()
    }
}
