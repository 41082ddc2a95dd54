//! Threat sets and protection links
//!
//! For every piece on the board, the [`ThreatTable`] keeps the set of squares the piece attacks
//! (its _threat set_) and the list of allied pieces it protects. Both are recomputed after each
//! committed move, either for every piece or only for the pieces affected by the move.

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::geometry::Direction;
use crate::piece::Movement;
use crate::types::{Color, Coord, PieceKind};

use arrayvec::ArrayVec;
use std::ops::Deref;
use tracing::trace;

/// Records that `protector` would be able to recapture on `protected`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ProtectionLink {
    pub protector: Coord,
    pub protected: Coord,
    /// Direction in which a sliding protector looks at the protected piece
    ///
    /// Knights, kings and pawns don't slide, so their links carry no direction.
    pub direction: Option<Direction>,
}

/// Protection links established by a single piece
///
/// A piece can protect at most one ally per direction or per jump, so there are never more than
/// eight links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Protections(ArrayVec<ProtectionLink, { Direction::COUNT }>);

impl Protections {
    fn push(&mut self, link: ProtectionLink) {
        debug_assert!(!self.0.iter().any(|l| l.protected == link.protected));
        self.0.push(link);
    }

    /// Returns the squares of the protected pieces
    pub fn targets(&self) -> Bitboard {
        self.0.iter().map(|l| l.protected).collect()
    }

    pub fn protects(&self, coord: Coord) -> bool {
        self.0.iter().any(|l| l.protected == coord)
    }
}

impl Deref for Protections {
    type Target = [ProtectionLink];

    fn deref(&self) -> &[ProtectionLink] {
        &self.0
    }
}

/// Result of scanning the board from a single piece
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    pub threats: Bitboard,
    pub links: Protections,
}

impl Scan {
    /// Unites two scans of the same piece made along disjoint sets of directions
    pub fn merge(&mut self, other: Scan) {
        self.threats |= other.threats;
        for link in other.links.0 {
            self.links.push(link);
        }
    }
}

/// Scans along `dirs` from `from` for a sliding piece of color `color`
///
/// Each ray stops at the first ally, which becomes protected, or at the first enemy, which is
/// threatened. The enemy king doesn't stop the ray, so the squares behind it stay threatened.
pub(crate) fn slide(board: &Board, from: Coord, color: Color, dirs: &[Direction]) -> Scan {
    let mut scan = Scan::default();
    for &dir in dirs {
        for to in dir.ray(from) {
            match board.occupant(to) {
                None => scan.threats.set(to),
                Some(p) if p.color() == color => {
                    scan.links.push(ProtectionLink {
                        protector: from,
                        protected: to,
                        direction: Some(dir),
                    });
                    break;
                }
                Some(p) if p.kind() == PieceKind::King => scan.threats.set(to),
                Some(_) => {
                    scan.threats.set(to);
                    break;
                }
            }
        }
    }
    scan
}

/// Scans the given target squares for a non-sliding piece of color `color`
pub(crate) fn leap(
    board: &Board,
    from: Coord,
    color: Color,
    targets: impl Iterator<Item = Coord>,
) -> Scan {
    let mut scan = Scan::default();
    for to in targets {
        match board.color_at(to) {
            Some(c) if c == color => scan.links.push(ProtectionLink {
                protector: from,
                protected: to,
                direction: None,
            }),
            _ => scan.threats.set(to),
        }
    }
    scan
}

/// Threat sets and protection links of all the pieces, indexed by the square of the piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreatTable {
    sets: [Bitboard; 64],
    links: [Protections; 64],
}

impl ThreatTable {
    /// Creates a table with no threats at all
    pub fn new() -> ThreatTable {
        ThreatTable {
            sets: [Bitboard::EMPTY; 64],
            links: std::array::from_fn(|_| Protections::default()),
        }
    }

    /// Creates a table with all the pieces of `board` scanned
    pub fn build(board: &Board) -> ThreatTable {
        let mut table = ThreatTable::new();
        table.refresh_all(board);
        table
    }

    fn rescan(&mut self, board: &Board, coord: Coord) {
        let idx = coord.index();
        match board.occupant(coord) {
            Some(p) => {
                let scan = p.scan(board);
                self.sets[idx] = scan.threats;
                self.links[idx] = scan.links;
            }
            None => {
                self.sets[idx] = Bitboard::EMPTY;
                self.links[idx] = Protections::default();
            }
        }
    }

    /// Rescans every square of the board
    ///
    /// Returns the number of rescanned pieces.
    pub fn refresh_all(&mut self, board: &Board) -> usize {
        for coord in Coord::iter() {
            self.rescan(board, coord);
        }
        board.occupied().len() as usize
    }

    /// Rescans only what may have changed after the contents of the squares in `changed` were
    /// modified
    ///
    /// A piece is rescanned if it stands on a changed square, or if its threat set or one of its
    /// protection links touches a changed square. Every square a scan inspects ends up either in
    /// the threat set or in a protection link, so the remaining pieces would scan the same as
    /// before.
    ///
    /// Returns the number of rescanned pieces.
    pub fn refresh_affected(&mut self, board: &Board, changed: Bitboard) -> usize {
        let mut todo = changed;
        for coord in board.occupied() {
            let idx = coord.index();
            if (self.sets[idx] | self.links[idx].targets()).intersects(changed) {
                todo.set(coord);
            }
        }
        for coord in todo {
            self.rescan(board, coord);
        }
        let rescanned = (todo & board.occupied()).len() as usize;
        trace!(%changed, rescanned, "refreshed affected threats");
        rescanned
    }

    /// Returns the threat set of the piece standing on `coord`
    pub fn threats_of(&self, coord: Coord) -> Bitboard {
        self.sets[coord.index()]
    }

    /// Returns the protection links established by the piece standing on `coord`
    pub fn protections_of(&self, coord: Coord) -> &Protections {
        &self.links[coord.index()]
    }

    /// Returns the union of threat sets of all the pieces of color `color`
    pub fn attacked_by(&self, board: &Board, color: Color) -> Bitboard {
        board
            .color_set(color)
            .into_iter()
            .fold(Bitboard::EMPTY, |acc, c| acc | self.sets[c.index()])
    }

    /// Returns the squares of the pieces of color `color` which threaten `target`
    pub fn attackers_of(&self, board: &Board, target: Coord, color: Color) -> Bitboard {
        board
            .color_set(color)
            .into_iter()
            .filter(|c| self.sets[c.index()].has(target))
            .collect()
    }

    /// Returns the squares of the pieces protecting the piece on `target`
    pub fn protectors_of(&self, target: Coord) -> Bitboard {
        Coord::iter()
            .filter(|c| self.links[c.index()].protects(target))
            .collect()
    }

    /// Returns `true` if some piece protects the piece on `target`
    pub fn is_protected(&self, target: Coord) -> bool {
        self.links.iter().any(|l| l.protects(target))
    }
}

impl Default for ThreatTable {
    fn default() -> Self {
        ThreatTable::new()
    }
}
