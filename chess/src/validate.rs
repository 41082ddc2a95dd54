//! Move validation
//!
//! A move request goes through the following stages:
//!
//! 1. the start square must hold a piece of the moving side and of the requested kind;
//! 2. the piece itself checks the shape of the move and the path ([`Movement::check_shape()`]);
//! 3. the destination must not hold an ally or the enemy king;
//! 4. the move must not leave the own king threatened.
//!
//! The last stage is first tried without touching the board, using the current checkers and
//! pins. Only the moves this can't decide are applied tentatively and then rolled back.

use crate::attack;
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::error::MoveError;
use crate::geometry;
use crate::moves::{self, Move, MoveKind};
use crate::piece::{Movement, Piece};
use crate::pins::Pins;
use crate::threat::ThreatTable;
use crate::types::{Color, Coord, PieceKind};

use tracing::trace;

/// Validates moves of one side against a fixed position
///
/// The validator works on its own copy of the board, so the game is never touched, even while a
/// move is tried out.
#[derive(Debug, Clone)]
pub struct Validator<'a> {
    board: Board,
    threats: &'a ThreatTable,
    side: Color,
    king: Coord,
    checkers: Bitboard,
    pins: Pins,
}

impl<'a> Validator<'a> {
    pub fn new(board: &Board, threats: &'a ThreatTable, side: Color) -> Validator<'a> {
        let king = board.king_pos(side);
        Validator {
            board: board.clone(),
            threats,
            side,
            king,
            checkers: attack::attackers(board, king, side.inv()),
            pins: Pins::find(board, side),
        }
    }

    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        self.checkers.is_nonempty()
    }

    /// Returns the pieces which currently threaten the king of the validated side
    #[inline]
    pub fn checkers(&self) -> Bitboard {
        self.checkers
    }

    #[inline]
    pub fn pins(&self) -> &Pins {
        &self.pins
    }

    /// Checks that the piece of kind `kind` may go from `src` to `dst`
    ///
    /// Castling is not handled here, see [`castling::plan()`](crate::castling::plan).
    pub fn plan(&mut self, kind: PieceKind, src: Coord, dst: Coord) -> Result<Move, MoveError> {
        let piece = match self.board.occupant(src) {
            Some(p) if p.color() == self.side => *p,
            _ => return Err(MoveError::NoSuchPiece(src)),
        };
        if piece.kind() != kind {
            return Err(MoveError::WrongPiece {
                expected: kind,
                found: piece.kind(),
            });
        }

        let move_kind = piece.check_shape(&self.board, dst)?;

        let target = self.board.occupant(dst).copied();
        if let Some(t) = target {
            if t.color() == self.side {
                return Err(MoveError::DestinationOccupiedByAlly(dst));
            }
            if t.kind() == PieceKind::King {
                return Err(MoveError::KingCapture(dst));
            }
        }

        let mv = Move::new(move_kind, self.side, kind, src, dst);
        match self.precheck(&piece, &mv, target.is_some()) {
            Some(res) => res.map(|_| mv),
            None => {
                if self.is_safe(&mv) {
                    Ok(mv)
                } else {
                    Err(MoveError::LeavesOwnKingInCheck)
                }
            }
        }
    }

    /// Tries to decide the king safety of `mv` without applying it
    ///
    /// Returns `None` if the move must be simulated.
    fn precheck(
        &self,
        piece: &Piece,
        mv: &Move,
        capture: bool,
    ) -> Option<Result<(), MoveError>> {
        if let Piece::King(_) = piece {
            // A king may only take pieces nobody protects
            if capture && self.threats.is_protected(mv.dst()) {
                trace!(dst = %mv.dst(), "king capture of a protected piece");
                return Some(Err(MoveError::LeavesOwnKingInCheck));
            }
            return None;
        }
        if mv.kind() == MoveKind::Enpassant {
            return None;
        }

        if self.checkers.is_nonempty() {
            if self.checkers.len() > 1 {
                // Only the king can escape a double check
                return Some(Err(MoveError::LeavesOwnKingInCheck));
            }
            let checker = self.checkers.first()?;
            let blocks = match self.board.occupant(checker) {
                Some(p) if p.kind().is_sliding() => {
                    geometry::squares_between(checker, self.king).has(mv.dst())
                }
                _ => false,
            };
            if mv.dst() != checker && !blocks {
                return Some(Err(MoveError::LeavesOwnKingInCheck));
            }
        }

        if let Some(line) = self.pins.line(mv.src()) {
            if !line.has(mv.dst()) {
                return Some(Err(MoveError::LeavesOwnKingInCheck));
            }
        }

        if self.checkers.is_nonempty() {
            None
        } else {
            Some(Ok(()))
        }
    }

    /// Applies the move to the private board, checks the king and rolls the move back
    fn is_safe(&mut self, mv: &Move) -> bool {
        let undo = moves::make_move(&mut self.board, mv);
        let safe = !attack::is_king_attacked(&self.board, self.side);
        self.board.unmake(undo);
        safe
    }

    /// Returns all the squares the piece on `src` may legally move to, castling excluded
    pub fn destinations(&mut self, src: Coord) -> Bitboard {
        let Some(piece) = self.board.occupant(src).copied() else {
            return Bitboard::EMPTY;
        };
        if piece.color() != self.side {
            return Bitboard::EMPTY;
        }
        self.candidates(&piece)
            .into_iter()
            .filter(|&dst| self.plan(piece.kind(), src, dst).is_ok())
            .collect()
    }

    /// Returns `true` if the side has at least one legal move other than castling
    pub fn has_legal_moves(&mut self) -> bool {
        let pieces: Vec<Piece> = self.board.pieces_of(self.side).copied().collect();
        pieces.iter().any(|p| {
            self.candidates(p)
                .into_iter()
                .any(|dst| self.plan(p.kind(), p.coord(), dst).is_ok())
        })
    }

    /// Returns a superset of the destinations the piece can reach
    fn candidates(&self, piece: &Piece) -> Bitboard {
        let mut res = self.threats.threats_of(piece.coord());
        if let Piece::Pawn(_) = piece {
            let fwd = geometry::pawn_forward(piece.color());
            for step in [fwd, 2 * fwd] {
                if let Some(c) = piece.coord().try_shift(0, step) {
                    res.set(c);
                }
            }
        }
        res
    }
}
