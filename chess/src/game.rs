//! Game state and the request API
//!
//! [`Game`] owns the board, the threat table and the turn state. All the changes go through the
//! `request_*` methods, which either commit a move completely or reject it and leave the game
//! untouched.

use crate::attack;
use crate::bitboard::Bitboard;
use crate::board::{Board, LayoutParseError, ValidateError};
use crate::castling;
use crate::enpassant;
use crate::error::{MoveError, MoveOutcome};
use crate::moves::{self, Move, MoveKind};
use crate::options::{Options, Refresh};
use crate::piece::{Movement, Piece};
use crate::pins::Pins;
use crate::promotion::PendingPromotion;
use crate::record::{CheckState, MoveRecord, Special};
use crate::snapshot::Snapshot;
use crate::threat::{Protections, ThreatTable};
use crate::types::{CastlingSide, Color, Coord, DrawReason, File, Outcome, PieceKind, WinReason};
use crate::validate::Validator;

use std::str::FromStr;

use tracing::{debug, info, trace};

/// Observable phase of the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// The side to move may request a move
    AwaitingMove,
    /// A pawn has reached the last rank and waits for the replacement piece
    PromotionPending(PendingPromotion),
    /// The game has finished
    GameOver(Outcome),
}

/// The piece which made the last committed move
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LastMove {
    pub color: Color,
    pub piece: PieceKind,
    pub coord: Coord,
}

/// Chess game
///
/// # Example
///
/// ```
/// # use threatboard::{CheckState, Color, Coord, Game, PieceKind};
/// #
/// let mut game = Game::new();
/// let c = |s: &str| -> Coord { s.parse().unwrap() };
/// game.request_move(PieceKind::Pawn, Color::White, c("e2"), c("e4")).unwrap();
/// let rec = game
///     .request_move(PieceKind::Knight, Color::Black, c("g8"), c("f6"))
///     .unwrap();
/// assert_eq!(rec.to_string(), "g8f6");
/// assert_eq!(rec.check, Some(CheckState::NotThreatened));
/// assert_eq!(game.side(), Color::White);
/// ```
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    threats: ThreatTable,
    side: Color,
    last_move: Option<LastMove>,
    phase: Phase,
    draw_offer: Option<Color>,
    history: Vec<MoveRecord>,
    options: Options,
}

impl Game {
    /// Starts a new game from the initial position
    pub fn new() -> Game {
        Game::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Game {
        Game::from_parts(Board::initial(), Color::White, options)
    }

    /// Sets up a game from a layout of the form `"<placement> [side]"`
    ///
    /// The placement lists ranks from the 8th down to the 1st, like the first field of FEN. The
    /// side to move is `w` or `b` and defaults to White.
    ///
    /// # Example
    ///
    /// ```
    /// # use threatboard::{CheckState, Color, Game};
    /// #
    /// let game = Game::from_layout("8/8/8/8/8/7k/6q1/6K1 w").unwrap();
    /// assert_eq!(game.query_check_state(Color::White), CheckState::Checkmated);
    /// assert!(game.outcome().is_some());
    /// ```
    pub fn from_layout(s: &str) -> Result<Game, LayoutParseError> {
        if !s.is_ascii() {
            return Err(LayoutParseError::NonAscii);
        }
        let mut iter = s.split(' ').filter(|w| !w.is_empty()).fuse();
        let board = Board::from_layout(iter.next().ok_or(LayoutParseError::NoBoard)?)?;
        let side = match iter.next() {
            Some(w) => Color::from_str(w)?,
            None => Color::White,
        };
        if iter.next().is_some() {
            return Err(LayoutParseError::ExtraData);
        }
        if attack::is_king_attacked(&board, side.inv()) {
            return Err(ValidateError::OpponentKingAttacked.into());
        }
        Ok(Game::from_parts(board, side, Options::default()))
    }

    fn from_parts(board: Board, side: Color, options: Options) -> Game {
        let threats = ThreatTable::build(&board);
        let mut game = Game {
            board,
            threats,
            side,
            last_move: None,
            phase: Phase::AwaitingMove,
            draw_offer: None,
            history: Vec::new(),
            options,
        };
        game.update_king_threats(None);
        match game.query_check_state(side) {
            CheckState::Checkmated => game.end(Outcome::win(side.inv(), WinReason::Checkmate)),
            CheckState::NotThreatened if !game.has_legal_moves(side) => {
                game.end(Outcome::Draw(DrawReason::Stalemate))
            }
            _ => {}
        }
        game
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn threats(&self) -> &ThreatTable {
        &self.threats
    }

    /// Returns the side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    #[inline]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::GameOver(o) => Some(o),
            _ => None,
        }
    }

    #[inline]
    pub fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }

    /// Returns the completed moves, oldest first
    #[inline]
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// Returns the side whose draw offer is standing, if any
    #[inline]
    pub fn draw_offer(&self) -> Option<Color> {
        self.draw_offer
    }

    fn ensure_awaiting(&self) -> Result<(), MoveError> {
        match self.phase {
            Phase::AwaitingMove => Ok(()),
            Phase::PromotionPending(_) => Err(MoveError::PromotionAlreadyPending),
            Phase::GameOver(o) => Err(MoveError::GameOver(o)),
        }
    }

    /// Requests to move the piece of kind `kind` and color `color` from `src` to `dst`
    ///
    /// A king stepping two files from its home square is treated as a castling request. If a pawn
    /// reaches the last rank, the move is applied, but stays incomplete until
    /// [`resolve_promotion()`](Game::resolve_promotion) is called. The returned record then has
    /// `Special::Promotion(None)` and no check state.
    pub fn request_move(
        &mut self,
        kind: PieceKind,
        color: Color,
        src: Coord,
        dst: Coord,
    ) -> MoveOutcome {
        self.ensure_awaiting()?;
        if color != self.side {
            return Err(MoveError::NotYourTurn(color));
        }
        if kind == PieceKind::King {
            if let Some(side) = castling_side(color, src, dst) {
                return self.request_castle(color, side);
            }
        }

        let mv = {
            let mut validator = Validator::new(&self.board, &self.threats, color);
            validator.plan(kind, src, dst).map_err(|e| {
                debug!(%src, %dst, error = %e, "move rejected");
                e
            })?
        };
        let capture = self.capture_of(&mv);
        let undo = moves::make_move(&mut self.board, &mv);

        if mv.is_promotion() {
            let pending = PendingPromotion::begin(&mut self.board, mv, capture, undo);
            self.phase = Phase::PromotionPending(pending);
            debug!(%src, %dst, "promotion pending");
            let auto = self.options.auto_promote.filter(PieceKind::is_promotion_target);
            if let Some(kind) = auto {
                return self.resolve_promotion(kind);
            }
            return Ok(MoveRecord {
                color,
                piece: kind,
                src,
                dst,
                capture,
                special: Special::Promotion(None),
                check: None,
            });
        }

        let special = match mv.kind() {
            MoveKind::Enpassant => Special::EnPassant,
            _ => Special::Normal,
        };
        Ok(self.commit(&mv, capture, special))
    }

    /// Same as [`request_move()`](Game::request_move), but takes the squares as strings
    ///
    /// Squares which don't name a square of the board are rejected with
    /// [`MoveError::OutOfBounds`].
    pub fn request_move_str(
        &mut self,
        kind: PieceKind,
        color: Color,
        src: &str,
        dst: &str,
    ) -> MoveOutcome {
        let src = Coord::from_str(src).map_err(|_| MoveError::OutOfBounds)?;
        let dst = Coord::from_str(dst).map_err(|_| MoveError::OutOfBounds)?;
        self.request_move(kind, color, src, dst)
    }

    /// Requests castling of color `color` to side `side`
    pub fn request_castle(&mut self, color: Color, side: CastlingSide) -> MoveOutcome {
        self.ensure_awaiting()?;
        if color != self.side {
            return Err(MoveError::NotYourTurn(color));
        }
        let mv = castling::plan(&self.board, &self.threats, color, side).map_err(|e| {
            debug!(?color, %side, error = %e, "castling rejected");
            e
        })?;
        moves::make_move(&mut self.board, &mv);
        debug!(?color, %side, "castled");
        Ok(self.commit(&mv, None, Special::Castle(side)))
    }

    /// Completes the pending promotion by replacing the pawn with a piece of kind `kind`
    ///
    /// If `kind` is not a valid promotion target, the promotion stays pending.
    pub fn resolve_promotion(&mut self, kind: PieceKind) -> MoveOutcome {
        let pending = match &self.phase {
            Phase::PromotionPending(p) => p.clone(),
            Phase::AwaitingMove => return Err(MoveError::PromotionNotPending),
            Phase::GameOver(o) => return Err(MoveError::GameOver(*o)),
        };
        pending.resolve(&mut self.board, kind)?;
        self.phase = Phase::AwaitingMove;
        debug!(coord = %pending.coord(), %kind, "promotion resolved");
        Ok(self.commit(pending.mv(), pending.capture(), Special::Promotion(Some(kind))))
    }

    /// Takes back the pawn move which waits for the promotion choice
    pub fn abort_promotion(&mut self) -> Result<(), MoveError> {
        match std::mem::replace(&mut self.phase, Phase::AwaitingMove) {
            Phase::PromotionPending(pending) => {
                debug!(coord = %pending.coord(), "promotion aborted");
                pending.abort(&mut self.board);
                Ok(())
            }
            other => {
                let err = match other {
                    Phase::GameOver(o) => MoveError::GameOver(o),
                    _ => MoveError::PromotionNotPending,
                };
                self.phase = other;
                Err(err)
            }
        }
    }

    /// Ends the game in favor of the opponent of `color`
    ///
    /// A pending promotion is taken back first.
    pub fn forfeit(&mut self, color: Color) -> Result<Outcome, MoveError> {
        if let Phase::GameOver(o) = self.phase {
            return Err(MoveError::GameOver(o));
        }
        if let Phase::PromotionPending(_) = self.phase {
            self.abort_promotion()?;
        }
        let outcome = Outcome::win(color.inv(), WinReason::Forfeit);
        self.end(outcome);
        Ok(outcome)
    }

    /// Offers a draw on behalf of `color`
    ///
    /// The offer stands until the opponent accepts it or makes a move instead.
    pub fn offer_draw(&mut self, color: Color) -> Result<(), MoveError> {
        self.ensure_awaiting()?;
        debug!(?color, "draw offered");
        self.draw_offer = Some(color);
        Ok(())
    }

    /// Accepts the draw offered by the opponent of `color`
    pub fn accept_draw(&mut self, color: Color) -> Result<Outcome, MoveError> {
        self.ensure_awaiting()?;
        if self.draw_offer != Some(color.inv()) {
            return Err(MoveError::NoDrawOffer);
        }
        let outcome = Outcome::Draw(DrawReason::Agreement);
        self.end(outcome);
        Ok(outcome)
    }

    /// Returns the check state of `color`
    ///
    /// While a promotion is pending, the threats are those before the pawn move.
    pub fn query_check_state(&self, color: Color) -> CheckState {
        let king = self.board.king_pos(color);
        if !self.threats.attacked_by(&self.board, color.inv()).has(king) {
            return CheckState::NotThreatened;
        }
        if self.has_legal_moves(color) {
            CheckState::Threatened
        } else {
            CheckState::Checkmated
        }
    }

    /// Returns a read-only copy of the board for rendering
    pub fn snapshot(&self) -> Snapshot {
        self.board.snapshot(self.side)
    }

    /// Returns the squares the piece on `coord` may legally move to, castling included
    ///
    /// The turn is not taken into account. Returns an empty set if the square is empty or if the
    /// game doesn't await a move.
    pub fn legal_destinations(&self, coord: Coord) -> Bitboard {
        if self.phase != Phase::AwaitingMove {
            return Bitboard::EMPTY;
        }
        let Some(piece) = self.board.occupant(coord) else {
            return Bitboard::EMPTY;
        };
        let color = piece.color();
        let mut res = Validator::new(&self.board, &self.threats, color).destinations(coord);
        if piece.kind() == PieceKind::King {
            for side in [CastlingSide::King, CastlingSide::Queen] {
                if let Ok(mv) = castling::plan(&self.board, &self.threats, color, side) {
                    res.set(mv.dst());
                }
            }
        }
        res
    }

    fn has_legal_moves(&self, color: Color) -> bool {
        let mut validator = Validator::new(&self.board, &self.threats, color);
        validator.has_legal_moves()
            || [CastlingSide::King, CastlingSide::Queen]
                .into_iter()
                .any(|s| castling::plan(&self.board, &self.threats, color, s).is_ok())
    }

    /// Returns the squares threatened by the piece on `coord`
    pub fn threats_of(&self, coord: Coord) -> Bitboard {
        self.threats.threats_of(coord)
    }

    /// Returns the allies protected by the piece on `coord`
    pub fn protections_of(&self, coord: Coord) -> &Protections {
        self.threats.protections_of(coord)
    }

    /// Returns the pieces of color `color` which threaten `coord`
    pub fn attackers_of(&self, coord: Coord, color: Color) -> Bitboard {
        self.threats.attackers_of(&self.board, coord, color)
    }

    /// Returns `true` if some piece of color `by` threatens `coord`
    pub fn is_attacked(&self, coord: Coord, by: Color) -> bool {
        self.threats.attacked_by(&self.board, by).has(coord)
    }

    /// Returns the square of the piece which threatens the king of `color`, if any
    pub fn king_threat(&self, color: Color) -> Option<Coord> {
        self.board.king_threat(color)
    }

    /// Returns the pieces of `color` pinned to their king
    pub fn pins(&self, color: Color) -> Pins {
        Pins::find(&self.board, color)
    }

    /// Returns the square where a pawn may capture en passant right now, if any
    pub fn enpassant_target(&self) -> Option<Coord> {
        enpassant::target(&self.board)
    }

    fn capture_of(&self, mv: &Move) -> Option<PieceKind> {
        match mv.kind() {
            MoveKind::Enpassant => Some(PieceKind::Pawn),
            _ => self.board.occupant(mv.dst()).map(|p| p.kind()),
        }
    }

    fn update_king_threats(&mut self, mover: Option<Coord>) {
        for color in Color::ALL {
            let king = self.board.king_pos(color);
            let attackers = self.threats.attackers_of(&self.board, king, color.inv());
            let by = match mover {
                Some(m) if attackers.has(m) => Some(m),
                _ => attackers.first(),
            };
            if let Some(k) = self.board.occupant_mut(king).and_then(Piece::as_king_mut) {
                k.set_threat(by);
            }
        }
    }

    fn commit(&mut self, mv: &Move, capture: Option<PieceKind>, special: Special) -> MoveRecord {
        let rescanned = match self.options.refresh {
            Refresh::Affected => self.threats.refresh_affected(&self.board, mv.changed()),
            Refresh::Full => self.threats.refresh_all(&self.board),
        };
        trace!(rescanned, "threats refreshed after move");
        self.update_king_threats(Some(mv.dst()));

        let color = mv.side();
        self.side = color.inv();
        self.last_move = Some(LastMove {
            color,
            piece: mv.piece(),
            coord: mv.dst(),
        });
        if self.draw_offer == Some(self.side) {
            debug!(color = ?self.side, "draw offer lapsed");
            self.draw_offer = None;
        }

        let check = self.query_check_state(self.side);
        let record = MoveRecord {
            color,
            piece: mv.piece(),
            src: mv.src(),
            dst: mv.dst(),
            capture,
            special,
            check: Some(check),
        };
        self.history.push(record);
        debug!(%record, ?check, "move committed");

        match check {
            CheckState::Checkmated => self.end(Outcome::win(color, WinReason::Checkmate)),
            CheckState::NotThreatened if !self.has_legal_moves(self.side) => {
                self.end(Outcome::Draw(DrawReason::Stalemate))
            }
            _ => {}
        }

        #[cfg(feature = "selftest")]
        self.selftest();

        record
    }

    fn end(&mut self, outcome: Outcome) {
        info!(%outcome, moves = self.history.len(), "game over");
        self.draw_offer = None;
        self.phase = Phase::GameOver(outcome);
    }

    #[cfg(feature = "selftest")]
    fn selftest(&self) {
        self.board.selftest();
        assert_eq!(
            self.threats,
            ThreatTable::build(&self.board),
            "incremental threat refresh diverged from full rebuild"
        );
        assert!(
            !attack::is_king_attacked(&self.board, self.side.inv()),
            "side which just moved is in check"
        );
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new()
    }
}

/// Detects a king move which is actually a castling request
fn castling_side(color: Color, src: Coord, dst: Coord) -> Option<CastlingSide> {
    let (king, _) = castling::srcs(color, CastlingSide::King);
    if src != king || dst.rank() != src.rank() {
        return None;
    }
    match dst.file() {
        File::G => Some(CastlingSide::King),
        File::C => Some(CastlingSide::Queen),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CastlingError;

    fn c(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn play(game: &mut Game, moves: &[(PieceKind, &str, &str)]) {
        for &(kind, src, dst) in moves {
            let side = game.side();
            game.request_move(kind, side, c(src), c(dst)).unwrap();
        }
    }

    #[test]
    fn test_initial_threats() {
        let game = Game::new();
        assert_eq!(
            game.threats_of(c("b1")),
            Bitboard::from_iter([c("a3"), c("c3")])
        );
        assert_eq!(
            game.threats_of(c("g8")),
            Bitboard::from_iter([c("f6"), c("h6")])
        );
        for s in ["a1", "c1", "d1", "f1", "h1", "a8", "c8", "d8", "f8", "h8"] {
            assert_eq!(game.threats_of(c(s)), Bitboard::EMPTY, "{}", s);
        }
        assert_eq!(game.legal_destinations(c("e2")), Bitboard::from_iter([c("e3"), c("e4")]));
        assert_eq!(game.legal_destinations(c("e1")), Bitboard::EMPTY);
        assert_eq!(game.query_check_state(Color::White), CheckState::NotThreatened);
        assert_eq!(game.phase(), &Phase::AwaitingMove);
    }

    #[test]
    fn test_turns() {
        let mut game = Game::new();
        assert_eq!(
            game.request_move(PieceKind::Pawn, Color::Black, c("e7"), c("e5")),
            Err(MoveError::NotYourTurn(Color::Black))
        );
        assert_eq!(
            game.request_move(PieceKind::Knight, Color::White, c("e2"), c("e4")),
            Err(MoveError::WrongPiece {
                expected: PieceKind::Knight,
                found: PieceKind::Pawn
            })
        );
        assert_eq!(
            game.request_move(PieceKind::Pawn, Color::White, c("e3"), c("e4")),
            Err(MoveError::NoSuchPiece(c("e3")))
        );
        assert_eq!(
            game.request_move_str(PieceKind::Pawn, Color::White, "e2", "e9"),
            Err(MoveError::OutOfBounds)
        );
        assert_eq!(
            game.request_move_str(PieceKind::Pawn, Color::White, "i2", "e4"),
            Err(MoveError::OutOfBounds)
        );
        let rec = game
            .request_move_str(PieceKind::Pawn, Color::White, "e2", "e4")
            .unwrap();
        assert_eq!(rec.special, Special::Normal);
        assert_eq!(game.side(), Color::Black);
        assert_eq!(
            game.last_move(),
            Some(LastMove {
                color: Color::White,
                piece: PieceKind::Pawn,
                coord: c("e4")
            })
        );
    }

    #[test]
    fn test_rejection_keeps_state() {
        let mut game = Game::from_layout("4k3/8/8/8/4r3/8/4B3/4K3 w").unwrap();
        let before = game.snapshot();
        let threats = game.threats().clone();
        assert_eq!(
            game.request_move(PieceKind::Bishop, Color::White, c("e2"), c("d3")),
            Err(MoveError::LeavesOwnKingInCheck)
        );
        assert_eq!(
            game.request_move(PieceKind::Bishop, Color::White, c("e2"), c("e4")),
            Err(MoveError::IllegalShape)
        );
        assert_eq!(game.snapshot(), before);
        assert_eq!(game.threats(), &threats);
        assert_eq!(game.side(), Color::White);
        assert!(game.history().is_empty());
        assert!(game.pins(Color::White).is_pinned(c("e2")));
    }

    #[test]
    fn test_castling() {
        let mut game = Game::from_layout("r3k2r/8/8/8/8/8/8/R3K2R w").unwrap();
        assert_eq!(
            game.legal_destinations(c("e1")),
            Bitboard::from_iter([c("c1"), c("d1"), c("d2"), c("e2"), c("f1"), c("f2"), c("g1")])
        );
        let rec = game.request_castle(Color::White, CastlingSide::King).unwrap();
        assert_eq!(rec.special, Special::Castle(CastlingSide::King));
        assert_eq!(rec.to_string(), "e1g1");
        let snap = game.snapshot();
        assert_eq!(snap.get(c("g1")).to_string(), "K");
        assert_eq!(snap.get(c("f1")).to_string(), "R");
        assert!(snap.get(c("e1")).is_empty());
        assert!(snap.get(c("h1")).is_empty());

        let rec = game
            .request_move(PieceKind::King, Color::Black, c("e8"), c("c8"))
            .unwrap();
        assert_eq!(rec.special, Special::Castle(CastlingSide::Queen));
        assert_eq!(game.snapshot().get(c("d8")).to_string(), "r");

        assert_eq!(
            game.request_castle(Color::White, CastlingSide::King),
            Err(MoveError::CastlingPrecondition(CastlingError::NotOnHomeSquare))
        );
    }

    #[test]
    fn test_castling_after_king_moved() {
        let mut game = Game::from_layout("r3k2r/8/8/8/8/8/8/R3K2R w").unwrap();
        play(
            &mut game,
            &[
                (PieceKind::King, "e1", "f1"),
                (PieceKind::King, "e8", "f8"),
                (PieceKind::King, "f1", "e1"),
                (PieceKind::King, "f8", "e8"),
            ],
        );
        assert_eq!(
            game.request_castle(Color::White, CastlingSide::King),
            Err(MoveError::CastlingPrecondition(CastlingError::KingMoved))
        );
        assert_eq!(
            game.request_move(PieceKind::King, Color::White, c("e1"), c("g1")),
            Err(MoveError::CastlingPrecondition(CastlingError::KingMoved))
        );
    }

    #[test]
    fn test_checkmate_layout() {
        let mut game = Game::from_layout("8/8/8/8/8/7k/6q1/6K1 w").unwrap();
        assert_eq!(game.query_check_state(Color::White), CheckState::Checkmated);
        assert_eq!(game.king_threat(Color::White), Some(c("g2")));
        let outcome = Outcome::win(Color::Black, WinReason::Checkmate);
        assert_eq!(game.outcome(), Some(outcome));
        assert_eq!(
            game.request_move(PieceKind::King, Color::White, c("g1"), c("g2")),
            Err(MoveError::GameOver(outcome))
        );
    }

    #[test]
    fn test_fools_mate() {
        let mut game = Game::new();
        play(
            &mut game,
            &[
                (PieceKind::Pawn, "f2", "f3"),
                (PieceKind::Pawn, "e7", "e5"),
                (PieceKind::Pawn, "g2", "g4"),
            ],
        );
        let rec = game
            .request_move(PieceKind::Queen, Color::Black, c("d8"), c("h4"))
            .unwrap();
        assert_eq!(rec.check, Some(CheckState::Checkmated));
        assert_eq!(game.king_threat(Color::White), Some(c("h4")));
        assert_eq!(
            game.outcome(),
            Some(Outcome::win(Color::Black, WinReason::Checkmate))
        );
        assert_eq!(game.history().len(), 4);
    }

    #[test]
    fn test_check_and_king_threat() {
        let mut game = Game::from_layout("4k3/8/8/8/8/8/8/R3K3 w").unwrap();
        let rec = game
            .request_move(PieceKind::Rook, Color::White, c("a1"), c("a8"))
            .unwrap();
        assert_eq!(rec.check, Some(CheckState::Threatened));
        assert_eq!(game.king_threat(Color::Black), Some(c("a8")));
        assert_eq!(game.attackers_of(c("e8"), Color::White), Bitboard::from_coord(c("a8")));
        assert!(game.is_attacked(c("d8"), Color::White));
        assert_eq!(
            game.request_move(PieceKind::King, Color::Black, c("e8"), c("d8")),
            Err(MoveError::LeavesOwnKingInCheck)
        );
        game.request_move(PieceKind::King, Color::Black, c("e8"), c("e7"))
            .unwrap();
        assert_eq!(game.king_threat(Color::Black), None);
        assert_eq!(game.query_check_state(Color::Black), CheckState::NotThreatened);
    }

    #[test]
    fn test_forced_block() {
        let mut game = Game::from_layout("4k3/8/8/8/8/8/3PN3/r3K3 w").unwrap();
        assert_eq!(game.query_check_state(Color::White), CheckState::Threatened);
        assert_eq!(
            game.request_move(PieceKind::Pawn, Color::White, c("d2"), c("d3")),
            Err(MoveError::LeavesOwnKingInCheck)
        );
        let rec = game
            .request_move(PieceKind::Knight, Color::White, c("e2"), c("c1"))
            .unwrap();
        assert_eq!(rec.check, Some(CheckState::NotThreatened));
    }

    #[test]
    fn test_promotion() {
        let mut game = Game::from_layout("4k3/P7/8/8/8/8/8/4K3 w").unwrap();
        let rec = game
            .request_move(PieceKind::Pawn, Color::White, c("a7"), c("a8"))
            .unwrap();
        assert_eq!(rec.special, Special::Promotion(None));
        assert_eq!(rec.check, None);
        assert!(matches!(game.phase(), Phase::PromotionPending(_)));
        assert_eq!(game.side(), Color::White);
        assert!(game.history().is_empty());

        assert_eq!(
            game.request_move(PieceKind::King, Color::White, c("e1"), c("e2")),
            Err(MoveError::PromotionAlreadyPending)
        );
        assert_eq!(
            game.resolve_promotion(PieceKind::King),
            Err(MoveError::InvalidPromotion(PieceKind::King))
        );
        assert!(matches!(game.phase(), Phase::PromotionPending(_)));

        let rec = game.resolve_promotion(PieceKind::Queen).unwrap();
        assert_eq!(rec.special, Special::Promotion(Some(PieceKind::Queen)));
        assert_eq!(rec.to_string(), "a7a8q");
        assert_eq!(rec.check, Some(CheckState::Threatened));
        assert_eq!(game.side(), Color::Black);
        assert_eq!(game.phase(), &Phase::AwaitingMove);
        let queen = game.board().occupant(c("a8")).unwrap();
        assert_eq!(queen.kind(), PieceKind::Queen);
        assert_eq!(queen.color(), Color::White);
        assert_eq!(game.king_threat(Color::Black), Some(c("a8")));
        assert_eq!(
            game.resolve_promotion(PieceKind::Queen),
            Err(MoveError::PromotionNotPending)
        );
    }

    #[test]
    fn test_promotion_abort() {
        let mut game = Game::from_layout("1r2k3/P7/8/8/8/8/8/4K3 w").unwrap();
        let before = game.snapshot();
        let rec = game
            .request_move(PieceKind::Pawn, Color::White, c("a7"), c("b8"))
            .unwrap();
        assert_eq!(rec.capture, Some(PieceKind::Rook));
        game.abort_promotion().unwrap();
        assert_eq!(game.snapshot(), before);
        assert_eq!(game.phase(), &Phase::AwaitingMove);
        assert_eq!(game.abort_promotion(), Err(MoveError::PromotionNotPending));
        assert_eq!(game.side(), Color::White);
    }

    #[test]
    fn test_auto_promote() {
        let mut game = Game::from_layout("4k3/P7/8/8/8/8/8/4K3 w").unwrap();
        game.set_options(Options::new().with_auto_promote(Some(PieceKind::Knight)));
        let rec = game
            .request_move(PieceKind::Pawn, Color::White, c("a7"), c("a8"))
            .unwrap();
        assert_eq!(rec.special, Special::Promotion(Some(PieceKind::Knight)));
        assert_eq!(game.side(), Color::Black);
        assert_eq!(game.snapshot().get(c("a8")).to_string(), "N");
    }

    #[test]
    fn test_enpassant() {
        let mut game = Game::new();
        play(
            &mut game,
            &[
                (PieceKind::Pawn, "e2", "e4"),
                (PieceKind::Pawn, "a7", "a6"),
                (PieceKind::Pawn, "e4", "e5"),
                (PieceKind::Pawn, "d7", "d5"),
            ],
        );
        assert_eq!(game.enpassant_target(), Some(c("d6")));
        assert!(game.legal_destinations(c("e5")).has(c("d6")));
        let rec = game
            .request_move(PieceKind::Pawn, Color::White, c("e5"), c("d6"))
            .unwrap();
        assert_eq!(rec.special, Special::EnPassant);
        assert_eq!(rec.capture, Some(PieceKind::Pawn));
        let snap = game.snapshot();
        assert!(snap.get(c("d5")).is_empty());
        assert_eq!(snap.get(c("d6")).to_string(), "P");
        assert_eq!(game.enpassant_target(), None);
    }

    #[test]
    fn test_enpassant_expires() {
        let mut game = Game::new();
        play(
            &mut game,
            &[
                (PieceKind::Pawn, "e2", "e4"),
                (PieceKind::Pawn, "a7", "a6"),
                (PieceKind::Pawn, "e4", "e5"),
                (PieceKind::Pawn, "d7", "d5"),
                (PieceKind::Pawn, "h2", "h3"),
                (PieceKind::Pawn, "h7", "h6"),
            ],
        );
        assert_eq!(
            game.request_move(PieceKind::Pawn, Color::White, c("e5"), c("d6")),
            Err(MoveError::NoEnPassantAvailable)
        );
    }

    #[test]
    fn test_king_capture_rules() {
        let mut game = Game::from_layout("4k3/8/8/8/8/2p5/3pn3/4K3 w").unwrap();
        assert_eq!(game.king_threat(Color::White), Some(c("d2")));
        // d2 is protected by the pawn on c3, e2 is not protected
        assert_eq!(
            game.request_move(PieceKind::King, Color::White, c("e1"), c("d2")),
            Err(MoveError::LeavesOwnKingInCheck)
        );
        let rec = game
            .request_move(PieceKind::King, Color::White, c("e1"), c("e2"))
            .unwrap();
        assert_eq!(rec.capture, Some(PieceKind::Knight));
    }

    #[test]
    fn test_stalemate() {
        let mut game = Game::from_layout("7k/8/6K1/8/8/8/5Q2/8 w").unwrap();
        let rec = game
            .request_move(PieceKind::Queen, Color::White, c("f2"), c("f7"))
            .unwrap();
        assert_eq!(rec.check, Some(CheckState::NotThreatened));
        assert_eq!(game.outcome(), Some(Outcome::Draw(DrawReason::Stalemate)));

        let game = Game::from_layout("7k/5Q2/6K1/8/8/8/8/8 b").unwrap();
        assert_eq!(game.outcome(), Some(Outcome::Draw(DrawReason::Stalemate)));
    }

    #[test]
    fn test_forfeit_and_draw() {
        let mut game = Game::new();
        assert_eq!(
            game.forfeit(Color::White),
            Ok(Outcome::win(Color::Black, WinReason::Forfeit))
        );
        assert!(matches!(game.offer_draw(Color::Black), Err(MoveError::GameOver(_))));

        let mut game = Game::new();
        assert_eq!(game.accept_draw(Color::Black), Err(MoveError::NoDrawOffer));
        game.offer_draw(Color::White).unwrap();
        assert_eq!(game.accept_draw(Color::White), Err(MoveError::NoDrawOffer));
        assert_eq!(
            game.accept_draw(Color::Black),
            Ok(Outcome::Draw(DrawReason::Agreement))
        );

        let mut game = Game::new();
        game.offer_draw(Color::Black).unwrap();
        play(&mut game, &[(PieceKind::Pawn, "e2", "e4")]);
        assert_eq!(game.draw_offer(), None);
        assert_eq!(game.accept_draw(Color::White), Err(MoveError::NoDrawOffer));
    }

    #[test]
    fn test_layout_errors() {
        assert_eq!(
            Game::from_layout("4k3/8/8/8/8/8/8/4R1K1 w").unwrap_err(),
            LayoutParseError::Valid(ValidateError::OpponentKingAttacked)
        );
        assert!(Game::from_layout("4k3/8/8/8/8/8/8/4R1K1 b").is_ok());
        assert_eq!(
            Game::from_layout("4k3/8/8/8/8/8/8/4K3 w x").unwrap_err(),
            LayoutParseError::ExtraData
        );
        assert!(matches!(
            Game::from_layout("4k3/8/8/8/8/8/8/4K3 z"),
            Err(LayoutParseError::MoveSide(_))
        ));
        assert_eq!(Game::from_layout("").unwrap_err(), LayoutParseError::NoBoard);
        assert_eq!(
            Game::from_layout("4k3/8/8/8/8/8/8/4K3").unwrap().side(),
            Color::White
        );
    }

    #[test]
    fn test_refresh_modes() {
        let moves = [
            (PieceKind::Pawn, "e2", "e4"),
            (PieceKind::Pawn, "d7", "d5"),
            (PieceKind::Pawn, "e4", "d5"),
            (PieceKind::Queen, "d8", "d5"),
            (PieceKind::Knight, "b1", "c3"),
            (PieceKind::Queen, "d5", "e5"),
            (PieceKind::Bishop, "f1", "e2"),
        ];
        let mut affected = Game::new();
        let mut full = Game::with_options(Options::new().with_refresh(Refresh::Full));
        play(&mut affected, &moves);
        play(&mut full, &moves);
        assert_eq!(affected.threats(), full.threats());
        assert_eq!(affected.threats(), &ThreatTable::build(affected.board()));
        assert_eq!(affected.king_threat(Color::White), None);
        assert_eq!(affected.pins(Color::White).pinned(), Bitboard::from_coord(c("e2")));
    }
}
