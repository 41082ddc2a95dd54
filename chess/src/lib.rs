//! # Threatboard
//!
//! Chess rules engine which keeps, for every piece on the board, the set of squares it threatens
//! and the allies it protects. Move requests are validated against these sets, the pins of the
//! moving side and, as the final authority, a tentative make/unmake of the move.
//!
//! The engine covers the full rules of movement: castling, en passant and two-phase promotion,
//! where the pawn move waits for the choice of the replacement piece. It does not deal with
//! notation, clocks, draw claims by repetition or the fifty-move rule.
//!
//! # Example
//!
//! ```
//! use threatboard::{CastlingSide, Color, Coord, Game, PieceKind, Special};
//!
//! let mut game = Game::from_layout("r3k2r/8/8/8/8/8/8/R3K2R w").unwrap();
//! let rec = game.request_castle(Color::White, CastlingSide::King).unwrap();
//! assert_eq!(rec.special, Special::Castle(CastlingSide::King));
//!
//! let e8: Coord = "e8".parse().unwrap();
//! let d8: Coord = "d8".parse().unwrap();
//! let rec = game.request_move(PieceKind::King, Color::Black, e8, d8).unwrap();
//! assert_eq!(rec.to_string(), "e8d8");
//! ```

pub use threatboard_base::{bitboard, geometry, types};

pub mod attack;
pub mod board;
pub mod castling;
pub mod enpassant;
pub mod error;
pub mod game;
pub mod moves;
pub mod options;
pub mod piece;
pub mod pins;
pub mod promotion;
pub mod record;
pub mod snapshot;
pub mod threat;
pub mod validate;

pub use bitboard::Bitboard;
pub use board::{Board, LayoutParseError, ValidateError};
pub use error::{CastlingError, MoveError, MoveOutcome};
pub use game::{Game, LastMove, Phase};
pub use options::{Options, Refresh};
pub use piece::{Movement, Piece};
pub use record::{CheckState, MoveRecord, Special};
pub use snapshot::{PrettyStyle, Snapshot};
pub use threat::{ProtectionLink, Protections, ThreatTable};
pub use types::{
    CastlingSide, Cell, Color, Coord, DrawReason, File, Outcome, PieceKind, Rank, WinReason,
};
