//! Rejection reasons

use crate::types::{Color, Coord, Outcome, PieceKind};

use thiserror::Error;

/// Reason why castling was refused
#[derive(Debug, Copy, Clone, Error, Eq, PartialEq)]
pub enum CastlingError {
    /// There is no unmoved king of the requested color on its home square
    #[error("king is not on its home square")]
    NotOnHomeSquare,
    /// The king has already moved in this game
    #[error("king has already moved")]
    KingMoved,
    /// There is no rook of the requested color in the chosen corner
    #[error("no rook in the corner")]
    NoRook,
    /// The chosen rook has already moved in this game
    #[error("rook has already moved")]
    RookMoved,
    /// The king is currently threatened
    #[error("king is in check")]
    KingInCheck,
    /// A square between king and rook is occupied
    #[error("square {0} between king and rook is occupied")]
    PathOccupied(Coord),
    /// A square the castling depends on is attacked by the opponent
    #[error("square {0} is attacked")]
    PathAttacked(Coord),
}

/// Reason why a request was rejected
///
/// Every rejection leaves the game exactly as it was before the request.
#[derive(Debug, Copy, Clone, Error, Eq, PartialEq)]
pub enum MoveError {
    /// There is no piece of the requesting side on the start square
    #[error("no piece of the moving side on {0}")]
    NoSuchPiece(Coord),
    /// The start square holds a piece of a different kind than requested
    #[error("expected {expected} on the start square, found {found}")]
    WrongPiece {
        expected: PieceKind,
        found: PieceKind,
    },
    /// Coordinates were outside of the board or malformed
    #[error("coordinate out of bounds")]
    OutOfBounds,
    /// The geometry of the move violates the movement rule of the piece
    #[error("illegal move shape for this piece")]
    IllegalShape,
    /// Some square on the path of the move is occupied
    #[error("path is blocked at {0}")]
    PathBlocked(Coord),
    /// The destination holds a piece of the same color
    #[error("destination {0} is occupied by an allied piece")]
    DestinationOccupiedByAlly(Coord),
    /// The destination holds the enemy king, which is never captured directly
    #[error("king on {0} cannot be captured")]
    KingCapture(Coord),
    /// After the move, the own king would be threatened
    #[error("move leaves own king in check")]
    LeavesOwnKingInCheck,
    /// Castling preconditions are not met
    #[error("castling is not possible: {0}")]
    CastlingPrecondition(#[from] CastlingError),
    /// Diagonal pawn step onto an empty square without a pawn to take en passant
    #[error("no en passant capture available")]
    NoEnPassantAvailable,
    /// Promotion choice was given, but no promotion is waiting for it
    #[error("no promotion is pending")]
    PromotionNotPending,
    /// A move was requested while a promotion still waits for its choice
    #[error("a promotion is pending")]
    PromotionAlreadyPending,
    /// The chosen piece kind is not a promotion target
    #[error("cannot promote to {0}")]
    InvalidPromotion(PieceKind),
    /// The requesting side is not the side to move
    #[error("it is not the turn of {}", .0.name())]
    NotYourTurn(Color),
    /// Draw was accepted, but the opponent did not offer it
    #[error("no draw offer to accept")]
    NoDrawOffer,
    /// The game has already finished
    #[error("game is over: {0}")]
    GameOver(Outcome),
}

/// Result of a move request
pub type MoveOutcome = Result<crate::record::MoveRecord, MoveError>;
