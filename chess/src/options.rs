//! Game options

use crate::types::PieceKind;

/// Strategy to keep threat sets up to date after a move
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Refresh {
    /// Rescan only the pieces that look at a square changed by the move
    #[default]
    Affected,
    /// Rescan every piece on the board
    Full,
}

/// Options of a [`Game`](crate::game::Game)
///
/// # Example
///
/// ```
/// # use threatboard::{Options, Refresh, PieceKind};
/// #
/// let opts = Options::new()
///     .with_refresh(Refresh::Full)
///     .with_auto_promote(Some(PieceKind::Queen));
/// assert_eq!(opts.refresh, Refresh::Full);
/// ```
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Options {
    /// How threat sets are recomputed after each commit
    pub refresh: Refresh,
    /// If set, pawns reaching the last rank are promoted to this piece right away instead of
    /// waiting for [`Game::resolve_promotion()`](crate::game::Game::resolve_promotion)
    pub auto_promote: Option<PieceKind>,
}

impl Options {
    pub fn new() -> Options {
        Options::default()
    }

    pub fn with_refresh(mut self, refresh: Refresh) -> Options {
        self.refresh = refresh;
        self
    }

    pub fn with_auto_promote(mut self, kind: Option<PieceKind>) -> Options {
        self.auto_promote = kind;
        self
    }
}
