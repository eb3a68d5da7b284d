//! # Error Types

use crate::linguist::SearchStateHandle;
use crate::types::StateClassId;

/// Fatal errors raised by the search core.
///
/// These are all programmer/collaborator errors: end-of-stream and
/// empty-beam conditions are *not* represented here, they are normal
/// control flow reflected in [`crate::RecognitionResult`].
#[derive(Debug, thiserror::Error)]
pub enum WordtrellisError {
    /// An `ActiveListManager` was asked to route a token whose search-state
    /// class does not appear in the linguist's declared state-class order.
    #[error("state class {class:?} is not present in the linguist's state order table")]
    UnknownStateClass {
        /// The unrecognized class.
        class: StateClassId,
    },

    /// `check_state_order` caught a non-emitting successor arc that targets
    /// a strictly earlier state class than its source.
    #[error(
        "state-order violation: arc from class {from:?} targets class {to:?}, \
         which precedes it in the linguist's state order"
    )]
    StateOrderViolation {
        /// The source token's state class.
        from: StateClassId,
        /// The target state's class.
        to: StateClassId,
    },

    /// The linguist's `initial_search_state()` could not be placed into any
    /// known state class.
    #[error("initial search state's class is not present in the linguist's state order table")]
    MissingInitialState,

    /// A `Linguist` handed back an arc or initial state whose handle it then
    /// refused to `resolve` — a violation of the `Linguist` contract: a
    /// well-behaved linguist should never produce an unresolvable handle
    /// from its own `successors()`/`initial_search_state()`.
    #[error("linguist could not resolve its own search-state handle {0:?}")]
    UnresolvableState(SearchStateHandle),

    /// `recognize()` or `stop()` was called before `start()`, or after a
    /// prior `stop()` without an intervening `start()`.
    #[error("search manager must be started before this operation")]
    NotStarted,

    /// A configuration value was out of its valid domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Deserializing a `SearchManagerConfig` from TOML failed.
    #[error("failed to parse search manager configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type for fallible search-core operations.
pub type WtResult<T> = Result<T, WordtrellisError>;
