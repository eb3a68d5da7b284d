//! # Linguist (consumed external interface)
//!
//! The linguistic search-space graph is produced and owned by a
//! collaborator, specified here only by its interface. The core never
//! constructs search states; it only walks the graph the `Linguist` hands
//! it. Modeled as a trait object — a capability set, not a class
//! hierarchy.

use crate::errors::WtResult;
use crate::types::{Score, StateClassId};

/// Opaque handle to a node in the linguist's graph.
///
/// Equality/hashing are by identity (the raw handle value). Linguists are
/// free to encode whatever addressing scheme they like into the `u64`
/// payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchStateHandle(pub u64);

/// An optional `(lex_state, word_history)` key, used by the heap-keyed
/// variant of [`crate::BestTokenMap`] to collapse parallel paths through
/// the same HMM with the same word history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LexWordKey {
    /// The lexical (HMM) state.
    pub lex_state: SearchStateHandle,
    /// The word history accumulated so far, opaque to the core.
    pub word_history: Vec<SearchStateHandle>,
}

/// The key [`crate::BestTokenMap`] actually looks tokens up by: the search
/// state itself by default, or a `(lex_state, word_history)` pair when the
/// linguist opts a state into the heap-keyed collapsing behavior via
/// [`SearchState::lex_word_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BestTokenKey {
    /// Keyed by the raw search-state handle (the default).
    State(SearchStateHandle),
    /// Keyed by lexical state and word history, collapsing parallel paths
    /// through the same HMM with the same word history.
    LexWord(LexWordKey),
}

impl BestTokenKey {
    /// The key `state` should be looked up under, honoring its optional
    /// `lex_word_key` override.
    pub fn for_state(state: &dyn SearchState) -> Self {
        match state.lex_word_key() {
            Some(key) => Self::LexWord(key),
            None => Self::State(state.handle()),
        }
    }
}

/// A node in the linguist's static search-state graph.
pub trait SearchState {
    /// Whether advancing through this state consumes a frame.
    fn is_emitting(&self) -> bool;

    /// Whether traversing this state emits a word boundary.
    fn is_word(&self) -> bool;

    /// Whether this state is a recognized terminal state.
    fn is_final(&self) -> bool;

    /// The dense class this state belongs to, used for active-list
    /// stratification and (optionally) state-order validation.
    fn state_class(&self) -> StateClassId;

    /// Outgoing arcs from this state.
    fn successors(&self) -> Vec<Arc>;

    /// This state's stable handle.
    fn handle(&self) -> SearchStateHandle;

    /// Heap-keyed `BestTokenMap` support: the lexical state and word
    /// history for this search state, if the linguist provides one.
    fn lex_word_key(&self) -> Option<LexWordKey> {
        None
    }
}

/// An outgoing edge in the linguist's graph.
#[derive(Debug, Clone, Copy)]
pub struct Arc {
    /// The successor search state.
    pub state: SearchStateHandle,
    /// Log-domain transition probability.
    pub probability: Score,
    /// Log-domain language-model probability contributed by this arc.
    pub language_probability: Score,
    /// Log-domain insertion probability contributed by this arc.
    pub insertion_probability: Score,
}

/// The search-space graph collaborator.
pub trait Linguist {
    /// Start the linguist (e.g. lazily compile its graph).
    fn start(&mut self) -> WtResult<()>;

    /// Stop the linguist and release any resources it holds.
    fn stop(&mut self);

    /// The entry point of the search graph.
    fn initial_search_state(&self) -> SearchStateHandle;

    /// The fixed ordering of state classes: non-emitting classes strictly
    /// before emitting classes, in linguist-declared order.
    fn search_state_order(&self) -> &[StateClassId];

    /// Resolve a handle to its `SearchState` view.
    ///
    /// Returns `None` if the handle is not known to this linguist, which a
    /// well-behaved `Linguist` should never produce from its own
    /// `successors()`/`initial_search_state()`.
    fn resolve(
        &self,
        handle: SearchStateHandle,
    ) -> Option<&dyn SearchState>;
}
