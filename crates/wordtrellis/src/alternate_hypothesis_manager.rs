//! # AlternateHypothesisManager
//!
//! Records, for each surviving "winner" word token, the set of losing
//! predecessors that also reached it, so a downstream consumer can rebuild a
//! word lattice after the utterance. It owns no tokens outright — it only
//! holds [`TokenId`]s, which keep loser-side ancestry reachable in the same
//! [`crate::TokenArena`] the `SearchManager` already owns.

use crate::token::TokenId;
use crate::types::FastHashMap;

/// Tracks alternate predecessors and pending successor-rewiring for the
/// optional word-lattice build (`build_word_lattice` config flag).
///
/// Two tables are kept:
/// - `alternates`: winner token -> every alternate predecessor ever recorded
///   for it, directly or inherited via [`Self::change_successor`].
/// - `children`: token -> the tokens created with it as their
///   `word_predecessor` so far this utterance. This is what lets
///   `change_successor` find "successor edges that previously pointed at
///   `loser`" and retarget them, since `Token::predecessor` is otherwise
///   only walked forward-to-back, never indexed back-to-front.
#[derive(Debug, Default)]
pub struct AlternateHypothesisManager {
    alternates: FastHashMap<TokenId, Vec<TokenId>>,
    children: FastHashMap<TokenId, Vec<TokenId>>,
}

impl AlternateHypothesisManager {
    /// An empty manager, built fresh at the start of each utterance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `alt_pred` as an additional predecessor of `winner`.
    pub fn add_alternate_predecessor(
        &mut self,
        winner: TokenId,
        alt_pred: TokenId,
    ) {
        self.alternates.entry(winner).or_default().push(alt_pred);
    }

    /// Record that `child` was created with `parent` as its word
    /// predecessor, so later rewiring via [`Self::change_successor`] can
    /// find it.
    ///
    /// Called for every newly created successor token, mirroring how the
    /// arena records `predecessor` forward-only; this is the reverse index
    /// that makes "retarget `loser`'s successors to `new_winner`" possible.
    pub fn record_child(
        &mut self,
        parent: TokenId,
        child: TokenId,
    ) {
        self.children.entry(parent).or_default().push(child);
    }

    /// Re-target any successor edges that previously pointed at `loser` so
    /// they now point at `new_winner`, and fold `loser`'s accumulated
    /// alternates into `new_winner`'s.
    ///
    /// Used when a loser token had already produced further tokens before
    /// being superseded by a later, better-scoring arrival at the same
    /// state. Returns the list of children that were re-parented, so the
    /// caller can fix up their `Token::predecessor` field in the arena.
    pub fn change_successor(
        &mut self,
        new_winner: TokenId,
        loser: TokenId,
    ) -> Vec<TokenId> {
        if let Some(mut loser_alts) = self.alternates.remove(&loser) {
            self.alternates
                .entry(new_winner)
                .or_default()
                .append(&mut loser_alts);
        }

        match self.children.remove(&loser) {
            Some(rewired) => {
                self.children
                    .entry(new_winner)
                    .or_default()
                    .extend(rewired.iter().copied());
                rewired
            }
            None => Vec::new(),
        }
    }

    /// All alternate predecessors recorded for `winner`, in recording order.
    /// Empty if none were ever recorded.
    pub fn alternates_for(
        &self,
        winner: TokenId,
    ) -> &[TokenId] {
        self.alternates.get(&winner).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct winners with at least one recorded alternate.
    /// Used by `show_token_count` diagnostics.
    pub fn len(&self) -> usize {
        self.alternates.len()
    }

    /// Whether no alternates have been recorded at all.
    pub fn is_empty(&self) -> bool {
        self.alternates.is_empty()
    }
}
