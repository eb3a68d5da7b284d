//! # Token and the per-utterance token arena
//!
//! Tokens are allocated from a dense `Vec`-backed arena and referenced by
//! index rather than as individually heap-owned values. Predecessor links
//! are therefore `Option<TokenId>`, not `Option<&Token>`, which sidesteps
//! the self-referential-lifetime problem an arena-of-references would
//! create inside a struct that also owns the arena.

use crate::linguist::SearchStateHandle;
use crate::types::Score;

/// A stable index into a [`TokenArena`].
///
/// `TokenId`s from different utterances (different arenas) must not be
/// mixed; the arena is replaced wholesale at `SearchManager::start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId(pub(crate) u32);

/// One partial hypothesis at one search state at one frame.
#[derive(Debug, Clone)]
pub struct Token {
    /// Opaque handle into the linguist's graph.
    pub search_state: SearchStateHandle,

    /// The frame at which this token was created.
    pub frame: u64,

    /// Total log-domain path score.
    pub score: Score,

    /// Log-domain acoustic contribution accumulated at this token's frame.
    /// Zero for non-emitting tokens; set by the `Scorer` for emitting ones.
    pub acoustic_score: Score,

    /// Log-probability contribution of the arc that created this token.
    pub language_score: Score,

    /// Log-probability insertion contribution of the arc that created this
    /// token.
    pub insertion_score: Score,

    /// The token this one was grown from. `None` only for the initial
    /// token.
    pub predecessor: Option<TokenId>,

    /// Ephemeral scratch used during look-ahead-aware growth
    /// (`grow_emitting_branches`). Meaningless outside of that call.
    pub working_score: Score,

    /// Whether traversing `search_state` consumes a frame.
    pub emitting: bool,

    /// Whether `search_state` is a word state.
    pub word: bool,

    /// Whether `search_state` is marked final.
    pub final_state: bool,
}

impl Token {
    /// Whether this token's search state is emitting.
    #[inline]
    pub fn is_emitting(&self) -> bool {
        self.emitting
    }

    /// Whether this token's search state is a word state.
    #[inline]
    pub fn is_word(&self) -> bool {
        self.word
    }

    /// Whether this token's search state is marked final.
    #[inline]
    pub fn is_final(&self) -> bool {
        self.final_state
    }
}

/// Dense, append-only storage for the tokens of a single utterance.
///
/// Replaced (not cleared in place) by `SearchManager::start`, and dropped
/// wholesale at `SearchManager::stop` — there is no per-token reclamation;
/// everything goes at once rather than tracking individual token
/// lifetimes.
#[derive(Debug, Default)]
pub struct TokenArena {
    tokens: Vec<Token>,
}

impl TokenArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Allocate `token` and return its stable id.
    pub fn alloc(
        &mut self,
        token: Token,
    ) -> TokenId {
        let id = TokenId(self.tokens.len() as u32);
        self.tokens.push(token);
        id
    }

    /// Borrow the token at `id`.
    #[inline]
    pub fn get(
        &self,
        id: TokenId,
    ) -> &Token {
        &self.tokens[id.0 as usize]
    }

    /// Mutably borrow the token at `id`.
    ///
    /// Used only by the scorer (to finalize `acoustic_score`/`score`) and by
    /// the `AlternateHypothesisManager`'s successor-rewiring — the narrow
    /// mutation-after-creation exceptions.
    #[inline]
    pub fn get_mut(
        &mut self,
        id: TokenId,
    ) -> &mut Token {
        &mut self.tokens[id.0 as usize]
    }

    /// Number of tokens ever allocated in this arena (live or not — nothing
    /// is individually freed).
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the arena has allocated any tokens yet.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate every token ever allocated, paired with its id, in
    /// allocation order.
    ///
    /// Exposed so a downstream lattice-construction consumer (or a test)
    /// can walk the whole arena without needing to construct a [`TokenId`]
    /// by hand — its inner field is crate-private by design.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &Token)> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(i, tok)| (TokenId(i as u32), tok))
    }

    /// Walk `id`'s predecessor chain until an emitting token is found.
    ///
    /// Returns `None` if no emitting ancestor exists (e.g. `id` is the
    /// initial token, or every ancestor is non-emitting). Used by the
    /// acoustic look-ahead variant of growth.
    pub fn last_emitting_ancestor(
        &self,
        id: TokenId,
    ) -> Option<TokenId> {
        let mut current = self.get(id).predecessor;
        while let Some(candidate) = current {
            let tok = self.get(candidate);
            if tok.is_emitting() {
                return Some(candidate);
            }
            current = tok.predecessor;
        }
        None
    }

    /// Walk `id`'s predecessor chain (inclusive of `id` itself) until a
    /// word token is found. Returns `None` if none exists.
    ///
    /// This is the "keep word history only" compression `word_predecessor`
    /// describes; `SearchManager` calls this directly unless
    /// `keep_all_tokens` is set, in which case it is bypassed entirely (the
    /// token itself is used).
    pub fn nearest_word_ancestor(
        &self,
        id: TokenId,
    ) -> Option<TokenId> {
        let mut current = Some(id);
        while let Some(candidate) = current {
            let tok = self.get(candidate);
            if tok.is_word() {
                return Some(candidate);
            }
            current = tok.predecessor;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linguist::SearchStateHandle;

    fn plain_token(
        frame: u64,
        score: Score,
        predecessor: Option<TokenId>,
    ) -> Token {
        Token {
            search_state: SearchStateHandle(0),
            frame,
            score,
            acoustic_score: 0.0,
            language_score: 0.0,
            insertion_score: 0.0,
            predecessor,
            working_score: 0.0,
            emitting: false,
            word: false,
            final_state: false,
        }
    }

    #[test]
    fn test_alloc_and_get() {
        let mut arena = TokenArena::new();
        let id = arena.alloc(plain_token(0, -1.0, None));
        assert_eq!(arena.get(id).score, -1.0);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_last_emitting_ancestor() {
        let mut arena = TokenArena::new();
        let root = arena.alloc(plain_token(0, 0.0, None));

        let mut emitting = plain_token(1, -1.0, Some(root));
        emitting.emitting = true;
        let emit_id = arena.alloc(emitting);

        let non_emit = arena.alloc(plain_token(1, -1.0, Some(emit_id)));

        assert_eq!(arena.last_emitting_ancestor(non_emit), Some(emit_id));
        assert_eq!(arena.last_emitting_ancestor(root), None);
    }

    #[test]
    fn test_nearest_word_ancestor() {
        let mut arena = TokenArena::new();
        let root = arena.alloc(plain_token(0, 0.0, None));

        let mut word_tok = plain_token(1, -1.0, Some(root));
        word_tok.word = true;
        let word_id = arena.alloc(word_tok);

        let non_word = arena.alloc(plain_token(2, -2.0, Some(word_id)));

        assert_eq!(arena.nearest_word_ancestor(non_word), Some(word_id));
        assert_eq!(arena.nearest_word_ancestor(root), None);
    }
}
