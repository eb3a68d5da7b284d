//! # Test fixtures
//!
//! Small, explicit, in-memory [`Linguist`]/[`Scorer`]/[`Pruner`]
//! implementations, enough to construct a recognition scenario as a unit
//! test without a real acoustic model or dictionary. Gated behind the
//! `testing` feature so downstream integration tests can reuse them too.

use crate::active_list::SimpleActiveList;
use crate::errors::WtResult;
use crate::linguist::{Arc as LinguistArc, Linguist, SearchState, SearchStateHandle};
use crate::pruner::Pruner;
use crate::scorer::Scorer;
use crate::token::{TokenArena, TokenId};
use crate::types::{FastHashMap, Score, StateClassId};

/// One hand-authored node in a [`ToyLinguist`]'s graph.
#[derive(Debug, Clone)]
struct ToyState {
    handle: SearchStateHandle,
    emitting: bool,
    word: bool,
    final_state: bool,
    class: StateClassId,
    successors: Vec<LinguistArc>,
}

impl SearchState for ToyState {
    fn is_emitting(&self) -> bool {
        self.emitting
    }

    fn is_word(&self) -> bool {
        self.word
    }

    fn is_final(&self) -> bool {
        self.final_state
    }

    fn state_class(&self) -> StateClassId {
        self.class
    }

    fn successors(&self) -> Vec<LinguistArc> {
        self.successors.clone()
    }

    fn handle(&self) -> SearchStateHandle {
        self.handle
    }
}

/// A small, explicit, hand-authored search-state graph.
///
/// Built with [`ToyLinguistBuilder`], or one of the ready-made
/// constructors below for common shapes.
#[derive(Debug, Clone)]
pub struct ToyLinguist {
    states: FastHashMap<SearchStateHandle, ToyState>,
    initial: SearchStateHandle,
    state_order: Vec<StateClassId>,
}

impl Linguist for ToyLinguist {
    fn start(&mut self) -> WtResult<()> {
        Ok(())
    }

    fn stop(&mut self) {}

    fn initial_search_state(&self) -> SearchStateHandle {
        self.initial
    }

    fn search_state_order(&self) -> &[StateClassId] {
        &self.state_order
    }

    fn resolve(
        &self,
        handle: SearchStateHandle,
    ) -> Option<&dyn SearchState> {
        self.states.get(&handle).map(|s| s as &dyn SearchState)
    }
}

impl ToyLinguist {
    /// A single non-emitting start state, `n_emitting` emitting states in a
    /// chain, and a non-emitting, final, word-marked end state — a toy
    /// chain A -> B -> ... -> Z, with Z final.
    ///
    /// Class 0 is non-emitting (start/end), class 1 is emitting. All arc
    /// probabilities are `0.0` (unit probability in the log domain).
    pub fn single_path(n_emitting: usize) -> Self {
        let non_emitting = StateClassId(0);
        let emitting = StateClassId(1);

        let mut builder = ToyLinguistBuilder::new(vec![non_emitting, emitting]);

        let start = SearchStateHandle(0);
        builder = builder.add_state(start, false, false, false, non_emitting);
        builder = builder.with_initial(start);

        let mut previous = start;
        for i in 0..n_emitting {
            let handle = SearchStateHandle((i + 1) as u64);
            builder = builder.add_state(handle, true, false, false, emitting);
            builder = builder.add_arc(previous, handle, 0.0, 0.0, 0.0);
            previous = handle;
        }

        let end = SearchStateHandle((n_emitting + 1) as u64);
        builder = builder.add_state(end, false, true, true, non_emitting);
        builder = builder.add_arc(previous, end, 0.0, 0.0, 0.0);

        builder.build()
    }
}

/// Builds a [`ToyLinguist`] one state/arc at a time.
#[derive(Debug, Clone)]
pub struct ToyLinguistBuilder {
    states: FastHashMap<SearchStateHandle, ToyState>,
    initial: Option<SearchStateHandle>,
    state_order: Vec<StateClassId>,
}

impl ToyLinguistBuilder {
    /// Start a builder with the given fixed state-class order: non-emitting
    /// classes before emitting ones, by convention the last entry is the
    /// single emitting class.
    pub fn new(state_order: Vec<StateClassId>) -> Self {
        Self {
            states: FastHashMap::default(),
            initial: None,
            state_order,
        }
    }

    /// Add a state. Overwrites any prior state registered at `handle`.
    pub fn add_state(
        mut self,
        handle: SearchStateHandle,
        emitting: bool,
        word: bool,
        final_state: bool,
        class: StateClassId,
    ) -> Self {
        self.states.insert(
            handle,
            ToyState {
                handle,
                emitting,
                word,
                final_state,
                class,
                successors: Vec::new(),
            },
        );
        self
    }

    /// Add an arc `from -> to`. Both ends must already have been registered
    /// with [`Self::add_state`].
    pub fn add_arc(
        mut self,
        from: SearchStateHandle,
        to: SearchStateHandle,
        probability: Score,
        language_probability: Score,
        insertion_probability: Score,
    ) -> Self {
        if let Some(state) = self.states.get_mut(&from) {
            state.successors.push(LinguistArc {
                state: to,
                probability,
                language_probability,
                insertion_probability,
            });
        }
        self
    }

    /// Designate `handle` as the entry point of the graph.
    pub fn with_initial(
        mut self,
        handle: SearchStateHandle,
    ) -> Self {
        self.initial = Some(handle);
        self
    }

    /// Finish building. Panics if no initial state was designated — this is
    /// a test-fixture construction error, not a runtime one, the same
    /// contract `ToyLinguist`'s own constructors rely on.
    pub fn build(self) -> ToyLinguist {
        let initial = self.initial.expect("ToyLinguistBuilder: no initial state designated");
        ToyLinguist {
            states: self.states,
            initial,
            state_order: self.state_order,
        }
    }
}

/// A [`Scorer`] that plays back a fixed, pre-authored sequence of acoustic
/// scores, one per frame, then signals end-of-stream.
///
/// Every token in a stratum receives the same per-frame score (a
/// simplification — nothing in the `Scorer` contract requires
/// differentiating tokens within a stratum).
#[derive(Debug, Clone)]
pub struct ToyScorer {
    scores: Vec<Score>,
    frame_idx: usize,
}

impl ToyScorer {
    /// Play back `scores` in order, one per `calculate_scores` call.
    pub fn from_scores(scores: Vec<Score>) -> Self {
        Self { scores, frame_idx: 0 }
    }

    /// The same `score` for `n_frames` frames.
    pub fn constant_score(
        score: Score,
        n_frames: usize,
    ) -> Self {
        Self::from_scores(vec![score; n_frames])
    }
}

impl Scorer for ToyScorer {
    fn start(&mut self) {
        self.frame_idx = 0;
    }

    fn stop(&mut self) {}

    fn calculate_scores(
        &mut self,
        arena: &mut TokenArena,
        stratum: &[TokenId],
    ) -> Option<TokenId> {
        if stratum.is_empty() {
            // An empty active list is not fatal; the recognizer finalizes on
            // the next iteration since the scorer sees no tokens to score.
            return None;
        }
        if self.frame_idx >= self.scores.len() {
            return None;
        }

        let score = self.scores[self.frame_idx];
        self.frame_idx += 1;

        let mut best: Option<TokenId> = None;
        for &id in stratum {
            let token = arena.get_mut(id);
            token.acoustic_score = score;
            token.score += score;
        }
        for &id in stratum {
            best = Some(match best {
                None => id,
                Some(current_best) if arena.get(id).score > arena.get(current_best).score => id,
                Some(current_best) => current_best,
            });
        }
        best
    }
}

/// A [`Scorer`] that scores each token by looking its search state up in a
/// fixed table, falling back to a default score for states not listed.
///
/// `ToyScorer` only supports a single score shared by every token in a
/// stratum; this fixture is for scenarios (e.g. two parallel paths
/// collapsing into one) that need different states to score differently
/// within the same frame.
#[derive(Debug, Clone)]
pub struct ScriptedScorer {
    per_state_scores: FastHashMap<SearchStateHandle, Score>,
    default_score: Score,
    frame_idx: usize,
    max_frames: usize,
}

impl ScriptedScorer {
    /// Score tokens by `per_state_scores[token.search_state]`, falling back
    /// to `default_score`, for up to `max_frames` frames.
    pub fn new(
        per_state_scores: FastHashMap<SearchStateHandle, Score>,
        default_score: Score,
        max_frames: usize,
    ) -> Self {
        Self {
            per_state_scores,
            default_score,
            frame_idx: 0,
            max_frames,
        }
    }
}

impl Scorer for ScriptedScorer {
    fn start(&mut self) {
        self.frame_idx = 0;
    }

    fn stop(&mut self) {}

    fn calculate_scores(
        &mut self,
        arena: &mut TokenArena,
        stratum: &[TokenId],
    ) -> Option<TokenId> {
        if stratum.is_empty() || self.frame_idx >= self.max_frames {
            return None;
        }
        self.frame_idx += 1;

        for &id in stratum {
            let handle = arena.get(id).search_state;
            let score = *self.per_state_scores.get(&handle).unwrap_or(&self.default_score);
            let token = arena.get_mut(id);
            token.acoustic_score = score;
            token.score += score;
        }

        let mut best: Option<TokenId> = None;
        for &id in stratum {
            best = Some(match best {
                None => id,
                Some(current_best) if arena.get(id).score > arena.get(current_best).score => id,
                Some(current_best) => current_best,
            });
        }
        best
    }
}

/// A [`Pruner`] that returns its input unchanged — useful for isolating
/// growth/lattice behavior in tests from beam-pruning effects.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityPruner;

impl Pruner for IdentityPruner {
    fn prune(
        &mut self,
        _arena: &TokenArena,
        active_list: SimpleActiveList,
    ) -> SimpleActiveList {
        active_list
    }
}
