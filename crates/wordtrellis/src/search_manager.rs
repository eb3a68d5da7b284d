//! # SearchManager — the core per-frame loop
//!
//! Drives score -> prune -> grow-emitting -> grow-non-emitting-to-fixpoint
//! against the `Linguist`/`Scorer`/`Pruner` collaborators. A single struct
//! orchestrating a handful of small, independently testable collaborators
//! through a staged pipeline, logged at natural checkpoints with `log`.

use crate::active_list::{ActiveList, SimpleActiveList};
use crate::active_list_manager::ActiveListManager;
use crate::alternate_hypothesis_manager::AlternateHypothesisManager;
use crate::best_token_map::BestTokenMap;
use crate::config::SearchManagerConfig;
use crate::errors::{WordtrellisError, WtResult};
use crate::linguist::{BestTokenKey, Linguist, SearchState};
use crate::pruner::Pruner;
use crate::scorer::Scorer;
use crate::token::{Token, TokenArena, TokenId};
use crate::types::{FastHashMap, Score, StateClassId};

/// Lifecycle states a [`SearchManager`] moves through:
/// `Created -> Started -> Frame(n) -> Stopped`. Reentering `start()` after
/// `stop()` re-initializes the frame counter to 0 and returns to `Started`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, never started.
    Created,
    /// Started, no frame has been scored yet.
    Started,
    /// At least one frame has been scored; `n` is the current frame index.
    Frame(u64),
    /// Stopped; `recognize` may not be called again until `start`.
    Stopped,
}

/// A snapshot of recognition state, returned by [`SearchManager::recognize`].
///
/// `alt_manager` and `final_active_list` are not duplicated here: the
/// former is exposed via [`SearchManager::alternates`] and the latter via
/// [`SearchManager::final_active_list`], since both are meaningless without
/// the [`TokenArena`] (also borrowed from the manager, via
/// [`SearchManager::arena`]) that gives their [`TokenId`]s meaning.
#[derive(Debug, Clone, Default)]
pub struct RecognitionResult {
    /// Terminal tokens reached this frame (word tokens, unless
    /// `keep_all_tokens` is set).
    pub result_list: Vec<TokenId>,
    /// The frame index after this call to `recognize`.
    pub current_frame: u64,
    /// Whether the scorer has signalled end-of-stream.
    pub is_final: bool,
}

/// The word-pruning breadth-first search core.
///
/// Generic over the three consumed collaborators so callers can wire real
/// acoustic-model-backed implementations without the core ever naming a
/// concrete type for them.
pub struct SearchManager<L: Linguist, S: Scorer, P: Pruner> {
    linguist: L,
    scorer: S,
    pruner: P,
    config: SearchManagerConfig,

    arena: TokenArena,
    active_list_manager: ActiveListManager,
    alt_manager: AlternateHypothesisManager,
    result_list: Vec<TokenId>,
    class_rank: FastHashMap<StateClassId, usize>,

    current_frame: u64,
    is_final: bool,
    lifecycle: Lifecycle,
}

impl<L: Linguist, S: Scorer, P: Pruner> SearchManager<L, S, P> {
    /// Build a manager around the given collaborators and configuration.
    /// Nothing runs until [`Self::start`] is called.
    pub fn new(
        linguist: L,
        scorer: S,
        pruner: P,
        config: SearchManagerConfig,
    ) -> Self {
        Self {
            linguist,
            scorer,
            pruner,
            config,
            arena: TokenArena::new(),
            active_list_manager: ActiveListManager::default(),
            alt_manager: AlternateHypothesisManager::new(),
            result_list: Vec::new(),
            class_rank: FastHashMap::default(),
            current_frame: 0,
            is_final: false,
            lifecycle: Lifecycle::Created,
        }
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// The token arena backing every [`TokenId`] this manager has ever
    /// handed out, live or not.
    pub fn arena(&self) -> &TokenArena {
        &self.arena
    }

    /// The alternate-predecessor/lattice-edge table accumulated so far.
    /// Empty unless `build_word_lattice` is set.
    pub fn alternates(&self) -> &AlternateHypothesisManager {
        &self.alt_manager
    }

    /// A non-destructive snapshot of the current emitting stratum.
    pub fn final_active_list(&self) -> SimpleActiveList {
        self.active_list_manager.peek_emitting()
    }

    /// Start (or restart) the collaborators and seed the first emitting
    /// stratum.
    ///
    /// Creates the initial search state's token, places it in its
    /// class-appropriate stratum, then runs `grow_branches` followed by
    /// `grow_non_emitting_lists` so the first emitting stratum is fully
    /// populated before any frame is scored.
    pub fn start(&mut self) -> WtResult<()> {
        self.linguist.start()?;
        self.scorer.start();
        self.pruner.start();

        self.arena = TokenArena::new();
        self.alt_manager = AlternateHypothesisManager::new();
        self.result_list = Vec::new();
        self.current_frame = 0;
        self.is_final = false;

        let state_order = self.linguist.search_state_order().to_vec();
        let emitting_class = *state_order.last().ok_or(WordtrellisError::MissingInitialState)?;
        self.class_rank = state_order.iter().enumerate().map(|(rank, &c)| (c, rank)).collect();
        self.active_list_manager = ActiveListManager::new(state_order, emitting_class);

        let initial_handle = self.linguist.initial_search_state();
        let initial_state = self
            .linguist
            .resolve(initial_handle)
            .ok_or(WordtrellisError::MissingInitialState)?;
        let initial_class = initial_state.state_class();
        if !self.class_rank.contains_key(&initial_class) {
            return Err(WordtrellisError::MissingInitialState);
        }

        let initial_token = Token {
            search_state: initial_handle,
            frame: 0,
            score: 0.0,
            acoustic_score: 0.0,
            language_score: 0.0,
            insertion_score: 0.0,
            predecessor: None,
            working_score: 0.0,
            emitting: initial_state.is_emitting(),
            word: initial_state.is_word(),
            final_state: initial_state.is_final(),
        };
        let initial_id = self.arena.alloc(initial_token);
        self.active_list_manager.add(initial_class, initial_id)?;

        let seed = self.active_list_manager.take_class(initial_class);
        let mut best_map = Self::fresh_best_token_map(seed.size());
        self.grow_branches(&seed, &mut best_map)?;
        self.grow_non_emitting_lists(&mut best_map)?;

        self.lifecycle = Lifecycle::Started;
        log::info!("search manager started; initial class {initial_class:?}");
        Ok(())
    }

    /// Run up to `n_frames` iterations of the per-frame loop, stopping early
    /// if the scorer signals end-of-stream.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn recognize(
        &mut self,
        n_frames: u32,
    ) -> WtResult<RecognitionResult> {
        self.require_started()?;

        for _ in 0..n_frames {
            if self.is_final {
                break;
            }

            let stratum = self.active_list_manager.emitting_list();
            self.current_frame += 1;
            self.lifecycle = Lifecycle::Frame(self.current_frame);

            log::debug!(
                "frame {}: scoring {} emitting tokens",
                self.current_frame,
                stratum.size()
            );

            let ids: Vec<TokenId> = stratum.iterate().to_vec();
            let best = self.scorer.calculate_scores(&mut self.arena, &ids);

            if best.is_none() {
                log::info!("frame {}: scorer signalled end of stream", self.current_frame);
                self.is_final = true;
                self.active_list_manager.set_emitting_list(stratum);
                break;
            }

            if self.config.grow_skip_interval > 1
                && self.current_frame % u64::from(self.config.grow_skip_interval) == 0
            {
                log::trace!("frame {}: growth skipped", self.current_frame);
                self.active_list_manager.set_emitting_list(stratum);
                continue;
            }

            let capacity_hint = (stratum.size() * 2).max(1);
            let mut best_map = Self::fresh_best_token_map(capacity_hint);

            let pruned = self.pruner.prune(&self.arena, stratum);

            if self.config.show_token_count {
                log::debug!(
                    "frame {}: {} tokens survive pruning",
                    self.current_frame,
                    pruned.size()
                );
            }

            self.result_list.clear();

            if self.config.acoustic_lookahead_frames > 0.0 {
                self.grow_emitting_branches(&pruned, &mut best_map)?;
            } else {
                self.grow_branches(&pruned, &mut best_map)?;
            }

            self.grow_non_emitting_lists(&mut best_map)?;

            if self.config.show_token_count {
                for (class, size) in self.active_list_manager.slot_sizes() {
                    log::trace!("frame {}: class {class:?} holds {size} tokens", self.current_frame);
                }
            }
        }

        Ok(self.snapshot())
    }

    /// Stop the collaborators; the final result list remains readable via
    /// [`Self::arena`]/[`Self::alternates`] until the next `start()`.
    pub fn stop(&mut self) {
        log::info!(
            "search manager stopped at frame {}: {} tokens allocated, {} lattice winners recorded",
            self.current_frame,
            self.arena.len(),
            self.alt_manager.len(),
        );
        self.scorer.stop();
        self.pruner.stop();
        self.linguist.stop();
        self.lifecycle = Lifecycle::Stopped;
    }

    fn snapshot(&self) -> RecognitionResult {
        RecognitionResult {
            result_list: self.result_list.clone(),
            current_frame: self.current_frame,
            is_final: self.is_final,
        }
    }

    fn require_started(&self) -> WtResult<()> {
        match self.lifecycle {
            Lifecycle::Created | Lifecycle::Stopped => Err(WordtrellisError::NotStarted),
            _ => Ok(()),
        }
    }

    fn fresh_best_token_map(capacity_hint: usize) -> BestTokenMap<BestTokenKey> {
        BestTokenMap::single(capacity_hint.max(1))
    }

    /// `word_predecessor(token)`: under `keep_all_tokens`, the token itself;
    /// otherwise the nearest word ancestor (possibly `None`), collapsing
    /// non-word intermediate states out of predecessor chains.
    fn word_predecessor(
        &self,
        id: TokenId,
    ) -> Option<TokenId> {
        if self.config.keep_all_tokens {
            Some(id)
        } else {
            self.arena.nearest_word_ancestor(id)
        }
    }

    /// Iterate `list`; for each token whose score clears the list's beam
    /// threshold, grow its successors.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, list, best_map)))]
    fn grow_branches(
        &mut self,
        list: &SimpleActiveList,
        best_map: &mut BestTokenMap<BestTokenKey>,
    ) -> WtResult<()> {
        let threshold = list.beam_threshold(&self.arena, self.config.relative_beam_width_log());
        let ids: Vec<TokenId> = list.iterate().to_vec();
        for id in ids {
            if self.arena.get(id).score >= threshold {
                self.collect_successors(id, best_map)?;
            }
        }
        Ok(())
    }

    /// The acoustic-look-ahead-gated growth variant, used only when
    /// `acoustic_lookahead_frames > 0`. Computes a scratch `working_score`
    /// per token and gates growth on it without touching `score` itself.
    fn grow_emitting_branches(
        &mut self,
        list: &SimpleActiveList,
        best_map: &mut BestTokenMap<BestTokenKey>,
    ) -> WtResult<()> {
        let lookahead = self.config.acoustic_lookahead_frames;
        let ids: Vec<TokenId> = list.iterate().to_vec();

        let mut working: Vec<(TokenId, Score)> = Vec::with_capacity(ids.len());
        let mut best_working = Score::NEG_INFINITY;

        for &id in &ids {
            let (acoustic_score, score) = {
                let t = self.arena.get(id);
                (t.acoustic_score, t.score)
            };
            let ancestor_acoustic = self
                .arena
                .last_emitting_ancestor(id)
                .map(|a| self.arena.get(a).acoustic_score)
                .unwrap_or(0.0);
            let delta = acoustic_score - ancestor_acoustic;
            let working_score = score + (acoustic_score + delta) * lookahead;

            self.arena.get_mut(id).working_score = working_score;
            working.push((id, working_score));
            best_working = best_working.max(working_score);
        }

        let gate = best_working + self.config.relative_beam_width_log();
        for (id, working_score) in working {
            if working_score >= gate {
                self.collect_successors(id, best_map)?;
            }
        }
        Ok(())
    }

    /// Drain non-emitting strata to ε-closure fixpoint: take the next
    /// non-empty non-emitting stratum in state-class order, prune it, grow
    /// it, and repeat until none remain.
    fn grow_non_emitting_lists(
        &mut self,
        best_map: &mut BestTokenMap<BestTokenKey>,
    ) -> WtResult<()> {
        while let Some((_class, stratum)) = self.active_list_manager.take_next_non_emitting() {
            let pruned = self.pruner.prune(&self.arena, stratum);
            self.grow_branches(&pruned, best_map)?;
        }
        Ok(())
    }

    /// Expand `id`'s outgoing arcs against the frame's shared
    /// [`BestTokenMap`].
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, best_map)))]
    fn collect_successors(
        &mut self,
        id: TokenId,
        best_map: &mut BestTokenMap<BestTokenKey>,
    ) -> WtResult<()> {
        let (score, emitting, final_state, source_handle) = {
            let t = self.arena.get(id);
            (t.score, t.is_emitting(), t.is_final(), t.search_state)
        };

        let word_pred = self.word_predecessor(id);

        if final_state {
            if let Some(wp) = word_pred {
                self.result_list.push(wp);
            }
            return Ok(());
        }

        let source_state = self
            .linguist
            .resolve(source_handle)
            .ok_or(WordtrellisError::UnresolvableState(source_handle))?;
        let source_class = source_state.state_class();
        let arcs = source_state.successors();

        for arc in arcs {
            let entry_score = score + arc.probability;

            let target_state = self
                .linguist
                .resolve(arc.state)
                .ok_or(WordtrellisError::UnresolvableState(arc.state))?;
            let target_class = target_state.state_class();

            if self.config.check_state_order && !emitting {
                let source_rank = self.class_rank(source_class)?;
                let target_rank = self.class_rank(target_class)?;
                if target_rank < source_rank {
                    return Err(WordtrellisError::StateOrderViolation {
                        from: source_class,
                        to: target_class,
                    });
                }
            }

            let key = BestTokenKey::for_state(target_state);
            let best = best_map.get(&self.arena, &key);
            let target_is_word = target_state.is_word();

            match best {
                Some(old_best) if entry_score <= self.arena.get(old_best).score => {
                    if self.config.build_word_lattice && target_is_word {
                        if let Some(wp) = word_pred {
                            self.alt_manager.add_alternate_predecessor(old_best, wp);
                        }
                    }
                }
                _ => {
                    let new_token = Token {
                        search_state: arc.state,
                        frame: self.current_frame,
                        score: entry_score,
                        acoustic_score: 0.0,
                        language_score: arc.language_probability,
                        insertion_score: arc.insertion_probability,
                        predecessor: word_pred,
                        working_score: 0.0,
                        emitting: target_state.is_emitting(),
                        word: target_is_word,
                        final_state: target_state.is_final(),
                    };
                    let new_id = self.arena.alloc(new_token);

                    if let Some(wp) = word_pred {
                        self.alt_manager.record_child(wp, new_id);
                    }
                    best_map.put(&self.arena, key, new_id);

                    match best {
                        None => {
                            self.active_list_manager.add(target_class, new_id)?;
                        }
                        Some(old_best) => {
                            self.active_list_manager.replace(target_class, old_best, new_id)?;

                            if self.config.build_word_lattice && target_is_word {
                                let rewired = self.alt_manager.change_successor(new_id, old_best);
                                for child in rewired {
                                    self.arena.get_mut(child).predecessor = Some(new_id);
                                }
                                if let Some(old_pred) = self.arena.get(old_best).predecessor {
                                    self.alt_manager.add_alternate_predecessor(new_id, old_pred);
                                }
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn class_rank(
        &self,
        class: StateClassId,
    ) -> WtResult<usize> {
        self.class_rank
            .get(&class)
            .copied()
            .ok_or(WordtrellisError::UnknownStateClass { class })
    }
}
