//! Integration tests for the concrete search scenarios: a handful of small,
//! hand-authored `ToyLinguist` graphs driven through `SearchManager`,
//! checking the externally observable behavior of BestTokenMap collisions,
//! alternate-predecessor bookkeeping, relative-beam gating, state-order
//! enforcement, grow-skip intervals, and `keep_all_tokens`.

use wordtrellis::fixtures::{IdentityPruner, ScriptedScorer, ToyLinguist, ToyLinguistBuilder, ToyScorer};
use wordtrellis::{FastHashMap, SearchManager, SearchManagerConfig, SearchStateHandle, StateClassId};

fn find_by_state(manager: &SearchManager<ToyLinguist, impl wordtrellis::Scorer, impl wordtrellis::Pruner>, handle: SearchStateHandle) -> Vec<(wordtrellis::TokenId, f32)> {
    manager
        .arena()
        .iter()
        .filter(|(_, tok)| tok.search_state == handle)
        .map(|(id, tok)| (id, tok.score))
        .collect()
}

#[test]
fn single_state_chain_reaches_one_final_token() {
    let linguist = ToyLinguist::single_path(3);
    let scorer = ToyScorer::constant_score(-1.0, 3);
    let pruner = IdentityPruner;
    let config = SearchManagerConfig::default();

    let mut manager = SearchManager::new(linguist, scorer, pruner, config);
    manager.start().unwrap();
    let result = manager.recognize(10).unwrap();

    assert!(result.is_final);
    assert_eq!(result.result_list.len(), 1);

    let winner = result.result_list[0];
    assert!(manager.arena().get(winner).is_final());
    manager.stop();
}

#[test]
fn two_parallel_paths_collapse_to_the_better_scoring_successor() {
    let non_emit = StateClassId(0);
    let emit = StateClassId(1);

    let start = SearchStateHandle(0);
    let s1 = SearchStateHandle(1);
    let s2 = SearchStateHandle(2);
    let target = SearchStateHandle(3);
    let end = SearchStateHandle(4);

    let linguist = ToyLinguistBuilder::new(vec![non_emit, emit])
        .add_state(start, false, false, false, non_emit)
        .add_state(s1, true, false, false, emit)
        .add_state(s2, true, false, false, emit)
        .add_state(target, true, true, false, emit)
        .add_state(end, false, true, true, non_emit)
        .add_arc(start, s1, 0.0, 0.0, 0.0)
        .add_arc(start, s2, 0.0, 0.0, 0.0)
        .add_arc(s1, target, 0.0, 0.0, 0.0)
        .add_arc(s2, target, 0.0, 0.0, 0.0)
        .add_arc(target, end, 0.0, 0.0, 0.0)
        .with_initial(start)
        .build();

    let mut per_state = FastHashMap::default();
    per_state.insert(s1, -1.0);
    per_state.insert(s2, -2.0);
    per_state.insert(target, -1.0);
    let scorer = ScriptedScorer::new(per_state, -1.0, 4);
    let pruner = IdentityPruner;
    // `keep_all_tokens` so predecessor edges point directly at the spawning
    // token instead of collapsing through word-ancestor compression — this
    // keeps the assertions below about *which* token won focused on the
    // collision itself rather than on compression.
    let config = SearchManagerConfig::default()
        .with_build_word_lattice(true)
        .with_keep_all_tokens(true);

    let mut manager = SearchManager::new(linguist, scorer, pruner, config);
    manager.start().unwrap();
    let result = manager.recognize(10).unwrap();

    assert!(result.is_final);
    assert_eq!(result.result_list.len(), 1);

    let targets = find_by_state(&manager, target);
    assert_eq!(targets.len(), 1, "only the winning successor at `target` should survive");

    let winner_id = targets[0].0;
    let s1_token = manager
        .arena()
        .iter()
        .find(|(_, tok)| tok.search_state == s1)
        .map(|(id, _)| id)
        .unwrap();

    // s1 scores better than s2 (-1.0 vs -2.0), so the token grown from s1
    // should be the one that reaches `target`, and the arrival from s2
    // should be recorded as an alternate.
    assert_eq!(manager.arena().get(winner_id).predecessor, Some(s1_token));
    assert!(!manager.alternates().alternates_for(winner_id).is_empty());
    manager.stop();
}

#[test]
fn relative_beam_gates_out_a_far_worse_parallel_path() {
    let non_emit = StateClassId(0);
    let emit = StateClassId(1);

    let start = SearchStateHandle(0);
    let good = SearchStateHandle(1);
    let bad = SearchStateHandle(2);
    let good_child = SearchStateHandle(3);
    let bad_child = SearchStateHandle(4);

    let linguist = ToyLinguistBuilder::new(vec![non_emit, emit])
        .add_state(start, false, false, false, non_emit)
        .add_state(good, true, false, false, emit)
        .add_state(bad, true, false, false, emit)
        .add_state(good_child, true, true, true, emit)
        .add_state(bad_child, true, true, true, emit)
        .add_arc(start, good, 0.0, 0.0, 0.0)
        .add_arc(start, bad, 0.0, 0.0, 0.0)
        .add_arc(good, good_child, 0.0, 0.0, 0.0)
        .add_arc(bad, bad_child, 0.0, 0.0, 0.0)
        .with_initial(start)
        .build();

    let mut per_state = FastHashMap::default();
    per_state.insert(good, -1.0);
    per_state.insert(bad, -1000.0);
    let scorer = ScriptedScorer::new(per_state, -1.0, 2);
    let pruner = wordtrellis::RelativeBeamPruner::new((1e-10_f32).ln());
    let config = SearchManagerConfig::default().with_relative_beam_width(1e-10).unwrap();

    let mut manager = SearchManager::new(linguist, scorer, pruner, config);
    manager.start().unwrap();
    manager.recognize(3).unwrap();

    assert!(!find_by_state(&manager, good).is_empty(), "the well-scoring path should have grown");
    assert!(
        find_by_state(&manager, bad_child).is_empty(),
        "the far-worse-scoring state should be gated out of growth before reaching its successor"
    );
    manager.stop();
}

#[test]
fn state_order_violation_is_reported_as_a_fatal_error() {
    let earlier = StateClassId(0);
    let later = StateClassId(1);
    let emit = StateClassId(2);

    let start = SearchStateHandle(0);
    let forward = SearchStateHandle(1);
    let backward = SearchStateHandle(2);

    // `backward` has a non-emitting arc back to a class that precedes its
    // own in state order: a state-order violation when checking is enabled.
    let linguist = ToyLinguistBuilder::new(vec![earlier, later, emit])
        .add_state(start, false, false, false, earlier)
        .add_state(forward, false, false, false, later)
        .add_state(backward, false, false, false, earlier)
        .add_arc(start, forward, 0.0, 0.0, 0.0)
        .add_arc(forward, backward, 0.0, 0.0, 0.0)
        .with_initial(start)
        .build();

    let scorer = ToyScorer::constant_score(-1.0, 3);
    let pruner = IdentityPruner;
    let config = SearchManagerConfig::default().with_check_state_order(true);

    let mut manager = SearchManager::new(linguist, scorer, pruner, config);
    assert!(manager.start().is_err(), "state-order violation during seed growth should be fatal");
}

#[test]
fn grow_skip_interval_rescoring_does_not_discard_the_stratum() {
    let linguist = ToyLinguist::single_path(4);
    let scorer = ToyScorer::constant_score(-1.0, 6);
    let pruner = IdentityPruner;
    let config = SearchManagerConfig::default().with_grow_skip_interval(2);

    let mut manager = SearchManager::new(linguist, scorer, pruner, config);
    manager.start().unwrap();
    let result = manager.recognize(10).unwrap();

    assert!(result.is_final);
    assert_eq!(result.result_list.len(), 1, "the chain should still terminate despite skipped growth frames");
    manager.stop();
}

#[test]
fn keep_all_tokens_preserves_every_intermediate_token_as_predecessor() {
    let linguist = ToyLinguist::single_path(3);
    let scorer = ToyScorer::constant_score(-1.0, 3);
    let pruner = IdentityPruner;
    let config = SearchManagerConfig::default().with_keep_all_tokens(true);

    let mut manager = SearchManager::new(linguist, scorer, pruner, config);
    manager.start().unwrap();
    let result = manager.recognize(10).unwrap();

    assert!(result.is_final);
    let winner = result.result_list[0];

    let mut chain_len = 0;
    let mut current = Some(winner);
    while let Some(id) = current {
        chain_len += 1;
        current = manager.arena().get(id).predecessor;
    }
    // non-emitting start, 3 emitting states, non-emitting end: 5 tokens.
    assert_eq!(chain_len, 5);
    manager.stop();
}
