//! # BestTokenMap
//!
//! Map from search-state key to the best token reaching that state this
//! frame. Rebuilt fresh every frame, sized as an initial capacity hint
//! around 2x the previous active-list size.
//!
//! The bounded k-best variant keeps a `dary_heap::OctonaryHeap` of
//! candidate evictions and lazily discards stale entries by comparing the
//! popped entry's cached score against the authoritative entry map — a heap
//! used only for "what's the worst thing in here right now", with a hash
//! map as the source of truth: `dary_heap::OctonaryHeap<Reverse<_>>` for
//! eviction order, `FastHashMap<K, TokenId>` as the authoritative per-key
//! table, and a validate-on-pop loop to skip stale heap entries.

use std::cmp::Reverse;
use std::hash::Hash;

use dary_heap::OctonaryHeap;

use crate::token::{TokenArena, TokenId};
use crate::types::{FastHashMap, Score};

/// A total-order wrapper over [`Score`].
///
/// Search scores are finite log-probabilities in normal operation; this
/// crate never constructs a `NaN` score, so `partial_cmp` is infallible in
/// practice.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrderedScore(Score);

impl Eq for OrderedScore {}

impl PartialOrd for OrderedScore {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedScore {
    fn cmp(
        &self,
        other: &Self,
    ) -> std::cmp::Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(std::cmp::Ordering::Equal)
    }
}

/// A heap entry: a key's score at the time it was pushed. May be stale if
/// `key` has since been `put` again with a different token.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HeapEntry<K> {
    score: OrderedScore,
    key: K,
}

impl<K: PartialEq> PartialOrd for HeapEntry<K> {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Eq> Ord for HeapEntry<K> {
    fn cmp(
        &self,
        other: &Self,
    ) -> std::cmp::Ordering {
        self.score.cmp(&other.score)
    }
}

/// Map from a search-state key to the best token reaching it this frame.
///
/// `K` is `SearchStateHandle` by default, or [`crate::LexWordKey`] for the
/// heap-keyed variant that collapses parallel paths sharing lexical state
/// and word history.
pub enum BestTokenMap<K: Eq + Hash + Clone> {
    /// `put` unconditionally overwrites; `get` returns the current best.
    Single(FastHashMap<K, TokenId>),

    /// Keeps the top `max_heap_size` entries across all keys, evicting the
    /// globally weakest on overflow. A candidate that would only beat some
    /// keys, not all, can still get in this way — an intentional asymmetry,
    /// not a bug.
    Bounded {
        max_heap_size: usize,
        entries: FastHashMap<K, TokenId>,
        eviction_order: OctonaryHeap<Reverse<HeapEntry<K>>>,
    },
}

impl<K: Eq + Hash + Clone> BestTokenMap<K> {
    /// The default, single-best-per-state map, sized as an initial
    /// capacity hint.
    pub fn single(capacity_hint: usize) -> Self {
        Self::Single(FastHashMap::with_capacity_and_hasher(
            capacity_hint,
            ahash::RandomState::default(),
        ))
    }

    /// The bounded top-`max_heap_size` map.
    pub fn bounded(
        max_heap_size: usize,
        capacity_hint: usize,
    ) -> Self {
        Self::Bounded {
            max_heap_size,
            entries: FastHashMap::with_capacity_and_hasher(capacity_hint, ahash::RandomState::default()),
            eviction_order: OctonaryHeap::with_capacity(capacity_hint),
        }
    }

    /// Look up the current best token for `key`.
    ///
    /// Under `Bounded`: returns the exact-state entry if present; otherwise
    /// `None` if there is still room (fewer than `max_heap_size` entries);
    /// otherwise the token for the single weakest-scoring entry in the
    /// whole map, regardless of `key`.
    pub fn get(
        &mut self,
        arena: &TokenArena,
        key: &K,
    ) -> Option<TokenId> {
        match self {
            Self::Single(map) => map.get(key).copied(),
            Self::Bounded {
                max_heap_size,
                entries,
                eviction_order,
            } => {
                if let Some(&id) = entries.get(key) {
                    return Some(id);
                }
                if entries.len() < *max_heap_size {
                    return None;
                }
                Self::weakest_live(entries, eviction_order, arena)
            }
        }
    }

    /// Record `id` (whose key is `key`) as the current best for `key`.
    pub fn put(
        &mut self,
        arena: &TokenArena,
        key: K,
        id: TokenId,
    ) {
        match self {
            Self::Single(map) => {
                map.insert(key, id);
            }
            Self::Bounded {
                max_heap_size,
                entries,
                eviction_order,
            } => {
                entries.insert(key.clone(), id);
                eviction_order.push(Reverse(HeapEntry {
                    score: OrderedScore(arena.get(id).score),
                    key,
                }));

                while entries.len() > *max_heap_size {
                    let Some(Reverse(evicted)) = Self::pop_live(entries, eviction_order, arena) else {
                        break;
                    };
                    entries.remove(&evicted.key);
                }
            }
        }
    }

    /// Number of distinct keys currently recorded.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(map) => map.len(),
            Self::Bounded { entries, .. } => entries.len(),
        }
    }

    /// Whether no keys are currently recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find (without removing) the weakest entry still reflected in
    /// `entries`, discarding stale heap entries as we go.
    fn weakest_live(
        entries: &FastHashMap<K, TokenId>,
        eviction_order: &mut OctonaryHeap<Reverse<HeapEntry<K>>>,
        arena: &TokenArena,
    ) -> Option<TokenId> {
        loop {
            let Reverse(candidate) = eviction_order.peek()?;
            match entries.get(&candidate.key) {
                Some(&id) if arena.get(id).score == candidate.score.0 => return Some(id),
                _ => {
                    eviction_order.pop();
                }
            }
        }
    }

    /// Pop the weakest live entry (discarding stale ones first).
    fn pop_live(
        entries: &FastHashMap<K, TokenId>,
        eviction_order: &mut OctonaryHeap<Reverse<HeapEntry<K>>>,
        arena: &TokenArena,
    ) -> Option<Reverse<HeapEntry<K>>> {
        loop {
            let Reverse(candidate) = eviction_order.pop()?;
            match entries.get(&candidate.key) {
                Some(&id) if arena.get(id).score == candidate.score.0 => {
                    return Some(Reverse(candidate));
                }
                _ => continue,
            }
        }
    }
}
