//! # Common Types
//!
//! Small shared type aliases, kept in one place so the hashing strategy and
//! score domain have exactly one definition each.

use std::collections::{HashMap, HashSet};

/// Log-domain path score. Addition in this domain corresponds to
/// multiplication of linear-domain probabilities.
pub type Score = f32;

/// A dense identifier for a state-class, assigned by the `Linguist`. A
/// small dense integer rather than a type tag, so routing never needs
/// reflection over a runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateClassId(pub u16);

/// Hash map keyed on values with a fast, non-cryptographic hasher.
pub type FastHashMap<K, V> = HashMap<K, V, ahash::RandomState>;

/// Hash set with a fast, non-cryptographic hasher. See [`FastHashMap`].
pub type FastHashSet<T> = HashSet<T, ahash::RandomState>;
