#![warn(missing_docs, unused)]
#![doc = document_features::document_features!()]
//! # `wordtrellis` — word-pruning breadth-first search core
//!
//! A frame-synchronous, beam-pruned token lattice search over a linguistic
//! search space, the kind of search manager that sits at the center of a
//! large-vocabulary continuous speech recognizer. This crate owns only the
//! search itself: acoustic scoring, search-graph construction, and beam
//! computation are delegated to collaborators the caller supplies
//! ([`Linguist`], [`Scorer`], [`Pruner`]).
//!
//! ## Client summary
//!
//! * [`SearchManager`] — the per-frame score/prune/grow loop; the type most
//!   callers construct directly.
//! * [`Token`] / [`TokenArena`] / [`TokenId`] — the hypothesis lattice's node
//!   type and its per-utterance arena.
//! * [`Linguist`], [`Scorer`], [`Pruner`] — the three external collaborator
//!   traits a caller must implement (or borrow from [`fixtures`] behind the
//!   `testing` feature) to run a recognition.
//! * [`SearchManagerConfig`] — the configuration surface, loadable from TOML
//!   via [`SearchManagerConfig::from_toml_str`]/[`SearchManagerConfig::from_toml_file`].
//!
//! ## Example
//!
#![cfg_attr(feature = "testing", doc = "```rust")]
#![cfg_attr(not(feature = "testing"), doc = "```rust,ignore")]
//! use wordtrellis::{SearchManager, SearchManagerConfig};
//! use wordtrellis::fixtures::{IdentityPruner, ToyLinguist, ToyScorer};
//!
//! # fn example() -> wordtrellis::WtResult<()> {
//! let linguist = ToyLinguist::single_path(3);
//! let scorer = ToyScorer::constant_score(-1.0, 3);
//! let pruner = IdentityPruner;
//! let config = SearchManagerConfig::default();
//!
//! let mut manager = SearchManager::new(linguist, scorer, pruner, config);
//! manager.start()?;
//! let result = manager.recognize(10)?;
//! assert!(result.is_final);
//! manager.stop();
//! # Ok(())
//! # }
//! ```

pub mod active_list;
pub mod active_list_manager;
pub mod alternate_hypothesis_manager;
pub mod best_token_map;
pub mod config;
pub mod errors;
pub mod linguist;
pub mod pruner;
pub mod scorer;
pub mod search_manager;
pub mod token;
pub mod types;

#[cfg(feature = "testing")]
pub mod fixtures;

#[doc(inline)]
pub use active_list::{ActiveList, SimpleActiveList};
#[doc(inline)]
pub use active_list_manager::ActiveListManager;
#[doc(inline)]
pub use alternate_hypothesis_manager::AlternateHypothesisManager;
#[doc(inline)]
pub use best_token_map::BestTokenMap;
#[doc(inline)]
pub use config::{ActiveListKind, SearchManagerConfig};
#[doc(inline)]
pub use errors::{WordtrellisError, WtResult};
#[doc(inline)]
pub use linguist::{Arc, BestTokenKey, LexWordKey, Linguist, SearchState, SearchStateHandle};
#[doc(inline)]
pub use pruner::{Pruner, RelativeBeamPruner};
#[doc(inline)]
pub use scorer::Scorer;
#[doc(inline)]
pub use search_manager::{Lifecycle, RecognitionResult, SearchManager};
#[doc(inline)]
pub use token::{Token, TokenArena, TokenId};
#[doc(inline)]
pub use types::{FastHashMap, FastHashSet, Score, StateClassId};
