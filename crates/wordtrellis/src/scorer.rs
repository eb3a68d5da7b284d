//! # Scorer (consumed external interface)
//!
//! Acoustic scoring is delegated entirely to this collaborator and is
//! treated as atomic from the core's perspective — a single call scores an
//! entire stratum and returns, even if the scorer internally uses threads.

use crate::token::{TokenArena, TokenId};

/// Acoustic scoring collaborator.
pub trait Scorer {
    /// Start the scorer (e.g. open the feature stream).
    fn start(&mut self);

    /// Stop the scorer and release any resources it holds.
    fn stop(&mut self);

    /// Score every token in `stratum` against the current frame.
    ///
    /// For each token, this sets `acoustic_score` and adds it into `score`.
    /// Returns the best-scoring token of the stratum, or `None` if the
    /// underlying feature stream has no more frames. Whether an empty
    /// `stratum` with more data remaining returns `Some` is undefined;
    /// callers never invoke this with an empty stratum, and treat a `None`
    /// return as the sole termination signal regardless of stratum size.
    fn calculate_scores(
        &mut self,
        arena: &mut TokenArena,
        stratum: &[TokenId],
    ) -> Option<TokenId>;
}
