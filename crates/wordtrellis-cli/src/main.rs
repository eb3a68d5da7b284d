//! # `wordtrellis-cli`
//!
//! A small demo binary that wires a toy `Linguist`/`Scorer`/`Pruner` (a
//! single-chain grammar with constant acoustic scores) to `SearchManager`
//! and prints the resulting word-lattice summary. It exists to exercise the
//! `wordtrellis` library end to end; it is not a speech recognizer front
//! end and does not parse audio, dictionaries, or language models.

mod logging;

use clap::Parser;
use logging::LogArgs;
use wordtrellis::fixtures::{IdentityPruner, ToyLinguist, ToyScorer};
use wordtrellis::{SearchManager, SearchManagerConfig};

/// Drive `wordtrellis::SearchManager` over a toy chain grammar.
#[derive(clap::Parser, Debug)]
#[command(name = "wordtrellis", version, about)]
struct Args {
    #[command(flatten)]
    log: LogArgs,

    /// Number of emitting states in the toy chain grammar.
    #[arg(long, default_value_t = 5)]
    states: usize,

    /// Constant per-frame acoustic log-score fed to every token.
    #[arg(long, default_value_t = -1.0)]
    acoustic_score: f32,

    /// Number of frames to feed the scorer before end-of-stream. Defaults
    /// to one more than `--states`, enough to traverse the whole chain.
    #[arg(long)]
    frames: Option<usize>,

    /// Relative beam width, in the linear domain, `(0, 1]`.
    #[arg(long, default_value_t = 1e-80)]
    relative_beam_width: f32,

    /// Disable word-lattice alternate-predecessor tracking.
    #[arg(long)]
    no_word_lattice: bool,

    /// Keep every intermediate token as a `predecessor`, instead of
    /// compressing predecessor chains down to word boundaries.
    #[arg(long)]
    keep_all_tokens: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    args.log.setup_logging(2)?;

    let frames = args.frames.unwrap_or(args.states + 1);

    let linguist = ToyLinguist::single_path(args.states);
    let scorer = ToyScorer::constant_score(args.acoustic_score, frames);
    let pruner = IdentityPruner;
    let config = SearchManagerConfig::default()
        .with_relative_beam_width(args.relative_beam_width)?
        .with_build_word_lattice(!args.no_word_lattice)
        .with_keep_all_tokens(args.keep_all_tokens);

    let mut manager = SearchManager::new(linguist, scorer, pruner, config);
    manager.start()?;

    // One extra frame of headroom so the scorer's own end-of-stream signal,
    // not an exhausted frame budget, is what stops recognition.
    let result = manager.recognize(frames as u32 + 1)?;

    log::info!(
        "recognized through frame {} (final: {})",
        result.current_frame,
        result.is_final
    );

    if result.result_list.is_empty() {
        println!("no terminal tokens reached");
    }

    for &id in &result.result_list {
        let token = manager.arena().get(id);
        let alternates = manager.alternates().alternates_for(id).len();
        println!(
            "result token: state={:?} frame={} score={:.4} alternates={alternates}",
            token.search_state, token.frame, token.score,
        );
    }

    manager.stop();
    Ok(())
}
