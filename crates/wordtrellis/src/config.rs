//! # Search Manager Configuration
//!
//! A `serde`-deserializable options struct paired with a builder API,
//! loadable straight from a TOML document or file.

use serde::{Deserialize, Serialize};

use crate::errors::{WordtrellisError, WtResult};

/// Which [`crate::ActiveList`] implementation a [`crate::SearchManager`]
/// should instantiate for each stratum.
///
/// Only `Simple` is implemented by this crate; the enum exists so a config
/// can name a selection by value rather than baking in a closed set of
/// exotic strategies this crate does not ship.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveListKind {
    /// An unordered bag, iterated in insertion order. The default.
    #[default]
    Simple,
}

/// Runtime configuration for a [`crate::SearchManager`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchManagerConfig {
    /// Which [`ActiveList`](crate::ActiveList) implementation to instantiate.
    pub active_list_type: ActiveListKind,

    /// Dump active-list sizes at `debug!`/`trace!` level each frame.
    pub show_token_count: bool,

    /// Assert that successor arcs never regress to an earlier non-emitting
    /// state class.
    pub check_state_order: bool,

    /// Maintain the [`crate::AlternateHypothesisManager`] so a word lattice
    /// can be reconstructed after the utterance.
    pub build_word_lattice: bool,

    /// If `> 1`, skip growth on every `grow_skip_interval`th frame.
    pub grow_skip_interval: u32,

    /// Acoustic look-ahead coefficient. `0.0` disables look-ahead-gated
    /// growth in favor of the ordinary beam gate.
    pub acoustic_lookahead_frames: f32,

    /// Disable word-predecessor compression: every successor's
    /// `predecessor` is its spawning token, not the last word ancestor.
    pub keep_all_tokens: bool,

    /// Relative beam width, stored already converted to the log domain.
    ///
    /// Accepted from the constructors below in the *linear* domain (a
    /// probability in `(0, 1]`) and converted once at construction time;
    /// see [`SearchManagerConfig::relative_beam_width_log`].
    relative_beam_width_log: f32,
}

impl Default for SearchManagerConfig {
    fn default() -> Self {
        Self {
            active_list_type: ActiveListKind::default(),
            show_token_count: false,
            check_state_order: false,
            build_word_lattice: true,
            grow_skip_interval: 0,
            acoustic_lookahead_frames: 0.0,
            keep_all_tokens: false,
            // 1e-80 linear, a permissive default beam matching common ASR
            // decoder defaults; see `with_relative_beam_width`.
            relative_beam_width_log: (1e-80_f32).ln(),
        }
    }
}

impl SearchManagerConfig {
    /// The relative beam width, already in the log domain.
    ///
    /// Always `<= 0.0`: growth gates on `score >= best_score + this value`.
    pub fn relative_beam_width_log(&self) -> Score {
        self.relative_beam_width_log
    }

    /// Set the relative beam width from a *linear*-domain probability in
    /// `(0, 1]`, converting it to the log domain.
    ///
    /// ## Errors
    /// Returns [`WordtrellisError::InvalidConfig`] if `width` is not a
    /// finite value in `(0, 1]`.
    pub fn with_relative_beam_width(
        mut self,
        width: f32,
    ) -> WtResult<Self> {
        if !(width.is_finite() && width > 0.0 && width <= 1.0) {
            return Err(WordtrellisError::InvalidConfig(format!(
                "relative_beam_width must be a finite value in (0, 1], got {width}"
            )));
        }
        self.relative_beam_width_log = width.ln();
        Ok(self)
    }

    /// Set `active_list_type`.
    pub fn with_active_list_type(
        mut self,
        kind: ActiveListKind,
    ) -> Self {
        self.active_list_type = kind;
        self
    }

    /// Set `show_token_count`.
    pub fn with_show_token_count(
        mut self,
        enabled: bool,
    ) -> Self {
        self.show_token_count = enabled;
        self
    }

    /// Set `check_state_order`.
    pub fn with_check_state_order(
        mut self,
        enabled: bool,
    ) -> Self {
        self.check_state_order = enabled;
        self
    }

    /// Set `build_word_lattice`.
    pub fn with_build_word_lattice(
        mut self,
        enabled: bool,
    ) -> Self {
        self.build_word_lattice = enabled;
        self
    }

    /// Set `grow_skip_interval`.
    pub fn with_grow_skip_interval(
        mut self,
        interval: u32,
    ) -> Self {
        self.grow_skip_interval = interval;
        self
    }

    /// Set `acoustic_lookahead_frames`.
    pub fn with_acoustic_lookahead_frames(
        mut self,
        frames: f32,
    ) -> Self {
        self.acoustic_lookahead_frames = frames;
        self
    }

    /// Set `keep_all_tokens`.
    pub fn with_keep_all_tokens(
        mut self,
        enabled: bool,
    ) -> Self {
        self.keep_all_tokens = enabled;
        self
    }

    /// Parse a `SearchManagerConfig` from a TOML document.
    ///
    /// `relative_beam_width_log` is not a valid TOML key (it is private and
    /// already log-domain); TOML documents set `relative_beam_width` in the
    /// linear domain instead, matched by a shim `Deserialize` field.
    pub fn from_toml_str(toml_str: &str) -> WtResult<Self> {
        let shim: ConfigShim = toml::from_str(toml_str)?;
        shim.into_config()
    }

    /// Read and parse a `SearchManagerConfig` from a TOML file on disk.
    pub fn from_toml_file(path: &std::path::Path) -> WtResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            WordtrellisError::InvalidConfig(format!("reading {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }
}

/// TOML-facing shape of [`SearchManagerConfig`], which exposes the beam
/// width in the linear domain rather than the pre-converted log value the
/// runtime struct stores.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfigShim {
    active_list_type: ActiveListKind,
    show_token_count: bool,
    check_state_order: bool,
    build_word_lattice: bool,
    grow_skip_interval: u32,
    acoustic_lookahead_frames: f32,
    keep_all_tokens: bool,
    relative_beam_width: f32,
}

impl Default for ConfigShim {
    fn default() -> Self {
        let defaults = SearchManagerConfig::default();
        Self {
            active_list_type: defaults.active_list_type,
            show_token_count: defaults.show_token_count,
            check_state_order: defaults.check_state_order,
            build_word_lattice: defaults.build_word_lattice,
            grow_skip_interval: defaults.grow_skip_interval,
            acoustic_lookahead_frames: defaults.acoustic_lookahead_frames,
            keep_all_tokens: defaults.keep_all_tokens,
            relative_beam_width: defaults.relative_beam_width_log.exp(),
        }
    }
}

impl ConfigShim {
    fn into_config(self) -> WtResult<SearchManagerConfig> {
        SearchManagerConfig {
            active_list_type: self.active_list_type,
            show_token_count: self.show_token_count,
            check_state_order: self.check_state_order,
            build_word_lattice: self.build_word_lattice,
            grow_skip_interval: self.grow_skip_interval,
            acoustic_lookahead_frames: self.acoustic_lookahead_frames,
            keep_all_tokens: self.keep_all_tokens,
            ..SearchManagerConfig::default()
        }
        .with_relative_beam_width(self.relative_beam_width)
    }
}

use crate::types::Score;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchManagerConfig::default();
        assert!(config.build_word_lattice);
        assert!(!config.check_state_order);
        assert_eq!(config.grow_skip_interval, 0);
        assert!(config.relative_beam_width_log() < 0.0);
    }

    #[test]
    fn test_builder_chain() {
        let config = SearchManagerConfig::default()
            .with_check_state_order(true)
            .with_keep_all_tokens(true)
            .with_grow_skip_interval(2)
            .with_relative_beam_width(1e-5)
            .unwrap();

        assert!(config.check_state_order);
        assert!(config.keep_all_tokens);
        assert_eq!(config.grow_skip_interval, 2);
        assert!((config.relative_beam_width_log() - (1e-5_f32).ln()).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_bad_beam_width() {
        assert!(SearchManagerConfig::default().with_relative_beam_width(0.0).is_err());
        assert!(SearchManagerConfig::default().with_relative_beam_width(-1.0).is_err());
        assert!(SearchManagerConfig::default().with_relative_beam_width(1.5).is_err());
        assert!(SearchManagerConfig::default().with_relative_beam_width(f32::NAN).is_err());
    }

    #[test]
    fn test_from_toml_str() {
        let toml_str = r#"
            check_state_order = true
            grow_skip_interval = 3
            relative_beam_width = 0.001
        "#;
        let config = SearchManagerConfig::from_toml_str(toml_str).unwrap();
        assert!(config.check_state_order);
        assert_eq!(config.grow_skip_interval, 3);
        assert!((config.relative_beam_width_log() - (0.001_f32).ln()).abs() < 1e-6);
        assert!(config.build_word_lattice, "unspecified fields keep their default");
    }

    #[test]
    fn test_from_toml_str_rejects_bad_beam_width() {
        let toml_str = "relative_beam_width = 2.0";
        assert!(SearchManagerConfig::from_toml_str(toml_str).is_err());
    }

    #[test]
    fn test_from_toml_file_round_trips_through_disk() {
        use std::fs::File;
        use std::io::Write;
        use tempdir::TempDir;

        let dir = TempDir::new("wordtrellis-config-test").unwrap();
        let path = dir.path().join("search_manager.toml");
        let mut file = File::create(&path).unwrap();
        write!(file, "keep_all_tokens = true\nrelative_beam_width = 0.5\n").unwrap();
        drop(file);

        let config = SearchManagerConfig::from_toml_file(&path).unwrap();
        assert!(config.keep_all_tokens);
        assert!((config.relative_beam_width_log() - (0.5_f32).ln()).abs() < 1e-6);
    }

    #[test]
    fn test_from_toml_file_reports_missing_file() {
        let missing = std::path::Path::new("/nonexistent/wordtrellis-config.toml");
        assert!(SearchManagerConfig::from_toml_file(missing).is_err());
    }
}
