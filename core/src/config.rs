//! Scoring and path configuration.
//!
//! The emotion set and the similarity threshold used to be implicit constants;
//! they live here so tests and callers can vary them per scorer.

use crate::error::{MoodError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// The ten emotion names of the NRC word-level emotion lexicon.
pub const DEFAULT_EMOTIONS: [&str; 10] = [
    "anger",
    "anticipation",
    "disgust",
    "fear",
    "joy",
    "negative",
    "positive",
    "sadness",
    "surprise",
    "trust",
];

pub const DEFAULT_THRESHOLD: f64 = 0.87;

/// Which lexicon word claims an unmatched token when several of them clear
/// the similarity threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// The first lexicon word (in lexicon order) above the threshold wins.
    #[default]
    FirstMatch,
    /// The most similar lexicon word above the threshold wins; ties go to the
    /// earlier lexicon word.
    BestMatch,
}

/// Options recognised by the emotion scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Similarity must be strictly greater than this to count as a match.
    pub threshold: f64,
    /// Emotions tracked in every vector. Lexicon weights for other names are ignored.
    pub emotion_names: BTreeSet<String>,
    pub match_policy: MatchPolicy,
    /// Lowercase tokens before lookup. Off by default: the lexicon is lowercase
    /// and capitalised words only reach it through approximate matching.
    pub fold_case: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            emotion_names: DEFAULT_EMOTIONS.iter().map(|e| e.to_string()).collect(),
            match_policy: MatchPolicy::FirstMatch,
            fold_case: false,
        }
    }
}

impl ScoringConfig {
    /// Config with the default threshold over a custom emotion set.
    pub fn with_emotions<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            emotion_names: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(MoodError::InvalidConfig(format!(
                "threshold {} is outside [0, 1]",
                self.threshold
            )));
        }
        if self.emotion_names.is_empty() {
            return Err(MoodError::InvalidConfig(
                "emotion_names must not be empty".to_string(),
            ));
        }
        if let Some(blank) = self.emotion_names.iter().find(|n| n.trim().is_empty()) {
            return Err(MoodError::InvalidConfig(format!(
                "blank emotion name {blank:?}"
            )));
        }
        Ok(())
    }
}

/// Default file locations used by the command line tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub lexicon: PathBuf,
    pub day_buckets: PathBuf,
    pub emotion_history: PathBuf,
    pub epidemic_history: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            lexicon: PathBuf::from("NRC-Emotion-Lexicon-Wordlevel-v0.92.txt"),
            day_buckets: PathBuf::from("twitter_data.csv"),
            emotion_history: PathBuf::from("tweet_emotional_index.csv"),
            epidemic_history: PathBuf::from("processed_covid_data.csv"),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub paths: PathsConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| MoodError::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.scoring.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = self
            .to_toml_string()
            .map_err(|e| MoodError::InvalidConfig(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_ten_emotions() {
        let cfg = ScoringConfig::default();
        assert_eq!(cfg.emotion_names.len(), 10);
        assert_eq!(cfg.threshold, 0.87);
        assert_eq!(cfg.match_policy, MatchPolicy::FirstMatch);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        let cfg = ScoringConfig {
            threshold: 1.5,
            ..ScoringConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(MoodError::InvalidConfig(_))));
    }

    #[test]
    fn empty_emotion_set_is_rejected() {
        let cfg = ScoringConfig::with_emotions(Vec::<String>::new());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg = Config::from_toml_str(
            "[scoring]\nthreshold = 0.9\nmatch_policy = \"best_match\"\n",
        )
        .unwrap();
        assert_eq!(cfg.scoring.threshold, 0.9);
        assert_eq!(cfg.scoring.match_policy, MatchPolicy::BestMatch);
        assert_eq!(cfg.scoring.emotion_names.len(), 10);
        assert_eq!(cfg.paths, PathsConfig::default());
    }

    #[test]
    fn toml_roundtrip() {
        let mut cfg = Config::default();
        cfg.scoring.fold_case = true;
        let text = cfg.to_toml_string().unwrap();
        let back = Config::from_toml_str(&text).unwrap();
        assert_eq!(cfg, back);
    }
}
