//! moodgraph-core
//!
//! Daily emotion scoring of social-media text against a word-level emotion
//! lexicon, day-indexed history tables with incremental merge, daily totals of
//! an epidemiological dataset, and the aligned series used to chart one
//! against the other.
//!
//! Public API:
//! - `Lexicon` - word → per-emotion weights, insertion ordered
//! - `normalize` - alphabetic tokenization of raw text
//! - `Similarity` / `JaroWinkler` - pluggable approximate string matching
//! - `Scorer` / `EmotionVector` - per-day emotion intensity
//! - `DayTable` / `MergeMode` / `merge` - history tables and merge policies
//! - `HistoryStore` - CSV, redb and in-memory persistence
//! - `EpidemicData` - per-date totals of numeric CSV columns
//! - `ChartSeries` - aligned emotion / metric series and plotly output
//! - `EmotionPipeline` - score, merge and persist in one call
//! - `Config` / `ScoringConfig` - TOML configuration

pub mod error;
pub use error::{MoodError, Result};

pub mod config;
pub use config::{Config, MatchPolicy, PathsConfig, ScoringConfig, DEFAULT_EMOTIONS, DEFAULT_THRESHOLD};

pub mod lexicon;
pub use lexicon::{Lexicon, LexiconEntry};

pub mod normalize;
pub use normalize::{normalize, normalize_with};

pub mod similarity;
pub use similarity::{Jaro, JaroWinkler, Similarity};

pub mod buckets;
pub use buckets::DayBucket;

pub mod scorer;
pub use scorer::{EmotionVector, Scorer};

pub mod history;
pub use history::{merge, merge_columns, Column, DayTable, MergeMode};

pub mod persistence;
pub use persistence::{open_store, CsvStore, HistoryStore, MemoryStore, RedbStore};

pub mod epidemic;
pub use epidemic::{update_history, EpidemicData, EPIDEMIC_INDEX};

pub mod series;
pub use series::{desired_dates, ChartSeries};

pub mod pipeline;
pub use pipeline::{EmotionPipeline, EMOTION_INDEX};
