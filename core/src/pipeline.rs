//! Score day buckets and fold them into the persisted emotion history.

use crate::buckets::DayBucket;
use crate::config::ScoringConfig;
use crate::error::{MoodError, Result};
use crate::history::{merge, DayTable, MergeMode};
use crate::lexicon::Lexicon;
use crate::persistence::HistoryStore;
use crate::scorer::Scorer;
use crate::similarity::{JaroWinkler, Similarity};

/// Index column name used for emotion history files.
pub const EMOTION_INDEX: &str = "emotion";

pub struct EmotionPipeline<S = JaroWinkler> {
    lexicon: Lexicon,
    config: ScoringConfig,
    similarity: S,
}

impl EmotionPipeline<JaroWinkler> {
    pub fn new(lexicon: Lexicon, config: ScoringConfig) -> Result<Self> {
        Self::with_similarity(lexicon, config, JaroWinkler::default())
    }
}

impl<S: Similarity + Clone> EmotionPipeline<S> {
    pub fn with_similarity(lexicon: Lexicon, config: ScoringConfig, similarity: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            lexicon,
            config,
            similarity,
        })
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    fn scorer(&self) -> Scorer<'_, S> {
        Scorer::with_similarity(&self.lexicon, &self.config, self.similarity.clone())
    }

    /// Score every bucket into a fresh table without touching any store.
    pub fn score_only(&self, buckets: &[DayBucket]) -> Result<DayTable> {
        let scored = self.scorer().score_all(buckets)?;
        merge(scored, DayTable::new(), MergeMode::Overwrite)
    }

    /// Read the history from `store`, score the buckets `mode` lets through,
    /// merge them and write the whole table back.
    ///
    /// With [`MergeMode::FillMissing`], days already in the history are skipped
    /// before scoring.
    pub fn run(&self, buckets: &[DayBucket], mode: MergeMode, store: &dyn HistoryStore) -> Result<DayTable> {
        if buckets.is_empty() {
            return Err(MoodError::EmptyInput);
        }
        let existing = store.read()?;
        let todo: Vec<DayBucket> = buckets
            .iter()
            .filter(|b| mode.applies(&existing, b.day))
            .cloned()
            .collect();
        tracing::info!(
            supplied = buckets.len(),
            to_score = todo.len(),
            stored = existing.len(),
            ?mode,
            "scoring day buckets"
        );

        let scorer = self.scorer();
        let scored: Vec<_> = todo.iter().map(|b| scorer.score(b)).collect();
        let table = merge(scored, existing, mode)?;
        store.write(&table)?;
        Ok(table)
    }
}
