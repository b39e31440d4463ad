//! Per-day emotion scoring.
//!
//! A day's tokens are scored in two phases:
//! 1. exact lexicon hits are added to the day's vector immediately, every
//!    other token is tallied;
//! 2. once the whole day is read, each distinct tallied token is compared
//!    against the lexicon with the configured [`Similarity`], and a match adds
//!    the lexicon word's weights scaled by how often the token occurred.
//!
//! Batching the misses keeps the expensive phase at
//! `O(distinct misses × lexicon size)` per day.

use crate::buckets::DayBucket;
use crate::config::{MatchPolicy, ScoringConfig};
use crate::error::{MoodError, Result};
use crate::lexicon::{Lexicon, LexiconEntry};
use crate::normalize::normalize_with;
use crate::similarity::{JaroWinkler, Similarity};
use ahash::AHashMap;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Accumulated emotion intensity for one day. Every configured emotion is
/// always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionVector {
    values: BTreeMap<String, f64>,
}

impl EmotionVector {
    /// All emotions at zero.
    pub fn zeroed(emotions: &BTreeSet<String>) -> Self {
        Self {
            values: emotions.iter().map(|e| (e.clone(), 0.0)).collect(),
        }
    }

    /// Add a lexicon entry's weights, multiplied by `scale`. Emotions outside
    /// this vector's key set are ignored.
    pub fn add(&mut self, entry: &LexiconEntry, scale: f64) {
        for (emotion, weight) in &entry.weights {
            if let Some(v) = self.values.get_mut(emotion) {
                *v += weight * scale;
            }
        }
    }

    pub fn get(&self, emotion: &str) -> Option<f64> {
        self.values.get(emotion).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    pub fn into_map(self) -> BTreeMap<String, f64> {
        self.values
    }
}

/// Tokens that missed the exact lookup, with occurrence counts, in first-seen order.
#[derive(Debug, Default)]
struct Tally {
    counts: Vec<(String, usize)>,
    index: AHashMap<String, usize>,
}

impl Tally {
    fn bump(&mut self, token: String) {
        match self.index.get(&token) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(token.clone(), self.counts.len());
                self.counts.push((token, 1));
            }
        }
    }

    fn into_pending(self) -> Vec<(String, usize)> {
        self.counts
    }
}

/// Scores day buckets against a lexicon.
pub struct Scorer<'a, S = JaroWinkler> {
    lexicon: &'a Lexicon,
    config: &'a ScoringConfig,
    similarity: S,
}

impl<'a> Scorer<'a, JaroWinkler> {
    /// Scorer with the default Jaro-Winkler similarity.
    pub fn new(lexicon: &'a Lexicon, config: &'a ScoringConfig) -> Self {
        Self::with_similarity(lexicon, config, JaroWinkler::default())
    }
}

impl<'a, S: Similarity> Scorer<'a, S> {
    pub fn with_similarity(lexicon: &'a Lexicon, config: &'a ScoringConfig, similarity: S) -> Self {
        Self {
            lexicon,
            config,
            similarity,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        self.config
    }

    /// Score one day. An empty bucket yields an all-zero vector.
    pub fn score(&self, bucket: &DayBucket) -> (NaiveDate, EmotionVector) {
        let mut vector = EmotionVector::zeroed(&self.config.emotion_names);
        let mut tally = Tally::default();
        let mut exact = 0usize;

        for text in &bucket.texts {
            for token in normalize_with(text, self.config.fold_case) {
                match self.lexicon.get(&token) {
                    Some(entry) => {
                        vector.add(entry, 1.0);
                        exact += 1;
                    }
                    None => tally.bump(token),
                }
            }
        }

        let pending = tally.into_pending();
        let distinct_misses = pending.len();
        let unmatched = match self.config.match_policy {
            MatchPolicy::FirstMatch => self.first_match(pending, &mut vector),
            MatchPolicy::BestMatch => self.best_match(pending, &mut vector),
        };

        tracing::debug!(
            day = %bucket.day,
            samples = bucket.texts.len(),
            exact,
            approximate = distinct_misses - unmatched,
            unmatched,
            "scored day"
        );
        (bucket.day, vector)
    }

    /// Score every bucket in order.
    pub fn score_all(&self, buckets: &[DayBucket]) -> Result<Vec<(NaiveDate, EmotionVector)>> {
        if buckets.is_empty() {
            return Err(MoodError::EmptyInput);
        }
        Ok(buckets.iter().map(|b| self.score(b)).collect())
    }

    /// Walk the lexicon in order; each word claims every pending token above
    /// the threshold. Returns the number of tokens left unmatched.
    fn first_match(&self, mut pending: Vec<(String, usize)>, vector: &mut EmotionVector) -> usize {
        for entry in self.lexicon.iter() {
            if pending.is_empty() {
                break;
            }
            pending.retain(|(token, count)| {
                if self.similarity.similarity(&entry.word, token) > self.config.threshold {
                    vector.add(entry, *count as f64);
                    false
                } else {
                    true
                }
            });
        }
        pending.len()
    }

    /// Give each pending token to its most similar lexicon word above the threshold.
    fn best_match(&self, pending: Vec<(String, usize)>, vector: &mut EmotionVector) -> usize {
        let mut unmatched = 0;
        for (token, count) in pending {
            let mut best: Option<(&LexiconEntry, f64)> = None;
            for entry in self.lexicon.iter() {
                let sim = self.similarity.similarity(&entry.word, &token);
                if sim > self.config.threshold && best.map_or(true, |(_, s)| sim > s) {
                    best = Some((entry, sim));
                }
            }
            match best {
                Some((entry, _)) => vector.add(entry, count as f64),
                None => unmatched += 1,
            }
        }
        unmatched
    }
}
