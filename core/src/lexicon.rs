//! Word → emotion weight lexicon.
//!
//! The on-disk format is the NRC word-level emotion lexicon: whitespace
//! separated `word emotion value` rows, one row per (word, emotion) pair, no
//! header. Rows of the same word are grouped into one entry.
//!
//! Notes:
//! - Iteration order is the order in which each word first appears in the
//!   source. Approximate matching walks the lexicon in this order, so it is part
//!   of the scoring result.
//! - A repeated `(word, emotion)` row replaces the earlier value (last row
//!   wins) without moving the word.
//! - Emotions a word has no row for are simply absent and count as zero.

use crate::error::{MoodError, Result};
use ahash::AHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One lexicon word and its per-emotion weights, in source row order.
#[derive(Debug, Clone, PartialEq)]
pub struct LexiconEntry {
    pub word: String,
    pub weights: Vec<(String, f64)>,
}

impl LexiconEntry {
    pub fn weight(&self, emotion: &str) -> f64 {
        self.weights
            .iter()
            .find(|(e, _)| e == emotion)
            .map(|(_, w)| *w)
            .unwrap_or(0.0)
    }

    fn set(&mut self, emotion: &str, value: f64) {
        if let Some(slot) = self.weights.iter_mut().find(|(e, _)| e == emotion) {
            slot.1 = value;
        } else {
            self.weights.push((emotion.to_string(), value));
        }
    }
}

/// Immutable, insertion-ordered lexicon.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
    index: AHashMap<String, usize>,
}

impl Lexicon {
    /// Load a lexicon file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let lexicon = Self::from_reader(BufReader::new(file))?;
        tracing::info!(words = lexicon.len(), path = %path.display(), "loaded lexicon");
        Ok(lexicon)
    }

    /// Parse lexicon rows from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lexicon = Self::default();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            lexicon.push_row(idx + 1, &line)?;
        }
        Ok(lexicon)
    }

    pub fn parse_str(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Build a lexicon from `(word, [(emotion, weight)])` pairs, keeping their order.
    ///
    /// Weights follow the file rules; the reported line is the 1-based
    /// position of the offending entry.
    pub fn from_entries<W, E, I>(entries: I) -> Result<Self>
    where
        W: Into<String>,
        E: Into<String>,
        I: IntoIterator<Item = (W, Vec<(E, f64)>)>,
    {
        let mut lexicon = Self::default();
        for (idx, (word, weights)) in entries.into_iter().enumerate() {
            let word = word.into();
            for (emotion, value) in weights {
                let emotion: String = emotion.into();
                check_value(idx + 1, value)?;
                lexicon.insert(&word, &emotion, value);
            }
            // words with no weights still count as lexicon members
            lexicon.slot(&word);
        }
        Ok(lexicon)
    }

    fn push_row(&mut self, line_no: usize, line: &str) -> Result<()> {
        if line.trim().is_empty() {
            return Ok(());
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [word, emotion, value] = fields.as_slice() else {
            return Err(MoodError::MalformedLexicon {
                line: line_no,
                reason: format!("expected 3 fields, found {}", fields.len()),
            });
        };
        let value: f64 = value.parse().map_err(|_| MoodError::MalformedLexicon {
            line: line_no,
            reason: format!("value {value:?} is not a number"),
        })?;
        check_value(line_no, value)?;
        self.insert(word, emotion, value);
        Ok(())
    }

    fn slot(&mut self, word: &str) -> usize {
        if let Some(&i) = self.index.get(word) {
            return i;
        }
        self.entries.push(LexiconEntry {
            word: word.to_string(),
            weights: Vec::new(),
        });
        let i = self.entries.len() - 1;
        self.index.insert(word.to_string(), i);
        i
    }

    fn insert(&mut self, word: &str, emotion: &str, value: f64) {
        let i = self.slot(word);
        self.entries[i].set(emotion, value);
    }

    /// Exact lookup.
    pub fn get(&self, word: &str) -> Option<&LexiconEntry> {
        self.index.get(word).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Entries in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = &LexiconEntry> {
        self.entries.iter()
    }

    /// Return the number of words in the lexicon.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return true if the lexicon is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn check_value(line: usize, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(MoodError::MalformedLexicon {
            line,
            reason: format!("value {value} must be a finite non-negative number"),
        });
    }
    Ok(())
}
