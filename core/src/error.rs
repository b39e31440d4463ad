//! Error type shared by every moodgraph-core module.
//!
//! Parse and shape errors are raised at the boundaries (lexicon loading,
//! persistence, CSV ingestion). The pure scoring and merge code only fails on
//! caller misuse (no input at all, mismatched row sets).

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoodError {
    /// A lexicon row did not parse into `(word, emotion, value)`.
    #[error("malformed lexicon row at line {line}: {reason}")]
    MalformedLexicon { line: usize, reason: String },

    /// No day buckets were supplied where a result is mandatory.
    #[error("no day buckets supplied")]
    EmptyInput,

    #[error("cannot read history table {}: {reason}", path.display())]
    PersistenceRead { path: PathBuf, reason: String },

    #[error("cannot write history table {}: {reason}", path.display())]
    PersistenceWrite { path: PathBuf, reason: String },

    /// A column's row names do not match the table it is merged into.
    #[error("row set mismatch for {day}: expected [{expected}], got [{actual}]")]
    SchemaMismatch {
        day: NaiveDate,
        expected: String,
        actual: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An input data record (epidemic CSV, day-bucket file) could not be used.
    #[error("malformed record {record}: {reason}")]
    MalformedRecord { record: usize, reason: String },

    /// A chart was requested for a day one of the tables does not hold.
    #[error("no {table} data for {day}")]
    MissingDay { table: &'static str, day: NaiveDate },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MoodError>;

impl MoodError {
    pub(crate) fn read<P: Into<PathBuf>, E: std::fmt::Display>(path: P, err: E) -> Self {
        MoodError::PersistenceRead {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn write<P: Into<PathBuf>, E: std::fmt::Display>(path: P, err: E) -> Self {
        MoodError::PersistenceWrite {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}
