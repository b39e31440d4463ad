//! Day-indexed history tables and the merge policies applied to them.
//!
//! A [`DayTable`] holds one column per day and one row per name (emotion or
//! epidemic metric). Every column carries exactly the table's row set; a
//! partially populated day cannot be stored.

use crate::error::{MoodError, Result};
use crate::scorer::EmotionVector;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub type Column = BTreeMap<String, f64>;

/// How newly computed days are combined with a persisted table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// Write every new day, replacing any stored column for it.
    Overwrite,
    /// Write only days the table does not have yet. Stored days are left as
    /// they are, stale or not.
    FillMissing,
}

impl MergeMode {
    /// Whether a new column for `day` should be applied to `table`.
    pub fn applies(self, table: &DayTable, day: NaiveDate) -> bool {
        match self {
            MergeMode::Overwrite => true,
            MergeMode::FillMissing => !table.contains_day(day),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayTable {
    rows: BTreeSet<String>,
    columns: BTreeMap<NaiveDate, Column>,
}

impl DayTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty table with a fixed row set.
    pub fn with_rows<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows.into_iter().map(Into::into).collect(),
            columns: BTreeMap::new(),
        }
    }

    /// Insert or replace the column for `day`.
    ///
    /// The first column of a row-less table defines the row set; afterwards
    /// every column must carry exactly the same names.
    pub fn insert_column(&mut self, day: NaiveDate, column: Column) -> Result<()> {
        if self.rows.is_empty() && self.columns.is_empty() {
            self.rows = column.keys().cloned().collect();
        } else if !column.keys().eq(self.rows.iter()) {
            return Err(MoodError::SchemaMismatch {
                day,
                expected: join(self.rows.iter()),
                actual: join(column.keys()),
            });
        }
        self.columns.insert(day, column);
        Ok(())
    }

    pub fn rows(&self) -> &BTreeSet<String> {
        &self.rows
    }

    pub fn column(&self, day: NaiveDate) -> Option<&Column> {
        self.columns.get(&day)
    }

    /// Value for `row` on `day`.
    pub fn value(&self, day: NaiveDate, row: &str) -> Option<f64> {
        self.columns.get(&day).and_then(|c| c.get(row)).copied()
    }

    pub fn contains_day(&self, day: NaiveDate) -> bool {
        self.columns.contains_key(&day)
    }

    /// Days in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.columns.keys().copied()
    }

    pub fn columns(&self) -> impl Iterator<Item = (NaiveDate, &Column)> {
        self.columns.iter().map(|(d, c)| (*d, c))
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.columns.keys().next().copied()
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.columns.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Drop every row not in `keep`, from the row set and from each column.
    pub fn retain_rows(&mut self, keep: &BTreeSet<String>) {
        self.rows.retain(|r| keep.contains(r));
        for column in self.columns.values_mut() {
            column.retain(|r, _| keep.contains(r));
        }
    }

    /// One row's values over `days`; `None` if any day is missing.
    pub fn series(&self, row: &str, days: &[NaiveDate]) -> Option<Vec<f64>> {
        days.iter().map(|d| self.value(*d, row)).collect()
    }
}

pub(crate) fn join<'a, I: Iterator<Item = &'a String>>(names: I) -> String {
    names.map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Merge columns into `existing` under `mode`. Pure: nothing is read or written.
pub fn merge_columns<I>(new_days: I, mut existing: DayTable, mode: MergeMode) -> Result<DayTable>
where
    I: IntoIterator<Item = (NaiveDate, Column)>,
{
    let mut applied = 0usize;
    let mut skipped = 0usize;
    for (day, column) in new_days {
        if mode.applies(&existing, day) {
            existing.insert_column(day, column)?;
            applied += 1;
        } else {
            skipped += 1;
        }
    }
    tracing::debug!(?mode, applied, skipped, total = existing.len(), "merged history");
    Ok(existing)
}

/// Merge scored days into an emotion history table.
pub fn merge<I>(new_days: I, existing: DayTable, mode: MergeMode) -> Result<DayTable>
where
    I: IntoIterator<Item = (NaiveDate, EmotionVector)>,
{
    merge_columns(
        new_days.into_iter().map(|(d, v)| (d, v.into_map())),
        existing,
        mode,
    )
}
