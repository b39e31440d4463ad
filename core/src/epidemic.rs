//! Daily totals from an epidemiological CSV (Our World in Data layout).
//!
//! The source has one row per (location, date) and a mix of text and numeric
//! columns. Every numeric column is summed per date across all locations into
//! a [`DayTable`] whose rows are the prettified column names.

use crate::error::{MoodError, Result};
use crate::history::{join, merge_columns, Column, DayTable, MergeMode};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

pub const DEFAULT_SOURCE_URL: &str = "https://covid.ourworldindata.org/data/owid-covid-data.csv";

/// Index column name used for epidemic history files.
pub const EPIDEMIC_INDEX: &str = "header";

const DATE_COLUMN: &str = "date";

/// `new_cases_per_million` → `New Cases Per Million`.
pub fn pretty(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    let mut in_word = false;
    for c in header.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// A parsed epidemiological CSV.
#[derive(Debug, Clone)]
pub struct EpidemicData {
    headers: csv::StringRecord,
    records: Vec<csv::StringRecord>,
    date_idx: usize,
}

impl EpidemicData {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| MoodError::read(path, e))?;
        let data = Self::from_reader(file)?;
        tracing::info!(rows = data.records.len(), path = %path.display(), "loaded epidemic data");
        Ok(data)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader
            .headers()
            .map_err(|e| MoodError::MalformedRecord {
                record: 0,
                reason: e.to_string(),
            })?
            .clone();
        let date_idx = headers
            .iter()
            .position(|h| h == DATE_COLUMN)
            .ok_or_else(|| MoodError::MalformedRecord {
                record: 0,
                reason: format!("no {DATE_COLUMN:?} column in header"),
            })?;
        let mut records = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            records.push(record.map_err(|e| MoodError::MalformedRecord {
                record: idx + 1,
                reason: e.to_string(),
            })?);
        }
        Ok(Self {
            headers,
            records,
            date_idx,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Columns whose every non-empty cell is a number, as `(index, pretty name)`.
    /// The date column is never numeric.
    pub fn numeric_columns(&self) -> Vec<(usize, String)> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.date_idx)
            .filter(|(i, _)| {
                self.records.iter().all(|r| {
                    let cell = r.get(*i).unwrap_or("").trim();
                    cell.is_empty() || cell.parse::<f64>().is_ok()
                })
            })
            .map(|(i, h)| (i, pretty(h)))
            .collect()
    }

    /// Per-date totals for every date `mode` allows writing into `existing`.
    ///
    /// Each accepted date starts with every numeric metric at zero; empty cells
    /// add nothing.
    pub fn daily_totals(&self, existing: &DayTable, mode: MergeMode) -> Result<Vec<(NaiveDate, Column)>> {
        let metrics = self.numeric_columns();
        let mut totals: BTreeMap<NaiveDate, Column> = BTreeMap::new();

        for (idx, record) in self.records.iter().enumerate() {
            let raw = record.get(self.date_idx).unwrap_or("").trim();
            let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
                MoodError::MalformedRecord {
                    record: idx + 1,
                    reason: format!("bad date {raw:?}: {e}"),
                }
            })?;
            if !mode.applies(existing, day) {
                continue;
            }
            let column = totals
                .entry(day)
                .or_insert_with(|| metrics.iter().map(|(_, name)| (name.clone(), 0.0)).collect());
            for (i, name) in &metrics {
                if let Some(v) = record.get(*i).and_then(parse_cell) {
                    if let Some(total) = column.get_mut(name) {
                        *total += v;
                    }
                }
            }
        }
        Ok(totals.into_iter().collect())
    }
}

/// Fold `data` into the epidemic history.
///
/// When the history already has days, only metrics present both there and in
/// `data` are kept, so a column added or dropped upstream does not break the
/// merge. Sharing no metric at all is a [`MoodError::SchemaMismatch`] rather
/// than an emptied history.
pub fn update_history(data: &EpidemicData, mut existing: DayTable, mode: MergeMode) -> Result<DayTable> {
    let mut new_days = data.daily_totals(&existing, mode)?;

    if let Some(first) = existing.first_day() {
        let incoming: BTreeSet<String> = data.numeric_columns().into_iter().map(|(_, n)| n).collect();
        let keep: BTreeSet<String> = existing.rows().intersection(&incoming).cloned().collect();
        if keep.is_empty() && !existing.rows().is_empty() {
            return Err(MoodError::SchemaMismatch {
                day: new_days.first().map_or(first, |(day, _)| *day),
                expected: join(existing.rows().iter()),
                actual: join(incoming.iter()),
            });
        }
        if keep.len() != existing.rows().len() || keep.len() != incoming.len() {
            tracing::warn!(
                stored = existing.rows().len(),
                incoming = incoming.len(),
                kept = keep.len(),
                "epidemic metrics differ from history, keeping the common ones"
            );
        }
        existing.retain_rows(&keep);
        for (_, column) in &mut new_days {
            column.retain(|name, _| keep.contains(name));
        }
    }

    let table = merge_columns(new_days, existing, mode)?;
    tracing::info!(days = table.len(), metrics = table.rows().len(), ?mode, "updated epidemic history");
    Ok(table)
}
