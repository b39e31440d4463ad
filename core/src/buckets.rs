//! Day buckets: the raw text collected for each calendar day.
//!
//! Buckets are produced upstream (by whatever collects the posts) and handed
//! over as a CSV file with a `date,texts` header, `texts` holding a JSON array
//! of strings.

use crate::error::{MoodError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One calendar day and the text samples collected for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    pub day: NaiveDate,
    pub texts: Vec<String>,
}

impl DayBucket {
    pub fn new<I, T>(day: NaiveDate, texts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            day,
            texts: texts.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct BucketRow {
    date: NaiveDate,
    texts: String,
}

/// Read day buckets in file order.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<DayBucket>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path).map_err(|e| MoodError::read(path, e))?;
    let mut out = Vec::new();
    for (idx, row) in reader.deserialize::<BucketRow>().enumerate() {
        let row = row.map_err(|e| MoodError::MalformedRecord {
            record: idx + 1,
            reason: e.to_string(),
        })?;
        let texts: Vec<String> =
            serde_json::from_str(&row.texts).map_err(|e| MoodError::MalformedRecord {
                record: idx + 1,
                reason: format!("texts column is not a JSON string array: {e}"),
            })?;
        out.push(DayBucket {
            day: row.date,
            texts,
        });
    }
    tracing::info!(days = out.len(), path = %path.display(), "loaded day buckets");
    Ok(out)
}

/// Write day buckets, replacing the file.
pub fn save<P: AsRef<Path>>(path: P, buckets: &[DayBucket]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path).map_err(|e| MoodError::write(path, e))?;
    for bucket in buckets {
        let texts = serde_json::to_string(&bucket.texts).map_err(|e| MoodError::write(path, e))?;
        writer
            .serialize(BucketRow {
                date: bucket.day,
                texts,
            })
            .map_err(|e| MoodError::write(path, e))?;
    }
    writer.flush()?;
    Ok(())
}
