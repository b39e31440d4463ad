//! Persistence adapters for [`DayTable`]s.
//!
//! A history table is read once at the start of a merge and replaced as a whole
//! at the end. Stores are single-writer: callers serialize merges against the
//! same store.
//!
//! Backends:
//! - [`CsvStore`]: flat file, one row per emotion/metric, one column per ISO day.
//! - [`RedbStore`]: redb database, one key per day holding a bincode column.
//! - [`MemoryStore`]: shared in-memory table, for tests and dry runs.

use crate::error::{MoodError, Result};
use crate::history::{Column, DayTable};
use chrono::NaiveDate;
use redb::ReadableTable;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Read / replace capability over one persisted history table.
pub trait HistoryStore {
    fn read(&self) -> Result<DayTable>;
    fn write(&self, table: &DayTable) -> Result<()>;
}

/// Pick a backend from the file extension: `.redb` opens a [`RedbStore`],
/// anything else is treated as CSV.
pub fn open_store<P: AsRef<Path>>(path: P, index_name: &str) -> Result<Box<dyn HistoryStore>> {
    let path = path.as_ref();
    if path.extension().and_then(|e| e.to_str()) == Some("redb") {
        Ok(Box::new(RedbStore::open(path)?))
    } else {
        Ok(Box::new(CsvStore::new(path, index_name)))
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Flat CSV table. The header is `<index_name>,<day>,<day>...`; each following
/// record is a row name and one value per day.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
    index_name: String,
}

impl CsvStore {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(path: P, index_name: S) -> Self {
        Self {
            path: path.into(),
            index_name: index_name.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, data: &[u8]) -> std::result::Result<DayTable, String> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(data);
        let mut records = reader.records();

        let Some(header) = records.next() else {
            return Ok(DayTable::new());
        };
        let header = header.map_err(|e| e.to_string())?;
        let mut days = Vec::with_capacity(header.len().saturating_sub(1));
        for cell in header.iter().skip(1) {
            let day = NaiveDate::parse_from_str(cell.trim(), DAY_FORMAT)
                .map_err(|e| format!("bad day {cell:?} in header: {e}"))?;
            if days.contains(&day) {
                return Err(format!("day {day} appears twice in header"));
            }
            days.push(day);
        }

        let mut rows = BTreeSet::new();
        let mut columns: Vec<Column> = vec![Column::new(); days.len()];
        for record in records {
            let record = record.map_err(|e| e.to_string())?;
            let mut cells = record.iter();
            let name = cells.next().unwrap_or_default().to_string();
            if !rows.insert(name.clone()) {
                return Err(format!("row {name:?} appears twice"));
            }
            for (i, cell) in cells.enumerate() {
                let cell = cell.trim();
                if cell.is_empty() {
                    return Err(format!("row {name:?} has no value for {}", days[i]));
                }
                let value: f64 = cell
                    .parse()
                    .map_err(|_| format!("row {name:?}, {}: {cell:?} is not a number", days[i]))?;
                columns[i].insert(name.clone(), value);
            }
        }

        let mut table = DayTable::with_rows(rows);
        for (day, column) in days.into_iter().zip(columns) {
            table.insert_column(day, column).map_err(|e| e.to_string())?;
        }
        Ok(table)
    }

    fn render(&self, table: &DayTable) -> std::result::Result<Vec<u8>, csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        let mut header = vec![self.index_name.clone()];
        header.extend(table.days().map(|d| d.format(DAY_FORMAT).to_string()));
        writer.write_record(&header)?;
        for row in table.rows() {
            let mut record = vec![row.clone()];
            for (_, column) in table.columns() {
                record.push(column.get(row).copied().unwrap_or_default().to_string());
            }
            writer.write_record(&record)?;
        }
        writer.into_inner().map_err(|e| e.into_error().into())
    }
}

impl HistoryStore for CsvStore {
    /// A missing file reads as an empty table.
    fn read(&self) -> Result<DayTable> {
        let data = match std::fs::read(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no history yet, starting empty");
                return Ok(DayTable::new());
            }
            Err(e) => return Err(MoodError::read(&self.path, e)),
        };
        let table = self
            .parse(&data)
            .map_err(|reason| MoodError::read(&self.path, reason))?;
        tracing::debug!(path = %self.path.display(), days = table.len(), "read history");
        Ok(table)
    }

    /// Replace the file atomically: write a sibling temp file, then rename it.
    fn write(&self, table: &DayTable) -> Result<()> {
        let bytes = self
            .render(table)
            .map_err(|e| MoodError::write(&self.path, e))?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| MoodError::write(&self.path, e))?;
        tmp.write_all(&bytes)
            .and_then(|_| tmp.flush())
            .map_err(|e| MoodError::write(&self.path, e))?;
        tmp.persist(&self.path)
            .map_err(|e| MoodError::write(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), days = table.len(), "wrote history");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Thread-safe in-memory store. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<DayTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: DayTable) -> Self {
        Self {
            inner: Arc::new(RwLock::new(table)),
        }
    }

    /// Clone of the stored table.
    pub fn snapshot(&self) -> DayTable {
        self.inner.read().map(|t| t.clone()).unwrap_or_default()
    }
}

impl HistoryStore for MemoryStore {
    fn read(&self) -> Result<DayTable> {
        self.inner
            .read()
            .map(|t| t.clone())
            .map_err(|e| MoodError::read("<memory>", e))
    }

    fn write(&self, table: &DayTable) -> Result<()> {
        let mut guard = self
            .inner
            .write()
            .map_err(|e| MoodError::write("<memory>", e))?;
        *guard = table.clone();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// redb
// ---------------------------------------------------------------------------

/// redb-backed store. Each day is one key holding a bincode-encoded column; the
/// row set is kept in a side table so tables without days survive a round trip.
pub struct RedbStore {
    db: redb::Database,
    path: PathBuf,
}

type BoxError = Box<dyn std::error::Error>;

impl RedbStore {
    const DAYS: redb::TableDefinition<'static, &'static str, &'static [u8]> =
        redb::TableDefinition::new("day_columns");
    const ROWS: redb::TableDefinition<'static, &'static str, u64> =
        redb::TableDefinition::new("row_names");

    /// Create or open a redb database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| MoodError::read(path, e))?;
            }
        }
        let db = redb::Database::create(path).map_err(|e| MoodError::read(path, e))?;
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    fn load(&self) -> std::result::Result<DayTable, BoxError> {
        let txn = self.db.begin_read()?;

        let mut rows = BTreeSet::new();
        match txn.open_table(Self::ROWS) {
            Ok(t) => {
                for item in t.iter()? {
                    let (name, _) = item?;
                    rows.insert(name.value().to_string());
                }
            }
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(DayTable::new()),
            Err(e) => return Err(e.into()),
        }

        let mut table = DayTable::with_rows(rows);
        let days = match txn.open_table(Self::DAYS) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(table),
            Err(e) => return Err(e.into()),
        };
        for item in days.iter()? {
            let (key, value) = item?;
            let day = NaiveDate::parse_from_str(key.value(), DAY_FORMAT)?;
            let column: Column = bincode::deserialize(value.value())?;
            table.insert_column(day, column)?;
        }
        Ok(table)
    }

    fn store(&self, table: &DayTable) -> std::result::Result<(), BoxError> {
        let txn = self.db.begin_write()?;
        txn.delete_table(Self::ROWS)?;
        txn.delete_table(Self::DAYS)?;
        {
            let mut rows = txn.open_table(Self::ROWS)?;
            for (i, name) in table.rows().iter().enumerate() {
                rows.insert(name.as_str(), i as u64)?;
            }
            let mut days = txn.open_table(Self::DAYS)?;
            for (day, column) in table.columns() {
                let key = day.format(DAY_FORMAT).to_string();
                let bytes = bincode::serialize(column)?;
                days.insert(key.as_str(), bytes.as_slice())?;
            }
        }
        txn.commit()?;
        Ok(())
    }
}

impl HistoryStore for RedbStore {
    fn read(&self) -> Result<DayTable> {
        self.load().map_err(|e| MoodError::read(&self.path, e))
    }

    /// Whole-table replace inside a single write transaction.
    fn write(&self, table: &DayTable) -> Result<()> {
        self.store(table).map_err(|e| MoodError::write(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 2, d).unwrap()
    }

    #[test]
    fn csv_header_and_rows() {
        let store = CsvStore::new("unused.csv", "emotion");
        let mut t = DayTable::new();
        t.insert_column(day(1), [("joy".to_string(), 2.0), ("fear".to_string(), 0.5)].into())
            .unwrap();
        let text = String::from_utf8(store.render(&t).unwrap()).unwrap();
        assert_eq!(text, "emotion,2021-02-01\nfear,0.5\njoy,2\n");
        assert_eq!(store.parse(text.as_bytes()).unwrap(), t);
    }

    #[test]
    fn csv_rejects_partial_days() {
        let store = CsvStore::new("unused.csv", "emotion");
        let err = store
            .parse(b"emotion,2021-02-01,2021-02-02\njoy,1,\nfear,0,0\n")
            .unwrap_err();
        assert!(err.contains("no value"), "{err}");
        assert!(store.parse(b"emotion,2021-02-01\njoy,1\njoy,2\n").is_err());
        assert!(store.parse(b"emotion,yesterday\njoy,1\n").is_err());
        assert!(store.parse(b"emotion,2021-02-01\njoy,lots\n").is_err());
        // ragged record
        assert!(store.parse(b"emotion,2021-02-01,2021-02-02\njoy,1\n").is_err());
    }

    #[test]
    fn csv_empty_input_is_empty_table() {
        let store = CsvStore::new("unused.csv", "emotion");
        assert!(store.parse(b"").unwrap().is_empty());
    }

    #[test]
    fn memory_store_shares_between_clones() {
        let a = MemoryStore::new();
        let b = a.clone();
        let mut t = DayTable::new();
        t.insert_column(day(3), [("x".to_string(), 1.0)].into()).unwrap();
        a.write(&t).unwrap();
        assert_eq!(b.read().unwrap(), t);
        assert_eq!(b.snapshot(), t);
    }
}
