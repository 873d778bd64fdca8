//! Record store: one CSV file per record type, header row mandatory.
//!
//! Every mutation is a full read-modify-write of the file. Within the
//! process, mutations on the same file are serialized through a per-file
//! mutex; on disk, every rewrite is an atomic replace (see [`atomic`]).
//! Work that reads one file and writes others runs inside
//! [`CsvStore::transaction`].
//!
//! A missing file reads as an empty table. Any other I/O failure or a
//! malformed row is an error, never an empty result.

pub mod atomic;

use std::collections::HashMap;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use serde::de::DeserializeOwned;
use serde::Serialize;

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{file}: expected {expected} columns, got {actual}")]
    SchemaMismatch {
        file: String,
        expected: usize,
        actual: usize,
    },
    #[error("{file}: unknown column '{column}'")]
    UnknownColumn { file: String, column: String },
    #[error("{file}: row {index} out of range ({len} rows)")]
    RowOutOfRange {
        file: String,
        index: usize,
        len: usize,
    },
    #[error("{file}: no row with {field} = {key}")]
    KeyNotFound {
        file: String,
        field: String,
        key: String,
    },
    #[error("Internal lock error")]
    LockPoisoned,
}

// ═══════════════════════════════════════════════════════════
// Table
// ═══════════════════════════════════════════════════════════

/// Header plus rows, in file order. Row identity is the position in `rows`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column in the header.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// A typed record persisted as one row of a fixed file.
///
/// `COLUMNS` must list the serde field names in declaration order.
pub trait StoreRecord: Serialize + DeserializeOwned {
    const FILE: &'static str;
    const COLUMNS: &'static [&'static str];
}

// ═══════════════════════════════════════════════════════════
// CsvStore
// ═══════════════════════════════════════════════════════════

pub struct CsvStore {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    txn: Mutex<()>,
}

impl CsvStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
            txn: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    fn lock_for(&self, file: &str) -> Result<Arc<Mutex<()>>, StoreError> {
        let mut locks = self.locks.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(locks
            .entry(file.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    /// Run `op` while holding the file's mutex.
    fn with_file<R>(
        &self,
        file: &str,
        op: impl FnOnce(&Path) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let lock = self.lock_for(file)?;
        let _guard = lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        op(&self.path(file))
    }

    /// Run a multi-file check-then-write as one unit. Transactions are
    /// serialized against each other; single-file calls made inside still
    /// take their own file lock, so plain appends elsewhere are not blocked.
    pub fn transaction<R, E>(&self, op: impl FnOnce(&Self) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let _guard = self.txn.lock().map_err(|_| StoreError::LockPoisoned)?;
        op(self)
    }

    /// Create a header-only file if absent. Returns `true` when the file was created.
    pub fn ensure(&self, file: &str, columns: &[&str]) -> Result<bool, StoreError> {
        self.with_file(file, |path| {
            if path.exists() {
                return Ok(false);
            }
            let table = Table {
                headers: columns.iter().map(|c| c.to_string()).collect(),
                rows: Vec::new(),
            };
            write_table(path, &table)?;
            tracing::debug!(file, "Created store file");
            Ok(true)
        })
    }

    /// All rows of a file. A missing file is an empty table.
    pub fn read(&self, file: &str) -> Result<Table, StoreError> {
        self.with_file(file, read_table)
    }

    /// Append one row. `columns` is the header used when the file does not
    /// exist yet; an existing file keeps its own header and the row is
    /// projected onto it by column name. Returns the new row's index.
    pub fn append(
        &self,
        file: &str,
        columns: &[&str],
        row: Vec<String>,
    ) -> Result<usize, StoreError> {
        if row.len() != columns.len() {
            return Err(StoreError::SchemaMismatch {
                file: file.to_string(),
                expected: columns.len(),
                actual: row.len(),
            });
        }
        self.with_file(file, |path| {
            let mut table = read_table(path)?;
            if table.headers.is_empty() {
                table.headers = columns.iter().map(|c| c.to_string()).collect();
            }
            let projected = project_row(file, &table.headers, columns, row)?;
            table.rows.push(projected);
            write_table(path, &table)?;
            Ok(table.rows.len() - 1)
        })
    }

    /// Overwrite one field of the row at `row_index`.
    pub fn update_field(
        &self,
        file: &str,
        row_index: usize,
        field: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        self.with_file(file, |path| {
            let mut table = read_table(path)?;
            let col = table.column(field).ok_or_else(|| StoreError::UnknownColumn {
                file: file.to_string(),
                column: field.to_string(),
            })?;
            let len = table.rows.len();
            let row = table
                .rows
                .get_mut(row_index)
                .ok_or_else(|| StoreError::RowOutOfRange {
                    file: file.to_string(),
                    index: row_index,
                    len,
                })?;
            row[col] = value.to_string();
            write_table(path, &table)
        })
    }

    /// Overwrite one field of the first row whose `key_field` equals `key`.
    /// Returns the index of the updated row.
    pub fn update_field_where(
        &self,
        file: &str,
        key_field: &str,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<usize, StoreError> {
        self.with_file(file, |path| {
            let mut table = read_table(path)?;
            let unknown = |column: &str| StoreError::UnknownColumn {
                file: file.to_string(),
                column: column.to_string(),
            };
            let key_col = table.column(key_field).ok_or_else(|| unknown(key_field))?;
            let col = table.column(field).ok_or_else(|| unknown(field))?;

            let index = table
                .rows
                .iter()
                .position(|row| row[key_col] == key)
                .ok_or_else(|| StoreError::KeyNotFound {
                    file: file.to_string(),
                    field: key_field.to_string(),
                    key: key.to_string(),
                })?;
            table.rows[index][col] = value.to_string();
            write_table(path, &table)?;
            Ok(index)
        })
    }

    /// Last modification time of a file, if it exists.
    pub fn modified(&self, file: &str) -> Option<SystemTime> {
        std::fs::metadata(self.path(file))
            .and_then(|m| m.modified())
            .ok()
    }

    // ── Typed layer ─────────────────────────────────────────

    /// Create the record type's file with its header if absent.
    pub fn ensure_records<T: StoreRecord>(&self) -> Result<bool, StoreError> {
        self.ensure(T::FILE, T::COLUMNS)
    }

    /// Deserialize every row of the record type's file.
    pub fn read_records<T: StoreRecord>(&self) -> Result<Vec<T>, StoreError> {
        self.read_records_in(T::FILE)
    }

    /// Like [`read_records`](Self::read_records), for a record type stored
    /// in more than one file.
    pub fn read_records_in<T: StoreRecord>(&self, file: &str) -> Result<Vec<T>, StoreError> {
        let table = self.read(file)?;
        rows_to_records(&table)
    }

    /// Append one typed record. Returns the new row's index.
    pub fn append_record<T: StoreRecord>(&self, record: &T) -> Result<usize, StoreError> {
        self.append_record_in(T::FILE, record)
    }

    pub fn append_record_in<T: StoreRecord>(
        &self,
        file: &str,
        record: &T,
    ) -> Result<usize, StoreError> {
        let row = record_to_row(record)?;
        self.append(file, T::COLUMNS, row)
    }
}

// ═══════════════════════════════════════════════════════════
// File and row helpers
// ═══════════════════════════════════════════════════════════

fn read_table(path: &Path) -> Result<Table, StoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Table::default()),
        Err(e) => return Err(e.into()),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(file);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(Table { headers, rows })
}

fn write_table(path: &Path, table: &Table) -> Result<(), StoreError> {
    atomic::replace_with(path, |file| {
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    })
}

/// Reorder `row` (laid out as `columns`) into the file's header order.
fn project_row(
    file: &str,
    headers: &[String],
    columns: &[&str],
    row: Vec<String>,
) -> Result<Vec<String>, StoreError> {
    if headers.iter().map(String::as_str).eq(columns.iter().copied()) {
        return Ok(row);
    }
    headers
        .iter()
        .map(|header| {
            columns
                .iter()
                .position(|c| c == header)
                .map(|i| row[i].clone())
                .ok_or_else(|| StoreError::UnknownColumn {
                    file: file.to_string(),
                    column: header.clone(),
                })
        })
        .collect()
}

/// Serialize a record into one row of string fields.
pub(crate) fn record_to_row<T: Serialize>(record: &T) -> Result<Vec<String>, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.serialize(record)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| StoreError::Io(e.into_error()))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(bytes.as_slice());
    let mut fields = csv::StringRecord::new();
    reader.read_record(&mut fields)?;
    Ok(fields.iter().map(str::to_string).collect())
}

fn rows_to_records<T: DeserializeOwned>(table: &Table) -> Result<Vec<T>, StoreError> {
    let headers = csv::StringRecord::from(table.headers.clone());
    table
        .rows
        .iter()
        .map(|row| {
            let record = csv::StringRecord::from(row.clone());
            record.deserialize(Some(&headers)).map_err(StoreError::from)
        })
        .collect()
}

/// Serialize records to CSV bytes for downloads. The header row is
/// always written, so an empty export still names its columns.
pub fn records_to_csv<T: StoreRecord>(records: &[T]) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(T::COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| StoreError::Io(e.into_error()))
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
