//! File-backed ledger: one pretty-printed JSON array per scope.
//!
//! Reads accept the legacy single-object shape; writes always produce the
//! array. Every append rewrites the whole file through a temp file, fsync and
//! rename, so readers never observe a torn journal.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;

use taxbridge_core::LedgerScope;
use taxbridge_stock::MovementRecord;

use super::r#trait::{LedgerStore, LedgerStoreError, check_journal, prepare_append};

/// On-disk journal shapes accepted on read.
#[derive(Deserialize)]
#[serde(untagged)]
enum Journal {
    Many(Vec<MovementRecord>),
    One(Box<MovementRecord>),
}

impl Journal {
    fn into_records(self) -> Vec<MovementRecord> {
        match self {
            Journal::Many(records) => records,
            Journal::One(record) => vec![*record],
        }
    }
}

#[derive(Debug)]
pub struct JsonFileLedgerStore {
    scope: LedgerScope,
    path: PathBuf,
    write_gate: Mutex<()>,
}

impl JsonFileLedgerStore {
    pub fn new(scope: LedgerScope, path: impl Into<PathBuf>) -> Self {
        Self {
            scope,
            path: path.into(),
            write_gate: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_journal(&self) -> Result<Vec<MovementRecord>, LedgerStoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LedgerStoreError::Storage(format!("{}: {e}", self.path.display())));
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let journal: Journal = serde_json::from_slice(&bytes)
            .map_err(|e| LedgerStoreError::Corrupt(format!("{}: {e}", self.path.display())))?;

        let mut records = journal.into_records();
        records.sort_by_key(|r| r.sar_no);
        check_journal(&self.scope, &records)?;
        Ok(records)
    }

    fn write_journal(&self, records: &[MovementRecord]) -> Result<(), LedgerStoreError> {
        let path = self.path.as_path();
        let io_err = |p: &Path, e: std::io::Error| LedgerStoreError::Storage(format!("{}: {e}", p.display()));

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }

        let tmp_path = tmp_write_path(path);
        let write_result = (|| -> Result<(), LedgerStoreError> {
            let file = File::create(&tmp_path).map_err(|e| io_err(&tmp_path, e))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, records)
                .map_err(|e| LedgerStoreError::Storage(format!("serialize journal: {e}")))?;
            writer.flush().map_err(|e| io_err(&tmp_path, e))?;
            let file = writer
                .into_inner()
                .map_err(|e| io_err(&tmp_path, e.into_error()))?;
            file.sync_all().map_err(|e| io_err(&tmp_path, e))?;
            Ok(())
        })();

        if let Err(error) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(error);
        }

        fs::rename(&tmp_path, path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            LedgerStoreError::Storage(format!("{} -> {}: {e}", tmp_path.display(), path.display()))
        })?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            let dir = File::open(parent).map_err(|e| io_err(parent, e))?;
            dir.sync_all().map_err(|e| io_err(parent, e))?;
        }

        Ok(())
    }
}

impl LedgerStore for JsonFileLedgerStore {
    fn scope(&self) -> &LedgerScope {
        &self.scope
    }

    fn append(&self, record: MovementRecord) -> Result<MovementRecord, LedgerStoreError> {
        let _guard = self
            .write_gate
            .lock()
            .map_err(|_| LedgerStoreError::Storage("lock poisoned".to_string()))?;

        let mut records = self.read_journal()?;
        let last = records.last().map(|r| r.sar_no).unwrap_or(0);
        let stored = prepare_append(&self.scope, record, last)?;

        records.push(stored.clone());
        self.write_journal(&records)?;

        tracing::debug!(
            scope = %self.scope,
            sar_no = stored.sar_no,
            path = %self.path.display(),
            "movement appended"
        );
        Ok(stored)
    }

    fn load_all(&self) -> Result<Vec<MovementRecord>, LedgerStoreError> {
        self.read_journal()
    }
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}
