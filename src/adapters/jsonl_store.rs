use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{DomainError, IntakeRecord};
use crate::ports::{IntakeStore, StoredIntake};

/// One line of the intake log.
#[derive(Debug, Serialize, Deserialize)]
struct IntakeLine {
    id: i64,
    created_at: DateTime<Utc>,
    #[serde(flatten)]
    record: IntakeRecord,
}

/// Append-only JSON-lines intake store.
///
/// Ids continue after the highest id already in the file. Lines that do not
/// parse are skipped with a warning.
pub struct JsonlIntakeStore {
    path: PathBuf,
    next_id: Mutex<i64>,
}

impl JsonlIntakeStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if ends_mid_line(&path)? {
            warn!(path = ?path, "Intake log ends with a partial line, terminating it");
            OpenOptions::new().append(true).open(&path)?.write_all(b"\n")?;
        }

        let lines = scan(&path)?;
        let existing = lines.len();
        let last_id = lines.iter().map(|line| line.id).max().unwrap_or(0);

        info!(path = ?path, existing, "Intake log opened");

        Ok(Self {
            path,
            next_id: Mutex::new(last_id + 1),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored record back, in insertion order.
    pub fn read_all(&self) -> Result<Vec<(StoredIntake, IntakeRecord)>, DomainError> {
        Ok(scan(&self.path)?
            .into_iter()
            .map(|line| {
                (
                    StoredIntake {
                        id: line.id,
                        created_at: line.created_at,
                    },
                    line.record,
                )
            })
            .collect())
    }
}

fn ends_mid_line(path: &Path) -> Result<bool, DomainError> {
    if !path.exists() {
        return Ok(false);
    }
    let mut file = fs::File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

fn scan(path: &Path) -> Result<Vec<IntakeLine>, DomainError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = fs::File::open(path)?;
    let mut out = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<IntakeLine>(&line) {
            Ok(parsed) => out.push(parsed),
            Err(e) => warn!(path = ?path, line = index + 1, error = %e, "Skipping unreadable intake line"),
        }
    }
    Ok(out)
}

#[async_trait]
impl IntakeStore for JsonlIntakeStore {
    async fn persist(&self, record: IntakeRecord) -> Result<StoredIntake, DomainError> {
        // Held for the append so ids and line order agree.
        let mut next_id = self.next_id.lock();

        let line = IntakeLine {
            id: *next_id,
            created_at: Utc::now(),
            record,
        };
        let mut json = serde_json::to_string(&line)?;
        json.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let len_before = file
            .metadata()
            .map_err(|e| DomainError::Storage(e.to_string()))?
            .len();
        if let Err(e) = file.write_all(json.as_bytes()) {
            // Drop any partial line so the log stays one record per line.
            if let Err(truncate) = file.set_len(len_before) {
                warn!(path = ?self.path, error = %truncate, "Could not truncate partial intake line");
            }
            return Err(DomainError::Storage(e.to_string()));
        }

        *next_id += 1;
        debug!(id = line.id, "Intake appended");

        Ok(StoredIntake {
            id: line.id,
            created_at: line.created_at,
        })
    }
}
