use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::fs;

use crate::error::{CollectError, HistoryReadError};
use crate::models::{record_timestamp, HistoryFile};

/// What [`merge_entry`] did with the new snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    Replaced { index: usize },
}

/// Read the stored records at `path`. A missing file is an empty history, not
/// an error. Records are returned as stored so rewriting them loses nothing.
pub async fn load_history(path: &Path) -> Result<Vec<Value>, HistoryReadError> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("no history at {}, starting fresh", path.display());
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(HistoryReadError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    decode_history(&content).map_err(|e| match e {
        DecodeError::Syntax(source) => HistoryReadError::Parse {
            path: path.to_path_buf(),
            source,
        },
        DecodeError::Shape(source) => HistoryReadError::Shape {
            path: path.to_path_buf(),
            source,
        },
    })
}

#[derive(Debug)]
pub(crate) enum DecodeError {
    Syntax(serde_json::Error),
    Shape(serde_json::Error),
}

/// Decode `data.json` content into records, normalizing the legacy
/// single-object layout. Only a syntax error or a top-level value that is
/// neither an array nor an object is rejected.
pub(crate) fn decode_history(content: &str) -> Result<Vec<Value>, DecodeError> {
    let value: Value = serde_json::from_str(content).map_err(DecodeError::Syntax)?;
    let file: HistoryFile = serde_json::from_value(value).map_err(DecodeError::Shape)?;
    Ok(file.into_records())
}

/// Dedup key: the `YYYY-MM-DD` prefix of an RFC 3339 UTC timestamp.
pub fn day_key(now: DateTime<Utc>) -> String {
    now.date_naive().format("%Y-%m-%d").to_string()
}

/// Replace the record already collected on `now`'s UTC day in place, or
/// append.
pub fn merge_entry(history: &mut Vec<Value>, record: Value, now: DateTime<Utc>) -> MergeOutcome {
    let key = day_key(now);
    let existing = history
        .iter()
        .position(|r| record_timestamp(r).is_some_and(|ts| ts.starts_with(&key)));

    match existing {
        Some(index) => {
            tracing::info!("updating existing entry for {}", key);
            history[index] = record;
            MergeOutcome::Replaced { index }
        }
        None => {
            tracing::info!("adding new entry for {}", key);
            history.push(record);
            MergeOutcome::Inserted
        }
    }
}

/// Write the full history as pretty-printed JSON, creating the parent
/// directory first. Not atomic.
pub async fn save_history(path: &Path, history: &[Value]) -> Result<(), CollectError> {
    let write_err = |source: std::io::Error| CollectError::HistoryWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let json = serde_json::to_string_pretty(history)
        .map_err(|e| write_err(std::io::Error::new(ErrorKind::InvalidData, e)))?;
    fs::write(path, json).await.map_err(write_err)?;

    Ok(())
}
