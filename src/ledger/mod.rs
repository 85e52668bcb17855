//! The ledger is the local, append-only trail of upload attempts.
//!
//! Every finalized attempt becomes one [LedgerRecord]. A record is appended once and never read
//! back, rewritten or deduplicated by the pipeline. The same content uploaded twice gives two
//! records with the same content identifier.
//!
//! The file ledger stores one JSON object per line:
//!
//! ``` ignore,
//! {"timestamp":"2026-10-19T12:00:00Z","file":"notes.md","status":"succeeded","remote_id":"...","url":"https://viewblock.io/arweave/tx/...","content_id":"bafkrei...","size":12}
//! ```
use std::fs::File;
use std::io::{
    self,
    BufRead,
    BufReader,
};
use std::path::Path;

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::attempt::{
    FinalizedAttempt,
    Outcome,
};

/// Append-only file ledger.
pub mod file;

/// In-process ledger.
pub mod memory;

pub use file::JsonlLedger;
pub use memory::MemoryLedger;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger write failed: {0}")]
    Io(#[from] io::Error),
    #[error("cannot serialize ledger record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("ledger line {line} is not a valid record: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Succeeded,
    Failed,
}

/// Persisted form of a [FinalizedAttempt].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub timestamp: DateTime<Utc>,
    pub file: String,
    pub status: RecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl LedgerRecord {

    /// Single line JSON, without the line terminator.
    pub fn to_line(&self) -> Result<String, LedgerError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<&FinalizedAttempt> for LedgerRecord {
    fn from(attempt: &FinalizedAttempt) -> LedgerRecord {
        let mut r = LedgerRecord {
            timestamp: attempt.timestamp(),
            file: attempt.path().display().to_string(),
            status: RecordStatus::Failed,
            remote_id: None,
            url: None,
            content_id: attempt.content_id().map(|v| v.to_string()),
            size: attempt.size(),
            error: None,
            diagnostic: None,
        };
        match attempt.outcome() {
            Outcome::Succeeded{ remote_id, url } => {
                r.status = RecordStatus::Succeeded;
                r.remote_id = Some(remote_id.clone());
                r.url = Some(url.to_string());
            },
            Outcome::Failed(f) => {
                r.error = Some(f.kind.to_string());
                r.diagnostic = Some(f.diagnostic.clone());
            },
        }
        r
    }
}

/// Durable sink for ledger records.
///
/// `append` must not return before the record is durable, and concurrent appends must not
/// interleave.
pub trait Ledger {
    fn append(&self, record: &LedgerRecord) -> Result<(), LedgerError>;
}

impl<L: Ledger + ?Sized> Ledger for &L {
    fn append(&self, record: &LedgerRecord) -> Result<(), LedgerError> {
        (**self).append(record)
    }
}

impl<L: Ledger + ?Sized> Ledger for Box<L> {
    fn append(&self, record: &LedgerRecord) -> Result<(), LedgerError> {
        (**self).append(record)
    }
}

/// Parse all records of a ledger file, in file order. Blank lines are skipped.
///
/// # Arguments
///
/// * `path` - Path to ledger file.
pub fn read_records(path: &Path) -> Result<Vec<LedgerRecord>, LedgerError> {
    let f = File::open(path)?;
    let mut records = vec!();
    for (i, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str(trimmed) {
            Ok(v) => {
                records.push(v);
            },
            Err(e) => {
                return Err(LedgerError::Parse{
                    line: i + 1,
                    source: e,
                });
            },
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use url::Url;

    use crate::attempt::{
        Failure,
        FailureKind,
        Outcome,
        UploadAttempt,
    };
    use crate::cid::ContentId;
    use crate::tag::TagSet;

    use super::{
        LedgerRecord,
        RecordStatus,
    };

    #[test]
    fn test_record_succeeded() {
        let mut a = UploadAttempt::new(Path::new("notes.md"));
        a.identified(ContentId::from_bytes(b"hello world\n"), 12);
        a.tagged(TagSet::new());
        a.uploading();
        let f = a.finalize(Outcome::Succeeded{
            remote_id: String::from("foo"),
            url: Url::parse("https://viewblock.io/arweave/tx/foo").unwrap(),
        });
        let r = LedgerRecord::from(&f);
        assert_eq!(r.status, RecordStatus::Succeeded);
        assert_eq!(r.file, "notes.md");
        assert_eq!(r.remote_id.as_deref(), Some("foo"));
        assert_eq!(r.url.as_deref(), Some("https://viewblock.io/arweave/tx/foo"));
        assert_eq!(r.content_id.as_deref(), Some("bafkreifjjcie6lypi6ny7amxnfftagclbuxndqonfipmb64f2km2devei4"));
        assert_eq!(r.size, Some(12));
        assert!(r.error.is_none());

        let line = r.to_line().unwrap();
        assert!(!line.contains('\n'));
        assert!(!line.contains("\"error\""));
        let back: LedgerRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_record_failed() {
        let a = UploadAttempt::new(Path::new("missing.md"));
        let f = a.finalize(Outcome::Failed(Failure::new(FailureKind::InputUnreadable, "No such file")));
        let r = LedgerRecord::from(&f);
        assert_eq!(r.status, RecordStatus::Failed);
        assert_eq!(r.error.as_deref(), Some("InputUnreadable"));
        assert_eq!(r.diagnostic.as_deref(), Some("No such file"));
        assert!(r.content_id.is_none());
        let line = r.to_line().unwrap();
        assert!(line.contains("\"status\":\"failed\""));
        assert!(!line.contains("remote_id"));
    }
}
