use std::fs::{
    File,
    OpenOptions,
};
use std::io::{
    self,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};

use fs2::FileExt;

use log::{debug, error};

use crate::ledger::{
    Ledger,
    LedgerError,
    LedgerRecord,
};

/// Ledger default file name, relative to the working directory.
pub const DEFAULT_LEDGER: &str = "uploads.jsonl";

/// One JSON record per line in a single file.
///
/// The file is opened for each append and closed before it returns. While writing, an exclusive
/// advisory lock is held on the file, so appends from other threads or processes using this type
/// cannot interleave with it. A write that fails part way is truncated away before the lock is
/// released, so the file only ever holds whole lines.
#[derive(Debug, Clone)]
pub struct JsonlLedger {
    path: PathBuf,
}

impl JsonlLedger {

    pub fn new(path: &Path) -> JsonlLedger {
        JsonlLedger {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_with<F>(&self, data: &[u8], write: F) -> Result<(), LedgerError>
    where
        F: FnOnce(&mut File, &[u8]) -> io::Result<()>,
    {
        let created = !self.path.exists();
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        FileExt::lock_exclusive(&f)?;

        let r = match f.metadata() {
            Ok(v) => {
                let offset = v.len();
                match write(&mut f, data) {
                    Ok(_) => Ok(()),
                    Err(e) => {
                        error!("ledger append to {:?} failed: {}", self.path, e);
                        if let Err(te) = f.set_len(offset).and_then(|_| f.sync_data()) {
                            error!("cannot truncate {:?} back to {} bytes: {}", self.path, offset, te);
                        }
                        Err(e)
                    },
                }
            },
            Err(e) => Err(e),
        };
        let unlocked = FileExt::unlock(&f);
        r?;
        unlocked?;

        if created {
            sync_dir(parent_dir(&self.path))?;
        }
        debug!("appended {} bytes to ledger {:?}", data.len(), self.path);
        Ok(())
    }
}

impl Ledger for JsonlLedger {
    fn append(&self, record: &LedgerRecord) -> Result<(), LedgerError> {
        let mut line = record.to_line()?;
        line.push('\n');
        self.append_with(line.as_bytes(), write_synced)
    }
}

fn write_synced(f: &mut File, data: &[u8]) -> io::Result<()> {
    f.write_all(data)?;
    f.flush()?;
    f.sync_data()
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(v) if !v.as_os_str().is_empty() => v,
        _ => Path::new("."),
    }
}

// new directory entries are only durable once the directory itself is synced
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::{
        read,
        read_to_string,
    };
    use std::io::{
        self,
        Write,
    };
    use std::path::Path;
    use std::thread;

    use chrono::Utc;
    use tempfile::tempdir;

    use crate::ledger::{
        read_records,
        Ledger,
        LedgerError,
        LedgerRecord,
        RecordStatus,
    };

    use super::{
        parent_dir,
        JsonlLedger,
    };

    fn record(n: usize) -> LedgerRecord {
        LedgerRecord {
            timestamp: Utc::now(),
            file: format!("doc-{}.md", n),
            status: RecordStatus::Succeeded,
            remote_id: Some(format!("remote-{}", n)),
            url: Some(format!("https://viewblock.io/arweave/tx/remote-{}", n)),
            content_id: Some(String::from("bafkreihdwdcefgh4dqkjv67uzcmw7ojee6xedzdetojuzjevtenxquvyku")),
            size: Some(n as u64),
            error: None,
            diagnostic: None,
        }
    }

    #[test]
    fn test_append_only() {
        let d = tempdir().unwrap();
        let fp = d.path().join("uploads.jsonl");
        let ledger = JsonlLedger::new(&fp);

        let mut previous: Vec<u8> = vec!();
        for i in 0..5 {
            ledger.append(&record(i)).unwrap();
            let current = read(&fp).unwrap();
            assert!(current.starts_with(&previous));
            assert!(current.ends_with(b"\n"));
            previous = current;
        }

        let records = read_records(&fp).unwrap();
        assert_eq!(records.len(), 5);
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.file, format!("doc-{}.md", i));
        }
    }

    #[test]
    fn test_duplicate_content_kept() {
        let d = tempdir().unwrap();
        let fp = d.path().join("uploads.jsonl");
        let ledger = JsonlLedger::new(&fp);
        let r = record(1);
        ledger.append(&r).unwrap();
        ledger.append(&r).unwrap();
        let content = read_to_string(&fp).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_concurrent_appends() {
        let d = tempdir().unwrap();
        let fp = d.path().join("uploads.jsonl");
        let threads = 8;
        let per_thread = 25;

        thread::scope(|s| {
            for t in 0..threads {
                let fp = fp.clone();
                s.spawn(move || {
                    let ledger = JsonlLedger::new(&fp);
                    for i in 0..per_thread {
                        let mut r = record(t * per_thread + i);
                        r.diagnostic = Some("x".repeat(4096));
                        ledger.append(&r).unwrap();
                    }
                });
            }
        });

        let records = read_records(&fp).unwrap();
        assert_eq!(records.len(), threads * per_thread);
        let mut sizes: Vec<u64> = records.iter().map(|r| r.size.unwrap()).collect();
        sizes.sort();
        let expect: Vec<u64> = (0..(threads * per_thread) as u64).collect();
        assert_eq!(sizes, expect);
    }

    #[test]
    fn test_unwritable() {
        let ledger = JsonlLedger::new(Path::new("/nonexistent/dir/uploads.jsonl"));
        match ledger.append(&record(0)) {
            Err(LedgerError::Io(_)) => {},
            v => panic!("expected io error, got {:?}", v),
        }
    }

    #[test]
    fn test_failed_write_rolled_back() {
        let d = tempdir().unwrap();
        let fp = d.path().join("uploads.jsonl");
        let ledger = JsonlLedger::new(&fp);
        ledger.append(&record(0)).unwrap();
        let seeded = read(&fp).unwrap();

        let mut line = record(1).to_line().unwrap();
        line.push('\n');
        let r = ledger.append_with(line.as_bytes(), |f, data| {
            f.write_all(&data[..data.len() / 2])?;
            Err(io::Error::new(io::ErrorKind::Other, "file too large"))
        });
        match r {
            Err(LedgerError::Io(_)) => {},
            v => panic!("expected io error, got {:?}", v),
        }
        assert_eq!(read(&fp).unwrap(), seeded);

        ledger.append(&record(2)).unwrap();
        let records = read_records(&fp).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].file, "doc-0.md");
        assert_eq!(records[1].file, "doc-2.md");
    }

    #[test]
    fn test_create_in_new_file() {
        let d = tempdir().unwrap();
        let fp = d.path().join("fresh.jsonl");
        assert!(!fp.exists());
        JsonlLedger::new(&fp).append(&record(0)).unwrap();
        assert_eq!(read_records(&fp).unwrap().len(), 1);
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("uploads.jsonl")), Path::new("."));
        assert_eq!(parent_dir(Path::new("/var/log/uploads.jsonl")), Path::new("/var/log"));
    }
}
