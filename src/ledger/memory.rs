use std::sync::Mutex;

use crate::ledger::{
    Ledger,
    LedgerError,
    LedgerRecord,
};

/// Keeps serialized record lines in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    lines: Mutex<Vec<String>>,
}

impl MemoryLedger {

    pub fn new() -> MemoryLedger {
        MemoryLedger::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(v) => v.clone(),
            Err(e) => e.into_inner().clone(),
        }
    }

    pub fn records(&self) -> Result<Vec<LedgerRecord>, LedgerError> {
        let mut records = vec!();
        for (i, l) in self.lines().iter().enumerate() {
            match serde_json::from_str(l) {
                Ok(v) => records.push(v),
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

    pub fn len(&self) -> usize {
        self.lines().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Ledger for MemoryLedger {
    fn append(&self, record: &LedgerRecord) -> Result<(), LedgerError> {
        let line = record.to_line()?;
        match self.lines.lock() {
            Ok(mut v) => v.push(line),
            Err(e) => e.into_inner().push(line),
        }
        Ok(())
    }
}
