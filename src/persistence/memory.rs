//! In-memory save storage
//!
//! Clones share the same backing record, so a handle kept outside a `Game`
//! can observe what the game wrote.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Result, bail};

use super::record::SaveRecord;
use super::store::SaveStore;

#[derive(Debug, Default)]
struct Inner {
    record: Option<SaveRecord>,
    writes: Vec<SaveRecord>,
    fail_writes: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds `record`
    pub fn with_record(record: SaveRecord) -> Self {
        let store = Self::new();
        store.inner.borrow_mut().record = Some(record);
        store
    }

    /// Make every subsequent save fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    /// Last successfully saved record
    pub fn record(&self) -> Option<SaveRecord> {
        self.inner.borrow().record
    }

    /// Every successful save, oldest first
    pub fn writes(&self) -> Vec<SaveRecord> {
        self.inner.borrow().writes.clone()
    }
}

impl SaveStore for MemoryStore {
    fn load(&self) -> SaveRecord {
        self.record().unwrap_or_default()
    }

    fn save(&mut self, record: &SaveRecord) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            bail!("memory store is read-only");
        }
        inner.record = Some(*record);
        inner.writes.push(*record);
        Ok(())
    }
}
