//! Transactional call frame.
//!
//! A `CallFrame` buffers account, storage and event writes on top of a
//! parent `Ledger` and `EventSink`. Reads see the frame's own writes first
//! and fall through to the parent otherwise. `sync` pushes the buffered
//! writes into the parent in one pass; dropping the frame without syncing
//! discards them.
//!
//! Frames nest: a child frame's parent is another `CallFrame`, so a nested
//! invocation that reverts leaves the caller's view untouched. Each frame
//! knows its depth below the root, which bounds call recursion.

use std::collections::BTreeMap;
use std::sync::Arc;

use ewasm_primitives::{Account, Address, Event, LogEvent, PrintEvent, Word256};
use parking_lot::Mutex;
use tracing::trace;

use crate::error::HostError;
use crate::ledger::{EventSink, Ledger};

/// Buffered writes of one frame.
///
/// `BTreeMap` keeps `sync` order deterministic.
#[derive(Debug, Default)]
struct FrameCache {
    /// `Some(account)` for updates, `None` for removals.
    accounts: BTreeMap<Address, Option<Account>>,
    storage: BTreeMap<(Address, Word256), Word256>,
    events: Vec<Event>,
}

/// Result of looking up an account in a frame's own buffer.
enum Cached {
    Found(Account),
    Removed,
    Miss,
}

/// A buffering layer over a parent ledger and event sink.
pub struct CallFrame {
    ledger: Arc<dyn Ledger>,
    sink: Arc<dyn EventSink>,
    read_only: bool,
    depth: usize,
    cache: Mutex<FrameCache>,
}

impl CallFrame {
    /// Create a root frame (depth 0).
    pub fn new(ledger: Arc<dyn Ledger>, sink: Arc<dyn EventSink>, read_only: bool) -> Self {
        Self {
            ledger,
            sink,
            read_only,
            depth: 0,
            cache: Mutex::new(FrameCache::default()),
        }
    }

    /// Open a child frame on top of this one. A read-only parent always
    /// yields a read-only child.
    pub fn child(self: &Arc<Self>, read_only: bool) -> CallFrame {
        CallFrame {
            depth: self.depth + 1,
            ..CallFrame::new(
                self.clone() as Arc<dyn Ledger>,
                self.clone() as Arc<dyn EventSink>,
                self.read_only || read_only,
            )
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Number of frames between this one and the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Push every buffered write into the parent, leaving this frame empty.
    ///
    /// Accounts are applied before storage, and events are replayed in
    /// emission order. Writes land one at a time: if the parent fails
    /// partway, the writes before the failure stay applied there and this
    /// frame keeps its whole buffer. A failed sync is fatal to the
    /// invocation that owns the frame.
    pub fn sync(&self) -> Result<(), HostError> {
        let mut cache = self.cache.lock();
        trace!(
            depth = self.depth,
            accounts = cache.accounts.len(),
            slots = cache.storage.len(),
            events = cache.events.len(),
            "syncing call frame"
        );
        for (address, entry) in &cache.accounts {
            match entry {
                Some(account) => self.ledger.update_account(account.clone())?,
                None => self.ledger.remove_account(address)?,
            }
        }
        for ((address, key), value) in &cache.storage {
            self.ledger.set_storage(address, key, *value)?;
        }
        for event in &cache.events {
            match event {
                Event::Print(p) => self.sink.print(p.clone())?,
                Event::Log(l) => self.sink.log(l.clone())?,
            }
        }
        *cache = FrameCache::default();
        Ok(())
    }

    fn lookup(&self, address: &Address) -> Cached {
        match self.cache.lock().accounts.get(address) {
            Some(Some(account)) => Cached::Found(account.clone()),
            Some(None) => Cached::Removed,
            None => Cached::Miss,
        }
    }

    fn check_writable(&self) -> Result<(), HostError> {
        if self.read_only {
            return Err(HostError::illegal_write());
        }
        Ok(())
    }
}

impl Ledger for CallFrame {
    fn get_account(&self, address: &Address) -> Result<Option<Account>, HostError> {
        match self.lookup(address) {
            Cached::Found(account) => Ok(Some(account)),
            Cached::Removed => Ok(None),
            Cached::Miss => self.ledger.get_account(address),
        }
    }

    fn update_account(&self, account: Account) -> Result<(), HostError> {
        self.check_writable()?;
        self.cache
            .lock()
            .accounts
            .insert(account.address, Some(account));
        Ok(())
    }

    fn remove_account(&self, address: &Address) -> Result<(), HostError> {
        self.check_writable()?;
        self.cache.lock().accounts.insert(*address, None);
        Ok(())
    }

    fn get_storage(&self, address: &Address, key: &Word256) -> Result<Word256, HostError> {
        let cached = self.cache.lock().storage.get(&(*address, *key)).copied();
        match cached {
            Some(value) => Ok(value),
            None => self.ledger.get_storage(address, key),
        }
    }

    fn set_storage(
        &self,
        address: &Address,
        key: &Word256,
        value: Word256,
    ) -> Result<(), HostError> {
        self.check_writable()?;
        self.cache.lock().storage.insert((*address, *key), value);
        Ok(())
    }
}

impl EventSink for CallFrame {
    // Debug output is allowed from read-only frames.
    fn print(&self, event: PrintEvent) -> Result<(), HostError> {
        self.cache.lock().events.push(Event::Print(event));
        Ok(())
    }

    fn log(&self, event: LogEvent) -> Result<(), HostError> {
        self.check_writable()?;
        self.cache.lock().events.push(Event::Log(event));
        Ok(())
    }
}
