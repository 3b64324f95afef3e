//! In-memory ledger and event collector.
//!
//! `MemLedger` implements `Ledger` using `BTreeMap`s behind `parking_lot`
//! locks, so it can be shared by `Arc` across frames. `EventCollector`
//! records every event in emission order. Both are meant for tests and
//! embedders without a persistent backend.

use std::collections::BTreeMap;

use ewasm_primitives::{Account, Address, Event, LogEvent, PrintEvent, Word256, ZERO_WORD};
use parking_lot::{Mutex, RwLock};

use crate::error::HostError;
use crate::ledger::{EventSink, Ledger};

/// In-memory ledger backed by `BTreeMap`.
#[derive(Debug, Default)]
pub struct MemLedger {
    accounts: RwLock<BTreeMap<Address, Account>>,
    storage: RwLock<BTreeMap<(Address, Word256), Word256>>,
}

impl MemLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger pre-populated with accounts.
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let ledger = Self::new();
        for acc in accounts {
            ledger.insert(acc);
        }
        ledger
    }

    /// Insert or replace an account directly.
    pub fn insert(&self, account: Account) {
        self.accounts.write().insert(account.address, account);
    }

    /// Snapshot of an account, bypassing the `Ledger` error channel.
    pub fn account(&self, address: &Address) -> Option<Account> {
        self.accounts.read().get(address).cloned()
    }

    /// Snapshot of a storage slot. Unset slots read as the zero word.
    pub fn storage(&self, address: &Address, key: &Word256) -> Word256 {
        self.storage
            .read()
            .get(&(*address, *key))
            .copied()
            .unwrap_or(ZERO_WORD)
    }

    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }
}

impl Ledger for MemLedger {
    fn get_account(&self, address: &Address) -> Result<Option<Account>, HostError> {
        Ok(self.account(address))
    }

    fn update_account(&self, account: Account) -> Result<(), HostError> {
        self.insert(account);
        Ok(())
    }

    fn remove_account(&self, address: &Address) -> Result<(), HostError> {
        self.accounts.write().remove(address);
        Ok(())
    }

    fn get_storage(&self, address: &Address, key: &Word256) -> Result<Word256, HostError> {
        Ok(self.storage(address, key))
    }

    fn set_storage(
        &self,
        address: &Address,
        key: &Word256,
        value: Word256,
    ) -> Result<(), HostError> {
        self.storage.write().insert((*address, *key), value);
        Ok(())
    }
}

/// Event sink that keeps every event in order of emission.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Mutex<Vec<Event>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn prints(&self) -> Vec<PrintEvent> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Print(p) => Some(p.clone()),
                Event::Log(_) => None,
            })
            .collect()
    }

    pub fn logs(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Log(l) => Some(l.clone()),
                Event::Print(_) => None,
            })
            .collect()
    }
}

impl EventSink for EventCollector {
    fn print(&self, event: PrintEvent) -> Result<(), HostError> {
        self.events.lock().push(Event::Print(event));
        Ok(())
    }

    fn log(&self, event: LogEvent) -> Result<(), HostError> {
        self.events.lock().push(Event::Log(event));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ledger() {
        let ledger = MemLedger::new();
        assert_eq!(ledger.account_count(), 0);
        assert_eq!(ledger.get_account(&[1u8; 20]).unwrap(), None);
        assert_eq!(ledger.get_storage(&[1u8; 20], &[2u8; 32]).unwrap(), ZERO_WORD);
    }

    #[test]
    fn test_update_and_remove_account() {
        let ledger = MemLedger::new();
        ledger.update_account(Account::with_balance([1u8; 20], 5)).unwrap();
        assert_eq!(ledger.account(&[1u8; 20]).unwrap().balance, 5);

        ledger.remove_account(&[1u8; 20]).unwrap();
        assert!(ledger.account(&[1u8; 20]).is_none());
        // removing twice is fine
        ledger.remove_account(&[1u8; 20]).unwrap();
    }

    #[test]
    fn test_storage_is_per_account() {
        let ledger = MemLedger::new();
        ledger.set_storage(&[1u8; 20], &[0u8; 32], [9u8; 32]).unwrap();
        assert_eq!(ledger.storage(&[1u8; 20], &[0u8; 32]), [9u8; 32]);
        assert_eq!(ledger.storage(&[2u8; 20], &[0u8; 32]), ZERO_WORD);
    }

    #[test]
    fn test_with_accounts() {
        let ledger = MemLedger::with_accounts([Account::new([1u8; 20]), Account::new([2u8; 20])]);
        assert_eq!(ledger.account_count(), 2);
    }

    #[test]
    fn test_event_collector_preserves_order() {
        let sink = EventCollector::new();
        sink.print(PrintEvent { address: [1u8; 20], data: b"a".to_vec() }).unwrap();
        sink.log(LogEvent { address: [1u8; 20], topics: vec![], data: b"b".to_vec() }).unwrap();
        sink.print(PrintEvent { address: [1u8; 20], data: b"c".to_vec() }).unwrap();

        assert_eq!(sink.events().len(), 3);
        let prints: Vec<_> = sink.prints().into_iter().map(|p| p.data).collect();
        assert_eq!(prints, vec![b"a".to_vec(), b"c".to_vec()]);
        assert_eq!(sink.logs()[0].data, b"b".to_vec());
    }
}
