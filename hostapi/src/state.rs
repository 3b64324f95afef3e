//! The state handle passed to every contract invocation.
//!
//! `State` bundles the current call frame with the chain metadata provider
//! and the permission checker. Cloning is cheap; all three parts are shared.

use std::sync::Arc;

use ewasm_primitives::{
    Account, Address, ErrorCode, LogEvent, Permission, PrintEvent, Word256,
};
use ewasm_primitives::types::address_to_hex;
use tracing::debug;

use crate::blockchain::Blockchain;
use crate::error::HostError;
use crate::frame::CallFrame;
use crate::ledger::{EventSink, Ledger};
use crate::permission::PermissionChecker;

#[derive(Clone)]
pub struct State {
    frame: Arc<CallFrame>,
    blockchain: Arc<dyn Blockchain>,
    permissions: Arc<dyn PermissionChecker>,
}

impl State {
    /// Create a root handle. Writes stay buffered in the root frame until
    /// [`State::sync`] pushes them into `ledger` and `sink`.
    pub fn new(
        ledger: Arc<dyn Ledger>,
        sink: Arc<dyn EventSink>,
        blockchain: Arc<dyn Blockchain>,
        permissions: Arc<dyn PermissionChecker>,
    ) -> Self {
        Self {
            frame: Arc::new(CallFrame::new(ledger, sink, false)),
            blockchain,
            permissions,
        }
    }

    /// A handle on a fresh child frame sharing this handle's chain view.
    pub fn new_frame(&self, read_only: bool) -> Self {
        Self {
            frame: Arc::new(self.frame.child(read_only)),
            blockchain: self.blockchain.clone(),
            permissions: self.permissions.clone(),
        }
    }

    /// Commit this frame's writes into its parent.
    pub fn sync(&self) -> Result<(), HostError> {
        self.frame.sync()
    }

    pub fn is_read_only(&self) -> bool {
        self.frame.is_read_only()
    }

    /// Nesting depth of this handle's frame; the root handle is 0.
    pub fn depth(&self) -> usize {
        self.frame.depth()
    }

    pub fn blockchain(&self) -> &dyn Blockchain {
        self.blockchain.as_ref()
    }

    // ── Ledger ──────────────────────────────────────────────────────────

    pub fn get_account(&self, address: &Address) -> Result<Option<Account>, HostError> {
        self.frame.get_account(address)
    }

    pub fn update_account(&self, account: Account) -> Result<(), HostError> {
        self.frame.update_account(account)
    }

    pub fn remove_account(&self, address: &Address) -> Result<(), HostError> {
        self.frame.remove_account(address)
    }

    pub fn get_storage(&self, address: &Address, key: &Word256) -> Result<Word256, HostError> {
        self.frame.get_storage(address, key)
    }

    pub fn set_storage(
        &self,
        address: &Address,
        key: &Word256,
        value: Word256,
    ) -> Result<(), HostError> {
        self.frame.set_storage(address, key, value)
    }

    // ── Events ──────────────────────────────────────────────────────────

    pub fn print(&self, event: PrintEvent) -> Result<(), HostError> {
        self.frame.print(event)
    }

    pub fn log(&self, event: LogEvent) -> Result<(), HostError> {
        self.frame.log(event)
    }

    // ── Permissions and account lifecycle ───────────────────────────────

    pub fn has_permission(&self, address: &Address, permission: Permission) -> Result<bool, HostError> {
        self.permissions.has_permission(address, permission)
    }

    /// Fail with `PermissionDenied` unless `address` holds `permission`.
    pub fn ensure_permission(&self, address: &Address, permission: Permission) -> Result<(), HostError> {
        if self.has_permission(address, permission)? {
            Ok(())
        } else {
            debug!(address = %address_to_hex(address), %permission, "permission denied");
            Err(HostError::permission_denied(address, permission))
        }
    }

    /// Create an empty account at `address` on behalf of `creator`.
    ///
    /// Requires `creator` to hold `CreateAccount`. Fails with
    /// `DuplicateAddress` if the account already exists.
    pub fn create_account(&self, creator: &Address, address: &Address) -> Result<(), HostError> {
        self.ensure_permission(creator, Permission::CreateAccount)?;
        if self.get_account(address)?.is_some() {
            return Err(HostError::duplicate_address(address));
        }
        debug!(
            creator = %address_to_hex(creator),
            address = %address_to_hex(address),
            "creating account"
        );
        self.update_account(Account::new(*address))
    }

    /// Install runtime code on an existing account.
    pub fn init_wasm_code(&self, address: &Address, code: Vec<u8>) -> Result<(), HostError> {
        let mut account = self
            .get_account(address)?
            .ok_or_else(|| HostError::non_existent_account(address))?;
        if account.has_code() {
            return Err(HostError::new(
                ErrorCode::IllegalWrite,
                format!("account {} already has code", address_to_hex(address)),
            ));
        }
        account.wasm_code = code;
        self.update_account(account)
    }

    /// Move `amount` from one account to another. Both must exist.
    pub fn transfer(&self, from: &Address, to: &Address, amount: u64) -> Result<(), HostError> {
        if amount == 0 {
            return Ok(());
        }
        self.ensure_permission(from, Permission::Send)?;
        let mut sender = self
            .get_account(from)?
            .ok_or_else(|| HostError::non_existent_account(from))?;
        sender.subtract_from_balance(amount)?;
        self.update_account(sender)?;

        let mut receiver = self
            .get_account(to)?
            .ok_or_else(|| HostError::non_existent_account(to))?;
        receiver.add_to_balance(amount)?;
        self.update_account(receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::StaticBlockchain;
    use crate::mem_store::{EventCollector, MemLedger};
    use crate::permission::PermissionTable;

    const ALICE: Address = [1u8; 20];
    const BOB: Address = [2u8; 20];

    fn state_with(permissions: PermissionTable) -> (Arc<MemLedger>, State) {
        let ledger = Arc::new(MemLedger::with_accounts([
            Account::with_balance(ALICE, 100),
            Account::new(BOB),
        ]));
        let state = State::new(
            ledger.clone(),
            Arc::new(EventCollector::new()),
            Arc::new(StaticBlockchain::new(5, 1000)),
            Arc::new(permissions),
        );
        (ledger, state)
    }

    #[test]
    fn test_create_account() {
        let (_, state) = state_with(PermissionTable::allow_all());
        let addr = [9u8; 20];
        state.create_account(&ALICE, &addr).unwrap();
        assert_eq!(state.get_account(&addr).unwrap(), Some(Account::new(addr)));

        let err = state.create_account(&ALICE, &addr).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateAddress);
    }

    #[test]
    fn test_create_account_requires_permission() {
        let (_, state) =
            state_with(PermissionTable::allow_all().revoke(ALICE, Permission::CreateAccount));
        let err = state.create_account(&ALICE, &[9u8; 20]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PermissionDenied);
    }

    #[test]
    fn test_transfer() {
        let (ledger, state) = state_with(PermissionTable::allow_all());
        state.transfer(&ALICE, &BOB, 30).unwrap();
        assert_eq!(state.get_account(&ALICE).unwrap().unwrap().balance, 70);
        assert_eq!(state.get_account(&BOB).unwrap().unwrap().balance, 30);

        let err = state.transfer(&BOB, &ALICE, 31).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InsufficientBalance);

        state.sync().unwrap();
        assert_eq!(ledger.account(&BOB).unwrap().balance, 30);
    }

    #[test]
    fn test_init_wasm_code_once() {
        let (_, state) = state_with(PermissionTable::allow_all());
        state.init_wasm_code(&BOB, vec![0, 0x61, 0x73, 0x6d]).unwrap();
        assert!(state.get_account(&BOB).unwrap().unwrap().has_code());
        assert!(state.init_wasm_code(&BOB, vec![1]).is_err());
        assert_eq!(
            state.init_wasm_code(&[7u8; 20], vec![1]).unwrap_err().code(),
            ErrorCode::NonExistentAccount
        );
    }

    #[test]
    fn test_new_frame_isolated_until_sync() {
        let (_, state) = state_with(PermissionTable::allow_all());
        let child = state.new_frame(false);
        child.set_storage(&ALICE, &[1u8; 32], [1u8; 32]).unwrap();
        assert_eq!(state.get_storage(&ALICE, &[1u8; 32]).unwrap(), [0u8; 32]);
        child.sync().unwrap();
        assert_eq!(state.get_storage(&ALICE, &[1u8; 32]).unwrap(), [1u8; 32]);
        assert_eq!(state.depth(), 0);
        assert_eq!(child.depth(), 1);
        assert_eq!(child.new_frame(true).depth(), 2);
    }

    #[test]
    fn test_read_only_frame() {
        let (_, state) = state_with(PermissionTable::allow_all());
        let child = state.new_frame(true);
        assert!(child.is_read_only());
        assert!(child.new_frame(false).is_read_only());
        assert!(child.set_storage(&ALICE, &[1u8; 32], [1u8; 32]).is_err());
    }
}
