//! Permission checking.

use std::collections::{BTreeMap, BTreeSet};

use ewasm_primitives::{Address, Permission};

use crate::error::HostError;

/// Decides whether an account holds a capability.
pub trait PermissionChecker: Send + Sync {
    fn has_permission(&self, address: &Address, permission: Permission) -> Result<bool, HostError>;
}

/// Grants every permission to every account.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionChecker for AllowAll {
    fn has_permission(&self, _address: &Address, _permission: Permission) -> Result<bool, HostError> {
        Ok(true)
    }
}

/// Per-account permission table with a global default set.
///
/// An account's explicit entry replaces the defaults entirely.
#[derive(Debug, Clone, Default)]
pub struct PermissionTable {
    defaults: BTreeSet<Permission>,
    accounts: BTreeMap<Address, BTreeSet<Permission>>,
}

impl PermissionTable {
    /// A table where nothing is permitted until granted.
    pub fn deny_all() -> Self {
        Self::default()
    }

    /// A table whose defaults include every permission.
    pub fn allow_all() -> Self {
        Self {
            defaults: [
                Permission::Call,
                Permission::Send,
                Permission::CreateContract,
                Permission::CreateAccount,
            ]
            .into_iter()
            .collect(),
            accounts: BTreeMap::new(),
        }
    }

    /// Set the exact permissions of one account.
    pub fn set(mut self, address: Address, permissions: &[Permission]) -> Self {
        self.accounts
            .insert(address, permissions.iter().copied().collect());
        self
    }

    /// Remove one permission from an account, starting from the defaults
    /// if the account has no explicit entry.
    pub fn revoke(mut self, address: Address, permission: Permission) -> Self {
        let defaults = self.defaults.clone();
        self.accounts
            .entry(address)
            .or_insert(defaults)
            .remove(&permission);
        self
    }
}

impl PermissionChecker for PermissionTable {
    fn has_permission(&self, address: &Address, permission: Permission) -> Result<bool, HostError> {
        let set = self.accounts.get(address).unwrap_or(&self.defaults);
        Ok(set.contains(&permission))
    }
}
