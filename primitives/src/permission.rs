//! Capabilities checked by the permission subsystem.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A capability an account may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Invoke another contract.
    Call,
    /// Transfer value.
    Send,
    /// Deploy a contract via `create`.
    CreateContract,
    /// Bring a new account into existence.
    CreateAccount,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Call => "call",
            Self::Send => "send",
            Self::CreateContract => "create_contract",
            Self::CreateAccount => "create_account",
        };
        f.write_str(name)
    }
}
