//! Reply codes sent back to ledger units.
//!
//! The wire text of every variant is part of the protocol contract; changing
//! it or the condition that produces it breaks every ledger unit talking to
//! the vault.

use super::account::Rejection;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusToken {
    /// `EE`: unknown account or unsupported order.
    Error,
    /// `P1`
    PromiseAccepted,
    /// `P2 <reason>`
    PromiseRejected(Rejection),
    /// `C1`
    CommitAccepted,
    /// `R1`
    RollbackAccepted,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::CurrencyMismatch => f.write_str("CURRENCY_MISMATCH"),
            Rejection::InsufficientFunds => f.write_str("INSUFFICIENT_FUNDS"),
        }
    }
}

impl fmt::Display for StatusToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusToken::Error => f.write_str("EE"),
            StatusToken::PromiseAccepted => f.write_str("P1"),
            StatusToken::PromiseRejected(reason) => write!(f, "P2 {reason}"),
            StatusToken::CommitAccepted => f.write_str("C1"),
            StatusToken::RollbackAccepted => f.write_str("R1"),
        }
    }
}
