use super::account::{Amount, Currency};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Order carried by a vault message.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operation {
    Promise,
    Commit,
    Rollback,
}

impl Operation {
    /// Wire code of the order.
    pub fn code(&self) -> &'static str {
        match self {
            Operation::Promise => "NP",
            Operation::Commit => "NC",
            Operation::Rollback => "NR",
        }
    }
}

/// Order code that is not part of the vault protocol.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[error("unknown order code {0:?}")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NP" => Ok(Operation::Promise),
            "NC" => Ok(Operation::Commit),
            "NR" => Ok(Operation::Rollback),
            other => Err(UnknownOperation(other.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Addressing needed to answer a vault message.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ReplyRoute {
    pub tenant: String,
    pub sender: String,
    pub account: String,
    pub request_id: String,
}

/// Decoded vault message addressed to one account.
#[derive(Debug, PartialEq, Clone)]
pub struct AccountEvent {
    pub route: ReplyRoute,
    pub operation: Operation,
    pub transaction: String,
    pub amount: Amount,
    pub currency: Currency,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_codes() {
        for op in [Operation::Promise, Operation::Commit, Operation::Rollback] {
            assert_eq!(op.code().parse::<Operation>(), Ok(op));
        }
        assert_eq!(
            "np".parse::<Operation>(),
            Err(UnknownOperation("np".to_string()))
        );
        assert_eq!(
            "XX".parse::<Operation>().unwrap_err().to_string(),
            "unknown order code \"XX\""
        );
    }
}
