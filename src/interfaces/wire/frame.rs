//! Decoding of vault messages.
//!
//! A vault message is eight single-space separated tokens:
//!
//! ```text
//! VaultUnit/<tenant> LedgerUnit/<sender> <account> <request> <kind> <transaction> <amount> <currency>
//! ```
//!
//! Only frames starting with the exact `VaultUnit/` prefix are routed to the
//! vault. Inside the grammar the unit prefixes match case-insensitively.
//! Identifiers are 1 to 100 non-whitespace characters, the amount is
//! `-?\d{1,100}(\.\d{1,100})?` and the currency is exactly three ASCII letters.

use crate::domain::account::{Amount, Currency};
use crate::domain::event::{AccountEvent, Operation, ReplyRoute};
use thiserror::Error;

pub const VAULT_PREFIX: &str = "VaultUnit/";
pub const LEDGER_PREFIX: &str = "LedgerUnit/";

const MAX_TOKEN: usize = 100;
const TOKENS: usize = 8;

#[derive(Error, Debug, PartialEq)]
pub enum FrameError {
    #[error("frame is not addressed to a vault")]
    Unaddressed,
    #[error("malformed {field}: {reason}")]
    Malformed { field: &'static str, reason: String },
    /// Well formed frame whose order code the vault does not know.
    #[error("unknown order code {code:?}")]
    UnknownOperation { route: ReplyRoute, code: String },
}

impl FrameError {
    fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        FrameError::Malformed {
            field,
            reason: reason.into(),
        }
    }
}

/// Whether the frame starts with the vault routing prefix, matched exactly.
pub fn is_vault_addressed(frame: &str) -> bool {
    frame.starts_with(VAULT_PREFIX)
}

pub fn parse_frame(frame: &str) -> Result<AccountEvent, FrameError> {
    if strip_prefix_ignore_case(frame, VAULT_PREFIX).is_none() {
        return Err(FrameError::Unaddressed);
    }

    let tokens: Vec<&str> = frame.split(' ').collect();
    if tokens.len() != TOKENS {
        return Err(FrameError::malformed(
            "frame",
            format!("expected {TOKENS} tokens, got {}", tokens.len()),
        ));
    }

    let tenant = unit(tokens[0], VAULT_PREFIX, "tenant")?;
    let sender = unit(tokens[1], LEDGER_PREFIX, "sender")?;
    let account = identifier(tokens[2], "account")?;
    let request_id = identifier(tokens[3], "request")?;
    let kind = identifier(tokens[4], "kind")?;
    let transaction = identifier(tokens[5], "transaction")?;
    let amount = amount(tokens[6])?;
    let currency = currency(tokens[7])?;

    let route = ReplyRoute {
        tenant: tenant.to_string(),
        sender: sender.to_string(),
        account: account.to_string(),
        request_id: request_id.to_string(),
    };

    let operation = match kind.parse::<Operation>() {
        Ok(operation) => operation,
        Err(unknown) => {
            return Err(FrameError::UnknownOperation {
                route,
                code: unknown.0,
            });
        }
    };

    Ok(AccountEvent {
        route,
        operation,
        transaction: transaction.to_string(),
        amount,
        currency,
    })
}

fn strip_prefix_ignore_case<'a>(token: &'a str, prefix: &str) -> Option<&'a str> {
    let head = token.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&token[prefix.len()..])
    } else {
        None
    }
}

fn unit<'a>(token: &'a str, prefix: &str, field: &'static str) -> Result<&'a str, FrameError> {
    let name = strip_prefix_ignore_case(token, prefix)
        .ok_or_else(|| FrameError::malformed(field, format!("missing {prefix} prefix")))?;
    identifier(name, field)
}

fn identifier<'a>(token: &'a str, field: &'static str) -> Result<&'a str, FrameError> {
    let len = token.chars().count();
    if len == 0 || len > MAX_TOKEN {
        return Err(FrameError::malformed(
            field,
            format!("length {len} outside 1..={MAX_TOKEN}"),
        ));
    }
    if token.chars().any(char::is_whitespace) {
        return Err(FrameError::malformed(field, "contains whitespace"));
    }
    Ok(token)
}

fn digits(part: &str) -> bool {
    (1..=MAX_TOKEN).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
}

fn amount(token: &str) -> Result<Amount, FrameError> {
    let unsigned = token.strip_prefix('-').unwrap_or(token);
    let valid = match unsigned.split_once('.') {
        Some((whole, fraction)) => digits(whole) && digits(fraction),
        None => digits(unsigned),
    };
    if !valid {
        return Err(FrameError::malformed("amount", format!("{token:?} is not a decimal")));
    }
    token
        .parse::<Amount>()
        .map_err(|e| FrameError::malformed("amount", e.to_string()))
}

fn currency(token: &str) -> Result<Currency, FrameError> {
    token
        .parse::<Currency>()
        .map_err(|e| FrameError::malformed("currency", e.to_string()))
}
