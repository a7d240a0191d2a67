use crate::error::LakeError;
use bigdecimal::{BigDecimal, Signed};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, AddAssign, SubAssign};
use std::str::FromStr;

/// Settled or reserved monetary value held by an account.
///
/// This is a wrapper around `bigdecimal::BigDecimal`: balance arithmetic is
/// exact at any magnitude and never goes through binary floating point.
#[derive(Debug, Clone, PartialEq, PartialOrd, Default)]
pub struct Balance(pub BigDecimal);

/// Signed amount carried by a promise.
///
/// Positive amounts credit the account, negative amounts debit it.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub struct Amount(BigDecimal);

impl Amount {
    pub fn new(value: BigDecimal) -> Self {
        Self(value)
    }
}

impl From<&Amount> for Balance {
    fn from(amount: &Amount) -> Self {
        Self(amount.0.clone())
    }
}

impl FromStr for Amount {
    type Err = LakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_decimal(s).map(Self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_plain_string())
    }
}

impl Balance {
    pub fn new(amount: BigDecimal) -> Self {
        Self(amount)
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Strictly below zero. Negative zero is not negative.
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }
}

impl FromStr for Balance {
    type Err = LakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_decimal(s).map(Self)
    }
}

fn parse_decimal(s: &str) -> Result<BigDecimal, LakeError> {
    BigDecimal::from_str(s)
        .map_err(|e| LakeError::Validation(format!("{s:?} is not a decimal: {e}")))
}

/// Plain notation, never scientific.
impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_plain_string())
    }
}

impl Add<&Amount> for &Balance {
    type Output = Balance;
    fn add(self, rhs: &Amount) -> Self::Output {
        Balance(&self.0 + &rhs.0)
    }
}

impl AddAssign<&Amount> for Balance {
    fn add_assign(&mut self, rhs: &Amount) {
        self.0 += &rhs.0;
    }
}

impl SubAssign<&Amount> for Balance {
    fn sub_assign(&mut self, rhs: &Amount) {
        self.0 -= &rhs.0;
    }
}

/// Three letter currency code, kept exactly as it was given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Currency {
    type Err = LakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 3 && s.bytes().all(|b| b.is_ascii_alphabetic()) {
            Ok(Self(s.to_string()))
        } else {
            Err(LakeError::Validation(format!(
                "currency {s:?} must be exactly 3 letters"
            )))
        }
    }
}

impl TryFrom<String> for Currency {
    type Error = LakeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a promise was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    CurrencyMismatch,
    InsufficientFunds,
}

/// Result of applying a promise to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseOutcome {
    Accepted,
    /// The transaction was already promised; nothing was reapplied.
    Replayed,
}

/// State of a single vault account.
///
/// `balance` carries every accepted promise that has not been rolled back,
/// `blocking` carries the reservation that settlement still has to release and
/// `promised` the amounts of promises awaiting commit or rollback.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub tenant: String,
    pub name: String,
    pub currency: Currency,
    pub is_balance_check: bool,
    pub balance: Balance,
    pub blocking: Balance,
    pub promised: HashMap<String, Amount>,
}

impl Account {
    pub fn new(
        tenant: impl Into<String>,
        name: impl Into<String>,
        currency: Currency,
        is_balance_check: bool,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            name: name.into(),
            currency,
            is_balance_check,
            balance: Balance::zero(),
            blocking: Balance::zero(),
            promised: HashMap::new(),
        }
    }

    /// Reserves `amount` under `transaction`.
    pub fn promise(
        &mut self,
        transaction: &str,
        amount: Amount,
        currency: &Currency,
    ) -> Result<PromiseOutcome, Rejection> {
        if self.promised.contains_key(transaction) {
            return Ok(PromiseOutcome::Replayed);
        }
        if *currency != self.currency {
            return Err(Rejection::CurrencyMismatch);
        }

        if self.is_balance_check && (&self.balance + &amount).is_negative() {
            return Err(Rejection::InsufficientFunds);
        }

        self.balance += &amount;
        self.blocking -= &amount;
        self.promised.insert(transaction.to_string(), amount);
        Ok(PromiseOutcome::Accepted)
    }

    /// Releases the reservation of `transaction`. Returns whether one existed.
    pub fn commit(&mut self, transaction: &str) -> bool {
        match self.promised.remove(transaction) {
            Some(amount) => {
                self.blocking += &amount;
                true
            }
            None => false,
        }
    }

    /// Reverses the promise of `transaction`. Returns whether one existed.
    pub fn rollback(&mut self, transaction: &str) -> bool {
        match self.promised.remove(transaction) {
            Some(amount) => {
                self.balance -= &amount;
                self.blocking += &amount;
                true
            }
            None => false,
        }
    }
}
