use crate::domain::account::Account;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct AccountRecord<'a> {
    tenant: &'a str,
    account: &'a str,
    currency: &'a str,
    balance_check: bool,
    balance: String,
    blocking: String,
    /// Promises still waiting for commit or rollback.
    pending: usize,
}

impl<'a> From<&'a Account> for AccountRecord<'a> {
    fn from(account: &'a Account) -> Self {
        Self {
            tenant: &account.tenant,
            account: &account.name,
            currency: account.currency.as_str(),
            balance_check: account.is_balance_check,
            balance: account.balance.to_string(),
            blocking: account.blocking.to_string(),
            pending: account.promised.len(),
        }
    }
}

/// Writes account snapshots as CSV.
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_accounts<'a>(&mut self, accounts: impl IntoIterator<Item = &'a Account>) -> Result<()> {
        for account in accounts {
            self.writer.serialize(AccountRecord::from(account))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
