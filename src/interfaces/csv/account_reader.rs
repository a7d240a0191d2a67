use crate::application::ledger::LedgerEngine;
use crate::domain::account::Currency;
use crate::error::{LakeError, Result};
use serde::Deserialize;
use std::io::Read;
use tracing::{info, warn};

/// One account to open before the lake starts.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct AccountSeed {
    pub tenant: String,
    pub account: String,
    pub currency: Currency,
    pub balance_check: bool,
}

/// Reads account seeds from a CSV source with the header
/// `tenant,account,currency,balance_check`.
pub struct AccountReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> AccountReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    pub fn seeds(self) -> impl Iterator<Item = Result<AccountSeed>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LakeError::from))
    }
}

/// Opens every seeded account in `engine`.
///
/// Stops at the first unreadable row. Rows naming an account that already
/// exists are skipped. Returns how many accounts were opened.
pub async fn load_accounts<R: Read>(engine: &LedgerEngine, source: R) -> Result<usize> {
    let mut opened = 0;
    for seed in AccountReader::new(source).seeds() {
        let seed = seed?;
        if engine
            .create_account(&seed.tenant, &seed.account, seed.currency, seed.balance_check)
            .await
        {
            opened += 1;
        } else {
            warn!(tenant = %seed.tenant, account = %seed.account, "duplicate account seed skipped");
        }
    }
    info!(opened, "accounts seeded");
    Ok(opened)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "tenant, account, currency, balance_check\nT1, A1, USD, true\nT1, A2, EUR, false";
        let seeds: Vec<Result<AccountSeed>> = AccountReader::new(data.as_bytes()).seeds().collect();

        assert_eq!(seeds.len(), 2);
        let first = seeds[0].as_ref().unwrap();
        assert_eq!(first.tenant, "T1");
        assert_eq!(first.account, "A1");
        assert_eq!(first.currency.as_str(), "USD");
        assert!(first.balance_check);
        assert!(!seeds[1].as_ref().unwrap().balance_check);
    }

    #[test]
    fn test_reader_rejects_bad_currency() {
        let data = "tenant,account,currency,balance_check\nT1,A1,DOLLAR,true";
        let seeds: Vec<Result<AccountSeed>> = AccountReader::new(data.as_bytes()).seeds().collect();
        assert!(matches!(seeds[0], Err(LakeError::Csv(_))));
    }

    #[tokio::test]
    async fn test_load_accounts_skips_duplicates() {
        let engine = LedgerEngine::new();
        let data = "tenant,account,currency,balance_check\nT1,A1,USD,true\nT1,A1,EUR,false\nT2,A1,EUR,false";

        let opened = load_accounts(&engine, data.as_bytes()).await.unwrap();

        assert_eq!(opened, 2);
        let account = engine.account("T1", "A1").await.unwrap();
        assert_eq!(account.currency.as_str(), "USD");
        assert!(account.is_balance_check);
    }

    #[tokio::test]
    async fn test_load_accounts_stops_on_malformed_row() {
        let engine = LedgerEngine::new();
        let data = "tenant,account,currency,balance_check\nT1,A1,USD,maybe";

        assert!(load_accounts(&engine, data.as_bytes()).await.is_err());
        assert!(engine.accounts().await.is_empty());
    }
}
