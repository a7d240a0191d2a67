use crate::domain::account::{Account, Amount, Currency, PromiseOutcome};
use crate::domain::event::Operation;
use crate::domain::status::StatusToken;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

type Tenants = HashMap<String, HashMap<String, Account>>;

/// In-memory vault answering promise, commit and rollback orders.
///
/// `LedgerEngine` exclusively owns every account. Each operation holds the
/// engine-wide write lock for its whole duration, so it is atomic with respect
/// to concurrent callers. Business failures never surface as errors; they are
/// reported through the returned [`StatusToken`].
#[derive(Default)]
pub struct LedgerEngine {
    tenants: RwLock<Tenants>,
}

impl LedgerEngine {
    /// Creates an engine with no tenants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an account with zero balance.
    ///
    /// Returns `false`, leaving the existing account untouched, when the
    /// account already exists.
    pub async fn create_account(
        &self,
        tenant: &str,
        account: &str,
        currency: Currency,
        is_balance_check: bool,
    ) -> bool {
        let mut tenants = self.tenants.write().await;
        let accounts = tenants.entry(tenant.to_string()).or_default();
        if accounts.contains_key(account) {
            return false;
        }
        accounts.insert(
            account.to_string(),
            Account::new(tenant, account, currency, is_balance_check),
        );
        debug!(tenant, account, "account created");
        true
    }

    pub async fn promise(
        &self,
        tenant: &str,
        account: &str,
        transaction: &str,
        amount: Amount,
        currency: &Currency,
    ) -> StatusToken {
        let mut tenants = self.tenants.write().await;
        let Some(target) = lookup(&mut tenants, tenant, account) else {
            return StatusToken::Error;
        };
        match target.promise(transaction, amount, currency) {
            Ok(PromiseOutcome::Accepted) => {
                debug!(tenant, account, transaction, balance = %target.balance, "promise accepted");
                StatusToken::PromiseAccepted
            }
            Ok(PromiseOutcome::Replayed) => StatusToken::PromiseAccepted,
            Err(reason) => {
                debug!(tenant, account, transaction, %reason, "promise rejected");
                StatusToken::PromiseRejected(reason)
            }
        }
    }

    /// Settles a promise. Unknown transactions are acknowledged without change.
    pub async fn commit(&self, tenant: &str, account: &str, transaction: &str) -> StatusToken {
        let mut tenants = self.tenants.write().await;
        let Some(target) = lookup(&mut tenants, tenant, account) else {
            return StatusToken::Error;
        };
        if target.commit(transaction) {
            debug!(tenant, account, transaction, "promise committed");
        }
        StatusToken::CommitAccepted
    }

    /// Reverses a promise. Unknown accounts and transactions are acknowledged
    /// without change.
    pub async fn rollback(&self, tenant: &str, account: &str, transaction: &str) -> StatusToken {
        let mut tenants = self.tenants.write().await;
        if let Some(target) = lookup(&mut tenants, tenant, account)
            && target.rollback(transaction)
        {
            debug!(tenant, account, transaction, "promise rolled back");
        }
        StatusToken::RollbackAccepted
    }

    /// Applies one order to one account.
    ///
    /// `amount` and `currency` only matter for promises.
    pub async fn process_account_event(
        &self,
        tenant: &str,
        account: &str,
        operation: Operation,
        transaction: &str,
        amount: Amount,
        currency: &Currency,
    ) -> StatusToken {
        match operation {
            Operation::Promise => {
                self.promise(tenant, account, transaction, amount, currency)
                    .await
            }
            Operation::Commit => self.commit(tenant, account, transaction).await,
            Operation::Rollback => self.rollback(tenant, account, transaction).await,
        }
    }

    /// Snapshot of a single account.
    pub async fn account(&self, tenant: &str, account: &str) -> Option<Account> {
        let tenants = self.tenants.read().await;
        tenants.get(tenant)?.get(account).cloned()
    }

    /// Snapshot of every account ordered by tenant, then account name.
    pub async fn accounts(&self) -> Vec<Account> {
        let tenants = self.tenants.read().await;
        let mut all: Vec<Account> = tenants
            .values()
            .flat_map(|accounts| accounts.values().cloned())
            .collect();
        all.sort_by(|a, b| (&a.tenant, &a.name).cmp(&(&b.tenant, &b.name)));
        all
    }

    /// Forgets every tenant and account.
    pub async fn reset(&self) {
        self.tenants.write().await.clear();
    }
}

fn lookup<'a>(tenants: &'a mut Tenants, tenant: &str, account: &str) -> Option<&'a mut Account> {
    tenants.get_mut(tenant)?.get_mut(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{Balance, Rejection};

    fn usd() -> Currency {
        "USD".parse().unwrap()
    }

    fn amount(value: &str) -> Amount {
        value.parse().unwrap()
    }

    fn balance(value: &str) -> Balance {
        value.parse().unwrap()
    }

    #[tokio::test]
    async fn test_create_account_exactly_once() {
        let engine = LedgerEngine::new();
        assert!(engine.create_account("T1", "A1", usd(), true).await);
        engine
            .promise("T1", "A1", "X1", amount("5"), &usd())
            .await;

        assert!(
            !engine
                .create_account("T1", "A1", "EUR".parse().unwrap(), false)
                .await
        );

        let account = engine.account("T1", "A1").await.unwrap();
        assert_eq!(account.currency, usd());
        assert!(account.is_balance_check);
        assert_eq!(account.balance, balance("5"));
    }

    #[tokio::test]
    async fn test_same_account_name_in_other_tenant() {
        let engine = LedgerEngine::new();
        assert!(engine.create_account("T1", "A1", usd(), true).await);
        assert!(engine.create_account("T2", "A1", usd(), true).await);
        assert_eq!(engine.accounts().await.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let engine = LedgerEngine::new();
        engine.create_account("T1", "A1", usd(), true).await;

        assert_eq!(
            engine
                .promise("T1", "missing", "X1", amount("1"), &usd())
                .await,
            StatusToken::Error
        );
        assert_eq!(
            engine
                .promise("T9", "A1", "X1", amount("1"), &usd())
                .await,
            StatusToken::Error
        );
        assert_eq!(
            engine.commit("T9", "A1", "X1").await,
            StatusToken::Error
        );
        assert_eq!(
            engine.rollback("T9", "A1", "X1").await,
            StatusToken::RollbackAccepted
        );
    }

    #[tokio::test]
    async fn test_settlement_scenario() {
        let engine = LedgerEngine::new();
        engine.create_account("T1", "A1", usd(), true).await;

        let status = engine
            .promise("T1", "A1", "X1", amount("10.00"), &usd())
            .await;
        assert_eq!(status, StatusToken::PromiseAccepted);
        let account = engine.account("T1", "A1").await.unwrap();
        assert_eq!(account.balance, balance("10.00"));

        assert_eq!(
            engine.commit("T1", "A1", "X1").await,
            StatusToken::CommitAccepted
        );

        let status = engine
            .promise("T1", "A1", "X2", amount("-20.00"), &usd())
            .await;
        assert_eq!(
            status,
            StatusToken::PromiseRejected(Rejection::InsufficientFunds)
        );
        let account = engine.account("T1", "A1").await.unwrap();
        assert_eq!(account.balance, balance("10.00"));
        assert_eq!(account.blocking, Balance::zero());
        assert!(account.promised.is_empty());
    }

    #[tokio::test]
    async fn test_currency_mismatch_does_not_mutate() {
        let engine = LedgerEngine::new();
        engine.create_account("T1", "A1", usd(), false).await;
        let before = engine.account("T1", "A1").await.unwrap();

        let status = engine
            .promise("T1", "A1", "X1", amount("1"), &"usd".parse().unwrap())
            .await;
        assert_eq!(
            status,
            StatusToken::PromiseRejected(Rejection::CurrencyMismatch)
        );
        assert_eq!(engine.account("T1", "A1").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_rollback_restores_balance_and_is_idempotent() {
        let engine = LedgerEngine::new();
        engine.create_account("T1", "A1", usd(), true).await;
        engine
            .promise("T1", "A1", "X1", amount("7.5"), &usd())
            .await;

        assert_eq!(
            engine.rollback("T1", "A1", "X1").await,
            StatusToken::RollbackAccepted
        );
        let after_first = engine.account("T1", "A1").await.unwrap();
        assert_eq!(after_first.balance, Balance::zero());
        assert_eq!(after_first.blocking, Balance::zero());

        assert_eq!(
            engine.rollback("T1", "A1", "X1").await,
            StatusToken::RollbackAccepted
        );
        assert_eq!(engine.account("T1", "A1").await.unwrap(), after_first);
    }

    #[tokio::test]
    async fn test_commit_unknown_transaction_reports_success() {
        let engine = LedgerEngine::new();
        engine.create_account("T1", "A1", usd(), true).await;
        let before = engine.account("T1", "A1").await.unwrap();

        assert_eq!(
            engine.commit("T1", "A1", "nope").await,
            StatusToken::CommitAccepted
        );
        assert_eq!(engine.account("T1", "A1").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_process_account_event_dispatch() {
        let engine = LedgerEngine::new();
        engine.create_account("T1", "A1", usd(), true).await;

        let status = engine
            .process_account_event("T1", "A1", Operation::Promise, "X1", amount("2"), &usd())
            .await;
        assert_eq!(status, StatusToken::PromiseAccepted);

        let status = engine
            .process_account_event("T1", "A1", Operation::Rollback, "X1", amount("0"), &usd())
            .await;
        assert_eq!(status, StatusToken::RollbackAccepted);

        let status = engine
            .process_account_event("T1", "A1", Operation::Commit, "X1", amount("0"), &usd())
            .await;
        assert_eq!(status, StatusToken::CommitAccepted);

        assert_eq!(
            engine.account("T1", "A1").await.unwrap().balance,
            Balance::zero()
        );
    }

    #[tokio::test]
    async fn test_reset_drops_everything() {
        let engine = LedgerEngine::new();
        engine.create_account("T1", "A1", usd(), true).await;
        engine.reset().await;
        assert!(engine.account("T1", "A1").await.is_none());
        assert!(engine.create_account("T1", "A1", usd(), true).await);
    }
}
