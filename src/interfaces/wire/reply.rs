use super::frame::{LEDGER_PREFIX, VAULT_PREFIX};
use crate::domain::event::ReplyRoute;
use crate::domain::status::StatusToken;

/// Builds the answer to a vault message, swapping sender and target units.
///
/// `LedgerUnit/<sender> VaultUnit/<tenant> <request> <account> <status>`
pub fn encode_reply(route: &ReplyRoute, status: &StatusToken) -> String {
    format!(
        "{LEDGER_PREFIX}{} {VAULT_PREFIX}{} {} {} {status}",
        route.sender, route.tenant, route.request_id, route.account
    )
}
