//! Application layer containing the vault's business logic orchestration.
//!
//! `LedgerEngine` owns every account and applies promise, commit and rollback
//! orders; `Router` sits between the lake and the engine, decoding vault
//! messages and encoding replies.

pub mod ledger;
pub mod router;
