//! Mock ledger node: a lake message bus emulator wired to an in-memory vault
//! that settles promise, commit and rollback orders.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod logging;
