//! Vault domain: accounts, the orders they accept and the reply codes they
//! produce.

pub mod account;
pub mod event;
pub mod ports;
pub mod status;
