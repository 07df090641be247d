//! Shared domain primitives for the inventory catalog application.
//!
//! This crate owns request/response contracts, ingest parsing, resource
//! naming and site rendering. It intentionally excludes AWS SDK and Lambda
//! runtime concerns so both the handlers and the deploy tool can share it.

pub mod contact;
pub mod contract;
pub mod ingest;
pub mod naming;
pub mod site;
