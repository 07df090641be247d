//! Lambda handlers backing the inventory catalog and contact form.
//!
//! Handlers are plain functions over the port traits in `adapters`, so the
//! request/response logic is testable without the Lambda runtime. The AWS
//! implementations of those ports live in `adapters::aws`; the binaries in
//! `src/bin` only wire environment configuration to a handler.

pub mod adapters;
pub mod handlers;
