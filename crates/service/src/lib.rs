//! Service layer for hookrelay
//!
//! Centralizes the relay flow between the MCP/CLI front ends and the
//! lifecycle store and webhook adapter.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod error;
mod relay_service;
mod validation;

pub use error::ServiceError;
pub use relay_service::{DeliveryReport, RelayService};
pub use validation::validate_message;
