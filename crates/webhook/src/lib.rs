//! Webhook dispatch for hookrelay.
//!
//! Performs the single outbound POST for a relayed message and turns whatever
//! happened into a terminal [`RecordUpdate`](hookrelay_core::RecordUpdate).

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod client;
pub mod error;

pub use client::{classify, Dispatcher, WebhookClient};
pub use error::WebhookError;
