//! Request lifecycle store for hookrelay.
//!
//! Owns every [`RequestRecord`](hookrelay_core::RequestRecord) from creation until the
//! expiry sweep reaps it, and lets callers wait for a record to reach a terminal state.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]
#![allow(clippy::panic, reason = "Duplicate ids are an invariant violation")]

mod id;
mod store;
mod sweeper;
mod waiter;

pub use id::{IdGenerator, SequentialGenerator, UuidGenerator};
pub use store::{LifecycleStore, StoreStats};
pub use sweeper::{spawn_sweeper, SweepHandle};
pub use waiter::CompletionWaiter;
