//! Core types for hookrelay
//!
//! This crate contains domain types shared across all other crates.

mod config;
pub mod constants;
mod env_config;
mod error;
mod record;

pub use config::*;
pub use env_config::*;
pub use error::*;
pub use record::*;
