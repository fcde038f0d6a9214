//! Core types and configuration for PTR trade extraction.
//!
//! This crate provides shared types used across all other crates:
//! - Trade record types (kind, action, ticker, dates)
//! - Configuration structures
//! - Common error types
//! - Collaborator ports (document source, filing sink, notifier)
//! - The filer registry entry

pub mod amount;
pub mod config;
pub mod error;
pub mod filer;
pub mod ports;
pub mod types;

pub use amount::{compact_amount, AmountBounds};
pub use config::Config;
pub use error::{Error, Result};
pub use filer::{validate_filer_name, Chamber, Filer, FilerStatus};
pub use ports::{DocumentSource, Filing, FilingSink, TextDocument, TradeNotifier};
pub use types::*;
