//! Core domain layer for socksniffer.
//!
//! Holds the normalized [`models::Record`] type, the column-mapping and
//! platform configuration, timezone handling and temporal feature
//! derivation, post text cleaning, CLI settings, and the shared error type.

pub mod cleaning;
pub mod error;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{Result, SnifferError};
