//! Data ingestion layer for socksniffer.
//!
//! Discovers and reads delimited social-media exports, maps their columns
//! onto the canonical record layout and accumulates them in a [`Corpus`].

pub mod corpus;
pub mod reader;

pub use corpus::{Corpus, LoadOptions, LoadOutcome};
pub use sniffer_core as core;
