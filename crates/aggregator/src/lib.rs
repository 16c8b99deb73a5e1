//! # Injury Hub Aggregator
//!
//! Resolves one logical query (articles, law firms, settlement data) by
//! querying every registered provider in parallel, merging and deduplicating
//! the results in provider priority order, and substituting the built-in
//! fallback dataset when nothing usable comes back.

pub mod fallback;
mod merge;
mod service;

pub use merge::{
    dedupe_articles, dedupe_law_firms, dedupe_settlements, reduce_outcomes, ProviderOutcome,
    Reduction,
};
pub use service::{AggregationService, Operation};
