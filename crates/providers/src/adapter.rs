//! ProviderAdapter - the port every external data source implements

use async_trait::async_trait;
use serde::Serialize;
use shared::{ProviderError, Record, Source};

/// Matches of a search, capped at the requested limit
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResult {
    pub results: Vec<Record>,
    /// Number of matches before the limit was applied
    pub total: usize,
}

/// Provider Adapter Trait
///
/// Talks to exactly one external source and returns normalized records.
/// Implementations never retry and never let raw transport errors escape;
/// failures come back as [`ProviderError`]. Unknown collection names yield
/// an empty result plus a warning.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Short provider name used in logs and errors
    fn name(&self) -> &str;

    /// Provenance stamped on every record this adapter produces
    fn source(&self) -> Source;

    /// Retrieve every row/entry of a named collection
    async fn fetch_collection(&self, collection: &str) -> Result<Vec<Record>, ProviderError>;

    /// Case-insensitive substring search within one field or across all fields
    async fn search(
        &self,
        collection: &str,
        query: &str,
        field: Option<&str>,
        limit: Option<usize>,
    ) -> Result<SearchResult, ProviderError> {
        let records = self.fetch_collection(collection).await?;
        Ok(filter_records(records, query, field, limit))
    }
}

/// Filter records by case-insensitive substring match.
///
/// `total` always reports the full match count so callers can show
/// "showing N of M".
pub fn filter_records(
    records: Vec<Record>,
    query: &str,
    field: Option<&str>,
    limit: Option<usize>,
) -> SearchResult {
    let matches: Vec<Record> = records
        .into_iter()
        .filter(|r| r.matches(query, field))
        .collect();
    let total = matches.len();

    let results = match limit {
        Some(limit) => matches.into_iter().take(limit).collect(),
        None => matches,
    };

    SearchResult { results, total }
}
