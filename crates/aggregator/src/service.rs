//! AggregationService - fan-out, merge and cache for one logical query

use crate::fallback;
use crate::merge::{reduce_outcomes, ProviderOutcome};
use cache::{cache_key, CacheStats, CacheStore};
use futures::future::join_all;
use providers::{AdapterRegistry, ProviderAdapter};
use shared::{
    CacheConfig, CollectionConfig, CollectionNames, Dataset, HubConfig, HubError, Logger,
    ProviderError, Record, RecordKind, Result,
};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Field searched by condition-scoped settlement queries
const CONDITION_FIELD: &str = "condition";

/// Logical queries the service knows how to aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Articles,
    LawFirms,
    Settlements { condition: Option<String> },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Articles => "articles",
            Operation::LawFirms => "law_firms",
            Operation::Settlements { .. } => "settlements",
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Operation::Articles => RecordKind::Article,
            Operation::LawFirms => RecordKind::LawFirm,
            Operation::Settlements { .. } => RecordKind::Settlement,
        }
    }

    /// Settlement query, ignoring a blank condition
    pub fn settlements(condition: Option<&str>) -> Self {
        Operation::Settlements {
            condition: condition
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        }
    }

    fn condition(&self) -> Option<&str> {
        match self {
            Operation::Settlements { condition } => condition.as_deref(),
            _ => None,
        }
    }

    pub fn cache_key(&self) -> String {
        cache_key(self.name(), &[(CONDITION_FIELD, self.condition())])
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.condition() {
            Some(condition) => write!(f, "{}({})", self.name(), condition),
            None => f.write_str(self.name()),
        }
    }
}

impl FromStr for Operation {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "articles" => Ok(Operation::Articles),
            "law_firms" => Ok(Operation::LawFirms),
            "settlements" => Ok(Operation::Settlements { condition: None }),
            other => Err(HubError::usage(format!("unknown operation '{}'", other))),
        }
    }
}

/// Aggregation Service
///
/// Owns its own cache tier. Provider failures never escape: they are logged
/// and the provider is merged as empty.
pub struct AggregationService {
    registry: AdapterRegistry,
    cache: CacheStore<Dataset>,
    collections: CollectionConfig,
    ttls: CacheConfig,
    provider_timeout: Option<Duration>,
    logger: Arc<dyn Logger>,
}

impl AggregationService {
    pub fn new(registry: AdapterRegistry, config: &HubConfig, logger: Arc<dyn Logger>) -> Self {
        Self {
            registry,
            cache: CacheStore::new(),
            collections: config.collections.clone(),
            ttls: config.cache.clone(),
            provider_timeout: config.provider_timeout(),
            logger,
        }
    }

    /// Builder: use an externally owned cache (shared clock, shared instance)
    pub fn with_cache(mut self, cache: CacheStore<Dataset>) -> Self {
        self.cache = cache;
        self
    }

    /// Builder: bound every provider call
    pub fn with_provider_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub async fn articles(&self) -> Dataset {
        self.execute(&Operation::Articles).await
    }

    pub async fn law_firms(&self) -> Dataset {
        self.execute(&Operation::LawFirms).await
    }

    pub async fn settlements(&self, condition: Option<&str>) -> Dataset {
        self.execute(&Operation::settlements(condition)).await
    }

    /// Run an operation by name.
    ///
    /// Only `settlements` accepts a condition. Unknown names and misplaced
    /// arguments are usage errors.
    pub async fn aggregate(&self, operation: &str, condition: Option<&str>) -> Result<Dataset> {
        let operation = match (operation.parse::<Operation>()?, condition) {
            (Operation::Settlements { .. }, condition) => Operation::settlements(condition),
            (op, Some(arg)) if !arg.trim().is_empty() => {
                return Err(HubError::usage(format!(
                    "operation '{}' does not take a condition",
                    op.name()
                )))
            }
            (op, _) => op,
        };

        Ok(self.execute(&operation).await)
    }

    /// Cached-or-fresh dataset for `operation`; never fails
    pub async fn execute(&self, operation: &Operation) -> Dataset {
        let key = operation.cache_key();
        let ttl = self.ttl_for(operation);

        if let Some(cached) = self.cache.get(&key, ttl) {
            self.logger.debug(&format!("Cache hit: {}", key), None);
            return cached;
        }
        self.logger.debug(&format!("Cache miss: {}", key), None);

        let outcomes = self.fan_out(operation).await;
        let reduction = reduce_outcomes(operation.kind(), outcomes, || {
            self.fallback_for(operation)
        });

        for failure in &reduction.failures {
            let mut meta = HashMap::new();
            meta.insert("provider".to_string(), failure.provider().to_string());
            meta.insert("operation".to_string(), operation.to_string());
            self.logger.warn(&failure.to_string(), Some(&meta));
        }
        if reduction.skipped > 0 {
            self.logger.debug(
                &format!(
                    "{}: skipped {} records without an identifying field",
                    operation, reduction.skipped
                ),
                None,
            );
        }
        if reduction.used_fallback {
            self.logger.warn(
                &format!(
                    "{}: no provider data ({} failed), serving {} fallback records",
                    operation,
                    reduction.failures.len(),
                    reduction.dataset.len()
                ),
                None,
            );
        }

        self.cache.set(key, reduction.dataset.clone());
        reduction.dataset
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        self.logger.info("Aggregation cache cleared", None);
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn ttl_for(&self, operation: &Operation) -> Duration {
        let ms = match operation {
            Operation::Articles => self.ttls.articles_ttl_ms,
            Operation::LawFirms => self.ttls.law_firms_ttl_ms,
            Operation::Settlements { .. } => self.ttls.settlements_ttl_ms,
        };
        Duration::from_millis(ms)
    }

    fn collections_for(&self, operation: &Operation) -> &CollectionNames {
        match operation {
            Operation::Articles => &self.collections.articles,
            Operation::LawFirms => &self.collections.law_firms,
            Operation::Settlements { .. } => &self.collections.settlements,
        }
    }

    fn fallback_for(&self, operation: &Operation) -> Dataset {
        match operation {
            Operation::Settlements { condition } => fallback::settlements_for(condition.as_deref()),
            other => fallback::dataset(other.kind()),
        }
    }

    /// Call every adapter concurrently; outcomes come back in registry order
    /// whatever order the calls complete in.
    async fn fan_out(&self, operation: &Operation) -> Vec<ProviderOutcome> {
        let names = self.collections_for(operation);

        let calls = self.registry.adapters().iter().map(move |adapter| async move {
            let result = match names.for_source(adapter.source()) {
                Some(collection) => self.call(adapter.as_ref(), collection, operation).await,
                None => Ok(Vec::new()),
            };
            ProviderOutcome::new(adapter.name(), result)
        });

        join_all(calls).await
    }

    async fn call(
        &self,
        adapter: &dyn ProviderAdapter,
        collection: &str,
        operation: &Operation,
    ) -> std::result::Result<Vec<Record>, ProviderError> {
        let request = async {
            match operation.condition() {
                Some(condition) => adapter
                    .search(collection, condition, Some(CONDITION_FIELD), None)
                    .await
                    .map(|found| found.results),
                None => adapter.fetch_collection(collection).await,
            }
        };

        let Some(limit) = self.provider_timeout else {
            return request.await;
        };

        match tokio::time::timeout(limit, request).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                provider: adapter.name().to_string(),
                after_ms: limit.as_millis() as u64,
            }),
        }
    }
}
