//! In-Memory Provider
//!
//! A provider whose collections live in process memory. Used for offline
//! runs and for exercising the aggregation pipeline: it can be told to fail,
//! to answer slowly, and it counts how often it was called.

use crate::adapter::ProviderAdapter;
use async_trait::async_trait;
use shared::{Logger, NullLogger, ProviderError, Record, Source};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// In-memory provider adapter
pub struct InMemoryAdapter {
    name: String,
    source: Source,
    collections: RwLock<HashMap<String, Vec<Record>>>,
    failure: RwLock<Option<String>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    logger: Arc<dyn Logger>,
}

impl InMemoryAdapter {
    pub fn new(name: impl Into<String>, source: Source) -> Self {
        Self {
            name: name.into(),
            source,
            collections: RwLock::new(HashMap::new()),
            failure: RwLock::new(None),
            delay: None,
            calls: AtomicUsize::new(0),
            logger: Arc::new(NullLogger),
        }
    }

    /// Builder: report unknown collections through `logger`
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Builder: serve `records` for `collection`
    pub fn with_collection(self, collection: impl Into<String>, records: Vec<Record>) -> Self {
        self.set_collection(collection, records);
        self
    }

    /// Builder: wait this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Builder: fail every call with `message`
    pub fn failing(self, message: impl Into<String>) -> Self {
        self.set_failure(Some(message.into()));
        self
    }

    /// Replace the records served for `collection`
    pub fn set_collection(&self, collection: impl Into<String>, records: Vec<Record>) {
        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        collections.insert(collection.into(), records);
    }

    /// Start (`Some`) or stop (`None`) failing
    pub fn set_failure(&self, message: Option<String>) {
        let mut failure = self.failure.write().unwrap_or_else(|e| e.into_inner());
        *failure = message;
    }

    /// Number of `fetch_collection` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for InMemoryAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> Source {
        self.source
    }

    async fn fetch_collection(&self, collection: &str) -> Result<Vec<Record>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self
            .failure
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(message) = failure {
            return Err(ProviderError::unavailable(self.name.clone(), message));
        }

        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        match collections.get(collection) {
            Some(records) => Ok(records.clone()),
            None => {
                let unknown = ProviderError::UnknownCollection {
                    provider: self.name.clone(),
                    collection: collection.to_string(),
                };
                self.logger.warn(&unknown.to_string(), None);
                Ok(Vec::new())
            }
        }
    }
}
