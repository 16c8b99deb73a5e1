//! AdapterRegistry - builds the configured adapters in priority order

use crate::adapter::ProviderAdapter;
use crate::hubspot::HubSpotAdapter;
use crate::sheets::SheetsAdapter;
use shared::{HubConfig, Logger, ProviderError};
use std::sync::Arc;

/// Ordered set of live provider adapters.
///
/// Order is merge priority: on duplicate records the earlier adapter wins.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn ProviderAdapter>>,
    skipped: Vec<ProviderError>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the spreadsheet adapter, then the CRM adapter.
    ///
    /// An adapter whose credentials are missing is logged and left out; the
    /// others are still registered.
    pub fn from_config(config: &HubConfig, logger: Arc<dyn Logger>) -> Self {
        let mut registry = Self::new();

        match SheetsAdapter::from_config(&config.sheets, logger.clone()) {
            Ok(adapter) => registry.register(Arc::new(adapter)),
            Err(e) => registry.skip(e, logger.as_ref()),
        }

        match HubSpotAdapter::from_config(&config.hubspot, logger.clone()) {
            Ok(adapter) => registry.register(Arc::new(adapter)),
            Err(e) => registry.skip(e, logger.as_ref()),
        }

        logger.info(
            &format!(
                "Provider adapters ready: [{}]",
                registry.names().join(", ")
            ),
            None,
        );

        registry
    }

    /// Builder: append an adapter at the lowest priority
    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.register(adapter);
        self
    }

    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.push(adapter);
    }

    fn skip(&mut self, error: ProviderError, logger: &dyn Logger) {
        logger.error(&format!("Provider disabled: {}", error), None);
        self.skipped.push(error);
    }

    /// Adapters in priority order
    pub fn adapters(&self) -> &[Arc<dyn ProviderAdapter>] {
        &self.adapters
    }

    /// Configuration errors of adapters that could not be built
    pub fn skipped(&self) -> &[ProviderError] {
        &self.skipped
    }

    pub fn names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
