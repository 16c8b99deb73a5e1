//! # Injury Hub Providers
//!
//! Adapters that turn one external data source into normalized [`Record`]s.
//!
//! ## Components
//!
//! - `ProviderAdapter` - The port every source implements
//! - `SheetsAdapter` - Google Sheets values API
//! - `HubSpotAdapter` - HubSpot CMS blog, HubDB and CRM objects
//! - `InMemoryAdapter` - Configurable in-process source
//! - `AdapterRegistry` - Builds the configured adapters in priority order
//!
//! [`Record`]: shared::Record

mod adapter;
mod hubspot;
mod in_memory;
mod registry;
mod sheets;

pub use adapter::{filter_records, ProviderAdapter, SearchResult};
pub use hubspot::{HubSpotAdapter, HUBSPOT_PROVIDER};
pub use in_memory::InMemoryAdapter;
pub use registry::AdapterRegistry;
pub use sheets::{rows_to_records, SheetsAdapter, SHEETS_PROVIDER};
