//! Configuration types for Injury Hub

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

pub const ENV_SHEETS_API_KEY: &str = "GOOGLE_SHEETS_API_KEY";
pub const ENV_SHEETS_SPREADSHEET_ID: &str = "GOOGLE_SHEETS_SPREADSHEET_ID";
pub const ENV_HUBSPOT_ACCESS_TOKEN: &str = "HUBSPOT_ACCESS_TOKEN";

/// Top-level configuration file (`injury-hub.json` / `injury-hub.yaml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HubConfig {
    /// Spreadsheet provider
    pub sheets: SheetsConfig,

    /// CRM/CMS provider
    pub hubspot: HubSpotConfig,

    /// Which provider collection backs each logical query
    pub collections: CollectionConfig,

    /// Cache time-to-live settings
    pub cache: CacheConfig,

    /// Upper bound for a single provider call; unbounded when absent
    pub provider_timeout_ms: Option<u64>,

    /// HTTP server settings
    pub server: ServerConfig,
}

impl HubConfig {
    /// Load configuration from a JSON or YAML file (picked by extension)
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let config: Self = match extension.as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&std::fs::read_to_string(path)?)?,
            Some("json") => serde_json::from_str(&std::fs::read_to_string(path)?)?,
            _ => {
                return Err(crate::HubError::Config(format!(
                    "unsupported config format '{}', expected .json, .yaml or .yml",
                    path.display()
                )))
            }
        };
        Ok(config)
    }

    /// Override credentials from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Override credentials from an arbitrary variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_blank(ENV_SHEETS_API_KEY) {
            self.sheets.api_key = key;
        }
        if let Some(id) = non_blank(ENV_SHEETS_SPREADSHEET_ID) {
            self.sheets.spreadsheet_id = id;
        }
        if let Some(token) = non_blank(ENV_HUBSPOT_ACCESS_TOKEN) {
            self.hubspot.access_token = token;
        }
    }

    pub fn provider_timeout(&self) -> Option<Duration> {
        self.provider_timeout_ms.map(Duration::from_millis)
    }
}

/// Google Sheets provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetsConfig {
    pub api_key: String,
    pub spreadsheet_id: String,
    pub base_url: String,
    /// Sheet (tab) names this spreadsheet is known to contain
    pub sheets: Vec<String>,
    pub timeout_ms: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            spreadsheet_id: String::new(),
            base_url: "https://sheets.googleapis.com".to_string(),
            sheets: vec![
                "Medical Conditions".to_string(),
                "Law Firms".to_string(),
                "Settlements".to_string(),
            ],
            timeout_ms: 10_000,
        }
    }
}

/// HubSpot provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HubSpotConfig {
    pub access_token: String,
    pub base_url: String,
    /// Collection name -> where it lives in HubSpot
    pub collections: BTreeMap<String, HubSpotCollection>,
    pub timeout_ms: u64,
}

impl Default for HubSpotConfig {
    fn default() -> Self {
        let mut collections = BTreeMap::new();
        collections.insert("blog_posts".to_string(), HubSpotCollection::BlogPosts);
        collections.insert(
            "law_firms".to_string(),
            HubSpotCollection::HubDbTable {
                table: "law_firms".to_string(),
            },
        );
        collections.insert(
            "settlements".to_string(),
            HubSpotCollection::HubDbTable {
                table: "settlements".to_string(),
            },
        );

        Self {
            access_token: String::new(),
            base_url: "https://api.hubapi.com".to_string(),
            collections,
            timeout_ms: 10_000,
        }
    }
}

/// Where a named HubSpot collection is read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HubSpotCollection {
    /// CMS blog posts
    BlogPosts,
    /// Rows of a HubDB table
    #[serde(rename_all = "camelCase")]
    HubDbTable { table: String },
    /// CRM objects of one type (companies, deals, custom objects)
    #[serde(rename_all = "camelCase")]
    CrmObject {
        object_type: String,
        #[serde(default)]
        properties: Vec<String>,
    },
}

/// Provider collection names for one logical query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionNames {
    pub spreadsheet: String,
    pub crm: String,
}

impl CollectionNames {
    pub fn new(spreadsheet: impl Into<String>, crm: impl Into<String>) -> Self {
        Self {
            spreadsheet: spreadsheet.into(),
            crm: crm.into(),
        }
    }

    /// Collection name for a provider of the given source
    pub fn for_source(&self, source: crate::Source) -> Option<&str> {
        match source {
            crate::Source::Spreadsheet => Some(&self.spreadsheet),
            crate::Source::Crm => Some(&self.crm),
            crate::Source::Fallback => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionConfig {
    pub articles: CollectionNames,
    pub law_firms: CollectionNames,
    pub settlements: CollectionNames,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            articles: CollectionNames::new("Medical Conditions", "blog_posts"),
            law_firms: CollectionNames::new("Law Firms", "law_firms"),
            settlements: CollectionNames::new("Settlements", "settlements"),
        }
    }
}

/// Cache time-to-live settings, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheConfig {
    /// Query façade tier
    pub query_ttl_ms: u64,
    pub articles_ttl_ms: u64,
    pub law_firms_ttl_ms: u64,
    pub settlements_ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            query_ttl_ms: 5 * 60 * 1000,
            articles_ttl_ms: 30 * 60 * 1000,
            law_firms_ttl_ms: 60 * 60 * 1000,
            settlements_ttl_ms: 2 * 60 * 60 * 1000,
        }
    }
}

impl CacheConfig {
    pub fn query_ttl(&self) -> Duration {
        Duration::from_millis(self.query_ttl_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Logger interface for dependency injection
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str, meta: Option<&HashMap<String, String>>);
    fn info(&self, message: &str, meta: Option<&HashMap<String, String>>);
    fn warn(&self, message: &str, meta: Option<&HashMap<String, String>>);
    fn error(&self, message: &str, meta: Option<&HashMap<String, String>>);
}

/// Logger that forwards to `tracing`
#[derive(Debug, Clone, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str, meta: Option<&HashMap<String, String>>) {
        tracing::debug!(?meta, "{}", message);
    }

    fn info(&self, message: &str, meta: Option<&HashMap<String, String>>) {
        tracing::info!(?meta, "{}", message);
    }

    fn warn(&self, message: &str, meta: Option<&HashMap<String, String>>) {
        tracing::warn!(?meta, "{}", message);
    }

    fn error(&self, message: &str, meta: Option<&HashMap<String, String>>) {
        tracing::error!(?meta, "{}", message);
    }
}

/// No-op logger for testing
#[derive(Debug, Clone, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn debug(&self, _message: &str, _meta: Option<&HashMap<String, String>>) {}
    fn info(&self, _message: &str, _meta: Option<&HashMap<String, String>>) {}
    fn warn(&self, _message: &str, _meta: Option<&HashMap<String, String>>) {}
    fn error(&self, _message: &str, _meta: Option<&HashMap<String, String>>) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Logger that keeps every message in memory, for assertions in tests
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: LogLevel, message: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push((level, message.to_string()));
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Whether some message at `level` contains `needle`
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }
}

impl Logger for RecordingLogger {
    fn debug(&self, message: &str, _meta: Option<&HashMap<String, String>>) {
        self.push(LogLevel::Debug, message);
    }

    fn info(&self, message: &str, _meta: Option<&HashMap<String, String>>) {
        self.push(LogLevel::Info, message);
    }

    fn warn(&self, message: &str, _meta: Option<&HashMap<String, String>>) {
        self.push(LogLevel::Warn, message);
    }

    fn error(&self, message: &str, _meta: Option<&HashMap<String, String>>) {
        self.push(LogLevel::Error, message);
    }
}
