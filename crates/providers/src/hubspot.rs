//! HubSpotAdapter - HubSpot CMS and CRM
//!
//! Three collection kinds are supported, all read with a private-app bearer
//! token and paged through `paging.next.after`:
//!
//! - blog posts: `GET /cms/v3/blogs/posts`
//! - HubDB rows: `GET /cms/v3/hubdb/tables/{table}/rows`
//! - CRM objects: `GET /crm/v3/objects/{objectType}`

use crate::adapter::ProviderAdapter;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value};
use shared::{
    normalize_field_name, FieldValue, HubSpotCollection, HubSpotConfig, Logger, ProviderError,
    Record, Source,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub const HUBSPOT_PROVIDER: &str = "hubspot";

/// Upper bound on pages followed for one collection
const MAX_PAGES: usize = 20;
const PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    next: Option<NextPage>,
}

#[derive(Debug, Deserialize)]
struct NextPage {
    after: String,
}

/// Adapter over one HubSpot portal
pub struct HubSpotAdapter {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    collections: BTreeMap<String, HubSpotCollection>,
    logger: Arc<dyn Logger>,
}

impl HubSpotAdapter {
    /// Build from configuration; fails when the access token is missing
    pub fn from_config(config: &HubSpotConfig, logger: Arc<dyn Logger>) -> Result<Self, ProviderError> {
        if config.access_token.trim().is_empty() {
            return Err(ProviderError::ConfigurationMissing {
                provider: HUBSPOT_PROVIDER.to_string(),
                key: "accessToken".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ProviderError::unavailable(HUBSPOT_PROVIDER, e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            access_token: config.access_token.clone(),
            collections: config.collections.clone(),
            logger,
        })
    }

    fn resolve(&self, collection: &str) -> Result<&HubSpotCollection, ProviderError> {
        let wanted = collection.trim();
        self.collections
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|(_, kind)| kind)
            .ok_or_else(|| ProviderError::UnknownCollection {
                provider: HUBSPOT_PROVIDER.to_string(),
                collection: collection.to_string(),
            })
    }

    fn collection_url(&self, kind: &HubSpotCollection) -> Result<Url, ProviderError> {
        let invalid =
            || ProviderError::unavailable(HUBSPOT_PROVIDER, format!("invalid base url '{}'", self.base_url));

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| invalid())?;
            segments.pop_if_empty();
            match kind {
                HubSpotCollection::BlogPosts => {
                    segments.extend(["cms", "v3", "blogs", "posts"]);
                }
                HubSpotCollection::HubDbTable { table } => {
                    segments.extend(["cms", "v3", "hubdb", "tables", table.as_str(), "rows"]);
                }
                HubSpotCollection::CrmObject { object_type, .. } => {
                    segments.extend(["crm", "v3", "objects", object_type.as_str()]);
                }
            }
        }

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", PAGE_SIZE);
            if let HubSpotCollection::CrmObject { properties, .. } = kind {
                if !properties.is_empty() {
                    query.append_pair("properties", &properties.join(","));
                }
            }
        }

        Ok(url)
    }

    async fn fetch_page(&self, mut url: Url, after: Option<&str>) -> Result<Page, ProviderError> {
        if let Some(after) = after {
            url.query_pairs_mut().append_pair("after", after);
        }

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ProviderError::unavailable(HUBSPOT_PROVIDER, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::unavailable(
                HUBSPOT_PROVIDER,
                format!("HTTP {}", status),
            ));
        }

        response.json().await.map_err(|e| {
            ProviderError::unavailable(HUBSPOT_PROVIDER, format!("invalid response body: {}", e))
        })
    }

    async fn fetch_all(&self, kind: &HubSpotCollection) -> Result<Vec<Record>, ProviderError> {
        let url = self.collection_url(kind)?;
        let mut records = Vec::new();
        let mut after: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let page = self.fetch_page(url.clone(), after.as_deref()).await?;
            records.extend(page.results.iter().filter_map(|item| map_result(kind, item)));

            match page.paging.and_then(|p| p.next) {
                Some(next) => after = Some(next.after),
                None => return Ok(records),
            }
        }

        self.logger.warn(
            &format!("HubSpot paging stopped after {} pages", MAX_PAGES),
            None,
        );
        Ok(records)
    }
}

#[async_trait]
impl ProviderAdapter for HubSpotAdapter {
    fn name(&self) -> &str {
        HUBSPOT_PROVIDER
    }

    fn source(&self) -> Source {
        Source::Crm
    }

    async fn fetch_collection(&self, collection: &str) -> Result<Vec<Record>, ProviderError> {
        let kind = match self.resolve(collection) {
            Ok(kind) => kind.clone(),
            Err(e) => {
                self.logger.warn(&e.to_string(), None);
                return Ok(Vec::new());
            }
        };

        self.fetch_all(&kind).await
    }
}

/// Map one API result object into a record; `None` when it has no id
fn map_result(kind: &HubSpotCollection, item: &Value) -> Option<Record> {
    let id = match item.get("id")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let mut record = Record::new(format!("hubspot_{}", id), Source::Crm);

    match kind {
        HubSpotCollection::BlogPosts => map_blog_post(&mut record, item),
        HubSpotCollection::HubDbTable { .. } => {
            if let Some(values) = item.get("values").and_then(Value::as_object) {
                insert_all(&mut record, values);
            }
        }
        HubSpotCollection::CrmObject { .. } => {
            if let Some(properties) = item.get("properties").and_then(Value::as_object) {
                insert_all(&mut record, properties);
            }
        }
    }

    Some(record)
}

fn map_blog_post(record: &mut Record, post: &Value) {
    let text = |key: &str| {
        post.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    if let Some(title) = text("htmlTitle").or_else(|| text("name")) {
        record.insert("title", title);
    }
    if let Some(description) = text("metaDescription") {
        record.insert("description", description);
    }
    if let Some(summary) = text("postSummary") {
        record.insert("overview", summary);
    }
    if let Some(body) = text("postBody") {
        record.insert("body", body);
    }
    if let Some(slug) = text("slug") {
        record.insert("slug", slug);
    }
    if let Some(url) = text("url") {
        record.insert("url", url);
    }
}

fn insert_all(record: &mut Record, values: &Map<String, Value>) {
    for (key, value) in values {
        let field = normalize_field_name(key);
        if field.is_empty() {
            continue;
        }
        if let Some(value) = json_to_field(value) {
            record.insert(field, value);
        }
    }
}

/// Coerce a HubDB/CRM property value into a field value.
///
/// Select options arrive as `{ "name": .. }` objects and multi-selects as
/// arrays of them; CRM properties are always strings.
fn json_to_field(value: &Value) -> Option<FieldValue> {
    match value {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(FieldValue::Text(s.trim().to_string())),
        Value::Number(n) => n.as_f64().map(FieldValue::Number),
        Value::Bool(b) => Some(FieldValue::Text(b.to_string())),
        Value::Array(items) => {
            let list: Vec<String> = items.iter().filter_map(option_label).collect();
            (!list.is_empty()).then_some(FieldValue::List(list))
        }
        Value::Object(_) => option_label(value).map(FieldValue::Text),
        Value::Null => None,
    }
}

fn option_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => ["label", "name", "value"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}
