//! SheetsAdapter - Google Sheets values API

use crate::adapter::ProviderAdapter;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use shared::{normalize_field_name, FieldValue, Logger, ProviderError, Record, SheetsConfig, Source};
use std::sync::Arc;
use std::time::Duration;

pub const SHEETS_PROVIDER: &str = "sheets";

/// Columns whose cells hold `;`-separated lists
const LIST_FIELDS: &[&str] = &[
    "symptoms",
    "causes",
    "treatments",
    "legalOptions",
    "specialties",
    "notableSettlements",
];

/// Body of `GET /v4/spreadsheets/{id}/values/{range}`
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Adapter over one spreadsheet; every configured sheet is a collection
pub struct SheetsAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    spreadsheet_id: String,
    sheets: Vec<String>,
    logger: Arc<dyn Logger>,
}

impl SheetsAdapter {
    /// Build from configuration; fails when a credential is missing
    pub fn from_config(config: &SheetsConfig, logger: Arc<dyn Logger>) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::ConfigurationMissing {
                provider: SHEETS_PROVIDER.to_string(),
                key: "apiKey".to_string(),
            });
        }
        if config.spreadsheet_id.trim().is_empty() {
            return Err(ProviderError::ConfigurationMissing {
                provider: SHEETS_PROVIDER.to_string(),
                key: "spreadsheetId".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ProviderError::unavailable(SHEETS_PROVIDER, e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            sheets: config.sheets.clone(),
            logger,
        })
    }

    /// Configured sheet name matching `collection` (case-insensitive)
    fn resolve_sheet(&self, collection: &str) -> Result<&str, ProviderError> {
        self.sheets
            .iter()
            .find(|s| s.eq_ignore_ascii_case(collection.trim()))
            .map(|s| s.as_str())
            .ok_or_else(|| ProviderError::UnknownCollection {
                provider: SHEETS_PROVIDER.to_string(),
                collection: collection.to_string(),
            })
    }

    fn values_url(&self, sheet: &str) -> Result<Url, ProviderError> {
        let invalid = || ProviderError::unavailable(SHEETS_PROVIDER, format!("invalid base url '{}'", self.base_url));

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", sheet]);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn fetch_sheet(&self, sheet: &str) -> Result<Vec<Record>, ProviderError> {
        let url = self.values_url(sheet)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::unavailable(SHEETS_PROVIDER, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::unavailable(
                SHEETS_PROVIDER,
                format!("sheet '{}' returned HTTP {}", sheet, status),
            ));
        }

        let body: ValueRange = response.json().await.map_err(|e| {
            ProviderError::unavailable(SHEETS_PROVIDER, format!("invalid response body: {}", e))
        })?;

        Ok(rows_to_records(sheet, &body.values))
    }
}

#[async_trait]
impl ProviderAdapter for SheetsAdapter {
    fn name(&self) -> &str {
        SHEETS_PROVIDER
    }

    fn source(&self) -> Source {
        Source::Spreadsheet
    }

    async fn fetch_collection(&self, collection: &str) -> Result<Vec<Record>, ProviderError> {
        let sheet = match self.resolve_sheet(collection) {
            Ok(sheet) => sheet.to_string(),
            Err(e) => {
                self.logger.warn(&e.to_string(), None);
                return Ok(Vec::new());
            }
        };

        self.fetch_sheet(&sheet).await
    }
}

/// Convert a header row plus data rows into records.
///
/// Ids are `sheets_<first word of sheet name>_<row number>`, counting data
/// rows from 1. Blank rows are skipped but still consume a row number so ids
/// stay tied to the sheet position.
pub fn rows_to_records(sheet: &str, rows: &[Vec<Value>]) -> Vec<Record> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };

    let columns: Vec<String> = header
        .iter()
        .map(|cell| cell_text(cell).map(|h| normalize_field_name(&h)).unwrap_or_default())
        .collect();
    let prefix = id_prefix(sheet);

    data.iter()
        .enumerate()
        .filter(|(_, row)| row.iter().any(|cell| cell_text(cell).is_some()))
        .map(|(index, row)| {
            let mut record = Record::new(format!("sheets_{}_{}", prefix, index + 1), Source::Spreadsheet);
            for (column, cell) in columns.iter().zip(row.iter()) {
                if column.is_empty() {
                    continue;
                }
                if let Some(value) = cell_value(column, cell) {
                    record.insert(column.clone(), value);
                }
            }
            record
        })
        .collect()
}

fn id_prefix(sheet: &str) -> String {
    sheet
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty())
        .unwrap_or("sheet")
        .to_lowercase()
}

fn cell_text(cell: &Value) -> Option<String> {
    let text = match cell {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn cell_value(column: &str, cell: &Value) -> Option<FieldValue> {
    if let Value::Number(n) = cell {
        return n.as_f64().map(FieldValue::Number);
    }

    let text = cell_text(cell)?;
    if LIST_FIELDS.contains(&column) {
        Some(FieldValue::List(FieldValue::Text(text).as_list()))
    } else {
        Some(FieldValue::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use shared::NullLogger;

    fn rows(value: Value) -> Vec<Vec<Value>> {
        serde_json::from_value(value).unwrap()
    }

    fn config() -> SheetsConfig {
        SheetsConfig {
            api_key: "key-123".to_string(),
            spreadsheet_id: "sheet-1".to_string(),
            ..Default::default()
        }
    }

    // ============== Row Mapping Tests ==============

    #[test]
    fn test_rows_to_records() {
        let values = rows(json!([
            ["Title", "Description", "Symptoms", "Settlement Range"],
            ["Mesothelioma", "Asbestos cancer", "Chest pain; Shortness of breath", "$1M - $2M"],
            ["", "", ""],
            ["Roundup", "Glyphosate"]
        ]));

        let records = rows_to_records("Medical Conditions", &values);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.id(), "sheets_medical_1");
        assert_eq!(first.source(), Source::Spreadsheet);
        assert_eq!(first.text("title"), Some("Mesothelioma".to_string()));
        assert_eq!(first.text("settlementRange"), Some("$1M - $2M".to_string()));
        assert_eq!(
            first.get("symptoms"),
            Some(&FieldValue::List(vec![
                "Chest pain".to_string(),
                "Shortness of breath".to_string()
            ]))
        );

        // blank row 2 is skipped but row numbering follows the sheet
        assert_eq!(records[1].id(), "sheets_medical_3");
        assert!(records[1].get("symptoms").is_none());
    }

    #[test]
    fn test_rows_to_records_empty_sheet() {
        assert!(rows_to_records("Law Firms", &[]).is_empty());
        assert!(rows_to_records("Law Firms", &rows(json!([["Name"]]))).is_empty());
    }

    #[test]
    fn test_numeric_cells_stay_numeric() {
        let values = rows(json!([["Condition", "Total Cases"], ["Hernia Mesh", 420]]));
        let records = rows_to_records("Settlements", &values);
        assert_eq!(records[0].id(), "sheets_settlements_1");
        assert_eq!(records[0].number("totalCases"), Some(420.0));
    }

    // ============== Construction Tests ==============

    #[test]
    fn test_missing_api_key() {
        let config = SheetsConfig {
            api_key: " ".to_string(),
            ..config()
        };
        let err = SheetsAdapter::from_config(&config, Arc::new(NullLogger)).err().unwrap();
        assert_eq!(
            err,
            ProviderError::ConfigurationMissing {
                provider: "sheets".to_string(),
                key: "apiKey".to_string()
            }
        );
    }

    #[test]
    fn test_missing_spreadsheet_id() {
        let config = SheetsConfig {
            spreadsheet_id: String::new(),
            ..config()
        };
        let err = SheetsAdapter::from_config(&config, Arc::new(NullLogger)).err().unwrap();
        assert!(err.to_string().contains("spreadsheetId"));
    }

    #[test]
    fn test_values_url_encodes_sheet_name() {
        let adapter = SheetsAdapter::from_config(&config(), Arc::new(NullLogger)).unwrap();
        let url = adapter.values_url("Medical Conditions").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-1/values/Medical%20Conditions?key=key-123"
        );
    }

    #[test]
    fn test_resolve_sheet_is_case_insensitive() {
        let adapter = SheetsAdapter::from_config(&config(), Arc::new(NullLogger)).unwrap();
        assert_eq!(adapter.resolve_sheet("law firms").unwrap(), "Law Firms");
        assert!(matches!(
            adapter.resolve_sheet("Unknown"),
            Err(ProviderError::UnknownCollection { .. })
        ));
    }
}
