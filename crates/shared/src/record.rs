//! Record types for Injury Hub
//!
//! Providers hand back generic [`Record`]s keyed by normalized field names.
//! The aggregation tier turns them into one of the typed variants
//! ([`Article`], [`LawFirm`], [`SettlementRecord`]) and carries them around
//! inside a [`Dataset`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Provenance of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Spreadsheet,
    Crm,
    Fallback,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Spreadsheet => "spreadsheet",
            Source::Crm => "crm",
            Source::Fallback => "fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Source::Fallback)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field value as delivered by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Text rendition; empty strings count as absent
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            FieldValue::Text(s) => s.trim().to_string(),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::List(items) => items.join(", "),
        };

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// List rendition. Text is split on `;`, `|` and newlines.
    pub fn as_list(&self) -> Vec<String> {
        match self {
            FieldValue::List(items) => items
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            FieldValue::Text(s) => split_list(s),
            FieldValue::Number(_) => self.as_text().into_iter().collect(),
        }
    }

    /// Numeric rendition, tolerating `$` and thousands separators in text
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => {
                let cleaned: String = s
                    .trim()
                    .chars()
                    .filter(|c| !matches!(c, '$' | ',' | ' '))
                    .collect();
                cleaned.parse().ok()
            }
            FieldValue::List(_) => None,
        }
    }

    /// Case-insensitive substring match; `needle` must already be lowercase
    pub fn contains_lowercase(&self, needle: &str) -> bool {
        match self {
            FieldValue::List(items) => items.iter().any(|i| i.to_lowercase().contains(needle)),
            other => other
                .as_text()
                .map(|t| t.to_lowercase().contains(needle))
                .unwrap_or(false),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        FieldValue::List(value.into_iter().map(String::from).collect())
    }
}

fn split_list(text: &str) -> Vec<String> {
    text.split(|c| matches!(c, ';' | '|' | '\n'))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Generic normalized row returned by a provider adapter.
///
/// `id` and `source` are fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: String,
    source: Source,
    #[serde(default)]
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: impl Into<String>, source: Source) -> Self {
        Self {
            id: id.into(),
            source,
            fields: BTreeMap::new(),
        }
    }

    /// Builder: add a field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(FieldValue::as_text)
    }

    /// First non-empty text among several candidate field names
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.text(k))
    }

    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key).map(FieldValue::as_list).unwrap_or_default()
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FieldValue::as_number)
    }

    /// Case-insensitive substring match within one field, or across all fields
    pub fn matches(&self, query: &str, field: Option<&str>) -> bool {
        let needle = query.trim().to_lowercase();
        match field {
            Some(field) => self
                .get(field)
                .map(|v| v.contains_lowercase(&needle))
                .unwrap_or(false),
            None => self.fields.values().any(|v| v.contains_lowercase(&needle)),
        }
    }
}

/// Normalize a column header or property name to camelCase.
///
/// `"Settlement Range"` becomes `settlementRange`; names that are already a
/// single camelCase word are left as they are apart from the first letter.
pub fn normalize_field_name(name: &str) -> String {
    let words: Vec<&str> = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    match words.as_slice() {
        [] => String::new(),
        [single] => lower_first(single),
        [first, rest @ ..] => {
            let mut out = first.to_lowercase();
            for word in rest {
                let mut chars = word.chars();
                if let Some(c) = chars.next() {
                    out.extend(c.to_uppercase());
                    out.push_str(&chars.as_str().to_lowercase());
                }
            }
            out
        }
    }
}

fn lower_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn slug_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static slug regex"))
}

/// Deterministic URL slug for a title: lowercase, runs of anything other than
/// `[a-z0-9]` collapsed to one hyphen, no leading or trailing hyphen.
pub fn create_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    slug_separator()
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Key used to decide whether two titles (or firm names) are duplicates
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Kind of typed record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Article,
    LawFirm,
    Settlement,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Article => "article",
            RecordKind::LawFirm => "law_firm",
            RecordKind::Settlement => "settlement",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Article body sections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleContent {
    pub overview: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub causes: Vec<String>,
    #[serde(default)]
    pub treatments: Vec<String>,
    #[serde(default)]
    pub legal_options: Vec<String>,
    #[serde(default)]
    pub settlements: String,
}

/// Injury / condition article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub source: Source,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub category: String,
    pub content: ArticleContent,
}

impl Article {
    /// Build from a normalized record; `None` when the record has no title
    pub fn from_record(record: &Record) -> Option<Self> {
        let title = record.first_text(&["title", "name", "condition"])?;
        let description = record
            .first_text(&["description", "summary", "metaDescription"])
            .unwrap_or_default();
        let overview = record
            .first_text(&["overview", "content", "body"])
            .unwrap_or_else(|| description.clone());

        Some(Self {
            id: record.id().to_string(),
            source: record.source(),
            slug: create_slug(&title),
            category: record
                .text("category")
                .unwrap_or_else(|| "General".to_string()),
            content: ArticleContent {
                overview,
                symptoms: record.list("symptoms"),
                causes: record.list("causes"),
                treatments: record.list("treatments"),
                legal_options: record.list("legalOptions"),
                settlements: record
                    .first_text(&["settlements", "settlementInfo"])
                    .unwrap_or_default(),
            },
            title,
            description,
        })
    }

    /// Whether the title, slug or description mentions `needle` (case-insensitive)
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        let slug_needle = create_slug(&needle);
        self.title.to_lowercase().contains(&needle)
            || (!slug_needle.is_empty() && self.slug.contains(&slug_needle))
            || self.description.to_lowercase().contains(&needle)
    }
}

/// Law firm directory entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawFirm {
    pub id: String,
    pub source: Source,
    pub name: String,
    pub location: String,
    pub phone: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub experience: String,
    pub success_rate: String,
    #[serde(default)]
    pub notable_settlements: Vec<String>,
}

impl LawFirm {
    /// Build from a normalized record; `None` when the record has no firm name
    pub fn from_record(record: &Record) -> Option<Self> {
        let name = record.first_text(&["name", "firmName", "firm"])?;
        Some(Self {
            id: record.id().to_string(),
            source: record.source(),
            name,
            location: record
                .first_text(&["location", "city", "state"])
                .unwrap_or_default(),
            phone: record.text("phone").unwrap_or_default(),
            specialties: record.list("specialties"),
            experience: record.text("experience").unwrap_or_default(),
            success_rate: record.text("successRate").unwrap_or_default(),
            notable_settlements: record.list("notableSettlements"),
        })
    }

    pub fn has_specialty(&self, specialty: &str) -> bool {
        let needle = specialty.trim().to_lowercase();
        self.specialties
            .iter()
            .any(|s| s.to_lowercase().contains(&needle))
    }

    pub fn is_located_in(&self, location: &str) -> bool {
        self.location
            .to_lowercase()
            .contains(&location.trim().to_lowercase())
    }
}

/// Settlement statistics for one condition in one state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRecord {
    pub id: String,
    pub source: Source,
    pub condition: String,
    pub state: String,
    pub settlement_range: Option<String>,
    pub average_settlement: Option<String>,
    pub total_cases: Option<u32>,
    pub year: Option<i32>,
}

impl SettlementRecord {
    /// Build from a normalized record; `None` when the record has no condition
    pub fn from_record(record: &Record) -> Option<Self> {
        let condition = record.first_text(&["condition", "title", "name"])?;
        Some(Self {
            id: record.id().to_string(),
            source: record.source(),
            condition,
            state: record.text("state").unwrap_or_default(),
            settlement_range: record.first_text(&["settlementRange", "range"]),
            average_settlement: record.text("averageSettlement"),
            total_cases: record
                .number("totalCases")
                .filter(|n| *n >= 0.0)
                .map(|n| n as u32),
            year: record.number("year").map(|n| n as i32),
        })
    }

    /// A record with a settlement range beats one without
    pub fn is_complete(&self) -> bool {
        self.settlement_range
            .as_deref()
            .map(|r| !r.trim().is_empty())
            .unwrap_or(false)
    }

    /// Case-normalized `(condition, state)` grouping key
    pub fn group_key(&self) -> (String, String) {
        (normalize_title(&self.condition), normalize_title(&self.state))
    }

    pub fn matches_condition(&self, condition: &str) -> bool {
        let needle = condition.trim().to_lowercase();
        let own = self.condition.to_lowercase();
        own.contains(&needle) || (!own.is_empty() && needle.contains(&own))
    }

    pub fn matches_state(&self, state: &str) -> bool {
        self.state.to_lowercase() == state.trim().to_lowercase()
    }
}

/// Typed result set of one logical query; the value kept in every cache tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "records", rename_all = "snake_case")]
pub enum Dataset {
    Articles(Vec<Article>),
    LawFirms(Vec<LawFirm>),
    Settlements(Vec<SettlementRecord>),
}

impl Dataset {
    /// Convert generic records into the typed variant, skipping records
    /// that lack their identifying field
    pub fn from_records(kind: RecordKind, records: &[Record]) -> Self {
        match kind {
            RecordKind::Article => {
                Dataset::Articles(records.iter().filter_map(Article::from_record).collect())
            }
            RecordKind::LawFirm => {
                Dataset::LawFirms(records.iter().filter_map(LawFirm::from_record).collect())
            }
            RecordKind::Settlement => Dataset::Settlements(
                records
                    .iter()
                    .filter_map(SettlementRecord::from_record)
                    .collect(),
            ),
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Dataset::Articles(_) => RecordKind::Article,
            Dataset::LawFirms(_) => RecordKind::LawFirm,
            Dataset::Settlements(_) => RecordKind::Settlement,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Dataset::Articles(v) => v.len(),
            Dataset::LawFirms(v) => v.len(),
            Dataset::Settlements(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Provenance of every record, in order
    pub fn sources(&self) -> Vec<Source> {
        match self {
            Dataset::Articles(v) => v.iter().map(|r| r.source).collect(),
            Dataset::LawFirms(v) => v.iter().map(|r| r.source).collect(),
            Dataset::Settlements(v) => v.iter().map(|r| r.source).collect(),
        }
    }

    /// Non-empty and made up entirely of fallback records
    pub fn is_fallback(&self) -> bool {
        let sources = self.sources();
        !sources.is_empty() && sources.iter().all(Source::is_fallback)
    }

    pub fn into_articles(self) -> Vec<Article> {
        match self {
            Dataset::Articles(v) => v,
            _ => Vec::new(),
        }
    }

    pub fn into_law_firms(self) -> Vec<LawFirm> {
        match self {
            Dataset::LawFirms(v) => v,
            _ => Vec::new(),
        }
    }

    pub fn into_settlements(self) -> Vec<SettlementRecord> {
        match self {
            Dataset::Settlements(v) => v,
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ============== Slug Tests ==============

    #[test]
    fn test_create_slug() {
        assert_eq!(create_slug("3M Combat Arms Earplugs!"), "3m-combat-arms-earplugs");
        assert_eq!(create_slug("Mesothelioma Guide"), "mesothelioma-guide");
        assert_eq!(create_slug("  --Roundup / Weed-Killer--  "), "roundup-weed-killer");
        assert_eq!(create_slug("!!!"), "");
    }

    #[test]
    fn test_same_title_same_slug() {
        assert_eq!(
            create_slug("Camp Lejeune Water"),
            create_slug("camp lejeune   water")
        );
    }

    // ============== Field Tests ==============

    #[test]
    fn test_normalize_field_name() {
        assert_eq!(normalize_field_name("Settlement Range"), "settlementRange");
        assert_eq!(normalize_field_name("Legal Options"), "legalOptions");
        assert_eq!(normalize_field_name("Success Rate (%)"), "successRate");
        assert_eq!(normalize_field_name("successRate"), "successRate");
        assert_eq!(normalize_field_name("Title"), "title");
        assert_eq!(normalize_field_name("   "), "");
    }

    #[test]
    fn test_field_value_coercion() {
        assert_eq!(FieldValue::from("  x ").as_text(), Some("x".to_string()));
        assert_eq!(FieldValue::from("   ").as_text(), None);
        assert_eq!(FieldValue::from(42.0).as_text(), Some("42".to_string()));
        assert_eq!(FieldValue::from("$1,250,000").as_number(), Some(1_250_000.0));
        assert_eq!(
            FieldValue::from("Asbestos; Mesothelioma |Lung Cancer").as_list(),
            vec!["Asbestos", "Mesothelioma", "Lung Cancer"]
        );
    }

    #[test]
    fn test_record_matches() {
        let record = Record::new("sheets_medical_1", Source::Spreadsheet)
            .with_field("title", "Mesothelioma")
            .with_field("specialties", vec!["Asbestos", "Lung Cancer"]);

        assert!(record.matches("MESO", None));
        assert!(record.matches("lung", Some("specialties")));
        assert!(!record.matches("lung", Some("title")));
        assert!(!record.matches("lung", Some("missing")));
    }

    // ============== Typed Conversion Tests ==============

    #[test]
    fn test_article_from_record() {
        let record = Record::new("hubspot_7", Source::Crm)
            .with_field("title", "Roundup Lawsuit")
            .with_field("description", "Glyphosate claims")
            .with_field("symptoms", "Fatigue; Swollen lymph nodes");

        let article = Article::from_record(&record).unwrap();
        assert_eq!(article.id, "hubspot_7");
        assert_eq!(article.source, Source::Crm);
        assert_eq!(article.slug, "roundup-lawsuit");
        assert_eq!(article.category, "General");
        assert_eq!(article.content.overview, "Glyphosate claims");
        assert_eq!(article.content.symptoms.len(), 2);
    }

    #[test]
    fn test_article_requires_title() {
        let record = Record::new("x", Source::Crm).with_field("description", "no title");
        assert!(Article::from_record(&record).is_none());
    }

    #[test]
    fn test_settlement_completeness() {
        let record = Record::new("s1", Source::Spreadsheet)
            .with_field("condition", "Mesothelioma")
            .with_field("state", "CA")
            .with_field("totalCases", "1,200")
            .with_field("year", 2023.0);

        let settlement = SettlementRecord::from_record(&record).unwrap();
        assert!(!settlement.is_complete());
        assert_eq!(settlement.total_cases, Some(1200));
        assert_eq!(settlement.year, Some(2023));
        assert_eq!(
            settlement.group_key(),
            ("mesothelioma".to_string(), "ca".to_string())
        );
    }

    #[test]
    fn test_law_firm_filters() {
        let record = Record::new("f1", Source::Crm)
            .with_field("name", "Coastal Injury Group")
            .with_field("location", "Los Angeles, California")
            .with_field("specialties", vec!["Mesothelioma", "Asbestos Exposure"]);

        let firm = LawFirm::from_record(&record).unwrap();
        assert!(firm.has_specialty("mesothelioma"));
        assert!(firm.is_located_in("california"));
        assert!(!firm.is_located_in("Texas"));
    }

    // ============== Dataset Tests ==============

    #[test]
    fn test_dataset_from_records_skips_invalid() {
        let records = vec![
            Record::new("a", Source::Spreadsheet).with_field("title", "One"),
            Record::new("b", Source::Spreadsheet),
        ];

        let dataset = Dataset::from_records(RecordKind::Article, &records);
        assert_eq!(dataset.kind(), RecordKind::Article);
        assert_eq!(dataset.len(), 1);
        assert!(!dataset.is_fallback());
    }

    #[test]
    fn test_dataset_serializes_with_kind_tag() {
        let dataset = Dataset::LawFirms(Vec::new());
        let json = serde_json::to_value(&dataset).unwrap();
        assert_eq!(json["kind"], "law_firms");
        assert!(json["records"].as_array().unwrap().is_empty());
        assert!(!dataset.is_fallback());
    }
}
