//! HTTP adapters against a mock server

use pretty_assertions::assert_eq;
use providers::{HubSpotAdapter, ProviderAdapter, SheetsAdapter};
use serde_json::json;
use shared::{
    HubSpotConfig, LogLevel, NullLogger, ProviderError, RecordingLogger, SheetsConfig, Source,
};
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHEET_PATH: &str = "/v4/spreadsheets/sheet-1/values/Medical%20Conditions";

fn sheets_config(server: &MockServer) -> SheetsConfig {
    SheetsConfig {
        api_key: "key-123".to_string(),
        spreadsheet_id: "sheet-1".to_string(),
        base_url: server.uri(),
        ..Default::default()
    }
}

fn hubspot_config(server: &MockServer) -> HubSpotConfig {
    HubSpotConfig {
        access_token: "pat-test".to_string(),
        base_url: server.uri(),
        ..Default::default()
    }
}

// ============== Sheets ==============

#[tokio::test]
async fn sheets_fetches_and_maps_rows() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SHEET_PATH))
        .and(query_param("key", "key-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "'Medical Conditions'!A1:Z1000",
            "majorDimension": "ROWS",
            "values": [
                ["Title", "Description", "Category", "Symptoms"],
                ["Mesothelioma", "Asbestos-related cancer", "Cancer", "Chest pain; Fatigue"],
                ["Roundup", "Glyphosate exposure", "Chemical"]
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = SheetsAdapter::from_config(&sheets_config(&server), Arc::new(NullLogger)).unwrap();
    let records = adapter.fetch_collection("Medical Conditions").await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id(), "sheets_medical_1");
    assert_eq!(records[0].source(), Source::Spreadsheet);
    assert_eq!(records[0].list("symptoms"), vec!["Chest pain", "Fatigue"]);
    assert_eq!(records[1].text("category"), Some("Chemical".to_string()));
}

#[tokio::test]
async fn sheets_search_filters_fetched_rows() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-1/values/Settlements"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [
                ["Condition", "State", "Settlement Range"],
                ["Mesothelioma", "California", "$1M - $5M"],
                ["Roundup", "Texas", "$5K - $250K"],
                ["Mesothelioma", "Texas", "$800K - $3M"]
            ]
        })))
        .mount(&server)
        .await;

    let adapter = SheetsAdapter::from_config(&sheets_config(&server), Arc::new(NullLogger)).unwrap();
    let result = adapter
        .search("settlements", "MESO", Some("condition"), Some(1))
        .await
        .unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.results.len(), 1);
    assert_eq!(result.results[0].text("state"), Some("California".to_string()));
}

#[tokio::test]
async fn sheets_http_error_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SHEET_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let adapter = SheetsAdapter::from_config(&sheets_config(&server), Arc::new(NullLogger)).unwrap();
    let err = adapter.fetch_collection("Medical Conditions").await.unwrap_err();

    assert!(matches!(err, ProviderError::Unavailable { ref provider, .. } if provider == "sheets"));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn sheets_malformed_body_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SHEET_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let adapter = SheetsAdapter::from_config(&sheets_config(&server), Arc::new(NullLogger)).unwrap();
    let err = adapter.fetch_collection("Medical Conditions").await.unwrap_err();

    assert!(err.to_string().contains("invalid response body"));
}

#[tokio::test]
async fn sheets_unknown_collection_makes_no_request() {
    let server = MockServer::start().await;
    let logger = Arc::new(RecordingLogger::new());

    let adapter = SheetsAdapter::from_config(&sheets_config(&server), logger.clone()).unwrap();
    let records = adapter.fetch_collection("Verdicts").await.unwrap();

    assert!(records.is_empty());
    assert!(logger.contains(LogLevel::Warn, "Verdicts"));
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}

// ============== HubSpot ==============

#[tokio::test]
async fn hubspot_follows_paging_with_bearer_token() {
    let server = MockServer::start().await;

    // registered first so it wins over the unqualified first-page mock
    Mock::given(method("GET"))
        .and(path("/cms/v3/hubdb/tables/law_firms/rows"))
        .and(query_param("after", "page-2"))
        .and(header("authorization", "Bearer pat-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": 3, "values": {"name": "Lone Star Legal", "location": "Houston, Texas"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cms/v3/hubdb/tables/law_firms/rows"))
        .and(query_param("limit", "100"))
        .and(header("authorization", "Bearer pat-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 3,
            "results": [
                {"id": 1, "values": {"name": "Coastal Injury Group", "specialties": [{"name": "Mesothelioma"}]}},
                {"id": 2, "values": {"name": "Bayou Trial Lawyers"}}
            ],
            "paging": {"next": {"after": "page-2"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = HubSpotAdapter::from_config(&hubspot_config(&server), Arc::new(NullLogger)).unwrap();
    let records = adapter.fetch_collection("law_firms").await.unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["hubspot_1", "hubspot_2", "hubspot_3"]);
    assert_eq!(records[0].source(), Source::Crm);
    assert_eq!(records[0].list("specialties"), vec!["Mesothelioma"]);
}

#[tokio::test]
async fn hubspot_blog_posts_map_to_article_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cms/v3/blogs/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": "77",
                "name": "Camp Lejeune Water Contamination",
                "metaDescription": "Toxic water at a Marine base",
                "postSummary": "Decades of contaminated drinking water",
                "slug": "blog/camp-lejeune"
            }]
        })))
        .mount(&server)
        .await;

    let adapter = HubSpotAdapter::from_config(&hubspot_config(&server), Arc::new(NullLogger)).unwrap();
    let records = adapter.fetch_collection("blog_posts").await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].text("title"),
        Some("Camp Lejeune Water Contamination".to_string())
    );
    assert_eq!(
        records[0].text("description"),
        Some("Toxic water at a Marine base".to_string())
    );
}

#[tokio::test]
async fn hubspot_unauthorized_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cms/v3/blogs/posts"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"status": "error"})))
        .mount(&server)
        .await;

    let adapter = HubSpotAdapter::from_config(&hubspot_config(&server), Arc::new(NullLogger)).unwrap();
    let err = adapter.fetch_collection("blog_posts").await.unwrap_err();

    assert_eq!(err.provider(), "hubspot");
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn hubspot_unknown_collection_makes_no_request() {
    let server = MockServer::start().await;

    let adapter = HubSpotAdapter::from_config(&hubspot_config(&server), Arc::new(NullLogger)).unwrap();
    assert!(adapter.fetch_collection("deals").await.unwrap().is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}
