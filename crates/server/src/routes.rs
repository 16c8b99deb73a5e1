//! HTTP routes

use aggregator::AggregationService;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use providers::AdapterRegistry;
use query::{ConditionSearch, QueryCacheStats, QueryFacade, ToolDispatcher};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::{Article, HubConfig, HubError, LawFirm, Logger, SettlementRecord, Tool};
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub facade: Arc<QueryFacade>,
    pub tools: Arc<ToolDispatcher>,
}

impl AppState {
    pub fn new(facade: QueryFacade, logger: Arc<dyn Logger>) -> Self {
        let facade = Arc::new(facade);
        Self {
            tools: Arc::new(ToolDispatcher::new(facade.clone(), logger)),
            facade,
        }
    }

    /// Wire adapters, aggregation service and façade from configuration
    pub fn from_config(config: &HubConfig, logger: Arc<dyn Logger>) -> Self {
        let registry = AdapterRegistry::from_config(config, logger.clone());
        let aggregator = AggregationService::new(registry, config, logger.clone());
        let facade = QueryFacade::new(aggregator, config, logger.clone());
        Self::new(facade, logger)
    }
}

/// [`HubError`] rendered as `{ "error": message }`
#[derive(Debug)]
pub struct ApiError(pub HubError);

impl From<HubError> for ApiError {
    fn from(err: HubError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            HubError::Usage(_) => StatusCode::BAD_REQUEST,
            HubError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/articles", get(list_articles))
        .route("/api/articles/{slug}", get(get_article))
        .route("/api/law-firms", get(law_firms))
        .route("/api/settlements", get(settlements))
        .route("/api/search/{condition}", get(search))
        .route("/api/cache/clear", post(clear_cache))
        .route("/api/cache/stats", get(cache_stats))
        .route("/api/tools", get(list_tools))
        .route("/api/tools/{name}", post(call_tool))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    providers: Vec<String>,
    disabled: Vec<String>,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let registry = state.facade.aggregator().registry();
    Json(HealthResponse {
        status: "ok",
        providers: registry.names().into_iter().map(str::to_string).collect(),
        disabled: registry.skipped().iter().map(|e| e.to_string()).collect(),
    })
}

async fn list_articles(State(state): State<AppState>) -> Json<Vec<Article>> {
    Json(state.facade.get_all_articles().await)
}

async fn get_article(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<Article> {
    state
        .facade
        .get_article_by_slug(&slug)
        .await
        .map(Json)
        .ok_or_else(|| HubError::NotFound(format!("article '{}'", slug)).into())
}

#[derive(Debug, Default, Deserialize)]
pub struct LawFirmParams {
    specialty: Option<String>,
    location: Option<String>,
}

async fn law_firms(State(state): State<AppState>, Query(params): Query<LawFirmParams>) -> Json<Vec<LawFirm>> {
    Json(
        state
            .facade
            .get_law_firms(params.specialty.as_deref(), params.location.as_deref())
            .await,
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct SettlementParams {
    condition: Option<String>,
    state: Option<String>,
}

async fn settlements(
    State(state): State<AppState>,
    Query(params): Query<SettlementParams>,
) -> ApiResult<Vec<SettlementRecord>> {
    let condition = params
        .condition
        .ok_or_else(|| HubError::usage("query parameter 'condition' is required"))?;
    let data = state
        .facade
        .get_settlement_data(&condition, params.state.as_deref())
        .await?;
    Ok(Json(data))
}

async fn search(State(state): State<AppState>, Path(condition): Path<String>) -> ApiResult<ConditionSearch> {
    Ok(Json(state.facade.search_condition(&condition).await?))
}

async fn clear_cache(State(state): State<AppState>) -> Json<Value> {
    state.facade.clear_cache();
    Json(json!({ "status": "cleared" }))
}

async fn cache_stats(State(state): State<AppState>) -> Json<QueryCacheStats> {
    Json(state.facade.cache_stats())
}

async fn list_tools(State(state): State<AppState>) -> Json<Vec<Tool>> {
    Json(state.tools.tools().to_vec())
}

/// Body is the tool's argument object; an empty body means no arguments
async fn call_tool(State(state): State<AppState>, Path(name): Path<String>, body: Bytes) -> ApiResult<Value> {
    let args = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| HubError::usage(format!("invalid JSON body: {}", e)))?
    };

    Ok(Json(state.tools.dispatch(&name, &args).await?))
}
