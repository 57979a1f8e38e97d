//! HTTP surface over the assistant
//!
//! Every handler takes a fresh clone of the root DuckDB connection and runs
//! the synchronous assistant call on the blocking pool.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, MatchedPath, Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use datasage_core::{Assistant, AssistantConfig, AssistantError, ColumnMeta, TableProfile};
use datasage_duck::{DuckError, DuckStore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, info_span, Instrument};

use crate::log_event;
use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    root: Arc<Mutex<DuckStore>>,
    assistant: AssistantConfig,
    metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(store: DuckStore, assistant: AssistantConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            root: Arc::new(Mutex::new(store)),
            assistant,
            metrics,
        }
    }

    /// Run `work` against a per-request assistant on the blocking pool
    async fn with_assistant<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Assistant<DuckStore>) -> datasage_core::Result<T> + Send + 'static,
    {
        let store = {
            let root = self
                .root
                .lock()
                .map_err(|_| ApiError::Internal("store lock poisoned".to_string()))?;
            root.try_clone()?
        };
        let config = self.assistant.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            let assistant = Assistant::with_config(store, config);
            work(&assistant)
        })
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(outcome?)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Assistant(#[from] AssistantError),

    #[error(transparent)]
    Store(#[from] DuckError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Assistant(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub tables: usize,
    pub columns: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentationResponse {
    pub documentation: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    question: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub intent: String,
}

#[derive(Debug, Deserialize)]
pub struct SqlRequest {
    query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SqlResponse {
    pub sql: String,
    pub shape: String,
}

/// Pull a required string field out of a JSON body
fn required<T>(
    body: Result<Json<T>, JsonRejection>,
    field: &'static str,
    pick: impl FnOnce(T) -> Option<String>,
) -> Result<String, ApiError> {
    let missing = || ApiError::BadRequest(format!("Missing '{field}' in request body"));
    let Json(body) = body.map_err(|_| missing())?;
    pick(body).ok_or_else(missing)
}

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let stats = state.with_assistant(|a| a.database_stats()).await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        message: "DataSage backend is running".to_string(),
        tables: stats.tables,
        columns: stats.columns,
    }))
}

pub async fn extract(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, Vec<ColumnMeta>>>, ApiError> {
    let metadata = state.with_assistant(|a| a.extract_metadata()).await?;
    Ok(Json(metadata))
}

pub async fn profile(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<TableProfile>, ApiError> {
    let profile = state.with_assistant(move |a| a.profile(&table)).await?;
    Ok(Json(profile))
}

pub async fn generate_doc(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<DocumentationResponse>, ApiError> {
    let documentation = state
        .with_assistant(move |a| a.document_table(&table))
        .await?;
    Ok(Json(DocumentationResponse { documentation }))
}

pub async fn generate_doc_column(
    State(state): State<AppState>,
    Path((table, column)): Path<(String, String)>,
) -> Result<Json<DocumentationResponse>, ApiError> {
    let documentation = state
        .with_assistant(move |a| a.document_column(&table, &column))
        .await?;
    Ok(Json(DocumentationResponse { documentation }))
}

pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let question = required(body, "question", |b: ChatRequest| b.question)?;
    let answer = state.with_assistant(move |a| Ok(a.chat(&question))).await?;

    let intent = answer.intent.as_str();
    state.metrics.observe_intent(intent);
    log_event!(level: tracing::Level::INFO, event: "chat_answered", intent: intent);

    Ok(Json(ChatResponse {
        answer: answer.answer,
        intent: intent.to_string(),
    }))
}

pub async fn generate_sql(
    State(state): State<AppState>,
    body: Result<Json<SqlRequest>, JsonRejection>,
) -> Result<Json<SqlResponse>, ApiError> {
    let query = required(body, "query", |b: SqlRequest| b.query)?;
    let translation = state.with_assistant(move |a| a.translate(&query)).await?;

    let shape = translation.shape.as_str();
    state.metrics.observe_translation(shape);
    log_event!(level: tracing::Level::INFO, event: "sql_generated", shape: shape);

    Ok(Json(SqlResponse {
        sql: translation.sql,
        shape: shape.to_string(),
    }))
}

pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state
        .metrics
        .render()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

/// Request id span plus per-route request counter
async fn track_request(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let request_id = uuid::Uuid::new_v4();
    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        route = %route,
    );

    let started = Instant::now();
    let response = next.run(req).instrument(span.clone()).await;
    let status = response.status().as_u16();

    state.metrics.observe_request(&route, status);
    span.in_scope(|| {
        info!(
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request handled"
        );
    });
    response
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/extract", get(extract))
        .route("/profile/:table", get(profile))
        .route("/generate-doc/:table", get(generate_doc))
        .route("/generate-doc/:table/:column", get(generate_doc_column))
        .route("/chat", post(chat))
        .route("/generate-sql", post(generate_sql))
        .route("/metrics", get(metrics))
        .route_layer(middleware::from_fn_with_state(state.clone(), track_request))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_state() -> AppState {
        let store = DuckStore::open_in_memory().unwrap();
        datasage_duck::demo::seed(&store).unwrap();
        AppState::new(
            store,
            AssistantConfig::default(),
            Arc::new(Metrics::new().unwrap()),
        )
    }

    #[tokio::test]
    async fn test_health_reports_stats() {
        let state = seeded_state();
        let Json(body) = health(State(state)).await.unwrap();
        assert_eq!(body.status, "ok");
        assert_eq!(body.tables, 3);
        assert_eq!(body.columns, 17);
    }

    #[tokio::test]
    async fn test_profile_unknown_table_is_404() {
        let state = seeded_state();
        let err = profile(State(state), Path("nope".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_customers() {
        let state = seeded_state();
        let Json(body) = profile(State(state), Path("customers".to_string()))
            .await
            .unwrap();
        assert_eq!(body.table, "customers");
        assert_eq!(body.row_count, 15);
        assert_eq!(body.sample.len(), 5);
        assert!(body.statistics.contains_key("customer_id"));
    }

    #[tokio::test]
    async fn test_column_doc_unknown_column_is_404() {
        let state = seeded_state();
        let err = generate_doc_column(
            State(state),
            Path(("customers".to_string(), "nope".to_string())),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chat_counts_customers_and_records_intent() {
        let state = seeded_state();
        let metrics = state.metrics.clone();

        let body = Ok(Json(ChatRequest {
            question: Some("How many customers?".to_string()),
        }));
        let Json(response) = chat(State(state), body).await.unwrap();
        assert_eq!(response.intent, "customer_count");
        assert!(response.answer.contains("15"));

        let text = metrics.render().unwrap();
        assert!(text.contains("datasage_chat_intents_total{intent=\"customer_count\"} 1"));
    }

    #[tokio::test]
    async fn test_chat_missing_question_is_400() {
        let state = seeded_state();
        let body = Ok(Json(ChatRequest { question: None }));
        let err = chat(State(state), body).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Missing 'question' in request body");
    }

    #[tokio::test]
    async fn test_generate_sql() {
        let state = seeded_state();
        let body = Ok(Json(SqlRequest {
            query: Some("How many customers do we have?".to_string()),
        }));
        let Json(response) = generate_sql(State(state), body).await.unwrap();
        assert_eq!(response.sql, "SELECT COUNT(*) FROM customers;");
        assert_eq!(response.shape, "row_count");
    }

    #[tokio::test]
    async fn test_generate_sql_missing_query_is_400() {
        let state = seeded_state();
        let body = Ok(Json(SqlRequest { query: None }));
        let err = generate_sql(State(state), body).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
