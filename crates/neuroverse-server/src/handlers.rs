//! HTTP request handlers for the server.
//!
//! JSON endpoints for login, health, brain dumps and the row-store
//! collections. The streaming chat endpoint lives in [`crate::chat`].

use crate::auth::{auth_middleware, cleared_cookie, session_cookie};
use crate::chat::chat;
use crate::config::ServerConfig;
use axum::{
    extract::State,
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use neuroverse_domain::traits::RowStore;
use neuroverse_domain::{Collection, DumpItem, FieldValue, Priority, Role, Row, RowQuery, Tag};
use neuroverse_extractor::{BrainDump, ExtractorConfig, ExtractorError};
use neuroverse_llm::{LlmError, ProviderRouter};
use neuroverse_store::{SqliteStore, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{error, info};

/// Id of the single memory row
pub const MEMORY_ID: i64 = 1;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Row store (SQLite connection behind a mutex)
    pub store: Arc<Mutex<SqliteStore>>,
    /// Provider fallback chain
    pub router: ProviderRouter,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Bundle configuration, store and router
    pub fn new(config: ServerConfig, store: SqliteStore, router: ProviderRouter) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            router,
            config: Arc::new(config),
        }
    }

    /// Run `f` with exclusive access to the store
    pub fn with_store<T>(
        &self,
        f: impl FnOnce(&mut SqliteStore) -> Result<T, StoreError>,
    ) -> Result<T, AppError> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| AppError::Internal("store lock poisoned".to_string()))?;
        Ok(f(&mut store)?)
    }

    /// Append one turn to the message history
    pub fn record_message(&self, role: Role, content: &str) -> Result<(), AppError> {
        let mut row = Row::new();
        row.insert("role".into(), role.as_str().into());
        row.insert("content".into(), content.into());
        self.with_store(|store| store.insert(Collection::Messages, row))?;
        Ok(())
    }

    /// Stored memory text, if any
    pub fn memory(&self) -> Result<Option<String>, AppError> {
        let row = self.with_store(|store| store.get(Collection::Memory, MEMORY_ID))?;
        Ok(row.and_then(|row| {
            row.get("content")
                .and_then(FieldValue::as_str)
                .map(str::to_string)
        }))
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Plain acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    /// Always true
    pub ok: bool,
}

impl OkResponse {
    fn ok() -> Json<Self> {
        Json(Self { ok: true })
    }
}

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Row store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Completion failure
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Brain-dump pipeline failure
    #[error(transparent)]
    Extractor(#[from] ExtractorError),

    /// Model work exceeded the request ceiling
    #[error("Request timed out")]
    Timeout,

    /// Malformed request body
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::InvalidData(_))
            | AppError::Extractor(ExtractorError::TextTooLong(..))
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Shared password
    #[serde(default)]
    pub password: String,
}

/// POST /api/auth - Exchange the password for a session cookie
async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Response {
    let expected = state.config.app_password.as_str();
    if expected.is_empty() || request.password != expected {
        info!("Rejected login attempt");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Wrong password".to_string(),
            }),
        )
            .into_response();
    }

    (
        [(header::SET_COOKIE, session_cookie(expected))],
        OkResponse::ok(),
    )
        .into_response()
}

/// DELETE /api/auth - Clear the session cookie
async fn logout() -> Response {
    ([(header::SET_COOKIE, cleared_cookie())], OkResponse::ok()).into_response()
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" when the server answers
    pub status: String,
    /// Which settings are present (never their values)
    pub env: BTreeMap<String, bool>,
    /// Providers that will be tried, in order
    pub providers: Vec<String>,
}

/// GET /api/health - Report which settings are configured
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut env = BTreeMap::new();
    for provider in state.router.providers() {
        env.insert(
            provider.kind.api_key_env().to_string(),
            provider.is_available(),
        );
    }
    env.insert(
        crate::config::PASSWORD_ENV.to_string(),
        !state.config.app_password.is_empty(),
    );
    env.insert(
        "DATABASE_PATH".to_string(),
        !state.config.database_path.is_empty(),
    );

    let providers = state
        .router
        .list_available()
        .iter()
        .map(|p| p.name.clone())
        .collect();

    Json(HealthResponse {
        status: "ok".to_string(),
        env,
        providers,
    })
}

/// Brain-dump request
#[derive(Debug, Deserialize)]
pub struct BrainDumpRequest {
    /// Free-form text
    #[serde(default)]
    pub text: String,
}

/// Brain-dump response
#[derive(Debug, Serialize, Deserialize)]
pub struct BrainDumpResponse {
    /// Recovered items, in the order the model listed them
    pub items: Vec<DumpItem>,
}

/// POST /api/brain-dump - Break text into tagged items
async fn brain_dump(
    State(state): State<AppState>,
    Json(request): Json<BrainDumpRequest>,
) -> Result<Json<BrainDumpResponse>, AppError> {
    let config = ExtractorConfig {
        max_text_length: state.config.max_dump_length,
        timeout_secs: state.config.request_timeout_secs,
    };
    let pipeline = BrainDump::new(state.router.clone(), config);
    let items = pipeline.run(&request.text).await?;
    Ok(Json(BrainDumpResponse { items }))
}

/// Delete request body
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    /// Row id
    pub id: i64,
}

/// New task
#[derive(Debug, Deserialize)]
pub struct NewTask {
    /// Task text
    pub text: String,
    /// Tag name (unknown values become "neutral")
    #[serde(default)]
    pub tag: Option<String>,
    /// Priority name (unknown values become "medium")
    #[serde(default)]
    pub priority: Option<String>,
}

/// Task changes
#[derive(Debug, Deserialize)]
pub struct TaskUpdate {
    /// Row id
    pub id: i64,
    /// Completion flag
    #[serde(default)]
    pub done: Option<bool>,
    /// Replacement text
    #[serde(default)]
    pub text: Option<String>,
    /// Replacement tag
    #[serde(default)]
    pub tag: Option<String>,
    /// Replacement priority
    #[serde(default)]
    pub priority: Option<String>,
}

fn required_text(text: &str, field: &str) -> Result<String, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    Ok(text.to_string())
}

fn tag_or_default(tag: Option<&str>) -> Tag {
    tag.and_then(Tag::parse).unwrap_or_default()
}

fn priority_or_default(priority: Option<&str>) -> Priority {
    priority.and_then(Priority::parse).unwrap_or_default()
}

/// GET /api/tasks - Newest first
async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Row>>, AppError> {
    let query = RowQuery::new().order_by("created_at", false);
    let rows = state.with_store(|store| store.select(Collection::Tasks, &query))?;
    Ok(Json(rows))
}

/// POST /api/tasks
async fn create_task(
    State(state): State<AppState>,
    Json(task): Json<NewTask>,
) -> Result<Json<Row>, AppError> {
    let mut row = Row::new();
    row.insert("text".into(), required_text(&task.text, "text")?.into());
    row.insert("tag".into(), tag_or_default(task.tag.as_deref()).as_str().into());
    row.insert(
        "priority".into(),
        priority_or_default(task.priority.as_deref()).as_str().into(),
    );
    row.insert("done".into(), false.into());

    let row = state.with_store(|store| store.insert(Collection::Tasks, row))?;
    Ok(Json(row))
}

/// PATCH /api/tasks
async fn update_task(
    State(state): State<AppState>,
    Json(update): Json<TaskUpdate>,
) -> Result<Json<Row>, AppError> {
    let mut row = Row::new();
    if let Some(done) = update.done {
        row.insert("done".into(), done.into());
    }
    if let Some(text) = &update.text {
        row.insert("text".into(), required_text(text, "text")?.into());
    }
    if let Some(tag) = &update.tag {
        row.insert("tag".into(), tag_or_default(Some(tag.as_str())).as_str().into());
    }
    if let Some(priority) = &update.priority {
        row.insert("priority".into(), priority_or_default(Some(priority.as_str())).as_str().into());
    }
    if row.is_empty() {
        return Err(AppError::BadRequest("nothing to update".to_string()));
    }

    let row = state.with_store(|store| store.update(Collection::Tasks, update.id, row))?;
    Ok(Json(row))
}

/// DELETE /api/tasks
async fn delete_task(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<OkResponse>, AppError> {
    state.with_store(|store| store.delete(Collection::Tasks, request.id))?;
    Ok(OkResponse::ok())
}

/// New note
#[derive(Debug, Deserialize)]
pub struct NewNote {
    /// Title
    #[serde(default)]
    pub title: Option<String>,
    /// Body
    #[serde(default)]
    pub content: Option<String>,
}

/// Note changes
#[derive(Debug, Deserialize)]
pub struct NoteUpdate {
    /// Row id
    pub id: i64,
    /// Replacement title
    #[serde(default)]
    pub title: Option<String>,
    /// Replacement body
    #[serde(default)]
    pub content: Option<String>,
}

/// GET /api/notes - Most recently edited first
async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Row>>, AppError> {
    let query = RowQuery::new().order_by("updated_at", false);
    let rows = state.with_store(|store| store.select(Collection::Notes, &query))?;
    Ok(Json(rows))
}

/// POST /api/notes
async fn create_note(
    State(state): State<AppState>,
    Json(note): Json<NewNote>,
) -> Result<Json<Row>, AppError> {
    let mut row = Row::new();
    row.insert("title".into(), note.title.into());
    row.insert("content".into(), note.content.into());

    let row = state.with_store(|store| store.insert(Collection::Notes, row))?;
    Ok(Json(row))
}

/// PATCH /api/notes
async fn update_note(
    State(state): State<AppState>,
    Json(update): Json<NoteUpdate>,
) -> Result<Json<Row>, AppError> {
    let mut row = Row::new();
    if let Some(title) = update.title {
        row.insert("title".into(), title.into());
    }
    if let Some(content) = update.content {
        row.insert("content".into(), content.into());
    }

    let row = state.with_store(|store| store.update(Collection::Notes, update.id, row))?;
    Ok(Json(row))
}

/// DELETE /api/notes
async fn delete_note(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<OkResponse>, AppError> {
    state.with_store(|store| store.delete(Collection::Notes, request.id))?;
    Ok(OkResponse::ok())
}

/// Memory document
#[derive(Debug, Serialize, Deserialize)]
pub struct MemoryResponse {
    /// Free-form context shared with every chat
    pub content: String,
    /// Last edit (Unix seconds), absent before the first save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl MemoryResponse {
    fn from_row(row: Option<Row>) -> Self {
        let content = row
            .as_ref()
            .and_then(|r| r.get("content"))
            .and_then(FieldValue::as_str)
            .unwrap_or_default()
            .to_string();
        let updated_at = row
            .as_ref()
            .and_then(|r| r.get("updated_at"))
            .and_then(FieldValue::as_i64);
        Self { content, updated_at }
    }
}

/// Memory update
#[derive(Debug, Deserialize)]
pub struct MemoryUpdate {
    /// Replacement content
    #[serde(default)]
    pub content: String,
}

/// GET /api/memory
async fn get_memory(State(state): State<AppState>) -> Result<Json<MemoryResponse>, AppError> {
    let row = state.with_store(|store| store.get(Collection::Memory, MEMORY_ID))?;
    Ok(Json(MemoryResponse::from_row(row)))
}

/// PUT /api/memory
async fn put_memory(
    State(state): State<AppState>,
    Json(update): Json<MemoryUpdate>,
) -> Result<Json<MemoryResponse>, AppError> {
    let mut row = Row::new();
    row.insert("content".into(), update.content.into());

    let row = state.with_store(|store| store.upsert(Collection::Memory, MEMORY_ID, row))?;
    Ok(Json(MemoryResponse::from_row(Some(row))))
}

/// Create the axum router with all routes
///
/// Every route sits behind [`auth_middleware`].
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/api/auth", post(login).delete(logout))
        .route("/api/health", get(health_check))
        .route("/api/chat", post(chat))
        .route("/api/brain-dump", post(brain_dump))
        .route(
            "/api/tasks",
            get(list_tasks)
                .post(create_task)
                .patch(update_task)
                .delete(delete_task),
        )
        .route(
            "/api/notes",
            get(list_notes)
                .post(create_note)
                .patch(update_note)
                .delete(delete_note),
        )
        .route("/api/memory", get(get_memory).put(put_memory))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
