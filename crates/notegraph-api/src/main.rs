//! notegraph-api - HTTP API server for notegraph

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{
        rejection::JsonRejection, FromRequest, FromRequestParts, Multipart, Path, Query, Request,
        State,
    },
    http::{header, request::Parts, HeaderMap, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use notegraph_core::{
    CreateNoteRequest, CreateUserRequest, DocumentCodec, DocumentFormat, EdgeScope,
    LinkRepository, ListNotesRequest, NoteRepository, ProjectRepository, UpdateNoteRequest,
    UserRepository,
};
use notegraph_db::{log_pool_metrics, Database};
use notegraph_docs::{title_from_filename, PandocCodec};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically — useful for
/// log correlation and debugging production incidents.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Global rate limiter type (direct quota, no keyed bucketing).
type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    db: Database,
    /// Document interchange codec (pdftotext/pandoc).
    docs: Arc<PandocCodec>,
    /// Global rate limiter (None if rate limiting is disabled).
    rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

// =============================================================================
// IDENTITY EXTRACTION
// =============================================================================

/// The authenticated owner for a request.
///
/// Identity is established upstream (authenticating reverse proxy or session
/// service) and passed as an `X-User-Id` header; this service performs no
/// authentication itself. Missing or malformed values are 401.
#[derive(Debug, Clone, Copy)]
struct AuthUser(Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get("x-user-id")
            .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?;

        let id = value
            .to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .ok_or_else(|| ApiError::Unauthorized("Malformed X-User-Id header".to_string()))?;

        Ok(AuthUser(id))
    }
}

/// JSON body extractor whose rejection uses the standard error envelope.
///
/// Axum's stock `Json` rejects malformed bodies with 422 and a plain-text
/// message; request bodies we cannot parse are invalid input, so they come
/// back as 400 with the usual `{"error": ...}` shape.
struct ApiJson<T>(T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION HELPER
// =============================================================================

/// Parse allowed origins from comma-separated environment variable.
///
/// Enforces strict origin whitelisting for CORS. `ALLOWED_ORIGINS` is a
/// comma-separated list; when unset or empty, localhost dev origins apply.
fn parse_allowed_origins() -> Vec<HeaderValue> {
    let origins_str = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

    if origins_str.trim().is_empty() {
        return vec![
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://localhost:5173"),
        ];
    }

    origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "notegraph_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "notegraph_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("notegraph-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            } else {
                layer = layer.with_ansi(false); // no ANSI in files
            }
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Get configuration from environment
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/notegraph".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    // Rate limiting configuration
    // RATE_LIMIT_REQUESTS: requests per period (default: 100)
    // RATE_LIMIT_PERIOD_SECS: period in seconds (default: 60)
    let rate_limit_requests: u32 = std::env::var("RATE_LIMIT_REQUESTS")
        .unwrap_or_else(|_| "100".to_string())
        .parse()
        .unwrap_or(100);
    let rate_limit_period_secs: u64 = std::env::var("RATE_LIMIT_PERIOD_SECS")
        .unwrap_or_else(|_| "60".to_string())
        .parse()
        .unwrap_or(60);
    let rate_limit_enabled: bool = std::env::var("RATE_LIMIT_ENABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(true);

    info!(
        "Rate limiting: {} ({} requests per {} seconds)",
        if rate_limit_enabled {
            "enabled"
        } else {
            "disabled"
        },
        rate_limit_requests,
        rate_limit_period_secs
    );

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    // Document codec, with a startup availability report
    let docs = Arc::new(PandocCodec);
    for format in [DocumentFormat::Pdf, DocumentFormat::Docx] {
        let available = docs.health_check(format).await.unwrap_or(false);
        if available {
            info!(format = format.extension(), "Document codec available");
        } else {
            tracing::warn!(
                format = format.extension(),
                "Document codec tools missing; import/export will fail for this format"
            );
        }
    }

    // Create rate limiter if enabled
    let rate_limiter = if rate_limit_enabled {
        let quota = Quota::with_period(std::time::Duration::from_secs(rate_limit_period_secs))
            .ok_or_else(|| anyhow::anyhow!("Rate limit period must be non-zero"))?
            .allow_burst(
                NonZeroU32::new(rate_limit_requests)
                    .ok_or_else(|| anyhow::anyhow!("Rate limit must be non-zero"))?,
            );
        Some(Arc::new(RateLimiter::direct(quota)))
    } else {
        None
    };

    // Create app state
    let state = AppState {
        db,
        docs,
        rate_limiter,
    };

    // Periodic pool health log
    {
        let pool = state.db.pool().clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                log_pool_metrics(&pool);
            }
        });
    }

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Notes CRUD
        .route("/api/v1/notes", get(list_notes).post(create_note))
        .route("/api/v1/notes/graph", get(get_graph))
        .route("/api/v1/notes/link", post(link_notes))
        .route("/api/v1/notes/unlink", delete(unlink_notes))
        .route("/api/v1/notes/position/:id", put(update_note_position))
        // Document interchange
        .route("/api/v1/notes/import/pdf", post(import_pdf))
        .route("/api/v1/notes/import/docx", post(import_docx))
        .route("/api/v1/notes/export/pdf/:id", get(export_pdf))
        .route("/api/v1/notes/export/docx/:id", get(export_docx))
        .route(
            "/api/v1/notes/:id",
            get(get_note).put(update_note).delete(delete_note),
        )
        // Projects
        .route("/api/v1/projects", get(list_projects).post(create_project))
        .route("/api/v1/projects/:id", delete(delete_project))
        // Users (provisioned by the identity collaborator)
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users/me", get(get_current_user))
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer({
            let allowed_origins = parse_allowed_origins();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::AUTHORIZATION,
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    header::HeaderName::from_static("x-user-id"),
                ])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600))
        })
        // Document uploads are the largest payloads we accept
        .layer(RequestBodyLimitLayer::new(50 * 1024 * 1024)) // 50 MB
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// =============================================================================
// RATE LIMITING
// =============================================================================

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    // If rate limiting is disabled, pass through
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!("Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "Too many requests. Please wait before retrying."
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}

// =============================================================================
// HEALTH CHECK
// =============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// =============================================================================
// NOTE HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
struct ListNotesQuery {
    project_id: Option<Uuid>,
    limit: Option<i64>,
    offset: Option<i64>,
}

async fn list_notes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListNotesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(limit) = query.limit {
        if limit <= 0 {
            return Err(ApiError::BadRequest("limit must be >= 1".into()));
        }
    }

    let notes = state
        .db
        .notes
        .list(
            user_id,
            ListNotesRequest {
                project_id: query.project_id,
                limit: query.limit,
                offset: query.offset,
            },
        )
        .await?;
    Ok(Json(notes))
}

#[derive(Debug, Deserialize)]
struct CreateNoteBody {
    title: String,
    content: Option<String>,
    project_id: Option<Uuid>,
    tags: Option<Vec<String>>,
}

async fn create_note(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<CreateNoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state
        .db
        .notes
        .insert(
            user_id,
            CreateNoteRequest {
                title: body.title,
                content: body.content,
                project_id: body.project_id,
                tags: body.tags,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn get_note(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.db.notes.fetch(user_id, id).await?;
    Ok(Json(note))
}

#[derive(Debug, Deserialize)]
struct UpdateNoteBody {
    title: Option<String>,
    content: Option<String>,
    tags: Option<Vec<String>>,
}

async fn update_note(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<UpdateNoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state
        .db
        .notes
        .update(
            user_id,
            id,
            UpdateNoteRequest {
                title: body.title,
                content: body.content,
                tags: body.tags,
            },
        )
        .await?;
    Ok(Json(note))
}

#[derive(Debug, Deserialize)]
struct PositionBody {
    x: f64,
    y: f64,
}

async fn update_note_position(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<PositionBody>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .notes
        .update_position(user_id, id, body.x, body.y)
        .await?;
    Ok(StatusCode::OK)
}

async fn delete_note(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.notes.delete(user_id, id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Note and its links deleted"
    })))
}

// =============================================================================
// LINK HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
struct LinkBody {
    from_note_id: Uuid,
    to_note_id: Uuid,
}

async fn link_notes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<LinkBody>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .links
        .link(user_id, body.from_note_id, body.to_note_id)
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
struct UnlinkQuery {
    from_note_id: Uuid,
    to_note_id: Uuid,
}

async fn unlink_notes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<UnlinkQuery>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .links
        .unlink(user_id, query.from_note_id, query.to_note_id)
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
struct GraphQuery {
    project_id: Option<Uuid>,
    edge_scope: Option<String>,
}

async fn get_graph(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<GraphQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let edge_scope = match query.edge_scope.as_deref() {
        Some(raw) => EdgeScope::parse(raw).ok_or_else(|| {
            ApiError::BadRequest("edge_scope must be 'either' or 'both'".to_string())
        })?,
        None => EdgeScope::default(),
    };

    let graph = state
        .db
        .links
        .graph(user_id, query.project_id, edge_scope)
        .await?;
    Ok(Json(graph))
}

// =============================================================================
// DOCUMENT IMPORT / EXPORT
// =============================================================================

#[derive(Debug, Deserialize)]
struct ImportQuery {
    project_id: Option<Uuid>,
}

/// Pull the uploaded file (filename + bytes) out of a multipart body.
async fn read_upload(multipart: &mut Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some("file") || field.file_name().is_some() {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
            return Ok((filename, data.to_vec()));
        }
    }
    Err(ApiError::BadRequest("No file field in upload".to_string()))
}

async fn import_document(
    state: &AppState,
    user_id: Uuid,
    project_id: Option<Uuid>,
    format: DocumentFormat,
    multipart: &mut Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (filename, data) = read_upload(multipart).await?;

    let text = state.docs.extract_text(&data, format).await?;
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Document contains no extractable text".to_string(),
        ));
    }

    let title = title_from_filename(&filename);
    let note = state
        .db
        .notes
        .insert(
            user_id,
            CreateNoteRequest {
                title,
                content: Some(text),
                project_id,
                tags: None,
            },
        )
        .await?;

    info!(
        subsystem = "api",
        component = "import",
        op = format.extension(),
        user_id = %user_id,
        note_id = %note.id,
        "Document imported"
    );
    Ok((StatusCode::CREATED, Json(note)))
}

async fn import_pdf(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ImportQuery>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    import_document(
        &state,
        user_id,
        query.project_id,
        DocumentFormat::Pdf,
        &mut multipart,
    )
    .await
}

async fn import_docx(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ImportQuery>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    import_document(
        &state,
        user_id,
        query.project_id,
        DocumentFormat::Docx,
        &mut multipart,
    )
    .await
}

/// Sanitize a note title for use inside a Content-Disposition filename.
fn download_filename(title: &str, format: DocumentFormat) -> String {
    let safe: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.trim();
    let stem = if safe.is_empty() { "note" } else { safe };
    format!("{}.{}", stem, format.extension())
}

async fn export_document(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    format: DocumentFormat,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.db.notes.fetch(user_id, id).await?;
    let content = note.content.as_deref().unwrap_or_default();

    let bytes = state
        .docs
        .render(&note.title, content, &note.tags, format)
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(format.content_type()),
    );
    let disposition = format!(
        "attachment; filename=\"{}\"",
        download_filename(&note.title, format)
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        disposition
            .parse()
            .map_err(|_| ApiError::Internal("Invalid download filename".to_string()))?,
    );

    Ok((headers, bytes))
}

async fn export_pdf(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    export_document(&state, user_id, id, DocumentFormat::Pdf).await
}

async fn export_docx(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    export_document(&state, user_id, id, DocumentFormat::Docx).await
}

// =============================================================================
// PROJECT HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreateProjectBody {
    name: String,
}

async fn create_project(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<CreateProjectBody>,
) -> Result<impl IntoResponse, ApiError> {
    let project = state.db.projects.insert(user_id, &body.name).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn list_projects(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let projects = state.db.projects.list(user_id).await?;
    Ok(Json(projects))
}

async fn delete_project(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.projects.delete(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// USER HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreateUserBody {
    name: String,
    email: String,
    /// Opaque hash produced by the identity collaborator.
    password_hash: String,
}

async fn create_user(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateUserBody>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .users
        .insert(CreateUserRequest {
            name: body.name,
            email: body.email,
            password_hash: body.password_hash,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_current_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.db.users.fetch(user_id).await?;
    Ok(Json(user))
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
enum ApiError {
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl From<notegraph_core::Error> for ApiError {
    fn from(err: notegraph_core::Error) -> Self {
        use notegraph_core::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::NoteNotFound(id) => ApiError::NotFound(format!("Note not found: {}", id)),
            Error::ProjectNotFound(id) => {
                ApiError::NotFound(format!("Project not found: {}", id))
            }
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            // Store and codec failures are logged with detail but surface
            // as a generic message: no SQL or tool stderr reaches callers.
            other => {
                tracing::error!(error = %other, "Request failed");
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
