// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod identity;
mod session;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State as AxumState, multipart::MultipartError},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tablebook_api::{
    AdmissionControl, ApiError, AuthenticationService, BookingActionResponse,
    CreateOperatorRequest, CreateOperatorResponse, DEFAULT_MAX_EVIDENCE_BYTES, DashboardResponse,
    EditBookingRequest, EvidenceAttachment, EvidenceStore, EvidenceUpload, ListTablesResponse,
    LocalEvidenceStore, LoginRequest, LoginResponse, RateLimitConfig, RejectBookingRequest,
    ReserveBookingRequest, ReserveBookingResponse, SeedTablesRequest, SeedTablesResponse,
    SupabaseEvidenceStore, TokenBucketLimiter, WhoAmIResponse, admit_reservation,
    approve_booking, create_operator, delete_booking, edit_booking, list_bookings, list_tables,
    login, logout, reject_booking, reserve_admitted_booking, retry_after_secs, seed_tables, whoami,
};
use tablebook_domain::Price;
use tablebook_persistence::{DEFAULT_POOL_SIZE, Persistence, PersistenceError, SeedOutcome};
use tokio::task::JoinHandle;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, info, warn};

use crate::identity::ClientIdentity;
use crate::session::{SessionOperator, bearer_token};

/// Tablebook Server - HTTP server for event table reservations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "TABLEBOOK_DATABASE")]
    database: Option<PathBuf>,

    /// Address to bind the server to
    #[arg(long, env = "TABLEBOOK_BIND", default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Port to bind the server to
    #[arg(short, long, env = "TABLEBOOK_PORT", default_value_t = 3000)]
    port: u16,

    /// Number of pooled database connections for a file database
    #[arg(long, env = "TABLEBOOK_POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE)]
    pool_size: u32,

    /// Number of tables seeded at startup
    #[arg(long, env = "TABLEBOOK_TABLE_COUNT", default_value_t = 80)]
    table_count: u32,

    /// Price of each seeded table
    #[arg(long, env = "TABLEBOOK_TABLE_PRICE", default_value_t = 4000)]
    table_price: u64,

    /// Reservations admitted per client within one window
    #[arg(long, env = "TABLEBOOK_RATE_LIMIT", default_value_t = 5)]
    rate_limit: u32,

    /// Rate limit window in seconds
    #[arg(long, env = "TABLEBOOK_RATE_WINDOW_SECS", default_value_t = 60)]
    rate_window_secs: u64,

    /// Largest accepted payment slip in bytes
    #[arg(long, env = "TABLEBOOK_MAX_EVIDENCE_BYTES", default_value_t = DEFAULT_MAX_EVIDENCE_BYTES)]
    max_evidence_bytes: usize,

    /// Bound on a single slip upload in seconds
    #[arg(long, env = "TABLEBOOK_UPLOAD_TIMEOUT_SECS", default_value_t = 10)]
    upload_timeout_secs: u64,

    /// Directory for payment slips when no object store is configured
    #[arg(long, env = "TABLEBOOK_EVIDENCE_DIR", default_value = "./evidence")]
    evidence_dir: PathBuf,

    /// Base URL this server is reachable at, used in slip URLs
    #[arg(long, env = "TABLEBOOK_PUBLIC_BASE_URL", default_value = "http://127.0.0.1:3000")]
    public_base_url: String,

    /// Supabase project URL; enables Supabase Storage for slips
    #[arg(long, env = "TABLEBOOK_SUPABASE_URL")]
    supabase_url: Option<String>,

    /// Supabase service key
    #[arg(long, env = "TABLEBOOK_SUPABASE_KEY", hide_env_values = true)]
    supabase_key: Option<String>,

    /// Supabase Storage bucket for slips
    #[arg(long, env = "TABLEBOOK_SUPABASE_BUCKET", default_value = "slips")]
    supabase_bucket: String,

    /// Login name of the bootstrap admin operator
    #[arg(long, env = "TABLEBOOK_ADMIN_LOGIN", default_value = "admin")]
    admin_login: String,

    /// Password of the bootstrap admin operator. No admin is created without one.
    #[arg(long, env = "TABLEBOOK_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,

    /// Display name of the bootstrap admin operator
    #[arg(long, env = "TABLEBOOK_ADMIN_DISPLAY_NAME", default_value = "System Admin")]
    admin_display_name: String,
}

/// Deployment settings handlers and the router need.
#[derive(Debug, Clone)]
struct ServerConfig {
    /// Table count used when a seed request does not name one.
    table_count: u32,
    /// Table price used when a seed request does not name one.
    table_price: u64,
    /// Body limit for the reservation form.
    body_limit: usize,
    /// Directory served under `/evidence`, when slips are stored locally.
    evidence_dir: Option<PathBuf>,
}

/// Application state shared across handlers.
///
/// Nothing here is locked: persistence hands out pooled connections and
/// relies on transactions, and the limiter shards its own state.
#[derive(Clone)]
struct AppState {
    /// The persistence layer for tables, bookings, operators and sessions.
    persistence: Persistence,
    /// Slip validation and storage.
    evidence: Arc<EvidenceAttachment>,
    /// The per-client reservation throttle.
    admission: Arc<dyn AdmissionControl>,
    /// Deployment settings.
    config: Arc<ServerConfig>,
}

/// API response for write operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WriteResponse<T> {
    /// Success indicator.
    success: bool,
    /// The operation's result.
    #[serde(flatten)]
    result: T,
}

impl<T> WriteResponse<T> {
    const fn new(result: T) -> Self {
        Self {
            success: true,
            result,
        }
    }
}

/// Result body for writes that only report a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageResponse {
    /// A success message.
    message: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
    /// Seconds until a rate-limited caller may retry.
    retry_after_secs: Option<u64>,
}

impl HttpError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            retry_after_secs: None,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        let mut response: Response = (self.status, body).into_response();

        if let Some(secs) = self.retry_after_secs {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        response
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::CapacityUnavailable { .. } | ApiError::Conflict { .. } => {
                StatusCode::CONFLICT
            }
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::UploadFailed { .. } => StatusCode::BAD_GATEWAY,
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let retry_after_secs: Option<u64> = match &err {
            ApiError::RateLimited { retry_after } => Some(retry_after_secs(*retry_after)),
            _ => None,
        };

        Self {
            status,
            message: err.to_string(),
            retry_after_secs,
        }
    }
}

impl From<MultipartError> for HttpError {
    fn from(err: MultipartError) -> Self {
        debug!(error = %err, "Rejected reservation form");
        Self::new(err.status(), err.body_text())
    }
}

/// Parses an optional JSON body, treating an empty body as the default.
fn optional_json<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, HttpError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(body).map_err(|e| {
        HttpError::new(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {e}"))
    })
}

/// Reads the reservation form.
///
/// Fields: `table_id`, `name`, `batch`, `phone` and an optional `slip` file.
async fn read_reservation_form(
    mut multipart: Multipart,
) -> Result<ReserveBookingRequest, HttpError> {
    let mut table_id: Option<String> = None;
    let mut name: String = String::new();
    let mut batch: String = String::new();
    let mut phone: String = String::new();
    let mut slip: Option<EvidenceUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name: String = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "table_id" => table_id = Some(field.text().await?),
            "name" => name = field.text().await?,
            "batch" => batch = field.text().await?,
            "phone" => phone = field.text().await?,
            "slip" => {
                let file_name: String = field.file_name().unwrap_or_default().to_string();
                let content_type: String = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                slip = Some(EvidenceUpload::new(
                    file_name,
                    content_type,
                    field.bytes().await?,
                ));
            }
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    let table_id: i64 = table_id
        .as_deref()
        .map(str::trim)
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| {
            HttpError::from(ApiError::InvalidInput {
                field: String::from("table_id"),
                message: String::from("A numeric table id is required"),
            })
        })?;

    Ok(ReserveBookingRequest {
        table_id,
        name,
        batch,
        phone,
        slip,
    })
}

/// Handler for GET `/tables` endpoint.
async fn handle_list_tables(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<ListTablesResponse>, HttpError> {
    let response: ListTablesResponse = list_tables(&app_state.persistence)?;
    Ok(Json(response))
}

/// Handler for POST `/bookings` endpoint.
///
/// Reserves a table from a multipart form. Open to customers.
///
/// The caller is admitted before the form body is read, so throttled and
/// malformed requests both spend a token.
async fn handle_reserve_booking(
    AxumState(app_state): AxumState<AppState>,
    ClientIdentity(identity): ClientIdentity,
    multipart: Multipart,
) -> Result<(StatusCode, Json<WriteResponse<ReserveBookingResponse>>), HttpError> {
    admit_reservation(app_state.admission.as_ref(), &identity)?;

    let request: ReserveBookingRequest = read_reservation_form(multipart).await?;

    let response: ReserveBookingResponse =
        reserve_admitted_booking(&app_state.persistence, &app_state.evidence, request).await?;

    Ok((StatusCode::CREATED, Json(WriteResponse::new(response))))
}

/// Handler for POST `/auth/login` endpoint.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    let response: LoginResponse = login(&app_state.persistence, &request)?;
    Ok(Json(response))
}

/// Handler for POST `/auth/logout` endpoint.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Json<WriteResponse<MessageResponse>>, HttpError> {
    let token: &str = bearer_token(&headers)?;
    logout(&app_state.persistence, token)?;

    Ok(Json(WriteResponse::new(MessageResponse {
        message: String::from("Logged out"),
    })))
}

/// Handler for GET `/auth/whoami` endpoint.
async fn handle_whoami(
    SessionOperator(_actor, operator): SessionOperator,
) -> Json<WhoAmIResponse> {
    Json(whoami(&operator))
}

/// Handler for GET `/admin/bookings` endpoint.
async fn handle_list_bookings(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
) -> Result<Json<DashboardResponse>, HttpError> {
    let response: DashboardResponse = list_bookings(&app_state.persistence, &actor)?;
    Ok(Json(response))
}

/// Handler for POST `/admin/bookings/{booking_id}/approve` endpoint.
async fn handle_approve_booking(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, operator): SessionOperator,
    Path(booking_id): Path<String>,
) -> Result<Json<WriteResponse<BookingActionResponse>>, HttpError> {
    let response: BookingActionResponse =
        approve_booking(&app_state.persistence, &booking_id, &actor, &operator)?;
    Ok(Json(WriteResponse::new(response)))
}

/// Handler for POST `/admin/bookings/{booking_id}/reject` endpoint.
///
/// The body `{ "reason": ... }` is optional.
async fn handle_reject_booking(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, operator): SessionOperator,
    Path(booking_id): Path<String>,
    body: Bytes,
) -> Result<Json<WriteResponse<BookingActionResponse>>, HttpError> {
    let request: RejectBookingRequest = optional_json(&body)?;
    let response: BookingActionResponse = reject_booking(
        &app_state.persistence,
        &booking_id,
        request,
        &actor,
        &operator,
    )?;
    Ok(Json(WriteResponse::new(response)))
}

/// Handler for DELETE `/admin/bookings/{booking_id}` endpoint.
async fn handle_delete_booking(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, operator): SessionOperator,
    Path(booking_id): Path<String>,
) -> Result<Json<WriteResponse<BookingActionResponse>>, HttpError> {
    let response: BookingActionResponse =
        delete_booking(&app_state.persistence, &booking_id, &actor, &operator)?;
    Ok(Json(WriteResponse::new(response)))
}

/// Handler for PATCH `/admin/bookings/{booking_id}` endpoint.
async fn handle_edit_booking(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, operator): SessionOperator,
    Path(booking_id): Path<String>,
    Json(request): Json<EditBookingRequest>,
) -> Result<Json<WriteResponse<BookingActionResponse>>, HttpError> {
    let response: BookingActionResponse = edit_booking(
        &app_state.persistence,
        &booking_id,
        request,
        &actor,
        &operator,
    )?;
    Ok(Json(WriteResponse::new(response)))
}

/// Handler for POST `/admin/seed` endpoint.
///
/// The body `{ "count": ..., "price": ... }` is optional; missing values
/// fall back to the deployment configuration.
async fn handle_seed_tables(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    body: Bytes,
) -> Result<Json<WriteResponse<SeedTablesResponse>>, HttpError> {
    let request: SeedTablesRequest = optional_json(&body)?;
    let response: SeedTablesResponse = seed_tables(
        &app_state.persistence,
        &request,
        app_state.config.table_count,
        app_state.config.table_price,
        &actor,
    )?;
    Ok(Json(WriteResponse::new(response)))
}

/// Handler for POST `/admin/operators` endpoint.
async fn handle_create_operator(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Json(request): Json<CreateOperatorRequest>,
) -> Result<(StatusCode, Json<WriteResponse<CreateOperatorResponse>>), HttpError> {
    let response: CreateOperatorResponse =
        create_operator(&app_state.persistence, request, &actor)?;
    Ok((StatusCode::CREATED, Json(WriteResponse::new(response))))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    let body_limit: usize = app_state.config.body_limit;
    let evidence_dir: Option<PathBuf> = app_state.config.evidence_dir.clone();

    let router: Router<AppState> = Router::new()
        .route("/tables", get(handle_list_tables))
        .route(
            "/bookings",
            post(handle_reserve_booking).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/whoami", get(handle_whoami))
        .route("/admin/bookings", get(handle_list_bookings))
        .route(
            "/admin/bookings/{booking_id}",
            delete(handle_delete_booking).patch(handle_edit_booking),
        )
        .route(
            "/admin/bookings/{booking_id}/approve",
            post(handle_approve_booking),
        )
        .route(
            "/admin/bookings/{booking_id}/reject",
            post(handle_reject_booking),
        )
        .route("/admin/seed", post(handle_seed_tables))
        .route("/admin/operators", post(handle_create_operator));

    let router: Router<AppState> = match evidence_dir {
        Some(dir) => router.nest_service("/evidence", ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Creates any missing tables numbered `1..=count`.
fn seed_capacity(
    persistence: &Persistence,
    count: u32,
    price: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let price: Price = Price::new(i64::try_from(price)?)?;
    let outcome: SeedOutcome = persistence.seed_tables(count, price)?;

    info!(
        count,
        created = outcome.created,
        existing = outcome.existing,
        "Seeded tables"
    );

    Ok(())
}

/// Creates the configured admin operator if a password was supplied.
fn bootstrap_admin(persistence: &Persistence, args: &Args) -> Result<(), PersistenceError> {
    match &args.admin_password {
        Some(password) => {
            AuthenticationService::bootstrap_admin(
                persistence,
                &args.admin_login,
                &args.admin_display_name,
                password,
            )?;
        }
        None if persistence.count_active_admin_operators()? == 0 => {
            warn!("No admin operator exists and no admin password is configured");
        }
        None => {}
    }

    Ok(())
}

/// Selects the slip storage backend.
///
/// Returns the store and, for local storage, the directory to serve.
fn build_evidence_store(
    args: &Args,
) -> Result<(Arc<dyn EvidenceStore>, Option<PathBuf>), Box<dyn std::error::Error>> {
    match (&args.supabase_url, &args.supabase_key) {
        (Some(url), Some(key)) => {
            info!(bucket = %args.supabase_bucket, "Storing payment slips in Supabase Storage");
            Ok((
                Arc::new(SupabaseEvidenceStore::new(
                    url,
                    key.clone(),
                    args.supabase_bucket.clone(),
                )),
                None,
            ))
        }
        (Some(_), None) => Err("--supabase-key is required when --supabase-url is set".into()),
        (None, _) => {
            info!(dir = %args.evidence_dir.display(), "Storing payment slips on local disk");
            Ok((
                Arc::new(LocalEvidenceStore::new(
                    args.evidence_dir.clone(),
                    &args.public_base_url,
                )),
                Some(args.evidence_dir.clone()),
            ))
        }
    }
}

/// Periodically evicts idle rate-limit buckets and expired sessions.
fn spawn_maintenance(
    admission: Arc<dyn AdmissionControl>,
    persistence: Persistence,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker: tokio::time::Interval = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let evicted: usize = admission.evict_idle();
            if evicted > 0 {
                debug!(evicted, "Evicted idle rate-limit buckets");
            }

            match persistence.delete_expired_sessions() {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Deleted expired sessions"),
                Err(e) => warn!(error = %e, "Failed to delete expired sessions"),
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Tablebook Server");

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!(path = %db_path.display(), "Using file-based database");
        Persistence::new_with_file(db_path, args.pool_size)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    seed_capacity(&persistence, args.table_count, args.table_price)?;
    bootstrap_admin(&persistence, &args)?;

    let (store, evidence_dir): (Arc<dyn EvidenceStore>, Option<PathBuf>) =
        build_evidence_store(&args)?;
    let evidence: EvidenceAttachment = EvidenceAttachment::new(store)
        .with_max_bytes(args.max_evidence_bytes)
        .with_timeout(Duration::from_secs(args.upload_timeout_secs));

    let rate_window: Duration = Duration::from_secs(args.rate_window_secs.max(1));
    let admission: Arc<dyn AdmissionControl> = Arc::new(TokenBucketLimiter::new(RateLimitConfig {
        limit: args.rate_limit,
        window: rate_window,
    }));
    let _maintenance: JoinHandle<()> =
        spawn_maintenance(Arc::clone(&admission), persistence.clone(), rate_window);

    let app_state: AppState = AppState {
        persistence,
        evidence: Arc::new(evidence),
        admission,
        config: Arc::new(ServerConfig {
            table_count: args.table_count,
            table_price: args.table_price,
            // Oversized slips still reach validation up to twice the limit.
            body_limit: args.max_evidence_bytes.saturating_mul(2),
            evidence_dir,
        }),
    };

    let app: Router = build_router(app_state);

    let addr: SocketAddr = SocketAddr::new(args.bind, args.port);
    info!(%addr, "Server listening");

    let listener: tokio::net::TcpListener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
