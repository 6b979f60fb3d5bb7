// crates/spine-server/src/server.rs
// ============================================================================
// Module: Spine HTTP Server
// Description: HTTP API surface for narrative load, decisions, and bundles.
// Purpose: Route every request through the core engine with explicit wiring.
// Dependencies: axum, spine-broker, spine-core, spine-store-sqlite, tokio
// ============================================================================

//! ## Overview
//! The server exposes three routes backed by one [`Spine`] engine instance:
//! `GET /v1/threads/{thread_id}/narrative`, `POST /v1/spine/decisions`, and
//! `GET /v1/proof-bundles/{bundle_id}`. Reviewer and rationale constraints
//! are re-validated server-side by construction because submission goes
//! through the engine. Engine calls may block (narrative sources use a
//! blocking HTTP client), so handlers run them on the blocking pool.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use serde::Deserialize;
use serde::Serialize;
use spine_broker::FileNarrativeSource;
use spine_broker::HttpNarrativeSource;
use spine_broker::LogTelemetrySink;
use spine_core::NoopTelemetry;
use spine_core::ProofBundleId;
use spine_core::SharedNarrativeSource;
use spine_core::SharedProofBundleStore;
use spine_core::SharedTelemetrySink;
use spine_core::Spine;
use spine_core::SpineDecision;
use spine_core::SpineError;
use spine_core::ThreadId;
use spine_core::Timestamp;
use spine_core::runtime::InMemoryProofBundleStore;
use spine_store_sqlite::SqliteProofBundleStore;
use thiserror::Error;

use crate::config::ConfigError;
use crate::config::NarrativeSection;
use crate::config::ServerConfig;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server construction and serving errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Proof bundle store could not be opened.
    #[error("failed to open proof bundle store: {0}")]
    Store(String),
    /// Narrative source could not be constructed.
    #[error("failed to construct narrative source: {0}")]
    Source(String),
    /// Telemetry sink could not be constructed.
    #[error("failed to construct telemetry sink: {0}")]
    Telemetry(String),
    /// Listener or serving I/O failed.
    #[error("server io error: {0}")]
    Io(String),
    /// A blocking engine task was cancelled.
    #[error("engine task cancelled: {0}")]
    TaskCancelled(String),
}

// ============================================================================
// SECTION: Application State
// ============================================================================

/// Engine type assembled from shared trait-object wrappers.
pub type EngineSpine = Spine<SharedNarrativeSource, SharedProofBundleStore, SharedTelemetrySink>;

/// Shared application state handed to every handler.
pub struct AppState {
    /// The decision engine.
    spine: EngineSpine,
}

impl AppState {
    /// Creates application state around an assembled engine.
    #[must_use]
    pub const fn new(spine: EngineSpine) -> Self {
        Self {
            spine,
        }
    }

    /// Returns a reference to the engine.
    #[must_use]
    pub const fn spine(&self) -> &EngineSpine {
        &self.spine
    }
}

/// Builds application state from a validated configuration.
///
/// # Errors
///
/// Returns [`ServerError`] when a collaborator cannot be constructed.
pub fn build_state(config: &ServerConfig) -> Result<Arc<AppState>, ServerError> {
    let source = match &config.narrative {
        NarrativeSection::Dir {
            root,
        } => SharedNarrativeSource::from_source(FileNarrativeSource::new(root.clone())),
        NarrativeSection::Http {
            base_url,
        } => SharedNarrativeSource::from_source(
            HttpNarrativeSource::new(base_url).map_err(|err| ServerError::Source(err.to_string()))?,
        ),
    };

    let store = match &config.store.path {
        Some(path) => SharedProofBundleStore::from_store(
            SqliteProofBundleStore::open(path).map_err(|err| ServerError::Store(err.to_string()))?,
        ),
        None => SharedProofBundleStore::from_store(InMemoryProofBundleStore::new()),
    };

    let telemetry = match &config.telemetry.log_path {
        Some(path) => {
            let file: File = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| ServerError::Telemetry(err.to_string()))?;
            SharedTelemetrySink::from_sink(LogTelemetrySink::new(file))
        }
        None => SharedTelemetrySink::from_sink(NoopTelemetry),
    };

    Ok(Arc::new(AppState::new(Spine::new(source, store, telemetry))))
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Decision submission request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    /// The operator decision.
    pub decision: SpineDecision,
    /// Explicit submission timestamp supplied by the caller.
    pub decided_at: Timestamp,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable error code.
    pub code: String,
    /// Human-readable error message.
    pub error: String,
}

/// Maps an engine error to its HTTP status and stable code.
#[must_use]
pub fn map_spine_error(err: &SpineError) -> (StatusCode, ErrorBody) {
    let (status, code) = match err {
        SpineError::ValidationFailed(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_failed"),
        SpineError::PolicyBindingMismatch {
            ..
        } => (StatusCode::CONFLICT, "policy_binding_mismatch"),
        SpineError::DecisionInFlight(_) => (StatusCode::CONFLICT, "decision_in_flight"),
        SpineError::ThreadNotReady(_) => (StatusCode::CONFLICT, "thread_not_ready"),
        SpineError::StaleLoad(_) => (StatusCode::CONFLICT, "stale_load"),
        SpineError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        SpineError::FetchFailed(_) => (StatusCode::BAD_GATEWAY, "fetch_failed"),
        SpineError::PersistenceFailed(_) => (StatusCode::BAD_GATEWAY, "persistence_failed"),
        SpineError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
    };
    (
        status,
        ErrorBody {
            code: code.to_string(),
            error: err.to_string(),
        },
    )
}

/// Renders an engine result as an HTTP response.
fn respond<T: Serialize>(result: Result<T, SpineError>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(err) => {
            let (status, body) = map_spine_error(&err);
            (status, Json(body)).into_response()
        }
    }
}

/// Runs a blocking engine call on the blocking pool.
async fn run_engine<T, F>(task: F) -> Result<T, SpineError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, SpineError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| SpineError::Internal(err.to_string()))?
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Loads the narrative for a thread, entering the decidable state.
async fn get_narrative(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> Response {
    let result =
        run_engine(move || state.spine.open_thread(&ThreadId::new(thread_id))).await;
    respond(result)
}

/// Submits a decision and returns its attestation result.
async fn post_decision(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DecisionRequest>,
) -> Response {
    let result = run_engine(move || {
        state.spine.submit_decision(&request.decision, request.decided_at)
    })
    .await;
    respond(result)
}

/// Loads a persisted proof bundle for audit display.
async fn get_proof_bundle(
    State(state): State<Arc<AppState>>,
    Path(bundle_id): Path<String>,
) -> Response {
    let result =
        run_engine(move || state.spine.open_proof(&ProofBundleId::new(bundle_id))).await;
    respond(result)
}

// ============================================================================
// SECTION: Router and Server
// ============================================================================

/// Builds the API router over shared application state.
#[must_use]
pub fn router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/v1/threads/{thread_id}/narrative", get(get_narrative))
        .route("/v1/spine/decisions", post(post_decision))
        .route("/v1/proof-bundles/{bundle_id}", get(get_proof_bundle))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Bound Spine server ready to serve.
pub struct SpineServer {
    /// Assembled router.
    app: Router,
    /// Bound listener.
    listener: tokio::net::TcpListener,
}

impl SpineServer {
    /// Builds state and binds the configured listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when state construction or binding fails.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;
        let state = build_state(config)?;
        let app = router(state, config.server.max_body_bytes);
        let listener = tokio::net::TcpListener::bind(config.server.bind_addr)
            .await
            .map_err(|err| ServerError::Io(err.to_string()))?;
        Ok(Self {
            app,
            listener,
        })
    }

    /// Returns the bound local address.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Io`] when the listener address is unavailable.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(|err| ServerError::Io(err.to_string()))
    }

    /// Serves requests until the process is stopped.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Io`] when serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        axum::serve(self.listener, self.app)
            .await
            .map_err(|err| ServerError::Io(err.to_string()))
    }
}
