// 🌐 HTTP API - entries endpoint plus summary, export and login helpers

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

use crate::aggregate::{summarize, FilterSet};
use crate::auth::{AccessContext, AccessPolicy};
use crate::entry::Entry;
use crate::error::ServiceError;
use crate::export::{to_json, EXPORT_FILE_NAME};
use crate::service::EntryService;
use crate::store::EntryStore;

pub type DynStore = Box<dyn EntryStore>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    service: Arc<EntryService<DynStore>>,
    policy: Arc<AccessPolicy>,
}

impl AppState {
    pub fn new(store: DynStore, policy: AccessPolicy) -> Self {
        Self {
            service: Arc::new(EntryService::new(store)),
            policy: Arc::new(policy),
        }
    }

    /// Caller context from `Authorization: Bearer <password>`
    fn access(&self, headers: &HeaderMap) -> AccessContext {
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        self.policy.authorize(presented)
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Serialize)]
struct EntriesResponse {
    entries: Vec<Entry>,
}

#[derive(Serialize)]
struct UpdateResponse {
    success: bool,
    entries: Vec<Entry>,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

fn error_response(status: StatusCode, error: &'static str) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

/// POST body for /api/entries
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum UpdateRequest {
    Save { entry: Entry },
    Delete { id: String },
}

#[derive(Deserialize)]
struct LoginRequest {
    password: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/entries - Full collection
async fn list_entries(State(state): State<AppState>) -> Response {
    match state.service.list() {
        Ok(entries) => (StatusCode::OK, Json(EntriesResponse { entries })).into_response(),
        Err(e) => {
            error!(error = %e, "failed to fetch entries");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch entries")
        }
    }
}

/// POST /api/entries - Save or delete one entry
async fn update_entries(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<UpdateRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection, "rejected entries update body");
            return error_response(StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    let ctx = state.access(&headers);
    let result = match request {
        UpdateRequest::Save { entry } => state.service.save(&ctx, entry),
        UpdateRequest::Delete { id } => state.service.delete(&ctx, &id),
    };

    match result {
        Ok(entries) => (
            StatusCode::OK,
            Json(UpdateResponse {
                success: true,
                entries,
            }),
        )
            .into_response(),
        Err(ServiceError::Unauthorized) => {
            warn!("entries update without admin access");
            error_response(StatusCode::UNAUTHORIZED, "Unauthorized")
        }
        Err(e) => {
            error!(error = %e, "failed to update entries");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update entries")
        }
    }
}

/// Any other method on /api/entries
async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// GET /api/summary - Facets, total and breakdown for the given filters
async fn get_summary(State(state): State<AppState>, Query(filters): Query<FilterSet>) -> Response {
    match state.service.list() {
        Ok(entries) => (StatusCode::OK, Json(summarize(&entries, &filters))).into_response(),
        Err(e) => {
            error!(error = %e, "failed to build summary");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch entries")
        }
    }
}

/// GET /api/export - Raw collection as a downloadable JSON file
async fn export_entries(State(state): State<AppState>) -> Response {
    let json = match state.service.list().map_err(anyhow::Error::from).and_then(|e| to_json(&e)) {
        Ok(json) => json,
        Err(e) => {
            error!(error = %e, "failed to export entries");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch entries");
        }
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
        ],
        json,
    )
        .into_response()
}

/// POST /api/login - Check the shared admin password
async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = body else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid request body");
    };

    if state.policy.authorize(Some(&request.password)).is_admin() {
        (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
    } else {
        error_response(StatusCode::UNAUTHORIZED, "Incorrect password")
    }
}

/// API routes, to be nested under `/api`
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/entries",
            get(list_entries)
                .post(update_entries)
                // GET routes answer HEAD unless it is claimed explicitly
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .route("/summary", get(get_summary))
        .route("/export", get(export_entries))
        .route("/login", post(login))
        .with_state(state)
}
