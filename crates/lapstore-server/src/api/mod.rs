mod products;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use lapstore_admin::Catalog;
use lapstore_core::{CatalogError, CatalogStats, FreeGift, GalleryLimits, UploadError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    request_id, require_bearer_auth, AuthState, RequestId, REQUEST_ID_HEADER,
};

/// Multipart overhead allowed on top of the raw image bytes.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub gifts: Arc<Vec<FreeGift>>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

#[derive(Debug, Serialize)]
struct StatsData {
    #[serde(flatten)]
    counts: CatalogStats,
    laptop_percent: u32,
    accessory_percent: u32,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                details: None,
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "image_rejected" => StatusCode::UNPROCESSABLE_ENTITY,
            "upload_failed" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> usize {
    usize::try_from(limit.unwrap_or(50).clamp(1, 200)).unwrap_or(50)
}

/// Converts a workflow failure into the API error envelope. Backend details
/// were already logged by the catalog and are not echoed to the client.
pub(super) fn map_catalog_error(request_id: String, error: &CatalogError) -> ApiError {
    let code = match error {
        CatalogError::Validation(_) => "validation_error",
        CatalogError::Upload(UploadError::Rejected(_)) => "image_rejected",
        CatalogError::Upload(_) => "upload_failed",
        CatalogError::NotFound(_) => "not_found",
        CatalogError::Cancelled => "conflict",
        CatalogError::Persistence(_) => "internal_error",
    };
    ApiError::new(request_id, code, error.user_message())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            REQUEST_ID_HEADER,
        ])
}

fn body_limit(limits: GalleryLimits) -> usize {
    limits
        .max_file_bytes
        .saturating_mul(limits.max_images)
        .saturating_add(FORM_OVERHEAD_BYTES)
}

fn protected_router(auth: AuthState, limits: GalleryLimits) -> Router<AppState> {
    Router::new()
        .route("/api/v1/products", axum::routing::post(products::create_product))
        .route(
            "/api/v1/products/{id}",
            axum::routing::put(products::update_product).delete(products::delete_product),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                ))
                .layer(DefaultBodyLimit::max(body_limit(limits))),
        )
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    let limits = state.catalog.settings().gallery_limits;
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/products", get(products::list_products))
        .route("/api/v1/products/{id}", get(products::get_product))
        .route("/api/v1/stats", get(stats))
        .route("/api/v1/gifts", get(list_gifts));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, limits))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match state.catalog.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

async fn stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<StatsData>>, ApiError> {
    let counts = state
        .catalog
        .stats()
        .await
        .map_err(|e| map_catalog_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: StatsData {
            counts,
            laptop_percent: counts.laptop_percent(),
            accessory_percent: counts.accessory_percent(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

async fn list_gifts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<FreeGift>>> {
    Json(ApiResponse {
        data: state.gifts.as_ref().clone(),
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
