use std::{collections::HashSet, sync::Arc};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::api::ApiError;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest client-supplied request id echoed back; longer ones are replaced.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlation id for one request, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    fn from_headers(headers: &HeaderMap) -> Self {
        let supplied = headers
            .get(&REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN);
        Self(supplied.map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned))
    }
}

/// Admin keys accepted on the product write routes.
///
/// An empty key set leaves the write routes open; configuration loading only
/// allows that in development.
#[derive(Debug, Clone)]
pub struct AuthState {
    admin_keys: Arc<HashSet<String>>,
}

impl AuthState {
    #[must_use]
    pub fn from_keys(keys: &[String]) -> Self {
        let admin_keys: HashSet<String> = keys
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        if admin_keys.is_empty() {
            tracing::warn!(
                "LAPSTORE_ADMIN_API_KEYS not set; product write routes are unauthenticated"
            );
        }

        Self {
            admin_keys: Arc::new(admin_keys),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.admin_keys.is_empty()
    }

    fn admits(&self, headers: &HeaderMap) -> bool {
        !self.is_enabled()
            || bearer_token(headers.get(AUTHORIZATION))
                .is_some_and(|token| self.admin_keys.contains(token))
    }
}

/// Attaches a [`RequestId`] to the request and echoes it on the response.
///
/// A sane `x-request-id` from the client is reused, anything else gets a
/// fresh `UUIDv4`.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = RequestId::from_headers(req.headers());
    let header = HeaderValue::from_str(&id.0).ok();
    req.extensions_mut().insert(id);

    let mut res = next.run(req).await;
    if let Some(value) = header {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

/// Rejects write requests without a configured admin key, using the same
/// error envelope as the handlers.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if auth.admits(req.headers()) {
        return next.run(req).await;
    }

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    tracing::debug!(%request_id, path = %req.uri().path(), "rejected unauthenticated write");
    ApiError::new(request_id, "unauthorized", "missing or invalid admin key").into_response()
}

fn bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    let (scheme, token) = value?.to_str().ok()?.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
