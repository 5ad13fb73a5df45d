use crate::error::ApiError;
use crate::http::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use common::API_KEY_HEADER;
use std::collections::HashSet;
use std::sync::Arc;

/// Keys accepted on protected routes. Fixed for the life of the process.
#[derive(Clone, Debug, Default)]
pub struct ApiKeys {
    keys: Arc<HashSet<String>>,
}

impl ApiKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = keys
            .into_iter()
            .map(Into::into)
            .map(|k: String| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keys: Arc::new(keys) }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Rejects the request with 401 unless it carries an accepted key.
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorized = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|key| state.api_keys.contains(key))
        .unwrap_or(false);

    if !authorized {
        tracing::warn!(
            method = %req.method(),
            path = %req.uri().path(),
            "rejected request without a valid API key"
        );
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(req).await)
}
