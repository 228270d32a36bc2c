//! HTTP transport beneath the request gateway.
//!
//! SYSTEM CONTEXT
//! ==============
//! The gateway only knows the [`Transport`] trait. [`HttpTransport`] is the
//! shipped implementation; it may run before any component renders, so it
//! reads the bearer token through `SessionBridge`, never through a hook.
//!
//! TRADE-OFFS
//! ==========
//! Futures are `?Send`: in the browser every request runs on the single UI
//! thread and `reqwest`'s wasm futures are not `Send`.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use async_trait::async_trait;
use serde_json::Value;

use super::RequestError;
use crate::bridge::SessionBridge;
use crate::util::late_bound::LateBound;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether params travel in the query string rather than a JSON body.
    #[must_use]
    pub fn uses_query(self) -> bool {
        matches!(self, Self::Get | Self::Delete)
    }
}

/// One logical API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Path relative to the API base URL, e.g. `/users`.
    pub path: String,
    pub params: Value,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>, params: Value) -> Self {
        Self { method, path: path.into(), params }
    }

    pub fn get(path: impl Into<String>, params: Value) -> Self {
        Self::new(HttpMethod::Get, path, params)
    }

    pub fn post(path: impl Into<String>, params: Value) -> Self {
        Self::new(HttpMethod::Post, path, params)
    }

    pub fn put(path: impl Into<String>, params: Value) -> Self {
        Self::new(HttpMethod::Put, path, params)
    }

    pub fn delete(path: impl Into<String>, params: Value) -> Self {
        Self::new(HttpMethod::Delete, path, params)
    }
}

#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: &ApiRequest) -> Result<Value, RequestError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    session: LateBound<SessionBridge>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, session: LateBound<SessionBridge>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            session,
        }
    }

    fn url_for(&self, request: &ApiRequest) -> String {
        join_url(&self.base_url, &request.path)
    }

    fn bearer_token(&self) -> Option<String> {
        self.session.with(SessionBridge::token).flatten()
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Value, RequestError> {
        let url = self.url_for(request);
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };
        builder = if request.method.uses_query() {
            builder.query(&query_pairs(&request.params))
        } else {
            builder.json(&request.params)
        };
        builder = builder.header(REQUEST_ID_HEADER, uuid::Uuid::new_v4().to_string());
        if let Some(token) = self.bearer_token() {
            builder = builder.bearer_auth(token);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| RequestError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RequestError::Server { status: status.as_u16(), message: error_message(&body) });
        }
        let body = resp
            .text()
            .await
            .map_err(|e| RequestError::Network(e.to_string()))?;
        parse_body(&body).map_err(|message| RequestError::Server { status: status.as_u16(), message })
    }
}

// =============================================================================
// HELPERS
// =============================================================================

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Flatten a params object into query pairs. Non-objects and nulls yield nothing.
pub(crate) fn query_pairs(params: &Value) -> Vec<(String, String)> {
    let Value::Object(map) = params else {
        return Vec::new();
    };
    map.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}

/// Empty bodies (204 and friends) become `null`.
pub(crate) fn parse_body(body: &str) -> Result<Value, String> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| format!("invalid response body: {e}"))
}

/// Prefer a JSON `{"message": ...}` / `{"error": ...}` field over the raw body.
pub(crate) fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("message").or_else(|| v.get("error")))
        .and_then(Value::as_str)
        .map_or_else(|| body.trim().to_owned(), str::to_owned)
}
