//! HTTP request core.
//!
//! [`ApiClient`] is the single chokepoint for outbound calls. Every request
//! carries `Content-Type: application/json` and the CSRF header read from the
//! cookie jar, and every response is normalized the same way regardless of
//! endpoint:
//!
//! - success status: the body parsed as JSON, or `{}` when the body is empty
//!   or not JSON
//! - any other status: an [`ApqpError`] whose message is the body's `error`
//!   field when present, else `HTTP error <status>`
//! - transport failure: an [`ApqpError`] wrapping the `reqwest` error
//!
//! Failures are logged before they are returned.

use std::fmt;
use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{CONTENT_TYPE, REFERER};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{ApiConfig, AuthConfig};
use crate::error::{ApqpError, Result};
use crate::telemetry::{RequestMetrics, SensitiveFieldRedactor};

/// HTTP methods the backend API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Only POST and PUT attach a request body.
    pub const fn carries_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Status and final URL of a non-JSON page request (login/logout).
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: u16,
    /// URL after redirects were followed.
    pub url: Url,
}

impl PageResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client for the quality-management API.
///
/// Cheap to clone; clones share the connection pool and cookie jar.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    base: Url,
    cookies: Arc<Jar>,
    csrf_cookie: String,
    csrf_header: String,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("csrf_cookie", &self.csrf_cookie)
            .field("csrf_header", &self.csrf_header)
            .finish()
    }
}

impl ApiClient {
    /// Create a client with default settings pointing at the given base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let api = ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        };
        Self::from_config(&api, &AuthConfig::default())
    }

    pub fn from_config(api: &ApiConfig, auth: &AuthConfig) -> Result<Self> {
        let base_url = api.base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url).map_err(|e| ApqpError::invalid_url(&base_url, e))?;
        let cookies = Arc::new(Jar::default());

        let http = reqwest::Client::builder()
            .timeout(api.timeout)
            .user_agent(api.user_agent.as_str())
            .cookie_provider(cookies.clone())
            .build()?;

        Ok(Self {
            http,
            base_url,
            base,
            cookies,
            csrf_cookie: auth.csrf_cookie.clone(),
            csrf_header: auth.csrf_header.clone(),
        })
    }

    /// Return the configured base URL (without trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve an endpoint path against the base URL.
    pub fn url(&self, endpoint: &str) -> Result<Url> {
        let full = format!("{}{}", self.base_url, endpoint);
        Url::parse(&full).map_err(|e| ApqpError::invalid_url(&full, e))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cookies
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a `Set-Cookie`-style cookie for the backend origin.
    pub fn add_cookie(&self, cookie: &str) {
        self.cookies.add_cookie_str(cookie, &self.base);
    }

    /// Current `name=value` cookie pairs for the backend origin.
    pub fn cookies(&self) -> Vec<String> {
        self.cookies
            .cookies(&self.base)
            .and_then(|header| header.to_str().ok().map(str::to_string))
            .map(|raw| {
                raw.split(';')
                    .map(str::trim)
                    .filter(|pair| !pair.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The CSRF token from the configured cookie, if the backend has set one.
    pub fn csrf_token(&self) -> Option<String> {
        self.cookies().into_iter().find_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            (name == self.csrf_cookie).then(|| value.to_string())
        })
    }

    fn with_csrf(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.csrf_token() {
            Some(token) => builder.header(self.csrf_header.as_str(), token),
            None => builder,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // JSON API
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue one API request and normalize the response.
    ///
    /// `body` is sent only for POST and PUT.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.url(endpoint).map_err(|e| {
            e.log();
            e
        })?;

        let csrf = self.csrf_token();
        let mut builder = self
            .with_csrf(self.http.request(method.into(), url))
            .header(CONTENT_TYPE, "application/json");

        if method.carries_body() {
            if let Some(body) = body {
                builder = builder.body(serde_json::to_vec(body)?);
            }
        }

        let redactor = SensitiveFieldRedactor::global();
        debug!(
            method = method.as_str(),
            endpoint = %redactor.redact_value(endpoint),
            csrf = ?csrf.map(|token| redactor.redact(&self.csrf_header, &token)),
            "Sending API request"
        );

        let timer = RequestMetrics::start(method.as_str());
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                timer.finish(None);
                let error = ApqpError::network(e).with_endpoint(endpoint);
                error.log();
                return Err(error);
            }
        };

        let status = response.status();
        timer.finish(Some(status.as_u16()));

        // An unreadable body is treated like an unparseable one.
        let body = response.bytes().await.ok();
        normalize_response(status, body.as_deref().unwrap_or_default()).map_err(|e| {
            let error = e.with_endpoint(endpoint);
            error.log();
            error
        })
    }

    /// Issue a request and decode the normalized payload into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let value = self.request(method, endpoint, body).await?;
        decode(value, endpoint)
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request_as(Method::Get, endpoint, None).await
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.request_as(Method::Post, endpoint, Some(&body)).await
    }

    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.request_as(Method::Put, endpoint, Some(&body)).await
    }

    /// DELETE an endpoint; the (usually empty) response payload is discarded.
    pub async fn delete(&self, endpoint: &str) -> Result<()> {
        self.request(Method::Delete, endpoint, None).await.map(|_| ())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session pages (outside the JSON API)
    // ─────────────────────────────────────────────────────────────────────────

    /// GET a page, following redirects. Used to obtain the CSRF cookie.
    pub async fn fetch_page(&self, endpoint: &str) -> Result<PageResponse> {
        let url = self.url(endpoint)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApqpError::network(e).with_endpoint(endpoint))?;

        Ok(PageResponse {
            status: response.status().as_u16(),
            url: response.url().clone(),
        })
    }

    /// POST a form-encoded body with the CSRF header, following redirects.
    ///
    /// An empty `form` sends no body.
    pub async fn submit_form(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<PageResponse> {
        let url = self.url(endpoint)?;
        let mut builder = self
            .with_csrf(self.http.post(url))
            .header(REFERER, self.base.as_str());
        if !form.is_empty() {
            builder = builder.form(form);
        }

        debug!(
            endpoint = endpoint,
            form = %redacted_form(form),
            "Submitting form"
        );

        let response = builder
            .send()
            .await
            .map_err(|e| ApqpError::network(e).with_endpoint(endpoint))?;

        Ok(PageResponse {
            status: response.status().as_u16(),
            url: response.url().clone(),
        })
    }
}

/// Normalize a completed response into a JSON value or an error.
pub fn normalize_response(status: StatusCode, body: &[u8]) -> Result<Value> {
    if status.is_success() {
        return Ok(serde_json::from_slice(body).unwrap_or_else(|_| Value::Object(Map::new())));
    }

    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string));

    Err(ApqpError::http_status(status.as_u16(), message))
}

/// Decode a normalized payload into `T`, failing with a `Decode` error.
pub fn decode<T: DeserializeOwned>(value: Value, endpoint: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        let error = ApqpError::decode(short_type_name::<T>(), e).with_endpoint(endpoint);
        error.log();
        error
    })
}

/// `key=value&...` rendering of a form for logs, with sensitive fields masked.
fn redacted_form(form: &[(&str, &str)]) -> String {
    let redactor = SensitiveFieldRedactor::global();
    form.iter()
        .map(|(key, value)| format!("{}={}", key, redactor.redact(key, value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Outer type name without module path or generic arguments
/// (`ListPayload` for `apqp_core::models::page::ListPayload<...>`).
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let outer = full.split('<').next().unwrap_or(full);
    outer.rsplit("::").next().unwrap_or(outer)
}
