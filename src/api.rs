//! HTTP helpers for JSON APIs with consistent timeouts and error handling. Auth
//! flows use these helpers to avoid duplicating request setup and to enforce a
//! predictable timeout policy. The helpers never store tokens; they only attach
//! the bearer token a caller hands them.

use crate::{config::AppConfig, errors::AppError, APP_USER_AGENT};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

/// Thin wrapper around a configured `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    config: AppConfig,
}

impl ApiClient {
    /// Builds a client with the configured timeout and user agent.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the underlying HTTP client cannot be built.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|err| AppError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Posts JSON and parses the JSON body regardless of the status code.
    ///
    /// Auth endpoints answer rejections with an envelope such as
    /// `{"success": false, "error": "..."}` on a 4xx status, so the body is the
    /// source of truth. Only an unparseable body on a failed status becomes
    /// `AppError::Http`.
    ///
    /// # Errors
    /// Returns an error on transport failure or when no JSON can be decoded.
    #[instrument(skip(self, body, bearer))]
    pub async fn post_json_envelope<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&SecretString>,
    ) -> Result<T, AppError> {
        let url = self.config.endpoint(path);
        let request = with_bearer(self.http.post(&url).json(body), bearer);
        let response = request.send().await.map_err(map_request_error)?;

        handle_envelope_response(response).await
    }

    /// Fetches JSON with a bearer token, treating any non-2xx status as an error.
    ///
    /// # Errors
    /// Returns `AppError::Http` for failed statuses and transport/parse errors otherwise.
    #[instrument(skip(self, bearer))]
    pub async fn get_json_with_bearer<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: &SecretString,
    ) -> Result<T, AppError> {
        let url = self.config.endpoint(path);
        let request = with_bearer(self.http.get(&url), Some(bearer));
        let response = request.send().await.map_err(map_request_error)?;

        handle_json_response(response).await
    }

    /// Posts an empty body with an optional bearer token, used to end a session.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-2xx status.
    #[instrument(skip(self, bearer))]
    pub async fn post_empty_with_bearer(
        &self,
        path: &str,
        bearer: Option<&SecretString>,
    ) -> Result<(), AppError> {
        let url = self.config.endpoint(path);
        let request = with_bearer(self.http.post(&url), bearer);
        let response = request.send().await.map_err(map_request_error)?;

        handle_empty_response(response).await
    }
}

fn with_bearer(builder: RequestBuilder, bearer: Option<&SecretString>) -> RequestBuilder {
    match bearer {
        Some(token) => builder.bearer_auth(token.expose_secret()),
        None => builder,
    }
}

/// Maps transport errors into `AppError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        AppError::Serialization(format!("Failed to build request: {err}"))
    } else {
        AppError::Network(format!("Unable to reach the server: {err}"))
    }
}

async fn handle_envelope_response<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| AppError::Parse(format!("Failed to read response: {err}")))?;

    match serde_json::from_str::<T>(&body) {
        Ok(parsed) => Ok(parsed),
        Err(err) if status.is_success() => {
            Err(AppError::Parse(format!("Failed to decode response: {err}")))
        }
        Err(err) => {
            debug!("undecodable error body ({status}): {err}");
            Err(AppError::Http {
                status: status.as_u16(),
                message: sanitize_body(&body),
            })
        }
    }
}

/// Parses JSON responses and surfaces HTTP errors with sanitized bodies.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let status = response.status();
    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::Parse(format!("Failed to decode response: {err}")))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Http {
            status: status.as_u16(),
            message: sanitize_body(&body),
        })
    }
}

/// Handles empty responses and returns sanitized HTTP errors when needed.
async fn handle_empty_response(response: Response) -> Result<(), AppError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Http {
            status: status.as_u16(),
            message: sanitize_body(&body),
        })
    }
}

/// Sanitizes HTTP error bodies for user-facing messages by trimming and truncating.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
