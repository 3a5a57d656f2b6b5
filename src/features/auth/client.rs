//! Client wrappers for the platform's auth endpoints. These helpers centralize
//! paths and bearer handling so the state machine never builds requests itself.

use super::types::{ApiEnvelope, Credentials, Registration};
use crate::{api::ApiClient, config::AppConfig, errors::AppError};
use secrecy::SecretString;
use serde_json::Value;

#[derive(Clone, Debug)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    /// # Errors
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            api: ApiClient::new(config)?,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        self.api.config()
    }

    /// Submits credentials. The password is exposed only while encoding the body.
    ///
    /// # Errors
    /// Returns an error on transport failure or an undecodable response.
    pub async fn login(&self, credentials: &Credentials) -> Result<ApiEnvelope<Value>, AppError> {
        let path = &self.config().login_path;
        self.api
            .post_json_envelope(path, &credentials.to_body(), None)
            .await
    }

    /// Creates an account; answers with the same envelope as `login`.
    ///
    /// # Errors
    /// Returns an error on transport failure or an undecodable response.
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<ApiEnvelope<Value>, AppError> {
        let path = &self.config().register_path;
        self.api
            .post_json_envelope(path, &registration.to_body(), None)
            .await
    }

    /// Fetches the identity behind `token` ("who am I").
    ///
    /// # Errors
    /// Returns `AppError::Http` for non-2xx statuses and transport/parse errors otherwise.
    pub async fn me(&self, token: &SecretString) -> Result<ApiEnvelope<Value>, AppError> {
        let path = &self.config().me_path;
        self.api.get_json_with_bearer(path, token).await
    }

    /// Tells the server the session ended. Servers without a logout endpoint
    /// answer 404, which callers ignore.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-2xx status.
    pub async fn logout(&self, token: Option<&SecretString>) -> Result<(), AppError> {
        let path = &self.config().logout_path;
        self.api.post_empty_with_bearer(path, token).await
    }
}
