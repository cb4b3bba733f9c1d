//! HTTP client for the FinSense backend.
//!
//! Wraps every network call, attaching the stored bearer token where the
//! backend expects one and converting failures into [`ApiError`]s. On any
//! authentication-failure response the stored session is erased before the
//! error propagates, so a rejected token can never go stale on disk.
//!
//! The token-attach step ([`ApiClient::bearer`]) and the failure cleanup
//! ([`ApiClient::on_auth_failure`]) are explicit methods rather than hidden
//! global hooks, so each can be exercised in isolation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::endpoints;
use super::error::{ApiError, ApiErrorKind};
use super::types::{BudgetReport, ChatReply, TokenGrant, UserProfile};
use crate::config::Config;
use crate::session::store::SessionStore;

/// Default base URL of the backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// API client with per-operation-class timeouts.
pub struct ApiClient {
    base_url: String,
    store_path: PathBuf,
    http: reqwest::Client,
    auth_timeout: Duration,
    chat_timeout: Duration,
    budget_timeout: Duration,
}

impl ApiClient {
    /// Creates a client from config, using the default session store path.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_store_path(config, SessionStore::default_path())
    }

    /// Creates a client with an explicit session store path.
    pub fn with_store_path(config: &Config, store_path: PathBuf) -> Result<Self> {
        let base_url = Self::resolve_base_url(&config.base_url)?;

        Ok(Self {
            base_url,
            store_path,
            http: reqwest::Client::new(),
            auth_timeout: config.auth_timeout(),
            chat_timeout: config.chat_timeout(),
            budget_timeout: config.budget_timeout(),
        })
    }

    /// Resolves the base URL with precedence: env > config > default.
    /// Validates that the URL is well-formed.
    fn resolve_base_url(config_base_url: &str) -> Result<String> {
        if let Ok(env_url) = std::env::var("FINSENSE_BASE_URL") {
            let trimmed = env_url.trim();
            if !trimmed.is_empty() {
                Self::validate_url(trimmed)?;
                return Ok(trimmed.to_string());
            }
        }

        let trimmed = config_base_url.trim();
        if !trimmed.is_empty() {
            Self::validate_url(trimmed)?;
            return Ok(trimmed.to_string());
        }

        Ok(DEFAULT_BASE_URL.to_string())
    }

    /// Validates that a URL is well-formed.
    fn validate_url(url: &str) -> Result<()> {
        url::Url::parse(url).with_context(|| format!("Invalid backend base URL: {}", url))?;
        Ok(())
    }

    /// Returns the path of the session store this client reads from.
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    // --- operations ------------------------------------------------------

    /// Signs in with username/password. Unauthenticated; the caller owns
    /// persisting the returned token.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenGrant, ApiError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::validation("username and password are required"));
        }

        tracing::debug!(path = endpoints::LOGIN, "login request");
        let response = self
            .http
            .post(self.url(endpoints::LOGIN))
            .timeout(self.auth_timeout)
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .map_err(Self::classify_send_error)?;

        self.decode(response).await
    }

    /// Creates an account. Unauthenticated; returns the backend's user record.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        full_name: &str,
        password: &str,
    ) -> Result<UserProfile, ApiError> {
        let email = email.trim();
        let username = username.trim();
        let full_name = full_name.trim();
        if email.is_empty() || username.is_empty() || full_name.is_empty() || password.is_empty() {
            return Err(ApiError::validation(
                "email, username, full name, and password are required",
            ));
        }

        tracing::debug!(path = endpoints::REGISTER, "register request");
        let response = self
            .http
            .post(self.url(endpoints::REGISTER))
            .timeout(self.auth_timeout)
            .json(&serde_json::json!({
                "email": email,
                "username": username,
                "full_name": full_name,
                "password": password,
            }))
            .send()
            .await
            .map_err(Self::classify_send_error)?;

        self.decode(response).await
    }

    /// Fetches the signed-in user record. Requires a stored token.
    pub async fn get_profile(&self) -> Result<UserProfile, ApiError> {
        let Some(token) = self.stored_token() else {
            return Err(ApiError::auth("not signed in"));
        };

        tracing::debug!(path = endpoints::PROFILE, "profile request");
        let response = self
            .http
            .get(self.url(endpoints::PROFILE))
            .timeout(self.auth_timeout)
            .bearer_auth(token)
            .send()
            .await
            .map_err(Self::classify_send_error)?;

        self.decode(response).await
    }

    /// Asks the assistant a question. Anonymous questions are allowed;
    /// protected questions come back as an auth failure.
    pub async fn send_message(&self, text: &str) -> Result<ChatReply, ApiError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ApiError::validation("question must not be empty"));
        }

        tracing::debug!(path = endpoints::CHAT, "chat request");
        let request = self
            .http
            .post(self.url(endpoints::CHAT))
            .timeout(self.chat_timeout)
            .json(&serde_json::json!({ "text": text }));

        let response = self
            .bearer(request)
            .send()
            .await
            .map_err(Self::classify_send_error)?;

        self.decode(response).await
    }

    /// Uploads transaction statements and generates a budget forecast.
    /// Authenticated-only; the heaviest operation, with the longest timeout.
    pub async fn predict_budget(
        &self,
        files: &[PathBuf],
        income: &str,
        savings_target: &str,
    ) -> Result<BudgetReport, ApiError> {
        if files.is_empty() {
            return Err(ApiError::validation(
                "at least one statement file is required",
            ));
        }
        let income = income.trim();
        let savings_target = savings_target.trim();
        if income.parse::<f64>().is_err() {
            return Err(ApiError::validation("income must be a number"));
        }
        if savings_target.parse::<f64>().is_err() {
            return Err(ApiError::validation("savings target must be a number"));
        }
        let Some(token) = self.stored_token() else {
            return Err(ApiError::auth("budget forecasting requires signing in"));
        };

        let mut form = reqwest::multipart::Form::new()
            .text("income", income.to_string())
            .text("saving_amt", savings_target.to_string());
        for path in files {
            let bytes = std::fs::read(path).map_err(|e| {
                ApiError::validation(format!("failed to read {}: {}", path.display(), e))
            })?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "statement.xlsx".to_string());
            form = form.part(
                "files",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            );
        }

        tracing::debug!(
            path = endpoints::PREDICT_BUDGET,
            files = files.len(),
            "budget request"
        );
        let response = self
            .http
            .post(self.url(endpoints::PREDICT_BUDGET))
            .timeout(self.budget_timeout)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(Self::classify_send_error)?;

        self.decode(response).await
    }

    /// Downloads the classification spreadsheet from the last forecast.
    pub async fn download_classification(&self) -> Result<Vec<u8>, ApiError> {
        self.download(endpoints::DOWNLOAD_CLASSIFICATION).await
    }

    /// Downloads the budget spreadsheet from the last forecast.
    pub async fn download_budget(&self) -> Result<Vec<u8>, ApiError> {
        self.download(endpoints::DOWNLOAD_BUDGET).await
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let Some(token) = self.stored_token() else {
            return Err(ApiError::auth("downloads require signing in"));
        };

        tracing::debug!(path, "download request");
        let response = self
            .http
            .post(self.url(path))
            .timeout(self.auth_timeout)
            .bearer_auth(token)
            .send()
            .await
            .map_err(Self::classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.failure(status.as_u16(), &body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(format!("failed to read response body: {}", e)))?;
        Ok(bytes.to_vec())
    }

    // --- cross-cutting steps ---------------------------------------------

    /// Attaches `Authorization: Bearer <token>` when a token is stored,
    /// leaves the request untouched otherwise.
    fn bearer(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match SessionStore::stored_token_at(&self.store_path) {
            Ok(Some(token)) => builder.bearer_auth(token),
            Ok(None) => builder,
            Err(e) => {
                tracing::warn!("failed to read session store: {e:#}");
                builder
            }
        }
    }

    fn stored_token(&self) -> Option<String> {
        SessionStore::stored_token_at(&self.store_path)
            .inspect_err(|e| tracing::warn!("failed to read session store: {e:#}"))
            .ok()
            .flatten()
    }

    /// Checks the status and decodes the body, routing failures through
    /// [`Self::failure`].
    async fn decode<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.failure(status.as_u16(), &body));
        }

        response.json().await.map_err(|e| ApiError {
            kind: ApiErrorKind::Backend,
            status: Some(status.as_u16()),
            message: format!("failed to decode response: {}", e),
            detail: None,
        })
    }

    /// Converts a failure response into an [`ApiError`], erasing the stored
    /// session first when the failure is an authentication one.
    fn failure(&self, status: u16, body: &str) -> ApiError {
        let err = ApiError::from_status(status, body);
        if err.requires_auth() {
            self.on_auth_failure();
        }
        err
    }

    /// Authentication-failure cleanup: erases both stored entries.
    /// Must stay in lockstep with `SessionManager::logout`; the two are
    /// triggers for the same state transition.
    fn on_auth_failure(&self) {
        match SessionStore::clear_at(&self.store_path) {
            Ok(true) => tracing::debug!("stored session cleared after auth failure"),
            Ok(false) => {}
            Err(e) => tracing::warn!("failed to clear session after auth failure: {e:#}"),
        }
    }

    fn classify_send_error(err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::network(format!("request timed out: {}", err))
        } else {
            ApiError::network(format!("request failed: {}", err))
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
