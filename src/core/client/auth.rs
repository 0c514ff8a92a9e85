//! Credential acquisition: opaque bearer tokens and the refresh-token exchange.

use std::fmt;

use serde::Deserialize;
use tokio::sync::RwLock;
use url::Url;

use super::ID_TOKEN_HEADER;
use crate::core::OrdersError;
use crate::core::services::{BoxFuture, CredentialProvider};

/// An opaque id token. Shared read-only by every fetch of a run.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Hands out a token acquired elsewhere.
#[derive(Debug, Clone)]
pub struct StaticCredentials(Credential);

impl StaticCredentials {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(Credential::new(token))
    }
}

impl CredentialProvider for StaticCredentials {
    fn acquire_token(&self) -> BoxFuture<'_, Result<Credential, OrdersError>> {
        Box::pin(async move { Ok(self.0.clone()) })
    }
}

#[derive(Deserialize)]
struct RefreshEnvelope {
    data: Option<RefreshData>,
}

#[derive(Deserialize)]
struct RefreshData {
    #[serde(rename = "idToken")]
    id_token: Option<String>,
}

/// Exchanges a refresh token for a fresh id token, once per run.
///
/// The newest id token is remembered and presented on the next exchange.
pub struct RefreshTokenProvider {
    http: reqwest::Client,
    url: Url,
    id_token: RwLock<String>,
    refresh_token: String,
}

impl fmt::Debug for RefreshTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenProvider")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

impl RefreshTokenProvider {
    pub(crate) fn new(
        http: reqwest::Client,
        url: Url,
        id_token: String,
        refresh_token: String,
    ) -> Self {
        Self {
            http,
            url,
            id_token: RwLock::new(id_token),
            refresh_token,
        }
    }

    async fn refresh(&self) -> Result<Credential, OrdersError> {
        let current = self.id_token.read().await.clone();
        let resp = self
            .http
            .post(self.url.clone())
            .header(ID_TOKEN_HEADER, current)
            .json(&serde_json::json!({ "refreshToken": self.refresh_token }))
            .send()
            .await
            .map_err(|e| OrdersError::Credential(format!("token refresh request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(OrdersError::Credential(format!(
                "token refresh failed: {} - {text}",
                status.as_u16()
            )));
        }

        let envelope: RefreshEnvelope = resp
            .json()
            .await
            .map_err(|e| OrdersError::Credential(format!("unreadable refresh response: {e}")))?;
        let token = envelope
            .data
            .and_then(|d| d.id_token)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| OrdersError::Credential("refresh response has no idToken".into()))?;

        *self.id_token.write().await = token.clone();
        Ok(Credential(token))
    }
}

impl CredentialProvider for RefreshTokenProvider {
    fn acquire_token(&self) -> BoxFuture<'_, Result<Credential, OrdersError>> {
        Box::pin(self.refresh())
    }
}
