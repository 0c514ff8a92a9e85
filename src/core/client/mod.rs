//! Public client surface + builder.
//! Internals are split into `auth` (credentials), `constants` (UA + defaults)
//! and `retry` (backoff policy and the per-unit retry state machine).

mod auth;
mod constants;
pub mod retry;

pub use auth::{Credential, RefreshTokenProvider, StaticCredentials};
pub use retry::{Backoff, RetryConfig, RetryStep};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use constants::{
    DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS, ORDERS_PATH, REFRESH_SEGMENT, USER_AGENT, USERS_PATH,
};
use reqwest::Client;
use url::Url;

use crate::core::OrdersError;
use crate::core::services::{Sleeper, TokioSleeper};

pub(crate) use constants::ID_TOKEN_HEADER;

/// HTTP client for the order service. Cheap to clone; clones share the
/// connection pool.
#[derive(Clone)]
pub struct OrdersClient {
    http: Client,
    base_url: Url,
    page_size: u32,
    retry: RetryConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl fmt::Debug for OrdersClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrdersClient")
            .field("base_url", &self.base_url.as_str())
            .field("page_size", &self.page_size)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl OrdersClient {
    /// Create a new builder.
    #[must_use]
    pub fn builder() -> OrdersClientBuilder {
        OrdersClientBuilder::default()
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
    pub(crate) fn page_size(&self) -> u32 {
        self.page_size
    }
    pub(crate) fn sleeper(&self) -> &dyn Sleeper {
        self.sleeper.as_ref()
    }

    /// The retry policy applied to every unit fetch.
    #[must_use]
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    pub(crate) fn orders_url(&self) -> Result<Url, OrdersError> {
        Ok(self.base_url.join(ORDERS_PATH)?)
    }

    /// `user_id` becomes a single percent-encoded path segment.
    pub(crate) fn refresh_url(&self, user_id: &str) -> Result<Url, OrdersError> {
        if matches!(user_id, "" | "." | "..") {
            return Err(OrdersError::InvalidParams(format!(
                "invalid user id {user_id:?}"
            )));
        }
        let mut url = self.base_url.join(USERS_PATH)?;
        url.path_segments_mut()
            .map_err(|()| OrdersError::InvalidParams("base_url cannot be a base".into()))?
            .push(user_id)
            .push(REFRESH_SEGMENT);
        Ok(url)
    }

    /// Returns a copy of this client using a different retry policy.
    #[must_use]
    pub fn with_retry(&self, retry: RetryConfig) -> Self {
        Self {
            retry,
            ..self.clone()
        }
    }

    /// Builds a [`RefreshTokenProvider`] against this client's service.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh URL cannot be derived from the base URL.
    pub fn refresh_token_provider(
        &self,
        user_id: &str,
        id_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Result<RefreshTokenProvider, OrdersError> {
        Ok(RefreshTokenProvider::new(
            self.http.clone(),
            self.refresh_url(user_id)?,
            id_token.into(),
            refresh_token.into(),
        ))
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct OrdersClientBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    page_size: Option<u32>,
    retry: Option<RetryConfig>,
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl OrdersClientBuilder {
    /// Service root, e.g. `https://shop.example.com/`. Required.
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Override the User-Agent.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set the per-request timeout. Default: 30 seconds.
    #[must_use]
    pub const fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    #[must_use]
    pub const fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Page-size cap sent with each unit request. Default: 75.
    #[must_use]
    pub const fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn retry_config(mut self, cfg: RetryConfig) -> Self {
        self.retry = Some(cfg);
        self
    }

    /// Convenience switch to turn retrying off (or back on).
    #[must_use]
    pub fn retry_enabled(mut self, yes: bool) -> Self {
        self.retry.get_or_insert_with(RetryConfig::default).enabled = yes;
        self
    }

    /// Replace the backoff timer, e.g. with a recording fake in tests.
    #[must_use]
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL was set, the page size is zero, or the
    /// HTTP client cannot be constructed.
    pub fn build(self) -> Result<OrdersClient, OrdersError> {
        let mut base_url = self
            .base_url
            .ok_or_else(|| OrdersError::InvalidParams("base_url is required".into()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(OrdersError::InvalidParams("page_size must be > 0".into()));
        }

        let mut httpb = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT))
            .timeout(
                self.timeout
                    .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            );
        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }
        let http = httpb.build()?;

        Ok(OrdersClient {
            http,
            base_url,
            page_size,
            retry: self.retry.unwrap_or_default(),
            sleeper: self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper)),
        })
    }
}
