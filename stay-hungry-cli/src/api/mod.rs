use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Config;
use crate::session::SessionContext;

mod admin;
mod auth;
mod error;
mod reports;
mod sessions;
mod trainers;

pub use admin::AdminUserUpdate;
pub use auth::{AuthData, LoginRequest, ProfileUpdate, RegisterRequest};
pub use error::ApiError;
pub use reports::DateRange;
pub use sessions::TodaySummary;
pub use trainers::{NewTemplate, RoutineAssignment};

/// `{ success, data, message }` wrapper used by the auth endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Payload of a successful envelope, or the server's message as an error
    pub fn into_data(self, what: &str) -> Result<T, ApiError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(ApiError::UnexpectedResponse(
                self.message
                    .unwrap_or_else(|| format!("{} was not successful", what)),
            )),
        }
    }
}

/// API client for the Stay Hungry backend.
///
/// Every request carries the session's bearer token when one exists. A 401 on
/// any request expires the session, which observers turn into a forced logout.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &Config, session: SessionContext) -> Result<Self> {
        let timeout = Duration::from_secs(config.api.timeout_seconds);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the token, send, and turn non-success statuses into `ApiError`
    async fn execute(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let request = match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))
            .with_context(|| format!("Failed to send {} request", what))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED && self.session.expire() {
            tracing::warn!("{} rejected the session token, logging out", what);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!("{} failed with {}: {}", what, status, body);

        Err(ApiError::from_response(status, &body).into())
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T> {
        let request = self.client.get(self.url(path)).query(query);
        let response = self.execute(request, what).await?;
        Self::parse(response, what).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        what: &str,
    ) -> Result<T> {
        let request = self.client.post(self.url(path)).json(body);
        let response = self.execute(request, what).await?;
        Self::parse(response, what).await
    }

    /// POST where the response body is irrelevant
    pub(crate) async fn post_unit<B: Serialize>(&self, path: &str, body: &B, what: &str) -> Result<()> {
        let request = self.client.post(self.url(path)).json(body);
        self.execute(request, what).await?;
        Ok(())
    }

    pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        what: &str,
    ) -> Result<T> {
        let request = self.client.put(self.url(path)).json(body);
        let response = self.execute(request, what).await?;
        Self::parse(response, what).await
    }

    pub(crate) async fn put_unit<B: Serialize>(&self, path: &str, body: &B, what: &str) -> Result<()> {
        let request = self.client.put(self.url(path)).json(body);
        self.execute(request, what).await?;
        Ok(())
    }
}

/// Log a failed report fetch and substitute an empty dataset
pub(crate) fn or_empty<T: Default>(result: Result<T>, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("{} unavailable, showing no data: {:#}", what, e);
            T::default()
        }
    }
}
