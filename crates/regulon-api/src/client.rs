//! HTTP client for the Regulon backend API.
//!
//! Every request carries the bearer credential handed over by an
//! external auth collaborator; this core never mints or refreshes the
//! token itself. Transport failures and non-2xx statuses both map to
//! `RegulonError::RemoteRequest`. The client never retries on its own —
//! retry policy belongs to the repositories.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use regulon_common::{RegulonError, Result};

/// Supplies the bearer token for authenticated calls. Implemented by
/// the session/auth layer; `StaticToken` and `AnonymousCredentials`
/// cover tests and unauthenticated dev backends.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<SecretString>;
}

pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Option<SecretString> {
        Some(self.0.clone())
    }
}

pub struct AnonymousCredentials;

impl CredentialProvider for AnonymousCredentials {
    fn bearer_token(&self) -> Option<SecretString> {
        None
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| RegulonError::RemoteRequest(format!("invalid base url {base_url}: {e}")))?;
        let http = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| RegulonError::RemoteRequest(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    /// Join a relative path onto the base URL, tolerating a base with or
    /// without a trailing slash.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined)
            .map_err(|e| RegulonError::RemoteRequest(format!("invalid endpoint {path}: {e}")))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.credentials.bearer_token() {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let resp = self.authorize(req).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = body.chars().take(200).collect::<String>();
            return Err(RegulonError::RemoteRequest(format!("HTTP {status}: {detail}")));
        }
        Ok(resp)
    }

    #[instrument(skip(self))]
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        Ok(self.send(self.http.get(url)).await?.json().await?)
    }

    #[instrument(skip(self, body))]
    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        Ok(self.send(self.http.post(url).json(body)).await?.json().await?)
    }

    #[instrument(skip(self, body))]
    pub(crate) async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "PUT");
        Ok(self.send(self.http.put(url).json(body)).await?.json().await?)
    }

    /// POST with no payload and no interesting response body (cancel, start).
    #[instrument(skip(self))]
    pub(crate) async fn post_empty(&self, path: &str) -> Result<()> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        self.send(self.http.post(url)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let url = self.endpoint(path)?;
        debug!(%url, "DELETE");
        self.send(self.http.delete(url)).await?;
        Ok(())
    }
}
