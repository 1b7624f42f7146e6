//! Authenticated fetch with one-shot token refresh

use crate::config::{AuthClientConfig, ClientConfig};
use crate::constants::IS_ADMIN_PATH;
use crate::error::{ClientError, Result};
use crate::navigator::Navigator;
use crate::token_store::TokenStore;
use crate::types::{AdminCheckResponse, RefreshRequest, RefreshResponse, RequestDescriptor};
use async_singleflight::Group;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, ClientBuilder, Method, Response, StatusCode};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Sends requests on behalf of the signed-in admin
pub trait AuthenticatedFetch: Send + Sync + 'static {
    /// Send `request` with the stored bearer token
    ///
    /// Returns `None` when no token is stored or when the request could not
    /// be completed at the transport level; callers cannot tell the two apart.
    ///
    /// On a 401 the token is refreshed once and the request retried once.
    /// If the refresh is rejected a 401 redirect to `/` is requested and the
    /// original 401 response is returned.
    ///
    /// With single-flight refresh enabled, a 401 for a token that has since
    /// been replaced in the store is retried with the stored token instead
    /// of refreshing again.
    fn authenticated_fetch(
        &self,
        request: RequestDescriptor,
    ) -> impl Future<Output = Option<Response>> + Send;
}

/// Fetcher for unauthenticated scenarios: never sends anything
pub struct AuthClientNoop {}

impl AuthenticatedFetch for AuthClientNoop {
    async fn authenticated_fetch(&self, _request: RequestDescriptor) -> Option<Response> {
        None
    }
}

impl AuthClientNoop {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {})
    }
}

/// Authenticated HTTP client backed by a [`TokenStore`]
pub struct AuthClientHttp {
    config: AuthClientConfig,
    client_config: ClientConfig,
    token_store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    http_client: Client,
    /// Deduplicates concurrent refreshes of the same stale token when enabled.
    /// Ok(None) means the server rejected the refresh.
    token_refresh_singleflight: Group<Option<String>, String>,
}

impl AuthClientHttp {
    /// Create a new authenticated client
    pub fn new(
        client_config: ClientConfig,
        config: AuthClientConfig,
        token_store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Arc<Self>> {
        let mut builder = ClientBuilder::new();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(Arc::new(Self {
            config,
            client_config,
            token_store,
            navigator,
            http_client,
            token_refresh_singleflight: Group::new(),
        }))
    }

    /// Get the token store (for login/logout flows)
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.token_store
    }

    pub fn client_config(&self) -> &ClientConfig {
        &self.client_config
    }

    /// Whether the stored token belongs to an administrator
    ///
    /// Any failure (no token, no response, unexpected body) yields `false`.
    pub async fn is_admin_authenticated(&self) -> bool {
        if self.token_store.get().is_none() {
            return false;
        }

        let request = RequestDescriptor::new(Method::GET, self.client_config.url(IS_ADMIN_PATH));
        let Some(response) = self.authenticated_fetch(request).await else {
            return false;
        };

        match response.json::<AdminCheckResponse>().await {
            Ok(body) => body.is_admin,
            Err(e) => {
                debug!(error = %e, "Admin check returned an unexpected body");
                false
            }
        }
    }

    async fn fetch_with_refresh(&self, request: &mut RequestDescriptor) -> Result<Option<Response>> {
        // Step 1: no token means no request at all
        let Some(token) = self.token_store.get() else {
            debug!(url = %request.url, "No access token stored, skipping request");
            return Ok(None);
        };

        // Step 2: send with the stored bearer token
        request.set_header(AUTHORIZATION.as_str(), bearer(&token));
        let response = self.send(request).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(Some(response));
        }

        // Fast path: token rotated by a concurrent refresh, retry with it
        if self.config.single_flight_refresh {
            if let Some(current) = self.token_store.get().filter(|current| *current != token) {
                debug!(url = %request.url, "Access token already rotated, retrying");
                request.set_header(AUTHORIZATION.as_str(), bearer(&current));
                let retried = self.send(request).await?;
                return Ok(Some(retried));
            }
        }

        debug!(url = %request.url, "Access token rejected, refreshing");

        // Step 3: refresh once, then retry once
        match self.refresh(&token).await? {
            Some(new_token) => {
                request.set_header(AUTHORIZATION.as_str(), bearer(&new_token));
                let retried = self.send(request).await?;
                Ok(Some(retried))
            }
            // Step 4: refresh rejected, the session is over
            None => {
                self.navigator.redirect(StatusCode::UNAUTHORIZED, "/");
                Ok(Some(response))
            }
        }
    }

    async fn refresh(&self, token: &str) -> Result<Option<String>> {
        if !self.config.single_flight_refresh {
            return self.do_refresh(token).await;
        }

        let (success_opt, error_opt, _shared) = self
            .token_refresh_singleflight
            .work(token, async {
                self.do_refresh(token).await.map_err(|e| e.to_string())
            })
            .await;

        match (success_opt, error_opt) {
            (Some(outcome), None) => Ok(outcome),
            (None, Some(err_str)) => Err(ClientError::Authentication(err_str)),
            _ => Err(ClientError::Authentication(
                "Unknown error during token refresh".to_string(),
            )),
        }
    }

    /// POST the current token to the refresh endpoint
    ///
    /// Returns the new token after persisting it, or `None` if the server
    /// answered with a non-success status.
    async fn do_refresh(&self, token: &str) -> Result<Option<String>> {
        let url = self.client_config.url(&self.config.refresh_path);
        let request = RefreshRequest {
            access_token: token.to_string(),
        };

        let response = self.http_client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!(
                url = %url,
                status = %status,
                error = %error_text,
                "Token refresh failed"
            );
            return Ok(None);
        }

        let refresh_response: RefreshResponse = response.json().await?;
        self.token_store.set(&refresh_response.access_token)?;
        info!(url = %url, "Access token refreshed successfully");

        Ok(Some(refresh_response.access_token))
    }

    async fn send(&self, request: &RequestDescriptor) -> Result<Response> {
        let mut builder = self
            .http_client
            .request(request.method.clone(), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await?;
        debug!(
            method = %request.method,
            url = %request.url,
            status = %response.status(),
            "Request completed"
        );

        Ok(response)
    }
}

impl AuthenticatedFetch for AuthClientHttp {
    async fn authenticated_fetch(&self, mut request: RequestDescriptor) -> Option<Response> {
        match self.fetch_with_refresh(&mut request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    method = %request.method,
                    url = %request.url,
                    error = %e,
                    "Authenticated request failed"
                );
                None
            }
        }
    }
}
