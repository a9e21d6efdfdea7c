use crate::auth::handlers::AuthResponse;
use crate::client::{LoginData, RegisterData};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(_) => None,
        }
    }
}

/// Two request channels over one HTTP client. The public channel (login,
/// register, refresh) never carries a bearer token and never retries. The
/// private channel attaches the caller's access token and, on a 401,
/// refreshes once and resubmits the original request before giving up.
///
/// The underlying client keeps a cookie store, so the http-only refresh
/// cookie set by login rides along with refresh and logout automatically.
/// Retry behavior is fixed at construction; there is no lazily installed
/// interceptor to double-register.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        let base_url = base_url.into();
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }

    // ---- public channel ----

    pub async fn register(&self, data: &RegisterData) -> Result<(), ClientError> {
        let resp = self.send(Method::POST, "/api/auth/register", Some(data), None).await?;
        into_api_result(resp).await?;
        Ok(())
    }

    /// Returns the access token; the refresh cookie lands in the cookie
    /// store as a side effect.
    pub async fn login(&self, data: &LoginData) -> Result<String, ClientError> {
        let resp = self.send(Method::POST, "/api/auth/login", Some(data), None).await?;
        let resp = into_api_result(resp).await?;
        let auth: AuthResponse = resp.json().await?;
        Ok(auth.access_token)
    }

    /// Exchanges the stored refresh cookie for a new access token.
    pub async fn refresh(&self) -> Result<String, ClientError> {
        let resp = self.send::<()>(Method::POST, "/api/auth/refresh", None, None).await?;
        let resp = into_api_result(resp).await?;
        let auth: AuthResponse = resp.json().await?;
        Ok(auth.access_token)
    }

    // ---- private channel ----

    /// Sends an authenticated request. On a 401 the access token is assumed
    /// expired: refresh once, write the new token back through
    /// `access_token`, and resubmit. A second 401 (or any other failure)
    /// propagates unchanged; there is no loop. The retried/not-retried
    /// distinction is plain control flow here, not a flag on a shared
    /// request object.
    pub async fn send_private<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        access_token: &mut String,
    ) -> Result<Response, ClientError> {
        let resp = self
            .send(method.clone(), path, body, Some(access_token.as_str()))
            .await?;

        if resp.status() != StatusCode::UNAUTHORIZED {
            return into_api_result(resp).await;
        }

        debug!("401 on {} {}, attempting silent refresh", method, path);
        match self.refresh().await {
            Ok(token) => *access_token = token,
            Err(e) => {
                // Refresh failed: the session is truly over. Drop the stale
                // token so the caller lands in the anonymous state.
                access_token.clear();
                return Err(e);
            }
        }

        let resp = self
            .send(method, path, body, Some(access_token.as_str()))
            .await?;
        into_api_result(resp).await
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        bearer: Option<&str>,
    ) -> Result<Response, ClientError> {
        let mut req = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        Ok(req.send().await?)
    }
}

/// Turns a non-2xx response into `ClientError::Api`, pulling the message
/// out of the server's `{"error": {"status", "message"}}` body when present.
async fn into_api_result(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = match resp.json::<serde_json::Value>().await {
        Ok(body) => body["error"]["message"]
            .as_str()
            .unwrap_or("request failed")
            .to_string(),
        Err(_) => "request failed".to_string(),
    };

    Err(ClientError::Api { status: status.as_u16(), message })
}
