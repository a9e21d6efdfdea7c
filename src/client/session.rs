use crate::client::http::{ApiClient, ClientError};
use crate::client::{BookRecord, LoginData, NewBook, RegisterData};
use crate::db::models::UserProfile;
use reqwest::Method;
use tracing::debug;
use uuid::Uuid;

/// Client-side session state. Lives only in memory: a fresh process starts
/// anonymous and `attempt` rebuilds the session from the refresh cookie.
#[derive(Debug, Default)]
pub struct ClientSession {
    pub access_token: String,
    pub user: Option<UserProfile>,
    pub loading: bool,
}

impl ClientSession {
    pub fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty()
    }
}

/// Mirrors the server's session lifecycle on the client. Every async action
/// brackets `loading`, releasing it on every exit path including errors.
pub struct SessionStore {
    api: ApiClient,
    session: ClientSession,
}

impl SessionStore {
    pub fn new(api: ApiClient) -> Self {
        Self { api, session: ClientSession::default() }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.session.loading
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.session.user.as_ref()
    }

    pub fn access_token(&self) -> &str {
        &self.session.access_token
    }

    /// Bootstrap: try to resurrect a session from the refresh cookie, then
    /// load the profile. Failure is not an error to the caller; it just
    /// means we start anonymous.
    pub async fn attempt(&mut self) {
        self.session.loading = true;
        let result = self.attempt_inner().await;
        if result.is_err() {
            self.reset();
        }
        self.session.loading = false;
    }

    async fn attempt_inner(&mut self) -> Result<(), ClientError> {
        self.refresh().await?;
        self.fetch_user().await?;
        Ok(())
    }

    pub async fn login(&mut self, data: &LoginData) -> Result<(), ClientError> {
        self.session.loading = true;
        let result = self.login_inner(data).await;
        self.session.loading = false;
        result
    }

    async fn login_inner(&mut self, data: &LoginData) -> Result<(), ClientError> {
        self.session.access_token = self.api.login(data).await?;
        self.fetch_user().await
    }

    /// Registration does not log the user in; a separate login is required.
    pub async fn register(&mut self, data: &RegisterData) -> Result<(), ClientError> {
        self.session.loading = true;
        let result = self.api.register(data).await;
        self.session.loading = false;
        result
    }

    pub async fn fetch_user(&mut self) -> Result<(), ClientError> {
        let resp = self.private::<()>(Method::GET, "/api/auth/user", None).await?;
        self.session.user = Some(resp.json().await?);
        Ok(())
    }

    /// Private-channel requests go through here so that a failed
    /// mid-request refresh tears down the whole session, profile included:
    /// there is no state where the profile outlives the tokens.
    async fn private<B: serde::Serialize>(
        &mut self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ClientError> {
        let result = self
            .api
            .send_private(method, path, body, &mut self.session.access_token)
            .await;
        if result.is_err() && !self.session.is_authenticated() {
            self.reset();
        }
        result
    }

    /// Mints a new access token from the refresh cookie. On failure the
    /// whole session is reset before the error surfaces; there is no
    /// partially authenticated state.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        match self.api.refresh().await {
            Ok(token) => {
                self.session.access_token = token;
                Ok(())
            }
            Err(e) => {
                debug!("refresh failed: {}", e);
                self.reset();
                Err(e)
            }
        }
    }

    /// Always ends anonymous locally, whatever the server said.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        self.session.loading = true;
        let result = self
            .private::<()>(Method::POST, "/api/auth/logout", None)
            .await
            .map(|_| ());
        self.reset();
        result
    }

    pub fn reset(&mut self) {
        self.session.access_token.clear();
        self.session.user = None;
        self.session.loading = false;
    }

    // ---- book operations, all on the private channel ----

    pub async fn list_books(&mut self) -> Result<Vec<BookRecord>, ClientError> {
        let resp = self.private::<()>(Method::GET, "/api/books", None).await?;
        Ok(resp.json().await?)
    }

    pub async fn create_book(&mut self, book: &NewBook) -> Result<BookRecord, ClientError> {
        let resp = self.private(Method::POST, "/api/books", Some(book)).await?;
        Ok(resp.json().await?)
    }

    pub async fn delete_book(&mut self, id: Uuid) -> Result<(), ClientError> {
        self.private::<()>(Method::DELETE, &format!("/api/books/{}", id), None)
            .await?;
        Ok(())
    }
}
