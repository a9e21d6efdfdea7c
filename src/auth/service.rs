use crate::auth::tokens::{subject_id, TokenIssuer};
use crate::db::models::{User, UserProfile};
use crate::db::operations::DbOperations;
use crate::error::AppError;
use tracing::warn;
use uuid::Uuid;

/// bcrypt cost factor; ~100ms verify keeps brute force expensive.
const BCRYPT_COST: u32 = 10;

pub struct RegisterData {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password_confirm: String,
}

/// Result of a successful login. The handler returns the access token in
/// the body and puts the refresh token in the cookie.
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Orchestrates the session lifecycle between the credential store and the
/// token issuer. HTTP concerns (cookies, status codes) stay in the handlers.
pub struct SessionService {
    db: DbOperations,
    tokens: TokenIssuer,
}

impl SessionService {
    pub fn new(db: DbOperations, tokens: TokenIssuer) -> Self {
        Self { db, tokens }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub async fn register(&self, data: RegisterData) -> Result<(), AppError> {
        if data.username.is_empty()
            || data.email.is_empty()
            || data.first_name.is_empty()
            || data.last_name.is_empty()
            || data.password.is_empty()
            || data.password_confirm.is_empty()
        {
            return Err(AppError::Validation("invalid fields".into()));
        }

        if data.password != data.password_confirm {
            return Err(AppError::Validation("passwords do not match".into()));
        }

        if self.db.email_exists(&data.email).await? {
            return Err(AppError::Conflict("email already registered".into()));
        }

        let password = data.password;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;

        let user = User::new(data.email, data.username, data.first_name, data.last_name, hash);
        // A duplicate slipping past the existence check stays a conflict;
        // any other insert failure surfaces as a plain bad request.
        self.db.create_user(&user).await.map_err(|e| match e {
            AppError::Conflict(_) => e,
            AppError::Database(_) => AppError::BadRequest("could not register".into()),
            other => other,
        })?;

        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation("invalid fields".into()));
        }

        // Unknown email and wrong password take the same exit.
        let user = self
            .db
            .get_user_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = password.to_owned();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;

        if !matches {
            return Err(AppError::InvalidCredentials);
        }

        let access_token = self.tokens.issue_access(user.id)?;
        let refresh_token = self.tokens.issue_refresh(user.id)?;

        // Overwrites any previous session: at most one live refresh token
        // per user, last login wins.
        self.db.set_refresh_token(user.id, Some(&refresh_token)).await?;

        Ok(TokenPair { access_token, refresh_token })
    }

    /// Exchanges a refresh token for a new access token. The refresh token
    /// itself is not rotated. A token that fails verification or whose
    /// identity does not match the holding user is cleared server-side,
    /// forcing a full re-login.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let user = self
            .db
            .get_user_by_refresh_token(refresh_token)
            .await?
            .ok_or(AppError::Forbidden)?;

        let claims = match self.tokens.verify_refresh(refresh_token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!("stored refresh token failed verification for user {}", user.id);
                self.db.set_refresh_token(user.id, None).await?;
                return Err(e);
            }
        };

        // An unparseable subject is treated the same as a mismatched one:
        // the stored token can never become valid, so drop it.
        if subject_id(&claims).ok() != Some(user.id) {
            warn!("refresh token identity mismatch for user {}", user.id);
            self.db.set_refresh_token(user.id, None).await?;
            return Err(AppError::Forbidden);
        }

        self.tokens.issue_access(user.id)
    }

    /// Idempotent: clearing a token nobody holds is a success.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AppError> {
        self.db.clear_refresh_token_by_value(refresh_token).await
    }

    pub async fn whoami(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        let user = self
            .db
            .get_user_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        Ok(user.profile())
    }
}
