use crate::auth::guard::AuthenticatedUser;
use crate::auth::service::RegisterData;
use crate::error::AppError;
use crate::AppState;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

pub const REFRESH_COOKIE: &str = "refresh_token";

// Fields default to empty so a missing key surfaces as a 422 from the
// controller's validation, not a 400 from the JSON deserializer.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
}

/// The out-of-band delivery channel for refresh tokens: an http-only cookie,
/// invisible to client-side script, submitted automatically by the browser.
/// SameSite=None + Secure in production (cross-site SPA), Lax in development.
fn refresh_cookie<'a>(state: &AppState, value: &'a str, max_age_seconds: i64) -> Cookie<'a> {
    let prod = state.config.is_production();
    Cookie::build(REFRESH_COOKIE, value)
        .path("/")
        .http_only(true)
        .secure(prod)
        .same_site(if prod { SameSite::None } else { SameSite::Lax })
        .max_age(CookieDuration::seconds(max_age_seconds))
        .finish()
}

fn expired_refresh_cookie(state: &AppState) -> Cookie<'static> {
    refresh_cookie(state, "", 0).into_owned()
}

pub async fn register(
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    info!("Received registration request for email: {}", req.email);

    let data = RegisterData {
        username: req.username,
        email: req.email.clone(),
        first_name: req.first_name,
        last_name: req.last_name,
        password: req.password,
        password_confirm: req.password_confirm,
    };

    match state.session.register(data).await {
        Ok(()) => {
            info!("Registration successful for email: {}", req.email);
            Ok(HttpResponse::Created().finish())
        }
        Err(e) => {
            error!("Registration failed for email: {}: {}", req.email, e);
            Err(e)
        }
    }
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received login request for email: {}", req.email);

    match state.session.login(&req.email, &req.password).await {
        Ok(pair) => {
            info!("Login successful for email: {}", req.email);
            let max_age = state.session.tokens().refresh_max_age_seconds();
            let cookie = refresh_cookie(&state, &pair.refresh_token, max_age).into_owned();
            Ok(HttpResponse::Ok()
                .cookie(cookie)
                .json(AuthResponse { access_token: pair.access_token }))
        }
        Err(e) => {
            error!("Login failed for email: {}: {}", req.email, e);
            Err(e)
        }
    }
}

/// Exchanges the refresh cookie for a new access token. No cookie: 401.
/// Unknown, tampered, expired, or identity-mismatched token: 403, and the
/// server-side copy is dropped so only a full login can recover.
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let cookie = req.cookie(REFRESH_COOKIE).ok_or(AppError::Unauthenticated)?;

    let access_token = state.session.refresh(cookie.value()).await?;
    Ok(HttpResponse::Ok().json(AuthResponse { access_token }))
}

/// Idempotent: succeeds with 204 whether or not a session existed. Clears
/// the server-side token and expires the cookie.
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if let Some(cookie) = req.cookie(REFRESH_COOKIE) {
        state.session.logout(cookie.value()).await?;
        info!("Session cleared on logout");
    }

    Ok(HttpResponse::NoContent()
        .cookie(expired_refresh_cookie(&state))
        .finish())
}

/// Whoami. The guard has already verified the access token; this only
/// resolves the attached identity to a profile.
pub async fn user(
    auth: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let profile = state.session.whoami(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::test_state;
    use actix_web::{test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_register_missing_fields_is_unprocessable() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/api/auth/register", web::post().to(register)),
        )
        .await;

        // Validation runs before any database work, so the lazy pool is
        // never touched.
        let resp = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "email": "a@x.com", "password": "pw" }))
            .send_request(&app)
            .await;

        assert_eq!(resp.status(), 422);
    }

    #[actix_web::test]
    async fn test_register_password_mismatch_is_unprocessable() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/api/auth/register", web::post().to(register)),
        )
        .await;

        let resp = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "username": "alice",
                "email": "a@x.com",
                "first_name": "A",
                "last_name": "Liu",
                "password": "pw1",
                "password_confirm": "pw2"
            }))
            .send_request(&app)
            .await;

        assert_eq!(resp.status(), 422);
    }

    #[actix_web::test]
    async fn test_login_missing_fields_is_unprocessable() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/api/auth/login", web::post().to(login)),
        )
        .await;

        let resp = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "a@x.com" }))
            .send_request(&app)
            .await;

        assert_eq!(resp.status(), 422);
    }

    #[actix_web::test]
    async fn test_refresh_without_cookie_is_unauthenticated() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/api/auth/refresh", web::post().to(refresh)),
        )
        .await;

        let resp = test::TestRequest::post()
            .uri("/api/auth/refresh")
            .send_request(&app)
            .await;

        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_logout_without_cookie_is_no_content() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/api/auth/logout", web::post().to(logout)),
        )
        .await;

        let resp = test::TestRequest::post()
            .uri("/api/auth/logout")
            .send_request(&app)
            .await;

        assert_eq!(resp.status(), 204);

        // The delivery channel is expired even when no session existed.
        let cleared = resp
            .response()
            .cookies()
            .find(|c| c.name() == REFRESH_COOKIE)
            .expect("refresh cookie cleared");
        assert_eq!(cleared.value(), "");
        assert_eq!(cleared.max_age(), Some(CookieDuration::ZERO));
    }

    #[actix_web::test]
    async fn test_user_without_token_is_unauthenticated() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/api/auth/user", web::get().to(user)),
        )
        .await;

        let resp = test::TestRequest::get()
            .uri("/api/auth/user")
            .send_request(&app)
            .await;

        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_cookie_attributes_in_development() {
        let state = test_state();
        let cookie = refresh_cookie(&state, "tok", 60);
        assert!(cookie.http_only().unwrap_or(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_ne!(cookie.secure(), Some(true));
    }
}
