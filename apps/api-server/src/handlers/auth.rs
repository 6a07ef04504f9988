//! Sign-in through the OAuth provider, sign-out, and the current user.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};

use folio_core::access::mask_email;
use folio_shared::dto::{OAuthCallbackQuery, SessionResponse, UserResponse};

use crate::middleware::auth::{Identity, SESSION_COOKIE};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const STATE_COOKIE: &str = "folio_oauth_state";
const STATE_COOKIE_PATH: &str = "/api/auth";

fn state_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build(STATE_COOKIE, value)
        .path(STATE_COOKIE_PATH)
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::minutes(10))
        .finish()
}

fn session_cookie(token: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_secs))
        .finish()
}

fn removal(name: &'static str, path: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "").path(path).finish();
    cookie.make_removal();
    cookie
}

/// GET /api/auth/signin - redirect to the provider with a fresh CSRF state.
pub async fn signin(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let csrf = uuid::Uuid::new_v4().simple().to_string();
    let location = state.identity.authorize_url(&csrf)?;

    Ok(HttpResponse::Found()
        .cookie(state_cookie(csrf, state.secure_cookies))
        .insert_header((header::LOCATION, location))
        .finish())
}

/// GET /api/auth/callback
pub async fn callback(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<OAuthCallbackQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    if let Some(error) = query.error {
        tracing::info!(provider_error = %error, "Sign-in cancelled at provider");
        return Err(AppError::AuthenticationRequired);
    }

    let expected = req.cookie(STATE_COOKIE).map(|c| c.value().to_string());
    match (expected.as_deref(), query.state.as_deref()) {
        (Some(expected), Some(received)) if expected == received => {}
        _ => {
            tracing::warn!("OAuth state mismatch");
            return Err(AppError::BadRequest("invalid sign-in state".to_string()));
        }
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("missing authorization code".to_string()))?;

    let profile = state.identity.exchange_code(&code).await?;
    let user = state.accounts.sign_in(profile).await?;

    let token = state
        .tokens
        .generate_token(user.id, &user.email, user.name.as_deref(), user.role)?;
    let expires_in = state.tokens.expiration_seconds();

    tracing::info!(
        user_id = %user.id,
        user_email = %mask_email(&user.email),
        role = %user.role,
        "User signed in"
    );

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token.clone(), expires_in, state.secure_cookies))
        .cookie(removal(STATE_COOKIE, STATE_COOKIE_PATH))
        .json(SessionResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: u64::try_from(expires_in).unwrap_or_default(),
            user: UserResponse {
                id: user.id,
                email: user.email,
                name: user.name,
                role: user.role.as_str().to_string(),
            },
        }))
}

/// POST /api/auth/signout
pub async fn signout() -> HttpResponse {
    HttpResponse::NoContent()
        .cookie(removal(SESSION_COOKIE, "/"))
        .finish()
}

/// GET /api/auth/me - role comes from the reviewer list, not the token.
pub async fn me(identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let role = state.policy.resolve_role(&identity.email);

    Ok(HttpResponse::Ok().json(UserResponse {
        id: identity.user_id,
        email: identity.email.clone(),
        name: identity.name.clone(),
        role: role.as_str().to_string(),
    }))
}
