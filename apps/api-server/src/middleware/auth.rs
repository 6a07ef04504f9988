//! Session authentication: the global gate and the `Identity` extractor.

use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError,
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
    web,
};
use std::future::{Future, Ready, ready};
use std::ops::Deref;
use std::pin::Pin;

use folio_core::Session;
use folio_core::access::mask_email;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "folio_session";

pub const ACCESS_DENIED_PATH: &str = "/access-denied";

/// Session token from the cookie, else from `Authorization: Bearer`.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Validate the request's session and re-check its email against the allow-list.
pub fn authenticate(req: &HttpRequest) -> AppResult<Session> {
    if let Some(session) = req.extensions().get::<Session>() {
        return Ok(session.clone());
    }

    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        tracing::error!("AppState not found in app data");
        AppError::Internal("Server configuration error".to_string())
    })?;

    let token = session_token(req).ok_or(AppError::AuthenticationRequired)?;
    let claims = state.tokens.validate_token(&token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        AppError::from(e)
    })?;

    let session = Session::from(claims);
    if !state.policy.is_allowed(&session.email) {
        tracing::warn!(
            user_email = %mask_email(&session.email),
            "Session email is not on the allow-list"
        );
        return Err(AppError::Forbidden("email is not allowed".to_string()));
    }

    Ok(session)
}

/// Routes reachable without a session.
pub fn is_public(path: &str) -> bool {
    path == "/api/health"
        || path.starts_with("/api/auth/")
        || path == ACCESS_DENIED_PATH
        || is_likes_path(path)
}

fn is_likes_path(path: &str) -> bool {
    path.strip_prefix("/api/posts/")
        .and_then(|rest| rest.strip_suffix("/likes"))
        .is_some_and(|param| !param.is_empty() && !param.contains('/'))
}

/// Rejection for a gated request: JSON under `/api`, a redirect elsewhere.
fn denied_response(path: &str, err: &AppError) -> HttpResponse {
    if path.starts_with("/api") {
        return err.error_response();
    }

    let location = if err.is_unauthenticated() {
        ACCESS_DENIED_PATH.to_string()
    } else {
        format!("{ACCESS_DENIED_PATH}?unauthorized=1")
    };
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Requires a valid, allow-listed session on every non-public route.
pub struct SessionGate;

impl<S, B> Transform<S, ServiceRequest> for SessionGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SessionGateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionGateService { service }))
    }
}

pub struct SessionGateService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for SessionGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !is_public(req.path()) {
            match authenticate(req.request()) {
                Ok(session) => {
                    req.extensions_mut().insert(session);
                }
                Err(err) => {
                    let response = denied_response(req.path(), &err);
                    return Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) });
                }
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// Authenticated caller, for handlers that act on behalf of a user.
#[derive(Debug, Clone)]
pub struct Identity(pub Session);

impl Deref for Identity {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.0
    }
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(Identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_public_paths() {
        assert!(is_public("/api/health"));
        assert!(is_public("/api/auth/signin"));
        assert!(is_public("/api/auth/me"));
        assert!(is_public("/access-denied"));
        assert!(is_public("/api/posts/hello-world/likes"));

        assert!(!is_public("/api/posts"));
        assert!(!is_public("/api/posts/hello-world"));
        assert!(!is_public("/api/posts/a/b/likes"));
        assert!(!is_public("/api/posts//likes"));
        assert!(!is_public("/dashboard"));
    }

    #[test]
    fn test_session_token_prefers_cookie() {
        let req = TestRequest::default()
            .cookie(actix_web::cookie::Cookie::new(SESSION_COOKIE, "from-cookie"))
            .insert_header((header::AUTHORIZATION, "Bearer from-header"))
            .to_http_request();

        assert_eq!(session_token(&req).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_session_token_from_bearer_header() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def"))
            .to_http_request();
        assert_eq!(session_token(&req).as_deref(), Some("abc.def"));

        let basic = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic xyz"))
            .to_http_request();
        assert!(session_token(&basic).is_none());
    }

    #[test]
    fn test_page_denials_redirect() {
        let missing = denied_response("/dashboard", &AppError::AuthenticationRequired);
        assert_eq!(missing.status(), actix_web::http::StatusCode::FOUND);
        assert_eq!(
            missing.headers().get(header::LOCATION).unwrap(),
            "/access-denied"
        );

        let refused = denied_response("/dashboard", &AppError::Forbidden("no".to_string()));
        assert_eq!(
            refused.headers().get(header::LOCATION).unwrap(),
            "/access-denied?unauthorized=1"
        );

        let api = denied_response("/api/posts", &AppError::AuthenticationRequired);
        assert_eq!(api.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }
}
