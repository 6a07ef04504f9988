//! Anonymous like endpoints. Public, rate-limited per client IP.

use actix_web::{HttpRequest, HttpResponse, web};

use folio_core::domain::PostRef;
use folio_shared::dto::{LikeStatusResponse, LikeToggleResponse};

use crate::client::client_signature;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts/{param}/likes
pub async fn status(
    req: HttpRequest,
    state: web::Data<AppState>,
    param: web::Path<String>,
) -> AppResult<HttpResponse> {
    let status = state
        .likes
        .status(&PostRef::parse(&param), &client_signature(&req))
        .await?;

    Ok(HttpResponse::Ok().json(LikeStatusResponse {
        likes_count: status.likes_count,
        is_liked: status.is_liked,
    }))
}

/// POST /api/posts/{param}/likes
pub async fn toggle(
    req: HttpRequest,
    state: web::Data<AppState>,
    param: web::Path<String>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .likes
        .toggle(&PostRef::parse(&param), &client_signature(&req))
        .await?;

    Ok(HttpResponse::Ok().json(LikeToggleResponse {
        likes_count: outcome.likes_count,
        is_liked: outcome.is_liked,
        action: outcome.action.as_str().to_string(),
    }))
}
