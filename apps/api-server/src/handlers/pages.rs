use actix_web::{HttpResponse, http::header::ContentType, web};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AccessDeniedQuery {
    pub unauthorized: Option<String>,
}

/// GET /access-denied
pub async fn access_denied(query: web::Query<AccessDeniedQuery>) -> HttpResponse {
    let message = if query.unauthorized.is_some() {
        "Your account is not allowed to use this site."
    } else {
        "Please sign in to continue."
    };

    let body = format!(
        "<!doctype html><html><head><title>Access denied</title></head>\
         <body><h1>Access denied</h1><p>{message}</p>\
         <p><a href=\"/api/auth/signin\">Sign in</a></p></body></html>"
    );

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}
