//! Post review workflow handlers.

use actix_web::{HttpResponse, web};

use folio_core::domain::{
    ContentSection, ModerationPatch, NewPost, Post, PostRef, PostRevision, PostStatus, PostType,
};
use folio_shared::dto::{
    CreatePostRequest, EditPostRequest, ModeratePostRequest, NeedsUpdateRequest, PostResponse,
    RejectRequest, ReviewStatsResponse,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn parse_sections(raw: Vec<serde_json::Value>) -> AppResult<Vec<ContentSection>> {
    raw.into_iter()
        .enumerate()
        .map(|(i, value)| {
            serde_json::from_value(value)
                .map_err(|e| AppError::BadRequest(format!("section {i} is invalid: {e}")))
        })
        .collect()
}

fn parse_post_type(raw: &str) -> AppResult<PostType> {
    Ok(raw.parse::<PostType>()?)
}

fn to_response(post: Post) -> AppResult<PostResponse> {
    let sections = post
        .sections
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Internal(format!("failed to encode sections: {e}")))?;

    Ok(PostResponse {
        id: post.id,
        author_id: post.author_id,
        title: post.title,
        slug: post.slug,
        post_type: post.post_type.as_str().to_string(),
        sections,
        status: post.status.as_str().to_string(),
        published: post.published,
        likes_count: post.likes_count,
        reviewed_at: post.reviewed_at,
        reviewed_by_id: post.reviewed_by_id,
        review_comments: post.review_comments,
        created_at: post.created_at,
        updated_at: post.updated_at,
    })
}

fn to_responses(posts: Vec<Post>) -> AppResult<Vec<PostResponse>> {
    posts.into_iter().map(to_response).collect()
}

/// POST /api/posts
pub async fn create(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let draft = NewPost {
        title: req.title,
        slug: req.slug,
        post_type: parse_post_type(&req.post_type)?,
        sections: parse_sections(req.sections)?,
    };

    let post = state.lifecycle.create(&identity, draft).await?;
    Ok(HttpResponse::Created().json(to_response(post)?))
}

/// GET /api/posts
pub async fn list_published(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.lifecycle.published().await?;
    Ok(HttpResponse::Ok().json(to_responses(posts)?))
}

/// GET /api/posts/mine
pub async fn list_mine(identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.lifecycle.authored_by(&identity).await?;
    Ok(HttpResponse::Ok().json(to_responses(posts)?))
}

/// GET /api/posts/pending - review queue, oldest first.
pub async fn pending(identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.lifecycle.pending_queue(&identity).await?;
    Ok(HttpResponse::Ok().json(to_responses(posts)?))
}

/// GET /api/posts/stats
pub async fn stats(identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let stats = state.lifecycle.stats(&identity).await?;
    Ok(HttpResponse::Ok().json(ReviewStatsResponse {
        pending: stats.pending,
        approved: stats.approved,
        rejected: stats.rejected,
        needs_update: stats.needs_update,
    }))
}

/// GET /api/posts/{param}
pub async fn get(state: web::Data<AppState>, param: web::Path<String>) -> AppResult<HttpResponse> {
    let post = state.lifecycle.get(&PostRef::parse(&param)).await?;
    Ok(HttpResponse::Ok().json(to_response(post)?))
}

/// PUT /api/posts/{param} - moderator partial update.
pub async fn update(
    identity: Identity,
    state: web::Data<AppState>,
    param: web::Path<String>,
    body: web::Json<ModeratePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let patch = ModerationPatch {
        title: req.title,
        slug: req.slug,
        post_type: req.post_type.as_deref().map(parse_post_type).transpose()?,
        sections: req.sections.map(parse_sections).transpose()?,
        status: req
            .status
            .as_deref()
            .map(str::parse::<PostStatus>)
            .transpose()?,
        published: req.published,
    };

    let post = state
        .lifecycle
        .moderate(&identity, &PostRef::parse(&param), patch)
        .await?;
    Ok(HttpResponse::Ok().json(to_response(post)?))
}

/// DELETE /api/posts/{param}
pub async fn delete(
    identity: Identity,
    state: web::Data<AppState>,
    param: web::Path<String>,
) -> AppResult<HttpResponse> {
    state
        .lifecycle
        .delete(&identity, &PostRef::parse(&param))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/posts/{param}/submit
pub async fn submit(
    identity: Identity,
    state: web::Data<AppState>,
    param: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state
        .lifecycle
        .submit(&identity, &PostRef::parse(&param))
        .await?;
    Ok(HttpResponse::Ok().json(to_response(post)?))
}

/// POST /api/posts/approve/{id}
pub async fn approve(
    identity: Identity,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state
        .lifecycle
        .approve(&identity, &PostRef::parse(&id))
        .await?;
    Ok(HttpResponse::Ok().json(to_response(post)?))
}

/// POST /api/posts/reject/{id} - deletes the post.
pub async fn reject(
    identity: Identity,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<RejectRequest>,
) -> AppResult<HttpResponse> {
    let reason = body.into_inner().reason.unwrap_or_default();
    let post = state
        .lifecycle
        .reject(&identity, &PostRef::parse(&id), &reason)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": post.id,
        "slug": post.slug,
        "rejected": true,
    })))
}

/// POST /api/posts/needs-update/{id}
pub async fn needs_update(
    identity: Identity,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<NeedsUpdateRequest>,
) -> AppResult<HttpResponse> {
    let feedback = body.into_inner().feedback.unwrap_or_default();
    let post = state
        .lifecycle
        .request_changes(&identity, &PostRef::parse(&id), &feedback)
        .await?;
    Ok(HttpResponse::Ok().json(to_response(post)?))
}

/// PATCH /api/posts/edits/{id} - author revision after feedback.
pub async fn edit(
    identity: Identity,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<EditPostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let (Some(title), Some(slug)) = (req.title, req.slug) else {
        return Err(AppError::BadRequest("title and slug are required".to_string()));
    };

    let revision = PostRevision {
        title,
        slug,
        post_type: req.post_type.as_deref().map(parse_post_type).transpose()?,
        sections: req.sections.map(parse_sections).transpose()?,
        submit: req.submit.unwrap_or(true),
    };

    let post = state
        .lifecycle
        .resubmit(&identity, &PostRef::parse(&id), revision)
        .await?;
    Ok(HttpResponse::Ok().json(to_response(post)?))
}
