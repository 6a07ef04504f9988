//! Data Transfer Objects - request/response types for the API.
//!
//! Content sections travel as raw JSON objects (`{"type": "paragraph", ...}`);
//! the server validates them against its content model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_post_type() -> String {
    "BLOG".to_string()
}

/// Request to create a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub slug: String,
    #[serde(default = "default_post_type")]
    pub post_type: String,
    #[serde(default)]
    pub sections: Vec<serde_json::Value>,
}

/// Author edit of a post returned with reviewer feedback.
///
/// `title` and `slug` are required; they are optional here so a missing
/// field is reported as a validation error rather than a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPostRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub post_type: Option<String>,
    pub sections: Option<Vec<serde_json::Value>>,
    /// Resubmit for review (default) or keep as a draft.
    pub submit: Option<bool>,
}

/// Moderator partial update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeratePostRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub post_type: Option<String>,
    pub sections: Option<Vec<serde_json::Value>>,
    pub status: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NeedsUpdateRequest {
    pub feedback: Option<String>,
}

/// Full post document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub post_type: String,
    pub sections: Vec<serde_json::Value>,
    pub status: String,
    pub published: bool,
    pub likes_count: i64,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by_id: Option<Uuid>,
    pub review_comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStatsResponse {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub needs_update: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatusResponse {
    pub likes_count: i64,
    pub is_liked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggleResponse {
    pub likes_count: i64,
    pub is_liked: bool,
    /// `"liked"` or `"unliked"`.
    pub action: String,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
}

/// Issued on a successful sign-in. The token is also set as a cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

/// OAuth redirect query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
