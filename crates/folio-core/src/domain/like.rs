use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fingerprint::Fingerprint;

/// One anonymous client's like on one post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    pub id: Uuid,
    pub post_id: Uuid,
    pub fingerprint: Fingerprint,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(
        post_id: Uuid,
        fingerprint: Fingerprint,
        ip_address: String,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            fingerprint,
            ip_address,
            user_agent,
            created_at: Utc::now(),
        }
    }
}

/// Current like state of a post as seen by one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeStatus {
    pub likes_count: i64,
    pub is_liked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAction {
    Liked,
    Unliked,
}

impl LikeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LikeAction::Liked => "liked",
            LikeAction::Unliked => "unliked",
        }
    }
}

/// Outcome of a toggle, as committed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub likes_count: i64,
    pub is_liked: bool,
    pub action: LikeAction,
}

impl LikeToggle {
    pub fn liked(likes_count: i64) -> Self {
        Self {
            likes_count,
            is_liked: true,
            action: LikeAction::Liked,
        }
    }

    pub fn unliked(likes_count: i64) -> Self {
        Self {
            likes_count,
            is_liked: false,
            action: LikeAction::Unliked,
        }
    }
}
