use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Review status of a post.
///
/// `Rejected` never rests in storage: rejection deletes the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "DRAFT",
            PostStatus::Pending => "PENDING",
            PostStatus::Approved => "APPROVED",
            PostStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(PostStatus::Draft),
            "PENDING" => Ok(PostStatus::Pending),
            "APPROVED" => Ok(PostStatus::Approved),
            "REJECTED" => Ok(PostStatus::Rejected),
            other => Err(DomainError::Validation(format!("unknown status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostType {
    Blog,
    Instagram,
    Vlog,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Blog => "BLOG",
            PostType::Instagram => "INSTAGRAM",
            PostType::Vlog => "VLOG",
        }
    }
}

impl FromStr for PostType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BLOG" => Ok(PostType::Blog),
            "INSTAGRAM" => Ok(PostType::Instagram),
            "VLOG" => Ok(PostType::Vlog),
            other => Err(DomainError::Validation(format!(
                "unknown post type '{other}'"
            ))),
        }
    }
}

/// One block of post content. Media blocks hold URLs issued by the upload service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentSection {
    Heading {
        text: String,
    },
    Paragraph {
        text: String,
    },
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Video {
        url: String,
    },
    Embed {
        url: String,
    },
}

/// A post addressed either by its id or by its slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostRef {
    Id(Uuid),
    Slug(String),
}

impl PostRef {
    /// Interpret a path parameter. Anything that parses as a UUID is an id.
    pub fn parse(param: &str) -> Self {
        match Uuid::parse_str(param.trim()) {
            Ok(id) => PostRef::Id(id),
            Err(_) => PostRef::Slug(param.trim().to_lowercase()),
        }
    }
}

impl fmt::Display for PostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostRef::Id(id) => write!(f, "{id}"),
            PostRef::Slug(slug) => f.write_str(slug),
        }
    }
}

/// Dashboard bucket a post is counted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewBucket {
    Draft,
    NeedsUpdate,
    Pending,
    Approved,
    Rejected,
}

/// Post counts by review bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewStats {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub needs_update: u64,
}

impl ReviewStats {
    pub fn record(&mut self, bucket: ReviewBucket) {
        match bucket {
            ReviewBucket::Pending => self.pending += 1,
            ReviewBucket::Approved => self.approved += 1,
            ReviewBucket::Rejected => self.rejected += 1,
            ReviewBucket::NeedsUpdate => self.needs_update += 1,
            ReviewBucket::Draft => {}
        }
    }
}

/// Fields an author supplies when creating a draft.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub post_type: PostType,
    pub sections: Vec<ContentSection>,
}

/// An author's edit of a post that came back with review comments.
#[derive(Debug, Clone)]
pub struct PostRevision {
    pub title: String,
    pub slug: String,
    pub post_type: Option<PostType>,
    pub sections: Option<Vec<ContentSection>>,
    /// Send straight back to the review queue (the default) or keep as a draft.
    pub submit: bool,
}

/// Partial update applied by a moderator.
#[derive(Debug, Clone, Default)]
pub struct ModerationPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub post_type: Option<PostType>,
    pub sections: Option<Vec<ContentSection>>,
    pub status: Option<PostStatus>,
    pub published: Option<bool>,
}

/// Post entity - a piece of creator content moving through review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub post_type: PostType,
    pub sections: Vec<ContentSection>,
    pub status: PostStatus,
    pub published: bool,
    pub likes_count: i64,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by_id: Option<Uuid>,
    pub review_comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new draft owned by `author_id`.
    pub fn new(author_id: Uuid, draft: NewPost) -> Result<Self, DomainError> {
        let title = normalize_title(&draft.title)?;
        let slug = normalize_slug(&draft.slug)?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            slug,
            post_type: draft.post_type,
            sections: draft.sections,
            status: PostStatus::Draft,
            published: false,
            likes_count: 0,
            reviewed_at: None,
            reviewed_by_id: None,
            review_comments: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// DRAFT carrying reviewer feedback: the only state an author may edit from.
    pub fn needs_update(&self) -> bool {
        self.status == PostStatus::Draft && self.review_comments.is_some()
    }

    /// Visible to the public and open for likes.
    pub fn is_live(&self) -> bool {
        self.status == PostStatus::Approved && self.published
    }

    pub fn bucket(&self) -> ReviewBucket {
        match self.status {
            PostStatus::Draft if self.review_comments.is_some() => ReviewBucket::NeedsUpdate,
            PostStatus::Draft => ReviewBucket::Draft,
            PostStatus::Pending => ReviewBucket::Pending,
            PostStatus::Approved => ReviewBucket::Approved,
            PostStatus::Rejected => ReviewBucket::Rejected,
        }
    }

    /// DRAFT -> PENDING.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != PostStatus::Draft {
            return Err(self.invalid_transition("submit"));
        }
        self.status = PostStatus::Pending;
        self.clear_review();
        self.updated_at = now;
        Ok(())
    }

    /// PENDING -> APPROVED, published.
    pub fn approve(&mut self, reviewer_id: Uuid, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_pending("approve")?;
        if reviewer_id == self.author_id {
            return Err(DomainError::Forbidden(
                "reviewers cannot approve their own posts".to_string(),
            ));
        }
        self.status = PostStatus::Approved;
        self.published = true;
        self.reviewed_at = Some(now);
        self.reviewed_by_id = Some(reviewer_id);
        self.review_comments = None;
        self.updated_at = now;
        Ok(())
    }

    /// PENDING -> DRAFT with feedback for the author.
    pub fn request_changes(
        &mut self,
        reviewer_id: Uuid,
        feedback: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_pending("request changes on")?;
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(DomainError::Validation("feedback is required".to_string()));
        }
        self.status = PostStatus::Draft;
        self.published = false;
        self.reviewed_at = Some(now);
        self.reviewed_by_id = Some(reviewer_id);
        self.review_comments = Some(feedback.to_string());
        self.updated_at = now;
        Ok(())
    }

    pub fn ensure_pending(&self, action: &str) -> Result<(), DomainError> {
        if self.status != PostStatus::Pending {
            return Err(self.invalid_transition(action));
        }
        Ok(())
    }

    /// Apply an author's revision to a post returned with feedback.
    ///
    /// Validates everything before touching the post, so a failed call
    /// leaves it unchanged. Slug uniqueness is the caller's job.
    pub fn resubmit(&mut self, revision: PostRevision, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.needs_update() {
            return Err(DomainError::InvalidState(format!(
                "post {} can only be edited after a reviewer requested changes",
                self.id
            )));
        }
        let title = normalize_title(&revision.title)?;
        let slug = normalize_slug(&revision.slug)?;

        self.title = title;
        self.slug = slug;
        if let Some(post_type) = revision.post_type {
            self.post_type = post_type;
        }
        if let Some(sections) = revision.sections {
            self.sections = sections;
        }
        self.status = if revision.submit {
            PostStatus::Pending
        } else {
            PostStatus::Draft
        };
        self.published = false;
        self.clear_review();
        self.updated_at = now;
        Ok(())
    }

    /// Moderator partial update. Keeps `published` implying `APPROVED`:
    /// moving a post out of APPROVED unpublishes it. Review metadata only
    /// survives on a DRAFT or on a post whose status is left alone.
    pub fn moderate(&mut self, patch: ModerationPatch, now: DateTime<Utc>) -> Result<(), DomainError> {
        let title = patch.title.as_deref().map(normalize_title).transpose()?;
        let slug = patch.slug.as_deref().map(normalize_slug).transpose()?;
        let status = patch.status.unwrap_or(self.status);
        if status == PostStatus::Rejected {
            return Err(DomainError::Validation(
                "status cannot be set to REJECTED; use the reject action, which deletes the post"
                    .to_string(),
            ));
        }
        let published = match patch.published {
            Some(true) if status != PostStatus::Approved => {
                return Err(DomainError::Validation(
                    "only approved posts can be published".to_string(),
                ));
            }
            Some(flag) => flag,
            None => self.published && status == PostStatus::Approved,
        };

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(slug) = slug {
            self.slug = slug;
        }
        if let Some(post_type) = patch.post_type {
            self.post_type = post_type;
        }
        if let Some(sections) = patch.sections {
            self.sections = sections;
        }
        if status != PostStatus::Draft && status != self.status {
            self.clear_review();
        }
        self.status = status;
        self.published = published;
        self.updated_at = now;
        Ok(())
    }

    fn clear_review(&mut self) {
        self.review_comments = None;
        self.reviewed_at = None;
        self.reviewed_by_id = None;
    }

    fn invalid_transition(&self, action: &str) -> DomainError {
        DomainError::InvalidState(format!(
            "cannot {action} post {} while it is {}",
            self.id, self.status
        ))
    }
}

fn normalize_title(raw: &str) -> Result<String, DomainError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(DomainError::Validation("title is required".to_string()));
    }
    Ok(title.to_string())
}

/// Path segments under `/api/posts` that would shadow a post's slug.
const RESERVED_SLUGS: [&str; 3] = ["mine", "pending", "stats"];

/// Trim and lower-case a slug, then check it is kebab-case ascii.
pub fn normalize_slug(raw: &str) -> Result<String, DomainError> {
    let slug = raw.trim().to_lowercase();
    if slug.is_empty() {
        return Err(DomainError::Validation("slug is required".to_string()));
    }
    if RESERVED_SLUGS.contains(&slug.as_str()) {
        return Err(DomainError::Validation(format!("slug '{slug}' is reserved")));
    }
    let well_formed = slug
        .split('-')
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    if !well_formed {
        return Err(DomainError::Validation(format!(
            "slug '{slug}' must be lowercase letters, digits and single hyphens"
        )));
    }
    Ok(slug)
}
