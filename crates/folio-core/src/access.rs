//! Access policy - who may sign in, who reviews, who may touch a post.
//!
//! The allow-lists are the single source of truth for roles. Any role held in
//! a session token or a user row is a cached copy, repaired on sign-in.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Post, Role};
use crate::ports::TokenClaims;

/// Authenticated caller, as carried by a validated session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

impl From<TokenClaims> for Session {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        }
    }
}

/// Email allow-lists loaded once at start-up and never mutated.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    allowed_emails: HashSet<String>,
    reviewer_emails: HashSet<String>,
}

/// Mask an email for logging to avoid PII in logs.
pub fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.len() > 1 => format!("{first}***"),
                _ => "***".to_string(),
            };
            format!("{masked_local}{domain}")
        }
        None => "***".to_string(),
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn email_set<I, S>(emails: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    emails
        .into_iter()
        .map(|e| normalize_email(e.as_ref()))
        .filter(|e| !e.is_empty())
        .collect()
}

impl AccessPolicy {
    pub fn new<I, J, S, T>(allowed: I, reviewers: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            allowed_emails: email_set(allowed),
            reviewer_emails: email_set(reviewers),
        }
    }

    /// Parse comma-separated lists as found in the environment.
    pub fn from_lists(allowed: &str, reviewers: &str) -> Self {
        Self::new(allowed.split(','), reviewers.split(','))
    }

    pub fn resolve_role(&self, email: &str) -> Role {
        if self.reviewer_emails.contains(&normalize_email(email)) {
            Role::Reviewer
        } else {
            Role::Uploader
        }
    }

    /// Sign-in eligibility. Independent of role.
    pub fn is_allowed(&self, email: &str) -> bool {
        self.allowed_emails.contains(&normalize_email(email))
    }

    /// Formal reviewers, judged from the allow-list rather than the token.
    pub fn is_reviewer(&self, session: Option<&Session>) -> bool {
        session.is_some_and(|s| self.resolve_role(&s.email) == Role::Reviewer)
    }

    /// Reviewers plus any allow-listed email.
    pub fn can_moderate(&self, session: Option<&Session>) -> bool {
        session.is_some_and(|s| {
            self.resolve_role(&s.email) == Role::Reviewer || self.is_allowed(&s.email)
        })
    }

    pub fn can_edit(&self, session: Option<&Session>, post: &Post) -> bool {
        session.is_some_and(|s| {
            s.user_id == post.author_id && self.resolve_role(&s.email) >= Role::Uploader
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewPost, PostType};

    fn policy() -> AccessPolicy {
        AccessPolicy::from_lists(
            "ana@example.com, Ben@Example.com ,rev@example.com",
            "REV@example.com,boss@example.com",
        )
    }

    fn session(email: &str) -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
            name: None,
            role: Role::Uploader,
        }
    }

    #[test]
    fn test_resolve_role_is_case_insensitive() {
        let policy = policy();
        assert_eq!(policy.resolve_role("rev@example.com"), Role::Reviewer);
        assert_eq!(policy.resolve_role(" Rev@EXAMPLE.com "), Role::Reviewer);
        assert_eq!(policy.resolve_role("ana@example.com"), Role::Uploader);
        assert_eq!(policy.resolve_role("stranger@example.com"), Role::Uploader);
        assert_eq!(policy.resolve_role(""), Role::Uploader);
    }

    #[test]
    fn test_resolve_role_is_idempotent() {
        let policy = policy();
        for email in ["rev@example.com", "ana@example.com", "nobody@x.io"] {
            assert_eq!(policy.resolve_role(email), policy.resolve_role(email));
        }
    }

    #[test]
    fn test_allow_list_is_independent_of_reviewers() {
        let policy = policy();
        assert!(policy.is_allowed("ben@example.com"));
        assert!(!policy.is_allowed("boss@example.com"));
        assert_eq!(policy.resolve_role("boss@example.com"), Role::Reviewer);
    }

    #[test]
    fn test_empty_entries_are_ignored() {
        let policy = AccessPolicy::from_lists("", " , ");
        assert!(!policy.is_allowed(""));
        assert_eq!(policy.resolve_role(""), Role::Uploader);
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("ana@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }

    #[test]
    fn test_can_moderate() {
        let policy = policy();
        assert!(!policy.can_moderate(None));
        assert!(policy.can_moderate(Some(&session("boss@example.com"))));
        assert!(policy.can_moderate(Some(&session("ana@example.com"))));
        assert!(!policy.can_moderate(Some(&session("stranger@example.com"))));
    }

    #[test]
    fn test_reviewer_check_ignores_token_role() {
        let policy = policy();
        let mut stale = session("ana@example.com");
        stale.role = Role::Reviewer;
        assert!(!policy.is_reviewer(Some(&stale)));
        assert!(policy.is_reviewer(Some(&session("rev@example.com"))));
    }

    #[test]
    fn test_can_edit_only_own_post() {
        let policy = policy();
        let owner = session("ana@example.com");
        let post = Post::new(
            owner.user_id,
            NewPost {
                title: "t".to_string(),
                slug: "t".to_string(),
                post_type: PostType::Vlog,
                sections: vec![],
            },
        )
        .unwrap();

        assert!(policy.can_edit(Some(&owner), &post));
        assert!(!policy.can_edit(Some(&session("ben@example.com")), &post));
        assert!(!policy.can_edit(None, &post));
    }
}
