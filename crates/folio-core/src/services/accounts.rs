use std::sync::Arc;

use chrono::Utc;

use crate::access::{AccessPolicy, mask_email};
use crate::domain::User;
use crate::error::DomainError;
use crate::ports::{ExternalProfile, UserRepository};

/// Turns a verified provider profile into a stored user.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    policy: Arc<AccessPolicy>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, policy: Arc<AccessPolicy>) -> Self {
        Self { users, policy }
    }

    /// Admit an allow-listed profile and repair any drift between its stored
    /// role and the one the reviewer list currently grants.
    ///
    /// Emails outside the allow-list are refused and never persisted.
    pub async fn sign_in(&self, profile: ExternalProfile) -> Result<User, DomainError> {
        let email = profile.email.trim().to_lowercase();
        let masked = mask_email(&email);

        if !profile.email_verified {
            tracing::warn!(user_email = %masked, "Sign-in refused: email not verified");
            return Err(DomainError::Forbidden("email is not verified".to_string()));
        }
        if !self.policy.is_allowed(&email) {
            tracing::warn!(user_email = %masked, "Sign-in refused: email not on allow-list");
            return Err(DomainError::Forbidden(
                "email is not allowed to sign in".to_string(),
            ));
        }

        let role = self.policy.resolve_role(&email);

        let user = match self.users.find_by_email(&email).await? {
            Some(mut user) => {
                let mut changed = false;
                if user.role != role {
                    tracing::info!(
                        user_id = %user.id,
                        stored = %user.role,
                        resolved = %role,
                        "Reconciling stored role with reviewer list"
                    );
                    user.role = role;
                    changed = true;
                }
                if profile.name.is_some() && user.name != profile.name {
                    user.name = profile.name;
                    changed = true;
                }
                if changed {
                    user.updated_at = Utc::now();
                    self.users.save(user).await?
                } else {
                    user
                }
            }
            None => {
                let user = self.users.save(User::new(&email, profile.name, role)).await?;
                tracing::info!(user_id = %user.id, role = %role, "Created user on first sign-in");
                user
            }
        };

        Ok(user)
    }
}
