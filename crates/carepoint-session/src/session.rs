use serde::Serialize;

use crate::client::{validate_user_id, FirestoreClient};
use crate::error::SessionError;
use crate::profile::UserProfile;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::role::Role;

/// How the profile lookup ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    Loaded,
    /// The user has no profile document.
    Missing,
    /// The lookup failed, after retries where the error was transient.
    Unavailable,
}

/// Per-request view of one user: profile, effective role and how the
/// profile was obtained. Built fresh for every request and never shared.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub user_id: String,
    pub profile: Option<UserProfile>,
    pub role: Role,
    pub role_display_name: &'static str,
    pub accessible_roles: Vec<Role>,
    pub attempts: u32,
    pub status: ProfileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionContext {
    /// Loads the profile for `uid` under `policy`.
    ///
    /// Lookup failures do not fail the call; they produce a context with
    /// [`ProfileStatus::Unavailable`] and the default role.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidUserId`] if `uid` is not a usable
    /// document id. No request is made in that case.
    pub async fn establish(
        client: &FirestoreClient,
        uid: &str,
        policy: RetryPolicy,
    ) -> Result<Self, SessionError> {
        validate_user_id(uid)?;

        let (result, attempts) = retry_with_backoff(policy, || client.get_profile(uid)).await;

        let context = match result {
            Ok(Some(profile)) => Self::build(uid, Some(profile), attempts, ProfileStatus::Loaded, None),
            Ok(None) => Self::build(uid, None, attempts, ProfileStatus::Missing, None),
            Err(e) => {
                tracing::warn!(uid, attempts, error = %e, "profile unavailable");
                Self::build(
                    uid,
                    None,
                    attempts,
                    ProfileStatus::Unavailable,
                    Some(e.to_string()),
                )
            }
        };

        tracing::debug!(uid, role = %context.role, attempts, status = ?context.status, "session established");
        Ok(context)
    }

    fn build(
        uid: &str,
        profile: Option<UserProfile>,
        attempts: u32,
        status: ProfileStatus,
        error: Option<String>,
    ) -> Self {
        let role = profile.as_ref().map_or(Role::User, |p| p.role);
        Self {
            user_id: uid.to_string(),
            profile,
            role,
            role_display_name: role.display_name(),
            accessible_roles: role.accessible_roles(),
            attempts,
            status,
            error,
        }
    }

    #[must_use]
    pub fn has_permission(&self, required: Role) -> bool {
        self.role.check_permission(required)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }
}
