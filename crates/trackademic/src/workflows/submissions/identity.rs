use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::PrincipalId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Staff,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Staff => "staff",
        }
    }
}

/// Authenticated caller as supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: PrincipalId,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub department: Option<String>,
    /// Only students carry a batch.
    #[serde(default)]
    pub batch: Option<String>,
    pub display_name: String,
    #[serde(default)]
    pub onboarding_complete: bool,
}

/// Opaque bearer token for an active session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: SessionToken,
    pub principal: Principal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

/// One-time profile completion written back to the identity provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingProfile {
    pub display_name: String,
    pub department: String,
    #[serde(default)]
    pub batch: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("no account registered for {0}")]
    UnknownAccount(String),
    #[error("an account already exists for {0}")]
    AccountExists(String),
    #[error("onboarding requires {0}")]
    IncompleteProfile(&'static str),
    #[error("onboarding already completed for {0}")]
    AlreadyOnboarded(PrincipalId),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Session boundary. The submission workflow only reads principals through it.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str) -> Result<Session, IdentityError>;
    async fn sign_up(&self, registration: Registration) -> Result<Session, IdentityError>;
    async fn sign_out(&self, token: &SessionToken) -> Result<(), IdentityError>;
    async fn current(&self, token: &SessionToken) -> Result<Option<Principal>, IdentityError>;
    async fn complete_onboarding(
        &self,
        principal: &PrincipalId,
        profile: OnboardingProfile,
    ) -> Result<Principal, IdentityError>;
}

impl OnboardingProfile {
    /// Apply the profile to a principal, enforcing the fields its role needs.
    ///
    /// Onboarding is a one-time write; a completed profile is never replaced.
    pub fn apply(self, principal: &mut Principal) -> Result<(), IdentityError> {
        if principal.onboarding_complete {
            return Err(IdentityError::AlreadyOnboarded(principal.id.clone()));
        }
        if self.display_name.trim().is_empty() {
            return Err(IdentityError::IncompleteProfile("a display name"));
        }
        if self.department.trim().is_empty() {
            return Err(IdentityError::IncompleteProfile("a department"));
        }

        let batch = self.batch.filter(|batch| !batch.trim().is_empty());
        if principal.role == Role::Student && batch.is_none() {
            return Err(IdentityError::IncompleteProfile("a batch for students"));
        }

        principal.display_name = self.display_name.trim().to_string();
        principal.department = Some(self.department.trim().to_string());
        if principal.role == Role::Student {
            principal.batch = batch.map(|batch| batch.trim().to_string());
        }
        principal.onboarding_complete = true;
        Ok(())
    }
}
