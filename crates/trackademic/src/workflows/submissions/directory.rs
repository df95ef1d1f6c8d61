use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use super::domain::PrincipalId;
use super::identity::{
    IdentityError, IdentityProvider, OnboardingProfile, Principal, Registration, Session,
    SessionToken,
};

/// Process-local account directory with bearer sessions.
#[derive(Clone, Default)]
pub struct InMemoryIdentityDirectory {
    state: Arc<Mutex<DirectoryState>>,
}

#[derive(Default)]
struct DirectoryState {
    accounts: HashMap<String, Principal>,
    sessions: HashMap<SessionToken, PrincipalId>,
}

impl InMemoryIdentityDirectory {
    pub fn with_accounts(accounts: impl IntoIterator<Item = Principal>) -> Self {
        let directory = Self::default();
        if let Ok(mut state) = directory.lock() {
            for principal in accounts {
                state.accounts.insert(email_key(&principal.email), principal);
            }
        }
        directory
    }

    /// Open a session for a known account without going through sign-in.
    pub fn issue_session(&self, email: &str) -> Result<Session, IdentityError> {
        let mut state = self.lock()?;
        let principal = state
            .accounts
            .get(&email_key(email))
            .cloned()
            .ok_or_else(|| IdentityError::UnknownAccount(email.to_string()))?;
        Ok(state.open_session(principal))
    }

    pub fn active_sessions(&self) -> usize {
        self.lock()
            .map(|state| state.sessions.len())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, DirectoryState>, IdentityError> {
        self.state
            .lock()
            .map_err(|_| IdentityError::Unavailable("identity directory lock poisoned".to_string()))
    }
}

impl DirectoryState {
    fn open_session(&mut self, principal: Principal) -> Session {
        let token = SessionToken(Uuid::new_v4().simple().to_string());
        self.sessions.insert(token.clone(), principal.id.clone());
        Session { token, principal }
    }

    fn account_by_id(&mut self, id: &PrincipalId) -> Option<&mut Principal> {
        self.accounts
            .values_mut()
            .find(|principal| &principal.id == id)
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityDirectory {
    async fn sign_in(&self, email: &str) -> Result<Session, IdentityError> {
        let session = self.issue_session(email)?;
        info!(principal = %session.principal.id, role = session.principal.role.label(), "signed in");
        Ok(session)
    }

    async fn sign_up(&self, registration: Registration) -> Result<Session, IdentityError> {
        let key = email_key(&registration.email);
        if key.is_empty() {
            return Err(IdentityError::IncompleteProfile("an email address"));
        }

        let mut state = self.lock()?;
        if state.accounts.contains_key(&key) {
            return Err(IdentityError::AccountExists(registration.email));
        }

        let principal = Principal {
            id: PrincipalId(Uuid::new_v4().simple().to_string()),
            email: registration.email.trim().to_string(),
            role: registration.role,
            department: None,
            batch: None,
            display_name: registration.display_name.trim().to_string(),
            onboarding_complete: false,
        };
        state.accounts.insert(key, principal.clone());
        info!(principal = %principal.id, role = principal.role.label(), "account registered");
        Ok(state.open_session(principal))
    }

    async fn sign_out(&self, token: &SessionToken) -> Result<(), IdentityError> {
        let removed = self.lock()?.sessions.remove(token);
        if let Some(principal) = removed {
            debug!(principal = %principal, "signed out");
        }
        Ok(())
    }

    async fn current(&self, token: &SessionToken) -> Result<Option<Principal>, IdentityError> {
        let mut state = self.lock()?;
        let Some(id) = state.sessions.get(token).cloned() else {
            return Ok(None);
        };
        Ok(state.account_by_id(&id).map(|principal| principal.clone()))
    }

    async fn complete_onboarding(
        &self,
        id: &PrincipalId,
        profile: OnboardingProfile,
    ) -> Result<Principal, IdentityError> {
        let mut state = self.lock()?;
        let principal = state
            .account_by_id(id)
            .ok_or_else(|| IdentityError::UnknownAccount(id.to_string()))?;

        let mut updated = principal.clone();
        profile.apply(&mut updated)?;
        *principal = updated.clone();
        info!(principal = %updated.id, department = ?updated.department, "onboarding completed");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::submissions::identity::Role;

    #[tokio::test]
    async fn sign_up_then_onboard_round_trips_through_session() {
        let directory = InMemoryIdentityDirectory::default();
        let session = directory
            .sign_up(Registration {
                email: "New.Student@cit.edu.in".to_string(),
                display_name: "Kavya".to_string(),
                role: Role::Student,
            })
            .await
            .expect("sign up succeeds");
        assert!(!session.principal.onboarding_complete);

        directory
            .complete_onboarding(
                &session.principal.id,
                OnboardingProfile {
                    display_name: "Kavya S".to_string(),
                    department: "ECE".to_string(),
                    batch: Some("2023-2028".to_string()),
                },
            )
            .await
            .expect("onboarding applies");

        let current = directory
            .current(&session.token)
            .await
            .expect("directory available")
            .expect("session active");
        assert!(current.onboarding_complete);
        assert_eq!(current.batch.as_deref(), Some("2023-2028"));

        let duplicate = directory
            .sign_up(Registration {
                email: "new.student@cit.edu.in".to_string(),
                display_name: "Other".to_string(),
                role: Role::Staff,
            })
            .await;
        assert!(matches!(duplicate, Err(IdentityError::AccountExists(_))));
    }

    #[tokio::test]
    async fn sign_out_invalidates_token() {
        let directory = InMemoryIdentityDirectory::default();
        let session = directory
            .sign_up(Registration {
                email: "staff9@cit.edu.in".to_string(),
                display_name: "Prof. Iyer".to_string(),
                role: Role::Staff,
            })
            .await
            .expect("sign up succeeds");

        directory.sign_out(&session.token).await.expect("sign out");
        assert_eq!(directory.active_sessions(), 0);
        assert!(directory
            .current(&session.token)
            .await
            .expect("directory available")
            .is_none());
        assert!(matches!(
            directory.sign_in("missing@cit.edu.in").await,
            Err(IdentityError::UnknownAccount(_))
        ));
    }

    #[tokio::test]
    async fn onboarding_is_written_once() {
        let staff = Principal {
            id: PrincipalId("staff-cse-001".to_string()),
            email: "staff@cit.edu.in".to_string(),
            role: Role::Staff,
            department: Some("CSE".to_string()),
            batch: None,
            display_name: "Dr. Lakshmi".to_string(),
            onboarding_complete: true,
        };
        let directory = InMemoryIdentityDirectory::with_accounts([staff.clone()]);
        let session = directory
            .issue_session("staff@cit.edu.in")
            .expect("seeded account");

        let result = directory
            .complete_onboarding(
                &staff.id,
                OnboardingProfile {
                    display_name: "Dr. Lakshmi".to_string(),
                    department: "ECE".to_string(),
                    batch: None,
                },
            )
            .await;
        assert!(matches!(result, Err(IdentityError::AlreadyOnboarded(_))));

        let current = directory
            .current(&session.token)
            .await
            .expect("directory available")
            .expect("session active");
        assert_eq!(current.department.as_deref(), Some("CSE"));
    }
}
