use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::domain::{
    PrincipalId, SubmissionContent, SubmissionId, SubmissionRecord, SubmissionStatus,
};

/// Which records a live subscription tracks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionScope {
    Department(String),
    Owner(PrincipalId),
}

impl SubmissionScope {
    pub fn matches(&self, record: &SubmissionRecord) -> bool {
        match self {
            SubmissionScope::Department(department) => record.belongs_to(department),
            SubmissionScope::Owner(owner) => record.is_owned_by(owner),
        }
    }
}

impl fmt::Display for SubmissionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionScope::Department(department) => write!(f, "department:{department}"),
            SubmissionScope::Owner(owner) => write!(f, "owner:{owner}"),
        }
    }
}

/// Partial update touching only the status field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPatch {
    pub id: SubmissionId,
    pub status: SubmissionStatus,
    /// Department of the reviewer; the store refuses records outside it.
    pub reviewer_department: String,
}

/// Storage abstraction over the shared submission collection.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Persist a new record. The store assigns the id and timestamp.
    async fn create(&self, content: SubmissionContent) -> Result<SubmissionRecord, RepositoryError>;

    /// Replace the content of an existing record in place, refreshing its timestamp.
    /// Owner and department stay as originally stored.
    async fn replace(
        &self,
        id: &SubmissionId,
        content: SubmissionContent,
    ) -> Result<SubmissionRecord, RepositoryError>;

    async fn update_status(&self, patch: StatusPatch) -> Result<SubmissionRecord, RepositoryError>;

    async fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError>;

    async fn owned_by(&self, owner: &PrincipalId) -> Result<Vec<SubmissionRecord>, RepositoryError>;

    /// Open a standing query. The current matching set is available immediately
    /// and re-pushed on every change to a matching record.
    async fn subscribe(&self, scope: SubmissionScope) -> Result<Subscription, RepositoryError>;

    async fn subscribe_by_department(
        &self,
        department: &str,
    ) -> Result<Subscription, RepositoryError> {
        self.subscribe(SubmissionScope::Department(department.to_string()))
            .await
    }

    async fn subscribe_by_owner(&self, owner: &PrincipalId) -> Result<Subscription, RepositoryError> {
        self.subscribe(SubmissionScope::Owner(owner.clone())).await
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("record belongs to another department")]
    Unauthorized,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// The store closed the channel behind a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("subscription closed by the store")]
pub struct SubscriptionClosed;

type Release = Box<dyn FnOnce() + Send + Sync>;

/// Owned handle on a standing query.
///
/// Dropping the handle (or calling [`Subscription::cancel`]) runs the release
/// hook supplied by the store so the query does not outlive its consumer.
pub struct Subscription {
    scope: SubmissionScope,
    receiver: watch::Receiver<Vec<SubmissionRecord>>,
    release: Option<Release>,
}

impl Subscription {
    pub fn new(
        scope: SubmissionScope,
        receiver: watch::Receiver<Vec<SubmissionRecord>>,
        release: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            scope,
            receiver,
            release: Some(Box::new(release)),
        }
    }

    pub fn scope(&self) -> &SubmissionScope {
        &self.scope
    }

    /// Latest pushed record set, marking it as seen.
    pub fn current(&mut self) -> Vec<SubmissionRecord> {
        self.receiver.borrow_and_update().clone()
    }

    /// Wait for the next push and return the full record set it carries.
    pub async fn changed(&mut self) -> Result<Vec<SubmissionRecord>, SubscriptionClosed> {
        self.receiver
            .changed()
            .await
            .map_err(|_| SubscriptionClosed)?;
        Ok(self.current())
    }

    pub fn has_pending_push(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Release the standing query now.
    pub fn cancel(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("scope", &self.scope)
            .field("released", &self.release.is_none())
            .finish()
    }
}
