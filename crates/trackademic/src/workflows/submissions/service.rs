use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::access::{AccessBoundary, AccessError};
use super::domain::{SubmissionDraft, SubmissionId, SubmissionRecord};
use super::export::{ExportError, ExportProjector, ExportTable};
use super::filter::{FilterConfig, FilterError};
use super::identity::{Principal, Role};
use super::intake::{IntakeGuard, ValidationError};
use super::repository::{RepositoryError, StatusPatch, SubmissionRepository};
use super::resolver::{DuplicateResolver, Resolution};
use super::review::{ReviewAck, ReviewDecision, ReviewError, ReviewPolicy};
use super::view::LiveView;
use crate::config::WorkspaceConfig;

/// Service composing intake validation, duplicate resolution, the repository,
/// filtering, review, and export.
pub struct SubmissionService<R> {
    repository: Arc<R>,
    guard: IntakeGuard,
    resolver: DuplicateResolver,
    access: AccessBoundary,
    policy: ReviewPolicy,
    projector: ExportProjector,
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "record", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Created(SubmissionRecord),
    Overwritten(SubmissionRecord),
}

impl SubmissionOutcome {
    pub fn record(&self) -> &SubmissionRecord {
        match self {
            SubmissionOutcome::Created(record) | SubmissionOutcome::Overwritten(record) => record,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            SubmissionOutcome::Created(_) => "Submission successful! It is now pending for review.",
            SubmissionOutcome::Overwritten(_) => "Entry updated successfully (overwritten).",
        }
    }
}

impl<R> SubmissionService<R>
where
    R: SubmissionRepository + 'static,
{
    pub fn new(repository: Arc<R>, workspace: &WorkspaceConfig) -> Self {
        Self {
            repository,
            guard: IntakeGuard,
            resolver: DuplicateResolver,
            access: AccessBoundary,
            policy: workspace.review_policy,
            projector: ExportProjector::new(workspace.app_name.clone()),
        }
    }

    pub fn review_policy(&self) -> ReviewPolicy {
        self.policy
    }

    /// Validate a student's draft, then create, overwrite, or reject it as a duplicate.
    pub async fn submit(
        &self,
        principal: &Principal,
        draft: SubmissionDraft,
    ) -> Result<SubmissionOutcome, SubmissionServiceError> {
        self.access.require_role(principal, Role::Student)?;
        let candidate = self.guard.content_from_draft(principal, draft)?;
        let existing = self.repository.owned_by(&candidate.owner_id).await?;

        match self.resolver.resolve(candidate, &existing) {
            Resolution::Create(content) => {
                let record = self.repository.create(content).await?;
                info!(id = %record.id, owner = %record.content.owner_id, "submission created");
                Ok(SubmissionOutcome::Created(record))
            }
            Resolution::Overwrite { existing, content } => {
                let record = self.repository.replace(&existing, content).await?;
                warn!(id = %record.id, owner = %record.content.owner_id, "submission silently overwritten");
                Ok(SubmissionOutcome::Overwritten(record))
            }
            Resolution::Duplicate { existing } => {
                info!(id = %existing, "duplicate submission rejected");
                Err(SubmissionServiceError::DuplicateEntry { existing })
            }
        }
    }

    /// Open the principal's live view: department scope for staff, own records for students.
    pub async fn open_view(
        &self,
        principal: &Principal,
        filters: FilterConfig,
    ) -> Result<LiveView, SubmissionServiceError> {
        let subscription = match principal.role {
            Role::Staff => {
                let department = self.access.staff_department(principal)?;
                self.repository.subscribe_by_department(department).await?
            }
            Role::Student => {
                self.access.require_role(principal, Role::Student)?;
                self.repository.subscribe_by_owner(&principal.id).await?
            }
        };
        info!(scope = %subscription.scope(), "live view opened");
        Ok(LiveView::new(subscription, filters))
    }

    /// One-off filtered read; the standing query is released before returning.
    pub async fn snapshot(
        &self,
        principal: &Principal,
        filters: FilterConfig,
    ) -> Result<Vec<SubmissionRecord>, SubmissionServiceError> {
        let view = self.open_view(principal, filters).await?;
        let visible = view.visible().to_vec();
        view.close();
        Ok(visible)
    }

    /// Apply a staff decision. The record changes only once the store acknowledges it.
    pub async fn review(
        &self,
        principal: &Principal,
        id: &SubmissionId,
        decision: ReviewDecision,
    ) -> Result<ReviewAck, SubmissionServiceError> {
        let department = self.access.staff_department(principal)?.to_string();
        let record = self
            .repository
            .fetch(id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        self.access.require_reviewer(principal, &record)?;

        let status = self.policy.transition(record.status, decision)?;
        let patch = StatusPatch {
            id: id.clone(),
            status,
            reviewer_department: department,
        };

        match self.repository.update_status(patch).await {
            Ok(updated) => {
                info!(id = %id, from = record.status.label(), to = updated.status.label(), "review applied");
                Ok(ReviewAck {
                    id: updated.id,
                    previous: record.status,
                    status: updated.status,
                })
            }
            Err(err) => {
                warn!(id = %id, error = %err, "review not applied");
                Err(err.into())
            }
        }
    }

    /// Project records (normally a view's visible slice) for the principal's audience.
    pub fn export(
        &self,
        principal: &Principal,
        records: &[SubmissionRecord],
    ) -> Result<ExportTable, SubmissionServiceError> {
        let department = self.access.department(principal)?;
        let table = self.projector.project(principal.role, department, records);
        info!(file = %table.file_name(), rows = table.len(), "export prepared");
        Ok(table)
    }
}

/// Coarse failure classes reported to the invoking action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DuplicateEntry,
    StoreUnavailable,
    NotFound,
    Unauthorized,
    ValidationError,
    Conflict,
    InvalidFilter,
    ExportFailed,
}

/// Error raised by the submission service.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionServiceError {
    #[error("an identical entry already exists; no change was made")]
    DuplicateEntry { existing: SubmissionId },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Review(#[from] ReviewError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl SubmissionServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SubmissionServiceError::DuplicateEntry { .. } => ErrorKind::DuplicateEntry,
            SubmissionServiceError::Validation(_) => ErrorKind::ValidationError,
            SubmissionServiceError::Access(_)
            | SubmissionServiceError::Repository(RepositoryError::Unauthorized) => {
                ErrorKind::Unauthorized
            }
            SubmissionServiceError::Review(_) => ErrorKind::Conflict,
            SubmissionServiceError::Filter(_) => ErrorKind::InvalidFilter,
            SubmissionServiceError::Repository(RepositoryError::NotFound) => ErrorKind::NotFound,
            SubmissionServiceError::Repository(RepositoryError::Unavailable(_)) => {
                ErrorKind::StoreUnavailable
            }
            SubmissionServiceError::Export(_) => ErrorKind::ExportFailed,
        }
    }
}
