//! Academic record submission and review.
//!
//! Students submit event participation records, the duplicate resolver decides
//! between create, overwrite, and rejection, and staff review and export the
//! records of their own department through live, filterable views.

pub(crate) mod access;
pub mod directory;
pub mod domain;
pub mod export;
pub mod filter;
pub mod identity;
pub(crate) mod intake;
pub mod repository;
pub mod resolver;
pub mod review;
pub mod router;
pub mod service;
pub mod store;
pub mod view;

#[cfg(test)]
mod tests;

pub use access::{AccessBoundary, AccessError};
pub use directory::InMemoryIdentityDirectory;
pub use domain::{
    EventLevel, EventType, PrincipalId, Semester, SubmissionContent, SubmissionDraft,
    SubmissionId, SubmissionRecord, SubmissionStatus,
};
pub use export::{ExportColumn, ExportError, ExportProjector, ExportTable};
pub use filter::{FilterChange, FilterConfig, FilterError, FilterQuery, TimeWindow};
pub use identity::{
    IdentityError, IdentityProvider, OnboardingProfile, Principal, Registration, Role, Session,
    SessionToken,
};
pub use intake::{FieldError, FieldProblem, IntakeGuard, ValidationError};
pub use repository::{
    RepositoryError, StatusPatch, SubmissionRepository, SubmissionScope, Subscription,
    SubscriptionClosed,
};
pub use resolver::{DuplicateResolver, Resolution};
pub use review::{ReviewAck, ReviewDecision, ReviewError, ReviewPolicy};
pub use router::{submission_router, SubmissionApi};
pub use service::{ErrorKind, SubmissionOutcome, SubmissionService, SubmissionServiceError};
pub use store::InMemorySubmissionStore;
pub use view::LiveView;
