use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, HeaderValue, Request};
use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::config::WorkspaceConfig;
use crate::workflows::submissions::directory::InMemoryIdentityDirectory;
use crate::workflows::submissions::domain::{
    EventLevel, EventType, PrincipalId, Semester, SubmissionContent, SubmissionDraft,
    SubmissionId, SubmissionRecord, SubmissionStatus,
};
use crate::workflows::submissions::identity::{Principal, Role};
use crate::workflows::submissions::repository::{
    RepositoryError, StatusPatch, SubmissionRepository, SubmissionScope, Subscription,
};
use crate::workflows::submissions::review::ReviewPolicy;
use crate::workflows::submissions::router::{submission_router, SubmissionApi};
use crate::workflows::submissions::service::SubmissionService;
use crate::workflows::submissions::store::InMemorySubmissionStore;

pub(super) const APP_ID: &str = "trackademic-test";

pub(super) fn student() -> Principal {
    Principal {
        id: PrincipalId("stu-cse-001".to_string()),
        email: "student@cit.edu.in".to_string(),
        role: Role::Student,
        department: Some("CSE".to_string()),
        batch: Some("2022-2027".to_string()),
        display_name: "Asha Kumar".to_string(),
        onboarding_complete: true,
    }
}

pub(super) fn second_student() -> Principal {
    Principal {
        id: PrincipalId("stu-ece-002".to_string()),
        email: "student2@cit.edu.in".to_string(),
        role: Role::Student,
        department: Some("ECE".to_string()),
        batch: Some("2022-2027".to_string()),
        display_name: "Ravi Menon".to_string(),
        onboarding_complete: true,
    }
}

pub(super) fn staff() -> Principal {
    Principal {
        id: PrincipalId("staff-cse-001".to_string()),
        email: "staff@cit.edu.in".to_string(),
        role: Role::Staff,
        department: Some("CSE".to_string()),
        batch: None,
        display_name: "Dr. Lakshmi".to_string(),
        onboarding_complete: true,
    }
}

pub(super) fn ece_staff() -> Principal {
    Principal {
        id: PrincipalId("staff-ece-002".to_string()),
        email: "staff2@cit.edu.in".to_string(),
        role: Role::Staff,
        department: Some("ECE".to_string()),
        batch: None,
        display_name: "Prof. Suresh".to_string(),
        onboarding_complete: true,
    }
}

pub(super) fn draft() -> SubmissionDraft {
    SubmissionDraft {
        event_name: "AI/ML Workshop".to_string(),
        event_type: "Workshop".to_string(),
        organizer: "CSE Dept, CIT".to_string(),
        hosting_institution: "CIT".to_string(),
        level: "Intra-college".to_string(),
        event_date: "2024-03-15".to_string(),
        semester: "4".to_string(),
        certificate_link: "https://drive.google.com/drive/folders/1a2b3c".to_string(),
    }
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Stored record with explicit stamps, for seeding stores and filter inputs.
pub(super) fn record(
    id: &str,
    department: &str,
    event_name: &str,
    event_date: Option<NaiveDate>,
    status: SubmissionStatus,
) -> SubmissionRecord {
    SubmissionRecord {
        id: SubmissionId(id.to_string()),
        content: SubmissionContent {
            owner_id: PrincipalId(format!("owner-{id}")),
            email: format!("{id}@cit.edu.in"),
            display_name: format!("Student {id}"),
            department: department.to_string(),
            batch: "2022-2027".to_string(),
            semester: Semester::new(4).expect("valid semester"),
            event_name: event_name.to_string(),
            event_type: EventType::Workshop,
            organizer: "CIT".to_string(),
            hosting_institution: "CIT".to_string(),
            level: EventLevel::IntraCollege,
            event_date,
            certificate_link: "https://example.org/cert".to_string(),
        },
        status,
        last_modified: event_date
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .map(|naive| naive.and_utc())
            .unwrap_or_else(|| at(2024, 1, 1)),
    }
}

pub(super) fn workspace(policy: ReviewPolicy) -> WorkspaceConfig {
    WorkspaceConfig {
        app_id: APP_ID.to_string(),
        app_name: "Trackademic".to_string(),
        review_policy: policy,
    }
}

pub(super) fn build_service() -> (
    SubmissionService<InMemorySubmissionStore>,
    InMemorySubmissionStore,
) {
    build_service_with_policy(ReviewPolicy::Open)
}

pub(super) fn build_service_with_policy(
    policy: ReviewPolicy,
) -> (
    SubmissionService<InMemorySubmissionStore>,
    InMemorySubmissionStore,
) {
    let store = InMemorySubmissionStore::new(APP_ID);
    let service = SubmissionService::new(Arc::new(store.clone()), &workspace(policy));
    (service, store)
}

pub(super) fn directory() -> InMemoryIdentityDirectory {
    InMemoryIdentityDirectory::with_accounts([student(), second_student(), staff(), ece_staff()])
}

pub(super) fn build_api() -> (
    Arc<SubmissionApi<InMemorySubmissionStore, InMemoryIdentityDirectory>>,
    InMemorySubmissionStore,
    InMemoryIdentityDirectory,
) {
    let (service, store) = build_service();
    let directory = directory();
    let api = Arc::new(SubmissionApi::new(
        Arc::new(service),
        Arc::new(directory.clone()),
    ));
    (api, store, directory)
}

pub(super) fn submission_router_with_api<R>(
    api: Arc<SubmissionApi<R, InMemoryIdentityDirectory>>,
) -> axum::Router
where
    R: SubmissionRepository + 'static,
{
    submission_router(api)
}

pub(super) fn authorized(
    builder: axum::http::request::Builder,
    token: &str,
) -> axum::http::request::Builder {
    let value = HeaderValue::from_str(&format!("Bearer {token}")).expect("valid header");
    builder.header(header::AUTHORIZATION, value)
}

pub(super) fn json_request(
    builder: axum::http::request::Builder,
    body: &Value,
) -> Request<axum::body::Body> {
    builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(body).expect("body serializes"),
        ))
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body readable");
    serde_json::from_slice(&body).expect("valid json")
}

/// Store that refuses every call.
pub(super) struct UnavailableRepository;

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("store offline".to_string())
}

#[async_trait]
impl SubmissionRepository for UnavailableRepository {
    async fn create(&self, _content: SubmissionContent) -> Result<SubmissionRecord, RepositoryError> {
        Err(offline())
    }

    async fn replace(
        &self,
        _id: &SubmissionId,
        _content: SubmissionContent,
    ) -> Result<SubmissionRecord, RepositoryError> {
        Err(offline())
    }

    async fn update_status(&self, _patch: StatusPatch) -> Result<SubmissionRecord, RepositoryError> {
        Err(offline())
    }

    async fn fetch(&self, _id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        Err(offline())
    }

    async fn owned_by(&self, _owner: &PrincipalId) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        Err(offline())
    }

    async fn subscribe(&self, _scope: SubmissionScope) -> Result<Subscription, RepositoryError> {
        Err(offline())
    }
}

/// Delegates to a real store but fails every status write.
pub(super) struct RejectingStatusRepository {
    pub(super) inner: InMemorySubmissionStore,
}

#[async_trait]
impl SubmissionRepository for RejectingStatusRepository {
    async fn create(&self, content: SubmissionContent) -> Result<SubmissionRecord, RepositoryError> {
        self.inner.create(content).await
    }

    async fn replace(
        &self,
        id: &SubmissionId,
        content: SubmissionContent,
    ) -> Result<SubmissionRecord, RepositoryError> {
        self.inner.replace(id, content).await
    }

    async fn update_status(&self, _patch: StatusPatch) -> Result<SubmissionRecord, RepositoryError> {
        Err(offline())
    }

    async fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        self.inner.fetch(id).await
    }

    async fn owned_by(&self, owner: &PrincipalId) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        self.inner.owned_by(owner).await
    }

    async fn subscribe(&self, scope: SubmissionScope) -> Result<Subscription, RepositoryError> {
        self.inner.subscribe(scope).await
    }
}
