use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{SubmissionDraft, SubmissionId};
use super::filter::{FilterConfig, FilterQuery};
use super::identity::{
    IdentityError, IdentityProvider, OnboardingProfile, Principal, Registration, SessionToken,
};
use super::repository::SubmissionRepository;
use super::review::ReviewDecision;
use super::service::{ErrorKind, SubmissionOutcome, SubmissionService, SubmissionServiceError};

/// Shared state behind the submission routes.
pub struct SubmissionApi<R, I> {
    pub service: Arc<SubmissionService<R>>,
    pub identity: Arc<I>,
}

impl<R, I> SubmissionApi<R, I>
where
    R: SubmissionRepository + 'static,
    I: IdentityProvider + 'static,
{
    pub fn new(service: Arc<SubmissionService<R>>, identity: Arc<I>) -> Self {
        Self { service, identity }
    }

    /// Resolve the caller from `Authorization: Bearer <token>`.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, Response> {
        let token = bearer_token(headers).ok_or_else(|| unauthenticated("missing bearer token"))?;
        match self.identity.current(&token).await {
            Ok(Some(principal)) => Ok(principal),
            Ok(None) => Err(unauthenticated("session expired or unknown")),
            Err(err) => Err(identity_error_response(&err)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SignInRequest {
    pub(crate) email: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewRequest {
    pub(crate) decision: ReviewDecision,
}

/// Router builder exposing sign-in, intake, listing, and review endpoints.
pub fn submission_router<R, I>(api: Arc<SubmissionApi<R, I>>) -> Router
where
    R: SubmissionRepository + 'static,
    I: IdentityProvider + 'static,
{
    Router::new()
        .route("/api/v1/auth/sign-in", post(sign_in_handler::<R, I>))
        .route("/api/v1/auth/sign-up", post(sign_up_handler::<R, I>))
        .route("/api/v1/auth/sign-out", post(sign_out_handler::<R, I>))
        .route("/api/v1/auth/onboarding", post(onboarding_handler::<R, I>))
        .route(
            "/api/v1/submissions",
            post(submit_handler::<R, I>).get(list_handler::<R, I>),
        )
        .route(
            "/api/v1/submissions/:submission_id/review",
            post(review_handler::<R, I>),
        )
        .with_state(api)
}

pub(crate) async fn sign_in_handler<R, I>(
    State(api): State<Arc<SubmissionApi<R, I>>>,
    axum::Json(request): axum::Json<SignInRequest>,
) -> Response
where
    R: SubmissionRepository + 'static,
    I: IdentityProvider + 'static,
{
    match api.identity.sign_in(&request.email).await {
        Ok(session) => (StatusCode::OK, axum::Json(session)).into_response(),
        Err(err) => identity_error_response(&err),
    }
}

pub(crate) async fn sign_up_handler<R, I>(
    State(api): State<Arc<SubmissionApi<R, I>>>,
    axum::Json(registration): axum::Json<Registration>,
) -> Response
where
    R: SubmissionRepository + 'static,
    I: IdentityProvider + 'static,
{
    match api.identity.sign_up(registration).await {
        Ok(session) => (StatusCode::CREATED, axum::Json(session)).into_response(),
        Err(err) => identity_error_response(&err),
    }
}

pub(crate) async fn sign_out_handler<R, I>(
    State(api): State<Arc<SubmissionApi<R, I>>>,
    headers: HeaderMap,
) -> Response
where
    R: SubmissionRepository + 'static,
    I: IdentityProvider + 'static,
{
    let Some(token) = bearer_token(&headers) else {
        return unauthenticated("missing bearer token");
    };
    match api.identity.sign_out(&token).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => identity_error_response(&err),
    }
}

pub(crate) async fn onboarding_handler<R, I>(
    State(api): State<Arc<SubmissionApi<R, I>>>,
    headers: HeaderMap,
    axum::Json(profile): axum::Json<OnboardingProfile>,
) -> Response
where
    R: SubmissionRepository + 'static,
    I: IdentityProvider + 'static,
{
    let principal = match api.authenticate(&headers).await {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    match api.identity.complete_onboarding(&principal.id, profile).await {
        Ok(principal) => (StatusCode::OK, axum::Json(principal)).into_response(),
        Err(err) => identity_error_response(&err),
    }
}

pub(crate) async fn submit_handler<R, I>(
    State(api): State<Arc<SubmissionApi<R, I>>>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<SubmissionDraft>,
) -> Response
where
    R: SubmissionRepository + 'static,
    I: IdentityProvider + 'static,
{
    let principal = match api.authenticate(&headers).await {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    match api.service.submit(&principal, draft).await {
        Ok(outcome) => {
            let status = match outcome {
                SubmissionOutcome::Created(_) => StatusCode::CREATED,
                SubmissionOutcome::Overwritten(_) => StatusCode::OK,
            };
            let payload = json!({
                "message": outcome.message(),
                "record": outcome.record(),
            });
            (status, axum::Json(payload)).into_response()
        }
        Err(err) => service_error_response(&err),
    }
}

pub(crate) async fn list_handler<R, I>(
    State(api): State<Arc<SubmissionApi<R, I>>>,
    headers: HeaderMap,
    Query(query): Query<FilterQuery>,
) -> Response
where
    R: SubmissionRepository + 'static,
    I: IdentityProvider + 'static,
{
    let principal = match api.authenticate(&headers).await {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    let filters = match FilterConfig::try_from(query) {
        Ok(filters) => filters,
        Err(err) => return service_error_response(&SubmissionServiceError::from(err)),
    };
    match api.service.snapshot(&principal, filters.clone()).await {
        Ok(records) => {
            let payload = json!({
                "filters": filters,
                "total": records.len(),
                "records": records,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => service_error_response(&err),
    }
}

pub(crate) async fn review_handler<R, I>(
    State(api): State<Arc<SubmissionApi<R, I>>>,
    headers: HeaderMap,
    Path(submission_id): Path<String>,
    axum::Json(request): axum::Json<ReviewRequest>,
) -> Response
where
    R: SubmissionRepository + 'static,
    I: IdentityProvider + 'static,
{
    let principal = match api.authenticate(&headers).await {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    let id = SubmissionId(submission_id);
    match api.service.review(&principal, &id, request.decision).await {
        Ok(ack) => (StatusCode::OK, axum::Json(ack)).into_response(),
        Err(err) => service_error_response(&err),
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<SessionToken> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return None;
    }
    Some(SessionToken(token.trim().to_string()))
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::DuplicateEntry | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        ErrorKind::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::InvalidFilter => StatusCode::BAD_REQUEST,
        ErrorKind::ExportFailed => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn service_error_response(err: &SubmissionServiceError) -> Response {
    let kind = err.kind();
    let payload = match err {
        SubmissionServiceError::DuplicateEntry { existing } => json!({
            "error": err.to_string(),
            "kind": kind,
            "existingId": existing,
        }),
        SubmissionServiceError::Validation(validation) => json!({
            "error": err.to_string(),
            "kind": kind,
            "fields": validation
                .fields
                .iter()
                .map(|field| json!({ "field": field.field, "message": field.to_string() }))
                .collect::<Vec<_>>(),
        }),
        _ => json!({
            "error": err.to_string(),
            "kind": kind,
        }),
    };
    (status_for(kind), axum::Json(payload)).into_response()
}

fn identity_error_response(err: &IdentityError) -> Response {
    let status = match err {
        IdentityError::UnknownAccount(_) => StatusCode::UNAUTHORIZED,
        IdentityError::AccountExists(_) => StatusCode::CONFLICT,
        IdentityError::IncompleteProfile(_) => StatusCode::UNPROCESSABLE_ENTITY,
        IdentityError::AlreadyOnboarded(_) => StatusCode::CONFLICT,
        IdentityError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn unauthenticated(reason: &str) -> Response {
    let payload = json!({ "error": reason });
    (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
}
