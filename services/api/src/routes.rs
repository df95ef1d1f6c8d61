use crate::infra::AppState;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use trackademic::workflows::submissions::router::service_error_response;
use trackademic::workflows::submissions::{
    submission_router, FilterConfig, FilterQuery, IdentityProvider, SubmissionApi,
    SubmissionRepository, SubmissionServiceError,
};
use tracing::warn;

pub(crate) fn with_submission_routes<R, I>(api: Arc<SubmissionApi<R, I>>) -> axum::Router
where
    R: SubmissionRepository + 'static,
    I: IdentityProvider + 'static,
{
    submission_router(api.clone())
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/submissions/export",
            axum::routing::get(export_endpoint::<R, I>).with_state(api),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Filtered records of the caller's scope as a CSV attachment.
pub(crate) async fn export_endpoint<R, I>(
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

    let table = match api.service.snapshot(&principal, filters).await {
        Ok(records) => match api.service.export(&principal, &records) {
            Ok(table) => table,
            Err(err) => return service_error_response(&err),
        },
        Err(err) => return service_error_response(&err),
    };
    let body = match table.to_csv() {
        Ok(body) => body,
        Err(err) => {
            warn!(error = %err, "export rendering failed");
            return service_error_response(&SubmissionServiceError::from(err));
        }
    };

    let file_name = table.file_name();
    let content_type = mime_guess::from_path(&file_name).first_or_octet_stream();
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_str(content_type.essence_str())
                    .unwrap_or_else(|_| HeaderValue::from_static("text/csv")),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}
