use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use overseas_intake::workflows::intake::{
    intake_router, DocumentKind, DocumentSchema, IntakeSession, PreviewPort, ReferenceLookup,
    SocialPlatform, SubmissionSink,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct DocumentSchemaEntry {
    pub(crate) kind: DocumentKind,
    pub(crate) label: &'static str,
    #[serde(flatten)]
    pub(crate) schema: DocumentSchema,
}

#[derive(Debug, Serialize)]
pub(crate) struct FormSchemaResponse {
    pub(crate) documents: Vec<DocumentSchemaEntry>,
    pub(crate) social_platforms: Vec<&'static str>,
}

pub(crate) fn with_service_routes<P, S, L>(session: Arc<IntakeSession<P, S, L>>) -> axum::Router
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    intake_router(session)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/intake/schema",
            axum::routing::get(form_schema_endpoint),
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

/// Field and slot names accepted by the document routes.
pub(crate) async fn form_schema_endpoint() -> Json<FormSchemaResponse> {
    let documents = DocumentKind::ordered()
        .into_iter()
        .map(|kind| DocumentSchemaEntry {
            kind,
            label: kind.label(),
            schema: kind.schema(),
        })
        .collect();
    let social_platforms = SocialPlatform::ordered()
        .into_iter()
        .map(SocialPlatform::label)
        .collect();

    Json(FormSchemaResponse {
        documents,
        social_platforms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn schema_lists_every_document() {
        let Json(body) = form_schema_endpoint().await;

        assert_eq!(body.documents.len(), 5);
        let labour_card = body
            .documents
            .iter()
            .find(|entry| entry.kind == DocumentKind::LabourCard)
            .expect("labour card listed");
        assert_eq!(labour_card.schema.slots, ["front", "back", "work_permit"]);
        assert_eq!(body.social_platforms.len(), 5);
    }
}
