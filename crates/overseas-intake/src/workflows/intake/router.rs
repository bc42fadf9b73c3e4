use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::attachments::{PreviewPort, SelectedFile};
use super::documents::DocumentKind;
use super::domain::{GroupField, GroupKind, ProfileField};
use super::lookup::{LookupError, ReferenceLookup};
use super::service::{IntakeWizard, WizardError};
use super::store::DocumentInput;
use super::submission::SubmissionSink;

/// Header carrying the original file name of an uploaded attachment.
pub const FILE_NAME_HEADER: &str = "x-file-name";

/// Headroom above the attachment ceiling so oversized files still reach the policy check.
pub const UPLOAD_BODY_SLACK: u64 = 1024 * 1024;

/// Wizard session shared by the HTTP handlers. Requests are applied one at a time.
pub struct IntakeSession<P: PreviewPort, S, L> {
    wizard: Mutex<IntakeWizard<P, S>>,
    lookup: Arc<L>,
    upload_limit: usize,
}

impl<P, S, L> IntakeSession<P, S, L>
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
{
    pub fn new(wizard: IntakeWizard<P, S>, lookup: Arc<L>) -> Self {
        let ceiling = wizard.store().attachment_policy().max_bytes();
        let upload_limit =
            usize::try_from(ceiling.saturating_add(UPLOAD_BODY_SLACK)).unwrap_or(usize::MAX);
        Self {
            wizard: Mutex::new(wizard),
            lookup,
            upload_limit,
        }
    }

    /// Largest request body accepted on the upload routes.
    pub fn upload_limit(&self) -> usize {
        self.upload_limit
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldUpdate {
    #[serde(default)]
    pub value: String,
}

/// Router builder exposing the wizard session to a rendering client.
pub fn intake_router<P, S, L>(session: Arc<IntakeSession<P, S, L>>) -> Router
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    let upload_limit = session.upload_limit();
    Router::new()
        .route("/api/v1/intake", get(view_handler::<P, S, L>))
        .route(
            "/api/v1/intake/fields/:field",
            put(set_field_handler::<P, S, L>),
        )
        .route(
            "/api/v1/intake/profile-image",
            put(attach_profile_image_handler::<P, S, L>)
                .delete(clear_profile_image_handler::<P, S, L>)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/v1/intake/documents/:kind/fields/:field",
            put(set_document_field_handler::<P, S, L>),
        )
        .route(
            "/api/v1/intake/documents/:kind/slots/:slot",
            put(attach_document_handler::<P, S, L>)
                .delete(clear_document_handler::<P, S, L>)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/v1/intake/references/bmet",
            post(fetch_bmet_handler::<P, S, L>),
        )
        .route(
            "/api/v1/intake/references/visa",
            post(fetch_visa_handler::<P, S, L>),
        )
        .route(
            "/api/v1/intake/groups/:group",
            post(append_entry_handler::<P, S, L>),
        )
        .route(
            "/api/v1/intake/groups/:group/:index",
            delete(remove_entry_handler::<P, S, L>),
        )
        .route(
            "/api/v1/intake/groups/:group/:index/:field",
            put(update_entry_handler::<P, S, L>),
        )
        .route(
            "/api/v1/intake/health-conditions",
            post(add_health_condition_handler::<P, S, L>),
        )
        .route(
            "/api/v1/intake/health-conditions/:index",
            delete(remove_health_condition_handler::<P, S, L>),
        )
        .route(
            "/api/v1/intake/steps/advance",
            post(advance_handler::<P, S, L>),
        )
        .route(
            "/api/v1/intake/steps/retreat",
            post(retreat_handler::<P, S, L>),
        )
        .route("/api/v1/intake/submit", post(submit_handler::<P, S, L>))
        .with_state(session)
}

/// Run `apply` against the locked wizard and answer with the refreshed view.
fn with_wizard<P, S, L, F>(session: &IntakeSession<P, S, L>, apply: F) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    F: FnOnce(&mut IntakeWizard<P, S>, &L) -> Result<(), WizardError>,
{
    let Ok(mut wizard) = session.wizard.lock() else {
        return session_unavailable();
    };
    match apply(&mut *wizard, session.lookup.as_ref()) {
        Ok(()) => (StatusCode::OK, Json(wizard.view())).into_response(),
        Err(err) => err.into_response(),
    }
}

fn session_unavailable() -> Response {
    let payload = json!({ "error": "intake session unavailable" });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}

fn selected_file(headers: &HeaderMap, body: Bytes) -> SelectedFile {
    let header_text = |name: &str, fallback: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    };
    SelectedFile::new(
        header_text(FILE_NAME_HEADER, "upload"),
        header_text(header::CONTENT_TYPE.as_str(), "application/octet-stream"),
        body.to_vec(),
    )
}

pub(crate) async fn view_handler<P, S, L>(
    State(session): State<Arc<IntakeSession<P, S, L>>>,
) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    with_wizard(&session, |_, _| Ok(()))
}

pub(crate) async fn set_field_handler<P, S, L>(
    State(session): State<Arc<IntakeSession<P, S, L>>>,
    Path(field): Path<String>,
    Json(update): Json<FieldUpdate>,
) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    with_wizard(&session, |wizard, _| {
        let field = ProfileField::parse(&field)?;
        wizard.store_mut().set_field(field, &update.value)?;
        Ok(())
    })
}

pub(crate) async fn attach_profile_image_handler<P, S, L>(
    State(session): State<Arc<IntakeSession<P, S, L>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    let file = selected_file(&headers, body);
    with_wizard(&session, |wizard, _| {
        wizard.store_mut().attach_profile_image(&file)?;
        Ok(())
    })
}

pub(crate) async fn clear_profile_image_handler<P, S, L>(
    State(session): State<Arc<IntakeSession<P, S, L>>>,
) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    with_wizard(&session, |wizard, _| {
        wizard.store_mut().clear_profile_image();
        Ok(())
    })
}

pub(crate) async fn set_document_field_handler<P, S, L>(
    State(session): State<Arc<IntakeSession<P, S, L>>>,
    Path((kind, field)): Path<(String, String)>,
    Json(update): Json<FieldUpdate>,
) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    with_wizard(&session, |wizard, _| {
        let kind = DocumentKind::parse(&kind)?;
        wizard
            .store_mut()
            .set_document_input(kind, &field, DocumentInput::Value(update.value))
    })
}

pub(crate) async fn attach_document_handler<P, S, L>(
    State(session): State<Arc<IntakeSession<P, S, L>>>,
    Path((kind, slot)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    let file = selected_file(&headers, body);
    with_wizard(&session, |wizard, _| {
        let kind = DocumentKind::parse(&kind)?;
        wizard
            .store_mut()
            .set_document_input(kind, &slot, DocumentInput::Attachment(file))
    })
}

pub(crate) async fn clear_document_handler<P, S, L>(
    State(session): State<Arc<IntakeSession<P, S, L>>>,
    Path((kind, slot)): Path<(String, String)>,
) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    with_wizard(&session, |wizard, _| {
        let kind = DocumentKind::parse(&kind)?;
        wizard
            .store_mut()
            .set_document_input(kind, &slot, DocumentInput::Clear)
    })
}

pub(crate) async fn fetch_bmet_handler<P, S, L>(
    State(session): State<Arc<IntakeSession<P, S, L>>>,
) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    with_wizard(&session, |wizard, lookup| wizard.fetch_bmet(lookup))
}

pub(crate) async fn fetch_visa_handler<P, S, L>(
    State(session): State<Arc<IntakeSession<P, S, L>>>,
) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    with_wizard(&session, |wizard, lookup| wizard.fetch_visa(lookup))
}

pub(crate) async fn append_entry_handler<P, S, L>(
    State(session): State<Arc<IntakeSession<P, S, L>>>,
    Path(group): Path<String>,
) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    with_wizard(&session, |wizard, _| {
        let kind = GroupKind::parse(&group)?;
        wizard.store_mut().append_entry(kind);
        Ok(())
    })
}

pub(crate) async fn remove_entry_handler<P, S, L>(
    State(session): State<Arc<IntakeSession<P, S, L>>>,
    Path((group, index)): Path<(String, usize)>,
) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    with_wizard(&session, |wizard, _| {
        let kind = GroupKind::parse(&group)?;
        wizard.store_mut().remove_entry(kind, index)?;
        Ok(())
    })
}

pub(crate) async fn update_entry_handler<P, S, L>(
    State(session): State<Arc<IntakeSession<P, S, L>>>,
    Path((group, index, field)): Path<(String, usize, String)>,
    Json(update): Json<FieldUpdate>,
) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    with_wizard(&session, |wizard, _| {
        let field = GroupField::parse(GroupKind::parse(&group)?, &field)?;
        wizard.store_mut().update_entry(index, field, &update.value)?;
        Ok(())
    })
}

pub(crate) async fn add_health_condition_handler<P, S, L>(
    State(session): State<Arc<IntakeSession<P, S, L>>>,
    Json(update): Json<FieldUpdate>,
) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    with_wizard(&session, |wizard, _| {
        wizard.store_mut().add_health_condition(&update.value);
        Ok(())
    })
}

pub(crate) async fn remove_health_condition_handler<P, S, L>(
    State(session): State<Arc<IntakeSession<P, S, L>>>,
    Path(index): Path<usize>,
) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    with_wizard(&session, |wizard, _| {
        wizard.store_mut().remove_health_condition(index)?;
        Ok(())
    })
}

pub(crate) async fn advance_handler<P, S, L>(
    State(session): State<Arc<IntakeSession<P, S, L>>>,
) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    with_wizard(&session, |wizard, _| {
        wizard.advance();
        Ok(())
    })
}

pub(crate) async fn retreat_handler<P, S, L>(
    State(session): State<Arc<IntakeSession<P, S, L>>>,
) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    with_wizard(&session, |wizard, _| {
        wizard.retreat();
        Ok(())
    })
}

pub(crate) async fn submit_handler<P, S, L>(
    State(session): State<Arc<IntakeSession<P, S, L>>>,
) -> Response
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
    L: ReferenceLookup + 'static,
{
    let Ok(mut wizard) = session.wizard.lock() else {
        return session_unavailable();
    };
    match wizard.submit() {
        Ok(receipt) => (StatusCode::ACCEPTED, Json(receipt)).into_response(),
        Err(err) => err.into_response(),
    }
}

impl IntoResponse for WizardError {
    fn into_response(self) -> Response {
        let status = match &self {
            WizardError::Contract(_) => StatusCode::BAD_REQUEST,
            WizardError::Attachment(_) => StatusCode::UNPROCESSABLE_ENTITY,
            WizardError::Lookup(LookupError::NotFound(_)) => StatusCode::NOT_FOUND,
            WizardError::Lookup(_) | WizardError::Submission(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
