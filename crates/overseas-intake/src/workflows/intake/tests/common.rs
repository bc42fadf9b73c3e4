use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use axum::Router;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::intake::{
    intake_router, AttachmentError, AttachmentPolicy, BmetReference, Clock, FixedClock,
    IntakeFormStore, IntakeRecord, IntakeSession, IntakeWizard, LookupError, OptionCatalogs,
    PreviewPort, ReferenceLookup, SelectedFile, SubmissionError, SubmissionReceipt,
    SubmissionSink, VisaReference,
};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
}

pub(super) fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(today()))
}

pub(super) fn png(name: &str) -> SelectedFile {
    SelectedFile::new(name, "image/png", vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a])
}

pub(super) fn pdf(name: &str) -> SelectedFile {
    SelectedFile::new(name, "application/pdf", b"%PDF-1.7".to_vec())
}

/// Preview port that tracks which URLs are live and fails loudly on a double revoke.
#[derive(Default)]
pub(super) struct CountingPreviewPort {
    ledger: Mutex<PreviewLedger>,
}

#[derive(Default)]
struct PreviewLedger {
    next: u64,
    created: usize,
    live: HashSet<String>,
    revoked: Vec<String>,
    fail_next: bool,
}

impl CountingPreviewPort {
    pub(super) fn live(&self) -> usize {
        self.ledger.lock().expect("ledger").live.len()
    }

    pub(super) fn created(&self) -> usize {
        self.ledger.lock().expect("ledger").created
    }

    pub(super) fn revoked(&self) -> Vec<String> {
        self.ledger.lock().expect("ledger").revoked.clone()
    }

    pub(super) fn is_live(&self, url: &str) -> bool {
        self.ledger.lock().expect("ledger").live.contains(url)
    }

    pub(super) fn fail_next_create(&self) {
        self.ledger.lock().expect("ledger").fail_next = true;
    }
}

impl PreviewPort for CountingPreviewPort {
    fn create_url(&self, file: &SelectedFile) -> Result<String, AttachmentError> {
        let mut ledger = self.ledger.lock().expect("ledger");
        if std::mem::take(&mut ledger.fail_next) {
            return Err(AttachmentError::Unreadable {
                file_name: file.file_name.clone(),
                reason: "read error".to_string(),
            });
        }
        ledger.next += 1;
        ledger.created += 1;
        let url = format!("blob:preview/{}", ledger.next);
        ledger.live.insert(url.clone());
        Ok(url)
    }

    fn revoke_url(&self, url: &str) {
        let mut ledger = self.ledger.lock().expect("ledger");
        assert!(ledger.live.remove(url), "preview {url} revoked twice");
        ledger.revoked.push(url.to_string());
    }
}

#[derive(Default)]
pub(super) struct MemorySink {
    submitted: Mutex<Vec<String>>,
}

impl MemorySink {
    pub(super) fn submitted(&self) -> Vec<String> {
        self.submitted.lock().expect("sink").clone()
    }
}

impl SubmissionSink for MemorySink {
    fn hand_off(&self, record: &IntakeRecord) -> Result<SubmissionReceipt, SubmissionError> {
        let mut submitted = self.submitted.lock().expect("sink");
        submitted.push(record.full_name.clone());
        Ok(SubmissionReceipt {
            reference: format!("INTAKE-{:04}", submitted.len()),
        })
    }
}

pub(super) struct FailingSink;

impl SubmissionSink for FailingSink {
    fn hand_off(&self, _record: &IntakeRecord) -> Result<SubmissionReceipt, SubmissionError> {
        Err(SubmissionError::Transport("queue offline".to_string()))
    }
}

pub(super) struct FixtureLookup;

impl ReferenceLookup for FixtureLookup {
    fn bmet(&self, bmet_number: &str) -> Result<BmetReference, LookupError> {
        match bmet_number {
            "BMET-123456" => Ok(BmetReference {
                bmet_number: bmet_number.to_string(),
                national_id_number: "123456789".to_string(),
            }),
            other => Err(LookupError::NotFound(other.to_string())),
        }
    }

    fn visa(&self, visa_number: &str) -> Result<VisaReference, LookupError> {
        match visa_number {
            "VISA-789012" => Ok(VisaReference {
                visa_number: visa_number.to_string(),
                country: "United States".to_string(),
            }),
            other => Err(LookupError::NotFound(other.to_string())),
        }
    }
}

pub(super) fn build_store() -> (IntakeFormStore<CountingPreviewPort>, Arc<CountingPreviewPort>) {
    build_store_with_policy(AttachmentPolicy::default())
}

pub(super) fn build_store_with_policy(
    policy: AttachmentPolicy,
) -> (IntakeFormStore<CountingPreviewPort>, Arc<CountingPreviewPort>) {
    let port = Arc::new(CountingPreviewPort::default());
    let store = IntakeFormStore::new(port.clone(), policy, OptionCatalogs::reference(), clock());
    (store, port)
}

pub(super) type TestWizard = IntakeWizard<CountingPreviewPort, MemorySink>;

pub(super) fn build_wizard() -> (TestWizard, Arc<CountingPreviewPort>, Arc<MemorySink>) {
    let port = Arc::new(CountingPreviewPort::default());
    let sink = Arc::new(MemorySink::default());
    let wizard = IntakeWizard::new(
        port.clone(),
        sink.clone(),
        AttachmentPolicy::default(),
        OptionCatalogs::reference(),
        clock(),
    );
    (wizard, port, sink)
}

pub(super) fn failing_wizard() -> (
    IntakeWizard<CountingPreviewPort, FailingSink>,
    Arc<CountingPreviewPort>,
) {
    let port = Arc::new(CountingPreviewPort::default());
    let wizard = IntakeWizard::new(
        port.clone(),
        Arc::new(FailingSink),
        AttachmentPolicy::default(),
        OptionCatalogs::reference(),
        clock(),
    );
    (wizard, port)
}

pub(super) fn router_with_wizard(wizard: TestWizard) -> Router {
    intake_router(Arc::new(IntakeSession::new(wizard, Arc::new(FixtureLookup))))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
