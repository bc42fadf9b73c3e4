use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use overseas_intake::workflows::intake::{
    AttachmentError, BmetReference, IntakeRecord, LookupError, PreviewPort, ReferenceLookup,
    SelectedFile, SubmissionError, SubmissionReceipt, SubmissionSink, VisaReference,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-process stand-in for browser blob URLs. Tracks the byte size behind each live URL.
#[derive(Default)]
pub(crate) struct BlobUrlRegistry {
    sequence: AtomicU64,
    live: Mutex<HashMap<String, u64>>,
}

impl BlobUrlRegistry {
    pub(crate) fn live_count(&self) -> usize {
        self.live.lock().expect("blob registry mutex poisoned").len()
    }
}

impl PreviewPort for BlobUrlRegistry {
    fn create_url(&self, file: &SelectedFile) -> Result<String, AttachmentError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let url = format!("blob:intake/{id:08x}");
        self.live
            .lock()
            .expect("blob registry mutex poisoned")
            .insert(url.clone(), file.size());
        debug!(%url, file = %file.file_name, "blob url created");
        Ok(url)
    }

    fn revoke_url(&self, url: &str) {
        let removed = self
            .live
            .lock()
            .expect("blob registry mutex poisoned")
            .remove(url);
        if removed.is_none() {
            warn!(%url, "revoke requested for unknown blob url");
        }
    }
}

/// Keeps a JSON snapshot of every handed-off record.
#[derive(Default)]
pub(crate) struct LoggingSubmissionSink {
    sequence: AtomicU64,
    submissions: Mutex<Vec<serde_json::Value>>,
}

impl LoggingSubmissionSink {
    pub(crate) fn submissions(&self) -> Vec<serde_json::Value> {
        self.submissions
            .lock()
            .expect("submission mutex poisoned")
            .clone()
    }
}

impl SubmissionSink for LoggingSubmissionSink {
    fn hand_off(&self, record: &IntakeRecord) -> Result<SubmissionReceipt, SubmissionError> {
        let snapshot = serde_json::to_value(record)
            .map_err(|err| SubmissionError::Rejected(err.to_string()))?;
        let number = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let reference = format!("OVS-{number:06}");

        self.submissions
            .lock()
            .expect("submission mutex poisoned")
            .push(snapshot);
        info!(
            %reference,
            applicant = %record.full_name,
            attachments = record.live_attachments(),
            "intake record handed off"
        );
        Ok(SubmissionReceipt { reference })
    }
}

pub(crate) const FIXTURE_BMET_NUMBER: &str = "BMET-123456";
pub(crate) const FIXTURE_VISA_NUMBER: &str = "VISA-789012";

/// Registry fixture behind the "Fetch" buttons. A blank number fetches the fixture record.
#[derive(Default)]
pub(crate) struct FixtureReferenceLookup;

impl ReferenceLookup for FixtureReferenceLookup {
    fn bmet(&self, bmet_number: &str) -> Result<BmetReference, LookupError> {
        match bmet_number {
            "" | FIXTURE_BMET_NUMBER => Ok(BmetReference {
                bmet_number: FIXTURE_BMET_NUMBER.to_string(),
                national_id_number: "123456789".to_string(),
            }),
            other => Err(LookupError::NotFound(other.to_string())),
        }
    }

    fn visa(&self, visa_number: &str) -> Result<VisaReference, LookupError> {
        match visa_number {
            "" | FIXTURE_VISA_NUMBER => Ok(VisaReference {
                visa_number: FIXTURE_VISA_NUMBER.to_string(),
                country: "United States".to_string(),
            }),
            other => Err(LookupError::NotFound(other.to_string())),
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Read a file from disk the way a file picker would hand it over.
pub(crate) fn load_selected_file(path: &Path) -> std::io::Result<SelectedFile> {
    let bytes = std::fs::read(path)?;
    let media_type = mime_guess::from_path(path).first_or_octet_stream();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SelectedFile::new(file_name, media_type.essence_str(), bytes))
}
