use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::attachments::{AttachmentError, AttachmentPolicy, PreviewPort};
use super::derived::Clock;
use super::domain::{ContractViolation, IntakeRecord, OptionCatalogs};
use super::lookup::{LookupError, ReferenceLookup};
use super::steps::{IntakeStep, StepController};
use super::store::IntakeFormStore;
use super::submission::{SubmissionError, SubmissionReceipt, SubmissionSink};
use super::validation::{self, ValidationHint};

/// One applicant's wizard session: the form store, step navigation and the
/// submission hand-off.
pub struct IntakeWizard<P: PreviewPort, S> {
    store: IntakeFormStore<P>,
    steps: StepController,
    sink: Arc<S>,
}

impl<P, S> IntakeWizard<P, S>
where
    P: PreviewPort + 'static,
    S: SubmissionSink + 'static,
{
    pub fn new(
        port: Arc<P>,
        sink: Arc<S>,
        policy: AttachmentPolicy,
        catalogs: OptionCatalogs,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_store(IntakeFormStore::new(port, policy, catalogs, clock), sink)
    }

    pub fn with_store(store: IntakeFormStore<P>, sink: Arc<S>) -> Self {
        Self {
            store,
            steps: StepController::new(),
            sink,
        }
    }

    pub fn store(&self) -> &IntakeFormStore<P> {
        &self.store
    }

    /// Mutation access for the rendering layer's field events.
    pub fn store_mut(&mut self) -> &mut IntakeFormStore<P> {
        &mut self.store
    }

    pub fn record(&self) -> &IntakeRecord {
        self.store.record()
    }

    pub fn step(&self) -> IntakeStep {
        self.steps.current()
    }

    pub fn steps(&self) -> &StepController {
        &self.steps
    }

    pub fn advance(&mut self) -> IntakeStep {
        if self.steps.advance() {
            info!(step = self.steps.current().number(), "wizard advanced");
        }
        self.steps.current()
    }

    pub fn retreat(&mut self) -> IntakeStep {
        if self.steps.retreat() {
            info!(step = self.steps.current().number(), "wizard moved back");
        }
        self.steps.current()
    }

    /// Look up the entered BMET number and copy the registration into the record.
    pub fn fetch_bmet<L>(&mut self, lookup: &L) -> Result<(), WizardError>
    where
        L: ReferenceLookup + ?Sized,
    {
        let reference = lookup.bmet(self.store.record().bmet_number.trim())?;
        self.store.apply_bmet_reference(reference)?;
        Ok(())
    }

    pub fn fetch_visa<L>(&mut self, lookup: &L) -> Result<(), WizardError>
    where
        L: ReferenceLookup + ?Sized,
    {
        let reference = lookup.visa(self.store.record().visa_number.trim())?;
        self.store.apply_visa_reference(reference)?;
        Ok(())
    }

    /// Advisory hints for the current step.
    pub fn hints(&self) -> Vec<ValidationHint> {
        validation::review(self.store.record(), self.steps.current())
    }

    pub fn view(&self) -> WizardView<'_> {
        let step = self.steps.current();
        let catalogs = self.store.catalogs();
        WizardView {
            step,
            step_number: step.number(),
            step_label: step.label(),
            progress_percent: self.steps.progress_percent(),
            can_submit: self.steps.can_submit(),
            purpose_options: &catalogs.purposes,
            profession_options: &catalogs.professions,
            hints: self.hints(),
            record: self.store.record(),
        }
    }

    /// Hand the record to the submission collaborator, then start a new session.
    ///
    /// On failure the record and its previews are kept so the applicant can try again.
    pub fn submit(&mut self) -> Result<SubmissionReceipt, WizardError> {
        if !self.steps.can_submit() {
            let step = self.steps.current().number();
            return Err(ContractViolation::SubmitBeforeFinalStep(step).into());
        }

        let receipt = match self.sink.hand_off(self.store.record()) {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(error = %err, "intake submission failed");
                return Err(err.into());
            }
        };

        info!(reference = %receipt.reference, "intake submitted");
        self.store.reset();
        self.steps.restart();
        Ok(receipt)
    }
}

/// Snapshot handed to the rendering layer.
#[derive(Debug, Serialize)]
pub struct WizardView<'a> {
    pub step: IntakeStep,
    pub step_number: u8,
    pub step_label: &'static str,
    pub progress_percent: u8,
    pub can_submit: bool,
    pub purpose_options: &'a [String],
    pub profession_options: &'a [String],
    pub hints: Vec<ValidationHint>,
    pub record: &'a IntakeRecord,
}

/// Error raised by wizard operations.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error(transparent)]
    Contract(#[from] ContractViolation),
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
}
