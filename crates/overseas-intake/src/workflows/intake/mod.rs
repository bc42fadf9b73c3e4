//! Overseas-employment intake wizard.
//!
//! A three-step form session: profile details, contacts and health, then
//! official documents. The [`IntakeFormStore`] owns the record and every
//! attachment preview; [`IntakeWizard`] adds step navigation and the
//! submission hand-off; [`intake_router`] exposes a session over HTTP.

pub mod attachments;
pub mod derived;
pub mod documents;
pub mod domain;
pub mod groups;
pub mod lookup;
pub mod router;
pub mod service;
pub mod steps;
pub mod store;
pub mod submission;
pub mod validation;

#[cfg(test)]
mod tests;

pub use attachments::{
    AttachmentError, AttachmentHandle, AttachmentLifecycle, AttachmentPolicy, AttachmentSlot,
    PreviewPort, SelectedFile, DEFAULT_MAX_ATTACHMENT_BYTES,
};
pub use derived::{Clock, DerivedAge, FixedClock, SystemClock};
pub use documents::{
    CardSide, DocumentField, DocumentKind, DocumentSchema, DocumentSlot, IdentityField,
    LabourCardField, LabourCardSlot, OfficialDocuments, VisaField,
};
pub use domain::{
    CatalogKind, Classification, ContractViolation, EmergencyContact, EmergencyContactField,
    Gender, GroupField, GroupKind, IntakeRecord, OptionCatalogs, OverseasContact,
    OverseasContactField, ProfileField, SocialHandle, SocialHandleField, SocialPlatform,
    OTHERS_OPTION,
};
pub use groups::{GroupEntry, RepeatableGroup, TagList};
pub use lookup::{BmetReference, LookupError, ReferenceLookup, VisaReference};
pub use router::{intake_router, IntakeSession};
pub use service::{IntakeWizard, WizardError, WizardView};
pub use steps::{IntakeStep, StepController};
pub use store::{DocumentInput, IntakeFormStore};
pub use submission::{SubmissionError, SubmissionReceipt, SubmissionSink};
pub use validation::ValidationHint;
