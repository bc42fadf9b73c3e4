use std::sync::Arc;

use tracing::{debug, info};

use super::attachments::{
    AttachmentError, AttachmentLifecycle, AttachmentPolicy, PreviewPort, SelectedFile,
};
use super::derived::{self, Clock};
use super::documents::{DocumentField, DocumentKind, DocumentSlot, IdentityField, VisaField};
use super::domain::{
    parse_optional_date, CatalogKind, ContractViolation, Gender, GroupField, GroupKind,
    IntakeRecord, OptionCatalogs, ProfileField,
};
use super::lookup::{BmetReference, VisaReference};
use super::service::WizardError;

/// Payload for the string-keyed document entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentInput {
    /// Text or `YYYY-MM-DD` value for a field.
    Value(String),
    /// New file for an attachment slot.
    Attachment(SelectedFile),
    /// Empty an attachment slot.
    Clear,
}

/// Sole owner of the intake record.
///
/// Every operation checks its whole input before writing, so a failed call leaves
/// the record exactly as it was. Dropping the store releases every live preview.
pub struct IntakeFormStore<P: PreviewPort> {
    record: IntakeRecord,
    attachments: AttachmentLifecycle<P>,
    catalogs: OptionCatalogs,
    clock: Arc<dyn Clock>,
}

impl<P: PreviewPort> IntakeFormStore<P> {
    pub fn new(
        port: Arc<P>,
        policy: AttachmentPolicy,
        catalogs: OptionCatalogs,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            record: IntakeRecord::new(),
            attachments: AttachmentLifecycle::new(port, policy),
            catalogs,
            clock,
        }
    }

    pub fn record(&self) -> &IntakeRecord {
        &self.record
    }

    pub fn catalogs(&self) -> &OptionCatalogs {
        &self.catalogs
    }

    pub fn attachment_policy(&self) -> &AttachmentPolicy {
        self.attachments.policy()
    }

    /// Set a top-level scalar. Changing the date of birth recomputes the age.
    pub fn set_field(&mut self, field: ProfileField, value: &str) -> Result<(), ContractViolation> {
        let record = &mut self.record;
        match field {
            ProfileField::Email => record.email = value.to_string(),
            ProfileField::FullName => record.full_name = value.to_string(),
            ProfileField::FatherName => record.father_name = value.to_string(),
            ProfileField::Gender => record.gender = Gender::parse(value)?,
            ProfileField::DateOfBirth => {
                let date_of_birth = parse_optional_date(value)?;
                record.date_of_birth = date_of_birth;
                record.age = derived::age(date_of_birth, self.clock.today());
            }
            ProfileField::PresentAddress => record.present_address = value.to_string(),
            ProfileField::PermanentAddress => record.permanent_address = value.to_string(),
            ProfileField::District => record.district = value.to_string(),
            ProfileField::City => record.city = value.to_string(),
            ProfileField::Country => record.country = value.to_string(),
            ProfileField::PurposeType => {
                record.purpose.selection = self.catalogs.select(CatalogKind::Purpose, value)?;
            }
            ProfileField::PurposeDetail => record.purpose.detail = value.to_string(),
            ProfileField::ProfessionType => {
                record.profession.selection =
                    self.catalogs.select(CatalogKind::Profession, value)?;
            }
            ProfileField::ProfessionDetail => record.profession.detail = value.to_string(),
            ProfileField::BmetNumber => record.bmet_number = value.to_string(),
            ProfileField::VisaNumber => record.visa_number = value.to_string(),
        }
        debug!(field = %field, "profile field updated");
        Ok(())
    }

    pub fn set_document_field(
        &mut self,
        field: DocumentField,
        value: &str,
    ) -> Result<(), ContractViolation> {
        self.record.documents.set_field(field, value)?;
        debug!(document = %field.kind(), ?field, "document field updated");
        Ok(())
    }

    /// Put a new file in a document slot, releasing whatever preview it held.
    pub fn attach_document(
        &mut self,
        slot: DocumentSlot,
        file: &SelectedFile,
    ) -> Result<(), AttachmentError> {
        self.attachments.assign(self.record.documents.slot_mut(slot), file)?;
        info!(document = %slot.kind(), ?slot, file = %file.file_name, "document attachment stored");
        Ok(())
    }

    pub fn clear_document_slot(&mut self, slot: DocumentSlot) -> bool {
        self.attachments.clear(self.record.documents.slot_mut(slot))
    }

    /// Only image types are taken here, whatever the document slots accept.
    pub fn attach_profile_image(&mut self, file: &SelectedFile) -> Result<(), AttachmentError> {
        self.attachments.assign_image(&mut self.record.profile_image, file)?;
        info!(file = %file.file_name, "profile image stored");
        Ok(())
    }

    pub fn clear_profile_image(&mut self) -> bool {
        self.attachments.clear(&mut self.record.profile_image)
    }

    /// String-keyed document entry point used by adapters that receive raw names.
    pub fn set_document_input(
        &mut self,
        kind: DocumentKind,
        name: &str,
        input: DocumentInput,
    ) -> Result<(), WizardError> {
        match input {
            DocumentInput::Value(value) => {
                let field = DocumentField::parse(kind, name)?;
                self.set_document_field(field, &value)?;
            }
            DocumentInput::Attachment(file) => {
                let slot = DocumentSlot::parse(kind, name)?;
                self.attach_document(slot, &file)?;
            }
            DocumentInput::Clear => {
                let slot = DocumentSlot::parse(kind, name)?;
                self.clear_document_slot(slot);
            }
        }
        Ok(())
    }

    /// Add a blank row to a group and return its index.
    pub fn append_entry(&mut self, kind: GroupKind) -> usize {
        let index = match kind {
            GroupKind::EmergencyContacts => self.record.emergency_contacts.append(),
            GroupKind::OverseasContacts => self.record.overseas_contacts.append(),
            GroupKind::SocialMediaHandles => self.record.social_media_handles.append(),
        };
        debug!(group = kind.key(), index, "group entry appended");
        index
    }

    pub fn remove_entry(&mut self, kind: GroupKind, index: usize) -> Result<(), ContractViolation> {
        match kind {
            GroupKind::EmergencyContacts => {
                self.record.emergency_contacts.remove(index)?;
            }
            GroupKind::OverseasContacts => {
                self.record.overseas_contacts.remove(index)?;
            }
            GroupKind::SocialMediaHandles => {
                self.record.social_media_handles.remove(index)?;
            }
        }
        debug!(group = kind.key(), index, "group entry removed");
        Ok(())
    }

    pub fn update_entry(
        &mut self,
        index: usize,
        field: GroupField,
        value: &str,
    ) -> Result<(), ContractViolation> {
        match field {
            GroupField::EmergencyContact(field) => self
                .record
                .emergency_contacts
                .update_field(index, field, value),
            GroupField::OverseasContact(field) => self
                .record
                .overseas_contacts
                .update_field(index, field, value),
            GroupField::SocialHandle(field) => self
                .record
                .social_media_handles
                .update_field(index, field, value),
        }
    }

    /// Returns `false` when the trimmed input is blank and nothing was added.
    pub fn add_health_condition(&mut self, value: &str) -> bool {
        self.record.health_conditions.add(value)
    }

    pub fn remove_health_condition(&mut self, index: usize) -> Result<String, ContractViolation> {
        self.record.health_conditions.remove(index)
    }

    /// Copy a BMET registration into the record.
    pub fn apply_bmet_reference(
        &mut self,
        reference: BmetReference,
    ) -> Result<(), ContractViolation> {
        self.set_document_field(
            DocumentField::NationalId(IdentityField::Number),
            &reference.national_id_number,
        )?;
        self.record.bmet_number = reference.bmet_number;
        Ok(())
    }

    pub fn apply_visa_reference(
        &mut self,
        reference: VisaReference,
    ) -> Result<(), ContractViolation> {
        self.set_document_field(DocumentField::Visa(VisaField::Country), &reference.country)?;
        self.record.visa_number = reference.visa_number;
        Ok(())
    }

    /// Release every preview and start over with a blank record.
    pub fn reset(&mut self) {
        let released = self.release_all();
        self.record = IntakeRecord::new();
        info!(released, "intake record reset");
    }

    fn release_all(&mut self) -> usize {
        let handles = self.record.drain_handles();
        let released = handles.len();
        for handle in handles {
            self.attachments.release_handle(handle);
        }
        released
    }
}

impl<P: PreviewPort> Drop for IntakeFormStore<P> {
    fn drop(&mut self) {
        let released = self.release_all();
        if released > 0 {
            debug!(released, "released previews on teardown");
        }
    }
}
