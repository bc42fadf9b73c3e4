use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::attachments::{AttachmentHandle, AttachmentSlot};
use super::derived::DerivedAge;
use super::documents::{DocumentKind, OfficialDocuments};
use super::groups::{GroupEntry, RepeatableGroup, TagList};
use super::steps::IntakeStep;

/// Catalog value that unlocks the free-text detail field.
pub const OTHERS_OPTION: &str = "Others";

/// Caller errors. A correct rendering layer never triggers these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    #[error("index {index} is out of range for {group} (length {len})")]
    IndexOutOfRange {
        group: &'static str,
        index: usize,
        len: usize,
    },
    #[error("{group} must keep at least one entry")]
    GroupMinimumLength { group: &'static str },
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("field '{0}' is derived and cannot be set")]
    ReadOnlyField(&'static str),
    #[error("unknown repeatable group '{0}'")]
    UnknownGroup(String),
    #[error("unknown document type '{0}'")]
    UnknownDocument(String),
    #[error("document {kind} has no field or slot named '{field}'")]
    UnknownDocumentField { kind: DocumentKind, field: String },
    #[error("'{value}' is not an option for {field}")]
    UnknownOption { field: &'static str, value: String },
    #[error("'{0}' is not a YYYY-MM-DD date")]
    MalformedDate(String),
    #[error("submission is only available from step 3 (currently on step {0})")]
    SubmitBeforeFinalStep(u8),
}

pub(crate) fn parse_optional_date(value: &str) -> Result<Option<NaiveDate>, ContractViolation> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ContractViolation::MalformedDate(value.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }

    /// Empty input means "not selected".
    pub fn parse(value: &str) -> Result<Option<Self>, ContractViolation> {
        match value {
            "" => Ok(None),
            "Male" => Ok(Some(Self::Male)),
            "Female" => Ok(Some(Self::Female)),
            "Other" => Ok(Some(Self::Other)),
            other => Err(ContractViolation::UnknownOption {
                field: "gender",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocialPlatform {
    Facebook,
    Twitter,
    Instagram,
    LinkedIn,
    Other,
}

impl SocialPlatform {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Facebook,
            Self::Twitter,
            Self::Instagram,
            Self::LinkedIn,
            Self::Other,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Facebook => "Facebook",
            Self::Twitter => "Twitter",
            Self::Instagram => "Instagram",
            Self::LinkedIn => "LinkedIn",
            Self::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Result<Option<Self>, ContractViolation> {
        if value.is_empty() {
            return Ok(None);
        }
        Self::ordered()
            .into_iter()
            .find(|platform| platform.label() == value)
            .map(Some)
            .ok_or_else(|| ContractViolation::UnknownOption {
                field: "platform",
                value: value.to_string(),
            })
    }
}

/// Which injected catalog a classification draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Purpose,
    Profession,
}

impl CatalogKind {
    pub const fn field(self) -> &'static str {
        match self {
            Self::Purpose => "purpose_type",
            Self::Profession => "profession_type",
        }
    }
}

/// Purpose and profession choices, supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionCatalogs {
    pub purposes: Vec<String>,
    pub professions: Vec<String>,
}

impl OptionCatalogs {
    /// The catalogs the intake form shipped with.
    pub fn reference() -> Self {
        let owned = |values: &[&str]| -> Vec<String> {
            values.iter().map(|value| value.to_string()).collect()
        };
        Self {
            purposes: owned(&[
                "Job",
                "Business",
                "Medical",
                "Visit",
                "Hajj",
                "Umrah",
                "Family Joining",
                "Study",
                "House Mate",
                OTHERS_OPTION,
            ]),
            professions: owned(&[
                "Doctor",
                "Engineer",
                "Accountant",
                "Labour",
                "Technician",
                OTHERS_OPTION,
            ]),
        }
    }

    pub fn options(&self, kind: CatalogKind) -> &[String] {
        match kind {
            CatalogKind::Purpose => &self.purposes,
            CatalogKind::Profession => &self.professions,
        }
    }

    /// Resolve a raw selection. Empty input clears the selection.
    pub fn select(
        &self,
        kind: CatalogKind,
        value: &str,
    ) -> Result<Option<String>, ContractViolation> {
        if value.is_empty() {
            return Ok(None);
        }
        if self.options(kind).iter().any(|option| option == value) {
            Ok(Some(value.to_string()))
        } else {
            Err(ContractViolation::UnknownOption {
                field: kind.field(),
                value: value.to_string(),
            })
        }
    }
}

impl Default for OptionCatalogs {
    fn default() -> Self {
        Self::reference()
    }
}

/// Catalog selection with its "Others" detail text.
///
/// The detail is kept when the selection moves away from "Others"; it is only
/// meaningful while `is_others` holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub selection: Option<String>,
    pub detail: String,
}

impl Classification {
    pub fn is_others(&self) -> bool {
        self.selection.as_deref() == Some(OTHERS_OPTION)
    }

    /// Value to report downstream: the detail for "Others", the selection otherwise.
    pub fn resolved(&self) -> Option<&str> {
        if self.is_others() {
            Some(self.detail.trim()).filter(|detail| !detail.is_empty())
        } else {
            self.selection.as_deref()
        }
    }
}

/// Top-level scalar fields the applicant edits directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Email,
    FullName,
    FatherName,
    Gender,
    DateOfBirth,
    PresentAddress,
    PermanentAddress,
    District,
    City,
    Country,
    PurposeType,
    PurposeDetail,
    ProfessionType,
    ProfessionDetail,
    BmetNumber,
    VisaNumber,
}

impl ProfileField {
    pub const fn ordered() -> [Self; 16] {
        [
            Self::Email,
            Self::FullName,
            Self::FatherName,
            Self::Gender,
            Self::DateOfBirth,
            Self::PresentAddress,
            Self::PermanentAddress,
            Self::District,
            Self::City,
            Self::Country,
            Self::PurposeType,
            Self::PurposeDetail,
            Self::ProfessionType,
            Self::ProfessionDetail,
            Self::BmetNumber,
            Self::VisaNumber,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::FullName => "full_name",
            Self::FatherName => "father_name",
            Self::Gender => "gender",
            Self::DateOfBirth => "date_of_birth",
            Self::PresentAddress => "present_address",
            Self::PermanentAddress => "permanent_address",
            Self::District => "district",
            Self::City => "city",
            Self::Country => "country",
            Self::PurposeType => "purpose_type",
            Self::PurposeDetail => "purpose_detail",
            Self::ProfessionType => "profession_type",
            Self::ProfessionDetail => "profession_detail",
            Self::BmetNumber => "bmet_number",
            Self::VisaNumber => "visa_number",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ContractViolation> {
        if raw == "age" {
            return Err(ContractViolation::ReadOnlyField("age"));
        }
        Self::ordered()
            .into_iter()
            .find(|field| field.key() == raw)
            .ok_or_else(|| ContractViolation::UnknownField(raw.to_string()))
    }

    /// Step whose page renders this field.
    pub const fn step(self) -> IntakeStep {
        match self {
            Self::BmetNumber | Self::VisaNumber => IntakeStep::Documents,
            _ => IntakeStep::Profile,
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmergencyContactField {
    Name,
    Relationship,
    Phone,
}

impl GroupEntry for EmergencyContact {
    type Field = EmergencyContactField;
    const GROUP: &'static str = "emergency_contacts";

    fn set_field(&mut self, field: Self::Field, value: &str) -> Result<(), ContractViolation> {
        let target = match field {
            EmergencyContactField::Name => &mut self.name,
            EmergencyContactField::Relationship => &mut self.relationship,
            EmergencyContactField::Phone => &mut self.phone,
        };
        *target = value.to_string();
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverseasContact {
    pub name: String,
    pub country: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverseasContactField {
    Name,
    Country,
    Phone,
}

impl GroupEntry for OverseasContact {
    type Field = OverseasContactField;
    const GROUP: &'static str = "overseas_contacts";

    fn set_field(&mut self, field: Self::Field, value: &str) -> Result<(), ContractViolation> {
        let target = match field {
            OverseasContactField::Name => &mut self.name,
            OverseasContactField::Country => &mut self.country,
            OverseasContactField::Phone => &mut self.phone,
        };
        *target = value.to_string();
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SocialHandle {
    pub platform: Option<SocialPlatform>,
    pub username: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialHandleField {
    Platform,
    Username,
}

impl GroupEntry for SocialHandle {
    type Field = SocialHandleField;
    const GROUP: &'static str = "social_media_handles";

    fn set_field(&mut self, field: Self::Field, value: &str) -> Result<(), ContractViolation> {
        match field {
            SocialHandleField::Platform => self.platform = SocialPlatform::parse(value)?,
            SocialHandleField::Username => self.username = value.to_string(),
        }
        Ok(())
    }
}

/// The three repeatable groups on the contacts step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    EmergencyContacts,
    OverseasContacts,
    SocialMediaHandles,
}

impl GroupKind {
    pub const fn key(self) -> &'static str {
        match self {
            Self::EmergencyContacts => EmergencyContact::GROUP,
            Self::OverseasContacts => OverseasContact::GROUP,
            Self::SocialMediaHandles => SocialHandle::GROUP,
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ContractViolation> {
        [
            Self::EmergencyContacts,
            Self::OverseasContacts,
            Self::SocialMediaHandles,
        ]
        .into_iter()
        .find(|kind| kind.key() == raw)
        .ok_or_else(|| ContractViolation::UnknownGroup(raw.to_string()))
    }
}

/// A named field inside one of the repeatable groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    EmergencyContact(EmergencyContactField),
    OverseasContact(OverseasContactField),
    SocialHandle(SocialHandleField),
}

impl GroupField {
    pub fn kind(self) -> GroupKind {
        match self {
            Self::EmergencyContact(_) => GroupKind::EmergencyContacts,
            Self::OverseasContact(_) => GroupKind::OverseasContacts,
            Self::SocialHandle(_) => GroupKind::SocialMediaHandles,
        }
    }

    pub fn parse(kind: GroupKind, name: &str) -> Result<Self, ContractViolation> {
        let parsed = match (kind, name) {
            (GroupKind::EmergencyContacts, "name") => {
                Some(Self::EmergencyContact(EmergencyContactField::Name))
            }
            (GroupKind::EmergencyContacts, "relationship") => {
                Some(Self::EmergencyContact(EmergencyContactField::Relationship))
            }
            (GroupKind::EmergencyContacts, "phone") => {
                Some(Self::EmergencyContact(EmergencyContactField::Phone))
            }
            (GroupKind::OverseasContacts, "name") => {
                Some(Self::OverseasContact(OverseasContactField::Name))
            }
            (GroupKind::OverseasContacts, "country") => {
                Some(Self::OverseasContact(OverseasContactField::Country))
            }
            (GroupKind::OverseasContacts, "phone") => {
                Some(Self::OverseasContact(OverseasContactField::Phone))
            }
            (GroupKind::SocialMediaHandles, "platform") => {
                Some(Self::SocialHandle(SocialHandleField::Platform))
            }
            (GroupKind::SocialMediaHandles, "username") => {
                Some(Self::SocialHandle(SocialHandleField::Username))
            }
            _ => None,
        };
        parsed.ok_or_else(|| ContractViolation::UnknownField(format!("{}.{name}", kind.key())))
    }
}

/// The applicant's full submission, as held by the form store.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct IntakeRecord {
    pub email: String,
    pub full_name: String,
    pub father_name: String,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub(crate) age: Option<DerivedAge>,
    pub profile_image: AttachmentSlot,
    pub present_address: String,
    pub permanent_address: String,
    pub district: String,
    pub city: String,
    pub country: String,
    pub purpose: Classification,
    pub profession: Classification,
    pub emergency_contacts: RepeatableGroup<EmergencyContact>,
    pub health_conditions: TagList,
    pub overseas_contacts: RepeatableGroup<OverseasContact>,
    pub social_media_handles: RepeatableGroup<SocialHandle>,
    pub bmet_number: String,
    pub visa_number: String,
    pub documents: OfficialDocuments,
}

impl IntakeRecord {
    /// Blank record: empty scalars, one blank row per repeatable group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Age derived from the date of birth; absent until a date is entered.
    pub fn age(&self) -> Option<DerivedAge> {
        self.age
    }

    pub fn live_attachments(&self) -> usize {
        let documents = OfficialDocuments::all_slots()
            .into_iter()
            .filter(|slot| self.documents.slot(*slot).is_filled())
            .count();
        documents + usize::from(self.profile_image.is_filled())
    }

    pub(crate) fn drain_handles(&mut self) -> Vec<AttachmentHandle> {
        let mut handles = Vec::new();
        handles.extend(self.profile_image.take());
        handles.extend(self.documents.drain_handles());
        handles
    }
}
