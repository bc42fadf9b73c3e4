//! Official documents collected on the final step.
//!
//! Each document type has its own record and its own field/slot enums, so a field
//! that does not exist on a document cannot be expressed. The string-keyed
//! `parse` constructors are the only place where unknown names can show up; they
//! are rejected as contract violations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::attachments::{AttachmentHandle, AttachmentSlot};
use super::domain::{parse_optional_date, ContractViolation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    NationalId,
    Passport,
    DrivingLicense,
    Visa,
    LabourCard,
}

impl DocumentKind {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::NationalId,
            Self::Passport,
            Self::DrivingLicense,
            Self::Visa,
            Self::LabourCard,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::NationalId => "national_id",
            Self::Passport => "passport",
            Self::DrivingLicense => "driving_license",
            Self::Visa => "visa",
            Self::LabourCard => "labour_card",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NationalId => "National ID Document",
            Self::Passport => "Passport Document",
            Self::DrivingLicense => "Driving License",
            Self::Visa => "Visa Document",
            Self::LabourCard => "Labour Card",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ContractViolation> {
        Self::ordered()
            .into_iter()
            .find(|kind| kind.key() == raw)
            .ok_or_else(|| ContractViolation::UnknownDocument(raw.to_string()))
    }

    /// Named text/date fields and attachment slots declared for this document.
    pub const fn schema(self) -> DocumentSchema {
        match self {
            Self::NationalId | Self::DrivingLicense => DocumentSchema {
                fields: &["number", "issue_date", "expiry_date"],
                slots: &["front", "back"],
            },
            Self::Passport => DocumentSchema {
                fields: &["number", "issue_date", "expiry_date"],
                slots: &["document"],
            },
            Self::Visa => DocumentSchema {
                fields: &["country", "issue_date", "expiry_date"],
                slots: &["document"],
            },
            Self::LabourCard => DocumentSchema {
                fields: &["profession", "nationality", "issue_date", "expiry_date"],
                slots: &["front", "back", "work_permit"],
            },
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentSchema {
    pub fields: &'static [&'static str],
    pub slots: &'static [&'static str],
}

/// Fields shared by numbered identity documents (national id, passport, driving license).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Number,
    IssueDate,
    ExpiryDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisaField {
    Country,
    IssueDate,
    ExpiryDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabourCardField {
    Profession,
    Nationality,
    IssueDate,
    ExpiryDate,
}

/// A text or date field on a specific document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentField {
    NationalId(IdentityField),
    Passport(IdentityField),
    DrivingLicense(IdentityField),
    Visa(VisaField),
    LabourCard(LabourCardField),
}

impl DocumentField {
    pub fn kind(self) -> DocumentKind {
        match self {
            Self::NationalId(_) => DocumentKind::NationalId,
            Self::Passport(_) => DocumentKind::Passport,
            Self::DrivingLicense(_) => DocumentKind::DrivingLicense,
            Self::Visa(_) => DocumentKind::Visa,
            Self::LabourCard(_) => DocumentKind::LabourCard,
        }
    }

    pub fn parse(kind: DocumentKind, name: &str) -> Result<Self, ContractViolation> {
        let identity = || match name {
            "number" => Some(IdentityField::Number),
            "issue_date" => Some(IdentityField::IssueDate),
            "expiry_date" => Some(IdentityField::ExpiryDate),
            _ => None,
        };

        let parsed = match kind {
            DocumentKind::NationalId => identity().map(Self::NationalId),
            DocumentKind::Passport => identity().map(Self::Passport),
            DocumentKind::DrivingLicense => identity().map(Self::DrivingLicense),
            DocumentKind::Visa => match name {
                "country" => Some(Self::Visa(VisaField::Country)),
                "issue_date" => Some(Self::Visa(VisaField::IssueDate)),
                "expiry_date" => Some(Self::Visa(VisaField::ExpiryDate)),
                _ => None,
            },
            DocumentKind::LabourCard => match name {
                "profession" => Some(Self::LabourCard(LabourCardField::Profession)),
                "nationality" => Some(Self::LabourCard(LabourCardField::Nationality)),
                "issue_date" => Some(Self::LabourCard(LabourCardField::IssueDate)),
                "expiry_date" => Some(Self::LabourCard(LabourCardField::ExpiryDate)),
                _ => None,
            },
        };

        parsed.ok_or_else(|| ContractViolation::UnknownDocumentField {
            kind,
            field: name.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSide {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabourCardSlot {
    Front,
    Back,
    WorkPermit,
}

/// An attachment slot on a specific document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSlot {
    NationalId(CardSide),
    Passport,
    DrivingLicense(CardSide),
    Visa,
    LabourCard(LabourCardSlot),
}

impl DocumentSlot {
    pub fn kind(self) -> DocumentKind {
        match self {
            Self::NationalId(_) => DocumentKind::NationalId,
            Self::Passport => DocumentKind::Passport,
            Self::DrivingLicense(_) => DocumentKind::DrivingLicense,
            Self::Visa => DocumentKind::Visa,
            Self::LabourCard(_) => DocumentKind::LabourCard,
        }
    }

    pub fn parse(kind: DocumentKind, name: &str) -> Result<Self, ContractViolation> {
        let side = || match name {
            "front" => Some(CardSide::Front),
            "back" => Some(CardSide::Back),
            _ => None,
        };

        let parsed = match kind {
            DocumentKind::NationalId => side().map(Self::NationalId),
            DocumentKind::DrivingLicense => side().map(Self::DrivingLicense),
            DocumentKind::Passport => (name == "document").then_some(Self::Passport),
            DocumentKind::Visa => (name == "document").then_some(Self::Visa),
            DocumentKind::LabourCard => match name {
                "front" => Some(Self::LabourCard(LabourCardSlot::Front)),
                "back" => Some(Self::LabourCard(LabourCardSlot::Back)),
                "work_permit" => Some(Self::LabourCard(LabourCardSlot::WorkPermit)),
                _ => None,
            },
        };

        parsed.ok_or_else(|| ContractViolation::UnknownDocumentField {
            kind,
            field: name.to_string(),
        })
    }
}

/// National id card or driving license.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct CardDocument {
    pub number: String,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub front: AttachmentSlot,
    pub back: AttachmentSlot,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct PassportDocument {
    pub number: String,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub document: AttachmentSlot,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct VisaDocument {
    pub country: String,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub document: AttachmentSlot,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct LabourCardDocument {
    pub profession: String,
    pub nationality: String,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub front: AttachmentSlot,
    pub back: AttachmentSlot,
    pub work_permit: AttachmentSlot,
}

/// All documents of the intake record.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct OfficialDocuments {
    pub national_id: CardDocument,
    pub passport: PassportDocument,
    pub driving_license: CardDocument,
    pub visa: VisaDocument,
    pub labour_card: LabourCardDocument,
}

impl OfficialDocuments {
    /// Store a plain value. Date fields take `YYYY-MM-DD`; an empty value clears the field.
    pub fn set_field(
        &mut self,
        field: DocumentField,
        value: &str,
    ) -> Result<(), ContractViolation> {
        match field {
            DocumentField::NationalId(field) => set_identity(&mut self.national_id, field, value),
            DocumentField::DrivingLicense(field) => {
                set_identity(&mut self.driving_license, field, value)
            }
            DocumentField::Passport(field) => {
                let passport = &mut self.passport;
                match field {
                    IdentityField::Number => passport.number = value.to_string(),
                    IdentityField::IssueDate => passport.issue_date = parse_optional_date(value)?,
                    IdentityField::ExpiryDate => passport.expiry_date = parse_optional_date(value)?,
                }
                Ok(())
            }
            DocumentField::Visa(field) => {
                let visa = &mut self.visa;
                match field {
                    VisaField::Country => visa.country = value.to_string(),
                    VisaField::IssueDate => visa.issue_date = parse_optional_date(value)?,
                    VisaField::ExpiryDate => visa.expiry_date = parse_optional_date(value)?,
                }
                Ok(())
            }
            DocumentField::LabourCard(field) => {
                let card = &mut self.labour_card;
                match field {
                    LabourCardField::Profession => card.profession = value.to_string(),
                    LabourCardField::Nationality => card.nationality = value.to_string(),
                    LabourCardField::IssueDate => card.issue_date = parse_optional_date(value)?,
                    LabourCardField::ExpiryDate => card.expiry_date = parse_optional_date(value)?,
                }
                Ok(())
            }
        }
    }

    pub fn slot(&self, slot: DocumentSlot) -> &AttachmentSlot {
        match slot {
            DocumentSlot::NationalId(side) => card_side(&self.national_id, side),
            DocumentSlot::DrivingLicense(side) => card_side(&self.driving_license, side),
            DocumentSlot::Passport => &self.passport.document,
            DocumentSlot::Visa => &self.visa.document,
            DocumentSlot::LabourCard(LabourCardSlot::Front) => &self.labour_card.front,
            DocumentSlot::LabourCard(LabourCardSlot::Back) => &self.labour_card.back,
            DocumentSlot::LabourCard(LabourCardSlot::WorkPermit) => &self.labour_card.work_permit,
        }
    }

    pub fn slot_mut(&mut self, slot: DocumentSlot) -> &mut AttachmentSlot {
        match slot {
            DocumentSlot::NationalId(CardSide::Front) => &mut self.national_id.front,
            DocumentSlot::NationalId(CardSide::Back) => &mut self.national_id.back,
            DocumentSlot::DrivingLicense(CardSide::Front) => &mut self.driving_license.front,
            DocumentSlot::DrivingLicense(CardSide::Back) => &mut self.driving_license.back,
            DocumentSlot::Passport => &mut self.passport.document,
            DocumentSlot::Visa => &mut self.visa.document,
            DocumentSlot::LabourCard(LabourCardSlot::Front) => &mut self.labour_card.front,
            DocumentSlot::LabourCard(LabourCardSlot::Back) => &mut self.labour_card.back,
            DocumentSlot::LabourCard(LabourCardSlot::WorkPermit) => {
                &mut self.labour_card.work_permit
            }
        }
    }

    /// Every slot, in document order.
    pub const fn all_slots() -> [DocumentSlot; 9] {
        [
            DocumentSlot::NationalId(CardSide::Front),
            DocumentSlot::NationalId(CardSide::Back),
            DocumentSlot::Passport,
            DocumentSlot::DrivingLicense(CardSide::Front),
            DocumentSlot::DrivingLicense(CardSide::Back),
            DocumentSlot::Visa,
            DocumentSlot::LabourCard(LabourCardSlot::Front),
            DocumentSlot::LabourCard(LabourCardSlot::Back),
            DocumentSlot::LabourCard(LabourCardSlot::WorkPermit),
        ]
    }

    pub(crate) fn drain_handles(&mut self) -> Vec<AttachmentHandle> {
        Self::all_slots()
            .into_iter()
            .filter_map(|slot| self.slot_mut(slot).take())
            .collect()
    }
}

fn set_identity(
    card: &mut CardDocument,
    field: IdentityField,
    value: &str,
) -> Result<(), ContractViolation> {
    match field {
        IdentityField::Number => card.number = value.to_string(),
        IdentityField::IssueDate => card.issue_date = parse_optional_date(value)?,
        IdentityField::ExpiryDate => card.expiry_date = parse_optional_date(value)?,
    }
    Ok(())
}

fn card_side(card: &CardDocument, side: CardSide) -> &AttachmentSlot {
    match side {
        CardSide::Front => &card.front,
        CardSide::Back => &card.back,
    }
}
