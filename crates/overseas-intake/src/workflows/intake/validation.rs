//! Required-field review for a wizard step.
//!
//! Hints are advisory: they feed the required markers of the rendering layer and
//! never block navigation.

use chrono::NaiveDate;
use serde::Serialize;

use super::documents::{DocumentKind, OfficialDocuments};
use super::domain::{
    Classification, EmergencyContact, IntakeRecord, OverseasContact, SocialHandle,
};
use super::groups::GroupEntry;
use super::steps::IntakeStep;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationHint {
    /// A required value is blank. `field` is a dotted path such as `overseas_contacts[1].name`.
    Missing { field: String },
    /// Date of birth gives a future or sub-one-year age.
    InvalidAge,
    ExpiryBeforeIssue { document: DocumentKind },
}

impl ValidationHint {
    fn missing(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }
}

/// Collect the hints for the fields rendered on `step`.
pub fn review(record: &IntakeRecord, step: IntakeStep) -> Vec<ValidationHint> {
    let mut hints = Vec::new();
    match step {
        IntakeStep::Profile => review_profile(record, &mut hints),
        IntakeStep::Contacts => review_contacts(record, &mut hints),
        IntakeStep::Documents => review_documents(record, &mut hints),
    }
    hints
}

fn require(hints: &mut Vec<ValidationHint>, field: &str, value: &str) {
    if value.trim().is_empty() {
        hints.push(ValidationHint::missing(field));
    }
}

fn require_classification(
    hints: &mut Vec<ValidationHint>,
    prefix: &str,
    classification: &Classification,
) {
    if classification.selection.is_none() {
        hints.push(ValidationHint::missing(format!("{prefix}_type")));
    } else if classification.is_others() {
        require(hints, &format!("{prefix}_detail"), &classification.detail);
    }
}

fn review_profile(record: &IntakeRecord, hints: &mut Vec<ValidationHint>) {
    if !record.profile_image.is_filled() {
        hints.push(ValidationHint::missing("profile_image"));
    }
    require(hints, "full_name", &record.full_name);
    require(hints, "email", &record.email);
    require(hints, "father_name", &record.father_name);
    if record.gender.is_none() {
        hints.push(ValidationHint::missing("gender"));
    }
    match record.age() {
        None => hints.push(ValidationHint::missing("date_of_birth")),
        Some(age) if age.is_invalid() => hints.push(ValidationHint::InvalidAge),
        Some(_) => {}
    }
    require(hints, "present_address", &record.present_address);
    require(hints, "permanent_address", &record.permanent_address);
    require(hints, "district", &record.district);
    require(hints, "city", &record.city);
    require(hints, "country", &record.country);
    require_classification(hints, "purpose", &record.purpose);
    require_classification(hints, "profession", &record.profession);
}

fn review_contacts(record: &IntakeRecord, hints: &mut Vec<ValidationHint>) {
    for (index, contact) in record.emergency_contacts.entries().iter().enumerate() {
        let path = |field: &str| format!("{}[{index}].{field}", EmergencyContact::GROUP);
        require(hints, &path("name"), &contact.name);
        require(hints, &path("relationship"), &contact.relationship);
        require(hints, &path("phone"), &contact.phone);
    }

    // Overseas phone numbers are optional.
    for (index, contact) in record.overseas_contacts.entries().iter().enumerate() {
        let path = |field: &str| format!("{}[{index}].{field}", OverseasContact::GROUP);
        require(hints, &path("name"), &contact.name);
        require(hints, &path("country"), &contact.country);
    }

    for (index, handle) in record.social_media_handles.entries().iter().enumerate() {
        let path = |field: &str| format!("{}[{index}].{field}", SocialHandle::GROUP);
        if handle.platform.is_none() {
            hints.push(ValidationHint::missing(path("platform")));
        }
        require(hints, &path("username"), &handle.username);
    }
}

fn review_documents(record: &IntakeRecord, hints: &mut Vec<ValidationHint>) {
    require(hints, "bmet_number", &record.bmet_number);
    require(hints, "visa_number", &record.visa_number);

    let OfficialDocuments {
        national_id,
        passport,
        driving_license,
        visa,
        labour_card,
    } = &record.documents;

    let text_fields: [(DocumentKind, &str, &str); 6] = [
        (DocumentKind::NationalId, "number", national_id.number.as_str()),
        (DocumentKind::Passport, "number", passport.number.as_str()),
        (DocumentKind::DrivingLicense, "number", driving_license.number.as_str()),
        (DocumentKind::Visa, "country", visa.country.as_str()),
        (DocumentKind::LabourCard, "profession", labour_card.profession.as_str()),
        (DocumentKind::LabourCard, "nationality", labour_card.nationality.as_str()),
    ];
    for (kind, field, value) in text_fields {
        require(hints, &format!("{kind}.{field}"), value);
    }

    let date_ranges = [
        (DocumentKind::NationalId, national_id.issue_date, national_id.expiry_date),
        (DocumentKind::Passport, passport.issue_date, passport.expiry_date),
        (
            DocumentKind::DrivingLicense,
            driving_license.issue_date,
            driving_license.expiry_date,
        ),
        (DocumentKind::Visa, visa.issue_date, visa.expiry_date),
        (DocumentKind::LabourCard, labour_card.issue_date, labour_card.expiry_date),
    ];
    for (kind, issued, expires) in date_ranges {
        review_dates(hints, kind, issued, expires);
    }
}

fn review_dates(
    hints: &mut Vec<ValidationHint>,
    kind: DocumentKind,
    issued: Option<NaiveDate>,
    expires: Option<NaiveDate>,
) {
    match (issued, expires) {
        (Some(issued), Some(expires)) if expires < issued => {
            hints.push(ValidationHint::ExpiryBeforeIssue { document: kind });
        }
        (issued, expires) => {
            if issued.is_none() {
                hints.push(ValidationHint::missing(format!("{kind}.issue_date")));
            }
            if expires.is_none() {
                hints.push(ValidationHint::missing(format!("{kind}.expiry_date")));
            }
        }
    }
}
