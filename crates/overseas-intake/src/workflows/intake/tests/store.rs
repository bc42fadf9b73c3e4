use super::common::*;

use crate::workflows::intake::{
    ContractViolation, DerivedAge, DocumentInput, DocumentKind, EmergencyContactField, Gender,
    GroupField, GroupKind, OverseasContact, OverseasContactField, ProfileField, SocialHandleField,
    SocialPlatform, WizardError,
};
use crate::workflows::intake::lookup::BmetReference;

#[test]
fn date_of_birth_drives_the_derived_age() {
    let (mut store, _) = build_store();

    store
        .set_field(ProfileField::DateOfBirth, "1995-03-10")
        .expect("valid date");
    assert_eq!(store.record().age(), Some(DerivedAge::Years(30)));

    store
        .set_field(ProfileField::DateOfBirth, "2030-01-01")
        .expect("future dates are stored");
    assert_eq!(store.record().age(), Some(DerivedAge::Invalid));

    store
        .set_field(ProfileField::DateOfBirth, "")
        .expect("clearing is allowed");
    assert_eq!(store.record().date_of_birth, None);
    assert_eq!(store.record().age(), None);
}

#[test]
fn malformed_values_leave_the_record_untouched() {
    let (mut store, _) = build_store();
    store
        .set_field(ProfileField::DateOfBirth, "1995-03-10")
        .expect("valid date");
    store.set_field(ProfileField::Gender, "Female").expect("known gender");

    let err = store
        .set_field(ProfileField::DateOfBirth, "10/03/1995")
        .expect_err("not ISO");
    assert_eq!(err, ContractViolation::MalformedDate("10/03/1995".to_string()));

    let err = store
        .set_field(ProfileField::Gender, "Unknown")
        .expect_err("not an option");
    assert!(matches!(err, ContractViolation::UnknownOption { field: "gender", .. }));

    assert_eq!(store.record().age(), Some(DerivedAge::Years(30)));
    assert_eq!(store.record().gender, Some(Gender::Female));
}

#[test]
fn age_is_not_writable() {
    assert_eq!(
        ProfileField::parse("age"),
        Err(ContractViolation::ReadOnlyField("age"))
    );
    assert!(matches!(
        ProfileField::parse("nickname"),
        Err(ContractViolation::UnknownField(_))
    ));
}

#[test]
fn others_detail_survives_a_selection_change() {
    let (mut store, _) = build_store();

    store
        .set_field(ProfileField::PurposeType, "Others")
        .expect("catalog option");
    store
        .set_field(ProfileField::PurposeDetail, "Research")
        .expect("free text");
    assert!(store.record().purpose.is_others());
    assert_eq!(store.record().purpose.resolved(), Some("Research"));

    store
        .set_field(ProfileField::PurposeType, "Job")
        .expect("catalog option");
    assert!(!store.record().purpose.is_others());
    assert_eq!(store.record().purpose.detail, "Research");
    assert_eq!(store.record().purpose.resolved(), Some("Job"));

    let err = store
        .set_field(ProfileField::ProfessionType, "Astronaut")
        .expect_err("not in catalog");
    assert!(matches!(
        err,
        ContractViolation::UnknownOption {
            field: "profession_type",
            ..
        }
    ));
    assert_eq!(store.record().profession.selection, None);
}

#[test]
fn removing_an_overseas_contact_keeps_the_order_of_the_rest() {
    let (mut store, _) = build_store();
    assert_eq!(store.append_entry(GroupKind::OverseasContacts), 1);
    assert_eq!(store.append_entry(GroupKind::OverseasContacts), 2);

    for (index, name) in ["Amina", "Rahim", "Karim"].into_iter().enumerate() {
        store
            .update_entry(
                index,
                GroupField::OverseasContact(OverseasContactField::Name),
                name,
            )
            .expect("index in range");
    }

    store
        .remove_entry(GroupKind::OverseasContacts, 0)
        .expect("group has three rows");

    let names: Vec<&str> = store
        .record()
        .overseas_contacts
        .entries()
        .iter()
        .map(|contact: &OverseasContact| contact.name.as_str())
        .collect();
    assert_eq!(names, vec!["Rahim", "Karim"]);
}

#[test]
fn groups_never_drop_below_one_row() {
    let (mut store, _) = build_store();
    store
        .update_entry(
            0,
            GroupField::EmergencyContact(EmergencyContactField::Phone),
            "+8801700000000",
        )
        .expect("seeded row");

    let err = store
        .remove_entry(GroupKind::EmergencyContacts, 0)
        .expect_err("last row");
    assert_eq!(
        err,
        ContractViolation::GroupMinimumLength {
            group: "emergency_contacts"
        }
    );
    assert_eq!(store.record().emergency_contacts.len(), 1);
    assert_eq!(
        store.record().emergency_contacts.entries()[0].phone,
        "+8801700000000"
    );
}

#[test]
fn out_of_range_group_updates_are_rejected() {
    let (mut store, _) = build_store();

    let err = store
        .update_entry(
            3,
            GroupField::SocialHandle(SocialHandleField::Username),
            "applicant",
        )
        .expect_err("only one row");
    assert_eq!(
        err,
        ContractViolation::IndexOutOfRange {
            group: "social_media_handles",
            index: 3,
            len: 1,
        }
    );

    store
        .update_entry(
            0,
            GroupField::SocialHandle(SocialHandleField::Platform),
            "LinkedIn",
        )
        .expect("known platform");
    assert_eq!(
        store.record().social_media_handles.entries()[0].platform,
        Some(SocialPlatform::LinkedIn)
    );
}

#[test]
fn health_conditions_ignore_blank_input() {
    let (mut store, _) = build_store();
    assert!(store.add_health_condition("  Asthma "));
    assert!(!store.add_health_condition("   "));
    assert!(store.add_health_condition("Diabetes"));

    assert_eq!(store.record().health_conditions.tags(), ["Asthma", "Diabetes"]);
    assert_eq!(
        store.remove_health_condition(0).expect("present"),
        "Asthma".to_string()
    );
    assert!(store.remove_health_condition(4).is_err());
    assert_eq!(store.record().health_conditions.len(), 1);
}

#[test]
fn document_inputs_resolve_against_the_document_schema() {
    let (mut store, port) = build_store();

    store
        .set_document_input(
            DocumentKind::Passport,
            "number",
            DocumentInput::Value("A01234567".to_string()),
        )
        .expect("passport number");
    store
        .set_document_input(
            DocumentKind::Visa,
            "expiry_date",
            DocumentInput::Value("2027-01-31".to_string()),
        )
        .expect("visa expiry");
    store
        .set_document_input(
            DocumentKind::LabourCard,
            "work_permit",
            DocumentInput::Attachment(pdf("permit.pdf")),
        )
        .expect("labour card slot");

    let documents = &store.record().documents;
    assert_eq!(documents.passport.number, "A01234567");
    assert_eq!(
        documents.visa.expiry_date.map(|date| date.to_string()),
        Some("2027-01-31".to_string())
    );
    assert!(documents.labour_card.work_permit.is_filled());
    assert_eq!(port.live(), 1);

    let err = store
        .set_document_input(
            DocumentKind::Passport,
            "front",
            DocumentInput::Attachment(png("front.png")),
        )
        .expect_err("passports have a single page slot");
    assert!(matches!(
        err,
        WizardError::Contract(ContractViolation::UnknownDocumentField { .. })
    ));

    let err = store
        .set_document_input(
            DocumentKind::Visa,
            "nationality",
            DocumentInput::Value("Bangladeshi".to_string()),
        )
        .expect_err("nationality belongs to the labour card");
    assert!(matches!(err, WizardError::Contract(_)));
    assert_eq!(port.created(), 1);
}

#[test]
fn bmet_reference_fills_identity_number() {
    let (mut store, _) = build_store();
    store
        .apply_bmet_reference(BmetReference {
            bmet_number: "BMET-123456".to_string(),
            national_id_number: "123456789".to_string(),
        })
        .expect("reference applies");

    assert_eq!(store.record().bmet_number, "BMET-123456");
    assert_eq!(store.record().documents.national_id.number, "123456789");
}
