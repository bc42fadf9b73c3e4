use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use overseas_intake::workflows::intake::{
    AttachmentError, AttachmentPolicy, CardSide, DerivedAge, DocumentSlot, FixedClock, GroupField,
    GroupKind, IntakeRecord, IntakeStep, IntakeWizard, OptionCatalogs, OverseasContactField,
    PreviewPort, ProfileField, SelectedFile, SubmissionError, SubmissionReceipt, SubmissionSink,
};

#[derive(Default)]
struct RecordingPreviews {
    live: Mutex<Vec<String>>,
    issued: Mutex<u32>,
}

impl RecordingPreviews {
    fn live(&self) -> Vec<String> {
        self.live.lock().expect("previews").clone()
    }
}

impl PreviewPort for RecordingPreviews {
    fn create_url(&self, file: &SelectedFile) -> Result<String, AttachmentError> {
        let mut issued = self.issued.lock().expect("counter");
        *issued += 1;
        let url = format!("blob:{}/{}", *issued, file.file_name);
        self.live.lock().expect("previews").push(url.clone());
        Ok(url)
    }

    fn revoke_url(&self, url: &str) {
        self.live.lock().expect("previews").retain(|live| live != url);
    }
}

#[derive(Default)]
struct CapturingSink {
    snapshots: Mutex<Vec<serde_json::Value>>,
}

impl SubmissionSink for CapturingSink {
    fn hand_off(&self, record: &IntakeRecord) -> Result<SubmissionReceipt, SubmissionError> {
        let snapshot = serde_json::to_value(record)
            .map_err(|err| SubmissionError::Rejected(err.to_string()))?;
        self.snapshots.lock().expect("snapshots").push(snapshot);
        Ok(SubmissionReceipt {
            reference: "BD-2025-0001".to_string(),
        })
    }
}

fn wizard() -> (
    IntakeWizard<RecordingPreviews, CapturingSink>,
    Arc<RecordingPreviews>,
    Arc<CapturingSink>,
) {
    let previews = Arc::new(RecordingPreviews::default());
    let sink = Arc::new(CapturingSink::default());
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date");
    let wizard = IntakeWizard::new(
        previews.clone(),
        sink.clone(),
        AttachmentPolicy::default(),
        OptionCatalogs::reference(),
        Arc::new(FixedClock(today)),
    );
    (wizard, previews, sink)
}

#[test]
fn applicant_walks_through_all_three_steps() {
    let (mut wizard, previews, sink) = wizard();

    let store = wizard.store_mut();
    store
        .set_field(ProfileField::FullName, "Nasrin Akter")
        .expect("text field");
    store
        .set_field(ProfileField::DateOfBirth, "1995-03-10")
        .expect("valid date");
    store
        .set_field(ProfileField::PurposeType, "Others")
        .expect("catalog option");
    store
        .set_field(ProfileField::PurposeDetail, "Research")
        .expect("free text");
    store
        .attach_profile_image(&SelectedFile::new("me.jpg", "image/jpeg", vec![0xff, 0xd8]))
        .expect("accepted");
    assert_eq!(wizard.record().age(), Some(DerivedAge::Years(30)));

    assert_eq!(wizard.advance(), IntakeStep::Contacts);

    // The seeded row is the first contact; one more is appended.
    let store = wizard.store_mut();
    let second = store.append_entry(GroupKind::OverseasContacts);
    let contacts = [
        (0, "Amina Begum", "Oman", "+968 9123 4567"),
        (second, "Rahim Uddin", "Qatar", "+974 5512 3344"),
    ];
    for (index, name, country, phone) in contacts {
        for (field, value) in [
            (OverseasContactField::Name, name),
            (OverseasContactField::Country, country),
            (OverseasContactField::Phone, phone),
        ] {
            store
                .update_entry(index, GroupField::OverseasContact(field), value)
                .expect("row exists");
        }
    }
    assert_eq!(wizard.record().overseas_contacts.len(), 2);

    let store = wizard.store_mut();
    store
        .remove_entry(GroupKind::OverseasContacts, 0)
        .expect("two rows present");
    let remaining = wizard.record().overseas_contacts.entries();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "Rahim Uddin");
    assert_eq!(remaining[0].country, "Qatar");
    assert_eq!(remaining[0].phone, "+974 5512 3344");

    assert_eq!(wizard.advance(), IntakeStep::Documents);
    assert_eq!(wizard.advance(), IntakeStep::Documents);
    assert!(wizard.steps().can_submit());
    assert_eq!(wizard.steps().progress_percent(), 100);

    let front = SelectedFile::new("nid-front.png", "image/png", vec![1, 2, 3]);
    wizard
        .store_mut()
        .attach_document(DocumentSlot::NationalId(CardSide::Front), &front)
        .expect("accepted");
    assert_eq!(previews.live().len(), 2);

    let receipt = wizard.submit().expect("sink accepts");
    assert_eq!(receipt.reference, "BD-2025-0001");

    let snapshots = sink.snapshots.lock().expect("snapshots");
    let submitted = &snapshots[0];
    assert_eq!(submitted["age"], 30);
    assert_eq!(submitted["purpose"]["selection"], "Others");
    assert_eq!(submitted["purpose"]["detail"], "Research");
    assert_eq!(
        submitted["overseas_contacts"],
        serde_json::json!([
            { "name": "Rahim Uddin", "country": "Qatar", "phone": "+974 5512 3344" }
        ])
    );
    assert_eq!(
        submitted["documents"]["national_id"]["front"]["file_name"],
        "nid-front.png"
    );

    assert_eq!(wizard.step(), IntakeStep::Profile);
    assert!(previews.live().is_empty());
}

#[test]
fn dropping_an_abandoned_session_revokes_its_previews() {
    let (mut wizard, previews, _) = wizard();
    wizard
        .store_mut()
        .attach_document(
            DocumentSlot::Visa,
            &SelectedFile::new("visa.pdf", "application/pdf", b"%PDF".to_vec()),
        )
        .expect("accepted");
    assert_eq!(previews.live().len(), 1);

    drop(wizard);

    assert!(previews.live().is_empty());
}
