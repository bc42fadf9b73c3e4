use crate::infra::{
    load_selected_file, BlobUrlRegistry, FixtureReferenceLookup, LoggingSubmissionSink,
    FIXTURE_BMET_NUMBER, FIXTURE_VISA_NUMBER,
};
use chrono::{Local, Months, NaiveDate};
use clap::Args;
use overseas_intake::error::AppError;
use overseas_intake::workflows::intake::{
    AttachmentPolicy, CardSide, DocumentSlot, EmergencyContactField, FixedClock, GroupField,
    GroupKind, IntakeStep, IntakeWizard, OptionCatalogs, OverseasContactField, ProfileField,
    SelectedFile, SocialHandleField,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for the age calculation (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Image to use as the profile picture. A placeholder is used when omitted.
    #[arg(long)]
    pub(crate) attach: Option<PathBuf>,
}

type DemoWizard = IntakeWizard<BlobUrlRegistry, LoggingSubmissionSink>;

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, attach } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let date_of_birth = today.checked_sub_months(Months::new(30 * 12)).unwrap_or(today);

    let previews = Arc::new(BlobUrlRegistry::default());
    let sink = Arc::new(LoggingSubmissionSink::default());
    let mut wizard = IntakeWizard::new(
        previews.clone(),
        sink.clone(),
        AttachmentPolicy::default(),
        OptionCatalogs::reference(),
        Arc::new(FixedClock(today)),
    );

    let profile_image = match attach {
        Some(path) => load_selected_file(&path)?,
        None => SelectedFile::new("profile.png", "image/png", vec![0x89, b'P', b'N', b'G']),
    };

    println!("Overseas intake demo (today = {today})");
    fill_profile(&mut wizard, date_of_birth, &profile_image)?;
    print_step(&wizard);

    wizard.advance();
    fill_contacts(&mut wizard)?;
    print_step(&wizard);

    wizard.advance();
    fill_documents(&mut wizard)?;
    wizard.advance();
    print_step(&wizard);

    let view = serde_json::to_string_pretty(&wizard.view()).map_err(std::io::Error::from)?;
    println!("\nRecord ready for hand-off:\n{view}");

    let receipt = wizard.submit()?;
    println!("\nSubmitted as {}", receipt.reference);
    println!(
        "Records handed off: {} | live previews after reset: {} | back on step {}",
        sink.submissions().len(),
        previews.live_count(),
        wizard.step().number()
    );
    Ok(())
}

fn print_step(wizard: &DemoWizard) {
    let step = wizard.step();
    let hints = wizard.hints();
    println!(
        "\nStep {}/{}: {} ({}% complete, {} open hint{})",
        step.number(),
        IntakeStep::COUNT,
        step.label(),
        wizard.steps().progress_percent(),
        hints.len(),
        if hints.len() == 1 { "" } else { "s" }
    );
}

fn fill_profile(
    wizard: &mut DemoWizard,
    date_of_birth: NaiveDate,
    profile_image: &SelectedFile,
) -> Result<(), AppError> {
    let date_of_birth = date_of_birth.format("%Y-%m-%d").to_string();
    let store = wizard.store_mut();
    let fields = [
        (ProfileField::FullName, "Nasrin Akter"),
        (ProfileField::FatherName, "Abdul Karim"),
        (ProfileField::Email, "nasrin.akter@example.com"),
        (ProfileField::Gender, "Female"),
        (ProfileField::DateOfBirth, date_of_birth.as_str()),
        (ProfileField::PresentAddress, "House 12, Road 4, Mirpur"),
        (ProfileField::PermanentAddress, "Village Char Alexander"),
        (ProfileField::District, "Noakhali"),
        (ProfileField::City, "Dhaka"),
        (ProfileField::Country, "Bangladesh"),
        (ProfileField::PurposeType, "Others"),
        (ProfileField::PurposeDetail, "Research"),
        (ProfileField::ProfessionType, "Engineer"),
    ];
    for (field, value) in fields {
        store.set_field(field, value).map_err(wizard_error)?;
    }
    store.attach_profile_image(profile_image).map_err(wizard_error)?;
    Ok(())
}

fn fill_contacts(wizard: &mut DemoWizard) -> Result<(), AppError> {
    let store = wizard.store_mut();
    let emergency = [
        (EmergencyContactField::Name, "Abdul Karim"),
        (EmergencyContactField::Relationship, "Father"),
        (EmergencyContactField::Phone, "+8801711000000"),
    ];
    for (field, value) in emergency {
        store
            .update_entry(0, GroupField::EmergencyContact(field), value)
            .map_err(wizard_error)?;
    }
    store.add_health_condition("Asthma");

    let second = store.append_entry(GroupKind::OverseasContacts);
    let contacts = [(0, "Amina Begum", "Oman"), (second, "Rahim Uddin", "Qatar")];
    for (index, name, country) in contacts {
        for (field, value) in [
            (OverseasContactField::Name, name),
            (OverseasContactField::Country, country),
        ] {
            store
                .update_entry(index, GroupField::OverseasContact(field), value)
                .map_err(wizard_error)?;
        }
    }
    // The Oman row goes; the Qatar contact keeps its values.
    store
        .remove_entry(GroupKind::OverseasContacts, 0)
        .map_err(wizard_error)?;

    store
        .update_entry(0, GroupField::SocialHandle(SocialHandleField::Platform), "LinkedIn")
        .map_err(wizard_error)?;
    store
        .update_entry(0, GroupField::SocialHandle(SocialHandleField::Username), "nasrin-akter")
        .map_err(wizard_error)?;
    Ok(())
}

fn fill_documents(wizard: &mut DemoWizard) -> Result<(), AppError> {
    let store = wizard.store_mut();
    store
        .set_field(ProfileField::BmetNumber, FIXTURE_BMET_NUMBER)
        .map_err(wizard_error)?;
    store
        .set_field(ProfileField::VisaNumber, FIXTURE_VISA_NUMBER)
        .map_err(wizard_error)?;

    let lookup = FixtureReferenceLookup;
    wizard.fetch_bmet(&lookup)?;
    wizard.fetch_visa(&lookup)?;

    let scan = SelectedFile::new("nid-front.pdf", "application/pdf", b"%PDF-1.7".to_vec());
    wizard
        .store_mut()
        .attach_document(DocumentSlot::NationalId(CardSide::Front), &scan)
        .map_err(wizard_error)?;
    Ok(())
}

fn wizard_error<E>(err: E) -> AppError
where
    E: Into<overseas_intake::workflows::intake::WizardError>,
{
    AppError::Wizard(err.into())
}
