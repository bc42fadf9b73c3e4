use serde::{Deserialize, Serialize};

/// The three pages of the wizard, in order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStep {
    /// Profile image, personal details, address, purpose and profession.
    #[default]
    Profile,
    /// Emergency contacts, health conditions, overseas contacts, social media.
    Contacts,
    /// BMET/visa numbers and official documents.
    Documents,
}

impl IntakeStep {
    pub const COUNT: u8 = 3;

    pub const fn ordered() -> [Self; 3] {
        [Self::Profile, Self::Contacts, Self::Documents]
    }

    /// 1-based position shown in the progress bar.
    pub const fn number(self) -> u8 {
        match self {
            Self::Profile => 1,
            Self::Contacts => 2,
            Self::Documents => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Profile => "Profile Information",
            Self::Contacts => "Contacts & Health",
            Self::Documents => "Official Documents",
        }
    }

    const fn next(self) -> Option<Self> {
        match self {
            Self::Profile => Some(Self::Contacts),
            Self::Contacts => Some(Self::Documents),
            Self::Documents => None,
        }
    }

    const fn previous(self) -> Option<Self> {
        match self {
            Self::Profile => None,
            Self::Contacts => Some(Self::Profile),
            Self::Documents => Some(Self::Contacts),
        }
    }
}

/// Linear navigation between the wizard steps.
///
/// Navigation is never blocked by incomplete fields; required markers are a
/// rendering concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepController {
    current: IntakeStep,
}

impl StepController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> IntakeStep {
        self.current
    }

    /// Move forward one step. Returns `false` when already on the last step.
    pub fn advance(&mut self) -> bool {
        match self.current.next() {
            Some(next) => {
                self.current = next;
                true
            }
            None => false,
        }
    }

    /// Move back one step. Returns `false` when already on the first step.
    pub fn retreat(&mut self) -> bool {
        match self.current.previous() {
            Some(previous) => {
                self.current = previous;
                true
            }
            None => false,
        }
    }

    pub fn can_submit(&self) -> bool {
        self.current == IntakeStep::Documents
    }

    /// Width of the progress bar fill, 0 on the first step and 100 on the last.
    pub fn progress_percent(&self) -> u8 {
        (u32::from(self.current.number() - 1) * 100 / u32::from(IntakeStep::COUNT - 1)) as u8
    }

    pub(crate) fn restart(&mut self) {
        self.current = IntakeStep::Profile;
    }
}
