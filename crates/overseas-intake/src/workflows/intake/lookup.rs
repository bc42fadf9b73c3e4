use serde::{Deserialize, Serialize};

/// Registry lookups behind the "Fetch" buttons on the documents step.
pub trait ReferenceLookup: Send + Sync {
    fn bmet(&self, bmet_number: &str) -> Result<BmetReference, LookupError>;
    fn visa(&self, visa_number: &str) -> Result<VisaReference, LookupError>;
}

/// Bureau of Manpower, Employment and Training registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BmetReference {
    pub bmet_number: String,
    pub national_id_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisaReference {
    pub visa_number: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("no registration found for '{0}'")]
    NotFound(String),
    #[error("reference registry unavailable: {0}")]
    Unavailable(String),
}
