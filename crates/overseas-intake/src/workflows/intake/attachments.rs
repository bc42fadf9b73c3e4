use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use mime::Mime;
use serde::Serialize;
use tracing::{debug, warn};

/// Default upload ceiling shown to applicants ("up to 5MB").
pub const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 5 * 1024 * 1024;

/// File picked by the applicant, as delivered by the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Capability that turns file contents into a displayable URL and revokes it again.
///
/// This is the blob-URL bridge of the rendering layer.
pub trait PreviewPort: Send + Sync {
    fn create_url(&self, file: &SelectedFile) -> Result<String, AttachmentError>;
    fn revoke_url(&self, url: &str);
}

/// Live preview reference. Owned by exactly one slot; not `Clone`.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct AttachmentHandle {
    id: u64,
    url: String,
    file_name: String,
    media_type: String,
    size: u64,
}

impl AttachmentHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Holder for at most one live handle.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttachmentSlot {
    handle: Option<AttachmentHandle>,
}

impl AttachmentSlot {
    pub fn handle(&self) -> Option<&AttachmentHandle> {
        self.handle.as_ref()
    }

    pub fn is_filled(&self) -> bool {
        self.handle.is_some()
    }

    pub(crate) fn take(&mut self) -> Option<AttachmentHandle> {
        self.handle.take()
    }
}

/// Size and type limits applied before a preview is created.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentPolicy {
    max_bytes: u64,
    accepted: Vec<Mime>,
}

impl AttachmentPolicy {
    pub fn new(max_bytes: u64, accepted: Vec<Mime>) -> Self {
        Self { max_bytes, accepted }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn accepted(&self) -> &[Mime] {
        &self.accepted
    }

    pub fn accepts(&self, media_type: &Mime) -> bool {
        self.accepted.iter().any(|range| {
            if range.type_() == mime::STAR {
                return true;
            }
            range.type_() == media_type.type_()
                && (range.subtype() == mime::STAR || range.subtype() == media_type.subtype())
        })
    }

    /// Same size ceiling, narrowed to image ranges. `*/*` narrows to `image/*`.
    pub fn images_only(&self) -> Self {
        let mut accepted: Vec<Mime> = Vec::new();
        for range in &self.accepted {
            let narrowed = if range.type_() == mime::STAR {
                mime::IMAGE_STAR
            } else if range.type_() == mime::IMAGE {
                range.clone()
            } else {
                continue;
            };
            if !accepted.contains(&narrowed) {
                accepted.push(narrowed);
            }
        }
        if accepted.is_empty() {
            accepted.push(mime::IMAGE_STAR);
        }
        Self::new(self.max_bytes, accepted)
    }

    pub fn check(&self, file: &SelectedFile) -> Result<(), AttachmentError> {
        if file.bytes.is_empty() {
            return Err(AttachmentError::Unreadable {
                file_name: file.file_name.clone(),
                reason: "file is empty".to_string(),
            });
        }

        if file.size() > self.max_bytes {
            return Err(AttachmentError::Oversized {
                file_name: file.file_name.clone(),
                size: file.size(),
                limit: self.max_bytes,
            });
        }

        let parsed = file.media_type.parse::<Mime>().ok();
        match parsed {
            Some(media_type) if self.accepts(&media_type) => Ok(()),
            _ => Err(AttachmentError::UnsupportedType {
                file_name: file.file_name.clone(),
                media_type: file.media_type.clone(),
            }),
        }
    }
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTACHMENT_BYTES,
            vec![mime::IMAGE_STAR, mime::APPLICATION_PDF],
        )
    }
}

static HANDLE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Creates and releases preview handles. Keeps no reference to handles it hands out.
pub struct AttachmentLifecycle<P> {
    port: Arc<P>,
    policy: AttachmentPolicy,
    image_policy: AttachmentPolicy,
}

impl<P: PreviewPort> AttachmentLifecycle<P> {
    pub fn new(port: Arc<P>, policy: AttachmentPolicy) -> Self {
        let image_policy = policy.images_only();
        Self {
            port,
            policy,
            image_policy,
        }
    }

    pub fn policy(&self) -> &AttachmentPolicy {
        &self.policy
    }

    /// Policy for slots that only take pictures, such as the profile image.
    pub fn image_policy(&self) -> &AttachmentPolicy {
        &self.image_policy
    }

    pub fn create_handle(&self, file: &SelectedFile) -> Result<AttachmentHandle, AttachmentError> {
        self.create_checked(&self.policy, file)
    }

    fn create_checked(
        &self,
        policy: &AttachmentPolicy,
        file: &SelectedFile,
    ) -> Result<AttachmentHandle, AttachmentError> {
        if let Err(err) = policy.check(file) {
            warn!(file = %file.file_name, error = %err, "attachment rejected");
            return Err(err);
        }

        let url = self.port.create_url(file)?;
        let handle = AttachmentHandle {
            id: HANDLE_SEQUENCE.fetch_add(1, Ordering::Relaxed),
            url,
            file_name: file.file_name.clone(),
            media_type: file.media_type.clone(),
            size: file.size(),
        };
        debug!(handle = handle.id, url = %handle.url, "attachment preview created");
        Ok(handle)
    }

    pub fn release_handle(&self, handle: AttachmentHandle) {
        debug!(handle = handle.id, url = %handle.url, "attachment preview released");
        self.port.revoke_url(&handle.url);
    }

    /// Replace the slot contents with a handle for `file`.
    ///
    /// The new handle is created first so a failure leaves the slot as it was; the
    /// previous handle is released before the new one is stored.
    pub fn assign(
        &self,
        slot: &mut AttachmentSlot,
        file: &SelectedFile,
    ) -> Result<(), AttachmentError> {
        let fresh = self.create_checked(&self.policy, file)?;
        self.replace(slot, fresh);
        Ok(())
    }

    /// Like [`assign`](Self::assign), checked against the image-only policy.
    pub fn assign_image(
        &self,
        slot: &mut AttachmentSlot,
        file: &SelectedFile,
    ) -> Result<(), AttachmentError> {
        let fresh = self.create_checked(&self.image_policy, file)?;
        self.replace(slot, fresh);
        Ok(())
    }

    fn replace(&self, slot: &mut AttachmentSlot, fresh: AttachmentHandle) {
        if let Some(previous) = slot.handle.take() {
            self.release_handle(previous);
        }
        slot.handle = Some(fresh);
    }

    /// Empty the slot, releasing its handle. Returns whether anything was released.
    pub fn clear(&self, slot: &mut AttachmentSlot) -> bool {
        match slot.handle.take() {
            Some(previous) => {
                self.release_handle(previous);
                true
            }
            None => false,
        }
    }
}

/// Recoverable failure while turning a selected file into a preview.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentError {
    #[error("could not read '{file_name}': {reason}")]
    Unreadable { file_name: String, reason: String },
    #[error("'{file_name}' has unsupported type {media_type}")]
    UnsupportedType {
        file_name: String,
        media_type: String,
    },
    #[error("'{file_name}' is {size} bytes, above the {limit} byte limit")]
    Oversized {
        file_name: String,
        size: u64,
        limit: u64,
    },
}
