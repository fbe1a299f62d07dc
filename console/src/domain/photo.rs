//! Photo picked in a form but not uploaded yet.

use super::ports::PhotoUpload;

/// Locally selected image waiting for the save flow to upload it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPhoto {
    /// Original file name.
    pub file_name: String,
    /// MIME type, e.g. `image/jpeg`.
    pub content_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl PendingPhoto {
    /// Upload request for the record area `menu`, keyed by `photo_id` when
    /// the record already has an identifier.
    pub fn to_upload(&self, menu: &str, photo_id: Option<&str>) -> PhotoUpload {
        PhotoUpload {
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            bytes: self.bytes.clone(),
            menu: menu.to_owned(),
            photo_id: photo_id
                .filter(|id| !id.trim().is_empty())
                .map(str::to_owned),
        }
    }
}
