//! Save flow shared by the Lead and Staff forms.
//!
//! A submission checks the saving gate, validates the form, confirms a
//! signed-in user, uploads any pending photo and finally creates or updates
//! the record. Every outcome carries the notice the form shows the user.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, info, warn};

use super::ports::{LeadGateway, PhotoStore, RecordGatewayError, StaffGateway};
use super::{FieldErrors, LeadField, LeadForm, PendingPhoto, StaffField, StaffForm};

/// Tone of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeVariant {
    /// The record was saved.
    Success,
    /// Something went wrong.
    Error,
}

/// Banner shown after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Tone.
    pub variant: NoticeVariant,
    /// Short heading.
    pub title: String,
    /// Body text.
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            variant: NoticeVariant::Success,
            title: "Success!".to_owned(),
            message: message.into(),
        }
    }

    fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            variant: NoticeVariant::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    fn sign_in() -> Self {
        Self::error(
            "Authentication Error",
            "Could not find user information. Please log in again.",
        )
    }
}

/// Whether a submission creates a record or updates a stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    /// `*/create`.
    Create,
    /// `*/update`.
    Update,
}

/// Result of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome<F: Ord> {
    /// The record was saved.
    Saved(Notice),
    /// Validation failed; nothing was sent.
    Invalid(FieldErrors<F>),
    /// No signed-in user, or the session expired mid-flight.
    SignInRequired(Notice),
    /// The backend rejected the save or could not be reached.
    Failed(Notice),
    /// Another submission is still in flight.
    AlreadySaving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordKind {
    Lead,
    Staff,
}

impl RecordKind {
    const fn menu(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Staff => "staff",
        }
    }

    const fn saved_message(self, mode: SubmitMode) -> &'static str {
        match (self, mode) {
            (Self::Lead, SubmitMode::Create) => "Lead has been created successfully.",
            (Self::Lead, SubmitMode::Update) => "Lead has been updated successfully.",
            (Self::Staff, SubmitMode::Create) => "Staff has been created successfully.",
            (Self::Staff, SubmitMode::Update) => "Staff member has been updated successfully.",
        }
    }

    fn failure_notice(self, mode: SubmitMode) -> Notice {
        match (self, mode) {
            (Self::Lead, SubmitMode::Create) => Notice::error(
                "Save Failed",
                "An error occurred while saving the lead. Please try again.",
            ),
            (Self::Lead, SubmitMode::Update) => Notice::error(
                "Save Failed",
                "An error occurred while updating the lead. Please try again.",
            ),
            (Self::Staff, SubmitMode::Create) => Notice::error(
                "Save Failed",
                "An error occurred while saving the staff member.",
            ),
            (Self::Staff, SubmitMode::Update) => Notice::error(
                "Update Failed",
                "An error occurred while updating the staff member.",
            ),
        }
    }
}

/// Clears the saving flag when the submission finishes, however it ends.
struct SavingGuard<'a>(&'a AtomicBool);

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives create and update submissions for both record kinds.
///
/// Only one submission runs at a time; a second call while one is in flight
/// returns [`SubmissionOutcome::AlreadySaving`] without touching the backend.
pub struct FormSubmitter {
    leads: Arc<dyn LeadGateway>,
    staff: Arc<dyn StaffGateway>,
    photos: Arc<dyn PhotoStore>,
    saving: AtomicBool,
}

impl FormSubmitter {
    /// Submitter over the given gateways.
    pub fn new(
        leads: Arc<dyn LeadGateway>,
        staff: Arc<dyn StaffGateway>,
        photos: Arc<dyn PhotoStore>,
    ) -> Self {
        Self {
            leads,
            staff,
            photos,
            saving: AtomicBool::new(false),
        }
    }

    /// Whether a submission is in flight.
    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Validate and save a lead.
    pub async fn submit_lead(
        &self,
        form: &LeadForm,
        mode: SubmitMode,
    ) -> SubmissionOutcome<LeadField> {
        let Some(_guard) = self.begin() else {
            return SubmissionOutcome::AlreadySaving;
        };
        let errors = form.validate();
        if !errors.is_empty() {
            return SubmissionOutcome::Invalid(errors);
        }
        if form.current_staff_id.trim().is_empty() {
            warn!("lead submission without a signed-in staff member");
            return SubmissionOutcome::SignInRequired(Notice::sign_in());
        }

        let kind = RecordKind::Lead;
        let photo_id = match mode {
            SubmitMode::Create => None,
            SubmitMode::Update => form.lead_id.as_deref(),
        };
        let result: Result<(), RecordGatewayError> = async {
            let photo_url = self
                .resolve_photo(
                    kind,
                    form.photo.as_ref(),
                    photo_id,
                    form.existing_photo_url.clone(),
                )
                .await?;
            let payload = form.to_payload(photo_url);
            match mode {
                SubmitMode::Create => self.leads.create(&payload).await,
                SubmitMode::Update => self.leads.update(&payload).await,
            }
        }
        .await;
        finish(kind, mode, result)
    }

    /// Validate and save a staff member.
    pub async fn submit_staff(
        &self,
        form: &StaffForm,
        mode: SubmitMode,
    ) -> SubmissionOutcome<StaffField> {
        let Some(_guard) = self.begin() else {
            return SubmissionOutcome::AlreadySaving;
        };
        let errors = form.validate();
        if !errors.is_empty() {
            return SubmissionOutcome::Invalid(errors);
        }
        if form.signed_in_user_id.trim().is_empty() {
            warn!("staff submission without a signed-in user");
            return SubmissionOutcome::SignInRequired(Notice::sign_in());
        }

        let kind = RecordKind::Staff;
        let result: Result<(), RecordGatewayError> = async {
            let photo_url = self
                .resolve_photo(
                    kind,
                    form.photo.as_ref(),
                    Some(form.record_id()),
                    form.existing_photo_url.clone(),
                )
                .await?;
            let payload = form.to_payload(photo_url);
            match mode {
                SubmitMode::Create => self.staff.create(&payload).await,
                SubmitMode::Update => self.staff.update(&payload).await,
            }
        }
        .await;
        finish(kind, mode, result)
    }

    fn begin(&self) -> Option<SavingGuard<'_>> {
        self.saving
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SavingGuard(&self.saving))
    }

    async fn resolve_photo(
        &self,
        kind: RecordKind,
        pending: Option<&PendingPhoto>,
        photo_id: Option<&str>,
        existing: Option<String>,
    ) -> Result<Option<String>, RecordGatewayError> {
        match pending {
            Some(photo) => {
                let url = self
                    .photos
                    .upload_photo(photo.to_upload(kind.menu(), photo_id))
                    .await?;
                info!(menu = kind.menu(), "photo uploaded");
                Ok(Some(url))
            }
            None => Ok(existing.filter(|url| !url.trim().is_empty())),
        }
    }
}

impl fmt::Debug for FormSubmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSubmitter")
            .field("saving", &self.is_saving())
            .finish_non_exhaustive()
    }
}

fn finish<F: Ord>(
    kind: RecordKind,
    mode: SubmitMode,
    result: Result<(), RecordGatewayError>,
) -> SubmissionOutcome<F> {
    match result {
        Ok(()) => {
            info!(menu = kind.menu(), ?mode, "record saved");
            SubmissionOutcome::Saved(Notice::success(kind.saved_message(mode)))
        }
        Err(err) if err.is_unauthorized() => {
            warn!(menu = kind.menu(), error = %err, "session expired during save");
            SubmissionOutcome::SignInRequired(Notice::sign_in())
        }
        Err(err) => {
            error!(menu = kind.menu(), ?mode, error = %err, "record save failed");
            SubmissionOutcome::Failed(kind.failure_notice(mode))
        }
    }
}
