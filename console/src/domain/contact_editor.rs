//! Staged editing of a contact book.
//!
//! Opening the editor deep-copies the committed book; every operation works
//! on that copy. `save` validates and moves the copy into the committed slot,
//! `cancel` drops it. The owning form never sees half-finished edits.

use super::{
    ContactBook, ContactField, ContactIndexError, ContactValidationError, SelectOption,
};

/// Errors returned by [`ContactEditor`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContactEditError {
    /// The editor is closed; call [`ContactEditor::open`] first.
    #[error("contact editor is not open")]
    NotEditing,
    /// The position does not exist in the staged book.
    #[error(transparent)]
    Index(#[from] ContactIndexError),
    /// The staged book failed validation; the editor stays open.
    #[error(transparent)]
    Invalid(#[from] ContactValidationError),
}

/// Contact editor with an explicit staging copy.
#[derive(Debug, Clone, Default)]
pub struct ContactEditor {
    committed: ContactBook,
    staged: Option<ContactBook>,
    error: Option<ContactValidationError>,
}

impl ContactEditor {
    /// Editor over an already committed book.
    pub fn new(committed: ContactBook) -> Self {
        Self {
            committed,
            staged: None,
            error: None,
        }
    }

    /// Last saved book, as shown by the owning form.
    pub fn committed(&self) -> &ContactBook {
        &self.committed
    }

    /// Book being edited, if the editor is open.
    pub fn staged(&self) -> Option<&ContactBook> {
        self.staged.as_ref()
    }

    /// Whether an editing session is in progress.
    pub fn is_open(&self) -> bool {
        self.staged.is_some()
    }

    /// Message from the last failed save.
    pub fn error(&self) -> Option<ContactValidationError> {
        self.error
    }

    /// Start editing from a fresh copy of the committed book.
    ///
    /// Re-opening an open editor discards the previous staged edits.
    pub fn open(&mut self) {
        self.staged = Some(self.committed.clone());
        self.error = None;
    }

    /// See [`ContactBook::add_channel`].
    ///
    /// # Errors
    ///
    /// Returns [`ContactEditError::NotEditing`] when the editor is closed.
    pub fn add_channel(&mut self) -> Result<usize, ContactEditError> {
        Ok(self.draft()?.add_channel())
    }

    /// See [`ContactBook::remove_channel`].
    ///
    /// # Errors
    ///
    /// Returns [`ContactEditError`] when closed or the index is unknown.
    pub fn remove_channel(&mut self, channel_index: usize) -> Result<(), ContactEditError> {
        self.draft()?.remove_channel(channel_index)?;
        Ok(())
    }

    /// See [`ContactBook::set_channel_type`].
    ///
    /// # Errors
    ///
    /// Returns [`ContactEditError`] when closed or the index is unknown.
    pub fn set_channel_type(
        &mut self,
        channel_index: usize,
        channel_type: Option<SelectOption>,
    ) -> Result<(), ContactEditError> {
        self.draft()?.set_channel_type(channel_index, channel_type)?;
        Ok(())
    }

    /// See [`ContactBook::add_value`].
    ///
    /// # Errors
    ///
    /// Returns [`ContactEditError`] when closed or the index is unknown.
    pub fn add_value(&mut self, channel_index: usize) -> Result<usize, ContactEditError> {
        Ok(self.draft()?.add_value(channel_index)?)
    }

    /// See [`ContactBook::remove_value`].
    ///
    /// # Errors
    ///
    /// Returns [`ContactEditError`] when closed or the position is unknown.
    pub fn remove_value(
        &mut self,
        channel_index: usize,
        value_index: usize,
    ) -> Result<(), ContactEditError> {
        self.draft()?.remove_value(channel_index, value_index)?;
        Ok(())
    }

    /// See [`ContactBook::set_value_field`].
    ///
    /// # Errors
    ///
    /// Returns [`ContactEditError`] when closed or the position is unknown.
    pub fn set_value_field(
        &mut self,
        channel_index: usize,
        value_index: usize,
        field: ContactField,
        text: impl Into<String>,
    ) -> Result<(), ContactEditError> {
        self.draft()?
            .set_value_field(channel_index, value_index, field, text)?;
        Ok(())
    }

    /// See [`ContactBook::set_primary`].
    ///
    /// # Errors
    ///
    /// Returns [`ContactEditError`] when closed or the position is unknown.
    pub fn set_primary(
        &mut self,
        channel_index: usize,
        value_index: usize,
    ) -> Result<(), ContactEditError> {
        self.draft()?.set_primary(channel_index, value_index)?;
        Ok(())
    }

    /// Validate the staged book without closing the editor.
    ///
    /// # Errors
    ///
    /// Returns [`ContactEditError::NotEditing`] when closed, or
    /// [`ContactEditError::Invalid`] with the reason the book cannot be saved.
    pub fn validate(&self) -> Result<(), ContactEditError> {
        let staged = self.staged.as_ref().ok_or(ContactEditError::NotEditing)?;
        staged.validate()?;
        Ok(())
    }

    /// Validate and publish the staged book, closing the editor.
    ///
    /// On failure the editor stays open and the reason is kept in
    /// [`ContactEditor::error`].
    ///
    /// # Errors
    ///
    /// Returns [`ContactEditError::NotEditing`] or
    /// [`ContactEditError::Invalid`].
    pub fn save(&mut self) -> Result<&ContactBook, ContactEditError> {
        if let Err(ContactEditError::Invalid(reason)) = self.validate() {
            self.error = Some(reason);
            return Err(ContactEditError::Invalid(reason));
        }
        let staged = self.staged.take().ok_or(ContactEditError::NotEditing)?;
        self.committed = staged;
        self.error = None;
        Ok(&self.committed)
    }

    /// Drop the staged copy; the committed book is unchanged.
    pub fn cancel(&mut self) {
        self.staged = None;
        self.error = None;
    }

    /// Take the committed book out of the editor.
    pub fn into_committed(self) -> ContactBook {
        self.committed
    }

    fn draft(&mut self) -> Result<&mut ContactBook, ContactEditError> {
        self.staged.as_mut().ok_or(ContactEditError::NotEditing)
    }
}

#[cfg(test)]
mod tests {
    //! Staging behaviour of the contact editor.

    use super::*;
    use crate::domain::{ContactEntry, ContactGroup};
    use rstest::{fixture, rstest};

    fn phone() -> SelectOption {
        SelectOption::new("1", "Phone")
    }

    #[fixture]
    fn editor() -> ContactEditor {
        let committed = ContactBook::from_groups(
            vec![ContactGroup {
                channel_type_id: "1".to_owned(),
                contact_values: vec![ContactEntry {
                    user_name: String::new(),
                    contact_number: "012 345 678".to_owned(),
                    remark: String::new(),
                    is_primary: true,
                }],
            }],
            &[phone()],
        );
        ContactEditor::new(committed)
    }

    #[rstest]
    fn operations_require_an_open_editor(editor: ContactEditor) {
        let mut editor = editor;
        assert_eq!(editor.add_channel(), Err(ContactEditError::NotEditing));
        assert_eq!(editor.save().map(|_| ()), Err(ContactEditError::NotEditing));
    }

    #[rstest]
    fn staged_edits_stay_invisible_until_saved(editor: ContactEditor) {
        let mut editor = editor;
        let before = editor.committed().clone();
        editor.open();
        editor.add_value(0).expect("channel exists");
        editor
            .set_value_field(0, 1, ContactField::ContactNumber, "098 765 432")
            .expect("value exists");

        assert_eq!(editor.committed(), &before);

        let saved = editor.save().expect("staged book is valid");
        assert_eq!(saved.value_count(), 2);
        assert!(!editor.is_open());
    }

    #[rstest]
    fn cancel_discards_staged_edits(editor: ContactEditor) {
        let mut editor = editor;
        let before = editor.committed().clone();
        editor.open();
        editor.remove_channel(0).expect("channel exists");
        editor.cancel();

        assert_eq!(editor.committed(), &before);
        assert!(editor.staged().is_none());
    }

    #[rstest]
    fn failed_save_keeps_the_editor_open(editor: ContactEditor) {
        let mut editor = editor;
        editor.open();
        editor.add_channel().expect("editor is open");

        let error = editor.save().map(|_| ()).expect_err("untyped channel must fail");

        assert_eq!(
            error,
            ContactEditError::Invalid(ContactValidationError::Incomplete)
        );
        assert!(editor.is_open());
        assert_eq!(editor.error(), Some(ContactValidationError::Incomplete));
    }

    #[rstest]
    fn reopening_starts_from_the_committed_book(editor: ContactEditor) {
        let mut editor = editor;
        editor.open();
        editor.add_channel().expect("editor is open");
        editor.open();

        assert_eq!(editor.staged(), Some(editor.committed()));
    }
}
