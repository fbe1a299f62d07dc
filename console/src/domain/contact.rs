//! Multi-channel contact information.
//!
//! A [`ContactBook`] is a list of channels (phone, email, ...) where every
//! channel holds its own list of contact values. Exactly one value across the
//! whole book is primary whenever the book holds any value at all.
//! [`ContactBook::set_primary`] is the only operation that moves the flag;
//! every other operation either leaves it alone or, when the primary value is
//! deleted, promotes a replacement.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{SelectOption, find_option};

/// Client-local identifier, stable for one editing session and never sent to
/// the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalId(Uuid);

impl LocalId {
    /// Fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Free-text field of a contact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    /// Account or display name on the channel.
    UserName,
    /// Phone number, address or handle.
    ContactNumber,
    /// Free-form note.
    Remark,
}

/// One reachable contact on a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactValue {
    id: LocalId,
    user_name: String,
    contact_number: String,
    remark: String,
    is_primary: bool,
}

impl ContactValue {
    fn empty(is_primary: bool) -> Self {
        Self {
            id: LocalId::random(),
            user_name: String::new(),
            contact_number: String::new(),
            remark: String::new(),
            is_primary,
        }
    }

    /// Session-local identifier.
    pub fn id(&self) -> LocalId {
        self.id
    }

    /// Account or display name.
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Number, address or handle.
    pub fn contact_number(&self) -> &str {
        &self.contact_number
    }

    /// Free-form note.
    pub fn remark(&self) -> &str {
        &self.remark
    }

    /// Whether this is the primary contact of the book.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// Text of one field.
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::UserName => &self.user_name,
            ContactField::ContactNumber => &self.contact_number,
            ContactField::Remark => &self.remark,
        }
    }

    fn field_mut(&mut self, field: ContactField) -> &mut String {
        match field {
            ContactField::UserName => &mut self.user_name,
            ContactField::ContactNumber => &mut self.contact_number,
            ContactField::Remark => &mut self.remark,
        }
    }
}

/// Contact values grouped under one channel type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactChannel {
    id: LocalId,
    channel_type: Option<SelectOption>,
    values: Vec<ContactValue>,
}

impl ContactChannel {
    /// Session-local identifier.
    pub fn id(&self) -> LocalId {
        self.id
    }

    /// Selected channel type.
    pub fn channel_type(&self) -> Option<&SelectOption> {
        self.channel_type.as_ref()
    }

    /// Values in display order.
    pub fn values(&self) -> &[ContactValue] {
        &self.values
    }
}

/// Wire shape of one contact value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEntry {
    /// Account or display name.
    #[serde(default)]
    pub user_name: String,
    /// Number, address or handle.
    #[serde(default)]
    pub contact_number: String,
    /// Free-form note.
    #[serde(default)]
    pub remark: String,
    /// Primary flag.
    #[serde(default)]
    pub is_primary: bool,
}

/// Wire shape of one channel: the backend groups values by channel type id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactGroup {
    /// Channel type identifier.
    pub channel_type_id: String,
    /// Values on the channel.
    #[serde(default)]
    pub contact_values: Vec<ContactEntry>,
}

/// Position that does not exist in the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContactIndexError {
    /// No channel at this index.
    #[error("channel {index} does not exist ({len} channels)")]
    Channel {
        /// Requested channel index.
        index: usize,
        /// Number of channels.
        len: usize,
    },
    /// No value at this index in the channel.
    #[error("value {index} does not exist in channel {channel} ({len} values)")]
    Value {
        /// Channel index.
        channel: usize,
        /// Requested value index.
        index: usize,
        /// Number of values in the channel.
        len: usize,
    },
}

/// Reasons a contact book cannot be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContactValidationError {
    /// No channel holds any value.
    #[error("Contact is required.")]
    Missing,
    /// A channel lacks a type or values, or a value lacks a number.
    #[error("Each contact group must have a channel and each contact must have a number/ID.")]
    Incomplete,
}

/// Channels and their contact values.
///
/// ## Invariants
/// - At most one value is primary.
/// - When any value exists, exactly one is primary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactBook {
    channels: Vec<ContactChannel>,
}

impl ContactBook {
    /// Empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a book from the backend's grouped shape.
    ///
    /// Channel type ids are resolved against `channel_types`; an id missing
    /// from the list leaves the channel untyped so the user must pick one
    /// again before saving. The primary flag is normalised: the first primary
    /// value wins and, when none is flagged, the first value is promoted.
    pub fn from_groups(groups: Vec<ContactGroup>, channel_types: &[SelectOption]) -> Self {
        let mut seen_primary = false;
        let channels = groups
            .into_iter()
            .map(|group| {
                let channel_type = find_option(channel_types, &group.channel_type_id).cloned();
                if channel_type.is_none() {
                    debug!(
                        channel_type_id = %group.channel_type_id,
                        "channel type not in the current list; leaving channel untyped"
                    );
                }
                let values = group
                    .contact_values
                    .into_iter()
                    .map(|entry| {
                        let is_primary = entry.is_primary && !seen_primary;
                        seen_primary |= is_primary;
                        ContactValue {
                            id: LocalId::random(),
                            user_name: entry.user_name,
                            contact_number: entry.contact_number,
                            remark: entry.remark,
                            is_primary,
                        }
                    })
                    .collect();
                ContactChannel {
                    id: LocalId::random(),
                    channel_type,
                    values,
                }
            })
            .collect();

        let mut book = Self { channels };
        if !seen_primary {
            book.promote_first();
        }
        book
    }

    /// Regroup into the submission payload.
    ///
    /// Channels without a type or without values are left out.
    pub fn to_groups(&self) -> Vec<ContactGroup> {
        self.channels
            .iter()
            .filter(|channel| !channel.values.is_empty())
            .filter_map(|channel| {
                let channel_type = channel.channel_type.as_ref()?;
                Some(ContactGroup {
                    channel_type_id: channel_type.value().to_owned(),
                    contact_values: channel
                        .values
                        .iter()
                        .map(|value| ContactEntry {
                            user_name: value.user_name.clone(),
                            contact_number: value.contact_number.clone(),
                            remark: value.remark.clone(),
                            is_primary: value.is_primary,
                        })
                        .collect(),
                })
            })
            .collect()
    }

    /// Channels in display order.
    pub fn channels(&self) -> &[ContactChannel] {
        &self.channels
    }

    /// Whether the book holds no channel at all.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Total number of values across every channel.
    pub fn value_count(&self) -> usize {
        self.channels.iter().map(|channel| channel.values.len()).sum()
    }

    /// `(channel, value)` position of the primary value.
    pub fn primary_position(&self) -> Option<(usize, usize)> {
        self.channels
            .iter()
            .enumerate()
            .find_map(|(channel_index, channel)| {
                channel
                    .values
                    .iter()
                    .position(ContactValue::is_primary)
                    .map(|value_index| (channel_index, value_index))
            })
    }

    /// Primary value, if any.
    pub fn primary(&self) -> Option<&ContactValue> {
        self.values().find(|value| value.is_primary)
    }

    /// Whether the single-primary invariant holds.
    pub fn is_consistent(&self) -> bool {
        let primaries = self.values().filter(|value| value.is_primary).count();
        if self.value_count() == 0 {
            primaries == 0
        } else {
            primaries == 1
        }
    }

    /// Append an untyped channel holding one empty value.
    ///
    /// The new value is primary only when nothing else is. Returns the index
    /// of the new channel.
    pub fn add_channel(&mut self) -> usize {
        let is_primary = !self.has_primary();
        self.channels.push(ContactChannel {
            id: LocalId::random(),
            channel_type: None,
            values: vec![ContactValue::empty(is_primary)],
        });
        self.channels.len() - 1
    }

    /// Delete a channel and its values.
    ///
    /// When the deleted channel held the primary value, the first value of the
    /// first channel that still has values becomes primary.
    ///
    /// # Errors
    ///
    /// Returns [`ContactIndexError::Channel`] for an unknown index.
    pub fn remove_channel(&mut self, index: usize) -> Result<ContactChannel, ContactIndexError> {
        self.channel(index)?;
        let removed = self.channels.remove(index);
        if removed.values.iter().any(ContactValue::is_primary) {
            self.promote_first();
        }
        Ok(removed)
    }

    /// Set or clear a channel's type; its values are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ContactIndexError::Channel`] for an unknown index.
    pub fn set_channel_type(
        &mut self,
        index: usize,
        channel_type: Option<SelectOption>,
    ) -> Result<(), ContactIndexError> {
        self.channel_mut(index)?.channel_type = channel_type;
        Ok(())
    }

    /// Append an empty value to a channel; primary only when nothing else is.
    /// Returns the index of the new value.
    ///
    /// # Errors
    ///
    /// Returns [`ContactIndexError::Channel`] for an unknown index.
    pub fn add_value(&mut self, channel_index: usize) -> Result<usize, ContactIndexError> {
        let is_primary = !self.has_primary();
        let channel = self.channel_mut(channel_index)?;
        channel.values.push(ContactValue::empty(is_primary));
        Ok(channel.values.len() - 1)
    }

    /// Delete one value.
    ///
    /// Removing the primary value promotes the first remaining value of the
    /// same channel; when that channel is now empty, the first value of the
    /// first channel with values is promoted instead. An emptied channel stays
    /// in the book until removed explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`ContactIndexError`] for an unknown position.
    pub fn remove_value(
        &mut self,
        channel_index: usize,
        value_index: usize,
    ) -> Result<ContactValue, ContactIndexError> {
        self.value(channel_index, value_index)?;
        let channel = self.channel_mut(channel_index)?;
        let removed = channel.values.remove(value_index);
        let emptied = channel.values.is_empty();
        if removed.is_primary {
            if emptied {
                self.promote_first();
            } else {
                self.promote_first_in(channel_index);
            }
        }
        Ok(removed)
    }

    /// Replace one text field of a value; the primary flag is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ContactIndexError`] for an unknown position.
    pub fn set_value_field(
        &mut self,
        channel_index: usize,
        value_index: usize,
        field: ContactField,
        text: impl Into<String>,
    ) -> Result<(), ContactIndexError> {
        *self.value_mut(channel_index, value_index)?.field_mut(field) = text.into();
        Ok(())
    }

    /// Make exactly this value primary and every other value not primary.
    ///
    /// # Errors
    ///
    /// Returns [`ContactIndexError`] for an unknown position; no flag changes
    /// in that case.
    pub fn set_primary(
        &mut self,
        channel_index: usize,
        value_index: usize,
    ) -> Result<(), ContactIndexError> {
        self.value(channel_index, value_index)?;
        for (ci, channel) in self.channels.iter_mut().enumerate() {
            for (vi, value) in channel.values.iter_mut().enumerate() {
                value.is_primary = ci == channel_index && vi == value_index;
            }
        }
        Ok(())
    }

    /// Check the book can be submitted.
    ///
    /// # Errors
    ///
    /// - [`ContactValidationError::Missing`] when no channel holds a value.
    /// - [`ContactValidationError::Incomplete`] when a channel has no type or
    ///   no values, or a value has a blank contact number.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        if self.value_count() == 0 {
            return Err(ContactValidationError::Missing);
        }
        let incomplete = self.channels.iter().any(|channel| {
            channel.channel_type.is_none()
                || channel.values.is_empty()
                || channel
                    .values
                    .iter()
                    .any(|value| value.contact_number.trim().is_empty())
        });
        if incomplete {
            return Err(ContactValidationError::Incomplete);
        }
        Ok(())
    }

    fn values(&self) -> impl Iterator<Item = &ContactValue> {
        self.channels.iter().flat_map(|channel| channel.values.iter())
    }

    fn has_primary(&self) -> bool {
        self.values().any(ContactValue::is_primary)
    }

    fn promote_first(&mut self) {
        if let Some(first) = self
            .channels
            .iter_mut()
            .flat_map(|channel| channel.values.iter_mut())
            .next()
        {
            first.is_primary = true;
        }
    }

    fn promote_first_in(&mut self, channel_index: usize) {
        if let Some(first) = self
            .channels
            .get_mut(channel_index)
            .and_then(|channel| channel.values.first_mut())
        {
            first.is_primary = true;
        }
    }

    fn channel(&self, index: usize) -> Result<&ContactChannel, ContactIndexError> {
        let len = self.channels.len();
        self.channels
            .get(index)
            .ok_or(ContactIndexError::Channel { index, len })
    }

    fn channel_mut(&mut self, index: usize) -> Result<&mut ContactChannel, ContactIndexError> {
        let len = self.channels.len();
        self.channels
            .get_mut(index)
            .ok_or(ContactIndexError::Channel { index, len })
    }

    fn value(&self, channel: usize, index: usize) -> Result<&ContactValue, ContactIndexError> {
        let values = &self.channel(channel)?.values;
        values.get(index).ok_or(ContactIndexError::Value {
            channel,
            index,
            len: values.len(),
        })
    }

    fn value_mut(
        &mut self,
        channel: usize,
        index: usize,
    ) -> Result<&mut ContactValue, ContactIndexError> {
        let values = &mut self.channel_mut(channel)?.values;
        let len = values.len();
        values
            .get_mut(index)
            .ok_or(ContactIndexError::Value { channel, index, len })
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the single-primary invariant and the wire mapping.

    use super::*;
    use rstest::{fixture, rstest};

    fn phone() -> SelectOption {
        SelectOption::new("1", "Phone")
    }

    fn email() -> SelectOption {
        SelectOption::new("2", "Email")
    }

    fn entry(number: &str, is_primary: bool) -> ContactEntry {
        ContactEntry {
            user_name: String::new(),
            contact_number: number.to_owned(),
            remark: String::new(),
            is_primary,
        }
    }

    /// One phone channel with two numbers; the second is primary.
    #[fixture]
    fn two_phones() -> ContactBook {
        ContactBook::from_groups(
            vec![ContactGroup {
                channel_type_id: "1".to_owned(),
                contact_values: vec![entry("012 345 678", false), entry("098 765 432", true)],
            }],
            &[phone(), email()],
        )
    }

    #[rstest]
    fn first_channel_value_becomes_primary() {
        let mut book = ContactBook::new();
        book.add_channel();
        book.add_channel();

        assert_eq!(book.primary_position(), Some((0, 0)));
        assert!(book.is_consistent());
    }

    #[rstest]
    fn added_values_do_not_steal_primary(two_phones: ContactBook) {
        let mut book = two_phones;
        let index = book.add_value(0).expect("channel exists");

        assert_eq!(index, 2);
        assert_eq!(book.primary_position(), Some((0, 1)));
    }

    #[rstest]
    fn removing_the_primary_value_promotes_within_the_channel(two_phones: ContactBook) {
        let mut book = two_phones;
        let removed = book.remove_value(0, 1).expect("value exists");

        assert!(removed.is_primary());
        assert_eq!(book.primary().map(ContactValue::contact_number), Some("012 345 678"));
        assert_eq!(book.validate(), Ok(()));
    }

    #[rstest]
    fn emptying_the_primary_channel_promotes_elsewhere() {
        let mut book = ContactBook::new();
        book.add_channel();
        book.add_channel();
        book.remove_value(0, 0).expect("value exists");

        assert_eq!(book.channels().len(), 2);
        assert_eq!(book.primary_position(), Some((1, 0)));
        assert_eq!(book.validate(), Err(ContactValidationError::Incomplete));
    }

    #[rstest]
    fn removing_the_primary_channel_promotes_first_remaining_value() {
        let mut book = ContactBook::new();
        book.add_channel();
        book.add_channel();
        book.add_value(1).expect("channel exists");
        book.set_primary(0, 0).expect("value exists");

        book.remove_channel(0).expect("channel exists");

        assert_eq!(book.primary_position(), Some((0, 0)));
        assert!(book.is_consistent());
    }

    #[rstest]
    fn removing_the_last_value_leaves_no_primary() {
        let mut book = ContactBook::new();
        book.add_channel();
        book.remove_channel(0).expect("channel exists");

        assert!(book.primary().is_none());
        assert!(book.is_consistent());
    }

    #[rstest]
    fn set_primary_moves_the_flag_across_channels(two_phones: ContactBook) {
        let mut book = two_phones;
        let channel = book.add_channel();
        book.set_primary(channel, 0).expect("value exists");

        assert_eq!(book.primary_position(), Some((channel, 0)));
        assert!(book.is_consistent());
    }

    #[rstest]
    fn field_edits_leave_primary_alone(two_phones: ContactBook) {
        let mut book = two_phones;
        book.set_value_field(0, 0, ContactField::Remark, "Work")
            .expect("value exists");

        let first = book.channels()[0].values()[0].clone();
        assert_eq!(first.field(ContactField::Remark), "Work");
        assert!(!first.is_primary());
    }

    #[rstest]
    #[case::set_primary_channel(|book: &mut ContactBook| book.set_primary(5, 0).map(|_| ()))]
    #[case::set_primary_value(|book: &mut ContactBook| book.set_primary(0, 9).map(|_| ()))]
    #[case::remove_value(|book: &mut ContactBook| book.remove_value(0, 9).map(|_| ()))]
    #[case::remove_channel(|book: &mut ContactBook| book.remove_channel(3).map(|_| ()))]
    #[case::add_value(|book: &mut ContactBook| book.add_value(3).map(|_| ()))]
    fn out_of_range_positions_change_nothing(
        two_phones: ContactBook,
        #[case] operation: fn(&mut ContactBook) -> Result<(), ContactIndexError>,
    ) {
        let mut book = two_phones.clone();
        assert!(operation(&mut book).is_err());
        assert_eq!(book, two_phones);
    }

    #[rstest]
    fn validation_rejects_an_empty_book() {
        assert_eq!(ContactBook::new().validate(), Err(ContactValidationError::Missing));
    }

    #[rstest]
    fn validation_rejects_untyped_channels() {
        let mut book = ContactBook::new();
        book.add_channel();
        book.set_value_field(0, 0, ContactField::ContactNumber, "012 345 678")
            .expect("value exists");

        assert_eq!(book.validate(), Err(ContactValidationError::Incomplete));
        book.set_channel_type(0, Some(phone())).expect("channel exists");
        assert_eq!(book.validate(), Ok(()));
    }

    #[rstest]
    fn validation_rejects_whitespace_numbers(two_phones: ContactBook) {
        let mut book = two_phones;
        book.set_value_field(0, 0, ContactField::ContactNumber, "   ")
            .expect("value exists");
        assert_eq!(book.validate(), Err(ContactValidationError::Incomplete));
    }

    #[rstest]
    fn regrouping_round_trips_the_backend_shape() {
        let groups = vec![
            ContactGroup {
                channel_type_id: "1".to_owned(),
                contact_values: vec![entry("012 345 678", false), entry("098 765 432", true)],
            },
            ContactGroup {
                channel_type_id: "2".to_owned(),
                contact_values: vec![ContactEntry {
                    user_name: "dara".to_owned(),
                    contact_number: "dara@example.com".to_owned(),
                    remark: "Work".to_owned(),
                    is_primary: false,
                }],
            },
        ];

        let book = ContactBook::from_groups(groups.clone(), &[phone(), email()]);
        assert_eq!(book.to_groups(), groups);
    }

    #[rstest]
    fn regrouping_drops_untyped_and_empty_channels(two_phones: ContactBook) {
        let mut book = two_phones;
        book.add_channel();
        let emptied = book.add_channel();
        book.set_channel_type(emptied, Some(email())).expect("channel exists");
        book.remove_value(emptied, 0).expect("value exists");

        let groups = book.to_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].channel_type_id, "1");
    }

    #[rstest]
    #[case::many_primaries(vec![entry("a", true), entry("b", true)], Some((0, 0)))]
    #[case::no_primary(vec![entry("a", false), entry("b", false)], Some((0, 0)))]
    #[case::no_values(vec![], None)]
    fn hydration_normalises_primary_flags(
        #[case] values: Vec<ContactEntry>,
        #[case] expected: Option<(usize, usize)>,
    ) {
        let book = ContactBook::from_groups(
            vec![ContactGroup {
                channel_type_id: "1".to_owned(),
                contact_values: values,
            }],
            &[phone()],
        );

        assert_eq!(book.primary_position(), expected);
        assert!(book.is_consistent());
    }

    #[rstest]
    fn unknown_channel_types_hydrate_untyped() {
        let book = ContactBook::from_groups(
            vec![ContactGroup {
                channel_type_id: "99".to_owned(),
                contact_values: vec![entry("a", true)],
            }],
            &[phone()],
        );

        assert!(book.channels()[0].channel_type().is_none());
        assert_eq!(book.validate(), Err(ContactValidationError::Incomplete));
    }

    #[rstest]
    fn every_structural_sequence_keeps_one_primary() {
        let mut book = ContactBook::new();
        let steps: [fn(&mut ContactBook); 9] = [
            |book| {
                book.add_channel();
            },
            |book| {
                book.add_value(0).ok();
            },
            |book| {
                book.add_channel();
            },
            |book| {
                book.set_primary(1, 0).ok();
            },
            |book| {
                book.add_value(1).ok();
            },
            |book| {
                book.remove_value(1, 0).ok();
            },
            |book| {
                book.remove_channel(1).ok();
            },
            |book| {
                book.remove_value(0, 0).ok();
            },
            |book| {
                book.remove_value(0, 0).ok();
            },
        ];

        for step in steps {
            step(&mut book);
            assert!(book.is_consistent(), "invariant broken: {book:?}");
        }
        assert_eq!(book.value_count(), 0);
    }
}
