//! Domain primitives and form state for the admin console.
//!
//! Purpose: keep the rules of the Lead and Staff forms (address cascade,
//! contact channels, validation, submission) independent of HTTP so they can
//! be exercised with fixtures and mocks.
//!
//! Public surface:
//! - [`Address`], [`AddressSelector`]: hierarchical address and its staged
//!   cascading editor.
//! - [`ContactBook`], [`ContactEditor`]: contact channels and their staged
//!   editor.
//! - [`LeadForm`], [`StaffForm`], [`FormSubmitter`]: the form shells and the
//!   save flow.
//! - [`RecordDirectory`]: listing rows and update-form lookups.

mod address;
mod address_selector;
mod api_date;
mod contact;
mod contact_editor;
mod field_errors;
mod lead;
mod listing;
mod photo;
pub mod ports;
mod select_option;
mod staff;
mod submission;

pub use self::address::{Address, AddressLevel, OrphanSelection};
pub use self::address_selector::{AddressEditError, AddressSelector, FetchTicket};
pub use self::api_date::{format_api_date, parse_api_date};
pub use self::contact::{
    ContactBook, ContactChannel, ContactEntry, ContactField, ContactGroup, ContactIndexError,
    ContactValidationError, ContactValue, LocalId,
};
pub use self::contact_editor::{ContactEditError, ContactEditor};
pub use self::field_errors::FieldErrors;
pub use self::lead::{LeadField, LeadForm, LeadPayload, LeadRecord};
pub use self::listing::{
    LeadSummary, NOT_AVAILABLE, PLACEHOLDER_AVATAR, RecordDirectory, RecordStatus, StaffSummary,
    primary_contact_number,
};
pub use self::photo::PendingPhoto;
pub(crate) use self::select_option::scalar_text;
pub use self::select_option::{SelectOption, find_option, options_from_records};
pub use self::staff::{StaffField, StaffForm, StaffPayload, StaffRecord, split_current_address};
pub use self::submission::{
    FormSubmitter, Notice, NoticeVariant, SubmissionOutcome, SubmitMode,
};
