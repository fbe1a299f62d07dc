//! Driven port for dropdown reference data.
//!
//! Address levels, channel types and the simple lookup lists (gender,
//! business, lead source, customer type) all come back as dropdown options.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{AddressLevel, SelectOption};

/// Reference list to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceList {
    /// Every province.
    Provinces,
    /// Districts of one province.
    Districts {
        /// Parent province identifier.
        province_id: String,
    },
    /// Communes of one district.
    Communes {
        /// Parent district identifier.
        district_id: String,
    },
    /// Villages of one commune.
    Villages {
        /// Parent commune identifier.
        commune_id: String,
    },
    /// Contact channel types (phone, email, ...).
    ChannelTypes,
    /// Genders.
    Genders,
    /// Businesses a lead can belong to.
    Businesses,
    /// Lead sources.
    LeadSources,
    /// Customer types.
    CustomerTypes,
}

impl ReferenceList {
    /// Address list for `level`, keyed by the parent's identifier.
    ///
    /// Returns `None` when a non-root level is requested without a parent id.
    pub fn address(level: AddressLevel, parent_id: Option<&str>) -> Option<Self> {
        match (level, parent_id) {
            (AddressLevel::Province, _) => Some(Self::Provinces),
            (AddressLevel::District, Some(id)) => Some(Self::Districts {
                province_id: id.to_owned(),
            }),
            (AddressLevel::Commune, Some(id)) => Some(Self::Communes {
                district_id: id.to_owned(),
            }),
            (AddressLevel::Village, Some(id)) => Some(Self::Villages {
                commune_id: id.to_owned(),
            }),
            (_, None) => None,
        }
    }
}

define_port_error! {
    /// Errors surfaced while loading reference data.
    pub enum ReferenceDataError {
        /// The session is no longer valid.
        Unauthorized { message: String } =>
            "reference data request unauthorised: {message}",
        /// The backend answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "reference data request rejected with status {status}: {message}",
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "reference data transport failed: {message}",
        /// The response body did not contain a usable list.
        Decode { message: String } =>
            "reference data decode failed: {message}",
    }
}

/// Port for fetching dropdown reference lists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceDataSource: Send + Sync {
    /// Fetch one reference list as dropdown options.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use crm_console::domain::ports::{
    ///     FixtureReferenceDataSource, ReferenceDataSource, ReferenceList,
    /// };
    ///
    /// let source = FixtureReferenceDataSource::default();
    /// let provinces = source.fetch(&ReferenceList::Provinces).await?;
    /// assert!(provinces.is_empty());
    /// # Ok::<(), crm_console::domain::ports::ReferenceDataError>(())
    /// ```
    async fn fetch(&self, list: &ReferenceList) -> Result<Vec<SelectOption>, ReferenceDataError>;
}

/// Fixture source serving canned lists and nothing else.
#[derive(Debug, Clone, Default)]
pub struct FixtureReferenceDataSource {
    lists: Vec<(ReferenceList, Vec<SelectOption>)>,
}

impl FixtureReferenceDataSource {
    /// Serve `options` for `list`.
    #[must_use]
    pub fn with_list(mut self, list: ReferenceList, options: Vec<SelectOption>) -> Self {
        self.lists.push((list, options));
        self
    }
}

#[async_trait]
impl ReferenceDataSource for FixtureReferenceDataSource {
    async fn fetch(&self, list: &ReferenceList) -> Result<Vec<SelectOption>, ReferenceDataError> {
        Ok(self
            .lists
            .iter()
            .find(|(candidate, _)| candidate == list)
            .map(|(_, options)| options.clone())
            .unwrap_or_default())
    }
}
