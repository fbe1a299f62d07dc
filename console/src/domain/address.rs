//! Hierarchical postal address.
//!
//! Province, district, commune and village form a strict hierarchy in the
//! backend's geographic reference data. [`Address`] keeps its fields private
//! so the only way to change a level is [`Address::select`], which clears every
//! level below the one being set.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::SelectOption;

/// One level of the address hierarchy, ordered from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressLevel {
    /// Top level.
    Province,
    /// Child of a province.
    District,
    /// Child of a district.
    Commune,
    /// Child of a commune.
    Village,
}

impl AddressLevel {
    /// Every level, root first.
    pub const ALL: [Self; 4] = [Self::Province, Self::District, Self::Commune, Self::Village];

    /// Level this one depends on.
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Province => None,
            Self::District => Some(Self::Province),
            Self::Commune => Some(Self::District),
            Self::Village => Some(Self::Commune),
        }
    }

    /// Level whose options depend on this one.
    pub const fn child(self) -> Option<Self> {
        match self {
            Self::Province => Some(Self::District),
            Self::District => Some(Self::Commune),
            Self::Commune => Some(Self::Village),
            Self::Village => None,
        }
    }

    /// Levels strictly below this one, nearest first.
    pub fn descendants(self) -> impl Iterator<Item = Self> {
        std::iter::successors(self.child(), |level| level.child())
    }

    /// Position of the level, root at zero.
    pub const fn index(self) -> usize {
        match self {
            Self::Province => 0,
            Self::District => 1,
            Self::Commune => 2,
            Self::Village => 3,
        }
    }

    /// Display name used in labels and messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Province => "Province",
            Self::District => "District",
            Self::Commune => "Commune",
            Self::Village => "Village",
        }
    }
}

impl fmt::Display for AddressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised when a level is selected while its parent is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot select a {level} before a {parent}")]
pub struct OrphanSelection {
    /// Level the caller tried to set.
    pub level: AddressLevel,
    /// Empty ancestor blocking the selection.
    pub parent: AddressLevel,
}

/// Postal address picked through the cascading selector.
///
/// ## Invariants
/// - No level is set while the level above it is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AddressDto", into = "AddressDto")]
pub struct Address {
    levels: [Option<SelectOption>; 4],
    home_address: String,
    street_address: String,
}

impl Address {
    /// Build an address from backend data, dropping any level whose parent is
    /// missing (and everything below it).
    pub fn from_levels(
        levels: [Option<SelectOption>; 4],
        home_address: impl Into<String>,
        street_address: impl Into<String>,
    ) -> Self {
        let mut address = Self {
            levels: Default::default(),
            home_address: home_address.into(),
            street_address: street_address.into(),
        };
        for (level, option) in AddressLevel::ALL.into_iter().zip(levels) {
            if address.select(level, option).is_err() {
                break;
            }
        }
        address
    }

    /// Set one level and clear every level below it.
    ///
    /// Descendants are cleared even when `option` equals the current value,
    /// so a re-selection never leaves a stale child behind.
    ///
    /// # Errors
    ///
    /// Returns [`OrphanSelection`] when `option` is `Some` but the parent level
    /// is empty; the address is left unchanged.
    pub fn select(
        &mut self,
        level: AddressLevel,
        option: Option<SelectOption>,
    ) -> Result<(), OrphanSelection> {
        if option.is_some() {
            if let Some(parent) = level.parent().filter(|parent| self.selection(*parent).is_none()) {
                return Err(OrphanSelection { level, parent });
            }
        }

        if let Some(slot) = self.levels.get_mut(level.index()) {
            *slot = option;
        }
        for descendant in level.descendants() {
            if let Some(slot) = self.levels.get_mut(descendant.index()) {
                *slot = None;
            }
        }
        Ok(())
    }

    /// Selected option at `level`.
    pub fn selection(&self, level: AddressLevel) -> Option<&SelectOption> {
        self.levels.get(level.index()).and_then(Option::as_ref)
    }

    /// Selected province.
    pub fn province(&self) -> Option<&SelectOption> {
        self.selection(AddressLevel::Province)
    }

    /// Selected district.
    pub fn district(&self) -> Option<&SelectOption> {
        self.selection(AddressLevel::District)
    }

    /// Selected commune.
    pub fn commune(&self) -> Option<&SelectOption> {
        self.selection(AddressLevel::Commune)
    }

    /// Selected village.
    pub fn village(&self) -> Option<&SelectOption> {
        self.selection(AddressLevel::Village)
    }

    /// Free-text house line.
    pub fn home_address(&self) -> &str {
        &self.home_address
    }

    /// Free-text street line.
    pub fn street_address(&self) -> &str {
        &self.street_address
    }

    /// Replace the house line.
    pub fn set_home_address(&mut self, text: impl Into<String>) {
        self.home_address = text.into();
    }

    /// Replace the street line.
    pub fn set_street_address(&mut self, text: impl Into<String>) {
        self.street_address = text.into();
    }

    /// Whether every level below an empty level is empty too.
    pub fn is_consistent(&self) -> bool {
        self.levels
            .iter()
            .skip_while(|level| level.is_some())
            .all(Option::is_none)
    }

    /// Whether all four levels are selected.
    pub fn is_complete(&self) -> bool {
        self.levels.iter().all(Option::is_some)
    }

    /// Single-line rendering, most specific part first, skipping empty parts.
    pub fn display_line(&self) -> String {
        let labels = self
            .levels
            .iter()
            .rev()
            .flatten()
            .map(SelectOption::label);
        [self.home_address.as_str(), self.street_address.as_str()]
            .into_iter()
            .chain(labels)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Serialised form; decoding goes back through [`Address::from_levels`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressDto {
    province: Option<SelectOption>,
    district: Option<SelectOption>,
    commune: Option<SelectOption>,
    village: Option<SelectOption>,
    #[serde(default)]
    home_address: String,
    #[serde(default)]
    street_address: String,
}

impl TryFrom<AddressDto> for Address {
    type Error = OrphanSelection;

    fn try_from(dto: AddressDto) -> Result<Self, Self::Error> {
        let mut address = Self {
            levels: Default::default(),
            home_address: dto.home_address,
            street_address: dto.street_address,
        };
        let levels = [dto.province, dto.district, dto.commune, dto.village];
        for (level, option) in AddressLevel::ALL.into_iter().zip(levels) {
            address.select(level, option)?;
        }
        Ok(address)
    }
}

impl From<Address> for AddressDto {
    fn from(address: Address) -> Self {
        let [province, district, commune, village] = address.levels;
        Self {
            province,
            district,
            commune,
            village,
            home_address: address.home_address,
            street_address: address.street_address,
        }
    }
}
