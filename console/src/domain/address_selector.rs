//! Cascading address selector.
//!
//! The selector owns the committed [`Address`], a staged copy while the
//! editor is open, and the option list of every level. Selecting a level
//! clears the levels below it and hands back a [`FetchTicket`] for the next
//! level's options. Every level carries a generation counter that is bumped
//! whenever its list is invalidated; a fetched list is applied only when the
//! ticket's generation is still current, so a slow response for an old parent
//! can never overwrite the list of a newer one.

use tracing::{debug, warn};

use super::ports::{ReferenceDataError, ReferenceDataSource, ReferenceList};
use super::{Address, AddressLevel, FieldErrors, OrphanSelection, SelectOption};

/// Request for the option list of one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    level: AddressLevel,
    list: ReferenceList,
    generation: u64,
}

impl FetchTicket {
    /// Level whose options the ticket loads.
    pub fn level(&self) -> AddressLevel {
        self.level
    }

    /// Reference list to request.
    pub fn list(&self) -> &ReferenceList {
        &self.list
    }
}

/// Errors returned by [`AddressSelector`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressEditError {
    /// The editor is closed; call [`AddressSelector::open`] first.
    #[error("address editor is not open")]
    NotEditing,
    /// A level was selected before its parent.
    #[error(transparent)]
    Orphan(#[from] OrphanSelection),
    /// The staged address failed validation; the editor stays open.
    #[error("address is incomplete: {0}")]
    Invalid(FieldErrors<AddressLevel>),
}

#[derive(Debug, Clone, Default)]
struct LevelOptions {
    generation: u64,
    options: Vec<SelectOption>,
}

/// Address editor with dependent option lists.
#[derive(Debug, Clone, Default)]
pub struct AddressSelector {
    committed: Address,
    staged: Option<Address>,
    levels: [LevelOptions; 4],
    errors: FieldErrors<AddressLevel>,
}

impl AddressSelector {
    /// Selector over an already committed address.
    pub fn new(committed: Address) -> Self {
        Self {
            committed,
            ..Self::default()
        }
    }

    /// Last committed address, as shown by the owning form.
    pub fn committed(&self) -> &Address {
        &self.committed
    }

    /// Address being edited, if the editor is open.
    pub fn staged(&self) -> Option<&Address> {
        self.staged.as_ref()
    }

    /// Whether an editing session is in progress.
    pub fn is_open(&self) -> bool {
        self.staged.is_some()
    }

    /// Options currently offered for `level`; empty until loaded.
    pub fn options(&self, level: AddressLevel) -> &[SelectOption] {
        self.level_options(level)
            .map(|slot| slot.options.as_slice())
            .unwrap_or_default()
    }

    /// Per-level messages from the last failed validation.
    pub fn errors(&self) -> &FieldErrors<AddressLevel> {
        &self.errors
    }

    /// Start editing from a copy of the committed address.
    ///
    /// Returns the fetches the view needs: the province list when it has not
    /// been loaded yet, and the child list of every level already selected in
    /// the committed address.
    pub fn open(&mut self) -> Vec<FetchTicket> {
        let staged = self.committed.clone();
        self.errors = FieldErrors::new();

        let mut tickets = Vec::new();
        if self.options(AddressLevel::Province).is_empty() {
            tickets.extend(self.ticket(AddressLevel::Province, None));
        }
        for level in AddressLevel::ALL {
            let Some(child) = level.child() else { continue };
            match staged.selection(level) {
                Some(parent) => {
                    let parent_id = parent.value().to_owned();
                    self.invalidate(child);
                    tickets.extend(self.ticket(child, Some(&parent_id)));
                }
                None => self.invalidate(child),
            }
        }

        self.staged = Some(staged);
        tickets
    }

    /// Select a province; see [`AddressSelector::select`].
    ///
    /// # Errors
    ///
    /// Returns [`AddressEditError::NotEditing`] when the editor is closed.
    pub fn set_province(
        &mut self,
        option: Option<SelectOption>,
    ) -> Result<Option<FetchTicket>, AddressEditError> {
        self.select(AddressLevel::Province, option)
    }

    /// Select a district; see [`AddressSelector::select`].
    ///
    /// # Errors
    ///
    /// Returns [`AddressEditError`] when closed or no province is selected.
    pub fn set_district(
        &mut self,
        option: Option<SelectOption>,
    ) -> Result<Option<FetchTicket>, AddressEditError> {
        self.select(AddressLevel::District, option)
    }

    /// Select a commune; see [`AddressSelector::select`].
    ///
    /// # Errors
    ///
    /// Returns [`AddressEditError`] when closed or no district is selected.
    pub fn set_commune(
        &mut self,
        option: Option<SelectOption>,
    ) -> Result<Option<FetchTicket>, AddressEditError> {
        self.select(AddressLevel::Commune, option)
    }

    /// Select a village. Villages have no dependent level, so no ticket is
    /// ever returned.
    ///
    /// # Errors
    ///
    /// Returns [`AddressEditError`] when closed or no commune is selected.
    pub fn set_village(&mut self, option: Option<SelectOption>) -> Result<(), AddressEditError> {
        self.select(AddressLevel::Village, option).map(|_| ())
    }

    /// Select `option` at `level` in the staged address.
    ///
    /// Every level below is cleared unconditionally and its option list is
    /// emptied and invalidated. When `option` is `Some` and the level has a
    /// child, the returned ticket loads the child's options.
    ///
    /// # Errors
    ///
    /// Returns [`AddressEditError::NotEditing`] when closed, or
    /// [`AddressEditError::Orphan`] when the parent level is empty.
    pub fn select(
        &mut self,
        level: AddressLevel,
        option: Option<SelectOption>,
    ) -> Result<Option<FetchTicket>, AddressEditError> {
        let staged = self.staged.as_mut().ok_or(AddressEditError::NotEditing)?;
        let parent_id = option.as_ref().map(|selected| selected.value().to_owned());
        staged.select(level, option)?;

        self.errors.clear(&level);
        for descendant in level.descendants() {
            self.invalidate(descendant);
        }

        Ok(match (level.child(), parent_id) {
            (Some(child), Some(id)) => self.ticket(child, Some(&id)),
            _ => None,
        })
    }

    /// Replace the staged house line.
    ///
    /// # Errors
    ///
    /// Returns [`AddressEditError::NotEditing`] when the editor is closed.
    pub fn set_home_address(&mut self, text: impl Into<String>) -> Result<(), AddressEditError> {
        self.staged
            .as_mut()
            .ok_or(AddressEditError::NotEditing)?
            .set_home_address(text);
        Ok(())
    }

    /// Replace the staged street line.
    ///
    /// # Errors
    ///
    /// Returns [`AddressEditError::NotEditing`] when the editor is closed.
    pub fn set_street_address(&mut self, text: impl Into<String>) -> Result<(), AddressEditError> {
        self.staged
            .as_mut()
            .ok_or(AddressEditError::NotEditing)?
            .set_street_address(text);
        Ok(())
    }

    /// Apply a fetched list for `ticket`.
    ///
    /// Returns `false` and leaves the list untouched when the ticket is stale.
    /// A failed fetch is logged and leaves the list empty; selecting the
    /// parent again issues a fresh ticket.
    pub fn apply(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<SelectOption>, ReferenceDataError>,
    ) -> bool {
        let Some(slot) = self.level_options_mut(ticket.level) else {
            return false;
        };
        if slot.generation != ticket.generation {
            debug!(
                level = %ticket.level,
                ticket_generation = ticket.generation,
                current_generation = slot.generation,
                "dropping stale address options"
            );
            return false;
        }

        match result {
            Ok(options) => slot.options = options,
            Err(error) => {
                warn!(level = %ticket.level, error = %error, "failed to fetch address options");
                slot.options.clear();
            }
        }
        true
    }

    /// Fetch the list for `ticket` from `source` and apply it.
    ///
    /// Returns whether the response was applied (see [`AddressSelector::apply`]).
    pub async fn load(&mut self, source: &dyn ReferenceDataSource, ticket: &FetchTicket) -> bool {
        let result = source.fetch(&ticket.list).await;
        self.apply(ticket, result)
    }

    /// Check that all four levels are selected.
    ///
    /// Returns one message per missing level; the house and street lines are
    /// optional.
    ///
    /// # Errors
    ///
    /// Returns [`AddressEditError::NotEditing`] when the editor is closed.
    pub fn validate(&self) -> Result<FieldErrors<AddressLevel>, AddressEditError> {
        let staged = self.staged.as_ref().ok_or(AddressEditError::NotEditing)?;
        Ok(missing_levels(staged))
    }

    /// Validate and publish the staged address, closing the editor.
    ///
    /// # Errors
    ///
    /// Returns [`AddressEditError::NotEditing`] when closed, or
    /// [`AddressEditError::Invalid`] with the per-level messages; the editor
    /// stays open in that case.
    pub fn commit(&mut self) -> Result<&Address, AddressEditError> {
        let errors = self.validate()?;
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(AddressEditError::Invalid(errors));
        }
        let staged = self.staged.take().ok_or(AddressEditError::NotEditing)?;
        self.committed = staged;
        self.errors = FieldErrors::new();
        Ok(&self.committed)
    }

    /// Drop the staged copy; the committed address is unchanged.
    pub fn cancel(&mut self) {
        self.staged = None;
        self.errors = FieldErrors::new();
    }

    /// Take the committed address out of the selector.
    pub fn into_committed(self) -> Address {
        self.committed
    }

    fn ticket(&self, level: AddressLevel, parent_id: Option<&str>) -> Option<FetchTicket> {
        let list = ReferenceList::address(level, parent_id)?;
        let generation = self.level_options(level)?.generation;
        Some(FetchTicket {
            level,
            list,
            generation,
        })
    }

    fn invalidate(&mut self, level: AddressLevel) {
        if let Some(slot) = self.level_options_mut(level) {
            slot.generation = slot.generation.wrapping_add(1);
            slot.options.clear();
        }
    }

    fn level_options(&self, level: AddressLevel) -> Option<&LevelOptions> {
        self.levels.get(level.index())
    }

    fn level_options_mut(&mut self, level: AddressLevel) -> Option<&mut LevelOptions> {
        self.levels.get_mut(level.index())
    }
}

fn missing_levels(address: &Address) -> FieldErrors<AddressLevel> {
    let mut errors = FieldErrors::new();
    for level in AddressLevel::ALL {
        if address.selection(level).is_none() {
            errors.insert(level, format!("{} is required.", level.label()));
        }
    }
    errors
}
