//! Listing request state.

use serde::{Serialize, Serializer};
use serde::ser::SerializeStruct;

use crate::PaginationError;

/// Page size used when the caller does not configure one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Free-text search applied to a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Search {
    /// Column the backend searches (`lead_id`, `first_name`, ...).
    pub search_type: String,
    /// Search text; empty matches every row.
    pub query: String,
}

impl Search {
    /// Build a search over one column.
    pub fn new(search_type: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            search_type: search_type.into(),
            query: query.into(),
        }
    }
}

/// One listing request: the page to fetch plus the active search.
///
/// ## Invariants
/// - `page_number >= 1`
/// - `page_size >= 1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page_number: u32,
    page_size: u32,
    search: Search,
}

impl PageRequest {
    /// Request the first page with the given size.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::ZeroPageSize`] when `page_size` is zero.
    pub const fn first(page_size: u32) -> Result<Self, PaginationError> {
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        Ok(Self {
            page_number: 1,
            page_size,
            search: Search {
                search_type: String::new(),
                query: String::new(),
            },
        })
    }

    /// Current page number, starting at one.
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Rows per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Active search.
    #[must_use]
    pub const fn search(&self) -> &Search {
        &self.search
    }

    /// Replace the search; any change sends the listing back to page one.
    #[must_use]
    pub fn with_search(mut self, search: Search) -> Self {
        if search != self.search {
            self.page_number = 1;
            self.search = search;
        }
        self
    }

    /// Jump to a specific page.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::ZeroPageNumber`] for page zero.
    pub fn at_page(mut self, page_number: u32) -> Result<Self, PaginationError> {
        if page_number == 0 {
            return Err(PaginationError::ZeroPageNumber);
        }
        self.page_number = page_number;
        Ok(self)
    }

    /// Advance one page, saturating at `u32::MAX`.
    #[must_use]
    pub const fn next(mut self) -> Self {
        self.page_number = self.page_number.saturating_add(1);
        self
    }

    /// Go back one page, stopping at the first.
    #[must_use]
    pub const fn previous(mut self) -> Self {
        if self.page_number > 1 {
            self.page_number -= 1;
        }
        self
    }
}

impl Serialize for PageRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PageRequest", 4)?;
        state.serialize_field("page_number", &self.page_number.to_string())?;
        state.serialize_field("page_size", &self.page_size.to_string())?;
        state.serialize_field("search_type", &self.search.search_type)?;
        state.serialize_field("query_search", &self.search.query)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for request state transitions.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn serialises_every_value_as_a_string() {
        let request = PageRequest::first(25)
            .expect("size is valid")
            .with_search(Search::new("lead_id", "42"))
            .at_page(3)
            .expect("page is valid");

        let body = serde_json::to_value(&request).expect("request serialises");
        assert_eq!(
            body,
            json!({
                "page_number": "3",
                "page_size": "25",
                "search_type": "lead_id",
                "query_search": "42",
            })
        );
    }

    #[rstest]
    fn changing_the_search_resets_to_the_first_page() {
        let request = PageRequest::first(10)
            .expect("size is valid")
            .at_page(4)
            .expect("page is valid")
            .with_search(Search::new("first_name", "Dara"));

        assert_eq!(request.page_number(), 1);
    }

    #[rstest]
    fn repeating_the_same_search_keeps_the_page() {
        let search = Search::new("first_name", "Dara");
        let request = PageRequest::first(10)
            .expect("size is valid")
            .with_search(search.clone())
            .at_page(4)
            .expect("page is valid")
            .with_search(search);

        assert_eq!(request.page_number(), 4);
    }

    #[rstest]
    fn previous_stops_at_the_first_page() {
        let request = PageRequest::first(10).expect("size is valid").previous();
        assert_eq!(request.page_number(), 1);
        assert_eq!(request.next().page_number(), 2);
    }

    #[rstest]
    #[case::zero_size(PageRequest::first(0).map(|_| ()), PaginationError::ZeroPageSize)]
    #[case::zero_page(
        PageRequest::first(10).and_then(|request| request.at_page(0)).map(|_| ()),
        PaginationError::ZeroPageNumber
    )]
    fn rejects_zero_values(
        #[case] outcome: Result<(), PaginationError>,
        #[case] expected: PaginationError,
    ) {
        assert_eq!(outcome, Err(expected));
    }
}
