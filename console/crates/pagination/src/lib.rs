//! Page-number pagination primitives for listing endpoints.
//!
//! Listing endpoints take a request body where every value is sent as a
//! string (`page_number`, `page_size`, `search_type`, `query_search`) and reply
//! with an envelope carrying the page rows under `data` and the overall row
//! count under `total_row`.

mod envelope;
mod request;

pub use envelope::{Page, decode_page};
pub use request::{DEFAULT_PAGE_SIZE, PageRequest, Search};

use thiserror::Error;

/// Errors raised while building page requests or decoding envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Page numbers start at one.
    #[error("page number must be at least 1")]
    ZeroPageNumber,
    /// Page size must allow at least one row.
    #[error("page size must be at least 1")]
    ZeroPageSize,
    /// The response body did not match the listing envelope.
    #[error("invalid page envelope: {message}")]
    InvalidEnvelope {
        /// Decoder detail.
        message: String,
    },
}
