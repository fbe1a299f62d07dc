//! REST adapters over the request client port.
//!
//! Each adapter maps one domain port onto backend endpoints: it picks the
//! path, shapes the JSON body and decodes the response. Transport concerns
//! stay in the request client.

mod dto;
mod records;
mod reference_data;

pub use records::{RestLeadGateway, RestPhotoStore, RestStaffGateway};
pub use reference_data::RestReferenceDataSource;

use crate::domain::ports::RequestError;

/// Translate a request error into a port error.
///
/// A 401 becomes the port's sign-in error, other statuses keep their code,
/// transport failures and timeouts collapse into one transport variant.
fn map_request_error<E>(
    error: RequestError,
    unauthorized: impl FnOnce(String) -> E,
    rejected: impl FnOnce(u16, String) -> E,
    transport: impl FnOnce(String) -> E,
    decode: impl FnOnce(String) -> E,
) -> E {
    if error.is_unauthorized() {
        return unauthorized(error.to_string());
    }
    match error {
        RequestError::Status { status, message } => rejected(status, message),
        RequestError::Timeout { message } | RequestError::Transport { message } => {
            transport(message)
        }
        RequestError::Decode { message } | RequestError::InvalidRequest { message } => {
            decode(message)
        }
    }
}
