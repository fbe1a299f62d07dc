//! Domain ports for the console's driven adapters.

mod macros;
mod record_gateway;
mod reference_data_source;
mod request_client;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use record_gateway::{MockLeadGateway, MockPhotoStore, MockStaffGateway};
pub use record_gateway::{
    FixtureLeadGateway, FixturePhotoStore, FixtureStaffGateway, LeadGateway, PhotoStore,
    RecordGatewayError, StaffGateway,
};
#[cfg(test)]
pub use reference_data_source::MockReferenceDataSource;
pub use reference_data_source::{
    FixtureReferenceDataSource, ReferenceDataError, ReferenceDataSource, ReferenceList,
};
#[cfg(test)]
pub use request_client::MockRequestClient;
pub use request_client::{PhotoUpload, RequestClient, RequestError, UNAUTHORIZED_STATUS};
