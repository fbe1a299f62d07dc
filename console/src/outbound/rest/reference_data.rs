//! REST adapter for dropdown reference lists.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::map_request_error;
use crate::domain::ports::{
    ReferenceDataError, ReferenceDataSource, ReferenceList, RequestClient, RequestError,
};
use crate::domain::{SelectOption, options_from_records};

/// Where a reference list lives and which columns carry the option.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Endpoint {
    path: String,
    id_key: &'static str,
    name_key: &'static str,
}

fn endpoint(list: &ReferenceList) -> Endpoint {
    let (path, id_key, name_key) = match list {
        ReferenceList::Provinces => (
            "common/address/province".to_owned(),
            "province_id",
            "province_name",
        ),
        ReferenceList::Districts { province_id } => (
            format!("common/address/district/{province_id}"),
            "district_id",
            "district_name",
        ),
        ReferenceList::Communes { district_id } => (
            format!("common/address/commune/{district_id}"),
            "commune_id",
            "commune_name",
        ),
        ReferenceList::Villages { commune_id } => (
            format!("common/address/village/{commune_id}"),
            "village_id",
            "village_name",
        ),
        ReferenceList::ChannelTypes => (
            "channel-type/channel-type".to_owned(),
            "channel_type_id",
            "channel_type_name",
        ),
        ReferenceList::Genders => ("common/gender".to_owned(), "gender_id", "gender_name"),
        ReferenceList::Businesses => (
            "common/business".to_owned(),
            "business_id",
            "business_name",
        ),
        ReferenceList::LeadSources => (
            "lead-source/lead-source".to_owned(),
            "lead_source_id",
            "lead_source_name",
        ),
        ReferenceList::CustomerTypes => (
            "customer-type/customer-type".to_owned(),
            "customer_type_id",
            "customer_type_name",
        ),
    };
    Endpoint {
        path,
        id_key,
        name_key,
    }
}

/// Reference data source backed by the REST request client.
#[derive(Clone)]
pub struct RestReferenceDataSource {
    client: Arc<dyn RequestClient>,
}

impl RestReferenceDataSource {
    /// Source issuing requests through `client`.
    pub fn new(client: Arc<dyn RequestClient>) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for RestReferenceDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestReferenceDataSource")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ReferenceDataSource for RestReferenceDataSource {
    async fn fetch(&self, list: &ReferenceList) -> Result<Vec<SelectOption>, ReferenceDataError> {
        let endpoint = endpoint(list);
        let body = self
            .client
            .get(&endpoint.path)
            .await
            .map_err(map_error)?;
        let options = options_from_records(list_rows(&body), endpoint.id_key, endpoint.name_key);
        if options.is_empty() && !body.is_array() {
            warn!(path = %endpoint.path, "reference list response held no rows");
        }
        debug!(path = %endpoint.path, count = options.len(), "reference list loaded");
        Ok(options)
    }
}

/// Rows of a list response: either the body itself or its `data` array.
fn list_rows(body: &Value) -> &Value {
    match body.get("data") {
        Some(rows) if rows.is_array() => rows,
        _ => body,
    }
}

fn map_error(error: RequestError) -> ReferenceDataError {
    map_request_error(
        error,
        ReferenceDataError::unauthorized,
        ReferenceDataError::rejected,
        ReferenceDataError::transport,
        ReferenceDataError::decode,
    )
}

#[cfg(test)]
mod tests {
    //! Endpoint mapping and response decoding.

    use super::*;
    use crate::domain::ports::MockRequestClient;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::provinces(ReferenceList::Provinces, "common/address/province")]
    #[case::districts(
        ReferenceList::Districts { province_id: "12".to_owned() },
        "common/address/district/12"
    )]
    #[case::communes(
        ReferenceList::Communes { district_id: "1201".to_owned() },
        "common/address/commune/1201"
    )]
    #[case::villages(
        ReferenceList::Villages { commune_id: "120101".to_owned() },
        "common/address/village/120101"
    )]
    #[case::channel_types(ReferenceList::ChannelTypes, "channel-type/channel-type")]
    #[case::lead_sources(ReferenceList::LeadSources, "lead-source/lead-source")]
    #[case::customer_types(ReferenceList::CustomerTypes, "customer-type/customer-type")]
    fn maps_lists_to_paths(#[case] list: ReferenceList, #[case] path: &str) {
        assert_eq!(endpoint(&list).path, path);
    }

    #[tokio::test]
    async fn converts_rows_into_options() {
        let mut client = MockRequestClient::new();
        client
            .expect_get()
            .withf(|path| path == "common/address/district/12")
            .times(1)
            .returning(|_| {
                Ok(json!([
                    { "district_id": 1201, "district_name": "Chamkar Mon" },
                    { "district_id": null, "district_name": "Broken" }
                ]))
            });
        let source = RestReferenceDataSource::new(Arc::new(client));

        let options = source
            .fetch(&ReferenceList::Districts {
                province_id: "12".to_owned(),
            })
            .await
            .expect("fetch succeeds");

        assert_eq!(options, vec![SelectOption::new("1201", "Chamkar Mon")]);
    }

    #[tokio::test]
    async fn unwraps_data_envelopes() {
        let mut client = MockRequestClient::new();
        client.expect_get().returning(|_| {
            Ok(json!({ "data": [{ "gender_id": "1", "gender_name": "Male" }] }))
        });
        let source = RestReferenceDataSource::new(Arc::new(client));

        let options = source
            .fetch(&ReferenceList::Genders)
            .await
            .expect("fetch succeeds");

        assert_eq!(options.len(), 1);
    }

    #[tokio::test]
    async fn unexpected_bodies_degrade_to_empty_lists() {
        let mut client = MockRequestClient::new();
        client
            .expect_get()
            .returning(|_| Ok(json!({ "message": "maintenance" })));
        let source = RestReferenceDataSource::new(Arc::new(client));

        let options = source
            .fetch(&ReferenceList::Provinces)
            .await
            .expect("fetch succeeds");

        assert!(options.is_empty());
    }

    #[rstest]
    #[case::unauthorized(RequestError::status(401_u16, "expired"), "Unauthorized")]
    #[case::rejected(RequestError::status(500_u16, "boom"), "Rejected")]
    #[case::timeout(RequestError::timeout("slow"), "Transport")]
    #[case::decode(RequestError::decode("html"), "Decode")]
    fn maps_request_errors(#[case] error: RequestError, #[case] expected: &str) {
        let mapped = map_error(error);
        let matched = match expected {
            "Unauthorized" => matches!(mapped, ReferenceDataError::Unauthorized { .. }),
            "Rejected" => matches!(mapped, ReferenceDataError::Rejected { status: 500, .. }),
            "Transport" => matches!(mapped, ReferenceDataError::Transport { .. }),
            "Decode" => matches!(mapped, ReferenceDataError::Decode { .. }),
            _ => panic!("unsupported test expectation: {expected}"),
        };
        assert!(matched, "{expected} expected, got {mapped:?}");
    }
}
