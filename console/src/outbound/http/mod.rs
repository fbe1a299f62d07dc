//! HTTP transport adapter.
//!
//! Provides the reqwest implementation of the `RequestClient` port.

mod reqwest_client;

pub use reqwest_client::HttpRequestClient;
