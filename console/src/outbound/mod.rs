//! Outbound adapters implementing domain ports for the CRM backend.
//!
//! - **http**: reqwest transport behind the `RequestClient` port
//! - **rest**: endpoint-aware adapters for reference data, records and photos
//!
//! Adapters are thin translators between domain types and the backend's JSON
//! shapes. They contain no form logic.

pub mod http;
pub mod rest;
