//! Client core for the CRM admin console.
//!
//! The domain layer holds the form state for Lead and Staff records: the
//! cascading address selector, the multi-channel contact editor, and the
//! form shells that validate and submit them. Outbound adapters reach the REST
//! backend through the request client port.

pub mod config;
pub mod domain;
pub mod outbound;

pub use config::ConsoleSettings;
