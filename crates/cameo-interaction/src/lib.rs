//! HTTP interaction layer for Cameo.
//!
//! Implements the `cameo-core` catalog and chat traits against the persona
//! backend's REST endpoints.

pub mod api_client;

pub use api_client::PersonaApiClient;
