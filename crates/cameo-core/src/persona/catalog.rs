//! Persona catalog trait.
//!
//! Defines the interface the discovery deck consumes personas through.

use super::model::{ImageData, PersonaPage};
use crate::error::Result;

/// An abstract view of the persona catalog backend.
///
/// This trait decouples the discovery deck from the concrete transport
/// (HTTP client in production, scripted doubles in tests). Implementations
/// are stateless between invocations: a failed call leaves nothing behind,
/// and the caller decides whether and when to retry.
#[async_trait::async_trait]
pub trait PersonaCatalog: Send + Sync {
    /// Fetches one page of persona summaries.
    ///
    /// # Arguments
    ///
    /// * `cursor` - Opaque continuation token from the previous page, or
    ///   `None` for the start of the feed. Passed through verbatim.
    /// * `limit` - Upper bound on the page size (> 0). The backend may
    ///   return fewer items, never more.
    ///
    /// # Returns
    ///
    /// - `Ok(PersonaPage)`: items in backend order plus the next cursor
    ///   (`None` once the feed is exhausted)
    /// - `Err(CameoError)`: transport failure, non-success status, or a
    ///   payload that did not deserialize
    async fn fetch_page(&self, cursor: Option<&str>, limit: u32) -> Result<PersonaPage>;

    /// Fetches the portrait image for one persona.
    ///
    /// An absent or undecodable payload is an error here; the enrichment
    /// joiner degrades it to "unavailable".
    async fn fetch_image(&self, id: &str) -> Result<ImageData>;

    /// Fetches the profile description for one persona.
    async fn fetch_description(&self, id: &str) -> Result<String>;
}
