//! Persona domain models.
//!
//! Represents the chat personas served by the catalog backend. A persona
//! arrives as a lightweight summary from the paginated list endpoint;
//! its portrait and description are fetched separately and joined later.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Serialize};

/// A persona as returned by the paginated catalog listing.
///
/// Immutable once fetched. The `id` is an opaque backend-issued identifier,
/// unique within a session; the client never constructs or inspects it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PersonaSummary {
    /// Opaque backend identifier.
    pub id: String,
    /// Display name of the persona.
    pub name: String,
}

/// One page of catalog results.
///
/// `next_cursor` is the opaque continuation token for the following page;
/// `None` means the feed is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaPage {
    /// Personas in backend order. May hold fewer items than requested.
    pub items: Vec<PersonaSummary>,
    /// Continuation token, passed through verbatim. `None` = end of feed.
    pub next_cursor: Option<String>,
}

/// A persona portrait, validated on receipt.
///
/// The backend ships portraits as base64 PNG data. The payload is decoded
/// once to check well-formedness and record the byte length; the base64
/// form is kept for rendering surfaces that want a data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    base64: String,
    byte_len: usize,
}

impl ImageData {
    /// Validates a base64 payload, returning `None` when it does not decode.
    pub fn from_base64(payload: impl Into<String>) -> Option<Self> {
        let base64 = payload.into();
        let decoded = BASE64_STANDARD.decode(base64.as_bytes()).ok()?;
        Some(Self {
            base64,
            byte_len: decoded.len(),
        })
    }

    /// The raw base64 payload as received.
    pub fn base64(&self) -> &str {
        &self.base64
    }

    /// Decoded size in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

/// Auxiliary per-persona data joined asynchronously into the deck.
///
/// `None` in either field means that field is unavailable: the fetch
/// failed, or the backend omitted it. An entry with both fields `None` is
/// still a published entry — publication marks the fetches as settled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    /// Portrait image, when the image endpoint delivered a decodable payload.
    pub image: Option<ImageData>,
    /// Profile description, when the detail endpoint delivered one.
    pub description: Option<String>,
}

impl Enrichment {
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn has_description(&self) -> bool {
        self.description.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_data_valid_base64() {
        // "cameo" encoded
        let image = ImageData::from_base64("Y2FtZW8=").expect("valid base64");
        assert_eq!(image.byte_len(), 5);
        assert_eq!(image.base64(), "Y2FtZW8=");
    }

    #[test]
    fn test_image_data_rejects_malformed_payload() {
        assert!(ImageData::from_base64("not base64!!").is_none());
    }

    #[test]
    fn test_persona_summary_wire_shape() {
        let summary: PersonaSummary =
            serde_json::from_str(r#"{"id":"p-1","name":"Luna"}"#).expect("deserializes");
        assert_eq!(summary.id, "p-1");
        assert_eq!(summary.name, "Luna");
    }

    #[test]
    fn test_enrichment_partial_fields() {
        let entry = Enrichment {
            image: None,
            description: Some("A night owl.".to_string()),
        };
        assert!(!entry.has_image());
        assert!(entry.has_description());
    }
}
