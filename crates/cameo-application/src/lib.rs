//! Application services for Cameo: the persona discovery deck and the chat
//! session, orchestrated over the traits defined in `cameo-core`.

pub mod chat;
pub mod deck;

pub use chat::ChatSession;
pub use deck::{DEFAULT_LOOKAHEAD, DiscoveryDeck};
