pub mod commands;
pub mod exchange;
pub mod format;
pub mod models;
pub mod quota;
pub mod store;

pub use exchange::{ExchangeError, exchange, handle_text, handle_voice};
pub use models::{ConversationState, Transcript};
pub use store::{MemoryStore, SessionStore, SqliteStore};
