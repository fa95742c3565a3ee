pub mod message_history;

pub use message_history::{HistoryConfig, MessageHistory};
