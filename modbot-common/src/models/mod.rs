// File: modbot-common/src/models/mod.rs
pub mod message;
pub mod filter_context;
pub mod filter;

pub use message::ChatMessage;
pub use filter_context::{Event, FilterContext, FilterKey};
pub use filter::FilterRecord;
