use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

use crate::models::message::ChatMessage;

/// The kind of gateway event a filtering pass was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Message,
    MessageEdit,
    Nickname,
    ThreadName,
}

/// Identifies one filter instance inside `FilterContext::filter_info`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterKey {
    pub id: i64,
    pub name: String,
}

impl FilterKey {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

/// State shared by every filter during one filtering pass.
///
/// `content` is the author's recent history, newest message first. Filters
/// only ever append to `related_messages` and `filter_info`; the dispatcher
/// owns the context and hands it to one filter at a time.
#[derive(Debug, Clone)]
pub struct FilterContext {
    pub event: Event,
    pub author: Id<UserMarker>,
    pub content: Vec<ChatMessage>,
    pub related_messages: HashSet<ChatMessage>,
    pub filter_info: HashMap<FilterKey, String>,
}

impl FilterContext {
    pub fn new(event: Event, author: Id<UserMarker>, content: Vec<ChatMessage>) -> Self {
        Self {
            event,
            author,
            content,
            related_messages: HashSet::new(),
            filter_info: HashMap::new(),
        }
    }

    /// True once any filter has recorded a trigger explanation.
    pub fn has_triggers(&self) -> bool {
        !self.filter_info.is_empty()
    }
}
