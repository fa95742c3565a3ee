use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use modbot_common::models::{ChatMessage, Event, FilterContext, FilterKey, FilterRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::Error;
use crate::filtering::UniqueFilter;
use crate::filtering::settings::{ExtraSettings, explicit_fields, parse_settings};

/// Anything from a scheme up to the next whitespace counts as one link.
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("link pattern must compile"));

const EVENTS: &[Event] = &[Event::Message];

/// Number of links in a message body.
pub fn count_links(text: &str) -> usize {
    LINK_RE.find_iter(text).count()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinksSettings {
    /// Look for rule violations in messages from the last `interval` seconds.
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Maximum number of links before the filter is triggered.
    #[serde(default = "default_threshold")]
    pub threshold: u32,
}

fn default_interval() -> u32 {
    10
}

fn default_threshold() -> u32 {
    10
}

impl Default for LinksSettings {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            threshold: default_threshold(),
        }
    }
}

impl ExtraSettings for LinksSettings {
    fn validate(&self) -> Result<(), String> {
        if self.interval == 0 {
            return Err("interval must be at least one second".to_string());
        }
        Ok(())
    }
}

/// Detects too many links sent by a single user across several messages.
///
/// A single message stuffed with links does not trigger this rule; it targets
/// links spread over a burst of messages.
pub struct LinksFilter {
    id: i64,
    content: String,
    description: Option<String>,
    settings: LinksSettings,
    raw_settings: Value,
}

impl LinksFilter {
    pub const NAME: &'static str = "links";

    pub fn new(id: i64, settings: LinksSettings) -> Self {
        Self {
            id,
            content: Self::NAME.to_string(),
            description: None,
            settings,
            raw_settings: Value::Null,
        }
    }

    pub fn from_record(record: &FilterRecord) -> Result<Self, Error> {
        let settings = parse_settings(&record.additional_settings)?;
        Ok(Self {
            id: record.id,
            content: record.content.clone(),
            description: record.description.clone(),
            settings,
            raw_settings: record.additional_settings.clone(),
        })
    }

    pub fn settings(&self) -> &LinksSettings {
        &self.settings
    }

    /// Evaluate the rule as of `now`.
    ///
    /// `ctx.content` must be newest first: the scan stops at the first message
    /// at or before the window boundary, so anything after it is never looked
    /// at, even if it falls inside the window.
    pub fn evaluate_at(&self, ctx: &mut FilterContext, now: DateTime<Utc>) -> bool {
        let earliest_relevant_at = now - Duration::seconds(i64::from(self.settings.interval));
        let author = ctx.author;

        let detected: HashSet<&ChatMessage> = ctx
            .content
            .iter()
            .take_while(|msg| msg.created_at > earliest_relevant_at)
            .filter(|msg| msg.author == author)
            .collect();

        let mut total_links = 0usize;
        let mut messages_with_links = 0usize;
        for msg in &detected {
            let matches = count_links(&msg.content);
            if matches > 0 {
                messages_with_links += 1;
                total_links += matches;
            }
        }

        debug!(
            "LinksFilter {}: author={} detected={} links={} in {} messages",
            self.id,
            author,
            detected.len(),
            total_links,
            messages_with_links
        );

        if total_links > self.settings.threshold as usize && messages_with_links > 1 {
            ctx.related_messages.extend(detected.into_iter().cloned());
            ctx.filter_info.insert(self.key(), format!("sent {} links", total_links));
            info!(
                "LinksFilter {}: triggered for {} ({} links in {} messages)",
                self.id, author, total_links, messages_with_links
            );
            return true;
        }
        false
    }
}

#[async_trait]
impl UniqueFilter for LinksFilter {
    fn key(&self) -> FilterKey {
        FilterKey::new(self.id, Self::NAME)
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn events(&self) -> &[Event] {
        EVENTS
    }

    fn configure(&mut self, settings: Value) -> Result<(), Error> {
        self.settings = parse_settings(&settings)?;
        self.raw_settings = settings;
        Ok(())
    }

    fn overrides(&self) -> serde_json::Map<String, Value> {
        explicit_fields(&self.raw_settings, &self.settings)
    }

    async fn triggered_on(&self, ctx: &mut FilterContext) -> Result<bool, Error> {
        Ok(self.evaluate_at(ctx, Utc::now()))
    }
}

impl fmt::Display for LinksFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. `{}`", self.id, self.content)?;
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            write!(f, " - {}", description)?;
        }
        Ok(())
    }
}
