// File: src/cache/message_history.rs

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use modbot_common::models::{ChatMessage, Event, FilterContext};
use tracing::trace;
use twilight_model::id::Id;
use twilight_model::id::marker::ChannelMarker;

/// Limits applied to each channel's buffer whenever a message is pushed.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    pub max_age_seconds: Option<u32>,
    pub max_per_channel: Option<usize>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_age_seconds: Some(600),
            max_per_channel: Some(1000),
        }
    }
}

/// Recent messages per channel, newest first.
///
/// Antispam filters rely on the newest-first order and stop scanning at the
/// first message outside their window, so late arrivals are inserted at
/// their sorted position rather than at the front.
pub struct MessageHistory {
    channels: DashMap<Id<ChannelMarker>, VecDeque<ChatMessage>>,
    config: HistoryConfig,
}

impl MessageHistory {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            channels: DashMap::new(),
            config,
        }
    }

    pub fn push(&self, msg: ChatMessage) {
        self.push_at(msg, Utc::now());
    }

    /// Insert or update a message, trimming the channel relative to `now`.
    pub fn push_at(&self, msg: ChatMessage, now: DateTime<Utc>) {
        let mut bucket = self.channels.entry(msg.channel_id).or_default();

        if let Some(existing) = bucket.iter_mut().find(|m| m.id == msg.id) {
            // Edits keep their original position.
            existing.content = msg.content;
        } else {
            let pos = bucket
                .iter()
                .position(|m| m.created_at <= msg.created_at)
                .unwrap_or(bucket.len());
            bucket.insert(pos, msg);
        }

        let cutoff = self
            .config
            .max_age_seconds
            .and_then(|max_age| Duration::try_seconds(i64::from(max_age)))
            .and_then(|max_age| now.checked_sub_signed(max_age));
        if let Some(cutoff) = cutoff {
            while bucket.back().is_some_and(|m| m.created_at < cutoff) {
                bucket.pop_back();
            }
        }
        if let Some(max) = self.config.max_per_channel {
            bucket.truncate(max);
        }

        trace!("MessageHistory: {} messages buffered for channel", bucket.len());
    }

    /// The channel's buffered messages, newest first.
    pub fn recent(&self, channel_id: Id<ChannelMarker>) -> Vec<ChatMessage> {
        self.channels
            .get(&channel_id)
            .map(|bucket| bucket.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Build a filtering context for `msg`'s author from its channel's history.
    pub fn context_for(&self, event: Event, msg: &ChatMessage) -> FilterContext {
        FilterContext::new(event, msg.author, self.recent(msg.channel_id))
    }

    pub fn len(&self, channel_id: Id<ChannelMarker>) -> usize {
        self.channels.get(&channel_id).map(|b| b.len()).unwrap_or(0)
    }

    /// Drop a channel's buffer. Returns how many messages it held.
    pub fn clear_channel(&self, channel_id: Id<ChannelMarker>) -> usize {
        self.channels
            .remove(&channel_id)
            .map(|(_, bucket)| bucket.len())
            .unwrap_or(0)
    }
}

impl Default for MessageHistory {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}
