//! modbot-server/src/replay.rs
//!
//! Feeds a recorded message dump through the same history buffer and filter
//! runner the live bot uses.

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use tracing::debug;
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

use modbot_common::models::{ChatMessage, Event, FilterKey};
use modbot_core::cache::{HistoryConfig, MessageHistory};
use modbot_core::filtering::{FilterRunner, LinksFilter, LinksSettings, UniqueFilter};

pub struct ReplayOptions {
    pub messages: Vec<ChatMessage>,
    pub author: Id<UserMarker>,
    pub settings: serde_json::Value,
    /// Instant the dump should be treated as live at.
    pub now: Option<DateTime<Utc>>,
    pub history: HistoryConfig,
}

#[derive(Debug)]
pub struct ReplayOutcome {
    pub triggered: Vec<FilterKey>,
    pub filter_info: Vec<(FilterKey, String)>,
    /// Newest first.
    pub related_messages: Vec<ChatMessage>,
}

pub async fn replay(options: ReplayOptions) -> anyhow::Result<ReplayOutcome> {
    let ReplayOptions {
        mut messages,
        author,
        settings,
        now,
        history,
    } = options;

    // Shift the dump so that `now` lines up with the wall clock.
    if let Some(now) = now {
        let offset = Utc::now() - now;
        for msg in &mut messages {
            msg.created_at += offset;
        }
    }

    let latest = messages
        .iter()
        .filter(|m| m.author == author)
        .max_by_key(|m| m.created_at)
        .cloned()
        .ok_or_else(|| anyhow!("no messages from {} in the dump", author))?;

    let history = MessageHistory::new(history);
    for msg in messages {
        history.push(msg);
    }

    let mut filter = LinksFilter::new(0, LinksSettings::default());
    filter
        .configure(settings)
        .context("applying links filter settings")?;
    debug!("replay: using {}", filter);
    let runner = FilterRunner::new().add_filter(Box::new(filter));

    let mut ctx = history.context_for(Event::Message, &latest);
    let triggered = runner.run(&mut ctx).await?;

    let mut filter_info: Vec<_> = ctx.filter_info.into_iter().collect();
    filter_info.sort_by(|a, b| a.0.id.cmp(&b.0.id));
    let mut related_messages: Vec<_> = ctx.related_messages.into_iter().collect();
    related_messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(ReplayOutcome {
        triggered,
        filter_info,
        related_messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2023-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn msg(id: u64, author: u64, secs_before: i64, content: &str) -> ChatMessage {
        ChatMessage::new(
            Id::new(id),
            Id::new(1),
            Id::new(author),
            at() - Duration::seconds(secs_before),
            content,
        )
    }

    fn options(messages: Vec<ChatMessage>, settings: serde_json::Value) -> ReplayOptions {
        ReplayOptions {
            messages,
            author: Id::new(10),
            settings,
            now: Some(at()),
            history: HistoryConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_replay_old_dump_as_live() {
        let messages = vec![
            msg(1, 10, 3, "https://a.example https://b.example"),
            msg(2, 10, 2, "https://c.example"),
            msg(3, 11, 1, "https://d.example https://e.example"),
        ];

        let outcome = replay(options(messages, json!({"threshold": 2}))).await.unwrap();

        assert_eq!(outcome.triggered, vec![FilterKey::new(0, "links")]);
        assert_eq!(outcome.filter_info[0].1, "sent 3 links");
        let ids: Vec<u64> = outcome.related_messages.iter().map(|m| m.id.get()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_replay_without_rebase_sees_nothing_recent() {
        let messages = vec![
            msg(1, 10, 3, "https://a.example https://b.example"),
            msg(2, 10, 2, "https://c.example"),
        ];
        let mut opts = options(messages, json!({"threshold": 2}));
        opts.now = None;

        let outcome = replay(opts).await.unwrap();
        assert!(outcome.triggered.is_empty());
    }

    #[tokio::test]
    async fn test_replay_errors() {
        let messages = vec![msg(1, 11, 1, "https://a.example")];
        assert!(replay(options(messages.clone(), json!({}))).await.is_err());

        let messages = vec![msg(1, 10, 1, "https://a.example")];
        assert!(replay(options(messages, json!({"interval": 0}))).await.is_err());
    }
}
