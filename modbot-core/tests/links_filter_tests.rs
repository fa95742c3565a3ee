// tests/links_filter_tests.rs

use chrono::{Duration, Utc};
use serde_json::json;
use twilight_model::id::Id;

use modbot_core::Error;
use modbot_core::cache::{HistoryConfig, MessageHistory};
use modbot_core::filtering::{
    FilterRunner, LinksFilter, LinksSettings, UniqueFilter, validate_settings,
};
use modbot_core::models::{ChatMessage, Event, FilterKey, FilterRecord};

const CHANNEL: u64 = 900;
const SPAMMER: u64 = 1001;
const BYSTANDER: u64 = 1002;

fn message(id: u64, author: u64, secs_ago: i64, content: &str) -> ChatMessage {
    ChatMessage::new(
        Id::new(id),
        Id::new(CHANNEL),
        Id::new(author),
        Utc::now() - Duration::seconds(secs_ago),
        content,
    )
}

fn links_record(settings: serde_json::Value) -> FilterRecord {
    FilterRecord {
        id: 17,
        content: "links".to_string(),
        description: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        additional_settings: settings,
    }
}

#[tokio::test]
async fn test_link_burst_through_history_and_runner() -> Result<(), Error> {
    let history = MessageHistory::new(HistoryConfig::default());
    history.push(message(1, BYSTANDER, 6, "https://a.example https://b.example"));
    history.push(message(2, SPAMMER, 5, "https://1.example https://2.example https://3.example"));
    history.push(message(3, SPAMMER, 4, "free stuff https://4.example https://5.example"));
    let latest = message(4, SPAMMER, 3, "https://6.example");
    history.push(latest.clone());

    let filter = LinksFilter::from_record(&links_record(json!({"threshold": 5})))?;
    let runner = FilterRunner::new().add_filter(Box::new(filter));

    let mut ctx = history.context_for(Event::Message, &latest);
    let triggered = runner.run(&mut ctx).await?;

    let key = FilterKey::new(17, "links");
    assert_eq!(triggered, vec![key.clone()]);
    assert_eq!(ctx.filter_info[&key], "sent 6 links");
    assert_eq!(ctx.related_messages.len(), 3);
    assert!(ctx.related_messages.iter().all(|m| m.author == Id::new(SPAMMER)));
    Ok(())
}

#[tokio::test]
async fn test_quiet_author_is_left_alone() -> Result<(), Error> {
    let history = MessageHistory::default();
    history.push(message(1, BYSTANDER, 3, "https://a.example"));
    let latest = message(2, SPAMMER, 1, "https://only-one.example");
    history.push(latest.clone());

    let runner =
        FilterRunner::new().add_filter(Box::new(LinksFilter::new(1, LinksSettings::default())));
    let mut ctx = history.context_for(Event::Message, &latest);

    assert!(runner.run(&mut ctx).await?.is_empty());
    assert!(!ctx.has_triggers());
    assert!(ctx.related_messages.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_links_filter_ignores_edits() -> Result<(), Error> {
    let history = MessageHistory::default();
    for id in 1..=3 {
        history.push(message(id, SPAMMER, 1, &"https://x.example ".repeat(5)));
    }
    let latest = message(3, SPAMMER, 1, &"https://x.example ".repeat(5));

    let runner =
        FilterRunner::new().add_filter(Box::new(LinksFilter::new(1, LinksSettings::default())));

    let mut edit_ctx = history.context_for(Event::MessageEdit, &latest);
    assert!(runner.run(&mut edit_ctx).await?.is_empty());

    let mut message_ctx = history.context_for(Event::Message, &latest);
    assert_eq!(runner.run(&mut message_ctx).await?.len(), 1);
    assert_eq!(message_ctx.filter_info[&FilterKey::new(1, "links")], "sent 15 links");
    Ok(())
}

#[test]
fn test_settings_validation() {
    assert!(validate_settings::<LinksSettings>(&json!({})).is_ok());
    assert!(validate_settings::<LinksSettings>(&json!(null)).is_ok());
    assert!(validate_settings::<LinksSettings>(&json!({"interval": 60, "threshold": 0})).is_ok());

    let err = validate_settings::<LinksSettings>(&json!({"threshold": "many"})).unwrap_err();
    assert!(err.contains("threshold"), "unexpected error: {}", err);

    let err = validate_settings::<LinksSettings>(&json!({"interval": 0})).unwrap_err();
    assert!(err.contains("interval"), "unexpected error: {}", err);

    match LinksFilter::from_record(&links_record(json!({"interval": -5}))) {
        Err(Error::InvalidSettings(_)) => {}
        Err(other) => panic!("wrong error: {:?}", other),
        Ok(_) => panic!("negative interval must be rejected"),
    }
}

#[test]
fn test_record_overrides() -> Result<(), Error> {
    let filter = LinksFilter::from_record(&links_record(json!({"interval": 20})))?;
    let overrides = filter.overrides();

    assert_eq!(overrides.len(), 1);
    assert_eq!(overrides["interval"], json!(20));
    assert_eq!(filter.name(), "links");
    assert_eq!(filter.events(), &[Event::Message]);
    Ok(())
}
