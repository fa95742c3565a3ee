use async_trait::async_trait;
use modbot_common::models::{Event, FilterContext, FilterKey};

use crate::Error;

/// A filter that runs at most once per filtering pass.
///
/// Unlike list filters (domains, tokens) which are matched many times against
/// the same message, a unique filter looks at the whole context on its own:
/// antispam rules, webhook detection and the like.
#[async_trait]
pub trait UniqueFilter: Send + Sync {
    /// Identifies this instance in `FilterContext::filter_info`.
    fn key(&self) -> FilterKey;

    /// Name of the filter type, unique across filter types.
    fn name(&self) -> &str;

    /// Events this filter should be run for.
    fn events(&self) -> &[Event];

    /// Re-apply extra settings from JSON.
    fn configure(&mut self, _settings: serde_json::Value) -> Result<(), Error> {
        Ok(())
    }

    /// Extra settings explicitly set on this instance.
    fn overrides(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::new()
    }

    fn handles(&self, event: Event) -> bool {
        self.events().contains(&event)
    }

    /// Search for the filter's pattern within the context.
    ///
    /// Implementations may only add to `ctx.related_messages` and
    /// `ctx.filter_info`, and only when returning `Ok(true)`.
    async fn triggered_on(&self, ctx: &mut FilterContext) -> Result<bool, Error>;
}
