use modbot_common::models::{FilterContext, FilterKey};
use tracing::{debug, error, info};

use crate::Error;
use crate::filtering::UniqueFilter;

/// Runs every unique filter registered for an event against one context.
///
/// Filters run one after another and each gets the context by exclusive
/// reference, so the evidence fields never see concurrent writers.
pub struct FilterRunner {
    filters: Vec<Box<dyn UniqueFilter>>,
}

impl FilterRunner {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    pub fn add_filter(mut self, filter: Box<dyn UniqueFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Returns the keys of the filters that triggered, in registration order.
    ///
    /// A filter that fails is logged and treated as not triggered.
    pub async fn run(&self, ctx: &mut FilterContext) -> Result<Vec<FilterKey>, Error> {
        debug!(
            "FilterRunner: {:?} event for {} with {} filters",
            ctx.event,
            ctx.author,
            self.filters.len()
        );

        let mut triggered = Vec::new();
        for filter in &self.filters {
            if !filter.handles(ctx.event) {
                debug!("FilterRunner: {} does not handle {:?}, skipping", filter.key(), ctx.event);
                continue;
            }

            match filter.triggered_on(ctx).await {
                Ok(true) => {
                    info!("FilterRunner: {} triggered for {}", filter.key(), ctx.author);
                    triggered.push(filter.key());
                }
                Ok(false) => {
                    debug!("FilterRunner: {} did not trigger", filter.key());
                }
                Err(e) => {
                    error!("FilterRunner: {} failed: {:?}", filter.key(), e);
                }
            }
        }

        Ok(triggered)
    }
}

impl Default for FilterRunner {
    fn default() -> Self {
        Self::new()
    }
}
