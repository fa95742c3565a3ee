mod links;

pub use links::{LinksFilter, LinksSettings, count_links};
