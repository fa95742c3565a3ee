pub mod filter;
pub mod settings;
pub mod filters;
pub mod runner;

pub use filter::UniqueFilter;
pub use settings::{ExtraSettings, explicit_fields, parse_settings, validate_settings};
pub use filters::{LinksFilter, LinksSettings};
pub use runner::FilterRunner;
