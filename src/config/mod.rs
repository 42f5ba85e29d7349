mod dto;
mod loader;

pub use dto::{AppConfig, CacheTtlConfig, SourceConfig};
pub use loader::{MAX_LOOKBACK_HOURS, MAX_TOPICS_CAP, load_config, load_config_from};
