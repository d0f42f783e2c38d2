pub mod app_config;
pub mod config;
pub mod error;
pub mod source;
pub mod types;

pub use app_config::{EngineConfig, ZoomStrategyKind};
pub use config::{load_engine_config, load_engine_config_from_env, parse_zoom_strategy};
pub use error::ConfigError;
pub use source::{HistorySource, PicklistSource, SiteSource};
pub use types::{
    Coordinate, FilterSet, MetricSample, PicklistScope, SiteAttributes, SitePoint,
};
