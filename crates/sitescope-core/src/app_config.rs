use crate::error::ConfigError;
use crate::types::Coordinate;

/// How the viewport framer picks a zoom level for a point set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomStrategyKind {
    /// Discrete buckets by point count.
    PointCount,
    /// Largest zoom whose span contains the bounding box of the points.
    FitBounds,
}

impl std::fmt::Display for ZoomStrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoomStrategyKind::PointCount => write!(f, "point-count"),
            ZoomStrategyKind::FitBounds => write!(f, "fit-bounds"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub log_level: String,
    pub neighbor_radius_km: f64,
    /// Rendering cap on neighbour results; `None` means uncapped.
    pub neighbor_cap: Option<usize>,
    pub history_days: u32,
    /// Center used when no point in the working set has a coordinate.
    pub fallback_center: Coordinate,
    pub zoom_strategy: ZoomStrategyKind,
    pub source_url: Option<String>,
    pub source_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            neighbor_radius_km: 5.0,
            neighbor_cap: Some(2000),
            history_days: 30,
            fallback_center: Coordinate::new(23.8103, 90.4125),
            zoom_strategy: ZoomStrategyKind::PointCount,
            source_url: None,
            source_timeout_secs: 30,
        }
    }
}

impl EngineConfig {
    /// The backend URL, for commands that cannot run without one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `SITESCOPE_SOURCE_URL` is
    /// unset or blank.
    pub fn require_source_url(&self) -> Result<&str, ConfigError> {
        self.source_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("SITESCOPE_SOURCE_URL".to_string()))
    }
}
