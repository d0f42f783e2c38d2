use crate::app_config::{EngineConfig, ZoomStrategyKind};
use crate::types::Coordinate;
use crate::ConfigError;

/// Load engine configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_engine_config() -> Result<EngineConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_engine_config_from_env()
}

/// Load engine configuration from environment variables already in the process.
///
/// Unlike [`load_engine_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_engine_config_from_env() -> Result<EngineConfig, ConfigError> {
    build_engine_config(|key| std::env::var(key))
}

/// Build engine configuration using the provided env-var lookup function.
///
/// Every variable is optional; unset variables take the defaults of
/// [`EngineConfig::default`].
fn build_engine_config<F>(lookup: F) -> Result<EngineConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = EngineConfig::default();

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_f64 = |var: &str, default: f64| -> Result<f64, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|e| invalid(var, e.to_string()))
                .and_then(|v| {
                    if v.is_finite() {
                        Ok(v)
                    } else {
                        Err(invalid(var, "must be finite".to_string()))
                    }
                }),
        }
    };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| invalid(var, e.to_string())),
        }
    };

    let log_level = lookup("SITESCOPE_LOG_LEVEL").unwrap_or(defaults.log_level);

    let neighbor_radius_km =
        parse_f64("SITESCOPE_NEIGHBOR_RADIUS_KM", defaults.neighbor_radius_km)?;
    if neighbor_radius_km < 0.0 {
        return Err(invalid(
            "SITESCOPE_NEIGHBOR_RADIUS_KM",
            "must not be negative".to_string(),
        ));
    }

    // 0 disables the cap.
    let neighbor_cap = match lookup("SITESCOPE_NEIGHBOR_CAP") {
        Err(_) => defaults.neighbor_cap,
        Ok(raw) => {
            let cap = raw
                .trim()
                .parse::<usize>()
                .map_err(|e| invalid("SITESCOPE_NEIGHBOR_CAP", e.to_string()))?;
            (cap > 0).then_some(cap)
        }
    };

    let history_days = u32::try_from(parse_u64(
        "SITESCOPE_HISTORY_DAYS",
        u64::from(defaults.history_days),
    )?)
    .map_err(|e| invalid("SITESCOPE_HISTORY_DAYS", e.to_string()))?;

    let fallback_lat = parse_f64("SITESCOPE_FALLBACK_LAT", defaults.fallback_center.lat)?;
    let fallback_lon = parse_f64("SITESCOPE_FALLBACK_LON", defaults.fallback_center.lon)?;
    let fallback_center = Coordinate::checked(fallback_lat, fallback_lon).ok_or_else(|| {
        invalid(
            "SITESCOPE_FALLBACK_LAT",
            format!("({fallback_lat}, {fallback_lon}) is not a valid coordinate"),
        )
    })?;

    let zoom_strategy = match lookup("SITESCOPE_ZOOM_STRATEGY") {
        Err(_) => defaults.zoom_strategy,
        Ok(raw) => parse_zoom_strategy(&raw)?,
    };

    let source_url = lookup("SITESCOPE_SOURCE_URL")
        .ok()
        .filter(|s| !s.trim().is_empty());
    let source_timeout_secs =
        parse_u64("SITESCOPE_SOURCE_TIMEOUT_SECS", defaults.source_timeout_secs)?;

    Ok(EngineConfig {
        log_level,
        neighbor_radius_km,
        neighbor_cap,
        history_days,
        fallback_center,
        zoom_strategy,
        source_url,
        source_timeout_secs,
    })
}

/// Parse a string into a `ZoomStrategyKind` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
pub fn parse_zoom_strategy(s: &str) -> Result<ZoomStrategyKind, ConfigError> {
    match s.trim() {
        "point-count" => Ok(ZoomStrategyKind::PointCount),
        "fit-bounds" => Ok(ZoomStrategyKind::FitBounds),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SITESCOPE_ZOOM_STRATEGY".to_string(),
            reason: format!("unknown zoom strategy '{other}'; expected point-count or fit-bounds"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
