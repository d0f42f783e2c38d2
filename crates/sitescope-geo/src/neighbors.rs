//! Radius search around a focal site.
//!
//! A linear scan is enough for the working-set sizes the dashboards handle
//! (hundreds to low thousands of sites).

use serde::Serialize;
use sitescope_core::SitePoint;

use crate::distance::distance_km;

pub const DEFAULT_RADIUS_KM: f64 = 5.0;
pub const DEFAULT_NEIGHBOR_CAP: usize = 2000;

/// A site within the search radius and its distance from the focal site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub site: SitePoint,
    pub distance_km: f64,
}

/// Sites near a focal site, ascending by distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborResult {
    pub focal_id: String,
    pub neighbors: Vec<Neighbor>,
    pub radius_km: f64,
    /// Rendering cap applied to `neighbors`; not a correctness bound.
    pub cap: Option<usize>,
}

impl NeighborResult {
    #[must_use]
    pub fn empty(focal_id: impl Into<String>, radius_km: f64, cap: Option<usize>) -> Self {
        Self {
            focal_id: focal_id.into(),
            neighbors: Vec::new(),
            radius_km,
            cap,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.neighbors.iter().any(|n| n.site.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.neighbors.iter().map(|n| n.site.id.as_str())
    }
}

/// Radius and cap for a neighbour search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborOptions {
    pub radius_km: f64,
    pub cap: Option<usize>,
}

impl Default for NeighborOptions {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            cap: Some(DEFAULT_NEIGHBOR_CAP),
        }
    }
}

/// Find every site in `dataset` within `options.radius_km` of `focal`.
///
/// The focal id itself and sites without a coordinate are skipped. A focal
/// site without a coordinate yields an empty result. When the cap truncates,
/// the closest sites are kept.
#[must_use]
pub fn find_neighbors(
    focal: &SitePoint,
    dataset: &[SitePoint],
    options: NeighborOptions,
) -> NeighborResult {
    let mut result = NeighborResult::empty(focal.id.clone(), options.radius_km, options.cap);

    let Some(origin) = focal.coordinate() else {
        tracing::debug!(site_id = %focal.id, "focal site has no coordinate; no neighbours");
        return result;
    };

    let mut neighbors: Vec<Neighbor> = dataset
        .iter()
        .filter(|s| s.id != focal.id)
        .filter_map(|s| {
            let coord = s.coordinate()?;
            let d = distance_km(origin, coord);
            (d <= options.radius_km).then(|| Neighbor {
                site: s.clone(),
                distance_km: d,
            })
        })
        .collect();

    neighbors.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    if let Some(cap) = options.cap {
        neighbors.truncate(cap);
    }

    tracing::debug!(
        site_id = %focal.id,
        radius_km = options.radius_km,
        found = neighbors.len(),
        "neighbour search complete"
    );
    result.neighbors = neighbors;
    result
}
