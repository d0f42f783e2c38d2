//! Domain types shared by the engine, the collaborator adapters, and the CLI.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A finite latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns `Some` when both components are finite and inside the
    /// geographic range.
    #[must_use]
    pub fn checked(lat: f64, lon: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self { lat, lon })
    }
}

/// Descriptive attributes carried by a site record.
///
/// The administrative groupings form the region -> sub-region -> grid ->
/// district cascade used by the picklist collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteAttributes {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub sub_region: Option<String>,
    #[serde(default)]
    pub grid: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    /// Site class, e.g. `"hub"`, `"macro"`, `"indoor"`.
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub franchise: Option<String>,
}

/// A single geo-located network asset record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitePoint {
    pub id: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(flatten)]
    pub attributes: SiteAttributes,
}

impl SitePoint {
    #[must_use]
    pub fn new(id: impl Into<String>, latitude: Option<f64>, longitude: Option<f64>) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            attributes: SiteAttributes::default(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.attributes.name = name.into();
        self
    }

    /// The point's coordinate, or `None` when either component is missing or
    /// invalid. Such points never take part in spatial operations.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinate::checked(lat, lon),
            _ => None,
        }
    }

    #[must_use]
    pub fn has_coordinate(&self) -> bool {
        self.coordinate().is_some()
    }

    /// Display label: the name when present, the id otherwise.
    #[must_use]
    pub fn label(&self) -> &str {
        let name = self.attributes.name.trim();
        if name.is_empty() {
            &self.id
        } else {
            name
        }
    }
}

/// Active upstream filters. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
}

impl FilterSet {
    /// Returns `true` when every set filter equals the site's attribute
    /// (case-insensitive).
    #[must_use]
    pub fn matches(&self, site: &SitePoint) -> bool {
        let attrs = &site.attributes;
        field_matches(self.region.as_deref(), attrs.region.as_deref())
            && field_matches(self.sub_region.as_deref(), attrs.sub_region.as_deref())
            && field_matches(self.grid.as_deref(), attrs.grid.as_deref())
            && field_matches(self.district.as_deref(), attrs.district.as_deref())
            && field_matches(
                self.classification.as_deref(),
                attrs.classification.as_deref(),
            )
    }

    /// Non-empty filters as `(query-param, value)` pairs.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("region", self.region.as_deref()),
            ("sub_region", self.sub_region.as_deref()),
            ("grid", self.grid.as_deref()),
            ("district", self.district.as_deref()),
            ("classification", self.classification.as_deref()),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.filter(|s| !s.trim().is_empty()).map(|v| (k, v)))
        .collect()
    }
}

fn field_matches(filter: Option<&str>, value: Option<&str>) -> bool {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        None => true,
        Some(wanted) => value.is_some_and(|v| v.trim().eq_ignore_ascii_case(wanted)),
    }
}

/// One level of the administrative picklist cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PicklistScope {
    Region,
    SubRegion,
    Grid,
    District,
}

impl PicklistScope {
    /// Attribute value for this scope on the given site.
    #[must_use]
    pub fn value_of<'a>(&self, site: &'a SitePoint) -> Option<&'a str> {
        let attrs = &site.attributes;
        match self {
            PicklistScope::Region => attrs.region.as_deref(),
            PicklistScope::SubRegion => attrs.sub_region.as_deref(),
            PicklistScope::Grid => attrs.grid.as_deref(),
            PicklistScope::District => attrs.district.as_deref(),
        }
    }

    /// Keep only the filters chosen above this level, so a picklist is never
    /// narrowed by its own current value or by anything below it.
    #[must_use]
    pub fn parent_filters(&self, filters: &FilterSet) -> FilterSet {
        let depth = match self {
            PicklistScope::Region => 0,
            PicklistScope::SubRegion => 1,
            PicklistScope::Grid => 2,
            PicklistScope::District => 3,
        };
        FilterSet {
            region: filters.region.clone().filter(|_| depth > 0),
            sub_region: filters.sub_region.clone().filter(|_| depth > 1),
            grid: filters.grid.clone().filter(|_| depth > 2),
            district: None,
            classification: filters.classification.clone(),
        }
    }
}

impl std::fmt::Display for PicklistScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PicklistScope::Region => write!(f, "region"),
            PicklistScope::SubRegion => write!(f, "sub_region"),
            PicklistScope::Grid => write!(f, "grid"),
            PicklistScope::District => write!(f, "district"),
        }
    }
}

/// A dated metric value for one site, e.g. daily 4G availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub date: NaiveDate,
    /// Technology or metric family (`"2g"`, `"3g"`, `"4g"`, `"fuel"`, ...).
    pub technology: String,
    pub value: Option<f64>,
}
