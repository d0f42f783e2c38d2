//! Command handlers. Each builds a serializable report; `main` prints it.

use serde::Serialize;
use sitescope_core::{
    EngineConfig, HistorySource, MetricSample, PicklistScope, PicklistSource, SitePoint,
    SiteSource,
};
use sitescope_geo::{
    InMemorySurface, MapSession, RenderedMarker, SearchQuery, SessionOptions, ViewportFrame,
};
use sitescope_source::{FileSiteSource, HttpSiteSource};

use crate::SourceArgs;

#[derive(Debug, Serialize)]
pub(crate) struct SiteRow {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl SiteRow {
    fn from_site(site: &SitePoint) -> Self {
        Self {
            id: site.id.clone(),
            name: site.label().to_string(),
            address: site.attributes.address.clone(),
            distance_km: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NeighborsReport {
    pub focal_id: String,
    pub radius_km: f64,
    pub cap: Option<usize>,
    pub neighbors: Vec<SiteRow>,
    pub frame: Option<ViewportFrame>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchReport {
    pub total: usize,
    pub matched: usize,
    pub mapped: usize,
    pub sites: Vec<SiteRow>,
    pub frame: Option<ViewportFrame>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FrameReport {
    pub total: usize,
    pub mapped: usize,
    pub strategy: String,
    pub frame: ViewportFrame,
    pub markers: Vec<RenderedMarker>,
}

#[derive(Debug, Serialize)]
pub(crate) struct HistoryReport {
    pub site_id: String,
    pub days: u32,
    pub samples: Vec<MetricSample>,
}

fn session_for(rows: Vec<SitePoint>, config: &EngineConfig) -> MapSession<InMemorySurface> {
    let mut session = MapSession::new(InMemorySurface::new(), SessionOptions::from_config(config));
    session.set_working_set(rows);
    session
}

fn http_source(config: &EngineConfig) -> anyhow::Result<HttpSiteSource> {
    let url = config.require_source_url()?;
    Ok(HttpSiteSource::new(url, config.source_timeout_secs)?)
}

/// Read site rows from `--file`, or from the backend when no file is given.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded, no backend is configured,
/// or the backend request fails.
pub(crate) async fn load_sites(
    source: &SourceArgs,
    config: &EngineConfig,
) -> anyhow::Result<Vec<SitePoint>> {
    let filters = source.filters();
    let rows = match &source.file {
        Some(path) => FileSiteSource::load(path)?.fetch_sites(&filters).await?,
        None => http_source(config)?.fetch_sites(&filters).await?,
    };
    tracing::debug!(rows = rows.len(), "site rows loaded");
    Ok(rows)
}

/// Select `site_id` and report its neighbours.
///
/// # Errors
///
/// Returns an error if `site_id` is not in `rows`.
pub(crate) fn neighbors_report(
    rows: Vec<SitePoint>,
    site_id: &str,
    config: &EngineConfig,
) -> anyhow::Result<NeighborsReport> {
    let mut session = session_for(rows, config);
    session.select(Some(site_id));
    let Some(result) = session.selection().neighbors() else {
        anyhow::bail!("site {site_id} is not in the site list");
    };

    let neighbors = result
        .neighbors
        .iter()
        .map(|n| SiteRow {
            distance_km: Some(n.distance_km),
            ..SiteRow::from_site(&n.site)
        })
        .collect();
    Ok(NeighborsReport {
        focal_id: result.focal_id.clone(),
        radius_km: result.radius_km,
        cap: result.cap,
        neighbors,
        frame: session.framer().current(),
    })
}

/// Narrow the rows by free text and frame the matches.
pub(crate) fn search_report(
    rows: Vec<SitePoint>,
    query: SearchQuery,
    config: &EngineConfig,
) -> SearchReport {
    let total = rows.len();
    let mut session = session_for(rows, config);
    session.set_search_query(query);

    SearchReport {
        total,
        matched: session.working_set().len(),
        mapped: session.markers().len(),
        sites: session.working_set().iter().map(SiteRow::from_site).collect(),
        frame: session.framer().current(),
    }
}

/// Frame the whole site list and report what a map would render.
pub(crate) fn frame_report(rows: Vec<SitePoint>, config: &EngineConfig) -> FrameReport {
    let total = rows.len();
    let session = session_for(rows, config);
    let frame = session
        .framer()
        .current()
        .unwrap_or_else(|| session.framer().frame_for(session.working_set()));

    FrameReport {
        total,
        mapped: session.markers().len(),
        strategy: config.zoom_strategy.to_string(),
        frame,
        markers: session
            .surface()
            .markers()
            .into_values()
            .cloned()
            .collect(),
    }
}

/// Distinct values for `scope`, from `--file` or the backend.
///
/// # Errors
///
/// Returns an error if the rows cannot be loaded or the backend fails.
pub(crate) async fn picklist(
    source: &SourceArgs,
    scope: PicklistScope,
    config: &EngineConfig,
) -> anyhow::Result<Vec<String>> {
    let filters = source.filters();
    let values = match &source.file {
        Some(path) => {
            FileSiteSource::load(path)?
                .distinct_values(scope, &filters)
                .await?
        }
        None => http_source(config)?.distinct_values(scope, &filters).await?,
    };
    Ok(values)
}

/// Fetch metric history for one site from the backend.
///
/// # Errors
///
/// Returns an error if no backend is configured or the request fails.
pub(crate) async fn history_report(
    site_id: &str,
    days: u32,
    config: &EngineConfig,
) -> anyhow::Result<HistoryReport> {
    let samples = http_source(config)?.fetch_history(site_id, days).await?;
    Ok(HistoryReport {
        site_id: site_id.to_string(),
        days,
        samples,
    })
}
