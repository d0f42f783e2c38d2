//! Collaborator contracts for the data the engine consumes but does not own.
//!
//! The engine never talks to a backend directly: the host fetches rows through
//! these traits and hands the results to the session, which decides whether
//! the response is still current.

use std::future::Future;

use crate::types::{FilterSet, MetricSample, PicklistScope, SitePoint};

/// Returns the site rows passing the active upstream filters.
///
/// No upper bound on the number of rows is assumed.
pub trait SiteSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch_sites(
        &self,
        filters: &FilterSet,
    ) -> impl Future<Output = Result<Vec<SitePoint>, Self::Error>> + Send;
}

/// Returns the per-day metric history of one site, ordered by date.
pub trait HistorySource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch_history(
        &self,
        site_id: &str,
        days: u32,
    ) -> impl Future<Output = Result<Vec<MetricSample>, Self::Error>> + Send;
}

/// Returns the distinct values for one level of the administrative cascade,
/// scoped by the filters already chosen above it.
pub trait PicklistSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn distinct_values(
        &self,
        scope: PicklistScope,
        filters: &FilterSet,
    ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send;
}
