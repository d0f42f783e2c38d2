//! HTTP client for a JSON site-reporting backend.
//!
//! Endpoints, relative to the base URL:
//!
//! - `GET sites?region=..&grid=..` returns an array of site records.
//! - `GET sites/{id}/history?days=N` returns an array of metric samples.
//! - `GET picklists/{scope}?region=..` returns an array of strings.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use sitescope_core::{
    FilterSet, HistorySource, MetricSample, PicklistScope, PicklistSource, SitePoint, SiteSource,
};

use crate::error::SourceError;

/// Client for the site-reporting REST backend.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpSiteSource {
    client: Client,
    base_url: Url,
}

impl HttpSiteSource {
    /// Creates a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SourceError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute URL with a path.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("sitescope/0.1")
            .build()?;

        // Exactly one trailing slash, so relative joins append to the path.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| SourceError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(SourceError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sites passing `filters`.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Http`] on network failure.
    /// - [`SourceError::UnexpectedStatus`] on a non-2xx status.
    /// - [`SourceError::Deserialize`] if the body is not an array of sites.
    pub async fn sites(&self, filters: &FilterSet) -> Result<Vec<SitePoint>, SourceError> {
        let url = self.build_url(&["sites"], &filters.query_pairs())?;
        let sites: Vec<SitePoint> = self.get_json(&url).await?;
        tracing::debug!(rows = sites.len(), "fetched sites");
        Ok(sites)
    }

    /// Daily metric history for one site over the last `days` days,
    /// returned in date order.
    ///
    /// # Errors
    ///
    /// Same as [`HttpSiteSource::sites`].
    pub async fn history(
        &self,
        site_id: &str,
        days: u32,
    ) -> Result<Vec<MetricSample>, SourceError> {
        let days = days.to_string();
        let url = self.build_url(&["sites", site_id, "history"], &[("days", days.as_str())])?;
        let mut samples: Vec<MetricSample> = self.get_json(&url).await?;
        samples.sort_by_key(|s| s.date);
        tracing::debug!(site_id, samples = samples.len(), "fetched history");
        Ok(samples)
    }

    /// Distinct values for one level of the region cascade.
    ///
    /// # Errors
    ///
    /// Same as [`HttpSiteSource::sites`].
    pub async fn picklist(
        &self,
        scope: PicklistScope,
        filters: &FilterSet,
    ) -> Result<Vec<String>, SourceError> {
        let scope_segment = scope.to_string();
        let parents = scope.parent_filters(filters);
        let url = self.build_url(&["picklists", &scope_segment], &parents.query_pairs())?;
        self.get_json(&url).await
    }

    /// Appends path segments (percent-encoded) and query pairs to the base URL.
    fn build_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SourceError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Sends a GET request, checks for a 2xx status, and parses the body.
    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, SourceError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "backend returned error status");
            return Err(SourceError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

impl SiteSource for HttpSiteSource {
    type Error = SourceError;

    fn fetch_sites(
        &self,
        filters: &FilterSet,
    ) -> impl Future<Output = Result<Vec<SitePoint>, Self::Error>> + Send {
        self.sites(filters)
    }
}

impl HistorySource for HttpSiteSource {
    type Error = SourceError;

    fn fetch_history(
        &self,
        site_id: &str,
        days: u32,
    ) -> impl Future<Output = Result<Vec<MetricSample>, Self::Error>> + Send {
        self.history(site_id, days)
    }
}

impl PicklistSource for HttpSiteSource {
    type Error = SourceError;

    fn distinct_values(
        &self,
        scope: PicklistScope,
        filters: &FilterSet,
    ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send {
        self.picklist(scope, filters)
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
