//! Site rows loaded once from a local JSON or YAML export.

use std::collections::BTreeSet;
use std::future::Future;
use std::path::Path;

use sitescope_core::{FilterSet, PicklistScope, PicklistSource, SitePoint, SiteSource};

use crate::error::SourceError;

/// Serves site rows and picklists from an in-memory snapshot.
#[derive(Debug, Clone, Default)]
pub struct FileSiteSource {
    rows: Vec<SitePoint>,
}

impl FileSiteSource {
    /// Load rows from `path`. The format is chosen by extension: `json`,
    /// `yaml` or `yml`. The file holds a sequence of site records.
    ///
    /// # Errors
    ///
    /// - [`SourceError::UnsupportedFormat`] for any other extension.
    /// - [`SourceError::Io`] if the file cannot be read.
    /// - [`SourceError::Deserialize`] / [`SourceError::Yaml`] if the content
    ///   does not parse as site records.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !matches!(ext.as_str(), "json" | "yaml" | "yml") {
            return Err(SourceError::UnsupportedFormat(path.display().to_string()));
        }

        let raw = std::fs::read_to_string(path).map_err(|e| SourceError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let rows: Vec<SitePoint> = if ext == "json" {
            serde_json::from_str(&raw).map_err(|e| SourceError::Deserialize {
                context: path.display().to_string(),
                source: e,
            })?
        } else {
            serde_yaml::from_str(&raw).map_err(|e| SourceError::Yaml {
                path: path.to_path_buf(),
                source: e,
            })?
        };

        let mapped = rows.iter().filter(|r| r.has_coordinate()).count();
        tracing::info!(
            path = %path.display(),
            rows = rows.len(),
            mapped,
            "loaded site file"
        );
        Ok(Self { rows })
    }

    #[must_use]
    pub fn from_rows(rows: Vec<SitePoint>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[SitePoint] {
        &self.rows
    }

    /// Rows passing `filters`, in file order.
    #[must_use]
    pub fn filtered(&self, filters: &FilterSet) -> Vec<SitePoint> {
        self.rows
            .iter()
            .filter(|r| filters.matches(r))
            .cloned()
            .collect()
    }

    /// Sorted distinct non-blank values of `scope`, scoped by the filters
    /// above it in the cascade.
    #[must_use]
    pub fn picklist(&self, scope: PicklistScope, filters: &FilterSet) -> Vec<String> {
        let parents = scope.parent_filters(filters);
        self.rows
            .iter()
            .filter(|r| parents.matches(r))
            .filter_map(|r| scope.value_of(r))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}

impl SiteSource for FileSiteSource {
    type Error = SourceError;

    fn fetch_sites(
        &self,
        filters: &FilterSet,
    ) -> impl Future<Output = Result<Vec<SitePoint>, Self::Error>> + Send {
        let rows = self.filtered(filters);
        async move { Ok(rows) }
    }
}

impl PicklistSource for FileSiteSource {
    type Error = SourceError;

    fn distinct_values(
        &self,
        scope: PicklistScope,
        filters: &FilterSet,
    ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send {
        let values = self.picklist(scope, filters);
        async move { Ok(values) }
    }
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;
