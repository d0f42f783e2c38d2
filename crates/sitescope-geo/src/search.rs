//! Tokenized, case-insensitive, AND-semantics text search over site records.

use serde::{Deserialize, Serialize};
use sitescope_core::SitePoint;

/// Lowercase the query and split it on whitespace, dropping empty pieces.
#[must_use]
pub fn tokenize(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// `true` iff the lowercased haystack contains every token as a substring.
///
/// An empty token list matches everything. Tokens are expected to be
/// lowercase already (as produced by [`tokenize`]).
#[must_use]
pub fn contains_all<S: AsRef<str>>(haystack: &str, tokens: &[S]) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let haystack = haystack.to_lowercase();
    tokens.iter().all(|t| haystack.contains(t.as_ref()))
}

/// Independent free-text queries, one per field group.
///
/// A site passes when it satisfies every non-empty field query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Matched against the site id and name.
    #[serde(default)]
    pub site: String,
    /// Matched against the address only.
    #[serde(default)]
    pub address: String,
    /// Matched against the franchise and the administrative groupings.
    #[serde(default)]
    pub franchise: String,
}

impl SearchQuery {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.site.trim().is_empty()
            && self.address.trim().is_empty()
            && self.franchise.trim().is_empty()
    }

    #[must_use]
    pub fn compile(&self) -> CompiledQuery {
        CompiledQuery {
            site: tokenize(&self.site),
            address: tokenize(&self.address),
            franchise: tokenize(&self.franchise),
        }
    }

    #[must_use]
    pub fn matches(&self, site: &SitePoint) -> bool {
        self.compile().matches(site)
    }

    /// Returns the sites passing every field query, in input order.
    #[must_use]
    pub fn filter(&self, sites: &[SitePoint]) -> Vec<SitePoint> {
        let compiled = self.compile();
        sites
            .iter()
            .filter(|s| compiled.matches(s))
            .cloned()
            .collect()
    }
}

/// A [`SearchQuery`] with its tokens precomputed.
#[derive(Debug, Clone, Default)]
pub struct CompiledQuery {
    site: Vec<String>,
    address: Vec<String>,
    franchise: Vec<String>,
}

impl CompiledQuery {
    #[must_use]
    pub fn matches(&self, site: &SitePoint) -> bool {
        let attrs = &site.attributes;

        let site_ok = self.site.is_empty()
            || contains_all(&format!("{} {}", site.id, attrs.name), &self.site);

        let address_ok = self.address.is_empty()
            || contains_all(attrs.address.as_deref().unwrap_or(""), &self.address);

        let franchise_ok = self.franchise.is_empty() || {
            let composite = [
                attrs.franchise.as_deref(),
                attrs.region.as_deref(),
                attrs.sub_region.as_deref(),
                attrs.grid.as_deref(),
                attrs.district.as_deref(),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
            contains_all(&composite, &self.franchise)
        };

        site_ok && address_ok && franchise_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(id: &str, name: &str, address: Option<&str>) -> SitePoint {
        let mut s = SitePoint::new(id, None, None).with_name(name);
        s.attributes.address = address.map(str::to_string);
        s
    }

    #[test]
    fn tokenize_lowercases_and_drops_empties() {
        assert_eq!(tokenize("  Gulshan   MAIN\tRoad "), vec!["gulshan", "main", "road"]);
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn empty_query_matches_anything() {
        assert!(contains_all("", &tokenize("")));
        assert!(contains_all("whatever", &tokenize("")));
    }

    #[test]
    fn contains_all_is_case_and_order_insensitive() {
        assert!(contains_all("Main Road Gulshan", &tokenize("gulshan main")));
        assert!(contains_all("Main Road Gulshan", &tokenize("ROAD")));
        assert!(!contains_all("Main Road Gulshan", &tokenize("gulshan banani")));
    }

    #[test]
    fn tokens_match_as_substrings() {
        assert!(contains_all("DHK_MIR_0042", &tokenize("mir 004")));
    }

    #[test]
    fn field_queries_combine_with_and() {
        let sites = vec![
            site("DHK001", "Gulshan Hub", Some("House 12, Road 5, Gulshan")),
            site("DHK002", "Banani Macro", Some("Road 11, Banani")),
            site("CTG001", "Agrabad Hub", Some("Agrabad C/A")),
        ];

        let query = SearchQuery {
            site: "hub".to_string(),
            ..SearchQuery::default()
        };
        let ids: Vec<_> = query.filter(&sites).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["DHK001", "CTG001"]);

        let query = SearchQuery {
            site: "hub".to_string(),
            address: "gulshan".to_string(),
            ..SearchQuery::default()
        };
        let ids: Vec<_> = query.filter(&sites).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["DHK001"]);
    }

    #[test]
    fn site_composite_includes_id() {
        let s = site("CTG001", "Agrabad Hub", None);
        let query = SearchQuery {
            site: "ctg agrabad".to_string(),
            ..SearchQuery::default()
        };
        assert!(query.matches(&s));
    }

    #[test]
    fn address_query_fails_when_address_missing() {
        let s = site("X1", "No Address", None);
        let query = SearchQuery {
            address: "road".to_string(),
            ..SearchQuery::default()
        };
        assert!(!query.matches(&s));
    }

    #[test]
    fn franchise_composite_spans_groupings() {
        let mut s = site("R1", "Rural", None);
        s.attributes.franchise = Some("North Star Telecom".to_string());
        s.attributes.district = Some("Rangpur".to_string());

        let query = SearchQuery {
            franchise: "star rangpur".to_string(),
            ..SearchQuery::default()
        };
        assert!(query.matches(&s));
        assert!(!SearchQuery {
            franchise: "star sylhet".to_string(),
            ..SearchQuery::default()
        }
        .matches(&s));
    }

    #[test]
    fn coordinate_less_points_remain_searchable() {
        let sites = vec![site("NOGPS", "Hidden Hub", None)];
        let query = SearchQuery {
            site: "hidden".to_string(),
            ..SearchQuery::default()
        };
        assert_eq!(query.filter(&sites).len(), 1);
    }
}
