//! Query URL construction for the feed's `query` endpoint.

use url::Url;

use crate::error::{FeedError, FeedResult};

/// `query` endpoint of the KSI collisions feature layer (layer 0) on ArcGIS Online.
pub const DEFAULT_BASE_URL: &str =
    "https://services.arcgis.com/S9th0jAJ7bqgIRjw/arcgis/rest/services/KSI/FeatureServer/0/query";

/// Field the index-range filter applies to.
pub const INDEX_FIELD: &str = "Index_";

/// Last index published at the time the default range was chosen.
pub const DEFAULT_INDEX_END: i64 = 3_389_167;

/// A single bounded query: every record with `start <= Index_ <= end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    /// `query` endpoint of the feature layer.
    pub base_url: String,
    /// Inclusive lower bound on `Index_`.
    pub index_start: i64,
    /// Inclusive upper bound on `Index_`.
    pub index_end: i64,
    /// `outFields` parameter.
    pub out_fields: String,
    /// Spatial reference (WKID) for returned geometry.
    pub out_sr: u32,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            index_start: 1,
            index_end: DEFAULT_INDEX_END,
            out_fields: "*".to_string(),
            out_sr: 4326,
        }
    }
}

impl FeedQuery {
    /// Query the default layer for an inclusive index range.
    pub fn with_range(index_start: i64, index_end: i64) -> Self {
        Self {
            index_start,
            index_end,
            ..Self::default()
        }
    }

    /// The `where` clause, e.g. `Index_ >= 1 AND Index_ <= 10`.
    pub fn where_clause(&self) -> String {
        format!(
            "{INDEX_FIELD} >= {} AND {INDEX_FIELD} <= {}",
            self.index_start, self.index_end
        )
    }

    /// Build the request URL. Fails on an unparsable base URL or an empty range.
    pub fn to_url(&self) -> FeedResult<Url> {
        if self.index_start > self.index_end {
            return Err(FeedError::InvalidRange {
                start: self.index_start,
                end: self.index_end,
            });
        }

        let mut url = Url::parse(&self.base_url)?;
        url.query_pairs_mut()
            .append_pair("where", &self.where_clause())
            .append_pair("outFields", &self.out_fields)
            .append_pair("outSR", &self.out_sr.to_string())
            .append_pair("f", "json");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_INDEX_END, FeedQuery};
    use crate::error::FeedError;

    #[test]
    fn default_covers_the_full_published_range() {
        let q = FeedQuery::default();
        assert_eq!(q.index_start, 1);
        assert_eq!(q.index_end, DEFAULT_INDEX_END);
        assert_eq!(q.where_clause(), "Index_ >= 1 AND Index_ <= 3389167");
    }

    #[test]
    fn url_carries_inclusive_filter_and_json_format() {
        let url = FeedQuery::with_range(10, 20).to_url().unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("where".to_string(), "Index_ >= 10 AND Index_ <= 20".to_string()),
                ("outFields".to_string(), "*".to_string()),
                ("outSR".to_string(), "4326".to_string()),
                ("f".to_string(), "json".to_string()),
            ]
        );
        assert!(url.path().ends_with("/FeatureServer/0/query"));
    }

    #[test]
    fn single_index_range_is_allowed() {
        assert!(FeedQuery::with_range(5, 5).to_url().is_ok());
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(matches!(
            FeedQuery::with_range(20, 10).to_url(),
            Err(FeedError::InvalidRange { start: 20, end: 10 })
        ));
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let q = FeedQuery {
            base_url: "not a url".to_string(),
            ..FeedQuery::default()
        };
        assert!(matches!(q.to_url(), Err(FeedError::Url(_))));
    }
}
