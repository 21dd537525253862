//! Query parameters for the collection `find` endpoint.

use url::form_urlencoded;

use crate::QueryBuilder;

/// Parameters for listing collection documents.
///
/// Zero and empty values count as unset and are left out of the query.
///
/// # Example
///
/// ```
/// use payloadcms_core::{ListParams, QueryBuilder};
///
/// let params = ListParams::new()
///     .sort("-createdAt")
///     .filter(QueryBuilder::new().equals("status", "draft"))
///     .limit(10);
///
/// assert_eq!(
///     params.encode(),
///     "?sort=-createdAt&where%5Bstatus%5D%5Bequals%5D=draft&limit=10"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Field to sort by, prefixed with `-` for descending order.
    pub sort: String,
    /// `where` clause constraining the returned documents.
    pub filter: Option<QueryBuilder>,
    /// Maximum number of documents per page.
    pub limit: u32,
    /// Page to fetch, starting at 1.
    pub page: u32,
    /// How many levels of relationships to populate.
    pub depth: u32,
}

impl ListParams {
    /// Creates empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sort field.
    #[must_use]
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    /// Set the `where` clause.
    #[must_use]
    pub fn filter(mut self, filter: QueryBuilder) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the page size.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the page.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the population depth.
    #[must_use]
    pub const fn depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Encodes the set parameters as `?sort=..&<where>&limit=..&page=..&depth=..`.
    ///
    /// Returns `""` when nothing is set. The `where` segment is the output of
    /// [`QueryBuilder::build`] and is not encoded a second time.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut segments: Vec<String> = Vec::with_capacity(5);

        if !self.sort.is_empty() {
            let sort: String = form_urlencoded::byte_serialize(self.sort.as_bytes()).collect();
            segments.push(format!("sort={sort}"));
        }
        if let Some(filter) = &self.filter {
            let built = filter.build();
            if !built.is_empty() {
                segments.push(built);
            }
        }
        for (name, value) in [("limit", self.limit), ("page", self.page), ("depth", self.depth)] {
            if value > 0 {
                segments.push(format!("{name}={value}"));
            }
        }

        if segments.is_empty() {
            return String::new();
        }
        format!("?{}", segments.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn empty_encodes_to_empty_string() {
        check!(ListParams::default().encode() == "");
    }

    #[test]
    fn sort_limit_page() {
        let encoded = ListParams::new().sort("name").limit(10).page(2).encode();

        check!(encoded.starts_with("?sort=name"));
        check!(encoded.matches("limit=10").count() == 1);
        check!(encoded.matches("page=2").count() == 1);
        check!(encoded == "?sort=name&limit=10&page=2");
    }

    #[test]
    fn fixed_segment_order() {
        let params = ListParams {
            sort: "-title".to_string(),
            filter: Some(QueryBuilder::new().exists("image", true)),
            limit: 5,
            page: 3,
            depth: 1,
        };

        insta::assert_snapshot!(
            params.encode(),
            @"?sort=-title&where%5Bimage%5D%5Bexists%5D=true&limit=5&page=3&depth=1"
        );
    }

    #[test]
    fn sort_is_escaped() {
        check!(ListParams::new().sort("title asc").encode() == "?sort=title+asc");
    }

    #[test]
    fn empty_filter_adds_no_segment() {
        let params = ListParams::new().filter(QueryBuilder::new()).depth(2);
        check!(params.encode() == "?depth=2");
    }

    #[test]
    fn where_segment_is_not_double_encoded() {
        let params = ListParams::new().filter(QueryBuilder::new().equals("slug", "a,b"));
        check!(params.encode() == "?where%5Bslug%5D%5Bequals%5D=a%2Cb");
    }
}
