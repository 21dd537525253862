//! `where` clause builder.
//!
//! Payload filters documents with bracketed query keys:
//! `where[<field>][<operator>]=<value>`. [`QueryBuilder`] accumulates those
//! pairs and encodes them into a query string.
//!
//! The `and`/`or` combinators re-nest each key of the sub-query literally
//! inside the combinator bracket, so combining `where[title][equals]` under
//! `and` yields `where[and][][where[title][equals]]`. Combinators are not
//! flattened: nesting an `and` inside an `and` gives three levels of brackets.
//!
//! # Example
//!
//! ```
//! use payloadcms_core::QueryBuilder;
//!
//! let query = QueryBuilder::new()
//!     .equals("status", "published")
//!     .in_values("category", ["news", "blog"]);
//!
//! assert_eq!(
//!     query.build(),
//!     "where%5Bcategory%5D%5Bin%5D=news%2Cblog&where%5Bstatus%5D%5Bequals%5D=published"
//! );
//! ```

use url::form_urlencoded;

/// Comparison operators understood by the `where` grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `equals`
    Equals,
    /// `not_equals`
    NotEquals,
    /// `greater_than`
    GreaterThan,
    /// `less_than`
    LessThan,
    /// `in`, value is a comma separated list.
    In,
    /// `exists`, value is `true` or `false`.
    Exists,
}

impl Operator {
    /// The operator as it appears inside the key brackets.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::In => "in",
            Self::Exists => "exists",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for `where` filter expressions.
///
/// Keys are kept in insertion order and never deduplicated; the same key may
/// carry several values. No method validates its input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `where[<field>][<operator>]=<value>`.
    #[must_use]
    pub fn filter(mut self, field: &str, operator: Operator, value: impl Into<String>) -> Self {
        self.params
            .push((format!("where[{field}][{operator}]"), value.into()));
        self
    }

    /// Adds an `equals` filter.
    #[must_use]
    pub fn equals(self, field: &str, value: impl Into<String>) -> Self {
        self.filter(field, Operator::Equals, value)
    }

    /// Adds a `not_equals` filter.
    #[must_use]
    pub fn not_equals(self, field: &str, value: impl Into<String>) -> Self {
        self.filter(field, Operator::NotEquals, value)
    }

    /// Adds a `greater_than` filter.
    #[must_use]
    pub fn greater_than(self, field: &str, value: impl Into<String>) -> Self {
        self.filter(field, Operator::GreaterThan, value)
    }

    /// Adds a `less_than` filter.
    #[must_use]
    pub fn less_than(self, field: &str, value: impl Into<String>) -> Self {
        self.filter(field, Operator::LessThan, value)
    }

    /// Adds an `in` filter, joining `values` with commas.
    #[must_use]
    pub fn in_values<I, S>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.filter(field, Operator::In, joined)
    }

    /// Adds an `exists` filter.
    #[must_use]
    pub fn exists(self, field: &str, exists: bool) -> Self {
        self.filter(field, Operator::Exists, if exists { "true" } else { "false" })
    }

    /// Merges every predicate of `sub` under `where[and][]`.
    #[must_use]
    pub fn and(self, sub: &Self) -> Self {
        self.combine("and", sub)
    }

    /// Merges every predicate of `sub` under `where[or][]`.
    #[must_use]
    pub fn or(self, sub: &Self) -> Self {
        self.combine("or", sub)
    }

    fn combine(mut self, combinator: &str, sub: &Self) -> Self {
        self.params.extend(
            sub.params
                .iter()
                .map(|(key, value)| (format!("where[{combinator}][][{key}]"), value.clone())),
        );
        self
    }

    /// The accumulated `(key, value)` pairs in insertion order, unencoded.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// No predicates were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of accumulated pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Encodes the predicates as a query string.
    ///
    /// Returns `""` when nothing was added. Otherwise keys are sorted, values
    /// under the same key keep their insertion order, and keys and values are
    /// form-urlencoded (brackets become `%5B`/`%5D`).
    #[must_use]
    pub fn build(&self) -> String {
        if self.params.is_empty() {
            return String::new();
        }

        let mut sorted: Vec<&(String, String)> = self.params.iter().collect();
        // stable: equal keys stay in insertion order
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(sorted.into_iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .finish()
    }
}

impl std::fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.build())
    }
}
