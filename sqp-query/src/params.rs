//! Decoded query-string parameters.

use indexmap::IndexMap;

/// Parameter names consumed by the built-in steps and never read as filters.
pub const RESERVED_PARAMS: &[&str] = &["include", "order", "page", "limit", "offset", "fields"];

/// Query-string parameters of one request, in first-seen order.
///
/// Repeated keys keep the position of their first occurrence and the value
/// of their last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: IndexMap<String, String>,
}

impl QueryParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a raw query string (without the leading `?`).
    ///
    /// ```rust
    /// use sqp_query::QueryParams;
    ///
    /// let params = QueryParams::parse("include=posts.comments&order=name%3Adesc&q=a+b");
    /// assert_eq!(params.get("include"), Some("posts.comments"));
    /// assert_eq!(params.get("order"), Some("name:desc"));
    /// assert_eq!(params.get("q"), Some("a b"));
    /// ```
    pub fn parse(query: &str) -> Self {
        url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .into_owned()
            .collect()
    }

    /// Set a parameter, replacing any previous value.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Get a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Check if a parameter is present.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterate parameters in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate parameters that are not reserved for the built-in steps.
    pub fn unreserved(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(k, _)| !RESERVED_PARAMS.contains(k))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, String)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut values = IndexMap::new();
        for (key, value) in iter {
            values.insert(key, value);
        }
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert!(QueryParams::parse("").is_empty());
        assert!(QueryParams::parse("?").is_empty());
    }

    #[test]
    fn test_last_value_wins() {
        let params = QueryParams::parse("order=id:asc&include=posts&order=id:desc");
        assert_eq!(params.get("order"), Some("id:desc"));
        let keys: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["order", "include"]);
    }

    #[test]
    fn test_brackets_decoded() {
        let params = QueryParams::parse("age%5Bgte%5D=18&name[like]=jo%25");
        assert_eq!(params.get("age[gte]"), Some("18"));
        assert_eq!(params.get("name[like]"), Some("jo%"));
    }

    #[test]
    fn test_unreserved() {
        let params = QueryParams::new()
            .set("include", "posts")
            .set("status", "open")
            .set("limit", "5");
        let rest: Vec<_> = params.unreserved().collect();
        assert_eq!(rest, vec![("status", "open")]);
    }

    #[test]
    fn test_key_without_value() {
        let params = QueryParams::parse("include");
        assert_eq!(params.get("include"), Some(""));
    }
}
