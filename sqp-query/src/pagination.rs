//! Offset pagination from the `page`, `limit` and `offset` parameters.
//!
//! ```rust
//! use sqp_query::{QueryParams, pagination::{paginate, Pagination}};
//! use sqp_schema::QueryConfig;
//!
//! let config = QueryConfig::default();
//!
//! // Page-based pagination (1-indexed)
//! let page_3 = paginate(&QueryParams::parse("page=3&limit=10"), &config).unwrap();
//! assert_eq!(page_3, Pagination { limit: 10, offset: 20 });
//! assert_eq!(page_3.to_sql(), "LIMIT 10 OFFSET 20");
//!
//! // Defaults apply when nothing is requested
//! let first = paginate(&QueryParams::new(), &config).unwrap();
//! assert_eq!(first, Pagination { limit: 25, offset: 0 });
//! ```

use serde::Serialize;
use sqp_schema::QueryConfig;
use std::fmt::Write;
use tracing::debug;

use crate::error::{ParseError, ParseResult};
use crate::params::QueryParams;

/// Resolved limit/offset pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Maximum number of records to return.
    pub limit: u64,
    /// Number of records to skip.
    pub offset: u64,
}

impl Pagination {
    /// First page of `limit` records.
    pub fn first(limit: u64) -> Self {
        Self { limit, offset: 0 }
    }

    /// Page `page` (1-indexed) of `per_page` records.
    pub fn page(page: u64, per_page: u64) -> Self {
        Self {
            limit: per_page,
            offset: page.saturating_sub(1).saturating_mul(per_page),
        }
    }

    /// The 1-indexed page this window starts on.
    pub fn page_number(&self) -> u64 {
        self.offset / self.limit.max(1) + 1
    }

    /// Generate SQL LIMIT/OFFSET clause.
    pub fn to_sql(&self) -> String {
        let mut sql = String::with_capacity(32);
        self.write_sql(&mut sql);
        sql
    }

    /// Write SQL LIMIT/OFFSET clause directly to a buffer.
    #[inline]
    pub fn write_sql(&self, buffer: &mut String) {
        let _ = write!(buffer, "LIMIT {}", self.limit);
        if self.offset > 0 {
            let _ = write!(buffer, " OFFSET {}", self.offset);
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        let config = QueryConfig::default();
        Self::first(config.default_limit)
    }
}

/// Resolve pagination for a request.
///
/// `limit` defaults to `config.default_limit`; requested and default limits
/// are both clamped to `config.max_limit`. `page` wins over `offset` when
/// both are present.
pub fn paginate(params: &QueryParams, config: &QueryConfig) -> ParseResult<Pagination> {
    let limit = positive(params, "limit")?
        .unwrap_or(config.default_limit)
        .min(config.max_limit);

    let pagination = if let Some(page) = positive(params, "page")? {
        Pagination::page(page, limit)
    } else {
        let offset = number(params, "offset")?.unwrap_or(0);
        Pagination { limit, offset }
    };

    debug!(limit = pagination.limit, offset = pagination.offset, "Pagination resolved");
    Ok(pagination)
}

fn number(params: &QueryParams, name: &str) -> ParseResult<Option<u64>> {
    match params.get(name) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<u64>().map(Some).map_err(|e| {
            ParseError::invalid_parameter(name, "expected a non-negative integer")
                .with_value(raw)
                .with_source(e)
        }),
    }
}

fn positive(params: &QueryParams, name: &str) -> ParseResult<Option<u64>> {
    match number(params, name)? {
        Some(0) => {
            Err(ParseError::invalid_parameter(name, "must be greater than zero").with_value("0"))
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn config() -> QueryConfig {
        QueryConfig {
            default_limit: 20,
            max_limit: 50,
            ..QueryConfig::default()
        }
    }

    fn resolve(query: &str) -> ParseResult<Pagination> {
        paginate(&QueryParams::parse(query), &config())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(resolve("").unwrap(), Pagination { limit: 20, offset: 0 });
        assert_eq!(resolve("limit=&page=").unwrap(), Pagination { limit: 20, offset: 0 });
    }

    #[test]
    fn test_page_and_limit() {
        assert_eq!(resolve("page=3&limit=10").unwrap(), Pagination { limit: 10, offset: 20 });
        assert_eq!(resolve("page=1").unwrap(), Pagination { limit: 20, offset: 0 });
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(resolve("limit=500").unwrap().limit, 50);
    }

    #[test]
    fn test_default_limit_is_clamped() {
        let config = QueryConfig {
            default_limit: 20,
            max_limit: 5,
            ..QueryConfig::default()
        };
        assert_eq!(
            paginate(&QueryParams::new(), &config).unwrap(),
            Pagination { limit: 5, offset: 0 }
        );
        assert_eq!(paginate(&QueryParams::parse("page=3"), &config).unwrap().offset, 10);
    }

    #[test]
    fn test_offset() {
        assert_eq!(resolve("offset=7&limit=5").unwrap(), Pagination { limit: 5, offset: 7 });
        assert_eq!(resolve("offset=7&page=2&limit=5").unwrap().offset, 5);
    }

    #[test]
    fn test_invalid_values() {
        for query in ["page=0", "limit=0", "page=-1", "limit=ten", "offset=1.5"] {
            let err = resolve(query).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidParameter, "query {query}");
        }
    }

    #[test]
    fn test_sql_and_page_number() {
        let pagination = Pagination::page(4, 25);
        assert_eq!(pagination.to_sql(), "LIMIT 25 OFFSET 75");
        assert_eq!(pagination.page_number(), 4);
        assert_eq!(Pagination::first(10).to_sql(), "LIMIT 10");
    }
}
