//! Common types used in query options.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Sort order for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    /// Ascending order (A-Z, 0-9, oldest first).
    Asc,
    /// Descending order (Z-A, 9-0, newest first).
    Desc,
}

impl SortOrder {
    /// Get the SQL keyword for this sort order.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::Asc
    }
}

impl FromStr for SortOrder {
    type Err = ParseError;

    /// Parse a direction case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(ParseError::invalid_parameter(
                "order",
                format!("unknown direction {}", s),
            )),
        }
    }
}

/// Order by specification for a single attribute.
///
/// Serializes as a `[column, direction]` pair, the shape ORM executors take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByField {
    /// The attribute name as requested.
    pub attribute: SmolStr,
    /// The storage column backing the attribute.
    pub column: SmolStr,
    /// The sort order.
    pub order: SortOrder,
}

impl OrderByField {
    /// Create a new order by field.
    pub fn new(
        attribute: impl Into<SmolStr>,
        column: impl Into<SmolStr>,
        order: SortOrder,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            column: column.into(),
            order,
        }
    }

    /// Create an ascending order on a column named like its attribute.
    pub fn asc(attribute: impl Into<SmolStr>) -> Self {
        let attribute = attribute.into();
        Self::new(attribute.clone(), attribute, SortOrder::Asc)
    }

    /// Create a descending order on a column named like its attribute.
    pub fn desc(attribute: impl Into<SmolStr>) -> Self {
        let attribute = attribute.into();
        Self::new(attribute.clone(), attribute, SortOrder::Desc)
    }

    /// Generate the SQL for this order by field.
    pub fn to_sql(&self) -> String {
        let mut sql = String::with_capacity(self.column.len() + 5);
        self.write_sql(&mut sql);
        sql
    }

    /// Write the SQL directly to a buffer.
    ///
    /// ```rust
    /// use sqp_query::types::{OrderByField, SortOrder};
    ///
    /// let field = OrderByField::new("createdAt", "created_at", SortOrder::Desc);
    /// let mut buffer = String::from("ORDER BY ");
    /// field.write_sql(&mut buffer);
    /// assert_eq!(buffer, "ORDER BY created_at DESC");
    /// ```
    #[inline]
    pub fn write_sql(&self, buffer: &mut String) {
        buffer.push_str(&self.column);
        buffer.push(' ');
        buffer.push_str(self.order.as_sql());
    }
}

impl Serialize for OrderByField {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.column.as_str(), self.order).serialize(serializer)
    }
}

/// Ordering clause: a sequence of `(field, direction)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OrderClause(Vec<OrderByField>);

impl OrderClause {
    /// Create an empty clause.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a single-field clause.
    pub fn single(field: OrderByField) -> Self {
        Self(vec![field])
    }

    /// Append a field.
    pub fn then(mut self, field: OrderByField) -> Self {
        self.0.push(field);
        self
    }

    /// Get the fields.
    pub fn fields(&self) -> &[OrderByField] {
        &self.0
    }

    /// Check if the clause is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields in the clause.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Generate the SQL ORDER BY body (without the keyword).
    pub fn to_sql(&self) -> String {
        let mut sql = String::new();
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            field.write_sql(&mut sql);
        }
        sql
    }
}

impl From<OrderByField> for OrderClause {
    fn from(field: OrderByField) -> Self {
        Self::single(field)
    }
}

impl FromIterator<OrderByField> for OrderClause {
    fn from_iter<T: IntoIterator<Item = OrderByField>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_parse_case_insensitive() {
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("Desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("up".parse::<SortOrder>().is_err());
        assert!("".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_order_by_field_sql() {
        assert_eq!(OrderByField::desc("id").to_sql(), "id DESC");
        let clause = OrderClause::single(OrderByField::asc("name")).then(OrderByField::desc("id"));
        assert_eq!(clause.to_sql(), "name ASC, id DESC");
        assert_eq!(clause.len(), 2);
    }

    #[test]
    fn test_order_clause_serializes_as_pairs() {
        let clause =
            OrderClause::single(OrderByField::new("createdAt", "created_at", SortOrder::Desc));
        let json = serde_json::to_value(&clause).unwrap();
        assert_eq!(json, serde_json::json!([["created_at", "DESC"]]));
    }
}
