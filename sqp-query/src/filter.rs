//! Filter conditions built from query-string parameters.
//!
//! Any parameter that is not reserved and names a model attribute becomes a
//! condition. The operator comes from an optional bracket suffix:
//!
//! | parameter            | condition                 |
//! |----------------------|---------------------------|
//! | `status=open`        | `status = 'open'`         |
//! | `age[gte]=18`        | `age >= 18`               |
//! | `id[in]=1,2,3`       | `id IN (1, 2, 3)`         |
//! | `name[like]=jo%`     | `name LIKE 'jo%'`         |
//! | `deletedAt[isNull]=true` | `deletedAt IS NULL`   |
//!
//! ```rust
//! use sqp_query::{QueryParams, filter::{build_where, FilterOperator, FilterValue}};
//! use sqp_schema::{DataType, ModelDef, Schema};
//!
//! let schema = Schema::builder()
//!     .model(ModelDef::new("User").attr("id", DataType::Integer).attr("age", DataType::Integer))
//!     .build()
//!     .unwrap();
//! let user = schema.model("User").unwrap();
//!
//! let filter = build_where(&user, &QueryParams::parse("age[gte]=18&utm_source=mail")).unwrap();
//! assert_eq!(filter.len(), 1);
//! assert_eq!(filter.conditions()[0].operator, FilterOperator::Gte);
//! assert_eq!(filter.conditions()[0].value, FilterValue::Int(18));
//! ```

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use sqp_schema::{Attribute, DataType, ModelDescriptor};
use std::fmt;
use tracing::debug;

use crate::error::{ParseError, ParseResult};
use crate::params::QueryParams;

/// A filter value typed by the attribute it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// List of values.
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Parse a raw parameter value according to `data_type`.
    ///
    /// Floats must be finite: `NaN` and infinities have no JSON form.
    /// Dates, UUIDs and JSON stay textual; the executor's driver types them.
    pub fn parse(raw: &str, data_type: DataType) -> Option<Self> {
        match data_type {
            DataType::Integer => raw.parse().ok().map(Self::Int),
            DataType::Float => raw.parse::<f64>().ok().filter(|v| v.is_finite()).map(Self::Float),
            DataType::Boolean => parse_bool(raw).map(Self::Bool),
            DataType::String | DataType::Date | DataType::Uuid | DataType::Json => {
                Some(Self::String(raw.to_string()))
            }
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    /// Equals.
    Eq,
    /// Not equals.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// SQL LIKE pattern.
    Like,
    /// In a list of values.
    In,
    /// Not in a list of values.
    NotIn,
    /// Null check; the value says whether the column must be null.
    IsNull,
}

impl FilterOperator {
    /// Look up an operator by its query-string name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "eq" => Self::Eq,
            "ne" => Self::Ne,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "like" => Self::Like,
            "in" => Self::In,
            "notIn" => Self::NotIn,
            "isNull" => Self::IsNull,
            _ => return None,
        })
    }

    /// Check if the operator orders values.
    pub fn is_range(&self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::In => "in",
            Self::NotIn => "notIn",
            Self::IsNull => "isNull",
        };
        f.write_str(name)
    }
}

/// A single `column <op> value` condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    /// The attribute name as requested.
    pub attribute: SmolStr,
    /// The storage column backing the attribute.
    pub column: SmolStr,
    /// The comparison operator.
    pub operator: FilterOperator,
    /// The typed operand.
    pub value: FilterValue,
}

/// Conjunction of conditions; empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Filter(Vec<Condition>);

impl Filter {
    /// Create an empty filter (matches everything).
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a condition.
    pub fn and(mut self, condition: Condition) -> Self {
        self.0.push(condition);
        self
    }

    /// Get the conditions.
    pub fn conditions(&self) -> &[Condition] {
        &self.0
    }

    /// Check if this filter is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Generate a parameterized SQL WHERE body.
    ///
    /// Placeholders are numbered from `param_offset + 1`.
    pub fn to_sql(&self, param_offset: usize) -> (String, Vec<FilterValue>) {
        if self.0.is_empty() {
            return ("TRUE".to_string(), Vec::new());
        }

        let next = |value: &FilterValue, params: &mut Vec<FilterValue>| {
            params.push(value.clone());
            format!("${}", param_offset + params.len())
        };

        let mut params = Vec::new();
        let mut parts = Vec::with_capacity(self.0.len());
        for condition in &self.0 {
            let col = &condition.column;
            let part = match (condition.operator, &condition.value) {
                (FilterOperator::IsNull, FilterValue::Bool(false)) => {
                    format!("{} IS NOT NULL", col)
                }
                (FilterOperator::IsNull, _) => format!("{} IS NULL", col),
                (FilterOperator::In | FilterOperator::NotIn, FilterValue::List(values)) => {
                    let placeholders: Vec<_> =
                        values.iter().map(|v| next(v, &mut params)).collect();
                    let keyword = if condition.operator == FilterOperator::In {
                        "IN"
                    } else {
                        "NOT IN"
                    };
                    format!("{} {} ({})", col, keyword, placeholders.join(", "))
                }
                (operator, value) => {
                    let symbol = match operator {
                        FilterOperator::Ne | FilterOperator::NotIn => "!=",
                        FilterOperator::Gt => ">",
                        FilterOperator::Gte => ">=",
                        FilterOperator::Lt => "<",
                        FilterOperator::Lte => "<=",
                        FilterOperator::Like => "LIKE",
                        _ => "=",
                    };
                    format!("{} {} {}", col, symbol, next(value, &mut params))
                }
            };
            parts.push(part);
        }

        (parts.join(" AND "), params)
    }
}

/// Build the filter for every attribute parameter of the request.
///
/// Unreserved parameters that name no attribute are ignored unless they
/// carry an operator suffix, in which case the request is rejected.
pub fn build_where(model: &ModelDescriptor, params: &QueryParams) -> ParseResult<Filter> {
    let mut filter = Filter::none();

    for (key, raw) in params.unreserved() {
        let (name, operator) = split_key(key);

        let Some(attribute) = model.attribute(name) else {
            if operator.is_some() {
                return Err(ParseError::invalid_filter(model.name(), key, "unknown attribute"));
            }
            debug!(model = model.name(), parameter = key, "Ignoring non-attribute parameter");
            continue;
        };

        let operator = match operator {
            None => FilterOperator::Eq,
            Some(op) => FilterOperator::from_name(op).ok_or_else(|| {
                ParseError::invalid_filter(model.name(), key, format!("unknown operator {}", op))
            })?,
        };

        let value = condition_value(model, key, attribute, operator, raw)?;
        filter = filter.and(Condition {
            attribute: attribute.name.clone(),
            column: attribute.field.clone(),
            operator,
            value,
        });
    }

    debug!(model = model.name(), conditions = filter.len(), "Filter built");
    Ok(filter)
}

/// Split `name[op]` into its parts; keys without a well-formed suffix are
/// returned whole.
fn split_key(key: &str) -> (&str, Option<&str>) {
    match key.strip_suffix(']').and_then(|k| k.split_once('[')) {
        Some((name, op)) if !name.is_empty() => (name, Some(op)),
        _ => (key, None),
    }
}

fn condition_value(
    model: &ModelDescriptor,
    key: &str,
    attribute: &Attribute,
    operator: FilterOperator,
    raw: &str,
) -> ParseResult<FilterValue> {
    let typed = |raw: &str| {
        FilterValue::parse(raw, attribute.data_type).ok_or_else(|| {
            ParseError::invalid_filter(
                model.name(),
                key,
                format!("expected {} value", attribute.data_type),
            )
            .with_value(raw)
        })
    };

    match operator {
        FilterOperator::In | FilterOperator::NotIn => {
            let values = raw.split(',').map(&typed).collect::<ParseResult<Vec<_>>>()?;
            Ok(FilterValue::List(values))
        }
        FilterOperator::IsNull => parse_bool(raw).map(FilterValue::Bool).ok_or_else(|| {
            ParseError::invalid_filter(model.name(), key, "expected true or false").with_value(raw)
        }),
        FilterOperator::Like if attribute.data_type != DataType::String => Err(
            ParseError::invalid_filter(model.name(), key, "like requires a string attribute"),
        ),
        op if op.is_range() && !attribute.data_type.is_comparable() => Err(
            ParseError::invalid_filter(
                model.name(),
                key,
                format!("{} cannot compare {} values", op, attribute.data_type),
            ),
        ),
        _ => typed(raw),
    }
}
