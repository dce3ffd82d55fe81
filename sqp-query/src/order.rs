//! Sort-clause resolution for the `order` parameter.
//!
//! ```rust
//! use sqp_query::order::resolve_order;
//! use sqp_query::types::SortOrder;
//! use sqp_schema::{DataType, ModelDef, Schema};
//!
//! let schema = Schema::builder()
//!     .model(
//!         ModelDef::new("User")
//!             .attr("id", DataType::Integer)
//!             .attr("createdAt", DataType::Date)
//!             .attr("name", DataType::String),
//!     )
//!     .build()
//!     .unwrap();
//! let user = schema.model("User").unwrap();
//!
//! let clause = resolve_order(&user, None).unwrap();
//! assert_eq!(clause.fields()[0].attribute, "createdAt");
//! assert_eq!(clause.fields()[0].order, SortOrder::Desc);
//!
//! let clause = resolve_order(&user, Some("name:asc")).unwrap();
//! assert_eq!(clause.to_sql(), "name ASC");
//! ```

use sqp_schema::{Attribute, ModelDescriptor};
use tracing::debug;

use crate::error::{ParseError, ParseResult};
use crate::types::{OrderByField, OrderClause, SortOrder};

/// Attribute preferred for the default ordering.
pub const DEFAULT_ORDER_ATTRIBUTE: &str = "createdAt";

/// Resolve the `order` parameter using [`DEFAULT_ORDER_ATTRIBUTE`].
pub fn resolve_order(model: &ModelDescriptor, order: Option<&str>) -> ParseResult<OrderClause> {
    resolve_order_with(model, order, DEFAULT_ORDER_ATTRIBUTE)
}

/// Resolve the `order` parameter into a single-field clause.
///
/// - absent or empty: `default_attribute` descending when the model declares
///   it, the primary key descending otherwise
/// - `attribute:direction`: direction is case-insensitive ASC or DESC
/// - `attribute`: ascending
/// - `:direction`: the default attribute with the given direction
///
/// Unknown attributes and directions fail with
/// [`ErrorCode::InvalidAttribute`](crate::ErrorCode::InvalidAttribute).
pub fn resolve_order_with(
    model: &ModelDescriptor,
    order: Option<&str>,
    default_attribute: &str,
) -> ParseResult<OrderClause> {
    let Some(order) = order.filter(|o| !o.is_empty()) else {
        let attribute = default_attribute_of(model, default_attribute)?;
        debug!(model = model.name(), attribute = %attribute.name, "Using default order");
        return Ok(OrderClause::single(field(attribute, SortOrder::Desc)));
    };

    let (name, direction) = match order.split_once(':') {
        Some((_, rest)) if rest.contains(':') => {
            return Err(ParseError::invalid_attribute(model.name(), "order", order));
        }
        Some((name, direction)) => (name, parse_direction(model, direction)?),
        None => (order, SortOrder::Asc),
    };

    let attribute = if name.is_empty() {
        default_attribute_of(model, default_attribute)?
    } else {
        model
            .attribute(name)
            .ok_or_else(|| ParseError::invalid_attribute(model.name(), "order", name))?
    };

    Ok(OrderClause::single(field(attribute, direction)))
}

fn parse_direction(model: &ModelDescriptor, direction: &str) -> ParseResult<SortOrder> {
    direction
        .parse::<SortOrder>()
        .map_err(|_| ParseError::invalid_direction(model.name(), direction))
}

fn default_attribute_of<'a>(
    model: &'a ModelDescriptor,
    preferred: &str,
) -> ParseResult<&'a Attribute> {
    model
        .attribute(preferred)
        .or_else(|| model.attribute(model.primary_key()))
        .ok_or_else(|| ParseError::invalid_attribute(model.name(), "order", model.primary_key()))
}

fn field(attribute: &Attribute, order: SortOrder) -> OrderByField {
    OrderByField::new(attribute.name.clone(), attribute.field.clone(), order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pretty_assertions::assert_eq;
    use sqp_schema::{DataType, ModelDef, Schema};

    fn model(with_created_at: bool) -> ModelDescriptor {
        let mut def = ModelDef::new("Item").attr("id", DataType::Integer);
        if with_created_at {
            def = def.attr("createdAt", DataType::Date);
        }
        def = def.attr("otherAttribute", DataType::String);
        Schema::builder().model(def).build().unwrap().model("Item").unwrap()
    }

    #[test]
    fn test_default_prefers_created_at() {
        let clause = resolve_order(&model(true), None).unwrap();
        assert_eq!(clause, OrderClause::single(OrderByField::desc("createdAt")));
    }

    #[test]
    fn test_default_falls_back_to_primary_key() {
        let clause = resolve_order(&model(false), None).unwrap();
        assert_eq!(clause, OrderClause::single(OrderByField::desc("id")));
    }

    #[test]
    fn test_empty_order_uses_default() {
        let clause = resolve_order(&model(true), Some("")).unwrap();
        assert_eq!(clause, OrderClause::single(OrderByField::desc("createdAt")));
    }

    #[test]
    fn test_explicit_order() {
        let clause = resolve_order(&model(true), Some("otherAttribute:asc")).unwrap();
        assert_eq!(clause, OrderClause::single(OrderByField::asc("otherAttribute")));

        let clause = resolve_order(&model(true), Some("id:DeSc")).unwrap();
        assert_eq!(clause, OrderClause::single(OrderByField::desc("id")));
    }

    #[test]
    fn test_missing_direction_is_ascending() {
        let clause = resolve_order(&model(true), Some("otherAttribute")).unwrap();
        assert_eq!(clause.fields()[0].order, SortOrder::Asc);
    }

    #[test]
    fn test_missing_attribute_uses_default() {
        let clause = resolve_order(&model(false), Some(":asc")).unwrap();
        assert_eq!(clause, OrderClause::single(OrderByField::asc("id")));
    }

    #[test]
    fn test_unknown_attribute() {
        let err = resolve_order(&model(true), Some("invalidAttribute:asc")).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAttribute);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_unknown_direction() {
        let err = resolve_order(&model(true), Some("otherAttribute:sideways")).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAttribute);

        let err = resolve_order(&model(true), Some("otherAttribute:")).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAttribute);
    }

    #[test]
    fn test_extra_separator_rejected() {
        let err = resolve_order(&model(true), Some("id:asc:desc")).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAttribute);
    }

    #[test]
    fn test_storage_column_is_used() {
        let schema = Schema::builder()
            .model(
                ModelDef::new("User")
                    .attr("id", DataType::Integer)
                    .attribute(
                        sqp_schema::Attribute::new("createdAt", DataType::Date).field("created_at"),
                    ),
            )
            .build()
            .unwrap();
        let clause = resolve_order(&schema.model("User").unwrap(), None).unwrap();
        assert_eq!(clause.fields()[0].column, "created_at");
        assert_eq!(clause.fields()[0].attribute, "createdAt");
    }

    #[test]
    fn test_configured_default_attribute() {
        let schema = Schema::builder()
            .model(
                ModelDef::new("Event")
                    .attr("id", DataType::Integer)
                    .attr("startsAt", DataType::Date),
            )
            .build()
            .unwrap();
        let clause = resolve_order_with(&schema.model("Event").unwrap(), None, "startsAt").unwrap();
        assert_eq!(clause, OrderClause::single(OrderByField::desc("startsAt")));
    }
}
