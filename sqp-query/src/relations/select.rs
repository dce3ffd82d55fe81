//! Attribute selection from the `fields` parameter.

use smol_str::SmolStr;
use sqp_schema::ModelDescriptor;

use crate::error::{ParseError, ParseResult};

/// Resolve a comma-separated attribute list.
///
/// An empty parameter selects everything and yields `None`. Each listed name
/// must be a declared attribute; repeats are dropped, first occurrence wins.
pub fn select_attributes(
    model: &ModelDescriptor,
    fields: &str,
) -> ParseResult<Option<Vec<SmolStr>>> {
    if fields.is_empty() {
        return Ok(None);
    }

    let mut selected: Vec<SmolStr> = Vec::new();
    for name in fields.split(',') {
        let attribute = model
            .attribute(name)
            .ok_or_else(|| ParseError::invalid_attribute(model.name(), "fields", name))?;
        if !selected.contains(&attribute.name) {
            selected.push(attribute.name.clone());
        }
    }

    Ok(Some(selected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use sqp_schema::{DataType, ModelDef, Schema};

    fn post() -> ModelDescriptor {
        Schema::builder()
            .model(
                ModelDef::new("Post")
                    .attr("id", DataType::Integer)
                    .attr("title", DataType::String)
                    .attr("body", DataType::String),
            )
            .build()
            .unwrap()
            .model("Post")
            .unwrap()
    }

    #[test]
    fn test_no_selection() {
        assert_eq!(select_attributes(&post(), "").unwrap(), None);
    }

    #[test]
    fn test_selection_dedups_in_order() {
        let selected = select_attributes(&post(), "title,id,title").unwrap().unwrap();
        assert_eq!(selected, vec!["title", "id"]);
    }

    #[test]
    fn test_unknown_attribute() {
        let err = select_attributes(&post(), "title,secret").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAttribute);
        assert_eq!(err.context.value.as_deref(), Some("secret"));
    }
}
