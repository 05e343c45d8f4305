//! Int to Float literal widening.
//!
//! Every definition is typed by itself: an operation by its root type and a
//! fragment by its type condition. Spreads are therefore not followed, and
//! each literal is visited once.

use crate::types::{Schema, TypeDef, TypeRef};
use sgql_syntax::{Definition, Document, Selection, Value};

/// Rewrites every `Int` literal passed where a `Float` is expected.
pub(super) fn widen_float_literals(schema: &Schema, document: &mut Document) {
    for definition in &mut document.definitions {
        let (parent, selections) = match definition {
            Definition::Operation(operation) => (
                schema.root_type(operation.operation),
                &mut operation.selection_set.selections,
            ),
            Definition::Fragment(fragment) => (
                schema.get_type(fragment.type_condition.as_str()),
                &mut fragment.selection_set.selections,
            ),
        };
        if let Some(parent) = parent {
            widen_selections(schema, selections, parent);
        }
    }
}

fn widen_selections(schema: &Schema, selections: &mut [Selection], parent: &TypeDef) {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                let Some(definition) = parent.field(field.name.as_str()) else {
                    continue;
                };
                for argument in &mut field.arguments {
                    if let Some(input) = definition.arguments.get(argument.name.as_str()) {
                        widen_value(&mut argument.value, &input.ty);
                    }
                }
                if let (Some(set), Some(field_type)) = (
                    &mut field.selection_set,
                    schema.get_type(definition.ty.named_type()),
                ) {
                    widen_selections(schema, &mut set.selections, field_type);
                }
            }
            Selection::InlineFragment(inline) => {
                let fragment_type = match &inline.type_condition {
                    Some(condition) => schema.get_type(condition.as_str()),
                    None => Some(parent),
                };
                if let Some(fragment_type) = fragment_type {
                    widen_selections(schema, &mut inline.selection_set.selections, fragment_type);
                }
            }
            Selection::FragmentSpread(_) => {}
        }
    }
}

fn widen_value(value: &mut Value, expected: &TypeRef) {
    match (expected.nullable(), value) {
        (TypeRef::Named(name), value) if name == "Float" => {
            value.widen_to_float();
        }
        (TypeRef::List(item), Value::List(items, _)) => {
            for item_value in items {
                widen_value(item_value, item);
            }
        }
        (TypeRef::List(item), single) => widen_value(single, item),
        (TypeRef::NonNull(inner), value) => widen_value(value, inner),
        _ => {}
    }
}
