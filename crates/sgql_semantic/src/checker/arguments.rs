//! Argument and input value checks.

use super::Validator;
use crate::types::{EnumDef, FieldDef, InputValueDef, TypeDef, TypeRef};
use indexmap::IndexMap;
use sgql_syntax::{FieldSelection, Value};

impl<'a> Validator<'a> {
    /// Checks supplied arguments against the field's declared arguments.
    ///
    /// Unknown arguments are reported in query order, then missing required
    /// arguments in declaration order at the field's position.
    pub(super) fn check_arguments(
        &mut self,
        field: &'a FieldSelection,
        parent: &TypeDef,
        definition: &FieldDef,
    ) {
        let mut unsatisfied: IndexMap<&str, &InputValueDef> = definition
            .arguments
            .iter()
            .map(|(name, input)| (name.as_str(), input))
            .collect();

        for argument in &field.arguments {
            match definition.arguments.get(argument.name.as_str()) {
                Some(input) => {
                    unsatisfied.shift_remove(argument.name.as_str());
                    self.check_value(&argument.value, &input.ty);
                }
                None => self.diagnostics.error(
                    format!(
                        "Unknown argument \"{}\" on field \"{}.{}\".",
                        argument.name.value,
                        parent.name(),
                        field.name.value
                    ),
                    argument.pos,
                ),
            }
        }

        for (name, input) in unsatisfied {
            if input.is_required() {
                self.diagnostics.error(
                    format!(
                        "Field \"{}\" argument \"{}\" of type \"{}\" is required, but it was not provided.",
                        field.name.value, name, input.ty
                    ),
                    field.pos,
                );
            }
        }
    }

    fn check_value(&mut self, value: &'a Value, expected: &TypeRef) {
        match value {
            // Bound at execution time.
            Value::Variable(_) => {}
            Value::Null(pos) => {
                if expected.is_non_null() {
                    self.diagnostics.error(
                        format!("Expected value of type \"{expected}\", found null."),
                        *pos,
                    );
                }
            }
            _ => match expected.nullable() {
                TypeRef::Named(name) => self.check_named_value(value, name),
                TypeRef::List(item) => match value {
                    Value::List(items, _) => {
                        for item_value in items {
                            self.check_value(item_value, item);
                        }
                    }
                    // A single value is accepted where a list is expected.
                    single => self.check_value(single, item),
                },
                TypeRef::NonNull(inner) => self.check_value(value, inner),
            },
        }
    }

    fn check_named_value(&mut self, value: &'a Value, type_name: &str) {
        match self.schema.get_type(type_name) {
            Some(TypeDef::Enum(enum_def)) => self.check_enum_value(value, enum_def),
            Some(TypeDef::InputObject(_)) if matches!(value, Value::Object(..)) => {}
            _ => {
                if value.kind_name() == type_name {
                    return;
                }
                if type_name == "Float" && matches!(value, Value::Int(..)) {
                    self.coerces = true;
                    return;
                }
                self.diagnostics.error(
                    format!("{type_name} cannot represent non {type_name} value: {value}."),
                    value.pos(),
                );
            }
        }
    }

    fn check_enum_value(&mut self, value: &Value, enum_def: &EnumDef) {
        let Value::Enum(name) = value else {
            self.diagnostics.error(
                format!(
                    "Enum \"{}\" cannot represent non-enum value: \"{}\".",
                    enum_def.name,
                    value.literal_text()
                ),
                value.pos(),
            );
            return;
        };

        if !enum_def.has_value(name.as_str()) {
            self.diagnostics.error(
                format!(
                    "Value \"{}\" does not exist in \"{}\" enum.",
                    name.value, enum_def.name
                ),
                name.pos,
            );
        }
    }
}
