//! Argument materialisation.
//!
//! Root field arguments reach resolvers as JSON. Variables are substituted
//! from the request, falling back to the operation's declared defaults; a
//! variable with neither is left out.

use serde_json::{Map, Number, Value};
use sgql_syntax::{Argument, Value as Literal, VariableDefinition};

/// Converts field arguments to a JSON object.
pub fn materialize(
    arguments: &[Argument],
    variables: &Map<String, Value>,
    definitions: &[VariableDefinition],
) -> Map<String, Value> {
    arguments
        .iter()
        .filter_map(|argument| {
            let value = to_json(&argument.value, variables, definitions)?;
            Some((argument.name.value.clone(), value))
        })
        .collect()
}

/// Converts one literal to JSON. Returns `None` for an unbound variable.
pub fn to_json(
    literal: &Literal,
    variables: &Map<String, Value>,
    definitions: &[VariableDefinition],
) -> Option<Value> {
    let value = match literal {
        Literal::Variable(name) => return bound_variable(name.as_str(), variables, definitions),
        Literal::Int(value, _) => Value::from(*value),
        Literal::Float(value, _) => Number::from_f64(*value).map_or(Value::Null, Value::Number),
        Literal::String(value, _) => Value::String(value.clone()),
        Literal::Boolean(value, _) => Value::Bool(*value),
        Literal::Null(_) => Value::Null,
        Literal::Enum(name) => Value::String(name.value.clone()),
        Literal::List(items, _) => Value::Array(
            items
                .iter()
                .map(|item| to_json(item, variables, definitions).unwrap_or(Value::Null))
                .collect(),
        ),
        Literal::Object(fields, _) => Value::Object(
            fields
                .iter()
                .filter_map(|(name, value)| {
                    Some((name.value.clone(), to_json(value, variables, definitions)?))
                })
                .collect(),
        ),
    };
    Some(value)
}

fn bound_variable(
    name: &str,
    variables: &Map<String, Value>,
    definitions: &[VariableDefinition],
) -> Option<Value> {
    if let Some(value) = variables.get(name) {
        return Some(value.clone());
    }
    let default = definitions
        .iter()
        .find(|definition| definition.name.as_str() == name)?
        .default_value
        .as_ref()?;
    to_json(default, &Map::new(), &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sgql_syntax::builder::*;
    use sgql_syntax::Selection;

    fn arguments(field: sgql_syntax::FieldSelection) -> Vec<Argument> {
        field.arguments
    }

    #[test]
    fn test_literals() {
        let args = arguments(
            field("f")
                .arg("int", int(1))
                .arg("float", float(1.5))
                .arg("text", string("hi"))
                .arg("flag", boolean(true))
                .arg("none", null())
                .arg("color", enum_value("RED"))
                .arg("list", list([int(1), int(2)]))
                .arg("point", object([("x", float(0.5))])),
        );
        let json = Value::Object(materialize(&args, &Map::new(), &[]));
        assert_eq!(
            json,
            json!({
                "int": 1,
                "float": 1.5,
                "text": "hi",
                "flag": true,
                "none": null,
                "color": "RED",
                "list": [1, 2],
                "point": { "x": 0.5 },
            })
        );
    }

    #[test]
    fn test_variables_and_defaults() {
        let operation = subscription(Vec::<Selection>::new())
            .variable("room", None)
            .variable("limit", Some(int(10)))
            .variable("since", None);
        let args = arguments(
            field("f")
                .arg("room", variable("room"))
                .arg("limit", variable("limit"))
                .arg("since", variable("since"))
                .arg("tags", list([variable("tag")])),
        );

        let mut variables = Map::new();
        variables.insert("room".to_string(), json!("general"));

        let json = Value::Object(materialize(&args, &variables, &operation.variables));
        assert_eq!(
            json,
            json!({ "room": "general", "limit": 10, "tags": [null] })
        );
    }
}
