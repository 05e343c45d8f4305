//! Abstract Syntax Tree types for executable GraphQL documents.

use sgql_core::Pos;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A complete executable document.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Document {
    pub definitions: Vec<Definition>,
}

/// A top-level definition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Definition {
    Operation(OperationDefinition),
    Fragment(FragmentDefinition),
}

/// Type of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl OperationType {
    /// Returns the keyword used in documents.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation definition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OperationDefinition {
    pub operation: OperationType,
    pub name: Option<Name>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub variables: Vec<VariableDefinition>,
    pub selection_set: SelectionSet,
    pub pos: Pos,
}

/// Variable definition.
///
/// Only the default value matters at this layer; variable types are checked
/// by the request layer when variables are bound.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VariableDefinition {
    pub name: Name,
    #[cfg_attr(feature = "serde", serde(default))]
    pub default_value: Option<Value>,
    pub pos: Pos,
}

/// Fragment definition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FragmentDefinition {
    pub name: Name,
    pub type_condition: Name,
    pub selection_set: SelectionSet,
    pub pos: Pos,
}

/// Selection set.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectionSet {
    pub selections: Vec<Selection>,
    pub pos: Pos,
}

impl SelectionSet {
    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

/// Selection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Selection {
    Field(FieldSelection),
    FragmentSpread(FragmentSpread),
    InlineFragment(InlineFragment),
}

impl Selection {
    pub fn pos(&self) -> Pos {
        match self {
            Self::Field(field) => field.pos,
            Self::FragmentSpread(spread) => spread.pos,
            Self::InlineFragment(inline) => inline.pos,
        }
    }
}

/// Field selection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldSelection {
    #[cfg_attr(feature = "serde", serde(default))]
    pub alias: Option<Name>,
    pub name: Name,
    #[cfg_attr(feature = "serde", serde(default))]
    pub arguments: Vec<Argument>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub selection_set: Option<SelectionSet>,
    pub pos: Pos,
}

impl FieldSelection {
    /// Returns the key this field is reported under in a response.
    pub fn response_key(&self) -> &str {
        self.alias.as_ref().unwrap_or(&self.name).as_str()
    }

    /// Returns the sub-selections, empty for leaf selections.
    pub fn selections(&self) -> &[Selection] {
        match &self.selection_set {
            Some(set) => &set.selections,
            None => &[],
        }
    }
}

/// Fragment spread (`...Name`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FragmentSpread {
    pub name: Name,
    pub pos: Pos,
}

/// Inline fragment (`... on Type { }`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InlineFragment {
    #[cfg_attr(feature = "serde", serde(default))]
    pub type_condition: Option<Name>,
    pub selection_set: SelectionSet,
    pub pos: Pos,
}

/// Argument.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Argument {
    pub name: Name,
    pub value: Value,
    pub pos: Pos,
}

/// Value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    Variable(Name),
    Int(i64, Pos),
    Float(f64, Pos),
    String(String, Pos),
    Boolean(bool, Pos),
    Null(Pos),
    /// A bare identifier, such as an enum value.
    Enum(Name),
    List(Vec<Value>, Pos),
    Object(Vec<(Name, Value)>, Pos),
}

impl Value {
    pub fn pos(&self) -> Pos {
        match self {
            Self::Variable(name) | Self::Enum(name) => name.pos,
            Self::Int(_, pos)
            | Self::Float(_, pos)
            | Self::String(_, pos)
            | Self::Boolean(_, pos)
            | Self::Null(pos)
            | Self::List(_, pos)
            | Self::Object(_, pos) => *pos,
        }
    }

    /// Name of the type a literal is inferred to have on its own.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Variable(_) => "Variable",
            Self::Int(..) => "Int",
            Self::Float(..) => "Float",
            Self::String(..) => "String",
            Self::Boolean(..) => "Boolean",
            Self::Null(_) => "Null",
            Self::Enum(_) => "Enum",
            Self::List(..) => "List",
            Self::Object(..) => "Object",
        }
    }

    /// Returns true for bare-identifier tokens.
    pub const fn is_identifier(&self) -> bool {
        matches!(self, Self::Enum(_))
    }

    /// The literal's text without string quoting.
    pub fn literal_text(&self) -> String {
        match self {
            Self::String(value, _) => value.clone(),
            other => other.to_string(),
        }
    }

    /// Rewrites an integer literal as the equivalent float, in place.
    ///
    /// Returns false when the value is not an integer literal.
    #[allow(clippy::cast_precision_loss)]
    pub fn widen_to_float(&mut self) -> bool {
        if let Self::Int(value, pos) = *self {
            *self = Self::Float(value as f64, pos);
            true
        } else {
            false
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(name) => write!(f, "${}", name.value),
            Self::Int(value, _) => write!(f, "{value}"),
            Self::Float(value, _) => {
                if value.is_finite() && value.fract() == 0.0 {
                    write!(f, "{value:.1}")
                } else {
                    write!(f, "{value}")
                }
            }
            Self::String(value, _) => write_quoted(f, value),
            Self::Boolean(value, _) => write!(f, "{value}"),
            Self::Null(_) => f.write_str("null"),
            Self::Enum(name) => f.write_str(&name.value),
            Self::List(items, _) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Object(fields, _) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {value}", name.value)?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in value.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

/// Name with position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Name {
    pub value: String,
    pub pos: Pos,
}

impl Name {
    pub fn new(value: impl Into<String>, pos: Pos) -> Self {
        Self {
            value: value.into(),
            pos,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl Document {
    /// Returns all operation definitions in document order.
    pub fn operations(&self) -> impl Iterator<Item = &OperationDefinition> {
        self.definitions.iter().filter_map(|definition| match definition {
            Definition::Operation(operation) => Some(operation),
            Definition::Fragment(_) => None,
        })
    }

    /// Returns all fragment definitions in document order.
    pub fn fragments(&self) -> impl Iterator<Item = &FragmentDefinition> {
        self.definitions.iter().filter_map(|definition| match definition {
            Definition::Fragment(fragment) => Some(fragment),
            Definition::Operation(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(value: &str, line: u32, column: u32) -> Name {
        Name::new(value, Pos::new(line, column))
    }

    #[test]
    fn test_value_display() {
        let list = Value::List(
            vec![
                Value::Int(1, Pos::new(1, 2)),
                Value::Float(2.0, Pos::new(1, 5)),
                Value::Float(2.5, Pos::new(1, 10)),
                Value::String("a\"b".into(), Pos::new(1, 15)),
                Value::Enum(name("RED", 1, 22)),
                Value::Null(Pos::new(1, 27)),
                Value::Variable(name("id", 1, 33)),
            ],
            Pos::new(1, 1),
        );
        assert_eq!(list.to_string(), r#"[1, 2.0, 2.5, "a\"b", RED, null, $id]"#);

        let object = Value::Object(
            vec![(name("x", 1, 2), Value::Boolean(true, Pos::new(1, 5)))],
            Pos::new(1, 1),
        );
        assert_eq!(object.to_string(), "{x: true}");
    }

    #[test]
    fn test_literal_text() {
        assert_eq!(Value::String("abc".into(), Pos::new(1, 1)).literal_text(), "abc");
        assert_eq!(Value::Int(5, Pos::new(1, 1)).literal_text(), "5");
    }

    #[test]
    fn test_widen_to_float() {
        let mut value = Value::Int(5, Pos::new(1, 1));
        assert!(value.widen_to_float());
        assert_eq!(value, Value::Float(5.0, Pos::new(1, 1)));

        let mut value = Value::String("5".into(), Pos::new(1, 1));
        assert!(!value.widen_to_float());
    }

    #[test]
    fn test_response_key() {
        let mut field = FieldSelection {
            alias: None,
            name: name("dog", 1, 1),
            arguments: Vec::new(),
            selection_set: None,
            pos: Pos::new(1, 1),
        };
        assert_eq!(field.response_key(), "dog");
        field.alias = Some(name("pet", 1, 1));
        assert_eq!(field.response_key(), "pet");
        assert!(field.selections().is_empty());
    }
}
