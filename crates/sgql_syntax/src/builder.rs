//! Programmatic construction of documents.
//!
//! Parsers, code generators and tests build documents through these helpers
//! instead of spelling out every node. Positions default to the unknown
//! position and can be set with `at(line, column)`.
//!
//! ```
//! use sgql_syntax::builder::*;
//!
//! let document = document([
//!     subscription([field("newMessage")
//!         .arg("room", string("general"))
//!         .select([field("body").into()])
//!         .into()])
//!     .named("OnMessage")
//!     .into(),
//! ]);
//! assert_eq!(document.operations().count(), 1);
//! ```

use crate::ast::*;
use sgql_core::Pos;

/// Creates a document from definitions.
pub fn document(definitions: impl IntoIterator<Item = Definition>) -> Document {
    Document {
        definitions: definitions.into_iter().collect(),
    }
}

fn operation(
    operation: OperationType,
    selections: impl IntoIterator<Item = Selection>,
) -> OperationDefinition {
    OperationDefinition {
        operation,
        name: None,
        variables: Vec::new(),
        selection_set: selection_set(selections),
        pos: Pos::default(),
    }
}

fn selection_set(selections: impl IntoIterator<Item = Selection>) -> SelectionSet {
    SelectionSet {
        selections: selections.into_iter().collect(),
        pos: Pos::default(),
    }
}

/// Creates an anonymous query.
pub fn query(selections: impl IntoIterator<Item = Selection>) -> OperationDefinition {
    operation(OperationType::Query, selections)
}

/// Creates an anonymous mutation.
pub fn mutation(selections: impl IntoIterator<Item = Selection>) -> OperationDefinition {
    operation(OperationType::Mutation, selections)
}

/// Creates an anonymous subscription.
pub fn subscription(selections: impl IntoIterator<Item = Selection>) -> OperationDefinition {
    operation(OperationType::Subscription, selections)
}

impl OperationDefinition {
    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(Name::new(name, self.pos));
        self
    }

    /// Declares a variable, optionally with a default value.
    #[must_use]
    pub fn variable(mut self, name: &str, default_value: Option<Value>) -> Self {
        self.variables.push(VariableDefinition {
            name: Name::new(name, Pos::default()),
            default_value,
            pos: Pos::default(),
        });
        self
    }

    #[must_use]
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.pos = Pos::new(line, column);
        self
    }
}

/// Creates a field selection without arguments or sub-selections.
pub fn field(name: &str) -> FieldSelection {
    FieldSelection {
        alias: None,
        name: Name::new(name, Pos::default()),
        arguments: Vec::new(),
        selection_set: None,
        pos: Pos::default(),
    }
}

impl FieldSelection {
    #[must_use]
    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(Name::new(alias, self.pos));
        self
    }

    /// Adds an argument. The argument is reported at its value's position.
    #[must_use]
    pub fn arg(mut self, name: &str, value: Value) -> Self {
        let pos = value.pos();
        self.arguments.push(Argument {
            name: Name::new(name, pos),
            value,
            pos,
        });
        self
    }

    /// Sets the sub-selections.
    #[must_use]
    pub fn select(mut self, selections: impl IntoIterator<Item = Selection>) -> Self {
        self.selection_set = Some(selection_set(selections));
        self
    }

    #[must_use]
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.pos = Pos::new(line, column);
        self.name.pos = self.pos;
        self
    }
}

/// Creates a named fragment spread.
pub fn spread(name: &str) -> FragmentSpread {
    FragmentSpread {
        name: Name::new(name, Pos::default()),
        pos: Pos::default(),
    }
}

impl FragmentSpread {
    #[must_use]
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.pos = Pos::new(line, column);
        self
    }
}

/// Creates an inline fragment.
pub fn inline(
    type_condition: Option<&str>,
    selections: impl IntoIterator<Item = Selection>,
) -> InlineFragment {
    InlineFragment {
        type_condition: type_condition.map(|name| Name::new(name, Pos::default())),
        selection_set: selection_set(selections),
        pos: Pos::default(),
    }
}

impl InlineFragment {
    #[must_use]
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.pos = Pos::new(line, column);
        self
    }
}

/// Creates a fragment definition.
pub fn fragment(
    name: &str,
    type_condition: &str,
    selections: impl IntoIterator<Item = Selection>,
) -> FragmentDefinition {
    FragmentDefinition {
        name: Name::new(name, Pos::default()),
        type_condition: Name::new(type_condition, Pos::default()),
        selection_set: selection_set(selections),
        pos: Pos::default(),
    }
}

impl FragmentDefinition {
    #[must_use]
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.pos = Pos::new(line, column);
        self.name.pos = self.pos;
        self
    }
}

pub fn int(value: i64) -> Value {
    Value::Int(value, Pos::default())
}

pub fn float(value: f64) -> Value {
    Value::Float(value, Pos::default())
}

pub fn string(value: &str) -> Value {
    Value::String(value.to_string(), Pos::default())
}

pub fn boolean(value: bool) -> Value {
    Value::Boolean(value, Pos::default())
}

pub fn null() -> Value {
    Value::Null(Pos::default())
}

/// Creates a bare identifier value.
pub fn enum_value(name: &str) -> Value {
    Value::Enum(Name::new(name, Pos::default()))
}

pub fn variable(name: &str) -> Value {
    Value::Variable(Name::new(name, Pos::default()))
}

pub fn list(items: impl IntoIterator<Item = Value>) -> Value {
    Value::List(items.into_iter().collect(), Pos::default())
}

pub fn object<'n>(fields: impl IntoIterator<Item = (&'n str, Value)>) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(name, value)| (Name::new(name, Pos::default()), value))
            .collect(),
        Pos::default(),
    )
}

impl Value {
    /// Moves the value to a position.
    #[must_use]
    pub fn at(mut self, line: u32, column: u32) -> Self {
        let new_pos = Pos::new(line, column);
        match &mut self {
            Self::Variable(name) | Self::Enum(name) => name.pos = new_pos,
            Self::Int(_, pos)
            | Self::Float(_, pos)
            | Self::String(_, pos)
            | Self::Boolean(_, pos)
            | Self::Null(pos)
            | Self::List(_, pos)
            | Self::Object(_, pos) => *pos = new_pos,
        }
        self
    }
}

impl From<FieldSelection> for Selection {
    fn from(field: FieldSelection) -> Self {
        Self::Field(field)
    }
}

impl From<FragmentSpread> for Selection {
    fn from(spread: FragmentSpread) -> Self {
        Self::FragmentSpread(spread)
    }
}

impl From<InlineFragment> for Selection {
    fn from(inline: InlineFragment) -> Self {
        Self::InlineFragment(inline)
    }
}

impl From<OperationDefinition> for Definition {
    fn from(operation: OperationDefinition) -> Self {
        Self::Operation(operation)
    }
}

impl From<FragmentDefinition> for Definition {
    fn from(fragment: FragmentDefinition) -> Self {
        Self::Fragment(fragment)
    }
}
