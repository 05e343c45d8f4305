//! Type system model.
//!
//! A `Schema` is an immutable set of named type definitions plus the names of
//! its root types. Validation only ever reads it, so a single schema can be
//! shared by any number of concurrent validations.

use crate::introspection;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use sgql_syntax::OperationType;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Names of the scalars every schema provides.
pub const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// Kind of a type, as reported by introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

impl TypeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::InputObject => "INPUT_OBJECT",
            Self::List => "LIST",
            Self::NonNull => "NON_NULL",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a type from a field or argument, with wrappers.
///
/// Serialized in SDL notation, e.g. `"[Dog!]!"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn list(inner: TypeRef) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn non_null(inner: TypeRef) -> Self {
        Self::NonNull(Box::new(inner))
    }

    /// Parses SDL notation such as `[String!]!`.
    pub fn parse(source: &str) -> Option<Self> {
        let source = source.trim();
        if let Some(inner) = source.strip_suffix('!') {
            let inner = Self::parse(inner)?;
            if matches!(inner, Self::NonNull(_)) {
                return None;
            }
            return Some(Self::non_null(inner));
        }
        if let Some(inner) = source.strip_prefix('[') {
            let inner = inner.strip_suffix(']')?;
            return Some(Self::list(Self::parse(inner)?));
        }
        let is_name = source
            .chars()
            .enumerate()
            .all(|(i, c)| c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()));
        (!source.is_empty() && is_name).then(|| Self::named(source))
    }

    /// The named type at the bottom of all wrappers.
    pub fn named_type(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::List(inner) | Self::NonNull(inner) => inner.named_type(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    /// Strips one non-null wrapper, if present.
    pub fn nullable(&self) -> &TypeRef {
        match self {
            Self::NonNull(inner) => inner,
            other => other,
        }
    }

    pub fn kind(&self) -> Option<TypeKind> {
        match self {
            Self::Named(_) => None,
            Self::List(_) => Some(TypeKind::List),
            Self::NonNull(_) => Some(TypeKind::NonNull),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

impl TryFrom<String> for TypeRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid type reference \"{value}\""))
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

/// A named type definition.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum TypeDef {
    Scalar(ScalarDef),
    Object(ObjectDef),
    Interface(InterfaceDef),
    Union(UnionDef),
    Enum(EnumDef),
    InputObject(InputObjectDef),
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(def) => &def.name,
            Self::Object(def) => &def.name,
            Self::Interface(def) => &def.name,
            Self::Union(def) => &def.name,
            Self::Enum(def) => &def.name,
            Self::InputObject(def) => &def.name,
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Scalar(_) => TypeKind::Scalar,
            Self::Object(_) => TypeKind::Object,
            Self::Interface(_) => TypeKind::Interface,
            Self::Union(_) => TypeKind::Union,
            Self::Enum(_) => TypeKind::Enum,
            Self::InputObject(_) => TypeKind::InputObject,
        }
    }

    /// Output fields of object and interface types.
    pub fn fields(&self) -> Option<&IndexMap<String, FieldDef>> {
        match self {
            Self::Object(def) => Some(&def.fields),
            Self::Interface(def) => Some(&def.fields),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields()?.get(name)
    }

    /// Returns true for types a selection set can be written against.
    pub fn has_subfields(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Interface(_) | Self::Union(_))
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self, Self::Interface(_) | Self::Union(_))
    }
}

impl From<ScalarDef> for TypeDef {
    fn from(def: ScalarDef) -> Self {
        Self::Scalar(def)
    }
}

impl From<ObjectDef> for TypeDef {
    fn from(def: ObjectDef) -> Self {
        Self::Object(def)
    }
}

impl From<InterfaceDef> for TypeDef {
    fn from(def: InterfaceDef) -> Self {
        Self::Interface(def)
    }
}

impl From<UnionDef> for TypeDef {
    fn from(def: UnionDef) -> Self {
        Self::Union(def)
    }
}

impl From<EnumDef> for TypeDef {
    fn from(def: EnumDef) -> Self {
        Self::Enum(def)
    }
}

impl From<InputObjectDef> for TypeDef {
    fn from(def: InputObjectDef) -> Self {
        Self::InputObject(def)
    }
}

/// Scalar type definition.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScalarDef {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
}

impl ScalarDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// Object type definition.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ObjectDef {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, FieldDef>,
    pub implements: Vec<String>,
}

impl ObjectDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
            implements: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.implements.push(interface.into());
        self
    }
}

// Fills keys missing from a decoded definition.
impl Default for ObjectDef {
    fn default() -> Self {
        Self::new("")
    }
}

/// Interface type definition.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct InterfaceDef {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, FieldDef>,
    pub implements: Vec<String>,
}

impl InterfaceDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
            implements: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
}

impl Default for InterfaceDef {
    fn default() -> Self {
        Self::new("")
    }
}

/// Union type definition.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnionDef {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    pub members: Vec<String>,
}

impl UnionDef {
    pub fn new<S: Into<String>>(name: impl Into<String>, members: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            description: None,
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|member| member == name)
    }
}

/// Enum type definition.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnumDef {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    pub values: Vec<EnumValueDef>,
}

impl EnumDef {
    pub fn new<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            description: None,
            values: values.into_iter().map(EnumValueDef::new).collect(),
        }
    }

    pub fn has_value(&self, name: &str) -> bool {
        self.values.iter().any(|value| value.name == name)
    }
}

/// Enum value definition.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct EnumValueDef {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub deprecated: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub deprecation_reason: Option<String>,
}

impl EnumValueDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            deprecated: false,
            deprecation_reason: None,
        }
    }
}

/// Input object type definition.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputObjectDef {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub fields: IndexMap<String, InputValueDef>,
}

impl InputObjectDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: InputValueDef) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
}

/// Output field definition.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct FieldDef {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub ty: TypeRef,
    #[cfg_attr(feature = "serde", serde(default))]
    pub arguments: IndexMap<String, InputValueDef>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub deprecated: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub deprecation_reason: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            arguments: IndexMap::new(),
            deprecated: false,
            deprecation_reason: None,
        }
    }

    #[must_use]
    pub fn argument(mut self, argument: InputValueDef) -> Self {
        self.arguments.insert(argument.name.clone(), argument);
        self
    }
}

/// Argument or input field definition.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct InputValueDef {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub ty: TypeRef,
    /// Default value in SDL notation.
    #[cfg_attr(feature = "serde", serde(default))]
    pub default_value: Option<String>,
}

impl InputValueDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            default_value: None,
        }
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Returns true if a request must supply this value.
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && self.default_value.is_none()
    }
}

/// A schema.
#[derive(Debug, Clone, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct Schema {
    pub query_type: Option<String>,
    pub mutation_type: Option<String>,
    pub subscription_type: Option<String>,
    pub types: IndexMap<String, TypeDef>,
}

impl Schema {
    /// Creates a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a type by name.
    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Returns all types.
    pub fn types(&self) -> impl Iterator<Item = (&String, &TypeDef)> {
        self.types.iter()
    }

    /// Name of the root type for an operation kind.
    ///
    /// Falls back to `Query`, `Mutation` and `Subscription` when the schema
    /// does not name one explicitly.
    pub fn root_type_name(&self, operation: OperationType) -> &str {
        let configured = match operation {
            OperationType::Query => &self.query_type,
            OperationType::Mutation => &self.mutation_type,
            OperationType::Subscription => &self.subscription_type,
        };
        configured.as_deref().unwrap_or(match operation {
            OperationType::Query => "Query",
            OperationType::Mutation => "Mutation",
            OperationType::Subscription => "Subscription",
        })
    }

    pub fn root_type(&self, operation: OperationType) -> Option<&TypeDef> {
        self.get_type(self.root_type_name(operation))
    }

    /// Object types a value of `def` can be at runtime.
    pub fn possible_types<'s>(&'s self, def: &'s TypeDef) -> Vec<&'s str> {
        match def {
            TypeDef::Object(object) => vec![object.name.as_str()],
            TypeDef::Union(union) => union.members.iter().map(String::as_str).collect(),
            TypeDef::Interface(interface) => self
                .types
                .values()
                .filter_map(|candidate| match candidate {
                    TypeDef::Object(object)
                        if object.implements.iter().any(|name| *name == interface.name) =>
                    {
                        Some(object.name.as_str())
                    }
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Returns true if some object could be of both types.
    pub fn types_overlap(&self, a: &TypeDef, b: &TypeDef) -> bool {
        if a.name() == b.name() {
            return true;
        }
        let a_types: FxHashSet<&str> = self.possible_types(a).into_iter().collect();
        self.possible_types(b)
            .into_iter()
            .any(|name| a_types.contains(name))
    }

    /// Registers built-in scalars and introspection types missing from a
    /// schema that was decoded rather than built.
    pub fn ensure_builtins(&mut self) {
        for name in BUILTIN_SCALARS {
            self.types
                .entry(name.to_string())
                .or_insert_with(|| TypeDef::Scalar(builtin_scalar(name)));
        }
        for def in introspection::meta_types() {
            self.types.entry(def.name().to_string()).or_insert(def);
        }
    }
}

fn builtin_scalar(name: &str) -> ScalarDef {
    ScalarDef {
        name: name.to_string(),
        description: Some(format!("Built-in {name} scalar")),
    }
}

/// Schema builder.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Creates a builder with the built-in scalars and introspection types.
    pub fn new() -> Self {
        let mut builder = Self::default();
        builder.schema.ensure_builtins();
        builder
    }

    /// Sets the query root type name.
    pub fn query_type(mut self, name: impl Into<String>) -> Self {
        self.schema.query_type = Some(name.into());
        self
    }

    /// Sets the mutation root type name.
    pub fn mutation_type(mut self, name: impl Into<String>) -> Self {
        self.schema.mutation_type = Some(name.into());
        self
    }

    /// Sets the subscription root type name.
    pub fn subscription_type(mut self, name: impl Into<String>) -> Self {
        self.schema.subscription_type = Some(name.into());
        self
    }

    /// Adds a type, replacing any type of the same name.
    pub fn add_type(mut self, type_def: impl Into<TypeDef>) -> Self {
        let type_def = type_def.into();
        self.schema.types.insert(type_def.name().to_string(), type_def);
        self
    }

    /// Builds the schema.
    pub fn build(self) -> Schema {
        self.schema
    }
}
