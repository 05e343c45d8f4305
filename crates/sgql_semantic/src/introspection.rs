//! Introspection meta types and meta-fields.
//!
//! `__typename`, `__schema` and `__type` are not declared by schema authors.
//! Their definitions are synthesized on lookup; the types they return are
//! registered with every schema so selections below them validate normally.

use crate::types::{EnumDef, FieldDef, InputValueDef, ObjectDef, TypeDef, TypeRef};

pub const TYPENAME: &str = "__typename";
pub const SCHEMA: &str = "__schema";
pub const TYPE: &str = "__type";

fn named(name: &str) -> TypeRef {
    TypeRef::named(name)
}

fn required(name: &str) -> TypeRef {
    TypeRef::non_null(TypeRef::named(name))
}

fn required_list(item: &str) -> TypeRef {
    TypeRef::non_null(TypeRef::list(required(item)))
}

fn list(item: &str) -> TypeRef {
    TypeRef::list(required(item))
}

/// `__typename: String!`, available on every composite type.
pub fn typename_field() -> FieldDef {
    FieldDef::new(TYPENAME, required("String"))
}

/// `__schema: __Schema!`, available on the query root.
pub fn schema_field() -> FieldDef {
    FieldDef::new(SCHEMA, required("__Schema"))
}

/// `__type(name: String!): __Type`, available on the query root.
pub fn type_field() -> FieldDef {
    FieldDef::new(TYPE, named("__Type")).argument(InputValueDef::new("name", required("String")))
}

/// Synthesizes a meta-field definition.
pub fn meta_field(name: &str, on_query_root: bool) -> Option<FieldDef> {
    match name {
        TYPENAME => Some(typename_field()),
        SCHEMA if on_query_root => Some(schema_field()),
        TYPE if on_query_root => Some(type_field()),
        _ => None,
    }
}

fn include_deprecated() -> InputValueDef {
    InputValueDef::new("includeDeprecated", named("Boolean")).default_value("false")
}

/// Type definitions backing the introspection meta-fields.
pub fn meta_types() -> Vec<TypeDef> {
    vec![
        ObjectDef::new("__Schema")
            .field(FieldDef::new("description", named("String")))
            .field(FieldDef::new("types", required_list("__Type")))
            .field(FieldDef::new("queryType", required("__Type")))
            .field(FieldDef::new("mutationType", named("__Type")))
            .field(FieldDef::new("subscriptionType", named("__Type")))
            .field(FieldDef::new("directives", required_list("__Directive")))
            .into(),
        ObjectDef::new("__Type")
            .field(FieldDef::new("kind", required("__TypeKind")))
            .field(FieldDef::new("name", named("String")))
            .field(FieldDef::new("description", named("String")))
            .field(FieldDef::new("specifiedByURL", named("String")))
            .field(FieldDef::new("fields", list("__Field")).argument(include_deprecated()))
            .field(FieldDef::new("interfaces", list("__Type")))
            .field(FieldDef::new("possibleTypes", list("__Type")))
            .field(FieldDef::new("enumValues", list("__EnumValue")).argument(include_deprecated()))
            .field(FieldDef::new("inputFields", list("__InputValue")).argument(include_deprecated()))
            .field(FieldDef::new("ofType", named("__Type")))
            .into(),
        ObjectDef::new("__Field")
            .field(FieldDef::new("name", required("String")))
            .field(FieldDef::new("description", named("String")))
            .field(FieldDef::new("args", required_list("__InputValue")).argument(include_deprecated()))
            .field(FieldDef::new("type", required("__Type")))
            .field(FieldDef::new("isDeprecated", required("Boolean")))
            .field(FieldDef::new("deprecationReason", named("String")))
            .into(),
        ObjectDef::new("__InputValue")
            .field(FieldDef::new("name", required("String")))
            .field(FieldDef::new("description", named("String")))
            .field(FieldDef::new("type", required("__Type")))
            .field(FieldDef::new("defaultValue", named("String")))
            .field(FieldDef::new("isDeprecated", required("Boolean")))
            .field(FieldDef::new("deprecationReason", named("String")))
            .into(),
        ObjectDef::new("__EnumValue")
            .field(FieldDef::new("name", required("String")))
            .field(FieldDef::new("description", named("String")))
            .field(FieldDef::new("isDeprecated", required("Boolean")))
            .field(FieldDef::new("deprecationReason", named("String")))
            .into(),
        ObjectDef::new("__Directive")
            .field(FieldDef::new("name", required("String")))
            .field(FieldDef::new("description", named("String")))
            .field(FieldDef::new("locations", required_list("__DirectiveLocation")))
            .field(FieldDef::new("args", required_list("__InputValue")).argument(include_deprecated()))
            .field(FieldDef::new("isRepeatable", required("Boolean")))
            .into(),
        EnumDef::new(
            "__TypeKind",
            [
                "SCALAR",
                "OBJECT",
                "INTERFACE",
                "UNION",
                "ENUM",
                "INPUT_OBJECT",
                "LIST",
                "NON_NULL",
            ],
        )
        .into(),
        EnumDef::new(
            "__DirectiveLocation",
            [
                "QUERY",
                "MUTATION",
                "SUBSCRIPTION",
                "FIELD",
                "FRAGMENT_DEFINITION",
                "FRAGMENT_SPREAD",
                "INLINE_FRAGMENT",
                "VARIABLE_DEFINITION",
                "SCHEMA",
                "SCALAR",
                "OBJECT",
                "FIELD_DEFINITION",
                "ARGUMENT_DEFINITION",
                "INTERFACE",
                "UNION",
                "ENUM",
                "ENUM_VALUE",
                "INPUT_OBJECT",
                "INPUT_FIELD_DEFINITION",
            ],
        )
        .into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typename_everywhere() {
        let field = meta_field(TYPENAME, false).unwrap();
        assert_eq!(field.ty.to_string(), "String!");
    }

    #[test]
    fn test_root_only_meta_fields() {
        assert!(meta_field(SCHEMA, false).is_none());
        assert!(meta_field(TYPE, false).is_none());

        assert_eq!(meta_field(SCHEMA, true).unwrap().ty.to_string(), "__Schema!");
        let ty = meta_field(TYPE, true).unwrap();
        assert_eq!(ty.ty.to_string(), "__Type");
        assert!(ty.arguments["name"].is_required());
    }

    #[test]
    fn test_meta_types_reference_each_other() {
        let types = meta_types();
        let names: Vec<_> = types.iter().map(TypeDef::name).collect();
        for def in &types {
            for field in def.fields().into_iter().flat_map(|fields| fields.values()) {
                let target = field.ty.named_type();
                assert!(
                    names.contains(&target) || ["String", "Boolean"].contains(&target),
                    "{}.{} points at unknown type {target}",
                    def.name(),
                    field.name
                );
            }
        }
    }
}
