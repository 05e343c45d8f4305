//! Document validation.
//!
//! The validator walks every operation depth-first against the schema and
//! collects one diagnostic per problem it finds. Problems never stop the walk
//! except where there is no schema type left to check against: an operation
//! without a root type, a field the parent type does not have, a field whose
//! selection set contradicts its type, and a fragment on an unknown type.
//!
//! The parent type is threaded through every call. It is always a named
//! type, so fragment compatibility compares against the unwrapped field type.
//!
//! Validation also performs the one coercion that rewrites the document:
//! an `Int` literal passed where a `Float` is expected becomes a `Float`.

mod arguments;
mod coercion;
mod fragments;

use crate::introspection;
use crate::types::{FieldDef, Schema, TypeDef, UnionDef};
use sgql_core::{Diagnostic, DiagnosticBag};
use sgql_syntax::{
    Document, FieldSelection, FragmentTable, OperationDefinition, OperationType, Selection,
    SelectionSet,
};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::trace;

/// Validates a document, applying literal coercions in place.
///
/// Returns the diagnostics in traversal order. An empty list means the
/// document is valid.
pub fn validate(schema: &Schema, document: &mut Document) -> Vec<Diagnostic> {
    let CheckResult {
        diagnostics,
        coerces,
    } = Validator::new(schema, document).check();

    if coerces {
        coercion::widen_float_literals(schema, document);
    }
    diagnostics.into_vec()
}

/// Validates a document shared between requests.
///
/// The shared document is never mutated. When a coercion applies, the
/// returned handle points at a coerced copy; otherwise it is the same
/// allocation as the input.
pub fn validate_shared(schema: &Schema, document: &Arc<Document>) -> (Vec<Diagnostic>, Arc<Document>) {
    let CheckResult {
        diagnostics,
        coerces,
    } = Validator::new(schema, document).check();
    if !coerces {
        return (diagnostics.into_vec(), Arc::clone(document));
    }

    let mut owned = Document::clone(document);
    coercion::widen_float_literals(schema, &mut owned);
    (diagnostics.into_vec(), Arc::new(owned))
}

/// Result of checking a document.
struct CheckResult {
    diagnostics: DiagnosticBag,
    /// Some `Int` literal was passed where a `Float` is expected.
    coerces: bool,
}

/// Validator state for one document.
struct Validator<'a> {
    schema: &'a Schema,
    document: &'a Document,
    fragments: FragmentTable<'a>,
    diagnostics: DiagnosticBag,
    coerces: bool,
    /// Named fragments currently being expanded.
    spread_path: Vec<&'a str>,
}

impl<'a> Validator<'a> {
    fn new(schema: &'a Schema, document: &'a Document) -> Self {
        Self {
            schema,
            document,
            fragments: FragmentTable::new(document),
            diagnostics: DiagnosticBag::new(),
            coerces: false,
            spread_path: Vec::new(),
        }
    }

    fn check(mut self) -> CheckResult {
        for operation in self.document.operations() {
            self.check_operation(operation);
        }
        CheckResult {
            diagnostics: self.diagnostics,
            coerces: self.coerces,
        }
    }

    fn check_operation(&mut self, operation: &'a OperationDefinition) {
        let root_name = self.schema.root_type_name(operation.operation);
        let Some(root) = self.schema.get_type(root_name) else {
            self.diagnostics.error(
                format!("Schema is not configured for {}s.", operation.operation),
                operation.pos,
            );
            return;
        };

        trace!(
            operation = %operation.operation,
            name = operation.name.as_ref().map(|name| name.as_str()),
            root = root_name,
            "validating operation"
        );
        self.check_selection_set(&operation.selection_set, root);
    }

    fn check_selection_set(&mut self, set: &'a SelectionSet, parent: &'a TypeDef) {
        self.check_selections(&set.selections, parent);
    }

    fn check_selections(&mut self, selections: &'a [Selection], parent: &'a TypeDef) {
        for selection in selections {
            self.check_selection(selection, parent);
        }
    }

    fn check_selection(&mut self, selection: &'a Selection, parent: &'a TypeDef) {
        if let TypeDef::Union(union) = parent {
            self.check_union_selection(selection, union, parent);
            return;
        }

        match selection {
            Selection::Field(field) => self.check_field(field, parent),
            Selection::FragmentSpread(spread) => {
                // Dangling spreads are reported by the fragment table.
                if let Some(fragment) = self.fragments.get(spread.name.as_str()) {
                    self.check_fragment(
                        Some(fragment.name.as_str()),
                        fragment.type_condition.as_str(),
                        &fragment.selection_set,
                        spread.pos,
                        parent,
                    );
                }
            }
            Selection::InlineFragment(inline) => match &inline.type_condition {
                Some(condition) => self.check_fragment(
                    None,
                    condition.as_str(),
                    &inline.selection_set,
                    inline.pos,
                    parent,
                ),
                None => self.check_selection_set(&inline.selection_set, parent),
            },
        }
    }

    /// Union types have no fields of their own: only `__typename` and
    /// fragments on member types can be selected.
    fn check_union_selection(
        &mut self,
        selection: &'a Selection,
        union: &'a UnionDef,
        parent: &'a TypeDef,
    ) {
        match selection {
            Selection::Field(field) => self.check_field(field, parent),
            Selection::FragmentSpread(spread) => {
                if let Some(fragment) = self.fragments.get(spread.name.as_str()) {
                    self.check_union_member(
                        Some(fragment.name.as_str()),
                        fragment.type_condition.as_str(),
                        &fragment.selection_set,
                        spread.pos,
                        union,
                    );
                }
            }
            Selection::InlineFragment(inline) => match &inline.type_condition {
                Some(condition) => self.check_union_member(
                    None,
                    condition.as_str(),
                    &inline.selection_set,
                    inline.pos,
                    union,
                ),
                None => self.check_selection_set(&inline.selection_set, parent),
            },
        }
    }

    fn check_field(&mut self, field: &'a FieldSelection, parent: &'a TypeDef) {
        let Some(definition) = self.resolve_field(parent, field.name.as_str()) else {
            self.diagnostics.error(
                format!(
                    "Cannot query field \"{}\" on type \"{}\".",
                    field.name.value,
                    parent.name()
                ),
                field.pos,
            );
            return;
        };

        self.check_arguments(field, parent, &definition);

        let Some(field_type) = self.schema.get_type(definition.ty.named_type()) else {
            return;
        };

        let selections = field.selections();
        if field_type.has_subfields() {
            if selections.is_empty() {
                self.diagnostics.error(
                    format!(
                        "Field \"{name}\" of type \"{ty}\" must have a selection of subfields. \
                         Did you mean \"{name} {{ ... }}\"?",
                        name = field.name.value,
                        ty = definition.ty,
                    ),
                    field.pos,
                );
                return;
            }
            self.check_selections(selections, field_type);
        } else if !selections.is_empty() {
            self.diagnostics.error(
                format!(
                    "Field \"{}\" must not have a selection since type \"{}\" has no subfields.",
                    field.name.value, definition.ty
                ),
                field.pos,
            );
        }
    }

    /// Looks a field up on its parent, including meta-fields.
    fn resolve_field(&self, parent: &'a TypeDef, name: &str) -> Option<Cow<'a, FieldDef>> {
        let on_query_root = parent.name() == self.schema.root_type_name(OperationType::Query);
        if let Some(meta) = introspection::meta_field(name, on_query_root) {
            return Some(Cow::Owned(meta));
        }
        parent.field(name).map(Cow::Borrowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldDef, InputValueDef, ObjectDef, SchemaBuilder, TypeRef};
    use sgql_core::Pos;
    use sgql_syntax::builder::*;
    use sgql_syntax::Value;

    fn schema() -> Schema {
        SchemaBuilder::new()
            .add_type(
                ObjectDef::new("Query")
                    .field(FieldDef::new("dog", TypeRef::named("Dog")))
                    .field(
                        FieldDef::new("distance", TypeRef::named("Float"))
                            .argument(InputValueDef::new("scale", TypeRef::named("Float"))),
                    ),
            )
            .add_type(ObjectDef::new("Dog").field(FieldDef::new("name", TypeRef::named("String"))))
            .build()
    }

    #[test]
    fn test_missing_root_type_skips_body() {
        let mut document = document([mutation([field("bogus").into()]).at(1, 1).into()]);
        let diagnostics = validate(&schema(), &mut document);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Schema is not configured for mutations.");
        assert_eq!(diagnostics[0].locations, [Pos::new(1, 1)]);
    }

    #[test]
    fn test_coercion_is_applied_in_place() {
        let mut document = document([query([field("distance")
            .arg("scale", int(5).at(1, 18))
            .into()])
        .into()]);
        assert!(validate(&schema(), &mut document).is_empty());

        let operation = document.operations().next().unwrap();
        let Selection::Field(distance) = &operation.selection_set.selections[0] else {
            panic!("expected a field");
        };
        assert_eq!(distance.arguments[0].value, Value::Float(5.0, Pos::new(1, 18)));
    }

    #[test]
    fn test_coercion_targets_only_the_checked_literal() {
        // Same position on both literals; only the one passed as Float widens.
        let mut document = document([query([
            field("distance").arg("scale", int(2)).into(),
            field("dog")
                .select([field("name").into()])
                .arg("unknown", int(2))
                .into(),
        ])
        .into()]);
        let diagnostics = validate(&schema(), &mut document);
        assert_eq!(diagnostics.len(), 1);

        let operation = document.operations().next().unwrap();
        let values: Vec<_> = operation
            .selection_set
            .selections
            .iter()
            .filter_map(|selection| match selection {
                Selection::Field(field) => Some(field.arguments[0].value.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(values, [float(2.0), int(2)]);
    }

    #[test]
    fn test_shared_document_is_copied_only_when_coerced() {
        let schema = schema();

        let plain = Arc::new(document([query([field("dog")
            .select([field("name").into()])
            .into()])
        .into()]));
        let (diagnostics, checked) = validate_shared(&schema, &plain);
        assert!(diagnostics.is_empty());
        assert!(Arc::ptr_eq(&plain, &checked));

        let coerced = Arc::new(document([query([field("distance")
            .arg("scale", int(3))
            .into()])
        .into()]));
        let (diagnostics, checked) = validate_shared(&schema, &coerced);
        assert!(diagnostics.is_empty());
        assert!(!Arc::ptr_eq(&coerced, &checked));

        let scale = |document: &Document| {
            let operation = document.operations().next().unwrap();
            let Selection::Field(field) = &operation.selection_set.selections[0] else {
                panic!("expected a field");
            };
            field.arguments[0].value.clone()
        };
        assert_eq!(scale(coerced.as_ref()), int(3));
        assert_eq!(scale(checked.as_ref()), float(3.0));
    }

    #[test]
    fn test_coercion_reaches_spread_fragments_once() {
        let mut document = document([
            query([spread("measure").into(), spread("measure").into()]).into(),
            fragment(
                "measure",
                "Query",
                [field("distance").arg("scale", int(7)).into()],
            )
            .into(),
        ]);
        assert!(validate(&schema(), &mut document).is_empty());

        let fragment = document.fragments().next().unwrap();
        let Selection::Field(distance) = &fragment.selection_set.selections[0] else {
            panic!("expected a field");
        };
        assert_eq!(distance.arguments[0].value, float(7.0));
    }
}
