//! Fragment type compatibility.

use super::Validator;
use crate::types::{TypeDef, UnionDef};
use sgql_core::Pos;
use sgql_syntax::SelectionSet;

impl<'a> Validator<'a> {
    /// Checks a named or inline fragment under a non-union parent.
    ///
    /// An unknown type condition stops here. A known but incompatible one is
    /// reported and its body is still checked against the fragment's type.
    pub(super) fn check_fragment(
        &mut self,
        name: Option<&'a str>,
        type_condition: &'a str,
        body: &'a SelectionSet,
        pos: Pos,
        parent: &'a TypeDef,
    ) {
        let Some(fragment_type) = self.resolve_type_condition(type_condition, pos) else {
            return;
        };

        if !self.schema.types_overlap(fragment_type, parent) {
            self.report_incompatible(name, parent.name(), fragment_type.name(), pos);
        }
        self.check_fragment_body(name, body, fragment_type);
    }

    /// Checks a named or inline fragment under a union parent. Only the
    /// union's listed members are accepted.
    pub(super) fn check_union_member(
        &mut self,
        name: Option<&'a str>,
        type_condition: &'a str,
        body: &'a SelectionSet,
        pos: Pos,
        union: &'a UnionDef,
    ) {
        let Some(member) = self.resolve_type_condition(type_condition, pos) else {
            return;
        };

        if union.has_member(member.name()) {
            self.check_fragment_body(name, body, member);
        } else {
            self.report_incompatible(name, &union.name, member.name(), pos);
        }
    }

    fn resolve_type_condition(&mut self, type_condition: &str, pos: Pos) -> Option<&'a TypeDef> {
        let resolved = self.schema.get_type(type_condition);
        if resolved.is_none() {
            self.diagnostics
                .error(format!("Unknown type \"{type_condition}\"."), pos);
        }
        resolved
    }

    fn check_fragment_body(
        &mut self,
        name: Option<&'a str>,
        body: &'a SelectionSet,
        fragment_type: &'a TypeDef,
    ) {
        let Some(name) = name else {
            self.check_selection_set(body, fragment_type);
            return;
        };

        // Cycles are reported by the fragment table.
        if self.spread_path.contains(&name) {
            return;
        }
        self.spread_path.push(name);
        self.check_selection_set(body, fragment_type);
        self.spread_path.pop();
    }

    fn report_incompatible(
        &mut self,
        name: Option<&str>,
        parent: &str,
        fragment_type: &str,
        pos: Pos,
    ) {
        let subject = match name {
            Some(name) => format!("Fragment \"{name}\""),
            None => "Fragment".to_string(),
        };
        self.diagnostics.error(
            format!(
                "{subject} cannot be spread here as objects of type \"{parent}\" can never be of type \"{fragment_type}\"."
            ),
            pos,
        );
    }
}
