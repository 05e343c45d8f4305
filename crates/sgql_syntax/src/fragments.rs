//! Fragment table.
//!
//! Fragment spreads refer to definitions by name. The table resolves those
//! names and reports problems that belong to the document as a whole:
//! duplicate definitions, spreads of undefined fragments and spread cycles.
//! The validator only ever asks the table for a definition and treats a
//! missing one as "nothing to check here".

use crate::ast::{Document, FragmentDefinition, Selection, SelectionSet};
use rustc_hash::{FxHashMap, FxHashSet};
use sgql_core::{Diagnostic, DiagnosticBag};

/// Fragment definitions of one document, indexed by name.
#[derive(Debug, Default)]
pub struct FragmentTable<'a> {
    fragments: FxHashMap<&'a str, &'a FragmentDefinition>,
}

impl<'a> FragmentTable<'a> {
    /// Indexes the fragments of a document. The first definition of a name wins.
    pub fn new(document: &'a Document) -> Self {
        let mut fragments = FxHashMap::default();
        for fragment in document.fragments() {
            fragments.entry(fragment.name.as_str()).or_insert(fragment);
        }
        Self { fragments }
    }

    /// Indexes the fragments of a document and reports fragment-level problems.
    pub fn build(document: &'a Document) -> (Self, DiagnosticBag) {
        let table = Self::new(document);
        let mut diagnostics = DiagnosticBag::new();

        let mut seen = FxHashSet::default();
        for fragment in document.fragments() {
            if !seen.insert(fragment.name.as_str()) {
                diagnostics.error(
                    format!(
                        "There can be only one fragment named \"{}\".",
                        fragment.name.value
                    ),
                    fragment.name.pos,
                );
            }
        }

        for operation in document.operations() {
            table.report_unknown_spreads(&operation.selection_set, &mut diagnostics);
        }
        for fragment in document.fragments() {
            table.report_unknown_spreads(&fragment.selection_set, &mut diagnostics);
        }

        let mut reported = FxHashSet::default();
        for fragment in document.fragments() {
            let mut path = vec![fragment.name.as_str()];
            table.report_cycles(&fragment.selection_set, &mut path, &mut reported, &mut diagnostics);
        }

        (table, diagnostics)
    }

    /// Looks up a fragment definition by name.
    pub fn get(&self, name: &str) -> Option<&'a FragmentDefinition> {
        self.fragments.get(name).copied()
    }

    /// Returns the number of distinct fragment names.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns true if the document defines no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    fn report_unknown_spreads(&self, set: &SelectionSet, diagnostics: &mut DiagnosticBag) {
        for selection in &set.selections {
            match selection {
                Selection::Field(field) => {
                    if let Some(set) = &field.selection_set {
                        self.report_unknown_spreads(set, diagnostics);
                    }
                }
                Selection::FragmentSpread(spread) => {
                    if self.get(spread.name.as_str()).is_none() {
                        diagnostics.error(
                            format!("Unknown fragment \"{}\".", spread.name.value),
                            spread.pos,
                        );
                    }
                }
                Selection::InlineFragment(inline) => {
                    self.report_unknown_spreads(&inline.selection_set, diagnostics);
                }
            }
        }
    }

    fn report_cycles(
        &self,
        set: &'a SelectionSet,
        path: &mut Vec<&'a str>,
        reported: &mut FxHashSet<&'a str>,
        diagnostics: &mut DiagnosticBag,
    ) {
        for selection in &set.selections {
            match selection {
                Selection::Field(field) => {
                    if let Some(set) = &field.selection_set {
                        self.report_cycles(set, path, reported, diagnostics);
                    }
                }
                Selection::InlineFragment(inline) => {
                    self.report_cycles(&inline.selection_set, path, reported, diagnostics);
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.name.as_str();
                    if path.first() == Some(&name) {
                        if reported.insert(name) {
                            diagnostics.add(Diagnostic::at(
                                format!("Cannot spread fragment \"{name}\" within itself."),
                                spread.pos,
                            ));
                        }
                        continue;
                    }
                    if path.contains(&name) {
                        continue;
                    }
                    if let Some(fragment) = self.get(name) {
                        path.push(name);
                        self.report_cycles(&fragment.selection_set, path, reported, diagnostics);
                        path.pop();
                    }
                }
            }
        }
    }
}
