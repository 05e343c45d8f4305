//! Operation selection.

use crate::ast::{Document, OperationDefinition};
use sgql_core::Diagnostic;

/// Picks the operation a request asks for.
///
/// A document with a single operation runs it regardless of its name (unless
/// a different name was requested). Documents with several operations need an
/// `operationName` that matches one of them.
pub fn select_operation<'a>(
    document: &'a Document,
    operation_name: Option<&str>,
) -> Result<&'a OperationDefinition, Diagnostic> {
    let mut operations = document.operations();

    match operation_name {
        Some(wanted) => operations
            .find(|operation| operation.name.as_ref().is_some_and(|name| name.value == wanted))
            .ok_or_else(|| Diagnostic::new(format!("Unknown operation named \"{wanted}\"."))),
        None => {
            let first = operations
                .next()
                .ok_or_else(|| Diagnostic::new("No operation found"))?;
            if operations.next().is_some() {
                return Err(Diagnostic::new(
                    "Must provide operation name if query contains multiple operations",
                ));
            }
            Ok(first)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use sgql_core::Pos;

    fn operation(name: Option<&str>, line: u32) -> Definition {
        Definition::Operation(OperationDefinition {
            operation: OperationType::Subscription,
            name: name.map(|name| Name::new(name, Pos::new(line, 14))),
            variables: Vec::new(),
            selection_set: SelectionSet::default(),
            pos: Pos::new(line, 1),
        })
    }

    #[test]
    fn test_single_anonymous_operation() {
        let document = Document {
            definitions: vec![operation(None, 1)],
        };
        let selected = select_operation(&document, None).unwrap();
        assert_eq!(selected.pos, Pos::new(1, 1));
    }

    #[test]
    fn test_named_operation() {
        let document = Document {
            definitions: vec![operation(Some("A"), 1), operation(Some("B"), 3)],
        };
        let selected = select_operation(&document, Some("B")).unwrap();
        assert_eq!(selected.pos, Pos::new(3, 1));

        let err = select_operation(&document, Some("C")).unwrap_err();
        assert_eq!(err.message, "Unknown operation named \"C\".");
    }

    #[test]
    fn test_ambiguous_and_empty_documents() {
        let document = Document {
            definitions: vec![operation(Some("A"), 1), operation(Some("B"), 3)],
        };
        let err = select_operation(&document, None).unwrap_err();
        assert_eq!(
            err.message,
            "Must provide operation name if query contains multiple operations"
        );

        let err = select_operation(&Document::default(), None).unwrap_err();
        assert_eq!(err.message, "No operation found");
    }
}
