//! Diagnostic reporting for sgql.
//!
//! A [`Diagnostic`] is a single client-facing error: a message plus the
//! document positions it refers to. Validation collects them in a
//! [`DiagnosticBag`] in detection order and hands the whole batch back.

use crate::pos::Pos;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostic {
    /// Human-readable message.
    pub message: String,
    /// Positions this diagnostic points to. Empty for request-level errors.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub locations: Vec<Pos>,
}

impl Diagnostic {
    /// Creates a diagnostic without a location.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
        }
    }

    /// Creates a diagnostic pointing at a single position.
    pub fn at(message: impl Into<String>, pos: Pos) -> Self {
        Self::new(message).with_location(pos)
    }

    /// Adds a location to the diagnostic.
    #[must_use]
    pub fn with_location(mut self, pos: Pos) -> Self {
        self.locations.push(pos);
        self
    }

    /// Returns the primary location, if any.
    pub fn primary_location(&self) -> Option<Pos> {
        self.locations.first().copied()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.primary_location() {
            Some(pos) => write!(f, "{} ({pos})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// A collection of diagnostics, kept in insertion order.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    /// Creates a new empty diagnostic bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Adds an error at a position.
    pub fn error(&mut self, message: impl Into<String>, pos: Pos) {
        self.add(Diagnostic::at(message, pos));
    }

    /// Moves every diagnostic of `other` to the end of this bag.
    pub fn extend(&mut self, other: DiagnosticBag) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Returns an iterator over all diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Returns true if there are no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns the number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Consumes the bag, returning the diagnostics in detection order.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl From<Diagnostic> for DiagnosticBag {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_bag() {
        let mut bag = DiagnosticBag::new();
        assert!(bag.is_empty());

        bag.error("first", Pos::new(1, 1));
        bag.add(Diagnostic::new("second"));

        assert_eq!(bag.len(), 2);
        let messages: Vec<_> = bag.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["first", "second"]);
    }

    #[test]
    fn test_diagnostic_creation() {
        let diag = Diagnostic::at("Test", Pos::new(2, 5)).with_location(Pos::new(7, 1));

        assert_eq!(diag.primary_location(), Some(Pos::new(2, 5)));
        assert_eq!(diag.locations.len(), 2);
        assert_eq!(diag.to_string(), "Test (2:5)");
        assert_eq!(Diagnostic::new("bare").to_string(), "bare");
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut a = DiagnosticBag::from(Diagnostic::new("a"));
        let mut b = DiagnosticBag::new();
        b.add(Diagnostic::new("b"));
        b.add(Diagnostic::new("c"));
        a.extend(b);

        let messages: Vec<_> = a.into_iter().map(|d| d.message).collect();
        assert_eq!(messages, ["a", "b", "c"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_wire_shape() {
        let diag = Diagnostic::at("Cannot query field \"bogus\" on type \"Query\".", Pos::new(1, 3));
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "Cannot query field \"bogus\" on type \"Query\".",
                "locations": [{"line": 1, "column": 3}]
            })
        );

        let bare = serde_json::to_value(Diagnostic::new("Query not found")).unwrap();
        assert_eq!(bare, serde_json::json!({"message": "Query not found"}));
    }
}
