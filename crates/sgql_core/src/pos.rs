//! Source position representation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::fmt;

/// A position in a query document, 1-based.
///
/// This is the shape reported to clients in the `locations` array of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pos {
    /// Line number (1-based).
    pub line: u32,
    /// Column number (1-based).
    pub column: u32,
}

impl Pos {
    /// Creates a new position.
    #[must_use]
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Returns true if this position was never set by a parser.
    #[must_use]
    #[inline]
    pub const fn is_unknown(&self) -> bool {
        self.line == 0
    }
}

impl From<(u32, u32)> for Pos {
    fn from((line, column): (u32, u32)) -> Self {
        Self::new(line, column)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_ordering() {
        let a = Pos::new(1, 10);
        let b = Pos::new(2, 1);
        assert!(a < b);
        assert!(Pos::new(1, 2) < Pos::new(1, 3));
    }

    #[test]
    fn test_pos_display() {
        assert_eq!(Pos::new(3, 14).to_string(), "3:14");
        assert!(Pos::default().is_unknown());
        assert!(!Pos::from((1, 1)).is_unknown());
    }
}
