//! Core utilities for sgql.
//!
//! This crate provides foundational types used throughout sgql:
//! - `pos`: Source position tracking
//! - `diagnostics`: Error reporting

pub mod diagnostics;
pub mod pos;

pub use diagnostics::{Diagnostic, DiagnosticBag};
pub use pos::Pos;
