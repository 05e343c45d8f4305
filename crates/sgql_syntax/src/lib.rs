//! Document model for sgql.
//!
//! The parser lives outside this workspace; it produces the types in this
//! crate, which the validator and the subscription runtime consume.
//!
//! - `ast`: Operations, selections, fragments, arguments and values
//! - `builder`: Programmatic document construction
//! - `fragments`: Fragment table and fragment-level diagnostics
//! - `operation`: Picking the operation to run from a document

pub mod ast;
pub mod builder;
pub mod fragments;
pub mod operation;

pub use ast::*;
pub use fragments::FragmentTable;
pub use operation::select_operation;
