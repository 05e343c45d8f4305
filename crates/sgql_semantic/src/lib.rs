//! Semantic analysis for sgql.
//!
//! This crate provides:
//! - `types`: The type system model a document is checked against
//! - `introspection`: Meta types and meta-fields every schema exposes
//! - `checker`: Document validation

pub mod checker;
pub mod introspection;
pub mod types;

pub use checker::{validate, validate_shared};
pub use types::{
    EnumDef, EnumValueDef, FieldDef, InputObjectDef, InputValueDef, InterfaceDef, ObjectDef,
    ScalarDef, Schema, SchemaBuilder, TypeDef, TypeKind, TypeRef, UnionDef,
};
