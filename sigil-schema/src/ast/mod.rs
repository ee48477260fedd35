//! Abstract Syntax Tree (AST) types for extracted models.
//!
//! This module contains the types that describe an annotated data model after
//! extraction: models, their fields, declared types and validation annotations.

mod annotation;
mod field;
mod model;
mod types;

pub use annotation::*;
pub use field::*;
pub use model::*;
pub use types::*;
