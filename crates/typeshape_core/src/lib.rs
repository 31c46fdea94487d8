//! Serializable schema model shared by the `typeshape` crates.
//!
//! - [`schema`] - JSON Schema nodes, references and OpenAPI components
//! - [`openapi`] - a minimal OpenAPI document to host generated components

pub mod openapi;
pub mod schema;

pub use schema::{Components, Reference, Schema, SchemaType};
