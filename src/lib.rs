//! Field-visibility rules for document serialization.
//!
//! Schemas declare fields as hidden (always, for JSON output only, for
//! object output only, or per document through a predicate). Attaching
//! [`HiddenPlugin`] composes the hiding step into the schema's
//! `to_json` / `to_object` transforms, ahead of any transform already
//! installed. Stored documents are never modified.

pub mod document;
pub mod error;
pub mod hidden;
pub mod schema;
pub mod store;

pub use document::{Document, OutputKind, OutputOptions, Populated, Transform};
pub use error::{BoxError, Error, Result};
pub use hidden::{HiddenOptions, HiddenPlugin, HideRule, VirtualRule};
pub use schema::{schema, t, FieldDef, Plugin, Schema, SchemaOptions};
pub use store::{Model, Store};
