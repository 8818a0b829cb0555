//! Field type tree for document schemas.

use std::collections::BTreeMap;

use super::field::FieldDef;

/// The declared type of a schema path.
///
/// Types are descriptive only: documents are not cast against them. They
/// matter where the serializer or the store needs to know the shape of a
/// path (nested objects for dotted paths, references for population).
#[derive(Debug, Clone)]
pub enum SchemaNode {
    String,
    Number,
    Boolean,
    Date,
    ObjectId,
    /// Any JSON value.
    Mixed,
    /// Reference to a document of the named model, stored as its id.
    Ref(String),
    /// Nested object with its own field declarations.
    Object(BTreeMap<String, FieldDef>),
    Array(Box<SchemaNode>),
}

impl SchemaNode {
    /// Model name when this node is a reference, or an array of references.
    pub fn ref_model(&self) -> Option<(&str, bool)> {
        match self {
            SchemaNode::Ref(model) => Some((model.as_str(), false)),
            SchemaNode::Array(inner) => match inner.as_ref() {
                SchemaNode::Ref(model) => Some((model.as_str(), true)),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Shorthand constructors for field declarations.
pub mod t {
    use std::collections::BTreeMap;

    use super::SchemaNode;
    use crate::schema::field::FieldDef;

    pub fn string() -> FieldDef {
        FieldDef::new(SchemaNode::String)
    }

    pub fn number() -> FieldDef {
        FieldDef::new(SchemaNode::Number)
    }

    pub fn boolean() -> FieldDef {
        FieldDef::new(SchemaNode::Boolean)
    }

    pub fn date() -> FieldDef {
        FieldDef::new(SchemaNode::Date)
    }

    pub fn object_id() -> FieldDef {
        FieldDef::new(SchemaNode::ObjectId)
    }

    pub fn mixed() -> FieldDef {
        FieldDef::new(SchemaNode::Mixed)
    }

    /// Reference to a document of `model`.
    pub fn reference(model: impl Into<String>) -> FieldDef {
        FieldDef::new(SchemaNode::Ref(model.into()))
    }

    pub fn object(fields: BTreeMap<String, FieldDef>) -> FieldDef {
        FieldDef::new(SchemaNode::Object(fields))
    }

    /// Array of `inner`. Hide declarations on `inner` are ignored; declare
    /// them on the returned field instead.
    pub fn array(inner: FieldDef) -> FieldDef {
        FieldDef::new(SchemaNode::Array(Box::new(inner.node)))
    }
}
