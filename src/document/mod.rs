//! Documents: schema-bound records and their JSON / object conversion.

pub mod options;
pub(crate) mod path;
mod serialize;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::{FieldDef, Schema, SchemaNode};

pub use options::{OutputKind, OutputOptions, Transform};
pub use serialize::MAX_DEPTH;

// ============================================================================
// Id generation
// ============================================================================

/// Generate a random document id (UUID v4).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ============================================================================
// Populated
// ============================================================================

/// Related documents resolved in place of stored reference ids.
#[derive(Debug, Clone)]
pub enum Populated {
    One(Box<Document>),
    Many(Vec<Document>),
}

// ============================================================================
// Document
// ============================================================================

/// A record bound to its schema.
///
/// The stored data is never modified by serialization: `to_json` and
/// `to_object` build fresh output mappings and run the schema's transforms
/// on those.
#[derive(Clone)]
pub struct Document {
    schema: Arc<Schema>,
    data: Map<String, Value>,
    /// path → resolved related document(s)
    populated: BTreeMap<String, Populated>,
    is_new: bool,
}

impl Document {
    /// Build a new, unsaved document from `data`.
    ///
    /// In strict schemas undeclared keys are dropped. Declared defaults fill
    /// missing fields, and an id is generated when the schema has an id key
    /// and `data` does not carry one.
    pub fn new(schema: Arc<Schema>, data: Value) -> Result<Self> {
        let input = match data {
            Value::Object(map) => map,
            other => {
                return Err(Error::InvalidDocument(format!(
                    "expected an object, got {other}"
                )))
            }
        };

        let options = schema.options();
        let mut out = Map::new();

        if let Some(id_key) = &options.id_key {
            let id = match input.get(id_key) {
                Some(v) if !v.is_null() => check_id(id_key, v)?,
                _ => Value::String(generate_id()),
            };
            out.insert(id_key.clone(), id);
        }

        for (key, mut value) in input {
            if out.contains_key(&key) {
                continue;
            }
            if options.strict {
                match schema.fields().get(&key) {
                    Some(def) => strip_undeclared(def, &key, &mut value),
                    None if is_meta_key(&schema, &key) => {}
                    None => {
                        debug!(field = %key, "dropping undeclared field");
                        continue;
                    }
                }
            }
            out.insert(key, value);
        }

        for (name, def) in schema.fields() {
            if let Some(default) = &def.default {
                if !out.contains_key(name) {
                    out.insert(name.clone(), default.clone());
                }
            }
        }

        Ok(Self {
            schema,
            data: out,
            populated: BTreeMap::new(),
            is_new: true,
        })
    }

    /// Rebuild a document from stored data.
    pub(crate) fn hydrate(schema: Arc<Schema>, data: Map<String, Value>) -> Self {
        Self {
            schema,
            data,
            populated: BTreeMap::new(),
            is_new: false,
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The stored data, with reference paths holding ids.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        path::get_path(&self.data, path)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        let key = self.schema.options().id_key.as_deref()?;
        self.get_str(key)
    }

    pub fn version(&self) -> Option<u64> {
        let key = self.schema.options().version_key.as_deref()?;
        self.get(key).and_then(Value::as_u64)
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Compute a virtual field by name.
    pub fn virtual_value(&self, name: &str) -> Option<Value> {
        self.schema
            .virtuals()
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.compute(self))
    }

    /// Set a stored value. Populated documents at `path` or below it are
    /// discarded.
    pub fn set(&mut self, path: &str, mut value: Value) -> Result<()> {
        if self.schema.options().id_key.as_deref() == Some(path) {
            value = check_id(path, &value)?;
        }
        if self.schema.options().strict && !is_meta_key(&self.schema, path) {
            let def = declared_field(&self.schema, path)
                .ok_or_else(|| Error::UnknownPath(path.to_string()))?;
            strip_undeclared(def, path, &mut value);
        }
        if !path::set_path(&mut self.data, path, value) {
            return Err(Error::InvalidDocument(format!(
                "cannot set \"{path}\" through a non-object value"
            )));
        }
        let nested = format!("{path}.");
        self.populated.retain(|populated, _| {
            populated.as_str() != path && !populated.starts_with(&nested)
        });
        Ok(())
    }

    pub fn populated(&self, path: &str) -> Option<&Populated> {
        self.populated.get(path)
    }

    pub fn is_populated(&self, path: &str) -> bool {
        self.populated.contains_key(path)
    }

    pub(crate) fn populated_entries(&self) -> impl Iterator<Item = (&String, &Populated)> {
        self.populated.iter()
    }

    pub(crate) fn set_populated(&mut self, path: &str, populated: Populated) {
        self.populated.insert(path.to_string(), populated);
    }

    pub(crate) fn data_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.data
    }

    pub(crate) fn mark_saved(&mut self) {
        self.is_new = false;
    }

    /// Convert to the JSON representation.
    pub fn to_json(&self) -> Result<Value> {
        self.to_output(OutputKind::Json)
    }

    /// Convert to the plain-object representation.
    pub fn to_object(&self) -> Result<Value> {
        self.to_output(OutputKind::Object)
    }

    pub fn to_output(&self, kind: OutputKind) -> Result<Value> {
        serialize::serialize(self, kind, 0)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("data", &self.data)
            .field("populated", &self.populated)
            .field("is_new", &self.is_new)
            .finish()
    }
}

fn is_meta_key(schema: &Schema, key: &str) -> bool {
    let options = schema.options();
    options.id_key.as_deref() == Some(key) || options.version_key.as_deref() == Some(key)
}

/// Ids are stored as strings; anything else would never match on lookup.
fn check_id(key: &str, value: &Value) -> Result<Value> {
    match value {
        Value::String(_) => Ok(value.clone()),
        other => Err(Error::InvalidDocument(format!(
            "\"{key}\" must be a string id, got {other}"
        ))),
    }
}

/// The declaration covering `path`. A path that runs past a declared
/// non-object field (a mixed value, say) is covered by that field.
fn declared_field<'a>(schema: &'a Schema, path: &str) -> Option<&'a FieldDef> {
    let mut fields = schema.fields();
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let def = fields.get(segment)?;
        match &def.node {
            SchemaNode::Object(inner) if segments.peek().is_some() => fields = inner,
            _ => return Some(def),
        }
    }
    None
}

/// Drop keys a nested object declaration does not know about.
fn strip_undeclared(def: &FieldDef, path: &str, value: &mut Value) {
    let (SchemaNode::Object(fields), Value::Object(map)) = (&def.node, value) else {
        return;
    };
    map.retain(|key, _| {
        let keep = fields.contains_key(key);
        if !keep {
            let dropped = format!("{path}.{key}");
            debug!(field = %dropped, "dropping undeclared field");
        }
        keep
    });
    for (key, inner) in map.iter_mut() {
        if let Some(inner_def) = fields.get(key) {
            strip_undeclared(inner_def, &format!("{path}.{key}"), inner);
        }
    }
}
