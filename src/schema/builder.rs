//! Schema definition, options and the plugin seam.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::field::FieldDef;
use super::node::SchemaNode;
use super::virtuals::VirtualDef;
use crate::document::options::{OutputKind, OutputOptions};
use crate::document::Document;
use crate::error::{Error, Result};

/// Field and virtual names: non-empty, no dots, no leading `$`.
static FIELD_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^.$][^.]*$").expect("valid regex"));

// ============================================================================
// SchemaOptions
// ============================================================================

/// Schema-wide behavior.
#[derive(Debug, Clone)]
pub struct SchemaOptions {
    /// Key holding the document id. `None` disables id generation.
    pub id_key: Option<String>,
    /// Key holding the version counter set on save. `None` disables it.
    pub version_key: Option<String>,
    /// Add an `id` virtual returning the document id as a string.
    pub id_virtual: bool,
    /// Drop input keys that are not declared in the schema.
    pub strict: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            id_key: Some("_id".to_string()),
            version_key: Some("__v".to_string()),
            id_virtual: true,
            strict: true,
        }
    }
}

// ============================================================================
// Plugin
// ============================================================================

/// Extension applied to a schema before it is registered as a model.
pub trait Plugin {
    type Options;

    fn apply(&self, schema: &mut Schema, options: Self::Options) -> Result<()>;
}

// ============================================================================
// Schema
// ============================================================================

/// Field declarations plus serialization options for one document type.
///
/// A schema is mutable until it is registered with a [`Store`](crate::store::Store);
/// afterwards it is shared read-only by every document of that model.
#[derive(Clone)]
pub struct Schema {
    fields: BTreeMap<String, FieldDef>,
    virtuals: Vec<VirtualDef>,
    options: SchemaOptions,
    to_json: OutputOptions,
    to_object: OutputOptions,
}

impl Schema {
    pub fn new(fields: BTreeMap<String, FieldDef>) -> Result<Self> {
        Self::with_options(fields, SchemaOptions::default())
    }

    pub fn with_options(fields: BTreeMap<String, FieldDef>, options: SchemaOptions) -> Result<Self> {
        validate_fields(&fields)?;

        let mut schema = Self {
            fields,
            virtuals: Vec::new(),
            options,
            to_json: OutputOptions::default(),
            to_object: OutputOptions::default(),
        };

        if schema.options.id_virtual && !schema.fields.contains_key("id") {
            if let Some(id_key) = schema.options.id_key.clone() {
                schema.virtuals.push(VirtualDef::new("id", move |doc: &Document| {
                    match doc.get(&id_key) {
                        Some(Value::String(s)) => Value::String(s.clone()),
                        Some(Value::Null) | None => Value::Null,
                        Some(other) => Value::String(other.to_string()),
                    }
                }));
            }
        }

        Ok(schema)
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldDef> {
        &self.fields
    }

    /// Look up a field by dotted path, descending into nested objects.
    pub fn field(&self, path: &str) -> Option<&FieldDef> {
        let mut fields = &self.fields;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let def = fields.get(segment)?;
            if segments.peek().is_none() {
                return Some(def);
            }
            match &def.node {
                SchemaNode::Object(inner) => fields = inner,
                _ => return None,
            }
        }
        None
    }

    /// Every declared path, nested objects flattened to dotted paths.
    /// Parents come before their children.
    pub fn paths(&self) -> Vec<(String, &FieldDef)> {
        let mut out = Vec::new();
        collect_paths(&self.fields, "", &mut out);
        out
    }

    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    pub fn virtuals(&self) -> &[VirtualDef] {
        &self.virtuals
    }

    /// Declare a virtual field. A later declaration with the same name
    /// replaces the earlier one.
    pub fn add_virtual(
        &mut self,
        name: &str,
        get: impl Fn(&Document) -> Value + Send + Sync + 'static,
    ) -> Result<&mut Self> {
        if !FIELD_NAME.is_match(name) {
            return Err(Error::InvalidFieldName(name.to_string()));
        }
        if self.fields.contains_key(name) {
            return Err(Error::Config(format!(
                "virtual \"{name}\" conflicts with a declared field"
            )));
        }
        self.virtuals.retain(|v| v.name != name);
        self.virtuals.push(VirtualDef::new(name, get));
        Ok(self)
    }

    pub fn output(&self, kind: OutputKind) -> &OutputOptions {
        match kind {
            OutputKind::Json => &self.to_json,
            OutputKind::Object => &self.to_object,
        }
    }

    pub fn output_mut(&mut self, kind: OutputKind) -> &mut OutputOptions {
        match kind {
            OutputKind::Json => &mut self.to_json,
            OutputKind::Object => &mut self.to_object,
        }
    }

    /// Replace the options for one output path, transform included.
    pub fn set_output(&mut self, kind: OutputKind, options: OutputOptions) -> &mut Self {
        *self.output_mut(kind) = options;
        self
    }

    pub fn plugin<P: Plugin>(&mut self, plugin: &P, options: P::Options) -> Result<&mut Self> {
        plugin.apply(self, options)?;
        Ok(self)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("fields", &self.fields)
            .field("virtuals", &self.virtuals)
            .field("options", &self.options)
            .field("to_json", &self.to_json)
            .field("to_object", &self.to_object)
            .finish()
    }
}

fn validate_fields(fields: &BTreeMap<String, FieldDef>) -> Result<()> {
    for (name, def) in fields {
        if !FIELD_NAME.is_match(name) {
            return Err(Error::InvalidFieldName(name.clone()));
        }
        if let SchemaNode::Object(inner) = &def.node {
            validate_fields(inner)?;
        }
    }
    Ok(())
}

fn collect_paths<'a>(
    fields: &'a BTreeMap<String, FieldDef>,
    prefix: &str,
    out: &mut Vec<(String, &'a FieldDef)>,
) {
    for (name, def) in fields {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        out.push((path.clone(), def));
        if let SchemaNode::Object(inner) = &def.node {
            collect_paths(inner, &path, out);
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Start a schema declaration.
pub fn schema() -> SchemaBuilder {
    SchemaBuilder {
        fields: BTreeMap::new(),
        options: SchemaOptions::default(),
    }
}

pub struct SchemaBuilder {
    fields: BTreeMap<String, FieldDef>,
    options: SchemaOptions,
}

impl SchemaBuilder {
    pub fn field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }

    pub fn options(mut self, options: SchemaOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<Schema> {
        Schema::with_options(self.fields, self.options)
    }
}
