//! In-memory model registry.
//!
//! Just enough persistence for documents to pick up their version key on
//! save and for reference paths to be populated with related documents.

mod model;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, warn};

use crate::document::{Document, Populated};
use crate::error::{Error, Result};
use crate::schema::Schema;

pub use model::Model;

/// Registry of models by name.
#[derive(Default)]
pub struct Store {
    models: RwLock<HashMap<String, Model>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `schema` under `name`. The schema is frozen from here on.
    pub fn model(&self, name: &str, schema: Schema) -> Result<Model> {
        let mut models = self.models.write();
        if models.contains_key(name) {
            return Err(Error::DuplicateModel(name.to_string()));
        }
        let model = Model::new(name, schema);
        models.insert(name.to_string(), model.clone());
        debug!(model = name, "model registered");
        Ok(model)
    }

    pub fn get_model(&self, name: &str) -> Result<Model> {
        self.models
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ModelNotFound(name.to_string()))
    }

    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Replace the reference id(s) at `path` with the referenced documents.
    ///
    /// Ids that do not resolve are left as they are. The stored data keeps
    /// the ids; only serialization sees the populated documents.
    pub fn populate(&self, doc: &mut Document, path: &str) -> Result<()> {
        let schema = Arc::clone(doc.schema());
        let field = schema
            .field(path)
            .ok_or_else(|| Error::UnknownPath(path.to_string()))?;
        let (model_name, many) = field
            .node
            .ref_model()
            .ok_or_else(|| Error::NotARef(path.to_string()))?;
        let target = self.get_model(model_name)?;

        let Some(value) = doc.get(path).cloned() else {
            return Ok(());
        };

        let populated = if many {
            let ids = match &value {
                Value::Array(items) => items,
                Value::Null => return Ok(()),
                other => {
                    return Err(Error::InvalidDocument(format!(
                        "expected an array of ids at \"{path}\", got {other}"
                    )))
                }
            };
            let mut found = Vec::with_capacity(ids.len());
            for id in ids {
                match id.as_str().and_then(|id| target.find_by_id(id)) {
                    Some(related) => found.push(related),
                    None => warn!(%path, %id, model = model_name, "reference not found"),
                }
            }
            Populated::Many(found)
        } else {
            let Some(id) = value.as_str() else {
                if !value.is_null() {
                    warn!(%path, id = %value, model = model_name, "reference not found");
                }
                return Ok(());
            };
            match target.find_by_id(id) {
                Some(related) => Populated::One(Box::new(related)),
                None => {
                    warn!(%path, id, model = model_name, "reference not found");
                    return Ok(());
                }
            }
        };

        doc.set_populated(path, populated);
        Ok(())
    }
}
