use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::debug;

use crate::document::{generate_id, Document};
use crate::error::{Error, Result};
use crate::schema::Schema;

struct ModelInner {
    name: String,
    schema: Arc<Schema>,
    /// Saved records in insertion order.
    records: RwLock<Vec<Map<String, Value>>>,
}

/// A registered schema with its saved documents. Clones share state.
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}

impl Model {
    pub(crate) fn new(name: &str, schema: Schema) -> Self {
        Self {
            inner: Arc::new(ModelInner {
                name: name.to_string(),
                schema: Arc::new(schema),
                records: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.inner.schema
    }

    /// Build a new, unsaved document.
    pub fn create(&self, data: Value) -> Result<Document> {
        Document::new(Arc::clone(&self.inner.schema), data)
    }

    /// Persist `doc`. On first save the version key is set to 0; later
    /// saves keep it and replace the stored record.
    pub fn save(&self, doc: &mut Document) -> Result<()> {
        if !Arc::ptr_eq(doc.schema(), &self.inner.schema) {
            return Err(Error::InvalidDocument(format!(
                "document does not belong to model \"{}\"",
                self.inner.name
            )));
        }

        let options = self.inner.schema.options();
        let id_key = options.id_key.clone();
        if let Some(key) = &id_key {
            let data = doc.data_mut();
            if data.get(key).map_or(true, Value::is_null) {
                data.insert(key.clone(), Value::String(generate_id()));
            }
        }
        if let Some(key) = &options.version_key {
            let data = doc.data_mut();
            if !data.contains_key(key) {
                data.insert(key.clone(), Value::from(0));
            }
        }

        let record = doc.data().clone();
        let id = doc.id().map(str::to_string);
        let mut records = self.inner.records.write();
        let existing = id.as_deref().and_then(|id| {
            let key = id_key.as_deref()?;
            records
                .iter()
                .position(|r| r.get(key).and_then(Value::as_str) == Some(id))
        });
        match existing {
            Some(index) => records[index] = record,
            None => records.push(record),
        }
        drop(records);

        doc.mark_saved();
        debug!(model = %self.inner.name, id = ?id, "document saved");
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> Option<Document> {
        let key = self.inner.schema.options().id_key.as_deref()?;
        self.inner
            .records
            .read()
            .iter()
            .find(|r| r.get(key).and_then(Value::as_str) == Some(id))
            .map(|r| Document::hydrate(Arc::clone(&self.inner.schema), r.clone()))
    }

    /// The first saved document.
    pub fn find_one(&self) -> Option<Document> {
        self.inner
            .records
            .read()
            .first()
            .map(|r| Document::hydrate(Arc::clone(&self.inner.schema), r.clone()))
    }

    pub fn find_all(&self) -> Vec<Document> {
        self.inner
            .records
            .read()
            .iter()
            .map(|r| Document::hydrate(Arc::clone(&self.inner.schema), r.clone()))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.inner.records.read().len()
    }
}
