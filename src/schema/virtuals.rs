use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::document::Document;

/// Computes a virtual field from the document it belongs to.
pub type VirtualGetter = Arc<dyn Fn(&Document) -> Value + Send + Sync>;

/// A computed field. Never stored; emitted only when the output path has
/// `virtuals` or `getters` enabled.
#[derive(Clone)]
pub struct VirtualDef {
    pub name: String,
    pub get: VirtualGetter,
}

impl VirtualDef {
    pub fn new(
        name: impl Into<String>,
        get: impl Fn(&Document) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            get: Arc::new(get),
        }
    }

    pub fn compute(&self, doc: &Document) -> Value {
        (self.get)(doc)
    }
}

impl fmt::Debug for VirtualDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualDef").field("name", &self.name).finish()
    }
}
