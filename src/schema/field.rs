//! Per-field declarations: type, visibility rules, getter and default.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::node::SchemaNode;
use crate::hidden::HideRule;

/// Field getter, applied to the stored value when an output path has
/// `getters` enabled.
pub type Getter = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// A schema field declaration.
#[derive(Clone)]
pub struct FieldDef {
    pub node: SchemaNode,
    /// Hidden from both outputs.
    pub hide: Option<HideRule>,
    /// Hidden from JSON output only.
    pub hide_json: Option<HideRule>,
    /// Hidden from object output only.
    pub hide_object: Option<HideRule>,
    /// Value filled in when a new document omits the field.
    pub default: Option<Value>,
    pub get: Option<Getter>,
}

impl FieldDef {
    pub fn new(node: SchemaNode) -> Self {
        Self {
            node,
            hide: None,
            hide_json: None,
            hide_object: None,
            default: None,
            get: None,
        }
    }

    pub fn hide(mut self, rule: impl Into<HideRule>) -> Self {
        self.hide = Some(rule.into());
        self
    }

    pub fn hide_json(mut self, rule: impl Into<HideRule>) -> Self {
        self.hide_json = Some(rule.into());
        self
    }

    pub fn hide_object(mut self, rule: impl Into<HideRule>) -> Self {
        self.hide_object = Some(rule.into());
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn getter(mut self, get: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.get = Some(Arc::new(get));
        self
    }

    /// Whether any visibility rule is declared on this field.
    pub fn has_hide_rules(&self) -> bool {
        self.hide.is_some() || self.hide_json.is_some() || self.hide_object.is_some()
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("node", &self.node)
            .field("hide", &self.hide)
            .field("hide_json", &self.hide_json)
            .field("hide_object", &self.hide_object)
            .field("default", &self.default)
            .field("get", &self.get.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
