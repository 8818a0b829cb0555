//! Plugin configuration.
//!
//! Options can be built in code or deserialized from JSON using the same key
//! names the schema declarations use (`hide`, `hideJSON`, `hideObject`,
//! `defaultHidden`, `virtuals`). Every unset option falls back first to the
//! plugin's defaults, then to the built-in behavior.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::OutputKind;
use crate::error::{Error, Result};

// ============================================================================
// VirtualRule
// ============================================================================

/// Visibility override for a virtual (or any output) field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VirtualRule {
    #[serde(rename = "hide")]
    Hide,
    #[serde(rename = "hideJSON")]
    HideJson,
    #[serde(rename = "hideObject")]
    HideObject,
}

impl VirtualRule {
    pub fn applies_to(self, kind: OutputKind) -> bool {
        match self {
            VirtualRule::Hide => true,
            VirtualRule::HideJson => kind == OutputKind::Json,
            VirtualRule::HideObject => kind == OutputKind::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VirtualRule::Hide => "hide",
            VirtualRule::HideJson => "hideJSON",
            VirtualRule::HideObject => "hideObject",
        }
    }
}

impl FromStr for VirtualRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hide" => Ok(VirtualRule::Hide),
            "hideJSON" => Ok(VirtualRule::HideJson),
            "hideObject" => Ok(VirtualRule::HideObject),
            other => Err(Error::Config(format!(
                "unknown virtual rule \"{other}\" (expected hide, hideJSON or hideObject)"
            ))),
        }
    }
}

impl fmt::Display for VirtualRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// HiddenOptions
// ============================================================================

/// Options for [`HiddenPlugin`](super::HiddenPlugin).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HiddenOptions {
    /// Master switch for both output paths. Default `true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide: Option<bool>,
    /// Switch for the JSON path. Default `true`.
    #[serde(rename = "hideJSON", skip_serializing_if = "Option::is_none")]
    pub hide_json: Option<bool>,
    /// Switch for the object path. Default `true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_object: Option<bool>,
    /// Replaces the default-hidden table wholesale. When unset, the schema's
    /// id and version keys are hidden.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_hidden: Option<BTreeMap<String, bool>>,
    /// Overrides for virtual fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtuals: Option<BTreeMap<String, VirtualRule>>,
}

impl HiddenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON object. Unknown keys and unknown virtual
    /// rules are configuration errors.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn hide(mut self, enabled: bool) -> Self {
        self.hide = Some(enabled);
        self
    }

    pub fn hide_json(mut self, enabled: bool) -> Self {
        self.hide_json = Some(enabled);
        self
    }

    pub fn hide_object(mut self, enabled: bool) -> Self {
        self.hide_object = Some(enabled);
        self
    }

    pub fn default_hidden<I, K>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        self.default_hidden = Some(entries.into_iter().map(|(k, v)| (k.into(), v)).collect());
        self
    }

    pub fn virtual_rule(mut self, name: impl Into<String>, rule: VirtualRule) -> Self {
        self.virtuals
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), rule);
        self
    }

    /// Fill every unset option from `base`.
    pub fn merged_over(&self, base: &HiddenOptions) -> HiddenOptions {
        HiddenOptions {
            hide: self.hide.or(base.hide),
            hide_json: self.hide_json.or(base.hide_json),
            hide_object: self.hide_object.or(base.hide_object),
            default_hidden: self
                .default_hidden
                .clone()
                .or_else(|| base.default_hidden.clone()),
            virtuals: self.virtuals.clone().or_else(|| base.virtuals.clone()),
        }
    }

    /// Whether hiding runs for `kind`.
    pub fn enabled_for(&self, kind: OutputKind) -> bool {
        let path = match kind {
            OutputKind::Json => self.hide_json,
            OutputKind::Object => self.hide_object,
        };
        self.hide.unwrap_or(true) && path.unwrap_or(true)
    }

    pub fn validate(&self) -> Result<()> {
        let default_names = self.default_hidden.iter().flat_map(|m| m.keys());
        let virtual_names = self.virtuals.iter().flat_map(|m| m.keys());
        for name in default_names.chain(virtual_names) {
            if name.is_empty() || name.split('.').any(str::is_empty) {
                return Err(Error::Config(format!("invalid field name \"{name}\"")));
            }
        }
        Ok(())
    }
}
