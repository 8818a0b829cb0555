//! Resolved visibility rules for one schema.
//!
//! Built once when the plugin is attached and shared read-only by every
//! serialization of that schema's documents.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::trace;

use super::options::{HiddenOptions, VirtualRule};
use super::rule::HideRule;
use crate::document::path::{contains_path, remove_path};
use crate::document::{Document, OutputKind};
use crate::error::Result;
use crate::schema::Schema;

/// Rules declared on one schema path.
#[derive(Debug, Clone)]
struct PathRules {
    path: String,
    hide: Option<HideRule>,
    hide_json: Option<HideRule>,
    hide_object: Option<HideRule>,
}

impl PathRules {
    fn for_kind(&self, kind: OutputKind) -> Option<&HideRule> {
        match kind {
            OutputKind::Json => self.hide_json.as_ref(),
            OutputKind::Object => self.hide_object.as_ref(),
        }
    }
}

/// Immutable rule tables plus the per-path switches.
#[derive(Debug, Clone)]
pub struct HiddenRules {
    paths: Vec<PathRules>,
    default_hidden: BTreeMap<String, bool>,
    virtuals: BTreeMap<String, VirtualRule>,
    json: bool,
    object: bool,
}

impl HiddenRules {
    /// Resolve `options` against `schema`. `options` must already be merged
    /// with the plugin defaults.
    pub fn resolve(schema: &Schema, options: &HiddenOptions) -> Self {
        let paths = schema
            .paths()
            .into_iter()
            .filter(|(_, def)| def.has_hide_rules())
            .map(|(path, def)| PathRules {
                path,
                hide: def.hide.clone(),
                hide_json: def.hide_json.clone(),
                hide_object: def.hide_object.clone(),
            })
            .collect();

        let default_hidden = options
            .default_hidden
            .clone()
            .unwrap_or_else(|| builtin_default_hidden(schema));

        Self {
            paths,
            default_hidden,
            virtuals: options.virtuals.clone().unwrap_or_default(),
            json: options.enabled_for(OutputKind::Json),
            object: options.enabled_for(OutputKind::Object),
        }
    }

    pub fn enabled_for(&self, kind: OutputKind) -> bool {
        match kind {
            OutputKind::Json => self.json,
            OutputKind::Object => self.object,
        }
    }

    pub fn default_hidden(&self) -> &BTreeMap<String, bool> {
        &self.default_hidden
    }

    pub fn virtuals(&self) -> &BTreeMap<String, VirtualRule> {
        &self.virtuals
    }

    /// Number of schema paths carrying their own rules.
    pub fn declared_paths(&self) -> usize {
        self.paths.len()
    }

    /// Remove every field of `ret` that is hidden for `kind`.
    ///
    /// Default-hidden keys go first, then declared paths in schema order,
    /// then virtual overrides. Predicates see `ret` as it stands when they
    /// run. A failing predicate aborts with the output partially filtered;
    /// the caller discards it.
    pub fn apply(&self, kind: OutputKind, doc: &Document, ret: &mut Map<String, Value>) -> Result<()> {
        if !self.enabled_for(kind) {
            return Ok(());
        }

        for (path, hidden) in &self.default_hidden {
            if *hidden && remove_path(ret, path).is_some() {
                trace!(%path, %kind, "hid default field");
            }
        }

        for rules in &self.paths {
            if !contains_path(ret, &rules.path) {
                continue;
            }
            if self.is_hidden(rules, kind, doc, ret)? {
                remove_path(ret, &rules.path);
                trace!(path = %rules.path, %kind, "hid field");
            }
        }

        for (name, rule) in &self.virtuals {
            if rule.applies_to(kind) && remove_path(ret, name).is_some() {
                trace!(path = %name, %kind, rule = %rule, "hid virtual");
            }
        }

        Ok(())
    }

    fn is_hidden(
        &self,
        rules: &PathRules,
        kind: OutputKind,
        doc: &Document,
        ret: &Map<String, Value>,
    ) -> Result<bool> {
        for rule in rules.hide.iter().chain(rules.for_kind(kind)) {
            if rule.evaluate(&rules.path, doc, ret)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// The schema's id and version keys.
pub fn builtin_default_hidden(schema: &Schema) -> BTreeMap<String, bool> {
    let options = schema.options();
    options
        .id_key
        .iter()
        .chain(options.version_key.iter())
        .map(|key| (key.clone(), true))
        .collect()
}
