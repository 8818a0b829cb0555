//! Field hiding for document serialization.
//!
//! Attach [`HiddenPlugin`] to a schema and fields declared with `hide`,
//! `hide_json` or `hide_object` are removed from `to_json` / `to_object`
//! output. The stored document is never changed.
//!
//! ```ignore
//! let mut s = schema()
//!     .field("name", t::string())
//!     .field("password", t::string().hide(true))
//!     .build()?;
//! s.plugin(&HiddenPlugin::new(), HiddenOptions::default())?;
//! ```

pub mod compose;
pub mod evaluator;
pub mod options;
pub mod rule;

use std::sync::Arc;

use tracing::debug;

use crate::document::OutputKind;
use crate::error::Result;
use crate::schema::{Plugin, Schema};

pub use compose::compose;
pub use evaluator::{builtin_default_hidden, HiddenRules};
pub use options::{HiddenOptions, VirtualRule};
pub use rule::{HideRule, Predicate};

/// Plugin installing the hiding step into a schema's output transforms.
///
/// The plugin carries its own defaults; options given when attaching take
/// precedence over them key by key, and `default_hidden` replaces the
/// default table as a whole.
#[derive(Debug, Clone, Default)]
pub struct HiddenPlugin {
    defaults: HiddenOptions,
}

impl HiddenPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: HiddenOptions) -> Result<Self> {
        defaults.validate()?;
        Ok(Self { defaults })
    }

    pub fn defaults(&self) -> &HiddenOptions {
        &self.defaults
    }
}

impl Plugin for HiddenPlugin {
    type Options = HiddenOptions;

    fn apply(&self, schema: &mut Schema, options: HiddenOptions) -> Result<()> {
        let options = options.merged_over(&self.defaults);
        options.validate()?;

        let rules = Arc::new(HiddenRules::resolve(schema, &options));
        for kind in OutputKind::ALL {
            if !rules.enabled_for(kind) {
                continue;
            }
            let output = schema.output_mut(kind);
            let original = output.transform.take();
            output.transform = Some(compose(Arc::clone(&rules), kind, original));
        }

        debug!(
            json = rules.enabled_for(OutputKind::Json),
            object = rules.enabled_for(OutputKind::Object),
            declared = rules.declared_paths(),
            default_hidden = rules.default_hidden().len(),
            virtuals = rules.virtuals().len(),
            "hidden plugin attached"
        );
        Ok(())
    }
}
