//! Composition of the hiding step with an existing transform.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::evaluator::HiddenRules;
use crate::document::{Document, OutputKind, Transform};

/// Wrap `original` so that hiding for `kind` always runs first and the
/// original transform then sees the filtered output.
///
/// A field the original transform writes back stays in the output.
pub fn compose(rules: Arc<HiddenRules>, kind: OutputKind, original: Option<Transform>) -> Transform {
    Arc::new(move |doc: &Document, ret: &mut Map<String, Value>| {
        rules.apply(kind, doc, ret)?;
        match &original {
            Some(transform) => transform(doc, ret),
            None => Ok(()),
        }
    })
}
