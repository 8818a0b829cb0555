//! The `to_json` / `to_object` pipeline.
//!
//! Output is built in this order: stored data, field getters, populated
//! documents (each through its own schema), virtuals, then the schema's
//! transform for the requested path.

use serde_json::{Map, Value};

use super::options::OutputKind;
use super::path;
use super::{Document, Populated};
use crate::error::{Error, Result};

/// Maximum nesting of populated documents during serialization.
pub const MAX_DEPTH: usize = 100;

pub(crate) fn serialize(doc: &Document, kind: OutputKind, depth: usize) -> Result<Value> {
    if depth > MAX_DEPTH {
        return Err(Error::DepthExceeded(MAX_DEPTH));
    }

    let schema = doc.schema();
    let options = schema.output(kind);
    let mut ret = doc.data().clone();

    if options.getters {
        apply_getters(doc, &mut ret);
    }

    for (at, populated) in doc.populated_entries() {
        let value = match populated {
            Populated::One(nested) => serialize(nested, kind, depth + 1)?,
            Populated::Many(nested) => Value::Array(
                nested
                    .iter()
                    .map(|n| serialize(n, kind, depth + 1))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        path::set_path(&mut ret, at, value);
    }

    if options.includes_virtuals() {
        for def in schema.virtuals() {
            ret.insert(def.name.clone(), def.compute(doc));
        }
    }

    if let Some(transform) = &options.transform {
        transform(doc, &mut ret)?;
    }

    Ok(Value::Object(ret))
}

fn apply_getters(doc: &Document, ret: &mut Map<String, Value>) {
    for (at, def) in doc.schema().paths() {
        let Some(get) = &def.get else { continue };
        if doc.is_populated(&at) {
            continue;
        }
        if let Some(value) = path::get_path_mut(ret, &at) {
            *value = get(&*value);
        }
    }
}
