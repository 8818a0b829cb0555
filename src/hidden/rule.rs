use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::document::Document;
use crate::error::{BoxError, Error, Result};

/// Decides per document whether a field is hidden. Receives the source
/// document and the output mapping built so far.
pub type Predicate =
    Arc<dyn Fn(&Document, &Map<String, Value>) -> std::result::Result<bool, BoxError> + Send + Sync>;

/// Visibility rule declared on a field.
#[derive(Clone)]
pub enum HideRule {
    /// `true` hides; `false` has no effect.
    Always(bool),
    /// Hidden for documents where the predicate returns `true`.
    When(Predicate),
}

impl HideRule {
    /// Hide when `f` returns `true`.
    pub fn when(f: impl Fn(&Document, &Map<String, Value>) -> bool + Send + Sync + 'static) -> Self {
        HideRule::When(Arc::new(
            move |doc: &Document, ret: &Map<String, Value>| -> std::result::Result<bool, BoxError> {
                Ok(f(doc, ret))
            },
        ))
    }

    /// Hide when `f` returns `Ok(true)`. An `Err` fails the serialization
    /// call that evaluated it.
    pub fn try_when(
        f: impl Fn(&Document, &Map<String, Value>) -> std::result::Result<bool, BoxError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        HideRule::When(Arc::new(f))
    }

    pub fn evaluate(&self, path: &str, doc: &Document, ret: &Map<String, Value>) -> Result<bool> {
        match self {
            HideRule::Always(hidden) => Ok(*hidden),
            HideRule::When(predicate) => predicate(doc, ret).map_err(|source| Error::Predicate {
                path: path.to_string(),
                source,
            }),
        }
    }
}

impl From<bool> for HideRule {
    fn from(hidden: bool) -> Self {
        HideRule::Always(hidden)
    }
}

impl fmt::Debug for HideRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HideRule::Always(hidden) => f.debug_tuple("Always").field(hidden).finish(),
            HideRule::When(_) => f.write_str("When(<fn>)"),
        }
    }
}
