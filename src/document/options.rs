//! Per-output-path serialization options and the transform hook.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::Document;
use crate::error::{BoxError, Error, Result};

/// Which representation a document is being converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// `to_json`: the representation handed to JSON encoders.
    Json,
    /// `to_object`: the plain in-process mapping.
    Object,
}

impl OutputKind {
    pub const ALL: [OutputKind; 2] = [OutputKind::Json, OutputKind::Object];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Json => "json",
            OutputKind::Object => "object",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rewrites the output mapping after it has been built from the document.
pub type Transform = Arc<dyn Fn(&Document, &mut Map<String, Value>) -> Result<()> + Send + Sync>;

/// Options for one output path.
#[derive(Clone, Default)]
pub struct OutputOptions {
    /// Include virtual fields.
    pub virtuals: bool,
    /// Apply field getters. Also includes virtual fields.
    pub getters: bool,
    pub transform: Option<Transform>,
}

impl OutputOptions {
    pub fn with_virtuals(mut self, virtuals: bool) -> Self {
        self.virtuals = virtuals;
        self
    }

    pub fn with_getters(mut self, getters: bool) -> Self {
        self.getters = getters;
        self
    }

    /// Install an infallible transform.
    pub fn with_transform(
        mut self,
        f: impl Fn(&Document, &mut Map<String, Value>) + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Arc::new(move |doc: &Document, ret: &mut Map<String, Value>| -> Result<()> {
            f(doc, ret);
            Ok(())
        }));
        self
    }

    /// Install a transform that may fail. Its error surfaces from
    /// serialization as [`Error::Transform`].
    pub fn with_try_transform(
        mut self,
        f: impl Fn(&Document, &mut Map<String, Value>) -> std::result::Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.transform = Some(Arc::new(move |doc: &Document, ret: &mut Map<String, Value>| {
            f(doc, ret).map_err(Error::Transform)
        }));
        self
    }

    pub(crate) fn includes_virtuals(&self) -> bool {
        self.virtuals || self.getters
    }
}

impl fmt::Debug for OutputOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputOptions")
            .field("virtuals", &self.virtuals)
            .field("getters", &self.getters)
            .field("transform", &self.transform.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
