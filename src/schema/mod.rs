pub mod builder;
pub mod field;
pub mod node;
pub mod virtuals;

pub use builder::{schema, Plugin, Schema, SchemaBuilder, SchemaOptions};
pub use field::{FieldDef, Getter};
pub use node::{t, SchemaNode};
pub use virtuals::{VirtualDef, VirtualGetter};
