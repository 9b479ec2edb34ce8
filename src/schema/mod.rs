/// Catalog introspection against a live SQLite connection.
pub mod introspect;
/// Schema and table descriptors.
pub mod model;
/// Identifier validation and quoting.
pub mod names;
/// The `Table:`/`Columns:` schema-text format shared by every translator.
pub mod text;

pub use introspect::{describe_schema, try_describe_schema, SchemaError};
pub use model::{SchemaDescriptor, TableDescriptor};
