use serde::Serialize;

use crate::schema::text;

/// One user table and its columns in physical definition order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescriptor {
    /// Table name as stored in the catalog.
    pub name: String,
    /// Column names, in the order the table declares them.
    pub columns: Vec<String>,
}

impl TableDescriptor {
    /// Build a descriptor from a name and its columns.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }
}

/// Every user table of a store, in catalog order.
///
/// Built fresh for each request and never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaDescriptor {
    /// Tables in catalog order; names are unique.
    pub tables: Vec<TableDescriptor>,
}

impl SchemaDescriptor {
    /// Build a descriptor from tables already in catalog order.
    pub fn new(tables: Vec<TableDescriptor>) -> Self {
        Self { tables }
    }

    /// True when no user table was discovered.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Table names in catalog order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    /// Look up a table by exact name.
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Render the schema text exchanged with the translators.
    pub fn to_schema_text(&self) -> String {
        text::render(self)
    }
}
