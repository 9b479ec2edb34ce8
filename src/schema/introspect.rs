use rusqlite::Connection;
use snafu::{ResultExt, Snafu};

use crate::schema::model::{SchemaDescriptor, TableDescriptor};
use crate::schema::names::is_valid_table_name;

const USER_TABLES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type='table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\';";

/// Errors raised while reading catalog metadata.
#[derive(Debug, Snafu)]
pub enum SchemaError {
    /// The table listing query failed.
    #[snafu(display("failed to list tables: {source}"))]
    ListTables {
        /// Underlying SQLite error.
        source: rusqlite::Error,
    },

    /// The column listing for one table failed.
    #[snafu(display("failed to list columns of table '{table}': {source}"))]
    ListColumns {
        /// Table whose columns were requested.
        table: String,
        /// Underlying SQLite error.
        source: rusqlite::Error,
    },
}

/// List user table names in catalog order, excluding SQLite's own tables.
pub fn list_tables(conn: &Connection) -> Result<Vec<String>, SchemaError> {
    let mut stmt = conn.prepare(USER_TABLES_SQL).context(ListTablesSnafu)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context(ListTablesSnafu)?
        .collect::<Result<Vec<_>, _>>()
        .context(ListTablesSnafu)?;
    tracing::info!(count = names.len(), tables = ?names, "found tables");
    Ok(names)
}

/// List the columns of `table` in definition order.
///
/// Callers must validate `table` with [`is_valid_table_name`] first; the
/// name is interpolated into a `PRAGMA` statement.
pub fn list_columns(conn: &Connection, table: &str) -> Result<Vec<String>, SchemaError> {
    let sql = format!("PRAGMA table_info('{table}');");
    let mut stmt = conn
        .prepare(&sql)
        .context(ListColumnsSnafu { table })?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .context(ListColumnsSnafu { table })?
        .collect::<Result<Vec<_>, _>>()
        .context(ListColumnsSnafu { table })?;
    tracing::debug!(table, columns = ?columns, "table columns");
    Ok(columns)
}

/// Read the full schema, failing on the first metadata error.
///
/// Tables whose names fail identifier validation are skipped and logged.
pub fn try_describe_schema(conn: &Connection) -> Result<SchemaDescriptor, SchemaError> {
    let mut tables = Vec::new();
    for name in list_tables(conn)? {
        if !is_valid_table_name(&name) {
            tracing::error!(table = %name, "skipping table with invalid name");
            continue;
        }
        let columns = list_columns(conn, &name)?;
        tables.push(TableDescriptor::new(name, columns));
    }
    Ok(SchemaDescriptor::new(tables))
}

/// Read the full schema, degrading instead of failing.
///
/// A failed table listing yields an empty descriptor; a failed column
/// listing keeps the table with no columns. Both are logged.
pub fn describe_schema(conn: &Connection) -> SchemaDescriptor {
    let names = match list_tables(conn) {
        Ok(names) => names,
        Err(err) => {
            tracing::error!(error = %err, "schema introspection failed");
            return SchemaDescriptor::default();
        }
    };

    let tables = names
        .into_iter()
        .filter(|name| {
            let valid = is_valid_table_name(name);
            if !valid {
                tracing::error!(table = %name, "skipping table with invalid name");
            }
            valid
        })
        .map(|name| {
            let columns = list_columns(conn, &name).unwrap_or_else(|err| {
                tracing::error!(error = %err, "column introspection failed");
                Vec::new()
            });
            TableDescriptor::new(name, columns)
        })
        .collect();

    SchemaDescriptor::new(tables)
}
