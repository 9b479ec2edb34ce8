use std::io::Read;

use rusqlite::{params_from_iter, Connection};
use serde::Serialize;
use snafu::{ensure, ResultExt, Snafu};

use crate::ingest::infer::{dedupe_headers, ColumnAffinity};
use crate::schema::names::{is_valid_table_name, quote_identifier};

/// Errors raised while loading tabular data.
#[derive(Debug, Snafu)]
pub enum IngestError {
    /// The target table name failed identifier validation.
    #[snafu(display("invalid table name '{name}'"))]
    InvalidIdentifier {
        /// Rejected name.
        name: String,
    },

    /// The input is not well-formed CSV.
    #[snafu(display("{source}"))]
    Csv {
        /// Parser error.
        source: csv::Error,
    },

    /// The input has no header row.
    #[snafu(display("no columns to parse from file"))]
    NoColumns,

    /// A data row has more fields than the header.
    #[snafu(display("expected {expected} fields in line {line}, saw {found}"))]
    TooManyFields {
        /// 1-based line number in the input.
        line: u64,
        /// Header width.
        expected: usize,
        /// Fields found on the line.
        found: usize,
    },

    /// Creating or filling the table failed.
    #[snafu(display("{source}"))]
    Store {
        /// Underlying SQLite error.
        source: rusqlite::Error,
    },
}

/// Outcome of a successful load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    /// Always `CSV uploaded successfully`.
    pub message: String,
    /// Table that now holds the data.
    pub table_name: String,
    /// Number of data rows loaded.
    pub rows: usize,
    /// Column names as created.
    pub columns: Vec<String>,
}

/// Replace `table_name` with the contents of a CSV document.
///
/// The table name is validated before any statement runs. Rows shorter than
/// the header are padded with `NULL`; longer rows fail the load. The drop,
/// create and inserts share one transaction, so a failed load leaves any
/// previous table untouched.
pub fn load_csv<R: Read>(
    conn: &Connection,
    table_name: &str,
    reader: R,
) -> Result<LoadSummary, IngestError> {
    ensure!(
        is_valid_table_name(table_name),
        InvalidIdentifierSnafu { name: table_name }
    );

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers().context(CsvSnafu)?.clone();
    ensure!(
        !headers.is_empty() && !(headers.len() == 1 && headers[0].is_empty()),
        NoColumnsSnafu
    );
    let columns = dedupe_headers(headers.iter());

    let records = rdr
        .records()
        .collect::<Result<Vec<_>, _>>()
        .context(CsvSnafu)?;
    if let Some(long) = records.iter().find(|r| r.len() > columns.len()) {
        return TooManyFieldsSnafu {
            line: long.position().map_or(0, |p| p.line()),
            expected: columns.len(),
            found: long.len(),
        }
        .fail();
    }
    tracing::info!(
        table = table_name,
        rows = records.len(),
        columns = columns.len(),
        "CSV parsed"
    );

    let affinities: Vec<ColumnAffinity> = (0..columns.len())
        .map(|idx| ColumnAffinity::infer(records.iter().filter_map(|r| r.get(idx))))
        .collect();

    let column_defs = columns
        .iter()
        .zip(&affinities)
        .map(|(name, affinity)| format!("{} {affinity}", quote_identifier(name)))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");

    let table = quote_identifier(table_name);
    let tx = conn.unchecked_transaction().context(StoreSnafu)?;
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({column_defs});"
    ))
    .context(StoreSnafu)?;
    {
        let mut insert = tx
            .prepare(&format!("INSERT INTO {table} VALUES ({placeholders})"))
            .context(StoreSnafu)?;
        for record in &records {
            let values = affinities
                .iter()
                .enumerate()
                .map(|(idx, affinity)| affinity.convert(record.get(idx).unwrap_or("")));
            insert.execute(params_from_iter(values)).context(StoreSnafu)?;
        }
    }
    tx.commit().context(StoreSnafu)?;

    tracing::info!(table = table_name, rows = records.len(), "table created");
    Ok(LoadSummary {
        message: "CSV uploaded successfully".to_string(),
        table_name: table_name.to_string(),
        rows: records.len(),
        columns,
    })
}
