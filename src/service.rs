//! The per-request pipeline shared by the HTTP server and the CLI.
//!
//! One question runs introspection, planning, execution and response
//! shaping in sequence over a single scoped connection. Nothing is carried
//! from one request to the next.

use std::io::Read;
use std::sync::Arc;

use serde::Serialize;
use snafu::{ResultExt, Snafu};

use crate::exec::executor::{self, execute_with_policy, ExecError};
use crate::exec::guard::StatementPolicy;
use crate::ingest::{load_csv, IngestError, LoadSummary};
use crate::output::respond::{respond, ChatAnswer};
use crate::schema::introspect::describe_schema;
use crate::schema::model::SchemaDescriptor;
use crate::store::{Store, StoreError};
use crate::translate::{plan_sql, PlannedSql, SqlTranslator};

/// Failures surfaced to the caller of a request.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ServiceError {
    /// No connection could be acquired.
    #[snafu(display("Database error: {source}"))]
    Connect {
        /// Store failure.
        source: StoreError,
    },

    /// The planned statement failed; the store's text is kept verbatim.
    #[snafu(display("Query execution error: {source}"))]
    Execute {
        /// Statement that failed.
        sql: String,
        /// Execution failure.
        source: ExecError,
    },

    /// Loading uploaded data failed.
    #[snafu(display("{source}"))]
    Ingest {
        /// Ingestion failure.
        source: IngestError,
    },
}

/// Result of a health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// `healthy` when the database answers, `degraded` otherwise.
    pub status: String,
    /// `connected` or `error: <reason>`.
    pub database: String,
    /// `configured` or `not configured`.
    pub openai: String,
}

/// Answers questions against one store.
#[derive(Clone)]
pub struct ChatService {
    store: Store,
    translator: Option<Arc<dyn SqlTranslator>>,
    policy: StatementPolicy,
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("store", &self.store)
            .field("translator", &self.translator.as_ref().map(|t| t.name()))
            .field("policy", &self.policy)
            .finish()
    }
}

impl ChatService {
    /// Build a service with no translator and no statement restrictions.
    pub fn new(store: Store) -> Self {
        Self {
            store,
            translator: None,
            policy: StatementPolicy::Unrestricted,
        }
    }

    /// Use `translator` before falling back to the heuristic.
    pub fn with_translator(mut self, translator: Arc<dyn SqlTranslator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Restrict which statements may run.
    pub fn with_policy(mut self, policy: StatementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Whether a translator is configured.
    pub fn has_translator(&self) -> bool {
        self.translator.is_some()
    }

    /// Read the current schema over a fresh connection.
    pub fn schema(&self) -> Result<SchemaDescriptor, ServiceError> {
        let conn = self.store.connect().context(ConnectSnafu)?;
        Ok(describe_schema(&conn))
    }

    /// Plan the statement for `question` without running it.
    pub async fn plan(&self, question: &str) -> Result<PlannedSql, ServiceError> {
        let schema = self.schema()?;
        Ok(plan_sql(self.translator.as_deref(), question, &schema).await)
    }

    /// Answer `question` end to end.
    ///
    /// The connection is released on every exit path.
    pub async fn answer(&self, question: &str) -> Result<ChatAnswer, ServiceError> {
        tracing::info!(question, "received chat request");
        let conn = self.store.connect().context(ConnectSnafu)?;

        let schema = describe_schema(&conn);
        let planned = plan_sql(self.translator.as_deref(), question, &schema).await;

        let results = execute_with_policy(&conn, &planned.sql, self.policy).context(
            ExecuteSnafu {
                sql: planned.sql.as_str(),
            },
        )?;
        Ok(respond(planned.sql, results))
    }

    /// Replace `table_name` with the rows of a CSV document.
    pub fn upload_csv<R: Read>(
        &self,
        table_name: &str,
        reader: R,
    ) -> Result<LoadSummary, ServiceError> {
        tracing::info!(table = table_name, "received CSV upload");
        // Reject bad names before a connection is even opened.
        if !crate::schema::names::is_valid_table_name(table_name) {
            tracing::error!(table = table_name, "invalid table name");
            return Err(ServiceError::Ingest {
                source: IngestError::InvalidIdentifier {
                    name: table_name.to_string(),
                },
            });
        }
        let conn = self.store.connect().context(ConnectSnafu)?;
        load_csv(&conn, table_name, reader).context(IngestSnafu)
    }

    /// Probe the database and report translator availability.
    pub fn health(&self) -> HealthReport {
        let database = match self.store.connect() {
            Ok(conn) => match executor::ping(&conn) {
                Ok(()) => "connected".to_string(),
                Err(err) => format!("error: {err}"),
            },
            Err(err) => format!("error: {err}"),
        };
        if database != "connected" {
            tracing::error!(%database, "health check failed");
        }

        HealthReport {
            status: if database == "connected" {
                "healthy"
            } else {
                "degraded"
            }
            .to_string(),
            database,
            openai: if self.has_translator() {
                "configured"
            } else {
                "not configured"
            }
            .to_string(),
        }
    }
}
