//! Question-to-SQL translation.
//!
//! A [`SqlTranslator`] is the language-model seam. Translation never fails
//! a request: when no translator is configured, or the translator errors,
//! [`plan_sql`] falls through to the deterministic fallback synthesizer.

/// OpenAI-compatible chat-completions translator.
pub mod openai;

use async_trait::async_trait;
use serde::Serialize;
use snafu::Snafu;

use crate::schema::model::SchemaDescriptor;
use crate::synth::fallback::synthesize_for_schema;

pub use openai::{OpenAiConfig, OpenAiTranslator};

/// Why a translator produced no statement.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TranslateError {
    /// The HTTP client could not be built.
    #[snafu(display("failed to build HTTP client: {source}"))]
    Client {
        /// Underlying client error.
        source: reqwest::Error,
    },

    /// The request failed in transport or the body could not be decoded.
    #[snafu(display("translation request failed: {source}"))]
    Http {
        /// Underlying client error.
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-success status.
    #[snafu(display("translation endpoint returned {status}: {body}"))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The model answered without calling the `ask_database` tool.
    #[snafu(display("no SQL query generated by the model"))]
    NoToolCall,

    /// The tool-call arguments were not the expected JSON object.
    #[snafu(display("tool call arguments are not valid: {source}"))]
    Arguments {
        /// Decoding error.
        source: serde_json::Error,
    },
}

/// Translates a question into SQL given the schema text.
#[async_trait]
pub trait SqlTranslator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Produce a single SQL statement for `question`.
    async fn translate(&self, question: &str, schema_text: &str)
        -> Result<String, TranslateError>;
}

/// Where a planned statement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlSource {
    /// Produced by the configured translator.
    Model,
    /// Produced by the fallback synthesizer.
    Fallback,
}

/// A statement ready for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSql {
    /// The SQL text.
    pub sql: String,
    /// Which path produced it.
    pub source: SqlSource,
}

impl PlannedSql {
    fn fallback(question: &str, schema: &SchemaDescriptor) -> Self {
        Self {
            sql: synthesize_for_schema(question, schema),
            source: SqlSource::Fallback,
        }
    }
}

/// Plan the statement for `question`, preferring `translator` when present.
pub async fn plan_sql(
    translator: Option<&dyn SqlTranslator>,
    question: &str,
    schema: &SchemaDescriptor,
) -> PlannedSql {
    let Some(translator) = translator else {
        tracing::warn!("no translator configured, using fallback query generation");
        return PlannedSql::fallback(question, schema);
    };

    tracing::info!(translator = translator.name(), question, "generating SQL query");
    match translator.translate(question, &schema.to_schema_text()).await {
        Ok(sql) => {
            tracing::info!(sql = %sql, "generated SQL query");
            PlannedSql {
                sql,
                source: SqlSource::Model,
            }
        }
        Err(err) => {
            tracing::error!(
                translator = translator.name(),
                error = %err,
                "translation failed, using fallback query generation"
            );
            PlannedSql::fallback(question, schema)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::model::TableDescriptor;

    struct Fixed(Result<&'static str, ()>);

    #[async_trait]
    impl SqlTranslator for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn translate(
            &self,
            _question: &str,
            _schema_text: &str,
        ) -> Result<String, TranslateError> {
            self.0.map(str::to_string).map_err(|()| TranslateError::NoToolCall)
        }
    }

    fn schema() -> SchemaDescriptor {
        SchemaDescriptor::new(vec![TableDescriptor::new(
            "orders",
            vec!["id".into(), "total".into()],
        )])
    }

    #[tokio::test]
    async fn model_output_is_used_verbatim() {
        let translator: &dyn SqlTranslator = &Fixed(Ok("SELECT count(*) FROM orders"));
        let planned = plan_sql(Some(translator), "how many orders?", &schema()).await;
        assert_eq!(planned.sql, "SELECT count(*) FROM orders");
        assert_eq!(planned.source, SqlSource::Model);
    }

    #[tokio::test]
    async fn translator_failure_falls_back() {
        let translator: &dyn SqlTranslator = &Fixed(Err(()));
        let planned = plan_sql(Some(translator), "last 2 orders", &schema()).await;
        assert_eq!(planned.sql, "SELECT * FROM orders ORDER BY id DESC LIMIT 2");
        assert_eq!(planned.source, SqlSource::Fallback);
    }

    #[tokio::test]
    async fn missing_translator_falls_back() {
        let planned = plan_sql(None, "orders", &SchemaDescriptor::default()).await;
        assert_eq!(planned.sql, crate::synth::DISCOVERY_QUERY);
        assert_eq!(planned.source, SqlSource::Fallback);
    }
}
