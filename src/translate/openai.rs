use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use snafu::ResultExt;

use crate::translate::{
    ArgumentsSnafu, ClientSnafu, HttpSnafu, NoToolCallSnafu, SqlTranslator, StatusSnafu,
    TranslateError,
};

const SYSTEM_PROMPT: &str = "Answer user questions by generating SQL queries";
const TOOL_NAME: &str = "ask_database";

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Bearer token sent with every request.
    pub api_key: String,
    /// API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Chat model name.
    pub model: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

/// Translator backed by the chat-completions API with function calling.
#[derive(Debug, Clone)]
pub struct OpenAiTranslator {
    client: reqwest::Client,
    config: OpenAiConfig,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct AskDatabaseArgs {
    query: String,
}

impl OpenAiTranslator {
    /// Build a translator with its own HTTP client.
    pub fn new(config: OpenAiConfig) -> Result<Self, TranslateError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context(ClientSnafu)?;
        Ok(Self { client, config })
    }

    /// Endpoint the translator posts to.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn request_body(&self, question: &str, schema_text: &str) -> JsonValue {
        json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": question },
            ],
            "tools": [tool_definition(schema_text)],
        })
    }
}

/// The single function tool offered to the model, with the schema embedded.
pub fn tool_definition(schema_text: &str) -> JsonValue {
    let description = format!(
        "Write a SQL query to extract the necessary information to answer the user's question.\n\
         The query should use the following database schema:\n\
         {schema_text}\n\
         Ensure that the SQL query is written in plain text and accurately reflects the schema provided."
    );
    json!({
        "type": "function",
        "function": {
            "name": TOOL_NAME,
            "description": "Use this function to answer a question about the database",
            "parameters": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": description },
                },
                "required": ["query"],
            },
        },
    })
}

/// Pull the SQL out of the first tool call of the first choice.
fn extract_query(completion: ChatCompletion) -> Result<String, TranslateError> {
    let call = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.tool_calls)
        .and_then(|calls| calls.into_iter().next())
        .ok_or_else(|| NoToolCallSnafu.build())?;
    let args: AskDatabaseArgs =
        serde_json::from_str(&call.function.arguments).context(ArgumentsSnafu)?;
    Ok(args.query)
}

#[async_trait]
impl SqlTranslator for OpenAiTranslator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn translate(
        &self,
        question: &str,
        schema_text: &str,
    ) -> Result<String, TranslateError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(question, schema_text))
            .send()
            .await
            .context(HttpSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return StatusSnafu {
                status: status.as_u16(),
                body,
            }
            .fail();
        }

        let completion: ChatCompletion = response.json().await.context(HttpSnafu)?;
        extract_query(completion)
    }
}
