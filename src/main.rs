//! CLI entry point for `nl2sql`.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use nl2sql::config::AppConfig;
use nl2sql::exec::StatementPolicy;
use nl2sql::output::{chart, table};
use nl2sql::schema::text;
use nl2sql::service::ChatService;
use nl2sql::store::Store;
use nl2sql::translate::OpenAiTranslator;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "nl2sql",
    version,
    about = "Ask natural-language questions about a SQLite database"
)]
struct Cli {
    /// SQLite database file (overrides DB_URL)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides HTTP_BIND_ADDR)
        #[arg(long)]
        bind: Option<String>,

        /// Port to bind (overrides HTTP_PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Answer one question and print the rows
    Ask {
        /// The question to answer
        question: String,

        /// Skip the language model and use the keyword heuristic
        #[arg(long)]
        offline: bool,

        /// Print the full answer as JSON
        #[arg(long)]
        json: bool,

        /// Draw every applicable chart under the table
        #[arg(long)]
        chart: bool,
    },

    /// Print the schema text given to the language model
    Schema,

    /// Load a CSV file into a table, replacing it
    LoadCsv {
        /// CSV file to read
        file: PathBuf,

        /// Target table name
        #[arg(long, default_value = "uploaded_data")]
        table: String,
    },
}

const CHART_WIDTH: usize = 60;
const CHART_HEIGHT: usize = 16;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            process::exit(2);
        }
    };
    if let Some(db) = cli.db {
        config.database.path = db;
    }

    let offline = matches!(cli.command, Command::Ask { offline: true, .. });
    let service = build_service(&config, offline);

    match cli.command {
        Command::Serve { bind, port } => {
            let bind = bind.unwrap_or(config.server.bind_addr);
            let port = port.unwrap_or(config.server.port);
            if let Err(e) = nl2sql::server::serve(service, &bind, port).await {
                eprintln!("{e}");
                process::exit(2);
            }
        }
        Command::Ask {
            question,
            json,
            chart: draw_charts,
            ..
        } => {
            let answer = match service.answer(&question).await {
                Ok(a) => a,
                Err(e) => {
                    eprintln!("{e}");
                    process::exit(2);
                }
            };

            if json {
                match serde_json::to_string_pretty(&answer) {
                    Ok(body) => println!("{body}"),
                    Err(e) => {
                        eprintln!("Error encoding answer: {e}");
                        process::exit(2);
                    }
                }
                return;
            }

            println!("SQL: {}", answer.sql_query);
            println!("{}", answer.message);
            println!();
            println!("{}", table::format_table(&answer.results));

            if draw_charts {
                for kind in chart::plot_kinds(&answer.results) {
                    if let Some(plot) =
                        chart::render(&answer.results, kind, CHART_WIDTH, CHART_HEIGHT)
                    {
                        println!();
                        println!("{kind}");
                        println!("{plot}");
                    }
                }
            }
        }
        Command::Schema => match service.schema() {
            Ok(schema) => println!("{}", text::render(&schema)),
            Err(e) => {
                eprintln!("{e}");
                process::exit(2);
            }
        },
        Command::LoadCsv { file, table } => {
            let reader = match std::fs::File::open(&file) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Error reading {}: {e}", file.display());
                    process::exit(2);
                }
            };
            match service.upload_csv(&table, reader) {
                Ok(summary) => println!(
                    "{} ({} rows into '{}': {})",
                    summary.message,
                    summary.rows,
                    summary.table_name,
                    summary.columns.join(", ")
                ),
                Err(e) => {
                    eprintln!("{e}");
                    process::exit(2);
                }
            }
        }
    }
}

fn build_service(config: &AppConfig, offline: bool) -> ChatService {
    let store = Store::new(&config.database.path).with_busy_timeout(config.database.busy_timeout);
    let mut service = ChatService::new(store)
        .with_policy(StatementPolicy::from_read_only(config.database.read_only));

    if offline {
        return service;
    }
    match config.model.openai() {
        Some(openai) => match OpenAiTranslator::new(openai) {
            Ok(translator) => service = service.with_translator(Arc::new(translator)),
            Err(e) => tracing::error!(error = %e, "language model disabled"),
        },
        None => tracing::warn!("OPENAI_API_KEY not set, using fallback query generation"),
    }
    service
}
