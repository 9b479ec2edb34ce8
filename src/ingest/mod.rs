/// Column affinity inference and header clean-up for uploaded tables.
pub mod infer;
/// Loading CSV documents into tables.
pub mod loader;

pub use loader::{load_csv, IngestError, LoadSummary};
