/// Terminal bar and scatter charts plus plot-type detection.
pub mod chart;
/// The structured answer returned for every question.
pub mod respond;
/// Plain-text table rendering for terminal output.
pub mod table;

pub use respond::{respond, ChatAnswer};
