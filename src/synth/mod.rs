/// Deterministic question-to-SQL heuristic used when no model is available.
pub mod fallback;
/// Row-quantifier extraction from question text.
pub mod limit;

pub use fallback::{synthesize, synthesize_for_schema, FallbackPlan, DISCOVERY_QUERY};
