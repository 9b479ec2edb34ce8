/// Statement execution against a scoped connection.
pub mod executor;
/// Optional statement allow-list.
pub mod guard;
/// Scalar values, records and result sets.
pub mod value;

pub use executor::{execute, execute_with_policy, ExecError};
pub use guard::StatementPolicy;
pub use value::{QueryResult, Record, Value};
