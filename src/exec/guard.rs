use sqlparser::ast::Statement;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

/// Which statements the executor lets through to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatementPolicy {
    /// Run whatever was generated, including DDL and DML.
    #[default]
    Unrestricted,
    /// Accept a single query statement (`SELECT`, `WITH`, `VALUES`) only.
    ReadOnly,
}

impl StatementPolicy {
    /// Pick the policy from a read-only flag.
    pub fn from_read_only(read_only: bool) -> Self {
        if read_only {
            StatementPolicy::ReadOnly
        } else {
            StatementPolicy::Unrestricted
        }
    }

    /// Check `sql` against the policy, returning the rejection reason.
    pub fn check(self, sql: &str) -> Result<(), String> {
        match self {
            StatementPolicy::Unrestricted => Ok(()),
            StatementPolicy::ReadOnly => check_read_only(sql),
        }
    }
}

fn check_read_only(sql: &str) -> Result<(), String> {
    let statements = Parser::parse_sql(&SQLiteDialect {}, sql)
        .map_err(|e| format!("statement could not be parsed: {e}"))?;

    match statements.as_slice() {
        [Statement::Query(_)] => Ok(()),
        [] => Err("empty statement".to_string()),
        [_] => Err("only SELECT statements are allowed in read-only mode".to_string()),
        _ => Err(format!(
            "expected a single statement, found {}",
            statements.len()
        )),
    }
}
