//! # Statement Execution
//!
//! Routes prepared statements to the table and reports the outcome as a
//! closed result enum the REPL renders. Enumerated outcomes (success,
//! duplicate key, the legacy capacity variants) are recoverable;
//! anything returned as an error (pager failures, the internal-node
//! split limit) is environmental and treated as fatal by the caller.

use eyre::Result;

use crate::btree::InsertResult;
use crate::record::Row;
use crate::table::Table;

use super::Statement;

/// Outcome of executing one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteResult {
    Inserted,
    Rows(Vec<Row>),
    DuplicateKey,
    /// Kept for the command surface; the B+ tree engine reports
    /// capacity exhaustion through the pager's page bound instead.
    TableFull,
    /// Kept for the command surface; statement dispatch is exhaustive.
    Unhandled,
}

pub fn execute_statement(statement: &Statement, table: &mut Table) -> Result<ExecuteResult> {
    match statement {
        Statement::Insert(row) => match table.insert(row)? {
            InsertResult::Inserted => Ok(ExecuteResult::Inserted),
            InsertResult::DuplicateKey => Ok(ExecuteResult::DuplicateKey),
        },
        Statement::Select => Ok(ExecuteResult::Rows(table.select_all()?)),
    }
}
