//! # SQL Module
//!
//! The SQL-flavored command interface consumed by the REPL: statement
//! preparation ([`statement`]) and execution ([`executor`]). The
//! language covers exactly one table with a fixed schema, so there is
//! no lexer, planner, or expression tree: a statement is either an
//! insert carrying a fully validated row, or a full-table select.

pub mod executor;
pub mod statement;

pub use executor::{execute_statement, ExecuteResult};
pub use statement::{prepare_statement, PrepareError, Statement};
