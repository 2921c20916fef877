//! # Statement Preparation
//!
//! Turns one line of REPL input into a typed [`Statement`]. The command
//! language is deliberately tiny:
//!
//! ```text
//! insert <id> <username> <email>
//! select
//! ```
//!
//! Input is split on runs of whitespace; the first token selects the
//! statement kind. Validation happens here, not in the codec: the id
//! must be a non-negative decimal integer that fits the key type, and
//! the text fields must fit their fixed columns (32 and 255 bytes).
//!
//! Errors are a closed enum whose `Display` strings are the exact
//! messages the REPL prints.

use std::fmt;

use crate::config::{EMAIL_MAX_LEN, USERNAME_MAX_LEN};
use crate::record::Row;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareError {
    /// Empty input or an unknown leading keyword; carries the offending
    /// input for the error message.
    UnrecognizedStatement(String),
    /// Wrong argument count, or an id that is not a decimal integer.
    SyntaxError,
    /// A negative id.
    NegativeId,
    /// A username or email that does not fit its column.
    StringTooLong,
}

impl fmt::Display for PrepareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrepareError::UnrecognizedStatement(input) => {
                write!(f, "Unrecognized keyword at start of '{}'.", input)
            }
            PrepareError::SyntaxError => write!(f, "Syntax error. Could not parse statement."),
            PrepareError::NegativeId => write!(f, "ID must be positive."),
            PrepareError::StringTooLong => write!(f, "String is too long."),
        }
    }
}

impl std::error::Error for PrepareError {}

/// Parses one line of input into a statement.
pub fn prepare_statement(input: &str) -> Result<Statement, PrepareError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();

    match tokens.first() {
        Some(&"insert") => prepare_insert(&tokens),
        Some(&"select") => Ok(Statement::Select),
        _ => Err(PrepareError::UnrecognizedStatement(input.to_string())),
    }
}

fn prepare_insert(tokens: &[&str]) -> Result<Statement, PrepareError> {
    let [_, id, username, email] = tokens else {
        return Err(PrepareError::SyntaxError);
    };

    let id: i64 = id.parse().map_err(|_| PrepareError::SyntaxError)?;
    if id < 0 {
        return Err(PrepareError::NegativeId);
    }
    let id = u32::try_from(id).map_err(|_| PrepareError::SyntaxError)?;

    if username.len() > USERNAME_MAX_LEN || email.len() > EMAIL_MAX_LEN {
        return Err(PrepareError::StringTooLong);
    }

    Ok(Statement::Insert(Row::new(id, *username, *email)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_parses() {
        assert_eq!(prepare_statement("select"), Ok(Statement::Select));
    }

    #[test]
    fn insert_parses_into_a_row() {
        let statement = prepare_statement("insert 1 bob bob@test.com").unwrap();

        assert_eq!(
            statement,
            Statement::Insert(Row::new(1, "bob", "bob@test.com"))
        );
    }

    #[test]
    fn empty_input_is_unrecognized() {
        assert_eq!(
            prepare_statement(""),
            Err(PrepareError::UnrecognizedStatement(String::new()))
        );
    }

    #[test]
    fn unknown_keyword_is_unrecognized() {
        assert_eq!(
            prepare_statement("update 1 a b"),
            Err(PrepareError::UnrecognizedStatement("update 1 a b".into()))
        );
    }

    #[test]
    fn insert_with_missing_arguments_is_a_syntax_error() {
        assert_eq!(prepare_statement("insert"), Err(PrepareError::SyntaxError));
        assert_eq!(
            prepare_statement("insert 1 onlyuser"),
            Err(PrepareError::SyntaxError)
        );
        assert_eq!(
            prepare_statement("insert 1 a b extra"),
            Err(PrepareError::SyntaxError)
        );
    }

    #[test]
    fn insert_with_non_numeric_id_is_a_syntax_error() {
        assert_eq!(
            prepare_statement("insert a b c"),
            Err(PrepareError::SyntaxError)
        );
    }

    #[test]
    fn insert_with_negative_id_is_rejected() {
        assert_eq!(
            prepare_statement("insert -1 test test@email.com"),
            Err(PrepareError::NegativeId)
        );
    }

    #[test]
    fn username_at_limit_is_accepted() {
        let username = "a".repeat(USERNAME_MAX_LEN);
        let input = format!("insert 1 {} test@email.com", username);

        let statement = prepare_statement(&input).unwrap();
        assert!(matches!(statement, Statement::Insert(row) if row.username == username));
    }

    #[test]
    fn username_over_limit_is_rejected() {
        let username = "a".repeat(USERNAME_MAX_LEN + 1);
        let input = format!("insert 1 {} test@email.com", username);

        assert_eq!(prepare_statement(&input), Err(PrepareError::StringTooLong));
    }

    #[test]
    fn email_at_limit_is_accepted() {
        let email = "a".repeat(EMAIL_MAX_LEN);
        let input = format!("insert 1 user {}", email);

        assert!(prepare_statement(&input).is_ok());
    }

    #[test]
    fn email_over_limit_is_rejected() {
        let email = "a".repeat(EMAIL_MAX_LEN + 1);
        let input = format!("insert 1 user {}", email);

        assert_eq!(prepare_statement(&input), Err(PrepareError::StringTooLong));
    }

    #[test]
    fn extra_whitespace_is_tolerated() {
        let statement = prepare_statement("  insert   2   alice   alice@test.com  ").unwrap();

        assert_eq!(
            statement,
            Statement::Insert(Row::new(2, "alice", "alice@test.com"))
        );
    }

    #[test]
    fn error_messages_match_the_repl_surface() {
        assert_eq!(
            PrepareError::SyntaxError.to_string(),
            "Syntax error. Could not parse statement."
        );
        assert_eq!(PrepareError::NegativeId.to_string(), "ID must be positive.");
        assert_eq!(
            PrepareError::StringTooLong.to_string(),
            "String is too long."
        );
        assert_eq!(
            PrepareError::UnrecognizedStatement("foo".into()).to_string(),
            "Unrecognized keyword at start of 'foo'."
        );
    }
}
