//! Parsing of the line-oriented command language.
//!
//! Lines starting with `.` are meta-commands; everything else is a
//! statement:
//!
//! ```text
//! insert <id> <username> <email>
//! select
//! select <id>
//! ```

use crate::error::StorageError;
use crate::row::Row;
use thiserror::Error;

/// Commands that act on the session rather than on rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaCommand {
    /// Flush and close the table, then quit
    Exit,
    /// Print the tree shape
    Btree,
    /// Print the layout constants
    Constants,
    /// Print the tree as JSON
    Json,
    /// Print table statistics
    Stats,
}

/// A prepared statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert(Box<Row>),
    /// Full scan in id order
    Select,
    /// Point lookup
    SelectOne(u32),
}

/// Why an input line could not be prepared.
///
/// The display text is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrepareError {
    #[error("ID must be positive.")]
    NegativeId,

    #[error("String is too long.")]
    StringTooLong,

    #[error("Syntax error. Could not parse statement.")]
    SyntaxError,

    #[error("Unrecognized keyword at start of '{0}'.")]
    Unrecognized(String),

    #[error("Unrecognized command '{0}'.")]
    UnrecognizedCommand(String),
}

/// Parse a `.`-prefixed line
pub fn parse_meta_command(input: &str) -> Result<MetaCommand, PrepareError> {
    match input.trim() {
        ".exit" => Ok(MetaCommand::Exit),
        ".btree" => Ok(MetaCommand::Btree),
        ".constants" => Ok(MetaCommand::Constants),
        ".json" => Ok(MetaCommand::Json),
        ".stats" => Ok(MetaCommand::Stats),
        other => Err(PrepareError::UnrecognizedCommand(other.to_string())),
    }
}

/// Parse a statement line
pub fn prepare_statement(input: &str) -> Result<Statement, PrepareError> {
    let input = input.trim();
    let mut tokens = input.split_whitespace();

    match tokens.next() {
        Some("insert") => {
            let (id, username, email) = match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
                (Some(id), Some(username), Some(email), None) => (id, username, email),
                _ => return Err(PrepareError::SyntaxError),
            };
            let id = parse_id(id)?;
            let row = Row::new(id, username, email).map_err(|e| match e {
                StorageError::FieldTooLong { .. } => PrepareError::StringTooLong,
                _ => PrepareError::SyntaxError,
            })?;
            Ok(Statement::Insert(Box::new(row)))
        }
        Some("select") => match (tokens.next(), tokens.next()) {
            (None, _) => Ok(Statement::Select),
            (Some(id), None) => Ok(Statement::SelectOne(parse_id(id)?)),
            _ => Err(PrepareError::SyntaxError),
        },
        _ => Err(PrepareError::Unrecognized(input.to_string())),
    }
}

fn parse_id(token: &str) -> Result<u32, PrepareError> {
    let id: i64 = token.parse().map_err(|_| PrepareError::SyntaxError)?;
    if id < 0 {
        return Err(PrepareError::NegativeId);
    }
    u32::try_from(id).map_err(|_| PrepareError::SyntaxError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_insert() {
        let stmt = prepare_statement("insert 1 user1 person1@example.com").unwrap();
        let expected = Row::new(1, "user1", "person1@example.com").unwrap();
        assert_eq!(stmt, Statement::Insert(Box::new(expected)));
    }

    #[test]
    fn test_prepare_select() {
        assert_eq!(prepare_statement("select"), Ok(Statement::Select));
        assert_eq!(prepare_statement("  select 42 "), Ok(Statement::SelectOne(42)));
        assert_eq!(prepare_statement("select 1 2"), Err(PrepareError::SyntaxError));
    }

    #[test]
    fn test_insert_errors() {
        assert_eq!(prepare_statement("insert -1 a b"), Err(PrepareError::NegativeId));
        assert_eq!(prepare_statement("insert x a b"), Err(PrepareError::SyntaxError));
        assert_eq!(prepare_statement("insert 1 a"), Err(PrepareError::SyntaxError));
        assert_eq!(prepare_statement("insert 1 a b c"), Err(PrepareError::SyntaxError));
        assert_eq!(prepare_statement("insert 4294967296 a b"), Err(PrepareError::SyntaxError));

        let long_name = "a".repeat(33);
        let line = format!("insert 1 {} b", long_name);
        assert_eq!(prepare_statement(&line), Err(PrepareError::StringTooLong));

        let max_name = "a".repeat(32);
        let max_email = "e".repeat(255);
        let line = format!("insert 1 {} {}", max_name, max_email);
        assert!(prepare_statement(&line).is_ok());
    }

    #[test]
    fn test_unrecognized() {
        let err = prepare_statement("delete 1").unwrap_err();
        assert_eq!(err.to_string(), "Unrecognized keyword at start of 'delete 1'.");
        assert_eq!(PrepareError::NegativeId.to_string(), "ID must be positive.");
    }

    #[test]
    fn test_meta_commands() {
        assert_eq!(parse_meta_command(".exit"), Ok(MetaCommand::Exit));
        assert_eq!(parse_meta_command(".btree"), Ok(MetaCommand::Btree));
        assert_eq!(parse_meta_command(".constants"), Ok(MetaCommand::Constants));
        assert_eq!(parse_meta_command(".json"), Ok(MetaCommand::Json));
        assert_eq!(parse_meta_command(".stats"), Ok(MetaCommand::Stats));

        let err = parse_meta_command(".foo").unwrap_err();
        assert_eq!(err.to_string(), "Unrecognized command '.foo'.");
    }
}
