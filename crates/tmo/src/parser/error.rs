//! Parse error types for templates and filter chains.

use thiserror::Error;

/// An error that occurred during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A syntax error with location information.
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// The template ended inside a field.
    #[error("unexpected end of input at {line}:{column}")]
    UnexpectedEof { line: usize, column: usize },
}

impl ParseError {
    /// The (line, column) the error points at.
    pub fn position(&self) -> (usize, usize) {
        match self {
            ParseError::Syntax { line, column, .. } | ParseError::UnexpectedEof { line, column } => {
                (*line, *column)
            }
        }
    }
}

/// Calculate line and column from original input and remaining input.
pub(crate) fn calculate_position(original: &str, remaining: &str) -> (usize, usize) {
    let consumed = original.len() - remaining.len();
    let consumed_str = &original[..consumed];
    let line = consumed_str.chars().filter(|&c| c == '\n').count() + 1;
    let column = match consumed_str.rfind('\n') {
        Some(pos) => consumed_str[pos + 1..].chars().count() + 1,
        None => consumed_str.chars().count() + 1,
    };
    (line, column)
}
