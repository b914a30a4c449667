//! Evaluation context for tracking state during a single formatting call.

use crate::interpreter::FormatError;
use crate::interpreter::filters::{DEFAULT_CONNECTOR, DEFAULT_SEPARATOR};
use crate::types::{Arguments, Value};

/// Default bound on fields nested inside format specs.
///
/// One level is allowed: `{value:{width}}` renders, while
/// `{a:{b:{c}}}` fails.
pub const DEFAULT_MAX_DEPTH: usize = 1;

/// How positional fields have been numbered so far in this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Indexing {
    Unset,
    Auto { next: usize },
    Manual,
}

/// Evaluation context carrying state through recursive evaluation.
///
/// The context tracks:
/// - Arguments available during evaluation
/// - Format-spec recursion depth and its limit
/// - Automatic versus manual positional numbering
/// - Join defaults for fields without an explicit join
///
/// A context lives for exactly one call; nothing in it outlives the output.
#[derive(Debug)]
pub struct EvalContext<'a> {
    /// Arguments available during evaluation.
    args: &'a Arguments,
    /// Current format-spec recursion depth.
    depth: usize,
    /// Maximum allowed depth.
    max_depth: usize,
    /// Numbering mode, fixed by the first positional field.
    indexing: Indexing,
    /// Connector word for the implicit join.
    connector_word: String,
    /// Separator for the implicit join.
    separator_char: String,
}

impl<'a> EvalContext<'a> {
    /// Create new context with arguments.
    pub fn new(args: &'a Arguments) -> Self {
        Self::with_max_depth(args, DEFAULT_MAX_DEPTH)
    }

    /// Create context with custom max depth.
    pub fn with_max_depth(args: &'a Arguments, max_depth: usize) -> Self {
        Self {
            args,
            depth: 0,
            max_depth,
            indexing: Indexing::Unset,
            connector_word: DEFAULT_CONNECTOR.to_string(),
            separator_char: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Replace the join defaults used when a field has no explicit join.
    pub fn with_join_defaults(
        mut self,
        connector_word: impl Into<String>,
        separator_char: impl Into<String>,
    ) -> Self {
        self.connector_word = connector_word.into();
        self.separator_char = separator_char.into();
        self
    }

    /// Get a named argument.
    pub fn get_named(&self, name: &str) -> Option<&'a Value> {
        self.args.get(name)
    }

    /// Get a positional argument.
    pub fn get_positional(&self, index: usize) -> Option<&'a Value> {
        self.args.positional(index)
    }

    /// Claim the next automatic index for a `{}` field.
    ///
    /// Fails if a `{0}`-style field was already seen in this call.
    pub fn next_auto_index(&mut self) -> Result<usize, FormatError> {
        match self.indexing {
            Indexing::Manual => Err(FormatError::ArgumentIndexingConflict),
            Indexing::Unset => {
                self.indexing = Indexing::Auto { next: 1 };
                Ok(0)
            }
            Indexing::Auto { next } => {
                self.indexing = Indexing::Auto { next: next + 1 };
                Ok(next)
            }
        }
    }

    /// Record a `{0}`-style field.
    ///
    /// Fails if a `{}` field was already seen in this call.
    pub fn use_manual_index(&mut self) -> Result<(), FormatError> {
        match self.indexing {
            Indexing::Auto { .. } => Err(FormatError::ArgumentIndexingConflict),
            Indexing::Unset | Indexing::Manual => {
                self.indexing = Indexing::Manual;
                Ok(())
            }
        }
    }

    /// Enter a format spec that contains fields.
    ///
    /// Returns error if the maximum depth would be exceeded.
    pub fn push_spec(&mut self) -> Result<(), FormatError> {
        if self.depth >= self.max_depth {
            return Err(FormatError::RecursionLimitExceeded {
                max_depth: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Leave a format spec.
    pub fn pop_spec(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Get current recursion depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Connector word for the implicit join.
    pub fn connector_word(&self) -> &str {
        &self.connector_word
    }

    /// Separator for the implicit join.
    pub fn separator_char(&self) -> &str {
        &self.separator_char
    }
}
