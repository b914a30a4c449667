//! Template and filter-chain parsers.
//!
//! [`parse_template`] splits a raw template into literal text and field
//! references. [`parse_filter_suffix`] splits a field's raw key into the key
//! proper and its filter chain. Both produce the public AST in [`ast`].

pub mod ast;
pub mod error;
mod filter;
mod template;

pub use ast::*;
pub use error::ParseError;
pub use filter::parse_filter_suffix;
pub use template::{Segments, parse_template};
