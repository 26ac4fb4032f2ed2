//! Parser for document templates

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::{balance, parse, Balanced, Unmatched};
