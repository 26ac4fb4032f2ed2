//! Variable name extraction
//!
//! Document generation builds its context from the names a template refers
//! to. Extraction works on the lexed tags, not the parsed tree, so names in
//! unbalanced or dead blocks are still reported.

use std::collections::BTreeSet;

use crate::parser::ast::{Helper, Path, THIS};
use crate::parser::lexer::{lex, Tag, Token};

/// Collect the top-level variable names a template references
///
/// Covers leaf placeholders, `#if` and `#each` targets, and helper arguments,
/// including those inside loop bodies. Helper names, block keywords and
/// `this` are never reported.
pub fn extract_variable_names(template: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for (token, _) in lex(template) {
        let Token::Tag(tag) = token else {
            continue;
        };
        let expr = match &tag {
            Tag::Variable(expr) | Tag::If(expr) | Tag::Each(expr) => expr.as_str(),
            Tag::Helper { path, .. } => path.as_str(),
            Tag::EndIf | Tag::EndEach | Tag::Other(_) => continue,
        };
        let first = expr.split_whitespace().next().unwrap_or("");
        let path = Path::parse(first);
        let base = path.base();
        if base.is_empty() || base == THIS || Helper::from_name(base).is_some() {
            continue;
        }
        names.insert(base.to_string());
    }
    names
}
