//! Lint checks for template authoring defects.
//!
//! The renderer tolerates malformed templates by design, so a template with an
//! unclosed block or a misspelled helper still produces a document, just not
//! the intended one. These checks surface such defects before a template is
//! saved.

use std::fmt;

use ariadne::{Color, ReportKind};

use crate::error::{report, Span};
use crate::parser::ast::{Helper, Path};
use crate::parser::lexer::{Tag, Token};
use crate::parser::balance;
use crate::renderer::scope::is_forbidden;

/// A lint warning about a template defect
#[derive(Debug, Clone, PartialEq)]
pub struct LintWarning {
    pub category: LintCategory,
    pub message: String,
    pub span: Span,
}

/// Category of lint defect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintCategory {
    /// Block opener without a matching closer
    Unclosed,
    /// Block closer without an open block
    StrayClose,
    /// `{{#if}}` or `{{#each}}` with nothing to test
    MissingPath,
    /// Tag the renderer leaves in the output verbatim
    UnknownTag,
    /// Path through `__proto__`, `constructor` or `prototype`
    ForbiddenPath,
}

impl fmt::Display for LintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintCategory::Unclosed => write!(f, "unclosed"),
            LintCategory::StrayClose => write!(f, "stray-close"),
            LintCategory::MissingPath => write!(f, "missing-path"),
            LintCategory::UnknownTag => write!(f, "unknown-tag"),
            LintCategory::ForbiddenPath => write!(f, "forbidden-path"),
        }
    }
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} at {:?}", self.category, self.message, self.span)
    }
}

impl LintWarning {
    fn new(category: LintCategory, message: impl Into<String>, span: Span) -> Self {
        Self {
            category,
            message: message.into(),
            span,
        }
    }

    /// Format the warning with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        report(
            ReportKind::Warning,
            Color::Yellow,
            &format!("{} ({})", self.message, self.category),
            &self.message,
            &self.span,
            source,
            filename,
        )
    }
}

/// Run all lint checks on a template
pub fn check(template: &str) -> Vec<LintWarning> {
    let balanced = balance(template);
    let mut warnings = Vec::new();

    for unmatched in &balanced.unmatched {
        let raw = &template[unmatched.span.clone()];
        let warning = if unmatched.tag.is_block_open() {
            LintWarning::new(
                LintCategory::Unclosed,
                format!("{} is never closed and renders as literal text", raw),
                unmatched.span.clone(),
            )
        } else {
            LintWarning::new(
                LintCategory::StrayClose,
                format!("{} has no open block and renders as literal text", raw),
                unmatched.span.clone(),
            )
        };
        warnings.push(warning);
    }

    for (token, span) in &balanced.tokens {
        let Token::Tag(tag) = token else {
            continue;
        };
        match tag {
            Tag::Other(raw) => warnings.push(check_other(raw, span.clone())),
            Tag::Variable(expr) if expr == "else" => warnings.push(LintWarning::new(
                LintCategory::UnknownTag,
                "{{else}} is not supported and renders as a variable named `else`",
                span.clone(),
            )),
            Tag::Variable(expr) | Tag::If(expr) | Tag::Each(expr) => {
                check_path(expr, span.clone(), &mut warnings)
            }
            Tag::Helper { path, .. } => check_path(path, span.clone(), &mut warnings),
            Tag::EndIf | Tag::EndEach => {}
        }
    }

    warnings.sort_by_key(|w| w.span.start);
    warnings
}

fn check_other(raw: &str, span: Span) -> LintWarning {
    let inner = raw[2..raw.len() - 2].trim();
    if matches!(inner, "#if" | "#each") {
        return LintWarning::new(
            LintCategory::MissingPath,
            format!("{} needs a path to test", raw),
            span,
        );
    }

    let hint = match inner.split_whitespace().next() {
        Some(word) if !word.starts_with('#') && !word.starts_with('/') => {
            let known: Vec<_> = Helper::ALL.iter().map(|h| h.name()).collect();
            format!("; known helpers are {}", known.join(", "))
        }
        _ => String::new(),
    };
    LintWarning::new(
        LintCategory::UnknownTag,
        format!("{} is not recognized and renders verbatim{}", raw, hint),
        span,
    )
}

fn check_path(expr: &str, span: Span, warnings: &mut Vec<LintWarning>) {
    let first = expr.split_whitespace().next().unwrap_or("");
    let path = Path::parse(first);
    if let Some(segment) = path.segments().iter().find(|s| is_forbidden(s)) {
        warnings.push(LintWarning::new(
            LintCategory::ForbiddenPath,
            format!("`{}` cannot be read in a path, so `{}` always renders empty", segment, path),
            span,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(template: &str) -> Vec<LintCategory> {
        check(template).into_iter().map(|w| w.category).collect()
    }

    #[test]
    fn test_clean_template() {
        assert!(check("Dear {{client.name}}, {{#if paid}}thanks{{/if}}").is_empty());
    }

    #[test]
    fn test_unclosed_and_stray() {
        assert_eq!(
            categories("{{#if a}}x {{/each}}"),
            vec![LintCategory::Unclosed, LintCategory::StrayClose]
        );
    }

    #[test]
    fn test_missing_path() {
        let warnings = check("{{#each}}");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].category, LintCategory::MissingPath);
        assert_eq!(warnings[0].span, 0..9);
    }

    #[test]
    fn test_unknown_tags() {
        let warnings = check("{{else}} ok {{titlecase name}} {{#unless x}}");
        assert_eq!(warnings.len(), 3);
        assert!(warnings
            .iter()
            .all(|w| w.category == LintCategory::UnknownTag));
        assert!(warnings[0].message.contains("not supported"));
        assert!(warnings[1].message.contains("known helpers are formatDate"));
        assert!(!warnings[2].message.contains("known helpers"));
    }

    #[test]
    fn test_forbidden_path() {
        let warnings = check("{{constructor.prototype}} {{default __proto__ x}}");
        assert_eq!(warnings.len(), 2);
        assert!(warnings
            .iter()
            .all(|w| w.category == LintCategory::ForbiddenPath));
    }

    #[test]
    fn test_format_report() {
        let source = "{{#if a}}";
        let warnings = check(source);
        let formatted = warnings[0].format(source, "letter.tpl");
        assert!(formatted.contains("letter.tpl"));
        assert!(formatted.contains("never closed"));
    }
}
