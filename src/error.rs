//! Error types for parsing and rendering

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },

    /// Paired blocks nest deeper than the configured limit
    #[error("blocks nested more than {limit} deep at {span:?}")]
    NestingTooDeep { span: Span, limit: usize },
}

impl ParseError {
    pub fn span(&self) -> &Span {
        match self {
            ParseError::Syntax { span, .. } | ParseError::NestingTooDeep { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let label = match self {
            ParseError::Syntax {
                message, expected, ..
            } => {
                if expected.is_empty() {
                    message.clone()
                } else {
                    format!("{}\nExpected: {}", message, expected.join(", "))
                }
            }
            ParseError::NestingTooDeep { limit, .. } => {
                format!("this block exceeds the nesting limit of {}", limit)
            }
        };
        report(
            ReportKind::Error,
            Color::Red,
            &self.to_string(),
            &label,
            self.span(),
            source,
            filename,
        )
    }
}

/// Render a single-label ariadne report to a string
pub(crate) fn report(
    kind: ReportKind<'_>,
    color: Color,
    message: &str,
    label: &str,
    span: &Span,
    source: &str,
    filename: &str,
) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = Report::build(kind, filename, span.start)
        .with_message(message)
        .with_label(
            Label::new((filename, span.clone()))
                .with_message(label)
                .with_color(color),
        )
        .finish()
        .write((filename, Source::from(source)), &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

impl<'a> From<chumsky::error::Rich<'a, crate::parser::lexer::Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, crate::parser::lexer::Token>) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let message = match err.reason() {
            RichReason::Custom(msg) => msg.to_string(),
            _ => match err.found() {
                Some(tok) => format!("Unexpected {}", format_token(tok)),
                None => "Unexpected end of input".to_string(),
            },
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(format_token(tok)),
                RichPattern::EndOfInput => Some("end of input".to_string()),
                _ => None,
            })
            .collect();

        ParseError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &crate::parser::lexer::Token) -> String {
    use crate::parser::lexer::{Tag, Token};
    match tok {
        Token::Text(s) => format!("text {:?}", s),
        Token::Tag(Tag::If(path)) => format!("'{{{{#if {}}}}}'", path),
        Token::Tag(Tag::Each(path)) => format!("'{{{{#each {}}}}}'", path),
        Token::Tag(Tag::EndIf) => "'{{/if}}'".to_string(),
        Token::Tag(Tag::EndEach) => "'{{/each}}'".to_string(),
        Token::Tag(Tag::Helper { helper, path, .. }) => format!("helper '{} {}'", helper, path),
        Token::Tag(Tag::Variable(path)) => format!("variable '{}'", path),
        Token::Tag(Tag::Other(raw)) => format!("tag '{}'", raw),
    }
}
