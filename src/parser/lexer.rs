//! Lexer for document templates using logos
//!
//! A template is plain text interleaved with `{{...}}` tags. The lexer never
//! fails: every byte belongs either to a text run or to a tag, and tags are
//! classified as they are lexed.

use logos::Logos;

use super::ast::Helper;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    /// A complete `{{...}}` tag
    #[regex(r"\{\{[^{}]+\}\}", |lex| Tag::classify(lex.slice()))]
    Tag(Tag),

    /// Plain text. A lone `{` that does not start a tag is text too.
    #[regex(r"[^{]+", |lex| lex.slice().to_string())]
    #[token("{", |lex| lex.slice().to_string())]
    Text(String),
}

/// Classified contents of a `{{...}}` tag
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    /// `{{#if path}}`
    If(String),
    /// `{{#each path}}`
    Each(String),
    /// `{{/if}}`
    EndIf,
    /// `{{/each}}`
    EndEach,
    /// `{{helper path [fallback]}}`; the fallback is a single word
    Helper {
        helper: Helper,
        path: String,
        fallback: String,
    },
    /// `{{a.b.c}}`
    Variable(String),
    /// Anything else; holds the full `{{...}}` text, which renders verbatim
    Other(String),
}

impl Tag {
    /// Classify a raw tag slice including its surrounding braces
    pub fn classify(raw: &str) -> Tag {
        let inner = raw[2..raw.len() - 2].trim();

        if let Some(rest) = inner.strip_prefix('#') {
            let (keyword, arg) = split_word(rest);
            return match (keyword, arg) {
                (_, "") => Tag::Other(raw.to_string()),
                ("if", arg) => Tag::If(arg.to_string()),
                ("each", arg) => Tag::Each(arg.to_string()),
                _ => Tag::Other(raw.to_string()),
            };
        }

        if let Some(rest) = inner.strip_prefix('/') {
            return match rest.trim() {
                "if" => Tag::EndIf,
                "each" => Tag::EndEach,
                _ => Tag::Other(raw.to_string()),
            };
        }

        let (word, arg) = split_word(inner);
        if arg.is_empty() {
            return Tag::Variable(inner.to_string());
        }

        if let Some(helper) = Helper::from_name(word) {
            let (path, rest) = split_word(arg);
            let (fallback, _) = split_word(rest);
            return Tag::Helper {
                helper,
                path: path.to_string(),
                fallback: fallback.to_string(),
            };
        }

        // `{{word argument}}` is the helper invocation shape; an unknown
        // helper name is left alone rather than read as a path
        if is_word(word) {
            Tag::Other(raw.to_string())
        } else {
            Tag::Variable(inner.to_string())
        }
    }

    /// True for `{{#if}}` and `{{#each}}`
    pub fn is_block_open(&self) -> bool {
        matches!(self, Tag::If(_) | Tag::Each(_))
    }

    /// True for `{{/if}}` and `{{/each}}`
    pub fn is_block_close(&self) -> bool {
        matches!(self, Tag::EndIf | Tag::EndEach)
    }

    /// Kind of block this tag opens
    pub fn opens(&self) -> Option<BlockKind> {
        match self {
            Tag::If(_) => Some(BlockKind::If),
            Tag::Each(_) => Some(BlockKind::Each),
            _ => None,
        }
    }

    /// Kind of block this tag closes
    pub fn closes(&self) -> Option<BlockKind> {
        match self {
            Tag::EndIf => Some(BlockKind::If),
            Tag::EndEach => Some(BlockKind::Each),
            _ => None,
        }
    }
}

/// The two block constructs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    If,
    Each,
}

/// Split off the first whitespace-delimited word, returning it and the trimmed rest
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], s[idx..].trim()),
        None => (s, ""),
    }
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Lex input string into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}
