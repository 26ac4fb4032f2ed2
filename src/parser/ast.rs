//! Abstract Syntax Tree types for document templates

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Keyword naming the current scope value inside a template
pub const THIS: &str = "this";

/// A dotted path such as `client.address.city`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Split a path expression on `.`
    pub fn parse(expr: &str) -> Self {
        Self {
            segments: expr.trim().split('.').map(str::to_string).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The first segment, which names a top-level context variable
    pub fn base(&self) -> &str {
        self.segments.first().map(String::as_str).unwrap_or("")
    }

    /// Whether the path is exactly `this`
    pub fn is_this(&self) -> bool {
        self.segments.len() == 1 && self.base() == THIS
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Built-in formatting helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Helper {
    /// `{{formatDate path}}` -> `January 15, 2026`
    FormatDate,
    /// `{{formatCurrency path}}` -> `$1,234.50`
    FormatCurrency,
    /// `{{uppercase path}}`
    Uppercase,
    /// `{{lowercase path}}`
    Lowercase,
    /// `{{default path fallback}}`
    Default,
}

impl Helper {
    pub const ALL: [Helper; 5] = [
        Helper::FormatDate,
        Helper::FormatCurrency,
        Helper::Uppercase,
        Helper::Lowercase,
        Helper::Default,
    ];

    /// Look up a helper by the name used in templates
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Helper::FormatDate => "formatDate",
            Helper::FormatCurrency => "formatCurrency",
            Helper::Uppercase => "uppercase",
            Helper::Lowercase => "lowercase",
            Helper::Default => "default",
        }
    }
}

impl std::fmt::Display for Helper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Root AST node - a parsed template
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    pub nodes: Vec<Spanned<Node>>,
}

/// A single template construct
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text, including tags that pass through untouched
    Text(String),
    /// Leaf placeholder: `{{a.b}}`
    Variable(Path),
    /// Helper invocation: `{{formatCurrency total}}`
    Helper {
        helper: Helper,
        path: Path,
        /// Literal fallback text; only meaningful for `default`
        fallback: String,
    },
    /// Conditional: `{{#if path}}...{{/if}}`
    If {
        path: Path,
        body: Vec<Spanned<Node>>,
    },
    /// Loop: `{{#each path}}...{{/each}}`
    Each {
        path: Path,
        body: Vec<Spanned<Node>>,
    },
}
