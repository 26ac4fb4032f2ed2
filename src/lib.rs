//! Docket - document template rendering for a law-firm client portal
//!
//! This library renders user-edited document templates (engagement letters,
//! invoices, notices) against a JSON context and reports which variables a
//! template needs. It contains no code evaluation of any kind: templates are
//! lexed, parsed, and walked.
//!
//! # Example
//!
//! ```rust
//! use docket::render;
//! use serde_json::json;
//!
//! let letter = render(
//!     "Dear {{client.name}}, your retainer is {{formatCurrency retainer}}.",
//!     &json!({"client": {"name": "Acme Corp"}, "retainer": 2500}),
//! )
//! .unwrap();
//! assert_eq!(letter, "Dear Acme Corp, your retainer is $2,500.00.");
//! ```
//!
//! # Syntax
//!
//! | Construct | Syntax |
//! |---|---|
//! | Variable | `{{name}}`, `{{a.b.c}}` |
//! | Conditional | `{{#if path}}...{{/if}}` |
//! | Loop | `{{#each path}}...{{this}}...{{/each}}` |
//! | Helpers | `{{formatDate path}}`, `{{formatCurrency path}}`, `{{uppercase path}}`, `{{lowercase path}}`, `{{default path fallback}}` |
//!
//! Malformed templates never fail to render: unresolved paths render empty,
//! and unmatched or unknown tags pass through as literal text.

pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod lint;
pub mod parser;
pub mod renderer;

pub use config::{ConfigError, RenderConfig};
pub use error::ParseError;
pub use extract::extract_variable_names;
pub use lint::{LintCategory, LintWarning};
pub use parser::{parse, Template};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use renderer::Renderer;

/// Errors that can occur during the render pipeline
///
/// Unresolvable variables and malformed syntax are not errors; these only
/// report templates that exceed the configured limits.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error during parsing
    #[error("template rendering failed: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// Rendered output grew past the configured limit
    #[error("template rendering failed: output exceeds {limit} bytes")]
    OutputTooLarge { limit: usize },
}

impl From<Vec<ParseError>> for RenderError {
    fn from(errors: Vec<ParseError>) -> Self {
        RenderError::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Render a template against a context with default configuration
///
/// # Example
///
/// ```rust
/// use docket::render;
/// use serde_json::json;
///
/// let out = render(
///     "{{#each items}}[{{this}}]{{/each}}",
///     &json!({"items": [1, 2, 3]}),
/// )
/// .unwrap();
/// assert_eq!(out, "[1][2][3]");
/// ```
pub fn render(template: &str, context: &Value) -> Result<String, RenderError> {
    render_with_config(template, context, &RenderConfig::default())
}

/// Render a template against a context with custom configuration
///
/// # Example
///
/// ```rust
/// use docket::{render_with_config, RenderConfig};
/// use serde_json::json;
///
/// let config = RenderConfig::new().with_max_depth(1);
/// let nested = "{{#if a}}{{#if b}}x{{/if}}{{/if}}";
/// assert!(render_with_config(nested, &json!({}), &config).is_err());
/// ```
pub fn render_with_config(
    template: &str,
    context: &Value,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    debug!(len = template.len(), "rendering template");

    let parsed = parse(template, config.max_depth)?;
    let output = Renderer::new(config.max_output_len).render(&parsed, context)?;

    debug!(len = output.len(), "rendered template");
    Ok(output)
}
