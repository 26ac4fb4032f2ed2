//! Template renderer
//!
//! Walks a parsed [`Template`] against a scope value. Blocks select or repeat
//! their bodies, helpers format resolved values, and leaf placeholders
//! substitute resolved values. Nothing that comes out of the context is ever
//! interpreted as template syntax.

pub mod helpers;
pub mod scope;

use serde_json::Value;
use tracing::trace;

use crate::parser::ast::{Node, Spanned, Template};
use scope::Scope;
use crate::RenderError;

/// Tree-walking renderer with an output size budget
#[derive(Debug)]
pub struct Renderer {
    out: String,
    max_output_len: usize,
}

impl Renderer {
    pub fn new(max_output_len: usize) -> Self {
        Self {
            out: String::new(),
            max_output_len,
        }
    }

    /// Render a whole template against the root context
    pub fn render(mut self, template: &Template, context: &Value) -> Result<String, RenderError> {
        self.render_nodes(&template.nodes, Scope::root(context))?;
        Ok(self.out)
    }

    fn render_nodes(
        &mut self,
        nodes: &[Spanned<Node>],
        scope: Scope<'_>,
    ) -> Result<(), RenderError> {
        for node in nodes {
            self.render_node(&node.node, scope)?;
        }
        Ok(())
    }

    fn render_node(&mut self, node: &Node, scope: Scope<'_>) -> Result<(), RenderError> {
        match node {
            Node::Text(text) => self.push(text),
            Node::Variable(path) => {
                let text = scope.resolve(path).map(scope::display).unwrap_or_default();
                self.push(&text)
            }
            Node::Helper {
                helper,
                path,
                fallback,
            } => {
                let text = helpers::apply(*helper, scope.resolve(path), fallback);
                self.push(&text)
            }
            Node::If { path, body } => {
                if scope::is_truthy(scope.resolve(path)) {
                    self.render_nodes(body, scope)?;
                }
                Ok(())
            }
            Node::Each { path, body } => match scope.resolve(path) {
                Some(Value::Array(items)) => {
                    // Each element is the whole scope of its iteration
                    for item in items {
                        self.render_nodes(body, Scope::element(item))?;
                    }
                    Ok(())
                }
                _ => {
                    trace!(%path, "each target is not an array");
                    Ok(())
                }
            },
        }
    }

    fn push(&mut self, text: &str) -> Result<(), RenderError> {
        if self.out.len() + text.len() > self.max_output_len {
            return Err(RenderError::OutputTooLarge {
                limit: self.max_output_len,
            });
        }
        self.out.push_str(text);
        Ok(())
    }
}
