//! Parser implementation using chumsky
//!
//! Parsing runs in two steps. [`balance`] pairs block openers with closers on
//! the raw token stream and demotes anything unpaired to literal text, so the
//! chumsky grammar only ever sees well-nested blocks and never has to
//! backtrack over a half-open construct.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ParseError;
use crate::parser::ast::{Node, Path, Span, Spanned, Template};
use crate::parser::lexer::{self, BlockKind, Tag, Token};

/// A block opener or closer with no partner
#[derive(Debug, Clone, PartialEq)]
pub struct Unmatched {
    pub tag: Tag,
    pub span: Span,
}

/// Token stream in which every remaining block tag has a partner
#[derive(Debug, Clone)]
pub struct Balanced {
    pub tokens: Vec<(Token, Span)>,
    pub unmatched: Vec<Unmatched>,
}

/// Pair block tags, turning unmatched ones back into their source text
///
/// A closer pairs with the nearest open block of its kind; openers left
/// inside that block without their own closer are unmatched, as is a closer
/// with no open block of its kind.
pub fn balance(input: &str) -> Balanced {
    let mut tokens: Vec<(Token, Span)> = lexer::lex(input).collect();
    // Open blocks in source order, and their positions in `open` per kind
    let mut open: Vec<usize> = Vec::new();
    let mut open_if: Vec<usize> = Vec::new();
    let mut open_each: Vec<usize> = Vec::new();
    let mut orphans: Vec<usize> = Vec::new();

    for (idx, (tok, _)) in tokens.iter().enumerate() {
        let Token::Tag(tag) = tok else {
            continue;
        };
        if let Some(kind) = tag.opens() {
            match kind {
                BlockKind::If => open_if.push(open.len()),
                BlockKind::Each => open_each.push(open.len()),
            }
            open.push(idx);
        } else if let Some(kind) = tag.closes() {
            let (same, other) = match kind {
                BlockKind::If => (&mut open_if, &mut open_each),
                BlockKind::Each => (&mut open_each, &mut open_if),
            };
            match same.pop() {
                Some(pos) => {
                    // Everything opened after `pos` is of the other kind
                    while other.last().is_some_and(|&p| p > pos) {
                        other.pop();
                    }
                    orphans.extend(open.drain(pos + 1..));
                    open.pop();
                }
                None => orphans.push(idx),
            }
        }
    }
    orphans.extend(open);
    orphans.sort_unstable();

    let mut unmatched = Vec::with_capacity(orphans.len());
    for idx in orphans {
        let (tok, span) = &mut tokens[idx];
        let raw = input[span.clone()].to_string();
        if let Token::Tag(tag) = std::mem::replace(tok, Token::Text(raw)) {
            unmatched.push(Unmatched {
                tag,
                span: span.clone(),
            });
        }
    }

    Balanced { tokens, unmatched }
}

/// Reject streams whose paired blocks nest deeper than `max_depth`
fn check_depth(tokens: &[(Token, Span)], max_depth: usize) -> Result<(), ParseError> {
    let mut depth = 0usize;
    for (tok, span) in tokens {
        match tok {
            Token::Tag(tag) if tag.is_block_open() => {
                depth += 1;
                if depth > max_depth {
                    return Err(ParseError::NestingTooDeep {
                        span: span.clone(),
                        limit: max_depth,
                    });
                }
            }
            Token::Tag(tag) if tag.is_block_close() => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Parse template source into an AST
///
/// Malformed syntax is not an error; the only failure in practice is block
/// nesting beyond `max_depth`.
pub fn parse(input: &str, max_depth: usize) -> Result<Template, Vec<ParseError>> {
    let balanced = balance(input);
    check_depth(&balanced.tokens, max_depth).map_err(|e| vec![e])?;

    let len = input.len();
    let token_iter = balanced
        .tokens
        .into_iter()
        .map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    template_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn template_parser<'a, I>() -> impl Parser<'a, I, Template, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    // Everything that is not a block renders in place
    let leaf = select! {
        Token::Text(s) => Node::Text(s),
        Token::Tag(Tag::Variable(expr)) => Node::Variable(Path::parse(&expr)),
        Token::Tag(Tag::Helper { helper, path, fallback }) => Node::Helper {
            helper,
            path: Path::parse(&path),
            fallback,
        },
        Token::Tag(Tag::Other(raw)) => Node::Text(raw),
    };

    let node = recursive(|node| {
        let body = node.repeated().collect::<Vec<_>>();

        let if_block = select! { Token::Tag(Tag::If(path)) => Path::parse(&path) }
            .then(body.clone())
            .then_ignore(just(Token::Tag(Tag::EndIf)))
            .map(|(path, body)| Node::If { path, body });

        let each_block = select! { Token::Tag(Tag::Each(path)) => Path::parse(&path) }
            .then(body)
            .then_ignore(just(Token::Tag(Tag::EndEach)))
            .map(|(path, body)| Node::Each { path, body });

        choice((if_block, each_block, leaf.clone()))
            .map_with(|n, e| Spanned::new(n, span_range(&e.span())))
            .boxed()
    });

    node.repeated()
        .collect()
        .then_ignore(end())
        .map(|nodes| Template { nodes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::Helper;

    fn parse_ok(input: &str) -> Template {
        parse(input, 16).expect("Should parse")
    }

    #[test]
    fn test_parse_text_and_variable() {
        let tpl = parse_ok("Hello {{client.name}}!");
        assert_eq!(tpl.nodes.len(), 3);
        match &tpl.nodes[1].node {
            Node::Variable(path) => assert_eq!(path.to_string(), "client.name"),
            other => panic!("Expected variable, got {:?}", other),
        }
        assert_eq!(tpl.nodes[1].span, 6..21);
    }

    #[test]
    fn test_parse_if_block() {
        let tpl = parse_ok("{{#if retainer}}Retainer: {{retainer}}{{/if}}");
        assert_eq!(tpl.nodes.len(), 1);
        match &tpl.nodes[0].node {
            Node::If { path, body } => {
                assert_eq!(path.base(), "retainer");
                assert_eq!(body.len(), 2);
            }
            other => panic!("Expected if block, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_nested_blocks() {
        let tpl = parse_ok("{{#each matters}}{{#if open}}{{#each parties}}{{this}}{{/each}}{{/if}}{{/each}}");
        let Node::Each { body, .. } = &tpl.nodes[0].node else {
            panic!("Expected each block");
        };
        let Node::If { body, .. } = &body[0].node else {
            panic!("Expected if block");
        };
        assert!(matches!(body[0].node, Node::Each { .. }));
    }

    #[test]
    fn test_parse_helper() {
        let tpl = parse_ok("{{default phone N/A}}");
        match &tpl.nodes[0].node {
            Node::Helper {
                helper,
                path,
                fallback,
            } => {
                assert_eq!(*helper, Helper::Default);
                assert_eq!(path.base(), "phone");
                assert_eq!(fallback, "N/A");
            }
            other => panic!("Expected helper, got {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_block_becomes_text() {
        let tpl = parse_ok("{{#if a}}body");
        assert_eq!(
            tpl.nodes.iter().map(|n| n.node.clone()).collect::<Vec<_>>(),
            vec![
                Node::Text("{{#if a}}".to_string()),
                Node::Text("body".to_string()),
            ]
        );
    }

    #[test]
    fn test_stray_closer_becomes_text() {
        let tpl = parse_ok("a{{/each}}");
        assert_eq!(tpl.nodes[1].node, Node::Text("{{/each}}".to_string()));
    }

    #[test]
    fn test_crossed_blocks() {
        // The `each` opener is abandoned when `/if` closes the outer block
        let balanced = balance("{{#if a}}{{#each b}}{{/if}}{{/each}}");
        let unmatched: Vec<_> = balanced.unmatched.iter().map(|u| u.span.clone()).collect();
        assert_eq!(unmatched, vec![9..20, 27..36]);

        let tpl = parse_ok("{{#if a}}{{#each b}}{{/if}}{{/each}}");
        assert_eq!(tpl.nodes.len(), 2);
        match &tpl.nodes[0].node {
            Node::If { body, .. } => {
                assert_eq!(body[0].node, Node::Text("{{#each b}}".to_string()));
            }
            other => panic!("Expected if block, got {:?}", other),
        }
    }

    #[test]
    fn test_interleaved_crossings() {
        let balanced = balance("{{#each a}}{{#if b}}{{#each c}}{{#if d}}{{/each}}{{/if}}{{/each}}");
        let unmatched: Vec<_> = balanced.unmatched.iter().map(|u| u.span.clone()).collect();
        // `/each` closes `c` and abandons `d`; `/if` closes `b`; the last `/each` closes `a`
        assert_eq!(unmatched, vec![31..40]);
    }

    #[test]
    fn test_many_unclosed_openers_balance_in_linear_time() {
        let input = format!("{}{}", "{{#if a}}".repeat(40_000), "{{/each}}".repeat(40_000));
        let start = std::time::Instant::now();
        let balanced = balance(&input);
        assert_eq!(balanced.unmatched.len(), 80_000);
        assert!(
            start.elapsed() < std::time::Duration::from_secs(2),
            "balance took {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn test_nesting_limit() {
        let input = "{{#if a}}{{#if b}}{{#if c}}x{{/if}}{{/if}}{{/if}}";
        assert!(parse(input, 3).is_ok());
        let errs = parse(input, 2).unwrap_err();
        assert!(matches!(
            errs[0],
            ParseError::NestingTooDeep { limit: 2, .. }
        ));
    }

    #[test]
    fn test_unclosed_openers_do_not_count_toward_depth() {
        let input = "{{#if a}}".repeat(10);
        assert!(parse(&input, 1).is_ok());
    }
}
