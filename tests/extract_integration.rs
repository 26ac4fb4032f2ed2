//! Integration tests for variable extraction

use std::collections::BTreeSet;

use docket::extract_variable_names;
use pretty_assertions::assert_eq;

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_finds_all_reference_sites() {
    let names = extract_variable_names(
        "{{a}} {{#if b}}{{c}}{{/if}} {{#each d}}{{e}}{{/each}} {{formatDate f}}",
    );
    for expected in ["a", "b", "c", "d", "f"] {
        assert!(names.contains(expected), "missing {}", expected);
    }
}

/// Compatibility decision: names used inside loop bodies are reported too
#[test]
fn test_loop_body_names_are_extracted() {
    let names = extract_variable_names("{{#each d}}{{e}}{{/each}}");
    assert_eq!(names, set(&["d", "e"]));
}

#[test]
fn test_no_duplicates_and_base_names_only() {
    let names = extract_variable_names(
        "{{client.name}} {{client.address.city}} {{#if client.vip}}{{/if}} {{uppercase client.name}}",
    );
    assert_eq!(names, set(&["client"]));
}

#[test]
fn test_default_fallback_is_not_a_variable() {
    let names = extract_variable_names("{{default phone office}}");
    assert_eq!(names, set(&["phone"]));
}

#[test]
fn test_keywords_excluded() {
    let names = extract_variable_names(
        "{{#each items}}{{this}}{{/each}} {{formatCurrency}} {{lowercase this.name}}",
    );
    assert_eq!(names, set(&["items"]));
}

#[test]
fn test_unbalanced_blocks_still_extracted() {
    let names = extract_variable_names("{{#if retainer}} no closer");
    assert_eq!(names, set(&["retainer"]));
}

#[test]
fn test_fixture_variables() {
    let names = extract_variable_names(include_str!("fixtures/engagement-letter.tpl"));
    assert_eq!(
        names,
        set(&["client", "firm", "letter", "matter", "name", "rate", "role"])
    );
}
