//! Path resolution and value coercions against a render scope
//!
//! A scope is the JSON value placeholders are resolved against: the caller's
//! context at the top level, or the current element inside `{{#each}}`.
//! `{{this}}` names the element only when that element is a scalar; anywhere
//! else `this` is an ordinary key.

use serde_json::Value;
use tracing::trace;

use crate::parser::ast::Path;

/// Path segments that are never resolved, whatever the scope holds
pub const FORBIDDEN_SEGMENTS: [&str; 3] = ["__proto__", "constructor", "prototype"];

pub fn is_forbidden(segment: &str) -> bool {
    FORBIDDEN_SEGMENTS.contains(&segment)
}

/// The value placeholders resolve against
#[derive(Debug, Clone, Copy)]
pub struct Scope<'v> {
    value: &'v Value,
    scalar_element: bool,
}

impl<'v> Scope<'v> {
    /// The caller's context
    pub fn root(value: &'v Value) -> Self {
        Self {
            value,
            scalar_element: false,
        }
    }

    /// One element of an `{{#each}}` array
    pub fn element(value: &'v Value) -> Self {
        Self {
            value,
            scalar_element: !matches!(value, Value::Object(_) | Value::Array(_)),
        }
    }

    pub fn resolve(&self, path: &Path) -> Option<&'v Value> {
        if self.scalar_element && path.is_this() {
            return Some(self.value);
        }
        resolve(self.value, path)
    }
}

/// Resolve a dotted path against a value
///
/// Only entries the value itself holds are reachable: object keys and array
/// indices.
pub fn resolve<'v>(value: &'v Value, path: &Path) -> Option<&'v Value> {
    let mut current = value;
    for segment in path.segments() {
        if is_forbidden(segment) {
            trace!(%path, segment = segment.as_str(), "rejected forbidden path segment");
            return None;
        }
        current = match current {
            Value::Object(map) => map.get(segment.as_str()),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
        .or_else(|| {
            trace!(%path, segment = segment.as_str(), "path did not resolve");
            None
        })?;
    }
    Some(current)
}

/// Conditional truthiness
///
/// `null`, `false`, zero, NaN and the empty string are falsy; everything else,
/// including empty arrays and objects, is truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// String form of a value as substituted into output
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(format_number).unwrap_or_default()
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Shortest round-trip form: integral floats drop the fraction, and
/// magnitudes from 1e21 up or below 1e-6 use exponent notation (`1e+21`)
pub fn format_number(n: f64) -> String {
    let abs = n.abs();
    if abs != 0.0 && (abs >= 1e21 || abs < 1e-6) {
        let formatted = format!("{:e}", n);
        match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        }
    } else if n.fract() == 0.0 && abs < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lookup<'v>(scope: &'v Value, expr: &str) -> Option<&'v Value> {
        resolve(scope, &Path::parse(expr))
    }

    #[test]
    fn test_resolve_nested() {
        let ctx = json!({"client": {"address": {"city": "Boston"}}});
        assert_eq!(lookup(&ctx, "client.address.city"), Some(&json!("Boston")));
        assert_eq!(lookup(&ctx, "client.phone"), None);
        assert_eq!(lookup(&ctx, "client.address.city.zip"), None);
    }

    #[test]
    fn test_resolve_through_null() {
        let ctx = json!({"client": null});
        assert_eq!(lookup(&ctx, "client"), Some(&Value::Null));
        assert_eq!(lookup(&ctx, "client.name"), None);
    }

    #[test]
    fn test_resolve_array_index() {
        let ctx = json!({"parties": [{"name": "Acme"}, {"name": "Globex"}]});
        assert_eq!(lookup(&ctx, "parties.1.name"), Some(&json!("Globex")));
        assert_eq!(lookup(&ctx, "parties.2.name"), None);
        assert_eq!(lookup(&ctx, "parties.length"), None);
    }

    #[test]
    fn test_forbidden_segments_rejected() {
        let ctx = json!({
            "__proto__": {"polluted": "yes"},
            "constructor": {"prototype": "x"},
            "a": {"prototype": 1}
        });
        assert_eq!(lookup(&ctx, "__proto__.polluted"), None);
        assert_eq!(lookup(&ctx, "__proto__"), None);
        assert_eq!(lookup(&ctx, "constructor.prototype"), None);
        assert_eq!(lookup(&ctx, "a.prototype"), None);
    }

    #[test]
    fn test_this_names_scalar_elements_only() {
        let path = Path::parse("this");
        assert_eq!(Scope::element(&json!(7)).resolve(&path), Some(&json!(7)));
        assert_eq!(Scope::element(&json!("a")).resolve(&path), Some(&json!("a")));
        assert_eq!(Scope::element(&json!(7)).resolve(&Path::parse("name")), None);

        let object = json!({"name": "Acme"});
        assert_eq!(Scope::element(&object).resolve(&path), None);
        assert_eq!(Scope::root(&object).resolve(&path), None);
        assert_eq!(Scope::root(&json!("scalar")).resolve(&path), None);
    }

    #[test]
    fn test_this_is_an_ordinary_key_elsewhere() {
        let ctx = json!({"this": {"name": "x"}});
        assert_eq!(Scope::root(&ctx).resolve(&Path::parse("this.name")), Some(&json!("x")));
        assert_eq!(Scope::element(&ctx).resolve(&Path::parse("this.name")), Some(&json!("x")));
    }

    #[test]
    fn test_truthiness() {
        for v in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(Some(&v)), "{} should be falsy", v);
        }
        for v in [json!(true), json!(1), json!(-0.5), json!("x"), json!([]), json!({})] {
            assert!(is_truthy(Some(&v)), "{} should be truthy", v);
        }
        assert!(!is_truthy(None));
    }

    #[test]
    fn test_display() {
        assert_eq!(display(&json!(null)), "");
        assert_eq!(display(&json!(true)), "true");
        assert_eq!(display(&json!(42)), "42");
        assert_eq!(display(&json!(3.0)), "3");
        assert_eq!(display(&json!(1234.5)), "1234.5");
        assert_eq!(display(&json!("text")), "text");
        assert_eq!(display(&json!([1, 2])), "[1,2]");
        assert_eq!(display(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_format_number_magnitudes() {
        assert_eq!(format_number(1e15), "1000000000000000");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-1.5e22), "-1.5e+22");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(0.0), "0");
    }
}
