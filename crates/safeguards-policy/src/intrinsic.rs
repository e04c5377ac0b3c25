//! Constant folding for template intrinsic expressions.
//!
//! A property value in the compiled template is either a literal, a list, or
//! a single-key object such as `{ "Ref": "Bucket" }` or
//! `{ "Fn::Join": ["", [...]] }`. This module parses those values into an
//! `Expression` and folds what can be known before deployment:
//!
//! - literals and lists of literals resolve to themselves
//! - `Fn::Join` folds when every part folds to exactly one literal
//! - `Fn::Sub` folds when its template has no `${...}` placeholders
//! - references and every other intrinsic are unresolvable
//!
//! Callers must treat "unresolvable" as "cannot prove unsafe".

use serde_json::Value;

/// Intrinsics whose value is assigned at deploy time.
const REFERENCE_INTRINSICS: &[&str] = &["Ref", "Fn::GetAtt", "Fn::ImportValue", "Fn::GetAZs"];

const JOIN: &str = "Fn::Join";
const SUB: &str = "Fn::Sub";

/// A parsed template value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// A scalar written directly in the template.
    Literal(String),
    /// A list of values. `Null` parses to the empty sequence.
    Sequence(Vec<Expression>),
    /// A pointer to a value assigned at deploy time (`Ref`, `Fn::GetAtt`, ...).
    Reference(String),
    /// `Fn::Join` with a literal delimiter and a literal list of parts.
    Join {
        delimiter: String,
        parts: Vec<Expression>,
    },
    /// `Fn::Sub` with a literal template string.
    Substitution(String),
    /// Anything else: other intrinsics, malformed intrinsics, plain objects.
    Unsupported(String),
}

impl Expression {
    /// Parse a raw JSON value into an expression tree.
    pub fn parse(value: &Value) -> Self {
        match value {
            Value::Null => Expression::Sequence(Vec::new()),
            Value::String(s) => Expression::Literal(s.clone()),
            Value::Number(n) => Expression::Literal(n.to_string()),
            Value::Bool(b) => Expression::Literal(b.to_string()),
            Value::Array(items) => Expression::Sequence(items.iter().map(Self::parse).collect()),
            Value::Object(map) => {
                let mut entries = map.iter();
                match (entries.next(), entries.next()) {
                    (Some((key, arg)), None) => Self::parse_intrinsic(key, arg),
                    _ => Expression::Unsupported("object literal".to_string()),
                }
            }
        }
    }

    fn parse_intrinsic(key: &str, arg: &Value) -> Self {
        if REFERENCE_INTRINSICS.contains(&key) {
            return Expression::Reference(key.to_string());
        }
        match key {
            JOIN => match arg.as_array().map(Vec::as_slice) {
                Some([Value::String(delimiter), Value::Array(parts)]) => Expression::Join {
                    delimiter: delimiter.clone(),
                    parts: parts.iter().map(Self::parse).collect(),
                },
                _ => Expression::Unsupported(format!("{JOIN} with non-literal arguments")),
            },
            SUB => match arg {
                Value::String(template) => Expression::Substitution(template.clone()),
                Value::Array(items) => match items.first() {
                    Some(Value::String(template)) => Expression::Substitution(template.clone()),
                    _ => Expression::Unsupported(format!("{SUB} without a literal template")),
                },
                _ => Expression::Unsupported(format!("{SUB} without a literal template")),
            },
            other if other.starts_with("Fn::") => Expression::Unsupported(other.to_string()),
            _ => Expression::Unsupported("object literal".to_string()),
        }
    }

    /// Fold this expression as far as it can be known before deployment.
    pub fn resolve(&self) -> Resolution {
        match self {
            Expression::Literal(s) => Resolution::literal(s.clone()),
            Expression::Sequence(items) => {
                let mut resolution = Resolution::empty();
                for item in items {
                    let part = item.resolve();
                    resolution.complete &= part.complete;
                    resolution.values.extend(part.values);
                }
                resolution
            }
            Expression::Reference(_) | Expression::Unsupported(_) => Resolution::unresolved(),
            Expression::Join { delimiter, parts } => {
                let mut folded = Vec::with_capacity(parts.len());
                for part in parts {
                    match part.resolve().into_single() {
                        Some(value) => folded.push(value),
                        None => return Resolution::unresolved(),
                    }
                }
                Resolution::literal(folded.join(delimiter))
            }
            Expression::Substitution(template) => match fold_substitution(template) {
                Some(body) => Resolution::literal(body),
                None => Resolution::unresolved(),
            },
        }
    }
}

/// The literals an expression folded to, plus whether folding was total.
///
/// A scalar and a one-element list resolve identically. When a list is only
/// partly resolvable, `values` holds the parts that did fold and `complete`
/// is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub values: Vec<String>,
    pub complete: bool,
}

impl Resolution {
    fn empty() -> Self {
        Self {
            values: Vec::new(),
            complete: true,
        }
    }

    fn literal(value: String) -> Self {
        Self {
            values: vec![value],
            complete: true,
        }
    }

    fn unresolved() -> Self {
        Self {
            values: Vec::new(),
            complete: false,
        }
    }

    /// Return true if any resolved literal equals `literal`.
    pub fn contains(&self, literal: &str) -> bool {
        self.values.iter().any(|v| v == literal)
    }

    /// The single literal of a complete resolution, if that is what it is.
    fn into_single(self) -> Option<String> {
        if !self.complete || self.values.len() != 1 {
            return None;
        }
        self.values.into_iter().next()
    }
}

/// Parse and fold a raw template value in one step.
pub fn resolve_value(value: &Value) -> Resolution {
    Expression::parse(value).resolve()
}

/// Fold an `Fn::Sub` template that contains no variable placeholders.
///
/// `${!Name}` is the escape for a literal `${Name}` and does not count as a
/// placeholder. Returns `None` as soon as a real placeholder is found.
fn fold_substitution(template: &str) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find("${") {
        let (before, after) = rest.split_at(pos);
        out.push_str(before);
        let after = &after[2..];
        let escaped = after.strip_prefix('!')?;
        out.push_str("${");
        rest = escaped;
    }
    out.push_str(rest);
    Some(out)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn values(value: serde_json::Value) -> (Vec<String>, bool) {
        let r = resolve_value(&value);
        (r.values, r.complete)
    }

    #[test]
    fn scalar_and_single_element_list_resolve_identically() {
        assert_eq!(resolve_value(&json!("s3:GetObject")), resolve_value(&json!(["s3:GetObject"])));
        assert_eq!(values(json!("*")), (vec!["*".to_string()], true));
    }

    #[test]
    fn null_resolves_to_nothing() {
        assert_eq!(values(json!(null)), (vec![], true));
    }

    #[test]
    fn references_are_unresolvable() {
        for value in [
            json!({ "Ref": "Bucket" }),
            json!({ "Fn::GetAtt": ["Bucket", "Arn"] }),
            json!({ "Fn::ImportValue": "shared-bucket-arn" }),
        ] {
            assert_eq!(values(value.clone()), (vec![], false), "{value} must not resolve");
        }
        assert_eq!(
            Expression::parse(&json!({ "Ref": "Bucket" })),
            Expression::Reference("Ref".to_string())
        );
    }

    #[test]
    fn join_of_literals_folds() {
        let value = json!({ "Fn::Join": [":", ["arn", "aws", "s3", "", "", "bucket/*"]] });
        assert_eq!(values(value), (vec!["arn:aws:s3:::bucket/*".to_string()], true));

        let star = json!({ "Fn::Join": ["", ["*"]] });
        assert_eq!(values(star), (vec!["*".to_string()], true));
    }

    #[test]
    fn join_with_reference_part_is_unresolvable() {
        let value = json!({ "Fn::Join": ["", ["arn:aws:s3:::", { "Ref": "Bucket" }, "/*"]] });
        assert_eq!(values(value), (vec![], false));
    }

    #[test]
    fn nested_join_folds() {
        let value = json!({
            "Fn::Join": ["/", [{ "Fn::Join": ["", ["a", "b"]] }, { "Fn::Sub": "c" }]]
        });
        assert_eq!(values(value), (vec!["ab/c".to_string()], true));
    }

    #[test]
    fn join_with_non_list_parts_is_unresolvable() {
        let value = json!({ "Fn::Join": ["", { "Fn::Split": [",", "a,b"] }] });
        assert_eq!(values(value), (vec![], false));
    }

    #[test]
    fn substitution_without_placeholders_folds() {
        assert_eq!(values(json!({ "Fn::Sub": "*" })), (vec!["*".to_string()], true));
        assert_eq!(values(json!({ "Fn::Sub": ["*"] })), (vec!["*".to_string()], true));
        assert_eq!(
            values(json!({ "Fn::Sub": "arn:${!Literal}" })),
            (vec!["arn:${Literal}".to_string()], true)
        );
    }

    #[test]
    fn substitution_with_placeholders_is_unresolvable() {
        let value = json!({ "Fn::Sub": "arn:aws:s3:::${BucketName}/*" });
        assert_eq!(values(value), (vec![], false));

        let value = json!({ "Fn::Sub": ["${Prefix}-*", { "Prefix": "logs" }] });
        assert_eq!(values(value), (vec![], false));
    }

    #[test]
    fn partially_resolvable_list_keeps_resolved_literals() {
        let r = resolve_value(&json!(["*", { "Ref": "Bucket" }]));
        assert!(!r.complete);
        assert!(r.contains("*"));
    }

    #[test]
    fn other_intrinsics_and_objects_are_unsupported() {
        assert!(matches!(
            Expression::parse(&json!({ "Fn::If": ["Cond", "a", "b"] })),
            Expression::Unsupported(_)
        ));
        assert!(matches!(
            Expression::parse(&json!({ "a": 1, "b": 2 })),
            Expression::Unsupported(_)
        ));
    }
}
