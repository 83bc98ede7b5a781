//! Stateless rule predicates.
//!
//! Each function here is a pure check over a runtime value and the rule's
//! bound arguments. Predicates never allocate errors — they only answer
//! pass/fail; message rendering lives in the engine. The only rule that
//! needs request-wide context is [`confirm`], which receives the full raw
//! input map and the partially-built output map.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde_json::Value;

use crate::ValueMap;
use crate::kind::ParamKind;

// ============================================================================
// NAMED PATTERNS
// ============================================================================

/// Built-in named regex patterns, resolvable by the `regex` rule and used
/// by the `int`/`float` type checks.
static NAMED_PATTERNS: &[(&str, &str)] = &[
    ("int", r"^-?\d+$"),
    ("float", r"^-?\d+(\.\d+)?$"),
    ("alpha", r"^[A-Za-z]+$"),
    ("alphaNum", r"^[A-Za-z0-9]+$"),
    ("alphaDash", r"^[A-Za-z0-9\-_]+$"),
    ("chs", r"^[\x{4e00}-\x{9fa5}]+$"),
    ("chsAlpha", r"^[\x{4e00}-\x{9fa5}a-zA-Z]+$"),
    ("chsAlphaNum", r"^[\x{4e00}-\x{9fa5}a-zA-Z0-9]+$"),
    ("chsDash", r"^[\x{4e00}-\x{9fa5}a-zA-Z0-9_\-]+$"),
    ("mobile", r"^1[3-9]\d{9}$"),
    (
        "idCard",
        r"(^[1-9]\d{5}(18|19|([23]\d))\d{2}((0[1-9])|(10|11|12))(([0-2][1-9])|10|20|30|31)\d{3}[0-9Xx]$)|(^[1-9]\d{5}\d{2}((0[1-9])|(10|11|12))(([0-2][1-9])|10|20|30|31)\d{3}$)",
    ),
    ("zip", r"\d{6}"),
];

static NAMED: LazyLock<HashMap<&'static str, Regex>> = LazyLock::new(|| {
    NAMED_PATTERNS
        .iter()
        .map(|(name, pattern)| (*name, Regex::new(pattern).expect("built-in pattern compiles")))
        .collect()
});

/// Looks up a built-in named pattern.
pub(crate) fn named_pattern(name: &str) -> Option<&'static Regex> {
    NAMED.get(name)
}

/// Whether `name` is a built-in named pattern.
#[must_use]
pub fn is_named_pattern(name: &str) -> bool {
    NAMED.contains_key(name)
}

/// Compiles a rule pattern: a named alias resolves to its built-in regex;
/// a `/.../flags`-delimited pattern is used as written (flags become
/// inline `(?imsU)` modifiers); anything else is a bare pattern and gets
/// wrapped in `^...$` anchors.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    if let Some(re) = named_pattern(pattern) {
        return Ok(re.clone());
    }
    if let Some((inner, flags)) = strip_delimiters(pattern) {
        let expr = if flags.is_empty() {
            inner.to_string()
        } else {
            format!("(?{flags}){inner}")
        };
        return Regex::new(&expr);
    }
    Regex::new(&format!("^{pattern}$"))
}

/// Splits a `/.../flags` pattern into body and flags, if it is one.
fn strip_delimiters(pattern: &str) -> Option<(&str, &str)> {
    let rest = pattern.strip_prefix('/')?;
    let close = rest.rfind('/')?;
    let (inner, flags) = (&rest[..close], &rest[close + 1..]);
    if flags.len() <= 4 && flags.chars().all(|c| matches!(c, 'i' | 'm' | 's' | 'U')) {
        Some((inner, flags))
    } else {
        None
    }
}

// ============================================================================
// VALUE HELPERS
// ============================================================================

/// Whether the value is a scalar (string, number or bool).
pub(crate) fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

/// The loose string form of a value: numbers print plainly, `true`/`false`
/// become `"1"`/`""`, null becomes `""`, containers print as JSON.
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The numeric view of a value, if it has one. Strings only count as
/// numeric when they parse in full; infinities and NaN do not count, so
/// the `"-inf"`/`"+inf"` range sentinels stay strings.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// Loose ordering: numeric when both operands are numeric, lexicographic
/// over the stringified forms otherwise. Lexicographic comparison gives
/// natural ordering for `YYYY-mm-dd HH:MM:SS` date strings.
pub(crate) fn compare(a: &Value, b: &Value) -> Ordering {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => stringify(a).cmp(&stringify(b)),
    }
}

/// Loose equality: `"1"`, `1` and `true` all compare equal.
pub(crate) fn loose_eq(a: &Value, b: &Value) -> bool {
    compare(a, b) == Ordering::Equal
}

fn bound_as_usize(args: &[Value], index: usize) -> Option<usize> {
    args.get(index).and_then(as_number).map(|f| f.max(0.0) as usize)
}

// ============================================================================
// PREDICATES
// ============================================================================

/// Passes for any value the engine hands it, including an explicit null:
/// presence is decided before rules run, so a present-but-null value
/// counts as present. Absence never reaches a predicate.
pub fn required(_value: &Value, _args: &[Value]) -> bool {
    true
}

/// Checks the value against the type named by the first argument.
/// Unknown type names pass. A sequence value with a scalar declared type
/// is checked element-wise.
pub fn type_of(value: &Value, args: &[Value]) -> bool {
    let Some(name) = args.first().and_then(Value::as_str) else {
        return true;
    };
    let Some(kind) = ParamKind::from_name(name) else {
        return true;
    };
    check_kind(value, kind)
}

pub(crate) fn check_kind(value: &Value, kind: ParamKind) -> bool {
    if let Value::Array(items) = value {
        if kind.is_scalar() {
            return items.iter().all(|item| check_kind(item, kind));
        }
    }
    match kind {
        ParamKind::Int => matches_named(value, "int"),
        ParamKind::Float => matches_named(value, "float"),
        ParamKind::Bool => {
            value.is_boolean()
                || value
                    .as_str()
                    .is_some_and(|s| matches!(s, "true" | "false" | "0" | "1"))
        }
        ParamKind::String => is_scalar(value),
        ParamKind::Array => value.is_array() || value.is_object(),
        ParamKind::Timestamp => date_ok(value, "%Y-%m-%d %H:%M:%S"),
    }
}

fn matches_named(value: &Value, name: &str) -> bool {
    is_scalar(value)
        && named_pattern(name).is_some_and(|re| re.is_match(&stringify(value)))
}

/// Matches the value's string form against a pattern (named alias,
/// delimited, or bare — see [`compile_pattern`]). Non-scalar values fail.
pub fn regex(value: &Value, args: &[Value]) -> bool {
    let Some(pattern) = args.first().and_then(Value::as_str) else {
        return false;
    };
    if !is_scalar(value) {
        return false;
    }
    match compile_pattern(pattern) {
        Ok(re) => re.is_match(&stringify(value)),
        Err(_) => false,
    }
}

fn first_key(value: &Value) -> Option<Value> {
    match value {
        Value::Object(map) => map.keys().next().cloned().map(Value::String),
        Value::Array(items) => {
            if items.is_empty() {
                None
            } else {
                Some(Value::from(0))
            }
        }
        other => Some(other.clone()),
    }
}

fn first_value(value: &Value) -> Option<Value> {
    match value {
        Value::Object(map) => map.values().next().cloned(),
        Value::Array(items) => items.first().cloned(),
        other => Some(other.clone()),
    }
}

fn member_of(probe: &Value, allowed: &Value) -> bool {
    match allowed {
        Value::Array(set) => set.iter().any(|option| loose_eq(probe, option)),
        // A non-set argument constrains nothing.
        _ => true,
    }
}

/// For container values, checks the first key against a membership set;
/// scalars are checked directly. An empty container fails.
pub fn key(value: &Value, args: &[Value]) -> bool {
    let Some(allowed) = args.first() else {
        return true;
    };
    match first_key(value) {
        Some(probe) => member_of(&probe, allowed),
        None => false,
    }
}

/// For container values, checks the first value against a membership set;
/// scalars are checked directly. An empty container fails.
pub fn value(value_: &Value, args: &[Value]) -> bool {
    let Some(allowed) = args.first() else {
        return true;
    };
    match first_value(value_) {
        Some(probe) => member_of(&probe, allowed),
        None => false,
    }
}

/// Element count of a container: `size(n)` means exactly `n` elements,
/// `size(min, max)` means an inclusive range. Non-containers fail.
pub fn size(value: &Value, args: &[Value]) -> bool {
    let count = match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => return false,
    };
    let Some(min) = bound_as_usize(args, 0) else {
        return false;
    };
    match bound_as_usize(args, 1) {
        Some(max) => count >= min && count <= max,
        None => count == min,
    }
}

/// Every element of a container must satisfy the type check for *every*
/// listed type. With mutually exclusive scalar types this only ever
/// passes when a single type is listed.
pub fn value_type(value: &Value, args: &[Value]) -> bool {
    let elements: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => return false,
    };
    let kinds: Vec<ParamKind> = args
        .iter()
        .filter_map(|arg| arg.as_str().and_then(ParamKind::from_name))
        .collect();
    elements
        .iter()
        .all(|element| kinds.iter().all(|kind| check_kind(element, *kind)))
}

/// Character length (Unicode-aware) of the value's string form:
/// `length(n)` means exactly `n`, `length(min, max)` an inclusive range.
pub fn length(value: &Value, args: &[Value]) -> bool {
    if !is_scalar(value) {
        return false;
    }
    let count = stringify(value).chars().count();
    let Some(min) = bound_as_usize(args, 0) else {
        return false;
    };
    match bound_as_usize(args, 1) {
        Some(max) => count >= min && count <= max,
        None => count == min,
    }
}

/// Inclusive range check. The sentinel bounds `"-inf"` and `"+inf"` make
/// the range one-sided.
pub fn between(value: &Value, args: &[Value]) -> bool {
    let (Some(min), Some(max)) = (args.first(), args.get(1)) else {
        return false;
    };
    let open_low = min.as_str() == Some("-inf");
    let open_high = max.as_str() == Some("+inf");
    match (open_low, open_high) {
        (true, true) => true,
        (true, false) => compare(value, max) != Ordering::Greater,
        (false, true) => compare(value, min) != Ordering::Less,
        (false, false) => {
            compare(value, max) != Ordering::Greater && compare(value, min) != Ordering::Less
        }
    }
}

/// Membership among the bound options. A sequence value passes when every
/// element is a member, which is what array-typed parameters need.
pub fn one_of(value: &Value, args: &[Value]) -> bool {
    let member = |probe: &Value| args.iter().any(|option| loose_eq(probe, option));
    match value {
        Value::Array(items) => items.iter().all(member),
        other => member(other),
    }
}

/// Strictly less than the bound.
pub fn lt(value: &Value, args: &[Value]) -> bool {
    args.first()
        .is_some_and(|bound| compare(value, bound) == Ordering::Less)
}

/// Less than or equal to the bound.
pub fn elt(value: &Value, args: &[Value]) -> bool {
    args.first()
        .is_some_and(|bound| compare(value, bound) != Ordering::Greater)
}

/// Loosely equal to the bound.
pub fn eq(value: &Value, args: &[Value]) -> bool {
    args.first().is_some_and(|bound| loose_eq(value, bound))
}

/// Greater than or equal to the bound.
pub fn egt(value: &Value, args: &[Value]) -> bool {
    args.first()
        .is_some_and(|bound| compare(value, bound) != Ordering::Less)
}

/// Strictly greater than the bound.
pub fn gt(value: &Value, args: &[Value]) -> bool {
    args.first()
        .is_some_and(|bound| compare(value, bound) == Ordering::Greater)
}

/// Strict date/time parse against a chrono `strftime` format, applied
/// element-wise over sequences. The whole input must be consumed.
pub fn date(value: &Value, args: &[Value]) -> bool {
    let Some(format) = args.first().and_then(Value::as_str) else {
        return false;
    };
    date_ok(value, format)
}

pub(crate) fn date_ok(value: &Value, format: &str) -> bool {
    match value {
        Value::Array(items) => items.iter().all(|item| date_ok(item, format)),
        Value::String(s) => {
            NaiveDateTime::parse_from_str(s, format).is_ok()
                || NaiveDate::parse_from_str(s, format).is_ok()
                || NaiveTime::parse_from_str(s, format).is_ok()
        }
        _ => false,
    }
}

/// Cross-field equality: passes iff the named field is present and
/// non-null in the raw input and loosely equal to this value.
pub fn confirm(value: &Value, args: &[Value], input: &ValueMap, _output: &ValueMap) -> bool {
    let Some(other) = args.first().and_then(Value::as_str) else {
        return false;
    };
    input
        .get(other)
        .is_some_and(|v| !v.is_null() && loose_eq(value, v))
}
