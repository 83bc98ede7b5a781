//! Rule registry: maps rule names to predicate functions and arity bounds.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde_json::Value;

use crate::ValueMap;
use crate::error::VetError;
use crate::rules;

/// A registered predicate. Most rules only see the value and their bound
/// arguments; context rules additionally see the raw input map and the
/// output built so far.
#[derive(Clone, Copy, Debug)]
pub enum RuleFn {
    Simple(fn(&Value, &[Value]) -> bool),
    Contextual(fn(&Value, &[Value], &ValueMap, &ValueMap) -> bool),
}

/// A rule's registry entry: predicate plus argument-count bounds.
#[derive(Clone, Copy, Debug)]
pub struct RuleSpec {
    pub name: &'static str,
    pub func: RuleFn,
    pub min_args: usize,
    /// `None` means variadic.
    pub max_args: Option<usize>,
}

/// Rules that receive the input/output maps alongside the value.
const CONTEXT_RULES: &[&str] = &["confirm"];

static REGISTRY: LazyLock<HashMap<&'static str, RuleSpec>> = LazyLock::new(|| {
    let entries: &[RuleSpec] = &[
        simple("required", rules::required, 0, Some(0)),
        simple("type", rules::type_of, 1, Some(1)),
        simple("regex", rules::regex, 1, Some(1)),
        simple("key", rules::key, 1, Some(1)),
        simple("value", rules::value, 1, Some(1)),
        simple("size", rules::size, 1, Some(2)),
        simple("valueType", rules::value_type, 1, None),
        simple("length", rules::length, 1, Some(2)),
        simple("between", rules::between, 2, Some(2)),
        simple("in", rules::one_of, 1, None),
        simple("lt", rules::lt, 1, Some(1)),
        simple("elt", rules::elt, 1, Some(1)),
        simple("eq", rules::eq, 1, Some(1)),
        simple("egt", rules::egt, 1, Some(1)),
        simple("gt", rules::gt, 1, Some(1)),
        simple("date", rules::date, 1, Some(1)),
        RuleSpec {
            name: "confirm",
            func: RuleFn::Contextual(rules::confirm),
            min_args: 1,
            max_args: Some(1),
        },
    ];
    entries.iter().map(|spec| (spec.name, *spec)).collect()
});

const fn simple(
    name: &'static str,
    func: fn(&Value, &[Value]) -> bool,
    min_args: usize,
    max_args: Option<usize>,
) -> RuleSpec {
    RuleSpec {
        name,
        func: RuleFn::Simple(func),
        min_args,
        max_args,
    }
}

/// Looks up a rule by name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static RuleSpec> {
    REGISTRY.get(name)
}

/// Whether the named rule needs the input/output maps.
#[must_use]
pub fn needs_context(name: &str) -> bool {
    CONTEXT_RULES.contains(&name)
}

/// Validates a rule name and argument count for a parameter, returning
/// the matching spec.
pub fn resolve(param: &str, rule: &str, args: &[Value]) -> Result<&'static RuleSpec, VetError> {
    let spec = lookup(rule).ok_or_else(|| VetError::UnknownRule {
        param: param.to_string(),
        rule: rule.to_string(),
    })?;
    let ok = args.len() >= spec.min_args && spec.max_args.is_none_or(|max| args.len() <= max);
    if !ok {
        let expected = match spec.max_args {
            None => format!("at least {}", spec.min_args),
            Some(max) if max == spec.min_args => spec.min_args.to_string(),
            Some(max) => format!("{}..={max}", spec.min_args),
        };
        return Err(VetError::BadArity {
            param: param.to_string(),
            rule: rule.to_string(),
            expected,
            got: args.len(),
        });
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_builtin_resolves() {
        for name in [
            "required", "type", "regex", "key", "value", "size", "valueType", "length",
            "between", "in", "lt", "elt", "eq", "egt", "gt", "date", "confirm",
        ] {
            assert!(lookup(name).is_some(), "missing rule {name}");
        }
        assert!(lookup("shouty").is_none());
    }

    #[test]
    fn unknown_rule_is_config_error() {
        let err = resolve("age", "shouty", &[]).unwrap_err();
        assert!(matches!(err, VetError::UnknownRule { .. }));
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn arity_bounds() {
        assert!(resolve("age", "between", &[json!(0), json!(150)]).is_ok());
        let err = resolve("age", "between", &[json!(0)]).unwrap_err();
        assert!(matches!(err, VetError::BadArity { got: 1, .. }));
        // Variadic rules accept any count past the minimum.
        assert!(resolve("status", "in", &[json!(0), json!(1), json!(2)]).is_ok());
        assert!(resolve("status", "in", &[]).is_err());
        assert!(resolve("id", "required", &[]).is_ok());
        assert!(resolve("id", "required", &[json!(1)]).is_err());
    }

    #[test]
    fn context_rules() {
        assert!(needs_context("confirm"));
        assert!(!needs_context("eq"));
        let spec = lookup("confirm").unwrap();
        assert!(matches!(spec.func, RuleFn::Contextual(_)));
    }
}
