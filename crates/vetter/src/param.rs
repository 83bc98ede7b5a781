//! Parameter declarations.
//!
//! A [`Parameter`] describes one input field: its declared type, the
//! label used in failure messages, the backing field it maps to in the
//! output, optional default, and an ordered set of rules. Rule order is
//! insertion order and checks run fail-fast in that order; a `type` rule
//! is always present and always first.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::VetError;
use crate::kind::ParamKind;
use crate::registry;
use crate::rules::compile_pattern;

/// Declaration of a single input parameter.
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    name: String,
    kind: ParamKind,
    comment: String,
    /// Backing field name; output is keyed by this when set.
    field: Option<String>,
    required: bool,
    default: Option<Value>,
    /// Rule name to bound arguments, in execution order.
    rules: IndexMap<String, Vec<Value>>,
    /// Logical key to backing key, applied to map-valued parameters.
    aliases: HashMap<String, String>,
    value_types: Vec<ParamKind>,
}

impl Parameter {
    /// New optional parameter. The `type` rule is seeded immediately so
    /// it always runs first. An empty comment falls back to the name.
    pub fn new(
        name: impl Into<String>,
        kind: ParamKind,
        comment: impl Into<String>,
        field: Option<String>,
    ) -> Self {
        let name = name.into();
        let comment = comment.into();
        let comment = if comment.is_empty() {
            name.clone()
        } else {
            comment
        };
        let mut rules = IndexMap::new();
        rules.insert("type".to_string(), vec![Value::String(kind.name().to_string())]);
        Self {
            name,
            kind,
            comment,
            field,
            required: false,
            default: None,
            rules,
            aliases: HashMap::new(),
            value_types: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Key the validated value is stored under: the backing field when
    /// one is declared, otherwise the parameter name.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[must_use]
    pub fn rules(&self) -> &IndexMap<String, Vec<Value>> {
        &self.rules
    }

    #[must_use]
    pub fn value_types(&self) -> &[ParamKind] {
        &self.value_types
    }

    #[must_use]
    pub fn alias_of(&self, logical: &str) -> Option<&str> {
        self.aliases.get(logical).map(String::as_str)
    }

    #[must_use]
    pub fn has_aliases(&self) -> bool {
        !self.aliases.is_empty()
    }

    // ------------------------------------------------------------------
    // Fluent constraints
    // ------------------------------------------------------------------

    pub fn required(&mut self) -> &mut Self {
        self.required = true;
        self.rules
            .entry("required".to_string())
            .or_insert_with(Vec::new);
        self
    }

    /// Default injected when the input omits this parameter. The
    /// default is validated and coerced like a supplied value.
    pub fn default_to(&mut self, value: impl Into<Value>) -> &mut Self {
        self.default = Some(value.into());
        self
    }

    fn set_rule(&mut self, rule: &str, args: Vec<Value>) -> &mut Self {
        self.rules.insert(rule.to_string(), args);
        self
    }

    /// Membership constraint; re-declaring replaces the option set.
    pub fn one_of(&mut self, options: impl IntoIterator<Item = Value>) -> &mut Self {
        self.set_rule("in", options.into_iter().collect())
    }

    pub fn lt(&mut self, bound: impl Into<Value>) -> &mut Self {
        self.set_rule("lt", vec![bound.into()])
    }

    pub fn elt(&mut self, bound: impl Into<Value>) -> &mut Self {
        self.set_rule("elt", vec![bound.into()])
    }

    pub fn eq(&mut self, bound: impl Into<Value>) -> &mut Self {
        self.set_rule("eq", vec![bound.into()])
    }

    pub fn egt(&mut self, bound: impl Into<Value>) -> &mut Self {
        self.set_rule("egt", vec![bound.into()])
    }

    pub fn gt(&mut self, bound: impl Into<Value>) -> &mut Self {
        self.set_rule("gt", vec![bound.into()])
    }

    /// Inclusive range; pass `"-inf"` / `"+inf"` for an open side.
    pub fn between(&mut self, min: impl Into<Value>, max: impl Into<Value>) -> &mut Self {
        self.set_rule("between", vec![min.into(), max.into()])
    }

    /// Character length: exact when `max` is `None`, range otherwise.
    pub fn length(&mut self, min: usize, max: impl Into<Option<usize>>) -> &mut Self {
        let mut args = vec![Value::from(min)];
        if let Some(max) = max.into() {
            args.push(Value::from(max));
        }
        self.set_rule("length", args)
    }

    /// Element count: exact when `max` is `None`, range otherwise.
    pub fn size(&mut self, min: usize, max: impl Into<Option<usize>>) -> &mut Self {
        let mut args = vec![Value::from(min)];
        if let Some(max) = max.into() {
            args.push(Value::from(max));
        }
        self.set_rule("size", args)
    }

    /// Required type of every element of a container value. Also drives
    /// output coercion when a single type is given for an array value.
    pub fn value_type(&mut self, kinds: impl IntoIterator<Item = ParamKind>) -> &mut Self {
        self.value_types = kinds.into_iter().collect();
        let args = self
            .value_types
            .iter()
            .map(|kind| Value::String(kind.name().to_string()))
            .collect();
        self.set_rule("valueType", args)
    }

    /// Allowed first key of a map value.
    pub fn key(&mut self, allowed: impl IntoIterator<Item = Value>) -> &mut Self {
        let set = Value::Array(allowed.into_iter().collect());
        self.set_rule("key", vec![set])
    }

    /// Allowed first value of a map value.
    pub fn value(&mut self, allowed: impl IntoIterator<Item = Value>) -> &mut Self {
        let set = Value::Array(allowed.into_iter().collect());
        self.set_rule("value", vec![set])
    }

    /// Strict date/time format constraint (`strftime` syntax).
    pub fn date_format(&mut self, format: &str) -> &mut Self {
        self.set_rule("date", vec![Value::String(format.to_string())])
    }

    /// Cross-field equality with another raw input field.
    pub fn confirm(&mut self, other: &str) -> &mut Self {
        self.set_rule("confirm", vec![Value::String(other.to_string())])
    }

    /// Logical-to-backing key renames applied to map values on output.
    pub fn alias<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (logical, backing) in pairs {
            self.aliases.insert(logical.into(), backing.into());
        }
        self
    }

    // ------------------------------------------------------------------
    // Fallible constraints
    // ------------------------------------------------------------------

    /// Pattern constraint; the pattern is compiled eagerly so a broken
    /// declaration fails at bind time, not at check time.
    pub fn pattern(&mut self, pattern: &str) -> Result<&mut Self, VetError> {
        compile_pattern(pattern).map_err(|err| VetError::InvalidPattern {
            param: self.name.clone(),
            pattern: pattern.to_string(),
            reason: err.to_string(),
        })?;
        Ok(self.set_rule("regex", vec![Value::String(pattern.to_string())]))
    }

    /// Attaches an arbitrary registered rule by name, validating the
    /// name and argument count up front.
    pub fn rule(&mut self, name: &str, args: Vec<Value>) -> Result<&mut Self, VetError> {
        registry::resolve(&self.name, name, &args)?;
        if name == "regex" {
            if let Some(pattern) = args.first().and_then(Value::as_str) {
                return self.pattern(pattern);
            }
        }
        Ok(self.set_rule(name, args))
    }
}
