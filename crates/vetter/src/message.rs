//! Failure-message catalog and template rendering.
//!
//! Templates carry `:placeholder` slots filled in at render time. Lookup
//! is layered from most to least specific so a single override can
//! retarget one field, one rule, or one rule arity.

use std::collections::HashMap;

/// Template used when no catalog entry matches.
pub const FALLBACK: &str = "很抱歉、参数[:attribute]验证失败！";

/// Built-in templates, keyed by rule name with an optional argument-count
/// suffix (`length1` is the single-argument form of `length`).
static BUILTIN: &[(&str, &str)] = &[
    ("required", "很抱歉、:attribute不能为空！"),
    ("type", "很抱歉、:attribute必须是:type类型！"),
    ("confirm", "很抱歉、:attribute必须和:attribute2保持一致！"),
    ("lt", "很抱歉、:attribute必须小于:condition！"),
    ("elt", "很抱歉、:attribute必须小于等于:condition！"),
    ("eq", "很抱歉、:attribute必须等于:condition！"),
    ("gt", "很抱歉、:attribute必须大于:condition！"),
    ("egt", "很抱歉、:attribute必须大于等于:condition！"),
    ("in", "很抱歉、:attribute只能在[:condition]之间！"),
    ("between", "很抱歉、:attribute只能在:condition之间！"),
    ("length", "很抱歉、:attribute的长度只能在[:condition]位之间！"),
    ("length1", "很抱歉、:attribute的长度必须是[:condition]位！"),
    ("alpha", "很抱歉、:attribute只能是纯字母！"),
    ("alphaNum", "很抱歉、:attribute只能是字母和数字！"),
    ("alphaDash", "很抱歉、:attribute只能是字母和数字，下划线_及破折号-！"),
    ("chs", "很抱歉、:attribute只能是汉字！"),
    ("chsAlpha", "很抱歉、:attribute只能是汉字、字母！"),
    ("chsAlphaNum", "很抱歉、:attribute汉字、字母和数字！"),
    ("chsDash", "很抱歉、:attribute只能是汉字、字母、数字和下划线_及破折号-"),
    ("mobile", "很抱歉、:attribute格式不正确！"),
    ("idCard", "很抱歉、:attribute格式不正确！"),
    ("zip", "很抱歉、:attribute格式不正确！"),
    ("regex", "很抱歉、:attribute格式不正确！"),
    ("date", "很抱歉、:attribute的格式必须是[:condition]！"),
    ("size", "很抱歉、:attribute的元素数量只能在[:size]个之间"),
    ("size1", "很抱歉、:attribute必须是:size个元素"),
    ("valueType", "很抱歉、:attribute的元素类型必须在[:valueType]之间！"),
    ("valueType1", "很抱歉、:attribute的元素类型必须是:valueType类型！"),
    ("key", "很抱歉、:attribute的键名只能在[:condition]之间！"),
    ("value", "很抱歉、:attribute的键值只能在[:condition]之间！"),
];

/// Registry of failure-message templates with override support.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageCatalog {
    /// Catalog with only the built-in templates.
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: BUILTIN
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    /// Adds or replaces templates. Keys may be rule-level (`"length"`),
    /// arity-qualified (`"length1"`), or field-qualified (`"age.gt"`).
    pub fn merge<K, V>(&mut self, overrides: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, template) in overrides {
            self.messages.insert(key.into(), template.into());
        }
    }

    /// Resolves the template for a rule failure, most specific key first:
    /// `field.rule<argc>`, `field.rule`, `rule<argc>`, `rule`, fallback.
    #[must_use]
    pub fn resolve(&self, field: &str, rule: &str, argc: usize) -> &str {
        let candidates = [
            format!("{field}.{rule}{argc}"),
            format!("{field}.{rule}"),
            format!("{rule}{argc}"),
            rule.to_string(),
        ];
        candidates
            .iter()
            .find_map(|key| self.messages.get(key))
            .map_or(FALLBACK, String::as_str)
    }
}

/// Fills `:name` placeholders in a template. Longer placeholder names are
/// substituted first, so `:attribute2` is never clobbered by `:attribute`.
#[must_use]
pub fn interpolate(template: &str, pairs: &[(&str, String)]) -> String {
    let mut ordered: Vec<&(&str, String)> = pairs.iter().collect();
    ordered.sort_by_key(|(name, _)| std::cmp::Reverse(name.len()));
    let mut rendered = template.to_string();
    for (name, value) in ordered {
        rendered = rendered.replace(&format!(":{name}"), value);
    }
    rendered
}
