//! Validation engine: parameter registration, the check pipeline, and
//! message rendering.

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde_json::Value;
use tracing::{debug, trace};

use crate::ValueMap;
use crate::error::VetError;
use crate::kind::ParamKind;
use crate::message::{MessageCatalog, interpolate};
use crate::param::Parameter;
use crate::registry::{self, RuleFn};
use crate::rules::{is_named_pattern, stringify};
use crate::schema::FieldSchema;
use crate::transform::transform;

/// Declarative input validator.
///
/// Parameters are registered up front with [`bind`](Engine::bind) and
/// friends, then [`check`](Engine::check) runs the whole declaration
/// against a raw input map and produces a coerced output map keyed by
/// backing field names. Parameters are validated in registration order
/// and each parameter's rules run in declaration order, fail-fast.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    parameters: IndexMap<String, Parameter>,
    messages: MessageCatalog,
    schema: FieldSchema,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parameters: IndexMap::new(),
            messages: MessageCatalog::new(),
            schema: FieldSchema::new(),
        }
    }

    /// Seeds the engine with field metadata for
    /// [`bind_field`](Engine::bind_field) and
    /// [`bind_alias`](Engine::bind_alias).
    #[must_use]
    pub fn with_schema(mut self, schema: FieldSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Installs message-template overrides on top of the built-ins.
    #[must_use]
    pub fn with_messages<K, V>(mut self, overrides: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.messages.merge(overrides);
        self
    }

    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Registers a parameter stored under its own name. Re-binding the
    /// same name replaces the declaration but keeps its position.
    pub fn bind(
        &mut self,
        name: impl Into<String>,
        kind: ParamKind,
        comment: impl Into<String>,
    ) -> &mut Parameter {
        self.install(Parameter::new(name, kind, comment, None))
    }

    /// Registers a parameter whose validated value is stored under a
    /// different backing field name.
    pub fn bind_to(
        &mut self,
        name: impl Into<String>,
        kind: ParamKind,
        comment: impl Into<String>,
        field: impl Into<String>,
    ) -> &mut Parameter {
        self.install(Parameter::new(name, kind, comment, Some(field.into())))
    }

    /// Registers a parameter from schema metadata; unknown fields fall
    /// back to a string parameter labelled with the field name.
    pub fn bind_field(&mut self, field: &str) -> &mut Parameter {
        let info = self.schema.resolve(field);
        self.install(Parameter::new(info.name, info.kind, info.comment, None))
    }

    /// Registers a renamed parameter backed by a schema field: input
    /// arrives under `name`, output is stored under `field`, and type
    /// and label come from the schema.
    pub fn bind_alias(&mut self, name: impl Into<String>, field: &str) -> &mut Parameter {
        let info = self.schema.resolve(field);
        self.install(Parameter::new(
            name,
            info.kind,
            info.comment,
            Some(field.to_string()),
        ))
    }

    fn install(&mut self, param: Parameter) -> &mut Parameter {
        match self.parameters.entry(param.name().to_string()) {
            Entry::Occupied(entry) => {
                let slot = entry.into_mut();
                *slot = param;
                slot
            }
            Entry::Vacant(entry) => entry.insert(param),
        }
    }

    // ------------------------------------------------------------------
    // Canned parameters
    // ------------------------------------------------------------------

    /// Registers an `order` parameter: a single-entry map from one of
    /// the already-bound parameter names to `"asc"` or `"desc"`. Output
    /// keys are remapped to the bound parameters' backing fields and the
    /// given pair becomes the default ordering. Every name must already
    /// be bound.
    pub fn order(&mut self, keys: &[&str], default: (&str, &str)) -> Result<&mut Parameter, VetError> {
        self.order_as(keys, default, "order", "排序字段")
    }

    /// [`order`](Engine::order) with a custom parameter name and label.
    pub fn order_as(
        &mut self,
        keys: &[&str],
        default: (&str, &str),
        name: &str,
        comment: &str,
    ) -> Result<&mut Parameter, VetError> {
        let mut aliases = Vec::with_capacity(keys.len());
        for key in keys {
            let bound = self
                .parameters
                .get(*key)
                .ok_or_else(|| VetError::UnboundOrderKey {
                    key: (*key).to_string(),
                })?;
            aliases.push(((*key).to_string(), bound.storage_key().to_string()));
        }
        if !keys.contains(&default.0) {
            return Err(VetError::UnboundOrderKey {
                key: default.0.to_string(),
            });
        }
        let allowed: Vec<Value> = keys.iter().map(|key| Value::from(*key)).collect();
        let mut fallback = ValueMap::new();
        fallback.insert(default.0.to_string(), Value::from(default.1));

        let param = self.bind(name, ParamKind::Array, comment);
        param
            .key(allowed)
            .value([Value::from("desc"), Value::from("asc")])
            .size(1, None)
            .alias(aliases)
            .default_to(Value::Object(fallback));
        Ok(param)
    }

    /// Registers a `page` parameter: a `[page_no, page_size]` pair of
    /// integers, defaulting to the given values.
    pub fn page(&mut self, no: u64, size: u64) -> &mut Parameter {
        self.page_as(no, size, "page", "分页字段")
    }

    /// [`page`](Engine::page) with a custom parameter name and label.
    pub fn page_as(&mut self, no: u64, size: u64, name: &str, comment: &str) -> &mut Parameter {
        let param = self.bind(name, ParamKind::Array, comment);
        param
            .value_type([ParamKind::Int])
            .size(2, None)
            .default_to(Value::Array(vec![Value::from(no), Value::from(size)]));
        param
    }

    // ------------------------------------------------------------------
    // Checking
    // ------------------------------------------------------------------

    /// Runs the whole declaration against `input`.
    ///
    /// Missing required parameters without a default abort immediately;
    /// missing parameters with a default take it and are then validated
    /// like any supplied value. A null value for a non-required
    /// parameter is skipped and omitted from the output; a required
    /// null still runs its rules (and fails the type rule, since no
    /// declared type admits null). Input keys with no bound parameter
    /// are ignored. On success the output holds every surviving value,
    /// coerced to its declared type and keyed by its backing field.
    pub fn check(&self, input: &ValueMap) -> Result<ValueMap, VetError> {
        let mut output = ValueMap::new();

        for param in self.parameters.values() {
            let value = match input.get(param.name()) {
                Some(value) => value.clone(),
                None => match param.default_value() {
                    Some(default) => default.clone(),
                    None if param.is_required() => {
                        let message = self.render(param, "required", &[]);
                        debug!(param = param.name(), "missing required parameter");
                        return Err(VetError::Required {
                            param: param.name().to_string(),
                            message,
                        });
                    }
                    None => continue,
                },
            };

            if value.is_null() && !param.is_required() {
                continue;
            }

            self.run_rules(param, &value, input, &output)?;

            let value = self.remap_aliases(param, value);
            let coerced = transform(value, self.target_kind(param));
            output.insert(param.storage_key().to_string(), coerced);
        }

        Ok(output)
    }

    fn run_rules(
        &self,
        param: &Parameter,
        value: &Value,
        input: &ValueMap,
        output: &ValueMap,
    ) -> Result<(), VetError> {
        for (rule, args) in param.rules() {
            let Some(spec) = registry::lookup(rule) else {
                return Err(VetError::UnknownRule {
                    param: param.name().to_string(),
                    rule: rule.clone(),
                });
            };
            let passed = match spec.func {
                RuleFn::Simple(f) => f(value, args),
                RuleFn::Contextual(f) => f(value, args, input, output),
            };
            trace!(param = param.name(), rule, passed, "rule evaluated");
            if !passed {
                let message = self.render(param, rule, args);
                debug!(param = param.name(), rule, %message, "validation failed");
                return Err(VetError::RuleFailed {
                    param: param.name().to_string(),
                    rule: rule.clone(),
                    message,
                });
            }
        }
        Ok(())
    }

    /// Output coercion target: an array parameter with exactly one
    /// declared element type is coerced element-wise to that type.
    fn target_kind(&self, param: &Parameter) -> ParamKind {
        if param.kind() == ParamKind::Array {
            if let [single] = param.value_types() {
                return *single;
            }
        }
        param.kind()
    }

    fn remap_aliases(&self, param: &Parameter, value: Value) -> Value {
        if !param.has_aliases() {
            return value;
        }
        match value {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| {
                        let key = param.alias_of(&key).map_or(key, str::to_string);
                        (key, value)
                    })
                    .collect(),
            ),
            other => other,
        }
    }

    // ------------------------------------------------------------------
    // Message rendering
    // ------------------------------------------------------------------

    fn render(&self, param: &Parameter, rule: &str, args: &[Value]) -> String {
        // A regex rule bound to a named pattern reads as that pattern's
        // message ("mobile", "alphaNum", ...).
        let key = match (rule, args.first().and_then(Value::as_str)) {
            ("regex", Some(name)) if is_named_pattern(name) => name,
            _ => rule,
        };
        let template = self.messages.resolve(param.name(), key, args.len());

        let condition = args
            .iter()
            .map(|arg| match arg {
                Value::Array(set) => set
                    .iter()
                    .map(stringify)
                    .collect::<Vec<_>>()
                    .join(","),
                other => stringify(other),
            })
            .collect::<Vec<_>>()
            .join(",");
        let value_types = args
            .iter()
            .filter_map(Value::as_str)
            .map(|name| {
                ParamKind::from_name(name).map_or_else(|| name.to_string(), |kind| kind.label().to_string())
            })
            .collect::<Vec<_>>()
            .join(",");
        let confirm_target = args
            .first()
            .and_then(Value::as_str)
            .and_then(|other| self.parameters.get(other))
            .map_or_else(|| "相关字段".to_string(), |p| p.comment().to_string());
        // Only the first bound count shows up, even for a range.
        let size = args.first().map_or_else(|| "0".to_string(), stringify);

        let pairs = [
            ("attribute2", confirm_target),
            ("attribute", param.comment().to_string()),
            ("valueType", value_types),
            ("condition", condition),
            ("type", param.kind().label().to_string()),
            ("size", size),
        ];
        interpolate(template, &pairs)
    }
}
