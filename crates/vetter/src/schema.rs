//! Field metadata used to seed parameter declarations from an external
//! description, typically one loaded from a table definition.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::kind::ParamKind;

/// Declared metadata for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    pub kind: ParamKind,
    /// Human-readable label used in failure messages.
    pub comment: String,
}

impl FieldInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ParamKind, comment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            comment: comment.into(),
        }
    }
}

/// Lookup table of field metadata, keyed by field name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldSchema {
    fields: HashMap<String, FieldInfo>,
}

impl FieldSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: FieldInfo) -> &mut Self {
        self.fields.insert(info.name.clone(), info);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Metadata for `name`, falling back to a string field labelled with
    /// its own name when the schema does not describe it.
    #[must_use]
    pub fn resolve(&self, name: &str) -> FieldInfo {
        self.fields.get(name).cloned().unwrap_or_else(|| FieldInfo {
            name: name.to_string(),
            kind: ParamKind::String,
            comment: name.to_string(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<FieldInfo> for FieldSchema {
    fn from_iter<I: IntoIterator<Item = FieldInfo>>(fields: I) -> Self {
        let mut schema = Self::new();
        for info in fields {
            schema.insert(info);
        }
        schema
    }
}
