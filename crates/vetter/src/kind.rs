use serde::{Deserialize, Serialize};

/// The declared type of a parameter.
///
/// `Array` covers both JSON arrays and JSON objects (keyed maps), which is
/// what sort-direction parameters like `{"createdAt": "desc"}` arrive as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    String,
    Int,
    Float,
    Bool,
    Array,
    Timestamp,
}

impl ParamKind {
    /// The canonical type name used in rule arguments and schemas.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Array => "array",
            Self::Timestamp => "timestamp",
        }
    }

    /// Parses a canonical type name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "bool" => Some(Self::Bool),
            "array" => Some(Self::Array),
            "timestamp" => Some(Self::Timestamp),
            _ => None,
        }
    }

    /// Localized display label, used for `:type` and `:valueType`
    /// message placeholders. Falls back to the canonical name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Int => "整数",
            Self::Float => "小数",
            Self::Array => "数组",
            Self::Timestamp => "日期时间",
            other => other.name(),
        }
    }

    /// Whether this is a scalar type.
    ///
    /// Scalar type checks and transforms apply element-wise when the
    /// runtime value is a sequence.
    #[must_use]
    pub fn is_scalar(self) -> bool {
        matches!(self, Self::String | Self::Int | Self::Float | Self::Bool)
    }
}
