//! # vetter
//!
//! A declarative request-parameter validation engine.
//!
//! Parameters are bound once to an [`Engine`](engine::Engine) — each with a
//! type, a display comment, an optional backing field and an ordered rule
//! set — and the engine is then reused across requests:
//!
//! ```rust,ignore
//! use vetter::prelude::*;
//! use serde_json::json;
//!
//! let mut engine = Engine::new();
//! engine.bind("age", ParamKind::Int, "年龄").required().between(0, 150);
//! engine.bind("zone", ParamKind::String, "区域").default_to("cn");
//!
//! let output = engine.check(json!({"age": "42"}).as_object().unwrap())?;
//! assert_eq!(output["age"], json!(42));
//! ```
//!
//! `check` runs each bound parameter's rules in registration order and
//! fails fast on the first violation, returning a rendered, templated
//! message. Validated values are coerced to their declared type and keyed
//! by their backing field name in the output map.

pub mod engine;
pub mod error;
pub mod kind;
pub mod message;
pub mod param;
pub mod registry;
pub mod rules;
pub mod schema;
pub mod transform;

/// A raw or validated parameter map, keyed by parameter or field name.
pub type ValueMap = serde_json::Map<String, serde_json::Value>;

pub mod prelude {
    pub use crate::ValueMap;
    pub use crate::engine::Engine;
    pub use crate::error::VetError;
    pub use crate::kind::ParamKind;
    pub use crate::message::MessageCatalog;
    pub use crate::param::Parameter;
    pub use crate::schema::{FieldInfo, FieldSchema};
    pub use crate::transform::transform;
}

pub use engine::Engine;
pub use error::VetError;
pub use kind::ParamKind;
pub use param::Parameter;
pub use schema::{FieldInfo, FieldSchema};
