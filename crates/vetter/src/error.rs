/// Error type for parameter binding and validation.
///
/// Configuration mistakes (unknown rules, bad arity, malformed patterns,
/// unbound sort keys) surface at bind time; `Required` and `RuleFailed`
/// surface from [`Engine::check`](crate::engine::Engine::check). All
/// variants abort the whole call — there is no partial success and no
/// error aggregation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VetError {
    /// A rule name was bound that the registry does not know.
    #[error("unknown rule `{rule}` on parameter `{param}`")]
    UnknownRule { param: String, rule: String },

    /// A rule was bound with the wrong number of arguments.
    #[error("rule `{rule}` on parameter `{param}` expects {expected} argument(s), got {got}")]
    BadArity {
        param: String,
        rule: String,
        expected: String,
        got: usize,
    },

    /// A regex rule was bound with a pattern that does not compile.
    #[error("invalid pattern `{pattern}` on parameter `{param}`: {reason}")]
    InvalidPattern {
        param: String,
        pattern: String,
        reason: String,
    },

    /// A sort rule referenced a parameter that has not been bound.
    #[error("order key `{key}` does not name a bound parameter")]
    UnboundOrderKey { key: String },

    /// A required parameter had neither a supplied value nor a default.
    #[error("{message}")]
    Required { param: String, message: String },

    /// A bound rule rejected a supplied value.
    #[error("{message}")]
    RuleFailed {
        param: String,
        rule: String,
        message: String,
    },
}

impl VetError {
    /// Broad error category for grouping in logs.
    #[must_use]
    pub fn category(&self) -> &str {
        match self {
            Self::UnknownRule { .. }
            | Self::BadArity { .. }
            | Self::InvalidPattern { .. }
            | Self::UnboundOrderKey { .. } => "config",
            Self::Required { .. } => "required",
            Self::RuleFailed { .. } => "validation",
        }
    }

    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::UnknownRule { .. } => "VET_UNKNOWN_RULE",
            Self::BadArity { .. } => "VET_BAD_ARITY",
            Self::InvalidPattern { .. } => "VET_INVALID_PATTERN",
            Self::UnboundOrderKey { .. } => "VET_UNBOUND_ORDER_KEY",
            Self::Required { .. } => "VET_REQUIRED",
            Self::RuleFailed { .. } => "VET_RULE_FAILED",
        }
    }

    /// The parameter the error concerns, when it concerns one.
    #[must_use]
    pub fn param(&self) -> Option<&str> {
        match self {
            Self::UnknownRule { param, .. }
            | Self::BadArity { param, .. }
            | Self::InvalidPattern { param, .. }
            | Self::Required { param, .. }
            | Self::RuleFailed { param, .. } => Some(param),
            Self::UnboundOrderKey { .. } => None,
        }
    }
}
