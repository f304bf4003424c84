// File: src/error.rs
// Purpose: Validation and structural error types for population passes

use formfill_dom::NodeId;
use thiserror::Error;

/// Category tag for a per-field validation failure. The error policy's
/// suppression list is keyed by this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadValue,
    ValueRequired,
    Readonly,
    Disabled,
    CheckboxRequired,
    RadioRequired,
    DatetimeFormat,
}

/// One validation failure against one field node. Holds a handle to the
/// offending node, not the node itself; it is created during a pass and
/// discarded once reported.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct FieldError {
    pub kind: ErrorKind,
    pub message: String,
    pub node: NodeId,
}

impl FieldError {
    pub(crate) fn new(kind: ErrorKind, node: NodeId, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            node,
        }
    }
}

/// Failure of a whole population pass.
///
/// The structural variants (`NotAForm`, `NoElementsToPopulate`,
/// `InvalidPattern`, `NumberOutOfRange`) abort immediately in every
/// error-policy mode and cannot be suppressed. `Validation` carries the
/// unsuppressed field errors: exactly one under fail-fast, everything
/// accumulated under collect mode.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("element is not a form")]
    NotAForm,

    #[error("failed to find element named '{key}'")]
    NoElementsToPopulate { key: String },

    #[error("invalid pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("number out of processable range")]
    NumberOutOfRange,

    #[error("validation failed with {} error(s)", .0.len())]
    Validation(Vec<FieldError>),
}
