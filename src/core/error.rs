//! Diagnostic taxonomy for the elaboration core (spec §7).
//!
//! One [`ElabError`] variant per diagnostic kind named in the spec. Each
//! [`Diagnostic`] pairs an error with a severity and the span it was
//! raised against, following the shape of the teacher's
//! `InterchangeError` (tagged payload, `thiserror`-derived `Display`) and
//! `SyntaxError`/`Severity` pair (severity carried alongside the error,
//! not baked into the variant).

use thiserror::Error;

use crate::core::Span;

/// Severity of a collected diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl Severity {
    pub fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// The full diagnostic taxonomy from spec §7.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ElabError {
    // ---- Name/type ----
    #[error("unresolved name '{0}'")]
    UnresolvedName(String),
    #[error("unresolved type '{0}'")]
    UnresolvedType(String),
    #[error("'{0}' already defined in this scope")]
    DuplicateName(String),
    #[error("type '{0}' already defined in this scope")]
    DuplicateType(String),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("unmatched actual parameter '{0}'")]
    BadParameter(String),

    // ---- Expression ----
    #[error("division by zero")]
    DivisionByZero,
    #[error("negative shift count")]
    BadShift,
    #[error("value does not fit in declared width")]
    OverflowInWidth,

    // ---- Structure ----
    #[error("'{child}' is not a legal child of '{parent}'")]
    IllegalChild { parent: String, child: String },
    #[error("forward reference to '{0}' (not yet elaborated)")]
    ForwardReference(String),

    // ---- Layout ----
    #[error("inconsistent bit range for field '{0}': msb/lsb/width disagree")]
    BitRangeInconsistent(String),
    #[error("fields '{first}' and '{second}' overlap")]
    FieldOverlap { first: String, second: String },
    #[error("field '{0}' bit range exceeds register width")]
    FieldOutOfRange(String),
    #[error("instances '{first}' and '{second}' have overlapping explicit offsets")]
    InstanceOverlap { first: String, second: String },
    #[error("children '{first}' and '{second}' occupy overlapping address ranges")]
    AddressOverlap { first: String, second: String },
    #[error("register '{0}' address is not a multiple of its natural alignment")]
    MisalignedAddress(String),

    // ---- Internal ----
    #[error("unsupported construct: {0}")]
    Unsupported(String),
}

/// One collected diagnostic: an error plus where it happened.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub error: ElabError,
    pub severity: Severity,
    pub span: Option<Span>,
    pub related: Vec<(String, Span)>,
}

impl Diagnostic {
    pub fn error(error: ElabError, span: Option<Span>) -> Self {
        Self { error, severity: Severity::Error, span, related: Vec::new() }
    }

    pub fn warning(error: ElabError, span: Option<Span>) -> Self {
        Self { error, severity: Severity::Warning, span, related: Vec::new() }
    }

    pub fn with_related(mut self, label: impl Into<String>, span: Span) -> Self {
        self.related.push((label.into(), span));
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }

    /// Render as `path:line:col: <kind>: <message>`, the CLI's wire format.
    pub fn render(&self) -> String {
        let loc = self
            .span
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "<synthetic>".to_string());
        format!("{loc}: {}: {}", self.severity.as_str(), self.error)
    }
}
