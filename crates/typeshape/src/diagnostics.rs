//! Diagnostics
//!
//! Problems found during a build never abort it. Each one degrades the
//! affected subtree and is recorded here, and mirrored to `tracing`.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// Type is neither terminal, a known marker kind, nor in the index
    UnknownType,
    /// Type variable has no binding and no bound
    UnresolvedVariable,
    /// Two signatures derived the same reference name
    ReferenceNameCollision,
    /// `max_definitions` was reached; the type was left opaque
    DefinitionLimitReached,
    /// Instantiation wraps its own ancestor's arguments deeper on every
    /// expansion, e.g. `Nest<T>` holding a `Nest<Vec<T>>`
    GrowingInstantiation,
    /// `max_nesting` was reached; the rest of the type was left opaque
    NestingLimitReached,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownType => "W001",
            Self::UnresolvedVariable => "W002",
            Self::ReferenceNameCollision => "W003",
            Self::DefinitionLimitReached => "W004",
            Self::GrowingInstantiation => "W005",
            Self::NestingLimitReached => "W006",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::UnknownType
            | Self::DefinitionLimitReached
            | Self::GrowingInstantiation
            | Self::NestingLimitReached => Severity::Warning,
            Self::UnresolvedVariable | Self::ReferenceNameCollision => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub type_name: String,
    pub message: String,
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.as_str(), self.type_name, self.message)
    }
}

/// Diagnostics of one build. A given code is recorded once per type name.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        code: DiagnosticCode,
        type_name: impl Into<String>,
        message: impl Into<String>,
    ) {
        let type_name = type_name.into();
        if self
            .items
            .iter()
            .any(|d| d.code == code && d.type_name == type_name)
        {
            return;
        }
        let diagnostic = Diagnostic {
            code,
            type_name,
            message: message.into(),
        };
        match diagnostic.severity() {
            Severity::Warning => tracing::warn!(code = code.as_str(), "{diagnostic}"),
            Severity::Info => tracing::info!(code = code.as_str(), "{diagnostic}"),
        }
        self.items.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
    }

    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.code == code)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
