//! Structured errors for the cloud pipeline.

use core::fmt;

/// Processing phase where an error originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorPhase {
    /// Visible-text extraction from markup.
    Extract,
    /// Word splitting and qualification.
    Tokenize,
    /// Frequency aggregation.
    Aggregate,
    /// Frequency-to-style mapping.
    Style,
    /// Overlay/preview output.
    Render,
}

impl ErrorPhase {
    /// Stable lowercase name used in log lines and error prefixes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Tokenize => "tokenize",
            Self::Aggregate => "aggregate",
            Self::Style => "style",
            Self::Render => "render",
        }
    }
}

impl fmt::Display for ErrorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed actual-vs-limit context for limit violations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorLimitContext {
    /// Limit kind, e.g. `max_document_bytes`.
    pub kind: &'static str,
    /// Observed value.
    pub actual: usize,
    /// Configured limit.
    pub limit: usize,
}

impl ErrorLimitContext {
    /// Build a limit context.
    pub fn new(kind: &'static str, actual: usize, limit: usize) -> Self {
        Self {
            kind,
            actual,
            limit,
        }
    }
}

/// Structured error for cloud pipeline operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloudError {
    /// Processing phase where this error originated.
    pub phase: ErrorPhase,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: Box<str>,
    /// Optional input-location context (tag name, entity, file path).
    pub source_context: Option<Box<str>>,
    /// Optional byte offset into the document.
    pub offset: Option<usize>,
    /// Optional typed actual-vs-limit context.
    pub limit: Option<Box<ErrorLimitContext>>,
}

impl CloudError {
    /// Build an error with an explicit phase.
    pub fn new(phase: ErrorPhase, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            phase,
            code,
            message: message.into().into_boxed_str(),
            source_context: None,
            offset: None,
            limit: None,
        }
    }

    /// Attach input-location context.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_context = Some(source.into().into_boxed_str());
        self
    }

    /// Attach a byte offset into the document.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Attach typed actual-vs-limit context.
    pub fn with_limit(mut self, kind: &'static str, actual: usize, limit: usize) -> Self {
        self.limit = Some(Box::new(ErrorLimitContext::new(kind, actual, limit)));
        self
    }
}

impl fmt::Display for CloudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.phase, self.code, self.message)?;
        if let Some(source) = self.source_context.as_deref() {
            write!(f, " [source={}]", source)?;
        }
        if let Some(offset) = self.offset {
            write!(f, " [offset={}]", offset)?;
        }
        if let Some(limit) = self.limit.as_deref() {
            write!(
                f,
                " [limit_kind={} actual={} limit={}]",
                limit.kind, limit.actual, limit.limit
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for CloudError {}
