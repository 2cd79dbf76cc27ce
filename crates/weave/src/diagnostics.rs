//! Build-time diagnostics.
//!
//! The engine never prints. Every finding is a [`Diagnostic`] written to a
//! [`DiagnosticSink`] supplied by the host; the proc-macro host turns
//! `Error`/`Fatal` entries into `compile_error!` and logs the rest, build
//! scripts can collect them into [`Diagnostics`] and serialize them.

use std::fmt;

use proc_macro2::Span;
use serde::Serialize;

// ============================================================================
// SEVERITY & IDS
// ============================================================================

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational notice.
    Verbose,
    /// The member could not be woven; nothing was injected into it.
    Error,
    /// A rule is misconfigured and was excluded from weaving.
    Fatal,
}

impl Severity {
    /// Whether the diagnostic breaks the build.
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error | Self::Fatal)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verbose => f.write_str("verbose"),
            Self::Error => f.write_str("error"),
            Self::Fatal => f.write_str("fatal"),
        }
    }
}

/// Stable identifier of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageId {
    /// The rule passed build-time validation.
    #[serde(rename = "WRD001")]
    PassedValidation,
    /// A property rule was skipped because the property is read-only.
    #[serde(rename = "WRD002")]
    ReadOnlySkipped,
    /// The rule was injected.
    #[serde(rename = "WRD003")]
    RuleWoven,
    /// The rule's target declaration has no usable name.
    #[serde(rename = "WRD100")]
    NullTarget,
    /// The configured exception is not an exception type.
    #[serde(rename = "WRD101")]
    ExceptionBadType,
    /// The configured exception has no single-message constructor.
    #[serde(rename = "WRD102")]
    ExceptionImproperType,
    /// `not_null` is attached to a type that can never be null.
    #[serde(rename = "WRD103")]
    NotNullOnValueType,
    /// A rule is attached where its category does not allow.
    #[serde(rename = "WRD104")]
    MisplacedRule,
    /// A rule's arguments could not be parsed.
    #[serde(rename = "WRD105")]
    InvalidRuleArguments,
    /// `failure = "return"` on a member that does not return a `Result`.
    #[serde(rename = "WRD106")]
    ReturnRequiresResult,
    /// A nullability member rule on a member without nullable parameters.
    #[serde(rename = "WRD107")]
    NoNullableParameters,
    /// Rules on a member without a body.
    #[serde(rename = "WRD108")]
    MissingBody,
}

impl MessageId {
    /// The `WRDnnn` code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::PassedValidation => "WRD001",
            Self::ReadOnlySkipped => "WRD002",
            Self::RuleWoven => "WRD003",
            Self::NullTarget => "WRD100",
            Self::ExceptionBadType => "WRD101",
            Self::ExceptionImproperType => "WRD102",
            Self::NotNullOnValueType => "WRD103",
            Self::MisplacedRule => "WRD104",
            Self::InvalidRuleArguments => "WRD105",
            Self::ReturnRequiresResult => "WRD106",
            Self::NoNullableParameters => "WRD107",
            Self::MissingBody => "WRD108",
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// DIAGNOSTIC
// ============================================================================

/// Where a diagnostic applies.
#[derive(Debug, Clone, Serialize)]
pub struct Location {
    /// Path of the member, e.g. `Account::deposit` or `Person::age`.
    pub member: String,
    /// Source span of the offending declaration.
    #[serde(skip)]
    pub span: Span,
}

impl Location {
    /// A location inside `member` at `span`.
    pub fn new(member: impl Into<String>, span: Span) -> Self {
        Self {
            member: member.into(),
            span,
        }
    }
}

/// One structured build-time message.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub id: MessageId,
    pub message: String,
    pub location: Location,
}

impl Diagnostic {
    /// A verbose notice.
    pub fn verbose(id: MessageId, message: impl Into<String>, location: Location) -> Self {
        Self::new(Severity::Verbose, id, message, location)
    }

    /// A member-level error.
    pub fn error(id: MessageId, message: impl Into<String>, location: Location) -> Self {
        Self::new(Severity::Error, id, message, location)
    }

    /// A rule configuration failure.
    pub fn fatal(id: MessageId, message: impl Into<String>, location: Location) -> Self {
        Self::new(Severity::Fatal, id, message, location)
    }

    fn new(severity: Severity, id: MessageId, message: impl Into<String>, location: Location) -> Self {
        Self {
            severity,
            id,
            message: message.into(),
            location,
        }
    }

    /// Renders the diagnostic as a spanned compiler error.
    pub fn to_syn_error(&self) -> syn::Error {
        syn::Error::new(self.location.span, self.to_string())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} (in `{}`)",
            self.severity, self.id, self.message, self.location.member
        )
    }
}

// ============================================================================
// SINKS
// ============================================================================

/// Receives diagnostics from the engine.
pub trait DiagnosticSink {
    /// Records one diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

/// Collecting sink.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// All diagnostics, in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Diagnostics that break the build.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.iter().filter(|d| d.severity.is_error())
    }

    /// Whether any diagnostic breaks the build.
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Diagnostics carrying `id`.
    pub fn with_id(&self, id: MessageId) -> impl Iterator<Item = &Diagnostic> {
        self.iter().filter(move |d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Combines every build-breaking diagnostic into one compiler error.
    pub fn to_syn_error(&self) -> Option<syn::Error> {
        self.errors()
            .map(Diagnostic::to_syn_error)
            .reduce(|mut combined, next| {
                combined.combine(next);
                combined
            })
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::trace!(
            severity = %diagnostic.severity,
            id = %diagnostic.id,
            member = %diagnostic.location.member,
            "{}",
            diagnostic.message
        );
        self.entries.push(diagnostic);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
