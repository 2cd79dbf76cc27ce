//! Failure types raised by woven validation calls.
//!
//! A rule that rejects its input produces a [`ValidationFailure`]. The
//! failure's shape follows the rule's configured [`ExceptionType`]:
//!
//! | Exception type        | Carries                         |
//! |-----------------------|---------------------------------|
//! | `ArgumentNull`        | message, parameter              |
//! | `Argument`            | message, parameter              |
//! | `ArgumentOutOfRange`  | message, parameter, actual value|
//! | `InvalidOperation`    | message                         |
//! | `Custom`              | message, constructed exception  |
//!
//! Custom exception types are registered through [`ExceptionFactory::of`],
//! which only accepts types implementing [`Exception`]. Having a
//! single-message constructor is therefore a compile-time property of the
//! registration, never a run-time lookup.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

// ============================================================================
// EXCEPTION CAPABILITY
// ============================================================================

/// An error type a validation rule may raise.
///
/// Implementors must be constructible from the resolved failure message alone.
///
/// # Examples
///
/// ```rust,ignore
/// #[derive(Debug, thiserror::Error)]
/// #[error("rejected: {0}")]
/// struct Rejected(String);
///
/// impl warden_rules::Exception for Rejected {
///     fn from_message(message: String) -> Self {
///         Self(message)
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be raised by a validation rule",
    label = "not a validation exception",
    note = "exception types must implement `Exception`: `std::error::Error + Send + Sync + 'static` with a single-message constructor `fn from_message(String) -> Self`"
)]
pub trait Exception: StdError + Send + Sync + 'static {
    /// Builds the exception from a failure message.
    fn from_message(message: String) -> Self;
}

/// A registered single-message constructor for a custom exception type.
#[derive(Clone, Copy)]
pub struct ExceptionFactory {
    type_name: fn() -> &'static str,
    build: fn(String) -> Box<dyn StdError + Send + Sync>,
}

impl ExceptionFactory {
    /// Registers `E` as a failure exception.
    pub const fn of<E: Exception>() -> Self {
        Self {
            type_name: std::any::type_name::<E>,
            build: build_boxed::<E>,
        }
    }

    /// Fully qualified name of the registered type.
    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Constructs the exception from `message`.
    pub fn construct(&self, message: String) -> Box<dyn StdError + Send + Sync> {
        (self.build)(message)
    }
}

fn build_boxed<E: Exception>(message: String) -> Box<dyn StdError + Send + Sync> {
    Box::new(E::from_message(message))
}

impl fmt::Debug for ExceptionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExceptionFactory")
            .field(&self.type_name())
            .finish()
    }
}

impl PartialEq for ExceptionFactory {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name()
    }
}

impl Eq for ExceptionFactory {}

/// The exception a rule raises on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExceptionType {
    /// A required argument was null.
    ArgumentNull,
    /// An argument was invalid.
    Argument,
    /// An argument fell outside its permitted range.
    ArgumentOutOfRange,
    /// The call was invalid as a whole. Used when nothing else is configured.
    #[default]
    InvalidOperation,
    /// A registered custom exception.
    Custom(ExceptionFactory),
}

impl ExceptionType {
    /// Registers a custom exception type. Shorthand for
    /// `ExceptionType::Custom(ExceptionFactory::of::<E>())`.
    pub const fn custom<E: Exception>() -> Self {
        Self::Custom(ExceptionFactory::of::<E>())
    }

    /// Category of failure this exception produces.
    pub const fn category(&self) -> FailureCategory {
        match self {
            Self::ArgumentNull => FailureCategory::ArgumentNull,
            Self::Argument => FailureCategory::Argument,
            Self::ArgumentOutOfRange => FailureCategory::ArgumentOutOfRange,
            Self::InvalidOperation => FailureCategory::InvalidOperation,
            Self::Custom(_) => FailureCategory::Custom,
        }
    }

    /// Looks up a well-known exception by the name used in declarations.
    pub fn well_known(name: &str) -> Option<Self> {
        match name {
            "ArgumentNull" => Some(Self::ArgumentNull),
            "Argument" => Some(Self::Argument),
            "ArgumentOutOfRange" => Some(Self::ArgumentOutOfRange),
            "InvalidOperation" => Some(Self::InvalidOperation),
            _ => None,
        }
    }
}

/// Coarse classification of a [`ValidationFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    /// See [`ExceptionType::ArgumentNull`].
    ArgumentNull,
    /// See [`ExceptionType::Argument`].
    Argument,
    /// See [`ExceptionType::ArgumentOutOfRange`].
    ArgumentOutOfRange,
    /// See [`ExceptionType::InvalidOperation`].
    InvalidOperation,
    /// See [`ExceptionType::Custom`].
    Custom,
}

// ============================================================================
// VALIDATION FAILURE
// ============================================================================

/// Raised by a woven validation call when its rule rejects the input.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidationFailure {
    /// A required argument was null.
    #[error("{message}{}", parameter_suffix(.parameter.as_deref()))]
    ArgumentNull {
        /// The offending parameter, when one is known.
        parameter: Option<String>,
        /// Resolved failure message.
        message: String,
    },

    /// An argument was invalid.
    #[error("{message}{}", parameter_suffix(.parameter.as_deref()))]
    Argument {
        /// The offending parameter, when one is known.
        parameter: Option<String>,
        /// Resolved failure message.
        message: String,
    },

    /// An argument fell outside its permitted range.
    #[error("{message}{}{}", parameter_suffix(.parameter.as_deref()), value_suffix(.value.as_deref()))]
    ArgumentOutOfRange {
        /// The offending parameter, when one is known.
        parameter: Option<String>,
        /// Debug rendering of the rejected value.
        value: Option<String>,
        /// Resolved failure message.
        message: String,
    },

    /// The call was invalid as a whole.
    #[error("{message}")]
    InvalidOperation {
        /// Resolved failure message.
        message: String,
    },

    /// A registered custom exception.
    #[error("{message}")]
    Custom {
        /// Type name of the constructed exception.
        exception: &'static str,
        /// Resolved failure message.
        message: String,
        /// The constructed exception.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

fn parameter_suffix(parameter: Option<&str>) -> String {
    parameter.map_or_else(String::new, |name| format!(" (parameter `{name}`)"))
}

fn value_suffix(value: Option<&str>) -> String {
    value.map_or_else(String::new, |value| format!(" (actual value: {value})"))
}

impl ValidationFailure {
    /// The resolved message: the configured override, or the rule default.
    pub fn message(&self) -> &str {
        match self {
            Self::ArgumentNull { message, .. }
            | Self::Argument { message, .. }
            | Self::ArgumentOutOfRange { message, .. }
            | Self::InvalidOperation { message }
            | Self::Custom { message, .. } => message,
        }
    }

    /// The parameter that failed validation, if the failure names one.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::ArgumentNull { parameter, .. }
            | Self::Argument { parameter, .. }
            | Self::ArgumentOutOfRange { parameter, .. } => parameter.as_deref(),
            Self::InvalidOperation { .. } | Self::Custom { .. } => None,
        }
    }

    /// The rejected value, for out-of-range failures.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::ArgumentOutOfRange { value, .. } => value.as_deref(),
            _ => None,
        }
    }

    /// Coarse classification of this failure.
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::ArgumentNull { .. } => FailureCategory::ArgumentNull,
            Self::Argument { .. } => FailureCategory::Argument,
            Self::ArgumentOutOfRange { .. } => FailureCategory::ArgumentOutOfRange,
            Self::InvalidOperation { .. } => FailureCategory::InvalidOperation,
            Self::Custom { .. } => FailureCategory::Custom,
        }
    }

    /// Name of the exception this failure represents.
    pub fn exception_name(&self) -> &'static str {
        match self {
            Self::ArgumentNull { .. } => "ArgumentNull",
            Self::Argument { .. } => "Argument",
            Self::ArgumentOutOfRange { .. } => "ArgumentOutOfRange",
            Self::InvalidOperation { .. } => "InvalidOperation",
            Self::Custom { exception, .. } => exception,
        }
    }

    /// Borrows the constructed custom exception, if it is an `E`.
    pub fn downcast_ref<E: Exception>(&self) -> Option<&E> {
        match self {
            Self::Custom { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Unwinds with this failure as the panic payload.
    ///
    /// Woven members that do not return a `Result` raise failures this way;
    /// `std::panic::catch_unwind` callers can recover the failure with
    /// `payload.downcast::<ValidationFailure>()`.
    pub fn raise(self) -> ! {
        tracing::debug!(
            exception = self.exception_name(),
            parameter = self.parameter(),
            "raising validation failure"
        );
        std::panic::panic_any(self)
    }
}
