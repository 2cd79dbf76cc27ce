//! Failure configuration shared by every rule.

use crate::failure::{ExceptionType, ValidationFailure};

/// The element a failure is reported against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Parameter name (or comma-separated names for member rules).
    pub name: String,
    /// Debug rendering of the offending value, when the rule has one.
    pub value: Option<String>,
}

impl Element {
    /// An element without a rendered value.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

/// How a rule reports a failure: which exception it raises and with what
/// message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FailurePolicy {
    exception: Option<ExceptionType>,
    message: Option<&'static str>,
}

impl FailurePolicy {
    /// A policy that raises [`ExceptionType::InvalidOperation`] with the rule
    /// default message.
    pub const fn new() -> Self {
        Self {
            exception: None,
            message: None,
        }
    }

    /// Sets the exception raised on failure.
    pub const fn with_exception(mut self, exception: ExceptionType) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Sets a message that replaces the rule default.
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }

    /// The configured exception, falling back to `InvalidOperation`.
    pub fn exception(&self) -> ExceptionType {
        self.exception.unwrap_or_default()
    }

    /// The configured override message, if any.
    pub fn message_override(&self) -> Option<&'static str> {
        self.message.filter(|message| !message.is_empty())
    }

    /// Picks the override message when it is non-empty, otherwise `default`.
    pub fn resolve_message(&self, default: impl FnOnce() -> String) -> String {
        match self.message_override() {
            Some(message) => message.to_owned(),
            None => default(),
        }
    }

    /// Builds the failure for `message`.
    ///
    /// Well-known argument exceptions receive the element name (and value
    /// for out-of-range failures). Every other exception is built from the
    /// message alone.
    pub fn fail(&self, message: String, element: Option<Element>) -> ValidationFailure {
        match self.exception() {
            ExceptionType::ArgumentNull => ValidationFailure::ArgumentNull {
                parameter: element.map(|element| element.name),
                message,
            },
            ExceptionType::Argument => ValidationFailure::Argument {
                parameter: element.map(|element| element.name),
                message,
            },
            ExceptionType::ArgumentOutOfRange => {
                let (parameter, value) = match element {
                    Some(element) => (Some(element.name), element.value),
                    None => (None, None),
                };
                ValidationFailure::ArgumentOutOfRange {
                    parameter,
                    value,
                    message,
                }
            }
            ExceptionType::InvalidOperation => ValidationFailure::InvalidOperation { message },
            ExceptionType::Custom(factory) => ValidationFailure::Custom {
                exception: factory.type_name(),
                source: factory.construct(message.clone()),
                message,
            },
        }
    }
}
