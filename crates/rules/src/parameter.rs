//! Parameter rules: validate one argument value.
//!
//! A [`ParameterRule`] pairs a check (the condition) with the owning method
//! name and a [`FailurePolicy`]. Each check kind implements
//! [`ParameterCheck`] for the value types it understands, so a rule attached
//! to an incompatible parameter fails to type-check instead of failing at
//! run time.

use std::fmt::Debug;

use crate::failure::{ExceptionType, ValidationFailure};
use crate::kind::RuleKind;
use crate::policy::{Element, FailurePolicy};
use crate::value::{Measurable, Nullable};

// ============================================================================
// CHECK TRAITS
// ============================================================================

/// Value-independent description of a check.
pub trait Check {
    /// The kind this check implements.
    fn kind(&self) -> RuleKind;

    /// Message used when the declaration does not override it.
    fn default_message(&self, parameter: &str, method: &str) -> String;
}

/// The condition a parameter rule evaluates against values of type `V`.
pub trait ParameterCheck<V: ?Sized>: Check {
    /// Whether `value` is acceptable.
    fn passes(&self, value: &V) -> bool;

    /// Rendering of a rejected value, reported by out-of-range failures.
    fn describe(&self, _value: &V) -> Option<String> {
        None
    }
}

// ============================================================================
// CHECK KINDS
// ============================================================================

/// Rejects null values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotNull;

impl Check for NotNull {
    fn kind(&self) -> RuleKind {
        RuleKind::NotNull
    }

    fn default_message(&self, parameter: &str, method: &str) -> String {
        format!("Parameter '{parameter}' of method '{method}' must not be null.")
    }
}

impl<V: Nullable + ?Sized> ParameterCheck<V> for NotNull {
    fn passes(&self, value: &V) -> bool {
        !value.is_null()
    }
}

/// Rejects empty strings and collections (and `None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotEmpty;

impl Check for NotEmpty {
    fn kind(&self) -> RuleKind {
        RuleKind::NotEmpty
    }

    fn default_message(&self, parameter: &str, method: &str) -> String {
        format!("Parameter '{parameter}' of method '{method}' must not be empty.")
    }
}

impl<V: Measurable + ?Sized> ParameterCheck<V> for NotEmpty {
    fn passes(&self, value: &V) -> bool {
        !value.is_empty_value()
    }
}

/// Rejects values outside `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InRange<B> {
    min: B,
    max: B,
}

impl<B> InRange<B> {
    /// Inclusive bounds.
    pub const fn new(min: B, max: B) -> Self {
        Self { min, max }
    }
}

impl<B: Debug> Check for InRange<B> {
    fn kind(&self) -> RuleKind {
        RuleKind::InRange
    }

    fn default_message(&self, parameter: &str, method: &str) -> String {
        format!(
            "Parameter '{parameter}' of method '{method}' must be between {:?} and {:?}.",
            self.min, self.max
        )
    }
}

impl<V, B> ParameterCheck<V> for InRange<B>
where
    V: PartialOrd<B> + Debug + ?Sized,
    B: Debug,
{
    fn passes(&self, value: &V) -> bool {
        value.ge(&self.min) && value.le(&self.max)
    }

    fn describe(&self, value: &V) -> Option<String> {
        Some(format!("{value:?}"))
    }
}

/// Rejects values for which a user predicate returns `false`.
#[derive(Clone, Copy)]
pub struct Satisfies<F> {
    predicate: F,
    name: &'static str,
}

impl<F> Satisfies<F> {
    /// Wraps `predicate`; `name` identifies it in failure messages.
    pub const fn new(predicate: F, name: &'static str) -> Self {
        Self { predicate, name }
    }

    /// Name of the predicate.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<F> Debug for Satisfies<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Satisfies").field("name", &self.name).finish()
    }
}

impl<F> Check for Satisfies<F> {
    fn kind(&self) -> RuleKind {
        RuleKind::Satisfies
    }

    fn default_message(&self, parameter: &str, method: &str) -> String {
        format!(
            "Parameter '{parameter}' of method '{method}' failed check '{}'.",
            self.name
        )
    }
}

impl<V, F> ParameterCheck<V> for Satisfies<F>
where
    V: ?Sized,
    F: Fn(&V) -> bool,
{
    fn passes(&self, value: &V) -> bool {
        (self.predicate)(value)
    }
}

// ============================================================================
// PARAMETER RULE
// ============================================================================

/// A check bound to a method, with its failure policy.
#[derive(Debug, Clone, Copy)]
pub struct ParameterRule<C> {
    check: C,
    method: &'static str,
    policy: FailurePolicy,
}

impl<C: Check> ParameterRule<C> {
    /// Creates a rule raising the kind's default exception.
    pub fn new(check: C, method: &'static str) -> Self {
        let policy = FailurePolicy::new().with_exception(check.kind().default_exception());
        Self {
            check,
            method,
            policy,
        }
    }

    /// Overrides the exception raised on failure.
    pub fn with_exception(mut self, exception: ExceptionType) -> Self {
        self.policy = self.policy.with_exception(exception);
        self
    }

    /// Overrides the failure message.
    pub fn with_message(mut self, message: &'static str) -> Self {
        self.policy = self.policy.with_message(message);
        self
    }

    /// The kind of check.
    pub fn kind(&self) -> RuleKind {
        self.check.kind()
    }

    /// The method the validated parameter belongs to.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// The failure policy.
    pub fn policy(&self) -> &FailurePolicy {
        &self.policy
    }

    /// Validates one argument.
    ///
    /// `target` is the receiver of the validated method, or `None` for
    /// associated and free functions.
    pub fn validate<T, V>(
        &self,
        target: Option<&T>,
        value: &V,
        parameter: &str,
    ) -> Result<(), ValidationFailure>
    where
        T: ?Sized,
        V: ?Sized,
        C: ParameterCheck<V>,
    {
        if self.check.passes(value) {
            return Ok(());
        }

        let message = self
            .policy
            .resolve_message(|| self.check.default_message(parameter, self.method));
        let element = Element {
            name: parameter.to_owned(),
            value: self.check.describe(value),
        };

        tracing::debug!(
            rule = %self.check.kind(),
            method = self.method,
            parameter,
            receiver = crate::target_name(target),
            "parameter validation failed"
        );

        Err(self.policy.fail(message, Some(element)))
    }
}
