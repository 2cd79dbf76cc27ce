//! Member rules: validate a method call as a whole.
//!
//! Member rules read a [`ParameterSnapshot`] taken at call entry instead of a
//! single value. All kinds go through [`MemberRule::validate`].

use std::fmt;

use crate::failure::{ExceptionType, ValidationFailure};
use crate::kind::RuleKind;
use crate::policy::{Element, FailurePolicy};
use crate::snapshot::ParameterSnapshot;

/// Predicate over a whole snapshot, used by [`MemberRuleKind::Requires`].
pub type SnapshotPredicate = fn(&ParameterSnapshot<'_>) -> bool;

/// The condition a member rule enforces.
#[derive(Clone, Copy)]
pub enum MemberRuleKind {
    /// No parameter may be null.
    AllNotNull,
    /// At least one nullable parameter must be set.
    AnyNotNull,
    /// Exactly one nullable parameter must be set.
    ExactlyOneNotNull,
    /// A user predicate over the snapshot must hold.
    Requires {
        /// The predicate.
        predicate: SnapshotPredicate,
        /// Name of the predicate, for messages.
        name: &'static str,
    },
}

impl MemberRuleKind {
    /// The tag of this kind.
    pub const fn kind(&self) -> RuleKind {
        match self {
            Self::AllNotNull => RuleKind::AllNotNull,
            Self::AnyNotNull => RuleKind::AnyNotNull,
            Self::ExactlyOneNotNull => RuleKind::ExactlyOneNotNull,
            Self::Requires { .. } => RuleKind::Requires,
        }
    }
}

impl fmt::Debug for MemberRuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requires { name, .. } => f.debug_struct("Requires").field("name", name).finish(),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// A member-level condition bound to a method, with its failure policy.
#[derive(Debug, Clone, Copy)]
pub struct MemberRule {
    kind: MemberRuleKind,
    method: &'static str,
    policy: FailurePolicy,
}

impl MemberRule {
    /// Creates a rule raising the kind's default exception.
    pub const fn new(kind: MemberRuleKind, method: &'static str) -> Self {
        Self {
            kind,
            method,
            policy: FailurePolicy::new().with_exception(kind.kind().default_exception()),
        }
    }

    /// `#[all_not_null]`
    pub const fn all_not_null(method: &'static str) -> Self {
        Self::new(MemberRuleKind::AllNotNull, method)
    }

    /// `#[any_not_null]`
    pub const fn any_not_null(method: &'static str) -> Self {
        Self::new(MemberRuleKind::AnyNotNull, method)
    }

    /// `#[exactly_one_not_null]`
    pub const fn exactly_one_not_null(method: &'static str) -> Self {
        Self::new(MemberRuleKind::ExactlyOneNotNull, method)
    }

    /// `#[requires(predicate)]`
    pub const fn requires(
        predicate: SnapshotPredicate,
        name: &'static str,
        method: &'static str,
    ) -> Self {
        Self::new(MemberRuleKind::Requires { predicate, name }, method)
    }

    /// Overrides the exception raised on failure.
    pub const fn with_exception(mut self, exception: ExceptionType) -> Self {
        self.policy = self.policy.with_exception(exception);
        self
    }

    /// Overrides the failure message.
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.policy = self.policy.with_message(message);
        self
    }

    /// The rule's kind.
    pub fn kind(&self) -> RuleKind {
        self.kind.kind()
    }

    /// The validated method.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// The failure policy.
    pub fn policy(&self) -> &FailurePolicy {
        &self.policy
    }

    /// Validates a call from its entry snapshot.
    ///
    /// `target` is the receiver of the validated method, or `None` for
    /// associated and free functions.
    pub fn validate<T: ?Sized>(
        &self,
        target: Option<&T>,
        snapshot: &ParameterSnapshot<'_>,
    ) -> Result<(), ValidationFailure> {
        let Some((names, default_message)) = self.violation(snapshot) else {
            return Ok(());
        };

        let message = self.policy.resolve_message(|| default_message);

        tracing::debug!(
            rule = %self.kind(),
            method = self.method,
            parameters = %names,
            receiver = crate::target_name(target),
            "member validation failed"
        );

        Err(self.policy.fail(message, Some(Element::named(names))))
    }

    /// Offending parameter names and the default message, if the snapshot
    /// violates the rule.
    fn violation(&self, snapshot: &ParameterSnapshot<'_>) -> Option<(String, String)> {
        let method = self.method;

        match self.kind {
            MemberRuleKind::AllNotNull => {
                let nulls = snapshot.null_parameters().collect::<Vec<_>>();
                if nulls.is_empty() {
                    return None;
                }
                let names = nulls.join(", ");
                let message = format!(
                    "Method '{method}' requires every parameter to be set, but '{names}' was null."
                );
                Some((names, message))
            }
            MemberRuleKind::AnyNotNull => {
                if snapshot.nullable().any(|captured| !captured.is_null()) {
                    return None;
                }
                let names = nullable_names(snapshot);
                let message =
                    format!("Method '{method}' requires at least one of '{names}' to be set.");
                Some((names, message))
            }
            MemberRuleKind::ExactlyOneNotNull => {
                let set = snapshot
                    .nullable()
                    .filter(|captured| !captured.is_null())
                    .count();
                if set == 1 {
                    return None;
                }
                let names = nullable_names(snapshot);
                let message = format!(
                    "Method '{method}' requires exactly one of '{names}' to be set, but {set} were."
                );
                Some((names, message))
            }
            MemberRuleKind::Requires { predicate, name } => {
                if predicate(snapshot) {
                    return None;
                }
                let names = snapshot.names().collect::<Vec<_>>().join(", ");
                let message = format!("Method '{method}' precondition '{name}' failed.");
                Some((names, message))
            }
        }
    }
}

fn nullable_names(snapshot: &ParameterSnapshot<'_>) -> String {
    snapshot
        .nullable()
        .map(|captured| captured.name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::FailureCategory;
    use crate::snapshot::Captured;
    use pretty_assertions::assert_eq;

    const STATIC: Option<&()> = None;

    fn contact(email: Option<&str>, phone: Option<&str>) -> ParameterSnapshot<'static> {
        ParameterSnapshot::capture([
            Captured::value("id", &1_u32),
            Captured::opaque_nullable("email", &email),
            Captured::opaque_nullable("phone", &phone),
        ])
    }

    #[test]
    fn all_not_null_names_the_null_parameters() {
        let rule = MemberRule::all_not_null("register");

        let failure = rule.validate(STATIC, &contact(None, None)).unwrap_err();

        assert_eq!(failure.category(), FailureCategory::ArgumentNull);
        assert_eq!(failure.parameter(), Some("email, phone"));
        assert!(rule.validate(STATIC, &contact(Some("a@b"), Some("1"))).is_ok());
    }

    #[test]
    fn any_not_null_ignores_non_nullable_parameters() {
        let rule = MemberRule::any_not_null("register");
        let only_id = ParameterSnapshot::capture([
            Captured::opaque_nullable("email", &None::<&str>),
            Captured::opaque_nullable("phone", &None::<&str>),
        ]);

        assert!(rule.validate(STATIC, &contact(None, Some("1"))).is_ok());
        let failure = rule.validate(STATIC, &only_id).unwrap_err();
        assert_eq!(
            failure.message(),
            "Method 'register' requires at least one of 'email, phone' to be set."
        );
    }

    #[test]
    fn exactly_one_not_null_counts_set_values() {
        let rule = MemberRule::exactly_one_not_null("contact");

        assert!(rule.validate(STATIC, &contact(Some("a@b"), None)).is_ok());
        assert!(rule.validate(STATIC, &contact(None, None)).is_err());
        let failure = rule
            .validate(STATIC, &contact(Some("a@b"), Some("1")))
            .unwrap_err();
        assert_eq!(
            failure.message(),
            "Method 'contact' requires exactly one of 'email, phone' to be set, but 2 were."
        );
    }

    #[test]
    fn requires_uses_predicate_and_override() {
        fn has_email(snapshot: &ParameterSnapshot<'_>) -> bool {
            snapshot.is_null("email") == Some(false)
        }
        let rule = MemberRule::requires(has_email, "has_email", "notify")
            .with_message("email is mandatory");

        let failure = rule.validate(Some(&"svc"), &contact(None, Some("1"))).unwrap_err();

        assert_eq!(failure.category(), FailureCategory::InvalidOperation);
        assert_eq!(failure.message(), "email is mandatory");
        assert!(rule.validate(STATIC, &contact(Some("x"), None)).is_ok());
    }

    #[test]
    fn requires_can_compare_captured_values() {
        fn ordered(snapshot: &ParameterSnapshot<'_>) -> bool {
            match (snapshot.get::<u32>("start"), snapshot.get::<u32>("end")) {
                (Some(start), Some(end)) => start <= end,
                _ => false,
            }
        }
        let rule = MemberRule::requires(ordered, "ordered", "slice")
            .with_exception(ExceptionType::ArgumentOutOfRange);
        let window = |start: u32, end: u32| {
            let snapshot =
                ParameterSnapshot::capture([Captured::value("start", &start), Captured::value("end", &end)]);
            rule.validate(STATIC, &snapshot)
        };

        assert!(window(10, 50).is_ok());
        let failure = window(50, 10).unwrap_err();
        assert_eq!(failure.message(), "Method 'slice' precondition 'ordered' failed.");
        assert_eq!(failure.parameter(), Some("start, end"));
    }
}
