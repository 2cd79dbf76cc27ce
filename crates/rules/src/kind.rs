//! Rule kinds and the metadata the weaver needs to resolve them.
//!
//! Every validation attribute the weaver understands maps to exactly one
//! [`RuleKind`]. The set is closed: new behaviour is added through the
//! [`Satisfies`](crate::Satisfies) and [`Requires`](crate::MemberRuleKind::Requires)
//! kinds, which carry a user predicate, rather than through new attribute types.

use std::fmt;

use crate::failure::ExceptionType;

/// Which declarations a rule may be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    /// Validates one parameter value (or a property's incoming `value`).
    Parameter,
    /// Validates a method as a whole from a [`ParameterSnapshot`](crate::ParameterSnapshot).
    Member,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameter => f.write_str("parameter"),
            Self::Member => f.write_str("member"),
        }
    }
}

/// Tag for every rule kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// `#[not_null]`
    NotNull,
    /// `#[not_empty]`
    NotEmpty,
    /// `#[in_range(min = .., max = ..)]`
    InRange,
    /// `#[check(path)]`
    Satisfies,
    /// `#[all_not_null]`
    AllNotNull,
    /// `#[any_not_null]`
    AnyNotNull,
    /// `#[exactly_one_not_null]`
    ExactlyOneNotNull,
    /// `#[requires(path)]`
    Requires,
}

impl RuleKind {
    /// Every kind, in registry order.
    pub const ALL: [Self; 8] = [
        Self::NotNull,
        Self::NotEmpty,
        Self::InRange,
        Self::Satisfies,
        Self::AllNotNull,
        Self::AnyNotNull,
        Self::ExactlyOneNotNull,
        Self::Requires,
    ];

    /// The attribute name a declaration uses for this kind.
    pub const fn attribute(self) -> &'static str {
        match self {
            Self::NotNull => "not_null",
            Self::NotEmpty => "not_empty",
            Self::InRange => "in_range",
            Self::Satisfies => "check",
            Self::AllNotNull => "all_not_null",
            Self::AnyNotNull => "any_not_null",
            Self::ExactlyOneNotNull => "exactly_one_not_null",
            Self::Requires => "requires",
        }
    }

    /// Looks a kind up by attribute name.
    pub fn from_attribute(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.attribute() == name)
    }

    /// The declarations this kind may be attached to.
    pub const fn category(self) -> RuleCategory {
        match self {
            Self::NotNull | Self::NotEmpty | Self::InRange | Self::Satisfies => {
                RuleCategory::Parameter
            }
            Self::AllNotNull | Self::AnyNotNull | Self::ExactlyOneNotNull | Self::Requires => {
                RuleCategory::Member
            }
        }
    }

    /// The exception raised when a declaration does not configure one.
    pub const fn default_exception(self) -> ExceptionType {
        match self {
            Self::NotNull | Self::AllNotNull => ExceptionType::ArgumentNull,
            Self::NotEmpty | Self::Satisfies | Self::AnyNotNull | Self::ExactlyOneNotNull => {
                ExceptionType::Argument
            }
            Self::InRange => ExceptionType::ArgumentOutOfRange,
            Self::Requires => ExceptionType::InvalidOperation,
        }
    }

    /// Whether the kind only makes sense for values that can be null.
    pub const fn requires_nullable(self) -> bool {
        matches!(self, Self::NotNull)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn attribute_names_round_trip() {
        for kind in RuleKind::ALL {
            assert_eq!(RuleKind::from_attribute(kind.attribute()), Some(kind));
        }
        assert_eq!(RuleKind::from_attribute("validate"), None);
    }

    #[rstest]
    #[case(RuleKind::NotNull, RuleCategory::Parameter)]
    #[case(RuleKind::InRange, RuleCategory::Parameter)]
    #[case(RuleKind::AllNotNull, RuleCategory::Member)]
    #[case(RuleKind::Requires, RuleCategory::Member)]
    fn kinds_have_expected_category(#[case] kind: RuleKind, #[case] category: RuleCategory) {
        assert_eq!(kind.category(), category);
    }

    #[test]
    fn not_null_defaults_to_argument_null() {
        assert_eq!(
            RuleKind::NotNull.default_exception(),
            ExceptionType::ArgumentNull
        );
        assert_eq!(
            RuleKind::Requires.default_exception(),
            ExceptionType::InvalidOperation
        );
    }
}
