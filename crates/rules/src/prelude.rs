//! Prelude module for convenient imports.
//!
//! `use warden_rules::prelude::*;` brings in every rule, the failure types and
//! the value capabilities woven code relies on.

// ============================================================================
// FAILURES
// ============================================================================

pub use crate::failure::{
    Exception, ExceptionFactory, ExceptionType, FailureCategory, ValidationFailure,
};
pub use crate::policy::FailurePolicy;

// ============================================================================
// RULES
// ============================================================================

pub use crate::kind::{RuleCategory, RuleKind};
pub use crate::member::{MemberRule, MemberRuleKind};
pub use crate::parameter::{
    Check, InRange, NotEmpty, NotNull, ParameterCheck, ParameterRule, Satisfies,
};

// ============================================================================
// VALUES
// ============================================================================

pub use crate::snapshot::{Captured, ParameterSnapshot};
pub use crate::value::{Measurable, Nullable};
