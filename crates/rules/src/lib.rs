//! # warden-rules
//!
//! Runtime half of the warden validation weaver.
//!
//! Code produced by `#[weave]` and `#[derive(Properties)]` calls into this
//! crate from the prologue of every validated member. Each rule is a small,
//! `const`-constructible value that knows its owning method, the condition it
//! enforces and the [`FailurePolicy`] it reports with.
//!
//! ## Rule kinds
//!
//! - **Parameter rules** validate one argument: [`NotNull`], [`NotEmpty`],
//!   [`InRange`], [`Satisfies`], all driven through [`ParameterRule`].
//! - **Member rules** validate a call as a whole from a [`ParameterSnapshot`]
//!   captured at entry: see [`MemberRule`] and [`MemberRuleKind`].
//!
//! ## Failures
//!
//! A rejected input yields a [`ValidationFailure`]. Woven members returning a
//! `Result` propagate it through `From`; every other member unwinds with it
//! via [`ValidationFailure::raise`].
//!
//! ```rust,ignore
//! use warden_rules::prelude::*;
//!
//! let rule = ParameterRule::new(NotNull, "greet");
//! let failure = rule.validate(None::<&()>, &None::<&str>, "name").unwrap_err();
//! assert_eq!(failure.parameter(), Some("name"));
//! ```

pub mod failure;
pub mod kind;
pub mod member;
pub mod parameter;
pub mod policy;
pub mod prelude;
pub mod snapshot;
pub mod value;

pub use failure::{Exception, ExceptionFactory, ExceptionType, FailureCategory, ValidationFailure};
pub use kind::{RuleCategory, RuleKind};
pub use member::{MemberRule, MemberRuleKind, SnapshotPredicate};
pub use parameter::{Check, InRange, NotEmpty, NotNull, ParameterCheck, ParameterRule, Satisfies};
pub use policy::{Element, FailurePolicy};
pub use snapshot::{Captured, ParameterSnapshot};
pub use value::{Measurable, Nullable};

/// Name of the receiver type for log fields; `<static>` when there is none.
pub(crate) fn target_name<T: ?Sized>(target: Option<&T>) -> &'static str {
    match target {
        Some(_) => std::any::type_name::<T>(),
        None => "<static>",
    }
}
