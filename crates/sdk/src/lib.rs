//! # Warden
//!
//! Declarative preconditions for Rust functions, methods and struct fields.
//!
//! Attach rule attributes to parameters, members or fields; `#[weave]` and
//! `#[derive(Properties)]` turn them into a validation prologue at compile
//! time. Misconfigured rules are compile errors, not run-time surprises.
//!
//! ```rust,ignore
//! use warden::weave;
//!
//! #[weave]
//! fn greet(#[not_null] name: Option<&str>) -> String {
//!     format!("hello {}", name.unwrap_or_default())
//! }
//!
//! // panics with a `ValidationFailure::ArgumentNull` payload
//! greet(None);
//! ```
//!
//! ## Failures
//!
//! Woven members returning a `Result` get the [`ValidationFailure`] through
//! `From`, so any error type with `impl From<ValidationFailure>` works.
//! Other members unwind with the failure as panic payload. Pass
//! `failure = "panic"` or `failure = "return"` to `#[weave]` to force one
//! behaviour.
//!
//! ## Feature flags
//!
//! - `weave`: re-exports the weaving engine as [`weave_engine`] for build
//!   scripts that weave whole files.

#![forbid(unsafe_code)]

pub use warden_macros::{Properties, weave};
pub use warden_rules::*;

#[cfg(feature = "weave")]
#[cfg_attr(docsrs, doc(cfg(feature = "weave")))]
pub use warden_weave as weave_engine;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use warden_macros::{Properties, weave};
    pub use warden_rules::prelude::*;
}
