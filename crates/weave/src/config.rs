//! `#[weave(...)]` configuration.
//!
//! ```rust,ignore
//! #[weave(crate = "::warden", failure = "auto")]
//! impl Account { /* ... */ }
//! ```
//!
//! | Key       | Values                         | Default     |
//! |-----------|--------------------------------|-------------|
//! | `crate`   | path to the runtime crate      | `::warden`  |
//! | `failure` | `"auto"`, `"panic"`, `"return"`| `"auto"`    |

use proc_macro2::TokenStream;
use syn::{Path, Result};

use crate::attrs::AttrArgs;

/// How an injected call reports a failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Return `Err` from members returning a `Result`; panic elsewhere.
    #[default]
    Auto,
    /// Always unwind with the failure as panic payload.
    Panic,
    /// Always return `Err`. Members without a `Result` return type are rejected.
    Return,
}

impl FailureMode {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(Self::Auto),
            "panic" => Some(Self::Panic),
            "return" => Some(Self::Return),
            _ => None,
        }
    }
}

/// Weaver options for one `#[weave]` expansion.
#[derive(Debug, Clone)]
pub struct WeaveConfig {
    /// Path the generated code uses to reach the runtime crate.
    pub runtime: Path,
    /// Failure reporting mode.
    pub failure: FailureMode,
}

impl Default for WeaveConfig {
    fn default() -> Self {
        Self {
            runtime: syn::parse_quote!(::warden),
            failure: FailureMode::default(),
        }
    }
}

impl WeaveConfig {
    /// Parses the argument tokens of `#[weave(...)]`.
    pub fn parse(args: TokenStream) -> Result<Self> {
        let args = syn::parse2::<AttrArgs>(args)?;
        Self::from_args(&args)
    }

    /// Builds the configuration from already parsed arguments.
    pub fn from_args(args: &AttrArgs) -> Result<Self> {
        args.ensure_known(&["crate", "failure"], false)?;

        let mut config = Self::default();

        if let Some(runtime) = args.get_path("crate")? {
            config.runtime = runtime;
        }

        if let Some(failure) = args.get_string("failure")? {
            config.failure = FailureMode::parse(&failure.value()).ok_or_else(|| {
                syn::Error::new(
                    failure.span(),
                    "`failure` must be one of \"auto\", \"panic\", \"return\"",
                )
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quote::quote;
    use rstest::rstest;

    #[test]
    fn empty_args_use_defaults() {
        let config = WeaveConfig::parse(TokenStream::new()).unwrap();

        let runtime = &config.runtime;
        assert_eq!(quote!(#runtime).to_string(), ":: warden");
        assert_eq!(config.failure, FailureMode::Auto);
    }

    #[rstest]
    #[case("auto", FailureMode::Auto)]
    #[case("panic", FailureMode::Panic)]
    #[case("return", FailureMode::Return)]
    fn failure_modes_parse(#[case] value: &str, #[case] expected: FailureMode) {
        let config = WeaveConfig::parse(quote!(failure = #value)).unwrap();

        assert_eq!(config.failure, expected);
    }

    #[test]
    fn crate_path_is_configurable() {
        let config = WeaveConfig::parse(quote!(crate = "crate::rt")).unwrap();

        let runtime = &config.runtime;
        assert_eq!(quote!(#runtime).to_string(), "crate :: rt");
    }

    #[test]
    fn unknown_failure_mode_is_an_error() {
        let err = WeaveConfig::parse(quote!(failure = "ignore")).unwrap_err();

        assert!(err.to_string().contains("`failure` must be one of"));
    }
}
