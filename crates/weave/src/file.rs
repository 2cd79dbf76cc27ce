//! Whole-file weaving, for build scripts and tooling.
//!
//! ```rust,ignore
//! // build.rs
//! let source = std::fs::read_to_string("src/api.rs")?;
//! let woven = warden_weave::weave_file(&source)?;
//! for diagnostic in woven.diagnostics.iter() {
//!     println!("cargo::warning={diagnostic}");
//! }
//! std::fs::write(out_dir.join("api.rs"), woven.to_string())?;
//! ```

use proc_macro2::TokenStream;
use quote::ToTokens;
use thiserror::Error;

use crate::config::WeaveConfig;
use crate::diagnostics::Diagnostics;
use crate::host::ItemHost;

/// Errors that stop a file from being woven at all.
#[derive(Debug, Error)]
pub enum WeaveError {
    /// The source is not valid Rust.
    #[error("failed to parse source: {0}")]
    Parse(#[from] syn::Error),

    /// The weave produced code that could not be assembled.
    #[error("failed to render prologue: {0}")]
    Render(syn::Error),
}

/// A woven file and everything reported while weaving it.
#[derive(Debug, Clone)]
pub struct WovenFile {
    pub file: syn::File,
    pub diagnostics: Diagnostics,
}

impl WovenFile {
    /// Whether any rule or member was rejected.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

impl ToTokens for WovenFile {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.file.to_tokens(tokens);
    }
}

impl std::fmt::Display for WovenFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_token_stream())
    }
}

/// Weaves every item of `source` with the default configuration.
pub fn weave_file(source: &str) -> Result<WovenFile, WeaveError> {
    weave_file_with(source, &WeaveConfig::default())
}

/// Weaves every item of `source` with `config`.
pub fn weave_file_with(source: &str, config: &WeaveConfig) -> Result<WovenFile, WeaveError> {
    let mut file = syn::parse_file(source)?;
    let mut diagnostics = Diagnostics::new();

    let woven = crate::weave_host(&mut ItemHost::file(&mut file), config, &mut diagnostics)
        .map_err(WeaveError::Render)?;

    tracing::debug!(
        rules = woven,
        diagnostics = diagnostics.len(),
        errors = diagnostics.errors().count(),
        "wove file"
    );

    Ok(WovenFile { file, diagnostics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailureMode;
    use crate::diagnostics::{MessageId, Severity};
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r#"
        pub struct Account { balance: u64 }

        impl Account {
            pub fn deposit(&mut self, #[in_range(min = 1, max = 10_000)] amount: u64) {
                self.balance += amount;
            }

            #[any_not_null]
            pub fn notify(&self, email: Option<&str>, phone: Option<&str>) {}
        }

        pub fn greet(#[not_null] name: Option<&str>) -> String {
            format!("hello {}", name.unwrap_or_default())
        }
    "#;

    #[test]
    fn weaves_every_item() {
        let woven = weave_file(SOURCE).unwrap();

        assert!(!woven.has_errors());
        assert_eq!(woven.diagnostics.with_id(MessageId::RuleWoven).count(), 3);

        let text = woven.to_string();
        assert!(!text.contains("# [in_range"));
        assert!(!text.contains("# [any_not_null"));
        assert!(text.contains("InRange :: new (1 , 10_000)"));
        assert_eq!(text.matches("ParameterSnapshot :: capture").count(), 1);
    }

    #[test]
    fn return_mode_rejects_members_without_result() {
        let config = WeaveConfig {
            failure: FailureMode::Return,
            ..WeaveConfig::default()
        };

        let woven = weave_file_with(SOURCE, &config).unwrap();

        let rejected = woven
            .diagnostics
            .with_id(MessageId::ReturnRequiresResult)
            .map(|d| d.location.member.as_str())
            .collect::<Vec<_>>();
        assert_eq!(rejected, ["Account::deposit", "Account::notify", "greet"]);
        assert!(woven.diagnostics.errors().all(|d| d.severity == Severity::Fatal));
        assert!(!woven.to_string().contains("ParameterRule"));
    }

    #[test]
    fn invalid_source_is_a_parse_error() {
        let err = weave_file("fn broken(").unwrap_err();
        assert!(matches!(err, WeaveError::Parse(_)));
    }
}
