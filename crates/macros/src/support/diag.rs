use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use warden_weave::{Diagnostics, Severity};

/// Convert `syn::Error` into a TokenStream that emits a proper compiler error.
///
/// Keep this in one place to have consistent diagnostics across all macros.
pub fn to_compile_error(err: syn::Error) -> TokenStream {
    err.to_compile_error().into()
}

/// `compile_error!` invocations for every build-breaking diagnostic, each
/// pointing at the rule or member it concerns.
pub fn render(diagnostics: &Diagnostics) -> TokenStream2 {
    for diagnostic in diagnostics.iter() {
        match diagnostic.severity {
            Severity::Verbose => tracing::debug!(
                id = %diagnostic.id,
                member = %diagnostic.location.member,
                "{}",
                diagnostic.message
            ),
            Severity::Error | Severity::Fatal => tracing::warn!(
                id = %diagnostic.id,
                member = %diagnostic.location.member,
                "{}",
                diagnostic.message
            ),
        }
    }

    diagnostics
        .to_syn_error()
        .map(|err| err.to_compile_error())
        .unwrap_or_default()
}
