//! Compile-time tests for warden-macros.
//!
//! These tests use trybuild to verify that woven code type-checks against
//! the runtime crate and that misconfigured rules break the build with
//! their diagnostic.

#[test]
fn test_weave_functions_and_impls() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/weave_pass.rs");
}

#[test]
fn test_weave_traits_and_modules() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/weave_scopes_pass.rs");
}

#[test]
fn test_weave_fail() {
    // Fatal and error diagnostics become `compile_error!`
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/ui/weave_fail.rs");
}

#[test]
fn test_custom_exception_fail() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/ui/exception_fail.rs");
}

#[test]
fn test_properties_derive() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/properties_pass.rs");
}

#[test]
fn test_properties_derive_fail() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/ui/properties_fail.rs");
}
