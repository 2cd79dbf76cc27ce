//! # Warden Macros
//!
//! Proc-macros that weave validation prologues into Rust declarations.
//!
//! | Macro | Description |
//! |-------|-------------|
//! | [`weave`](macro@weave) | Validates parameters and members of functions, impls, traits and modules |
//! | [`Properties`](derive@Properties) | Generates validated getters and setters for struct fields |
//!
//! Use these through the `warden` crate, which re-exports them next to the
//! runtime the generated code calls into.
//!
//! ## Example
//!
//! ```ignore
//! use warden::{Properties, weave};
//!
//! #[weave]
//! impl Account {
//!     pub fn deposit(&mut self, #[in_range(min = 1, max = 10_000)] amount: u64) {
//!         self.balance += amount;
//!     }
//!
//!     #[any_not_null(message = "give us a way to reach you")]
//!     pub fn contact(&self, email: Option<&str>, phone: Option<&str>) -> Result<(), Error> {
//!         Ok(())
//!     }
//! }
//!
//! #[derive(Properties)]
//! pub struct Person {
//!     #[not_null]
//!     name: Option<String>,
//!     #[property(readonly)]
//!     id: u64,
//! }
//! ```
//!
//! Set `WARDEN_LOG` (an `EnvFilter` directive) to trace expansion.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, Item, parse_macro_input};
use warden_weave::{Diagnostics, WeaveConfig};

mod support;

use support::diag;

/// Weaves validation rules into a function, `impl` block, trait or inline
/// module.
///
/// Must be the outermost attribute so it sees the rule attributes before
/// the compiler does.
///
/// # Arguments
///
/// - `crate = "path"` - Path to the runtime crate (default: `::warden`)
/// - `failure = "..."` - One of `auto`, `panic`, `return` (default: `auto`)
///
/// # Parameter rules
///
/// - `#[not_null]` - The argument is not `None` / null
/// - `#[not_empty]` - The argument is present and has at least one element
/// - `#[in_range(min = .., max = ..)]` - The argument lies in `min..=max`
/// - `#[check(path)]` - `path(&value)` returns `true`
///
/// # Member rules
///
/// - `#[all_not_null]` - No nullable argument is null
/// - `#[any_not_null]` - At least one nullable argument is set
/// - `#[exactly_one_not_null]` - Exactly one nullable argument is set
/// - `#[requires(path)]` - `path(&snapshot)` returns `true`
///
/// Every rule also accepts `exception = ..`, `message = ".."` and
/// `priority = N`.
///
/// # Example
///
/// ```ignore
/// #[weave(failure = "return")]
/// fn greet(#[not_null] name: Option<&str>) -> Result<String, warden::ValidationFailure> {
///     Ok(format!("hello {}", name.unwrap_or_default()))
/// }
/// ```
#[proc_macro_attribute]
pub fn weave(args: TokenStream, input: TokenStream) -> TokenStream {
    support::log::init();

    let config = match WeaveConfig::parse(args.into()) {
        Ok(config) => config,
        Err(err) => return diag::to_compile_error(err),
    };
    let mut item = parse_macro_input!(input as Item);

    let mut diagnostics = Diagnostics::new();
    if let Err(err) = warden_weave::weave_item(&mut item, &config, &mut diagnostics) {
        return diag::to_compile_error(err);
    }

    let errors = diag::render(&diagnostics);
    quote! {
        #errors
        #item
    }
    .into()
}

/// Derive macro generating validated accessors for named fields.
///
/// Each field gets `fn field(&self) -> &T` and
/// `fn set_field(&mut self, value: T) -> Result<(), ValidationFailure>`.
/// Parameter rules on the field validate `value` before it is assigned.
///
/// # Attributes
///
/// ## Container attributes (`#[property(...)]` on the struct)
///
/// - `crate = "path"` - Path to the runtime crate (default: `::warden`)
/// - `failure = "..."` - One of `auto`, `panic`, `return` (default: `auto`)
///
/// ## Field attributes
///
/// - `#[property(readonly)]` - Getter only; rules on the field are skipped
/// - `#[property(skip)]` - No accessors
/// - `#[not_null]`, `#[not_empty]`, `#[in_range(..)]`, `#[check(..)]`
///
/// Member rules such as `#[requires(..)]` are accepted as helpers only so the
/// derive can report them as misplaced on a field.
///
/// # Example
///
/// ```ignore
/// #[derive(Properties)]
/// pub struct Person {
///     #[in_range(min = 0, max = 150)]
///     age: u8,
/// }
///
/// let mut person = Person { age: 30 };
/// assert!(person.set_age(200).is_err());
/// assert_eq!(*person.age(), 30);
/// ```
#[proc_macro_derive(
    Properties,
    attributes(
        property,
        not_null,
        not_empty,
        in_range,
        check,
        all_not_null,
        any_not_null,
        exactly_one_not_null,
        requires
    )
)]
pub fn derive_properties(input: TokenStream) -> TokenStream {
    support::log::init();

    let input = parse_macro_input!(input as DeriveInput);

    let mut diagnostics = Diagnostics::new();
    match warden_weave::expand_properties(&input, &mut diagnostics) {
        Ok(expanded) => {
            let errors = diag::render(&diagnostics);
            quote! {
                #errors
                #expanded
            }
            .into()
        }
        Err(err) => diag::to_compile_error(err),
    }
}
