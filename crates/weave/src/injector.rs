//! Code injector.
//!
//! Renders a [`WeavePlan`] into one block statement that becomes the first
//! statement of the member's body:
//!
//! ```rust,ignore
//! {
//!     let __warden_snapshot = ::warden::ParameterSnapshot::capture([
//!         ::warden::Captured::opaque_nullable("email", &email),
//!     ]);
//!     if let Err(failure) = ::warden::MemberRule::any_not_null("notify")
//!         .validate(Some(&*self), &__warden_snapshot)
//!     {
//!         return Err(From::from(failure));
//!     }
//!     if let Err(failure) = ::warden::ParameterRule::new(::warden::NotNull, "notify")
//!         .validate(Some(&*self), &email, "email")
//!     {
//!         return Err(From::from(failure));
//!     }
//! }
//! ```
//!
//! Arguments are only borrowed, so the original body sees them untouched.

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::{
    Block, Expr, ExprBlock, GenericArgument, Ident, LitStr, Path, PathArguments, Stmt, Type,
    ext::IdentExt,
};
use warden_rules::RuleKind;

use crate::check::is_nullable;
use crate::config::{FailureMode, WeaveConfig};
use crate::planner::{PlannedStep, WeavePlan};
use crate::resolver::{
    ExceptionSpec, ReceiverKind, ResolvedMember, ResolvedParameter, RuleArgs, RuleDecl,
};

/// Renders the prologue for `member`; `None` when the plan is empty.
pub fn render_prologue(
    plan: &WeavePlan,
    member: &ResolvedMember,
    config: &WeaveConfig,
) -> syn::Result<Option<Stmt>> {
    if plan.is_empty() {
        return Ok(None);
    }

    let injector = Injector::new(member, config);
    let steps = plan.steps().filter_map(|step| injector.step(step));
    let block = syn::parse2::<Block>(quote!({ #(#steps)* }))?;

    Ok(Some(Stmt::Expr(
        Expr::Block(ExprBlock {
            attrs: Vec::new(),
            label: None,
            block,
        }),
        None,
    )))
}

struct Injector<'m> {
    member: &'m ResolvedMember,
    runtime: &'m Path,
    snapshot: Ident,
    failure: Ident,
    on_failure: TokenStream,
    target: TokenStream,
}

impl<'m> Injector<'m> {
    fn new(member: &'m ResolvedMember, config: &'m WeaveConfig) -> Self {
        let runtime = &config.runtime;
        let failure = format_ident!("__warden_failure", span = Span::mixed_site());

        let propagate = match config.failure {
            FailureMode::Auto => member.returns_result,
            FailureMode::Return => true,
            FailureMode::Panic => false,
        };
        let on_failure = if propagate {
            quote!(return ::core::result::Result::Err(::core::convert::From::from(#failure));)
        } else {
            quote!(#runtime::ValidationFailure::raise(#failure);)
        };

        let target = match member.receiver {
            Some(ReceiverKind::Borrowed) => quote!(::core::option::Option::Some(&*self)),
            Some(ReceiverKind::Owned) => quote!(::core::option::Option::Some(&self)),
            None => quote!(::core::option::Option::None::<&()>),
        };

        Self {
            member,
            runtime,
            snapshot: format_ident!("__warden_snapshot", span = Span::mixed_site()),
            failure,
            on_failure,
            target,
        }
    }

    fn step(&self, step: PlannedStep) -> Option<TokenStream> {
        match step {
            PlannedStep::CaptureSnapshot => Some(self.capture_snapshot()),
            PlannedStep::Parameter { parameter, rule } => {
                let parameter = self.member.parameters.get(parameter)?;
                let rule = parameter.rules.get(rule)?;
                self.parameter_call(parameter, rule)
            }
            PlannedStep::Member { rule } => {
                let rule = self.member.member_rules.get(rule)?;
                self.member_call(rule)
            }
        }
    }

    fn capture_snapshot(&self) -> TokenStream {
        let runtime = self.runtime;
        let snapshot = &self.snapshot;
        // Only `requires` predicates read values; nullness rules need nothing
        // more than the opaque capture.
        let readable = self
            .member
            .member_rules
            .iter()
            .any(|rule| rule.kind == RuleKind::Requires);

        let captures = self.member.parameters.iter().filter_map(|parameter| {
            let name = parameter.name.as_ref()?;
            let ty = parameter.ty.as_ref()?;
            let label = label(name);
            let mode = if readable {
                capture_mode(ty, &self.member.type_parameters)
            } else {
                Capture::Opaque
            };
            let constructor = match (mode, is_nullable(ty)) {
                (Capture::Opaque, false) => quote!(opaque),
                (Capture::Opaque, true) => quote!(opaque_nullable),
                (_, false) => quote!(value),
                (_, true) => quote!(nullable),
            };
            let value = match mode {
                Capture::Deref => quote!(&*#name),
                Capture::Value | Capture::Opaque => quote!(&#name),
            };
            Some(quote!(#runtime::Captured::#constructor(#label, #value)))
        });

        quote! {
            let #snapshot = #runtime::ParameterSnapshot::capture([#(#captures),*]);
        }
    }

    fn parameter_call(
        &self,
        parameter: &ResolvedParameter,
        rule: &RuleDecl,
    ) -> Option<TokenStream> {
        let runtime = self.runtime;
        let name = parameter.name.as_ref()?;
        let ty = parameter.ty.as_ref()?;
        let method = self.method_name();

        let check = match (&rule.kind, &rule.args) {
            (RuleKind::NotNull, _) => quote!(#runtime::NotNull),
            (RuleKind::NotEmpty, _) => quote!(#runtime::NotEmpty),
            (RuleKind::InRange, RuleArgs::Range { min, max }) => {
                quote!(#runtime::InRange::new(#min, #max))
            }
            (RuleKind::Satisfies, RuleArgs::Predicate(predicate)) => {
                let label = path_label(predicate);
                quote!(#runtime::Satisfies::new(#predicate, #label))
            }
            _ => return None,
        };

        let options = self.options(rule);
        let value = match ty {
            Type::Reference(_) => quote!(&*#name),
            _ => quote!(&#name),
        };
        let label = label(name);
        let target = &self.target;

        Some(self.guard(quote! {
            #runtime::ParameterRule::new(#check, #method)
                #options
                .validate(#target, #value, #label)
        }))
    }

    fn member_call(&self, rule: &RuleDecl) -> Option<TokenStream> {
        let runtime = self.runtime;
        let method = self.method_name();

        let constructor = match (&rule.kind, &rule.args) {
            (RuleKind::AllNotNull, _) => quote!(#runtime::MemberRule::all_not_null(#method)),
            (RuleKind::AnyNotNull, _) => quote!(#runtime::MemberRule::any_not_null(#method)),
            (RuleKind::ExactlyOneNotNull, _) => {
                quote!(#runtime::MemberRule::exactly_one_not_null(#method))
            }
            (RuleKind::Requires, RuleArgs::Predicate(predicate)) => {
                let label = path_label(predicate);
                quote!(#runtime::MemberRule::requires(#predicate, #label, #method))
            }
            _ => return None,
        };

        let options = self.options(rule);
        let snapshot = &self.snapshot;
        let target = &self.target;

        Some(self.guard(quote! {
            #constructor
                #options
                .validate(#target, &#snapshot)
        }))
    }

    /// `.with_exception(..)` / `.with_message(..)` for configured options.
    fn options(&self, rule: &RuleDecl) -> TokenStream {
        let runtime = self.runtime;

        let exception = match &rule.exception {
            ExceptionSpec::WellKnown(category) => {
                Some(quote!(.with_exception(#runtime::ExceptionType::#category)))
            }
            ExceptionSpec::Type(ty) => {
                Some(quote!(.with_exception(#runtime::ExceptionType::custom::<#ty>())))
            }
            ExceptionSpec::Default | ExceptionSpec::Literal(_) => None,
        };
        let message = rule
            .message
            .as_ref()
            .map(|message| quote!(.with_message(#message)));

        quote!(#exception #message)
    }

    fn guard(&self, call: TokenStream) -> TokenStream {
        let failure = &self.failure;
        let on_failure = &self.on_failure;

        quote! {
            if let ::core::result::Result::Err(#failure) = #call {
                #on_failure
            }
        }
    }

    fn method_name(&self) -> LitStr {
        LitStr::new(&self.member.method, self.member.span)
    }
}

/// How a parameter enters the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    /// Borrow the argument itself.
    Value,
    /// Borrow what the reference argument points at.
    Deref,
    /// Keep name, type and nullness only.
    Opaque,
}

/// Values are only captured when their type is visibly `'static`, so that
/// they can be read back through `Any`.
fn capture_mode(ty: &Type, type_parameters: &[Ident]) -> Capture {
    match ty {
        Type::Reference(reference) if is_owned(&reference.elem, type_parameters) => Capture::Deref,
        Type::Paren(inner) => capture_mode(&inner.elem, type_parameters),
        Type::Group(inner) => capture_mode(&inner.elem, type_parameters),
        ty if is_owned(ty, type_parameters) => Capture::Value,
        _ => Capture::Opaque,
    }
}

/// Whether `ty` is sized and free of borrows, trait objects, `Self` and type
/// parameters.
fn is_owned(ty: &Type, type_parameters: &[Ident]) -> bool {
    match ty {
        Type::Paren(inner) => is_owned(&inner.elem, type_parameters),
        Type::Group(inner) => is_owned(&inner.elem, type_parameters),
        Type::Array(array) => is_owned(&array.elem, type_parameters),
        Type::Tuple(tuple) => tuple.elems.iter().all(|elem| is_owned(elem, type_parameters)),
        Type::Path(path) if path.qself.is_none() => {
            let segments = &path.path.segments;
            let generic = segments
                .first()
                .is_some_and(|first| type_parameters.contains(&first.ident));
            !generic
                && !path.path.is_ident("str")
                && segments.iter().all(|segment| {
                    segment.ident != "Self" && owned_arguments(&segment.arguments, type_parameters)
                })
        }
        _ => false,
    }
}

fn owned_arguments(arguments: &PathArguments, type_parameters: &[Ident]) -> bool {
    match arguments {
        PathArguments::None => true,
        PathArguments::AngleBracketed(args) => args.args.iter().all(|arg| match arg {
            GenericArgument::Type(ty) => is_owned(ty, type_parameters),
            GenericArgument::Lifetime(lifetime) => lifetime.ident == "static",
            GenericArgument::Const(_) => true,
            GenericArgument::AssocType(assoc) => is_owned(&assoc.ty, type_parameters),
            _ => false,
        }),
        PathArguments::Parenthesized(_) => false,
    }
}

/// Parameter name as written in messages, without any `r#` prefix.
fn label(name: &Ident) -> LitStr {
    LitStr::new(&name.unraw().to_string(), name.span())
}

/// Predicate name used in messages: the path without spaces.
fn path_label(path: &Path) -> LitStr {
    let text = quote!(#path).to_string().replace(' ', "");
    LitStr::new(&text, Span::call_site())
}
