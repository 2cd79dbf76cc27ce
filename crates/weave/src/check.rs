//! Build-time validation of rule declarations.
//!
//! Every declaration is checked once, before planning:
//!
//! 1. the validated declaration has a usable name;
//! 2. the configured exception names an exception type;
//! 3. that type can be built from a message alone;
//! 4. `not_null` only targets types that can hold null.
//!
//! A failing declaration is reported as `Fatal` and marked rejected. Whether
//! a type path really implements `Exception` is left to the compiler: the
//! injected `ExceptionType::custom::<E>()` call carries that bound.

use quote::ToTokens;
use syn::{GenericArgument, PathArguments, Type};
use warden_rules::RuleKind;

use crate::config::{FailureMode, WeaveConfig};
use crate::diagnostics::{Diagnostic, DiagnosticSink, Location, MessageId};
use crate::resolver::{ExceptionSpec, ResolvedMember, RuleDecl};

const PRIMITIVES: &[&str] = &[
    "bool", "char", "str", "String", "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16",
    "i32", "i64", "i128", "isize", "f32", "f64",
];

/// Checks every rule declared on `member`, rejecting misconfigured ones.
pub fn check_member(
    member: &mut ResolvedMember,
    config: &WeaveConfig,
    sink: &mut dyn DiagnosticSink,
) {
    if !member.has_rules() {
        return;
    }

    if config.failure == FailureMode::Return && !member.returns_result {
        sink.report(Diagnostic::fatal(
            MessageId::ReturnRequiresResult,
            format!(
                "`failure = \"return\"` requires `{}` to return a `Result`",
                member.method
            ),
            Location::new(member.path.clone(), member.span),
        ));
        member.rules_mut().for_each(|rule| rule.rejected = true);
        return;
    }

    let path = member.path.clone();
    let nullable_parameters = member
        .parameters
        .iter()
        .filter(|parameter| parameter.name.is_some())
        .filter(|parameter| parameter.ty.as_ref().is_some_and(is_nullable))
        .count();

    for parameter in &mut member.parameters {
        let described = parameter.name.as_ref().map_or_else(
            || match &parameter.ty {
                Some(_) => "a destructuring pattern".to_owned(),
                None => "the receiver".to_owned(),
            },
            |name| format!("`{name}`"),
        );

        for rule in &mut parameter.rules {
            let verdict = match (&parameter.name, &parameter.ty) {
                (Some(_), Some(ty)) => check_exception(rule)
                    .and_then(|()| check_nullability(rule, &described, ty)),
                _ => Err((
                    MessageId::NullTarget,
                    format!(
                        "`{}` is attached to {described}, which has no name to validate",
                        rule.kind
                    ),
                )),
            };
            conclude(rule, verdict, &format!("on {described}"), &path, sink);
        }
    }

    for rule in &mut member.member_rules {
        let verdict = check_exception(rule).and_then(|()| {
            let needs_nullable =
                matches!(rule.kind, RuleKind::AnyNotNull | RuleKind::ExactlyOneNotNull);
            if needs_nullable && nullable_parameters == 0 {
                Err((
                    MessageId::NoNullableParameters,
                    format!(
                        "`{}` needs at least one nullable parameter, but none were found",
                        rule.kind
                    ),
                ))
            } else {
                Ok(())
            }
        });
        conclude(rule, verdict, "on the member", &path, sink);
    }
}

type Verdict = Result<(), (MessageId, String)>;

fn conclude(
    rule: &mut RuleDecl,
    verdict: Verdict,
    target: &str,
    path: &str,
    sink: &mut dyn DiagnosticSink,
) {
    let location = Location::new(path.to_owned(), rule.span);
    match verdict {
        Ok(()) => sink.report(Diagnostic::verbose(
            MessageId::PassedValidation,
            format!("`{}` {target} passed build-time validation", rule.kind),
            location,
        )),
        Err((id, message)) => {
            rule.rejected = true;
            sink.report(Diagnostic::fatal(id, message, location));
        }
    }
}

fn check_nullability(rule: &RuleDecl, described: &str, ty: &Type) -> Verdict {
    if rule.kind.requires_nullable() && !is_nullable(ty) {
        return Err((
            MessageId::NotNullOnValueType,
            format!(
                "`{}` cannot apply to parameter {described} of type `{}`: the type can never be null",
                rule.kind,
                type_name(ty)
            ),
        ));
    }
    Ok(())
}

/// Checks the `exception = ..` option.
pub fn check_exception(rule: &RuleDecl) -> Verdict {
    match &rule.exception {
        ExceptionSpec::Default | ExceptionSpec::WellKnown(_) => Ok(()),
        ExceptionSpec::Literal(lit) => Err((
            MessageId::ExceptionBadType,
            format!("`{}` is not an exception type", lit.to_token_stream()),
        )),
        ExceptionSpec::Type(ty) => classify_exception(ty),
    }
}

fn classify_exception(ty: &Type) -> Verdict {
    let bad = |what: &str| {
        Err((
            MessageId::ExceptionBadType,
            format!("`{}` is {what}, not an exception type", type_name(ty)),
        ))
    };
    let improper = |what: &str| {
        Err((
            MessageId::ExceptionImproperType,
            format!(
                "`{}` is {what} and cannot be constructed from a failure message",
                type_name(ty)
            ),
        ))
    };

    match ty {
        Type::Paren(inner) => classify_exception(&inner.elem),
        Type::Group(inner) => classify_exception(&inner.elem),
        Type::Path(path) if path.qself.is_none() => {
            let is_primitive = path.path.get_ident().is_some_and(|ident| {
                PRIMITIVES.iter().any(|primitive| ident == primitive)
            });
            if is_primitive {
                bad("a built-in type")
            } else {
                Ok(())
            }
        }
        Type::Path(_) => Ok(()),
        Type::Tuple(tuple) if tuple.elems.is_empty() => bad("the unit type"),
        Type::Tuple(_) => bad("a tuple"),
        Type::Array(_) | Type::Slice(_) => bad("an array"),
        Type::Never(_) | Type::Infer(_) => bad("not a nameable type"),
        Type::TraitObject(_) => improper("a trait object"),
        Type::ImplTrait(_) => improper("an `impl Trait` type"),
        Type::Reference(_) => improper("a reference"),
        Type::Ptr(_) => improper("a raw pointer"),
        Type::BareFn(_) => improper("a function pointer"),
        _ => improper("not a concrete type"),
    }
}

/// Whether the type, read syntactically, can hold null: `Option<_>`, raw
/// pointers, and references or smart pointers to those.
pub fn is_nullable(ty: &Type) -> bool {
    match ty {
        Type::Ptr(_) => true,
        Type::Reference(reference) => is_nullable(&reference.elem),
        Type::Paren(inner) => is_nullable(&inner.elem),
        Type::Group(inner) => is_nullable(&inner.elem),
        Type::Path(path) if path.qself.is_none() => {
            let Some(last) = path.path.segments.last() else {
                return false;
            };
            if last.ident == "Option" {
                return true;
            }
            if last.ident == "Box" || last.ident == "Rc" || last.ident == "Arc" {
                return first_type_argument(&last.arguments).is_some_and(is_nullable);
            }
            false
        }
        _ => false,
    }
}

fn first_type_argument(arguments: &PathArguments) -> Option<&Type> {
    match arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}

/// Compact rendering of a type for messages: `Option<&str>`, not `Option < & str >`.
pub fn type_name(ty: &Type) -> String {
    let glues = |c: Option<char>| {
        matches!(c, Some('<' | '>' | '&' | ':' | '(' | ')' | '[' | ']' | ',' | ';' | '*'))
    };

    let rendered = ty.to_token_stream().to_string();
    let mut out = String::with_capacity(rendered.len());
    let mut chars = rendered.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ' ' {
            let prev = out.chars().last();
            let keep = matches!(prev, Some(',' | ';')) || !(glues(prev) || glues(chars.peek().copied()));
            if !keep {
                continue;
            }
        }
        out.push(c);
    }

    out
}
