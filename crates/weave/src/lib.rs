//! # warden-weave
//!
//! Build-time half of warden: finds validation rules on declarations,
//! validates their configuration, orders them and injects a prologue that
//! calls into `warden-rules` at the top of each member body.
//!
//! The engine runs as a pipeline, one member at a time:
//!
//! 1. [`resolver`] reads rule attributes through a [`ModuleHost`];
//! 2. [`check`] rejects misconfigured rules with a diagnostic;
//! 3. [`planner`] orders what is left by priority and declaration order;
//! 4. [`injector`] renders the plan into one block statement.
//!
//! Rule attributes are stripped afterwards whether or not they were woven,
//! so the compiler never sees them.
//!
//! The proc-macros in `warden-macros` drive [`weave_item`] and
//! [`expand_properties`]; build scripts can use [`weave_file`].

pub mod attrs;
pub mod check;
pub mod config;
pub mod diagnostics;
pub mod file;
pub mod host;
pub mod injector;
pub mod planner;
pub mod properties;
pub mod registry;
pub mod resolver;

pub use config::{FailureMode, WeaveConfig};
pub use diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, Location, MessageId, Severity};
pub use file::{WeaveError, WovenFile, weave_file, weave_file_with};
pub use host::{ItemHost, MethodDecl, ModuleHost, ParameterDecl, PropertyDecl};
pub use planner::{PlannedStep, WeavePlan};
pub use properties::{PropertyHost, expand_properties};
pub use registry::RuleRegistry;
pub use resolver::{ResolvedMember, RuleDecl};

use syn::Item;

/// Weaves every method and property `host` exposes. Returns the number of
/// rules injected.
///
/// Rejections are reported to `sink`; the returned error is reserved for
/// prologues that could not be assembled.
pub fn weave_host<H: ModuleHost + ?Sized>(
    host: &mut H,
    config: &WeaveConfig,
    sink: &mut dyn DiagnosticSink,
) -> syn::Result<usize> {
    let registry = RuleRegistry::builtin();
    let mut woven = 0;
    let mut failed: Option<syn::Error> = None;
    let mut record = |result: syn::Result<usize>, woven: &mut usize| match result {
        Ok(count) => *woven += count,
        Err(err) => match failed.as_mut() {
            Some(combined) => combined.combine(err),
            None => failed = Some(err),
        },
    };

    host.for_each_method(&mut |method| {
        let span = tracing::debug_span!("weave", member = method.path());
        let _enter = span.enter();

        let member = resolver::resolve_method(method, &registry, &mut *sink);
        let result = weave_member(member, Some(&mut *method), config, &mut *sink);
        record(result, &mut woven);
        method.strip_attrs(|attr| registry.is_rule(attr));
    });

    host.for_each_property(&mut |property| {
        let span = tracing::debug_span!("weave", member = %property.path());
        let _enter = span.enter();

        let member = resolver::resolve_property(property, &registry, &mut *sink);
        let result = weave_member(member, property.setter_mut(), config, &mut *sink);
        record(result, &mut woven);
    });

    match failed {
        Some(err) => Err(err),
        None => Ok(woven),
    }
}

/// Weaves one item and everything nested in it.
pub fn weave_item(
    item: &mut Item,
    config: &WeaveConfig,
    sink: &mut dyn DiagnosticSink,
) -> syn::Result<usize> {
    match item {
        Item::Fn(_) | Item::Impl(_) | Item::Trait(_) => {}
        Item::Mod(module) if module.content.is_some() => {}
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "#[weave] can only be applied to functions, impl blocks, traits and inline modules",
            ));
        }
    }

    weave_host(&mut ItemHost::new(item), config, sink)
}

fn weave_member(
    mut member: ResolvedMember,
    method: Option<&mut MethodDecl<'_>>,
    config: &WeaveConfig,
    sink: &mut dyn DiagnosticSink,
) -> syn::Result<usize> {
    if !member.has_rules() {
        return Ok(0);
    }

    check::check_member(&mut member, config, &mut *sink);
    let plan = planner::plan(&member, &mut *sink);
    let (Some(prologue), Some(method)) =
        (injector::render_prologue(&plan, &member, config)?, method)
    else {
        return Ok(0);
    };
    method.prepend_prologue(prologue);

    for step in plan.steps() {
        if let Some(kind) = planner::step_kind(&member, step) {
            sink.report(Diagnostic::verbose(
                MessageId::RuleWoven,
                format!("`{kind}` woven into `{}`", member.method),
                Location::new(member.path.clone(), member.span),
            ));
        }
    }

    Ok(plan.rule_count())
}
