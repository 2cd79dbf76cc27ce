//! Validation target resolution.
//!
//! Reads the rule attributes attached to a method, its parameters, or a
//! property, and turns them into owned [`RuleDecl`]s. The syntax tree is not
//! modified here. Attributes that name a rule of the wrong category, or
//! whose arguments do not parse, are reported and dropped.

use proc_macro2::Span;
use syn::{Attribute, Expr, Ident, Lit, LitStr, Path, Type, ext::IdentExt};
use warden_rules::{ExceptionType, RuleCategory, RuleKind};

use crate::attrs::{self, AttrArgs, AttrValue};
use crate::diagnostics::{Diagnostic, DiagnosticSink, Location, MessageId};
use crate::host::{MethodDecl, PropertyDecl};
use crate::registry::{Lookup, RuleRegistry};

/// Options every rule accepts.
const COMMON_KEYS: &[&str] = &["exception", "message", "priority"];
const RANGE_KEYS: &[&str] = &["exception", "message", "priority", "min", "max"];
const PREDICATE_KEYS: &[&str] = &["exception", "message", "priority", "fn"];

// ============================================================================
// RESOLVED DECLARATIONS
// ============================================================================

/// Kind-specific rule arguments.
#[derive(Debug, Clone)]
pub enum RuleArgs {
    None,
    /// `in_range(min = .., max = ..)`
    Range { min: Expr, max: Expr },
    /// `check(path)`, `requires(path)`
    Predicate(Path),
}

/// The `exception = ..` option as written.
#[derive(Debug, Clone)]
pub enum ExceptionSpec {
    /// Not configured; the kind's default applies.
    Default,
    /// One of the well-known categories, e.g. `ArgumentNull`.
    WellKnown(Ident),
    /// A custom exception type.
    Type(Type),
    /// A literal that cannot name a type.
    Literal(Lit),
}

/// One resolved rule declaration.
#[derive(Debug, Clone)]
pub struct RuleDecl {
    pub kind: RuleKind,
    pub args: RuleArgs,
    pub exception: ExceptionSpec,
    pub message: Option<LitStr>,
    pub priority: i64,
    pub span: Span,
    /// Set by the build-time check when the declaration is misconfigured.
    pub rejected: bool,
}

impl RuleDecl {
    /// A declaration with no options.
    pub fn new(kind: RuleKind, span: Span) -> Self {
        Self {
            kind,
            args: RuleArgs::None,
            exception: ExceptionSpec::Default,
            message: None,
            priority: 0,
            span,
            rejected: false,
        }
    }
}

/// How a method takes its receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverKind {
    /// `&self`, `&mut self`, `self: &Self`
    Borrowed,
    /// `self`, `mut self`, `self: Box<Self>`
    Owned,
}

/// A formal parameter and the rules attached to it.
#[derive(Debug, Clone)]
pub struct ResolvedParameter {
    /// Position in the signature, receiver included.
    pub index: usize,
    /// Bound name; `None` for the receiver and destructuring patterns.
    pub name: Option<Ident>,
    /// Declared type; `None` for the receiver.
    pub ty: Option<Type>,
    pub span: Span,
    pub rules: Vec<RuleDecl>,
}

/// Everything the later stages need to know about one member.
#[derive(Debug, Clone)]
pub struct ResolvedMember {
    /// Qualified path for diagnostics.
    pub path: String,
    /// Method name reported in failure messages.
    pub method: String,
    pub span: Span,
    pub receiver: Option<ReceiverKind>,
    pub returns_result: bool,
    pub has_body: bool,
    /// Set for properties without a setter.
    pub readonly: bool,
    /// Type parameters in scope: the method's own and its impl's or trait's.
    pub type_parameters: Vec<Ident>,
    pub parameters: Vec<ResolvedParameter>,
    pub member_rules: Vec<RuleDecl>,
}

impl ResolvedMember {
    /// Whether any rule was declared on the member or its parameters.
    pub fn has_rules(&self) -> bool {
        !self.member_rules.is_empty() || self.parameters.iter().any(|p| !p.rules.is_empty())
    }

    /// Every rule declaration, parameters first.
    pub fn rules(&self) -> impl Iterator<Item = &RuleDecl> {
        self.parameters
            .iter()
            .flat_map(|parameter| parameter.rules.iter())
            .chain(self.member_rules.iter())
    }

    /// Every rule declaration, mutably, parameters first.
    pub fn rules_mut(&mut self) -> impl Iterator<Item = &mut RuleDecl> {
        self.parameters
            .iter_mut()
            .flat_map(|parameter| parameter.rules.iter_mut())
            .chain(self.member_rules.iter_mut())
    }

    fn location(&self, span: Span) -> Location {
        Location::new(self.path.clone(), span)
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Collects the rules of a method and of each of its parameters.
pub fn resolve_method(
    method: &MethodDecl<'_>,
    registry: &RuleRegistry,
    sink: &mut dyn DiagnosticSink,
) -> ResolvedMember {
    let receiver = method.receiver().map(|receiver| match receiver.ty.as_ref() {
        Type::Reference(_) => ReceiverKind::Borrowed,
        _ => ReceiverKind::Owned,
    });

    let mut member = ResolvedMember {
        path: method.path().to_owned(),
        method: method.ident().unraw().to_string(),
        span: method.ident().span(),
        receiver,
        returns_result: method.returns_result(),
        has_body: method.has_body(),
        readonly: false,
        type_parameters: method.type_parameters().cloned().collect(),
        parameters: Vec::new(),
        member_rules: Vec::new(),
    };

    for parameter in method.parameters() {
        let rules = collect(
            parameter.attrs(),
            RuleCategory::Parameter,
            "a parameter",
            registry,
            &member,
            sink,
        );
        member.parameters.push(ResolvedParameter {
            index: parameter.index(),
            name: parameter.name().cloned(),
            ty: parameter.ty().cloned(),
            span: parameter.span(),
            rules,
        });
    }

    member.member_rules = collect(
        method.attrs(),
        RuleCategory::Member,
        "a method",
        registry,
        &member,
        sink,
    );

    tracing::trace!(
        member = %member.path,
        parameters = member.parameters.len(),
        rules = member.rules().count(),
        "resolved method"
    );

    member
}

/// Collects the rules of a property. They validate the setter's `value`
/// parameter.
pub fn resolve_property(
    property: &mut PropertyDecl<'_>,
    registry: &RuleRegistry,
    sink: &mut dyn DiagnosticSink,
) -> ResolvedMember {
    let path = property.path();
    let name = property.name().clone();
    let ty = property.ty().clone();

    let (method, returns_result) = match property.setter_mut() {
        Some(setter) => (setter.ident().unraw().to_string(), setter.returns_result()),
        None => (format!("set_{}", name.unraw()), true),
    };

    let mut member = ResolvedMember {
        path,
        method,
        span: name.span(),
        receiver: Some(ReceiverKind::Borrowed),
        returns_result,
        has_body: true,
        readonly: !property.is_writable(),
        type_parameters: Vec::new(),
        parameters: Vec::new(),
        member_rules: Vec::new(),
    };

    let rules = collect(
        property.attrs(),
        RuleCategory::Parameter,
        "a property",
        registry,
        &member,
        sink,
    );
    member.parameters.push(ResolvedParameter {
        index: 1,
        name: Some(Ident::new("value", name.span())),
        ty: Some(ty),
        span: name.span(),
        rules,
    });

    member
}

fn collect(
    attrs: &[Attribute],
    category: RuleCategory,
    target: &str,
    registry: &RuleRegistry,
    member: &ResolvedMember,
    sink: &mut dyn DiagnosticSink,
) -> Vec<RuleDecl> {
    let mut rules = Vec::new();

    for attr in attrs {
        match registry.lookup(attr, category) {
            Lookup::Unknown => {}
            Lookup::Misplaced(kind) => sink.report(Diagnostic::fatal(
                MessageId::MisplacedRule,
                format!(
                    "`{kind}` is a {} rule and cannot be attached to {target}",
                    kind.category()
                ),
                member.location(span_of(attr)),
            )),
            Lookup::Rule(kind) => match parse_rule(kind, attr) {
                Ok(rule) => rules.push(rule),
                Err(err) => sink.report(Diagnostic::fatal(
                    MessageId::InvalidRuleArguments,
                    format!("invalid arguments for `{kind}`: {err}"),
                    member.location(err.span()),
                )),
            },
        }
    }

    rules
}

fn span_of(attr: &Attribute) -> Span {
    attr.path()
        .get_ident()
        .map_or_else(Span::call_site, Ident::span)
}

/// Parses one rule attribute.
pub fn parse_rule(kind: RuleKind, attr: &Attribute) -> syn::Result<RuleDecl> {
    let args = attrs::parse_attr(attr)?;
    let mut rule = RuleDecl::new(kind, span_of(attr));

    rule.args = match kind {
        RuleKind::InRange => {
            args.ensure_known(RANGE_KEYS, false)?;
            match (args.get_expr("min")?, args.get_expr("max")?) {
                (Some(min), Some(max)) => RuleArgs::Range { min, max },
                _ => {
                    return Err(syn::Error::new(
                        rule.span,
                        "`in_range` requires both `min = ..` and `max = ..`",
                    ));
                }
            }
        }
        RuleKind::Satisfies | RuleKind::Requires => {
            args.ensure_known(PREDICATE_KEYS, true)?;
            RuleArgs::Predicate(predicate(kind, &args, rule.span)?)
        }
        _ => {
            args.ensure_known(COMMON_KEYS, false)?;
            RuleArgs::None
        }
    };

    rule.exception = exception(&args)?;
    rule.message = args.get_string("message")?;
    rule.priority = args.get_int("priority")?.unwrap_or_default();

    Ok(rule)
}

fn predicate(kind: RuleKind, args: &AttrArgs, span: Span) -> syn::Result<Path> {
    let mut positional = args.positional();
    let named = args.get_path("fn")?;

    match (named, positional.next(), positional.next()) {
        (Some(path), None, _) | (None, Some(path), None) => Ok(path),
        _ => Err(syn::Error::new(
            span,
            format!("`{kind}` takes exactly one predicate path, e.g. `{kind}(is_valid)`"),
        )),
    }
}

fn exception(args: &AttrArgs) -> syn::Result<ExceptionSpec> {
    let spec = match args.get_value("exception") {
        None => ExceptionSpec::Default,
        Some(AttrValue::Ident(ident)) if ExceptionType::well_known(&ident.to_string()).is_some() => {
            ExceptionSpec::WellKnown(ident.clone())
        }
        Some(AttrValue::Lit(Lit::Str(name))) => {
            if ExceptionType::well_known(&name.value()).is_some() {
                ExceptionSpec::WellKnown(Ident::new(&name.value(), name.span()))
            } else {
                ExceptionSpec::Type(name.parse()?)
            }
        }
        Some(AttrValue::Lit(lit)) => ExceptionSpec::Literal(lit.clone()),
        Some(_) => match args.get_type("exception")? {
            Some(ty) => ExceptionSpec::Type(ty),
            None => ExceptionSpec::Default,
        },
    };

    Ok(spec)
}
