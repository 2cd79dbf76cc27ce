//! `#[derive(Properties)]` expansion.
//!
//! Every named field gets a getter and, unless it is read-only, a setter
//! returning `Result<(), ValidationFailure>`. Rule attributes on the field
//! are woven into the setter and validate the incoming `value` before it
//! is assigned.
//!
//! ```rust,ignore
//! #[derive(Properties)]
//! #[property(failure = "return")]
//! pub struct Person {
//!     #[not_null]
//!     name: Option<String>,
//!     #[in_range(min = 0, max = 150)]
//!     age: u8,
//!     #[property(readonly)]
//!     id: u64,
//!     #[property(skip)]
//!     cache: Vec<u8>,
//! }
//! ```

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    Attribute, Data, DeriveInput, Field, Fields, FieldsNamed, Ident, ImplItemFn, Type, Visibility,
    ext::IdentExt, parse_quote, spanned::Spanned,
};

use crate::attrs;
use crate::config::WeaveConfig;
use crate::diagnostics::DiagnosticSink;
use crate::host::{MethodDecl, ModuleHost, PropertyDecl};

const FIELD_FLAGS: &[&str] = &["readonly", "skip"];

/// One field and its generated accessors.
struct Accessors<'a> {
    field: &'a Ident,
    ty: &'a Type,
    attrs: &'a [Attribute],
    getter: ImplItemFn,
    setter: Option<ImplItemFn>,
}

/// Hosts the properties of one struct.
pub struct PropertyHost<'a> {
    owner: &'a Ident,
    properties: Vec<Accessors<'a>>,
}

impl<'a> PropertyHost<'a> {
    /// Generates accessors for every field of `input` not marked `skip`.
    pub fn new(input: &'a DeriveInput, config: &WeaveConfig) -> syn::Result<Self> {
        let fields = require_named_fields(input)?;
        let mut properties = Vec::with_capacity(fields.named.len());

        for field in &fields.named {
            let options = attrs::parse_attrs(&field.attrs, "property")?;
            options.ensure_known(&[], true)?;
            for flag in options.positional() {
                if !FIELD_FLAGS.iter().any(|known| flag.is_ident(known)) {
                    return Err(syn::Error::new_spanned(
                        &flag,
                        format!("unknown property option; expected one of: {}", FIELD_FLAGS.join(", ")),
                    ));
                }
            }
            if options.has_flag("skip") {
                continue;
            }

            let Some(name) = field.ident.as_ref() else {
                continue;
            };
            properties.push(Accessors {
                field: name,
                ty: &field.ty,
                attrs: &field.attrs,
                getter: getter(&input.vis, field, name),
                setter: (!options.has_flag("readonly"))
                    .then(|| setter(&input.vis, field, name, config)),
            });
        }

        Ok(Self {
            owner: &input.ident,
            properties,
        })
    }

    /// The generated accessors, in field order.
    pub fn methods(&self) -> impl Iterator<Item = &ImplItemFn> {
        self.properties
            .iter()
            .flat_map(|property| std::iter::once(&property.getter).chain(&property.setter))
    }
}

impl ModuleHost for PropertyHost<'_> {
    fn for_each_method(&mut self, _visit: &mut dyn FnMut(&mut MethodDecl<'_>)) {}

    fn for_each_property(&mut self, visit: &mut dyn FnMut(&mut PropertyDecl<'_>)) {
        let owner = self.owner;
        for property in &mut self.properties {
            let setter = property.setter.as_mut().map(|setter| {
                MethodDecl::new(
                    format!("{owner}::{}", setter.sig.ident),
                    &mut setter.attrs,
                    &mut setter.sig,
                    Some(&mut setter.block),
                )
            });
            let mut decl =
                PropertyDecl::new(owner, property.field, property.ty, property.attrs, setter);
            visit(&mut decl);
        }
    }
}

fn getter(vis: &Visibility, field: &Field, name: &Ident) -> ImplItemFn {
    let ty = &field.ty;
    parse_quote! {
        #[inline]
        #vis fn #name(&self) -> &#ty {
            &self.#name
        }
    }
}

fn setter(vis: &Visibility, field: &Field, name: &Ident, config: &WeaveConfig) -> ImplItemFn {
    let ty = &field.ty;
    let runtime = &config.runtime;
    let method = format_ident!("set_{}", name.unraw(), span = name.span());
    parse_quote! {
        #vis fn #method(&mut self, value: #ty) -> ::core::result::Result<(), #runtime::ValidationFailure> {
            self.#name = value;
            ::core::result::Result::Ok(())
        }
    }
}

/// Ensure the input is a struct with named fields.
fn require_named_fields(input: &DeriveInput) -> syn::Result<&FieldsNamed> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(fields),
            fields => Err(syn::Error::new(
                fields.span(),
                "Properties requires a struct with named fields (e.g. `struct X { ... }`)",
            )),
        },
        _ => Err(syn::Error::new(
            input.ident.span(),
            "Properties can only be derived for structs",
        )),
    }
}

/// Expands `#[derive(Properties)]`: an inherent `impl` holding the woven
/// accessors.
pub fn expand_properties(
    input: &DeriveInput,
    sink: &mut dyn DiagnosticSink,
) -> syn::Result<TokenStream> {
    let config = WeaveConfig::from_args(&attrs::parse_attrs(&input.attrs, "property")?)?;
    let mut host = PropertyHost::new(input, &config)?;

    crate::weave_host(&mut host, &config, sink)?;

    let owner = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let methods = host.methods();

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics #owner #ty_generics #where_clause {
            #(#methods)*
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Diagnostics, MessageId, Severity};
    use pretty_assertions::assert_eq;

    fn expand(input: DeriveInput) -> (syn::ItemImpl, Diagnostics) {
        let mut sink = Diagnostics::new();
        let tokens = expand_properties(&input, &mut sink).unwrap();
        (syn::parse2(tokens).unwrap(), sink)
    }

    fn method<'a>(item: &'a syn::ItemImpl, name: &str) -> Option<&'a ImplItemFn> {
        item.items.iter().find_map(|item| match item {
            syn::ImplItem::Fn(method) if method.sig.ident == name => Some(method),
            _ => None,
        })
    }

    #[test]
    fn setter_validates_before_assignment() {
        let (item, sink) = expand(parse_quote! {
            pub struct Person {
                #[in_range(min = 0, max = 150)]
                age: u8,
            }
        });

        let setter = method(&item, "set_age").unwrap();
        let expected: ImplItemFn = parse_quote! {
            pub fn set_age(&mut self, value: u8) -> ::core::result::Result<(), ::warden::ValidationFailure> {
                {
                    if let ::core::result::Result::Err(__warden_failure) =
                        ::warden::ParameterRule::new(::warden::InRange::new(0, 150), "set_age")
                            .validate(::core::option::Option::Some(&*self), &value, "value")
                    {
                        return ::core::result::Result::Err(::core::convert::From::from(__warden_failure));
                    }
                }
                self.age = value;
                ::core::result::Result::Ok(())
            }
        };
        assert_eq!(setter, &expected);
        assert!(method(&item, "age").is_some());
        assert_eq!(sink.with_id(MessageId::RuleWoven).count(), 1);
    }

    #[test]
    fn readonly_fields_only_get_a_getter() {
        let (item, sink) = expand(parse_quote! {
            struct Ticket {
                #[property(readonly)]
                #[not_null]
                id: Option<u64>,
            }
        });

        assert!(method(&item, "id").is_some());
        assert!(method(&item, "set_id").is_none());
        let skipped = sink.with_id(MessageId::ReadOnlySkipped).next().unwrap();
        assert_eq!(skipped.severity, Severity::Verbose);
        assert!(!sink.has_errors());
    }

    #[test]
    fn skipped_fields_get_nothing() {
        let (item, _) = expand(parse_quote! {
            struct Cache {
                #[property(skip)]
                raw: Vec<u8>,
                hits: u32,
            }
        });

        let names = item
            .items
            .iter()
            .filter_map(|item| match item {
                syn::ImplItem::Fn(method) => Some(method.sig.ident.to_string()),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(names, ["hits", "set_hits"]);
    }

    #[test]
    fn container_options_reach_the_setter() {
        let (item, _) = expand(parse_quote! {
            #[property(crate = "crate::rt", failure = "panic")]
            struct Named<T> {
                #[not_null]
                label: Option<T>,
            }
        });

        let rendered = quote!(#item).to_string();
        assert!(rendered.contains("impl < T > Named < T >"));
        assert!(rendered.contains("crate :: rt :: ValidationFailure :: raise"));
    }

    #[test]
    fn not_null_on_a_value_field_is_fatal() {
        let mut sink = Diagnostics::new();
        expand_properties(
            &parse_quote! {
                struct Person {
                    #[not_null]
                    age: u8,
                }
            },
            &mut sink,
        )
        .unwrap();

        let fatal = sink.with_id(MessageId::NotNullOnValueType).next().unwrap();
        assert_eq!(fatal.severity, Severity::Fatal);
        assert!(fatal.message.contains("`value`"));
        assert!(fatal.message.contains("`u8`"));
    }

    #[test]
    fn tuple_structs_are_rejected() {
        let err = expand_properties(&parse_quote! { struct Pair(u8, u8); }, &mut Diagnostics::new())
            .unwrap_err();
        assert!(err.to_string().contains("named fields"));
    }

    #[test]
    fn unknown_field_option_is_rejected() {
        let err = expand_properties(
            &parse_quote! {
                struct Person {
                    #[property(hidden)]
                    age: u8,
                }
            },
            &mut Diagnostics::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown property option"));
    }

    #[test]
    fn member_rules_on_fields_are_misplaced() {
        let (item, sink) = expand(parse_quote! {
            struct Contact {
                #[any_not_null]
                #[requires(has_phone)]
                email: Option<String>,
            }
        });

        let misplaced = sink.with_id(MessageId::MisplacedRule).collect::<Vec<_>>();
        assert_eq!(misplaced.len(), 2);
        assert!(misplaced.iter().all(|d| d.severity == Severity::Fatal));
        assert_eq!(sink.with_id(MessageId::RuleWoven).count(), 0);
        assert!(method(&item, "set_email").is_some());
    }

    #[test]
    fn raw_field_names_get_plain_setters() {
        let (item, _) = expand(parse_quote! {
            struct Token {
                #[not_empty]
                r#type: String,
            }
        });

        let setter = method(&item, "set_type").unwrap();
        let rendered = quote!(#setter).to_string();
        assert!(rendered.contains("\"set_type\""));
        assert!(rendered.contains("self . r#type = value"));
    }
}
