//! Argument parser shared by `#[weave(...)]` and every rule attribute.
//!
//! Accepts a comma-separated list of items:
//!
//! - flags: `readonly`, `is_even`
//! - key-value pairs: `min = 0`, `message = "..."`, `exception = my::Error`
//! - bare paths: `validators::is_even`
//!
//! Keys may be keywords (`crate = "..."`, `fn = path`).

use proc_macro2::Span;
use syn::{
    Attribute, Expr, ExprLit, ExprUnary, Ident, Lit, Meta, Path, Result, Token, Type, UnOp,
    ext::IdentExt,
    parse::{Parse, ParseStream, discouraged::Speculative},
    punctuated::Punctuated,
    spanned::Spanned,
};

/// Parsed attribute arguments container.
#[derive(Debug, Clone, Default)]
pub struct AttrArgs {
    pub items: Vec<AttrItem>,
}

/// A single attribute item.
#[derive(Debug, Clone)]
pub enum AttrItem {
    /// A flag like `readonly`, or a single-segment predicate path.
    Flag(Ident),
    /// Key-value pair like `key = value`.
    KeyValue { key: Ident, value: AttrValue },
    /// A multi-segment path like `rules::is_even`.
    Path(Path),
}

impl AttrItem {
    /// Span covering the item, for diagnostics.
    pub fn span(&self) -> Span {
        match self {
            Self::Flag(ident) => ident.span(),
            Self::KeyValue { key, .. } => key.span(),
            Self::Path(path) => path.span(),
        }
    }
}

/// Right-hand side of a key-value pair.
#[derive(Debug, Clone)]
pub enum AttrValue {
    Ident(Ident),
    Lit(Lit),
    Path(Path),
    Expr(Expr),
    /// Only parses as a type, e.g. `Box<dyn Error>`.
    Type(Type),
}

impl AttrValue {
    /// The value as an expression; `None` for values that only parse as types.
    pub fn to_expr(&self) -> Option<Expr> {
        let path = |path: Path| {
            Expr::Path(syn::ExprPath {
                attrs: Vec::new(),
                qself: None,
                path,
            })
        };

        match self {
            Self::Ident(ident) => Some(path(Path::from(ident.clone()))),
            Self::Lit(lit) => Some(Expr::Lit(ExprLit {
                attrs: Vec::new(),
                lit: lit.clone(),
            })),
            Self::Path(p) => Some(path(p.clone())),
            Self::Expr(expr) => Some(expr.clone()),
            Self::Type(_) => None,
        }
    }

    /// Span of the value, for diagnostics.
    pub fn span(&self) -> Span {
        match self {
            Self::Ident(ident) => ident.span(),
            Self::Lit(lit) => lit.span(),
            Self::Path(path) => path.span(),
            Self::Expr(expr) => expr.span(),
            Self::Type(ty) => ty.span(),
        }
    }
}

impl AttrArgs {
    /// Find a key-value pair by key name.
    pub fn get_value(&self, key: &str) -> Option<&AttrValue> {
        self.items.iter().find_map(|item| match item {
            AttrItem::KeyValue { key: k, value } if k == key => Some(value),
            _ => None,
        })
    }

    /// Get a string value by key.
    pub fn get_string(&self, key: &str) -> Result<Option<syn::LitStr>> {
        match self.get_value(key) {
            None => Ok(None),
            Some(AttrValue::Lit(Lit::Str(s))) => Ok(Some(s.clone())),
            Some(other) => Err(syn::Error::new(
                other.span(),
                format!("expected a string literal for `{key}`"),
            )),
        }
    }

    /// Get a signed integer value by key. Accepts a leading `-`.
    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        let Some(value) = self.get_value(key) else {
            return Ok(None);
        };

        let invalid = || syn::Error::new(value.span(), format!("expected an integer for `{key}`"));

        match value {
            AttrValue::Lit(Lit::Int(int)) => int.base10_parse().map(Some),
            AttrValue::Expr(Expr::Unary(ExprUnary {
                op: UnOp::Neg(_),
                expr,
                ..
            })) => match expr.as_ref() {
                Expr::Lit(ExprLit {
                    lit: Lit::Int(int), ..
                }) => int.base10_parse::<i64>().map(|n| Some(-n)),
                _ => Err(invalid()),
            },
            _ => Err(invalid()),
        }
    }

    /// Get an expression value by key.
    pub fn get_expr(&self, key: &str) -> Result<Option<Expr>> {
        match self.get_value(key) {
            None => Ok(None),
            Some(value) => value.to_expr().map(Some).ok_or_else(|| {
                syn::Error::new(value.span(), format!("expected an expression for `{key}`"))
            }),
        }
    }

    /// Parse a path from a key-value pair. String literals are parsed as paths.
    pub fn get_path(&self, key: &str) -> Result<Option<Path>> {
        let path = match self.get_value(key) {
            None => return Ok(None),
            Some(AttrValue::Ident(ident)) => Path::from(ident.clone()),
            Some(AttrValue::Path(path)) => path.clone(),
            Some(AttrValue::Lit(Lit::Str(s))) => s.parse::<Path>().map_err(|e| {
                syn::Error::new(s.span(), format!("invalid path for `{key}`: {e}"))
            })?,
            Some(other) => {
                return Err(syn::Error::new(
                    other.span(),
                    format!("expected a path for `{key}`"),
                ));
            }
        };

        Ok(Some(path))
    }

    /// Parse a type from a key-value pair.
    pub fn get_type(&self, key: &str) -> Result<Option<Type>> {
        let value = match self.get_value(key) {
            Some(value) => value,
            None => return Ok(None),
        };

        let ty = match value {
            AttrValue::Lit(Lit::Str(s)) => syn::parse_str::<Type>(&s.value())
                .map_err(|e| syn::Error::new(s.span(), format!("invalid type for `{key}`: {e}")))?,
            AttrValue::Ident(i) => Type::Path(syn::TypePath {
                qself: None,
                path: Path::from(i.clone()),
            }),
            AttrValue::Path(path) => Type::Path(syn::TypePath {
                qself: None,
                path: path.clone(),
            }),
            AttrValue::Expr(expr) => syn::parse2::<Type>(quote::quote!(#expr)).map_err(|e| {
                syn::Error::new_spanned(expr, format!("invalid type for `{key}`: {e}"))
            })?,
            AttrValue::Type(ty) => ty.clone(),
            AttrValue::Lit(other) => {
                return Err(syn::Error::new(
                    other.span(),
                    format!("expected a type for `{key}`"),
                ));
            }
        };

        Ok(Some(ty))
    }

    /// Check if a flag is present.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, AttrItem::Flag(f) if f == flag))
    }

    /// Positional paths (flags and bare paths), in order.
    pub fn positional(&self) -> impl Iterator<Item = Path> + '_ {
        self.items.iter().filter_map(|item| match item {
            AttrItem::Flag(ident) => Some(Path::from(ident.clone())),
            AttrItem::Path(path) => Some(path.clone()),
            AttrItem::KeyValue { .. } => None,
        })
    }

    /// Rejects key-value pairs whose key is not in `keys`, and every
    /// positional item unless `positional` is set.
    pub fn ensure_known(&self, keys: &[&str], positional: bool) -> Result<()> {
        for item in &self.items {
            match item {
                AttrItem::KeyValue { key, .. } if !keys.iter().any(|known| key == known) => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("unknown argument `{key}`; expected one of: {}", keys.join(", ")),
                    ));
                }
                AttrItem::Flag(_) | AttrItem::Path(_) if !positional => {
                    return Err(syn::Error::new(item.span(), "unexpected positional argument"));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl Parse for AttrArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let items = if input.is_empty() {
            vec![]
        } else {
            Punctuated::<AttrItemParser, Token![,]>::parse_terminated(input)?
                .into_iter()
                .map(|x| x.0)
                .collect()
        };
        Ok(Self { items })
    }
}

/// Parse attribute like `#[in_range(...)]` (the whole Attribute, not only args).
pub fn parse_attr(attr: &Attribute) -> Result<AttrArgs> {
    match &attr.meta {
        Meta::Path(_) => Ok(AttrArgs::default()),
        Meta::List(list) => syn::parse2::<AttrArgs>(list.tokens.clone()),
        Meta::NameValue(nv) => {
            let name = attr
                .path()
                .get_ident()
                .map_or_else(|| "attribute".to_owned(), ToString::to_string);
            Err(syn::Error::new_spanned(
                nv,
                format!("#[{name}] must be #[{name}(...)] or #[{name}] (not name-value)"),
            ))
        }
    }
}

/// Parse all attributes named `name` and merge them.
pub fn parse_attrs(attrs: &[Attribute], name: &str) -> Result<AttrArgs> {
    let mut result = AttrArgs::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident(name)) {
        result.items.extend(parse_attr(attr)?.items);
    }

    Ok(result)
}

struct AttrItemParser(AttrItem);

impl Parse for AttrItemParser {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.peek(Token![::]) {
            return Ok(Self(AttrItem::Path(input.call(Path::parse_mod_style)?)));
        }

        let fork = input.fork();
        let key = fork.call(Ident::parse_any)?;

        if fork.peek(Token![=]) {
            input.advance_to(&fork);
            input.parse::<Token![=]>()?;
            let value: AttrValue = input.parse::<AttrValueParser>()?.0;
            return Ok(Self(AttrItem::KeyValue { key, value }));
        }

        if fork.peek(Token![::]) {
            return Ok(Self(AttrItem::Path(input.call(Path::parse_mod_style)?)));
        }

        input.advance_to(&fork);
        Ok(Self(AttrItem::Flag(key)))
    }
}

struct AttrValueParser(AttrValue);

impl Parse for AttrValueParser {
    fn parse(input: ParseStream) -> Result<Self> {
        let fork = input.fork();
        let expr = match fork.parse::<Expr>() {
            Ok(expr) if fork.is_empty() || fork.peek(Token![,]) => {
                input.advance_to(&fork);
                expr
            }
            _ => return Ok(Self(AttrValue::Type(input.parse()?))),
        };

        let value = match expr {
            Expr::Lit(ExprLit { lit, attrs }) if attrs.is_empty() => AttrValue::Lit(lit),
            Expr::Path(expr) if expr.qself.is_none() && expr.attrs.is_empty() => {
                match expr.path.get_ident() {
                    Some(ident) => AttrValue::Ident(ident.clone()),
                    None => AttrValue::Path(expr.path),
                }
            }
            other => AttrValue::Expr(other),
        };
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quote::quote;

    #[test]
    fn test_parse_simple_attr() {
        let parsed: AttrArgs = syn::parse2(quote!(message = "value", readonly)).unwrap();

        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.get_string("message").unwrap().unwrap().value(), "value");
        assert!(parsed.has_flag("readonly"));
    }

    #[test]
    fn test_parse_keyword_keys() {
        let parsed: AttrArgs = syn::parse2(quote!(crate = "::my_warden", fn = rules::is_even)).unwrap();

        assert_eq!(parsed.get_string("crate").unwrap().unwrap().value(), "::my_warden");
        let path = parsed.get_path("fn").unwrap().unwrap();
        assert_eq!(quote!(#path).to_string(), "rules :: is_even");
    }

    #[test]
    fn test_parse_positional_paths() {
        let parsed: AttrArgs = syn::parse2(quote!(crate::rules::is_even, priority = 2)).unwrap();

        let paths = parsed.positional().collect::<Vec<_>>();
        assert_eq!(paths.len(), 1);
        assert_eq!(parsed.get_int("priority").unwrap(), Some(2));
    }

    #[test]
    fn test_parse_negative_and_expr_values() {
        let parsed: AttrArgs = syn::parse2(quote!(min = -5, max = LIMIT * 2, priority = -1)).unwrap();

        assert_eq!(parsed.get_int("priority").unwrap(), Some(-1));
        assert!(matches!(parsed.get_value("max"), Some(AttrValue::Expr(_))));
        assert!(parsed.get_expr("min").unwrap().is_some());
    }

    #[test]
    fn test_parse_type_attr() {
        let parsed: AttrArgs =
            syn::parse2(quote!(exception = errors::QuotaExceeded, other = Box<dyn Error>)).unwrap();

        assert!(parsed.get_type("exception").unwrap().is_some());
        assert!(matches!(parsed.get_value("other"), Some(AttrValue::Type(_))));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let parsed: AttrArgs = syn::parse2(quote!(mn = 0)).unwrap();

        let err = parsed.ensure_known(&["min", "max"], false).unwrap_err();
        assert!(err.to_string().contains("unknown argument `mn`"));
    }
}
