//! The module read/write boundary.
//!
//! The engine only needs three capabilities from whoever owns the syntax:
//! enumerate methods and properties, read the attributes attached to them,
//! and prepend a prologue to a method body. [`ModuleHost`] names those
//! capabilities; [`ItemHost`] implements them over `syn` items and
//! [`PropertyHost`](crate::properties::PropertyHost) over a
//! `#[derive(Properties)]` struct.

use proc_macro2::Span;
use syn::{
    Attribute, Block, FnArg, Generics, Ident, ImplItem, Item, ItemFn, ItemImpl, ItemMod, ItemTrait,
    Pat, Receiver, ReturnType, Signature, Stmt, TraitItem, Type, spanned::Spanned,
    visit_mut::VisitMut,
};

/// Enumerates and edits the declarations of one unit of source.
pub trait ModuleHost {
    /// Calls `visit` for every method declaration.
    fn for_each_method(&mut self, visit: &mut dyn FnMut(&mut MethodDecl<'_>));

    /// Calls `visit` for every property declaration.
    fn for_each_property(&mut self, visit: &mut dyn FnMut(&mut PropertyDecl<'_>));
}

// ============================================================================
// DECLARATION VIEWS
// ============================================================================

/// Borrowed view of a method: its attributes, signature and body.
pub struct MethodDecl<'a> {
    path: String,
    attrs: &'a mut Vec<Attribute>,
    sig: &'a mut Signature,
    body: Option<&'a mut Block>,
    outer_type_parameters: Vec<Ident>,
}

impl<'a> MethodDecl<'a> {
    pub fn new(
        path: String,
        attrs: &'a mut Vec<Attribute>,
        sig: &'a mut Signature,
        body: Option<&'a mut Block>,
    ) -> Self {
        Self {
            path,
            attrs,
            sig,
            body,
            outer_type_parameters: Vec::new(),
        }
    }

    /// Records the type parameters of the enclosing `impl` or trait.
    pub fn with_outer_generics(mut self, generics: &Generics) -> Self {
        self.outer_type_parameters = generics
            .type_params()
            .map(|param| param.ident.clone())
            .collect();
        self
    }

    /// Type parameters in scope: the enclosing item's, then the method's own.
    pub fn type_parameters(&self) -> impl Iterator<Item = &Ident> {
        self.outer_type_parameters
            .iter()
            .chain(self.sig.generics.type_params().map(|param| &param.ident))
    }

    /// Qualified path used in diagnostics, e.g. `Account::deposit`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn ident(&self) -> &Ident {
        &self.sig.ident
    }

    pub fn signature(&self) -> &Signature {
        self.sig
    }

    /// Attributes attached to the method itself.
    pub fn attrs(&self) -> &[Attribute] {
        self.attrs
    }

    /// Every formal parameter, receiver included, in declaration order.
    pub fn parameters(&self) -> impl Iterator<Item = ParameterDecl<'_>> {
        self.sig
            .inputs
            .iter()
            .enumerate()
            .map(|(index, arg)| ParameterDecl { index, arg })
    }

    pub fn receiver(&self) -> Option<&Receiver> {
        self.sig.receiver()
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Whether the declared return type is a `Result` a `ValidationFailure`
    /// can be converted into. `io::Result` and `fmt::Result` fix an error
    /// type that has no such conversion, so they do not count.
    pub fn returns_result(&self) -> bool {
        match &self.sig.output {
            ReturnType::Default => false,
            ReturnType::Type(_, ty) => is_result(ty),
        }
    }

    /// Inserts `prologue` as the first statement of the body. Returns `false`
    /// when the method has no body.
    pub fn prepend_prologue(&mut self, prologue: Stmt) -> bool {
        match self.body.as_deref_mut() {
            Some(body) => {
                body.stmts.insert(0, prologue);
                true
            }
            None => false,
        }
    }

    /// Removes matching attributes from the method and all its parameters.
    pub fn strip_attrs(&mut self, strip: impl Fn(&Attribute) -> bool) {
        self.attrs.retain(|attr| !strip(attr));
        for arg in &mut self.sig.inputs {
            let attrs = match arg {
                FnArg::Receiver(receiver) => &mut receiver.attrs,
                FnArg::Typed(typed) => &mut typed.attrs,
            };
            attrs.retain(|attr| !strip(attr));
        }
    }
}

fn is_result(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => {
            let mut segments = path.path.segments.iter().rev();
            let last = segments.next().is_some_and(|segment| segment.ident == "Result");
            let fixed_error = segments
                .next()
                .is_some_and(|module| module.ident == "io" || module.ident == "fmt");
            last && !fixed_error
        }
        Type::Paren(inner) => is_result(&inner.elem),
        Type::Group(inner) => is_result(&inner.elem),
        _ => false,
    }
}

/// Borrowed view of one formal parameter.
#[derive(Clone, Copy)]
pub struct ParameterDecl<'a> {
    index: usize,
    arg: &'a FnArg,
}

impl<'a> ParameterDecl<'a> {
    /// Position in the signature, receiver included.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn attrs(&self) -> &'a [Attribute] {
        match self.arg {
            FnArg::Receiver(receiver) => &receiver.attrs,
            FnArg::Typed(typed) => &typed.attrs,
        }
    }

    pub fn is_receiver(&self) -> bool {
        matches!(self.arg, FnArg::Receiver(_))
    }

    /// The bound name, when the pattern is a plain identifier.
    pub fn name(&self) -> Option<&'a Ident> {
        match self.arg {
            FnArg::Typed(typed) => match typed.pat.as_ref() {
                Pat::Ident(pat) if pat.subpat.is_none() => Some(&pat.ident),
                _ => None,
            },
            FnArg::Receiver(_) => None,
        }
    }

    /// Declared type; `None` for the receiver.
    pub fn ty(&self) -> Option<&'a Type> {
        match self.arg {
            FnArg::Typed(typed) => Some(&typed.ty),
            FnArg::Receiver(_) => None,
        }
    }

    pub fn span(&self) -> Span {
        match self.arg {
            FnArg::Typed(typed) => typed.pat.span(),
            FnArg::Receiver(receiver) => receiver.self_token.span,
        }
    }
}

/// Borrowed view of a property: a struct field with generated accessors.
pub struct PropertyDecl<'a> {
    owner: &'a Ident,
    field: &'a Ident,
    ty: &'a Type,
    attrs: &'a [Attribute],
    setter: Option<MethodDecl<'a>>,
}

impl<'a> PropertyDecl<'a> {
    pub fn new(
        owner: &'a Ident,
        field: &'a Ident,
        ty: &'a Type,
        attrs: &'a [Attribute],
        setter: Option<MethodDecl<'a>>,
    ) -> Self {
        Self {
            owner,
            field,
            ty,
            attrs,
            setter,
        }
    }

    /// Qualified path used in diagnostics, e.g. `Person::age`.
    pub fn path(&self) -> String {
        format!("{}::{}", self.owner, self.field)
    }

    pub fn name(&self) -> &Ident {
        self.field
    }

    pub fn ty(&self) -> &Type {
        self.ty
    }

    /// Attributes attached to the field.
    pub fn attrs(&self) -> &[Attribute] {
        self.attrs
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// The generated setter, the method property rules are woven into.
    pub fn setter_mut(&mut self) -> Option<&mut MethodDecl<'a>> {
        self.setter.as_mut()
    }
}

// ============================================================================
// ITEM HOST
// ============================================================================

/// Hosts free functions, `impl` blocks, traits and inline modules.
pub struct ItemHost<'a> {
    items: &'a mut [Item],
}

impl<'a> ItemHost<'a> {
    /// Hosts a single item and everything nested in it.
    pub fn new(item: &'a mut Item) -> Self {
        Self {
            items: std::slice::from_mut(item),
        }
    }

    /// Hosts every item of a file.
    pub fn file(file: &'a mut syn::File) -> Self {
        Self {
            items: &mut file.items,
        }
    }
}

impl ModuleHost for ItemHost<'_> {
    fn for_each_method(&mut self, visit: &mut dyn FnMut(&mut MethodDecl<'_>)) {
        let mut visitor = MethodVisitor {
            scope: Vec::new(),
            visit,
        };
        for item in self.items.iter_mut() {
            visitor.visit_item_mut(item);
        }
    }

    fn for_each_property(&mut self, _visit: &mut dyn FnMut(&mut PropertyDecl<'_>)) {
        // Properties come from `#[derive(Properties)]`, which sees the struct
        // on its own.
    }
}

struct MethodVisitor<'v> {
    scope: Vec<String>,
    visit: &'v mut dyn FnMut(&mut MethodDecl<'_>),
}

impl MethodVisitor<'_> {
    fn path_of(&self, ident: &Ident) -> String {
        let mut path = self.scope.join("::");
        if !path.is_empty() {
            path.push_str("::");
        }
        path.push_str(&ident.to_string());
        path
    }
}

impl VisitMut for MethodVisitor<'_> {
    fn visit_item_fn_mut(&mut self, item: &mut ItemFn) {
        let path = self.path_of(&item.sig.ident);
        let mut method =
            MethodDecl::new(path, &mut item.attrs, &mut item.sig, Some(&mut *item.block));
        (self.visit)(&mut method);
    }

    fn visit_item_impl_mut(&mut self, item: &mut ItemImpl) {
        self.scope.push(type_label(&item.self_ty));
        for impl_item in &mut item.items {
            if let ImplItem::Fn(function) = impl_item {
                let path = self.path_of(&function.sig.ident);
                let mut method = MethodDecl::new(
                    path,
                    &mut function.attrs,
                    &mut function.sig,
                    Some(&mut function.block),
                )
                .with_outer_generics(&item.generics);
                (self.visit)(&mut method);
            }
        }
        self.scope.pop();
    }

    fn visit_item_trait_mut(&mut self, item: &mut ItemTrait) {
        self.scope.push(item.ident.to_string());
        for trait_item in &mut item.items {
            if let TraitItem::Fn(function) = trait_item {
                let path = self.path_of(&function.sig.ident);
                let mut method = MethodDecl::new(
                    path,
                    &mut function.attrs,
                    &mut function.sig,
                    function.default.as_mut(),
                )
                .with_outer_generics(&item.generics);
                (self.visit)(&mut method);
            }
        }
        self.scope.pop();
    }

    fn visit_item_mod_mut(&mut self, item: &mut ItemMod) {
        self.scope.push(item.ident.to_string());
        syn::visit_mut::visit_item_mod_mut(self, item);
        self.scope.pop();
    }
}

/// Short label for an `impl` self type: its last path segment.
fn type_label(ty: &Type) -> String {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .map_or_else(|| "_".to_owned(), |segment| segment.ident.to_string()),
        Type::Reference(reference) => type_label(&reference.elem),
        Type::Paren(inner) => type_label(&inner.elem),
        Type::Group(inner) => type_label(&inner.elem),
        _ => "_".to_owned(),
    }
}
