//! Attribute name → rule kind lookup.

use indexmap::IndexMap;
use syn::Attribute;
use warden_rules::{RuleCategory, RuleKind};

/// Result of looking an attribute up for a given declaration category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Not a rule attribute.
    Unknown,
    /// A rule of the requested category.
    Rule(RuleKind),
    /// A rule of the other category.
    Misplaced(RuleKind),
}

/// Known rule attributes.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    rules: IndexMap<&'static str, RuleKind>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleRegistry {
    /// Every built-in rule, registered under its attribute name.
    pub fn builtin() -> Self {
        Self {
            rules: RuleKind::ALL
                .into_iter()
                .map(|kind| (kind.attribute(), kind))
                .collect(),
        }
    }

    /// Kind registered for `attr`, ignoring category.
    pub fn kind_of(&self, attr: &Attribute) -> Option<RuleKind> {
        let ident = attr.path().get_ident()?;
        self.rules.get(ident.to_string().as_str()).copied()
    }

    /// Whether `attr` is a rule attribute of any category.
    pub fn is_rule(&self, attr: &Attribute) -> bool {
        self.kind_of(attr).is_some()
    }

    /// Looks `attr` up, filtered by the category the declaration accepts.
    pub fn lookup(&self, attr: &Attribute, category: RuleCategory) -> Lookup {
        match self.kind_of(attr) {
            None => Lookup::Unknown,
            Some(kind) if kind.category() == category => Lookup::Rule(kind),
            Some(kind) => Lookup::Misplaced(kind),
        }
    }

    /// Registered attribute names, in registry order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use syn::parse_quote;

    #[rstest]
    #[case(parse_quote!(#[not_null]), RuleCategory::Parameter, Lookup::Rule(RuleKind::NotNull))]
    #[case(parse_quote!(#[in_range(min = 0, max = 1)]), RuleCategory::Parameter, Lookup::Rule(RuleKind::InRange))]
    #[case(parse_quote!(#[all_not_null]), RuleCategory::Parameter, Lookup::Misplaced(RuleKind::AllNotNull))]
    #[case(parse_quote!(#[not_empty]), RuleCategory::Member, Lookup::Misplaced(RuleKind::NotEmpty))]
    #[case(parse_quote!(#[requires(p)]), RuleCategory::Member, Lookup::Rule(RuleKind::Requires))]
    #[case(parse_quote!(#[doc = "x"]), RuleCategory::Member, Lookup::Unknown)]
    #[case(parse_quote!(#[serde::not_null]), RuleCategory::Parameter, Lookup::Unknown)]
    fn lookup_filters_by_category(
        #[case] attr: Attribute,
        #[case] category: RuleCategory,
        #[case] expected: Lookup,
    ) {
        assert_eq!(RuleRegistry::builtin().lookup(&attr, category), expected);
    }

    #[test]
    fn registers_every_kind() {
        assert_eq!(RuleRegistry::builtin().attribute_names().count(), RuleKind::ALL.len());
    }
}
