//! Per-call parameter snapshots consumed by member rules.
//!
//! A woven member with at least one member rule captures its formal
//! parameters once, at entry, before any other injected call runs. The
//! snapshot borrows the arguments and lives only for the duration of the
//! prologue.
//!
//! Values of `'static` types are readable through
//! [`ParameterSnapshot::get`]. Borrowed or generic parameters are captured
//! opaquely: their name, declared type and nullness are known, their value
//! is not.

use std::any::Any;
use std::fmt;

use indexmap::IndexMap;

use crate::value::Nullable;

/// One captured parameter.
#[derive(Clone, Copy)]
pub struct Captured<'a> {
    name: &'static str,
    type_name: &'static str,
    nullable: bool,
    null: bool,
    value: Option<&'a dyn Any>,
}

impl<'a> Captured<'a> {
    /// Captures a parameter whose type can never be null.
    pub fn value<V: Any>(name: &'static str, value: &'a V) -> Self {
        Self {
            name,
            type_name: std::any::type_name::<V>(),
            nullable: false,
            null: false,
            value: Some(value),
        }
    }

    /// Captures a parameter whose type can be null.
    pub fn nullable<V: Nullable + Any>(name: &'static str, value: &'a V) -> Self {
        Self {
            name,
            type_name: std::any::type_name::<V>(),
            nullable: true,
            null: value.is_null(),
            value: Some(value),
        }
    }

    /// Captures a parameter without keeping its value.
    pub fn opaque<V: ?Sized>(name: &'static str, _value: &V) -> Self {
        Self {
            name,
            type_name: std::any::type_name::<V>(),
            nullable: false,
            null: false,
            value: None,
        }
    }

    /// Captures the nullness of a parameter without keeping its value.
    pub fn opaque_nullable<V: Nullable + ?Sized>(name: &'static str, value: &V) -> Self {
        Self {
            name,
            type_name: std::any::type_name::<V>(),
            nullable: true,
            null: value.is_null(),
            value: None,
        }
    }

    /// Parameter name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type of the parameter.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the parameter's type can hold null.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether the value was null at call entry.
    pub fn is_null(&self) -> bool {
        self.null
    }

    /// Whether the value itself was captured.
    pub fn is_readable(&self) -> bool {
        self.value.is_some()
    }

    /// The captured value, if it was kept and has type `T`.
    pub fn get<T: Any>(&self) -> Option<&'a T> {
        self.value?.downcast_ref()
    }
}

impl fmt::Debug for Captured<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Captured");
        out.field("name", &self.name).field("type", &self.type_name);
        if self.nullable {
            out.field("null", &self.null);
        }
        match self.value.and_then(describe) {
            Some(value) => {
                out.field("value", &format_args!("{value}"));
            }
            None => {
                out.field("value", &format_args!(".."));
            }
        }
        out.finish()
    }
}

/// Renders common scalar values for `Debug`; anything else stays `..`.
fn describe(value: &dyn Any) -> Option<String> {
    macro_rules! describe_as {
        ($($ty:ty),* $(,)?) => {
            $(
                if let Some(value) = value.downcast_ref::<$ty>() {
                    return Some(format!("{value:?}"));
                }
            )*
        };
    }

    describe_as!(
        bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
        String, &'static str,
    );
    None
}

/// Ordered name → value capture of a method's arguments at call entry.
#[derive(Debug, Clone, Default)]
pub struct ParameterSnapshot<'a> {
    entries: IndexMap<&'static str, Captured<'a>>,
}

impl<'a> ParameterSnapshot<'a> {
    /// Builds a snapshot from captures in parameter order.
    pub fn capture(entries: impl IntoIterator<Item = Captured<'a>>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|captured| (captured.name, captured))
                .collect(),
        }
    }

    /// Looks up the capture of a parameter by name.
    pub fn entry(&self, name: &str) -> Option<&Captured<'a>> {
        self.entries.get(name)
    }

    /// The value of the named parameter, if it was captured with type `T`.
    ///
    /// ```
    /// use warden_rules::{Captured, ParameterSnapshot};
    ///
    /// let (start, end) = (3_u32, 9_u32);
    /// let snapshot = ParameterSnapshot::capture([
    ///     Captured::value("start", &start),
    ///     Captured::value("end", &end),
    /// ]);
    ///
    /// assert_eq!(snapshot.get::<u32>("end"), Some(&9));
    /// assert_eq!(snapshot.get::<u64>("end"), None);
    /// ```
    pub fn get<T: Any>(&self, name: &str) -> Option<&'a T> {
        self.entry(name)?.get()
    }

    /// Whether the named parameter was null; `None` if there is no such
    /// parameter.
    pub fn is_null(&self, name: &str) -> Option<bool> {
        self.entry(name).map(Captured::is_null)
    }

    /// Number of captured parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Captures in parameter order.
    pub fn iter(&self) -> impl Iterator<Item = &Captured<'a>> {
        self.entries.values()
    }

    /// Parameter names in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// Captures whose type can hold null.
    pub fn nullable(&self) -> impl Iterator<Item = &Captured<'a>> {
        self.iter().filter(|captured| captured.nullable)
    }

    /// Names of the parameters that were null.
    pub fn null_parameters(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.iter()
            .filter(|captured| captured.null)
            .map(Captured::name)
    }
}

impl<'s, 'a> IntoIterator for &'s ParameterSnapshot<'a> {
    type Item = &'s Captured<'a>;
    type IntoIter = indexmap::map::Values<'s, &'static str, Captured<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_parameter_order() {
        let (id, email, phone) = (7_u64, None::<&str>, Some("555"));
        let snapshot = ParameterSnapshot::capture([
            Captured::value("id", &id),
            Captured::opaque_nullable("email", &email),
            Captured::opaque_nullable("phone", &phone),
        ]);

        assert_eq!(snapshot.names().collect::<Vec<_>>(), ["id", "email", "phone"]);
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn records_nullness_at_capture() {
        let (id, email, phone) = (7_u64, None::<&str>, Some(555_u32));
        let snapshot = ParameterSnapshot::capture([
            Captured::value("id", &id),
            Captured::opaque_nullable("email", &email),
            Captured::nullable("phone", &phone),
        ]);

        assert_eq!(snapshot.is_null("id"), Some(false));
        assert_eq!(snapshot.is_null("email"), Some(true));
        assert_eq!(snapshot.is_null("phone"), Some(false));
        assert_eq!(snapshot.is_null("fax"), None);
        assert_eq!(snapshot.null_parameters().collect::<Vec<_>>(), ["email"]);
        assert_eq!(snapshot.nullable().count(), 2);
    }

    #[test]
    fn values_are_readable_by_type() {
        let (start, end, label) = (50_u32, 10_u32, String::from("window"));
        let phone = Some(555_u32);
        let snapshot = ParameterSnapshot::capture([
            Captured::value("start", &start),
            Captured::value("end", &end),
            Captured::value("label", &label),
            Captured::nullable("phone", &phone),
        ]);

        assert_eq!(snapshot.get::<u32>("start"), Some(&50));
        assert_eq!(snapshot.get::<u32>("end"), Some(&10));
        assert_eq!(snapshot.get::<String>("label").map(String::as_str), Some("window"));
        assert_eq!(snapshot.get::<Option<u32>>("phone"), Some(&Some(555)));
        assert_eq!(snapshot.get::<i64>("start"), None);
        assert_eq!(snapshot.get::<u32>("missing"), None);
    }

    #[test]
    fn opaque_captures_keep_type_but_not_value() {
        let name = String::from("borrowed");
        let title: &str = &name;
        let snapshot = ParameterSnapshot::capture([Captured::opaque("title", &title)]);

        let entry = snapshot.entry("title").unwrap();
        assert!(!entry.is_readable());
        assert!(!entry.is_nullable());
        assert_eq!(entry.type_name(), "&str");
        assert_eq!(snapshot.get::<&str>("title"), None);
    }

    #[test]
    fn debug_shows_scalar_values() {
        let (start, end) = (50_u32, 10_u32);
        let snapshot = ParameterSnapshot::capture([
            Captured::value("start", &start),
            Captured::value("end", &end),
            Captured::opaque("rest", &[1_u8, 2]),
        ]);

        let rendered = format!("{snapshot:?}");

        assert!(rendered.contains("value: 50"), "{rendered}");
        assert!(rendered.contains("value: 10"), "{rendered}");
        assert!(rendered.contains("value: .."), "{rendered}");
    }
}
