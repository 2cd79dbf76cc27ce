//! Value capabilities the built-in rules rely on.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

/// A value that can be null.
///
/// `Option::None` and null raw pointers are null; references and smart
/// pointers forward to what they point at.
#[diagnostic::on_unimplemented(
    message = "`{Self}` can never be null",
    label = "`not_null` and snapshot capture need a nullable type",
    note = "use `Option<T>`, a raw pointer, or a reference/box of one"
)]
pub trait Nullable {
    /// Whether the value is null.
    fn is_null(&self) -> bool;
}

impl<T> Nullable for Option<T> {
    fn is_null(&self) -> bool {
        self.is_none()
    }
}

impl<T: ?Sized> Nullable for *const T {
    fn is_null(&self) -> bool {
        <*const T>::is_null(*self)
    }
}

impl<T: ?Sized> Nullable for *mut T {
    fn is_null(&self) -> bool {
        <*mut T>::is_null(*self)
    }
}

macro_rules! forward_nullable {
    ($($ptr:ty),* $(,)?) => {
        $(
            impl<T: Nullable + ?Sized> Nullable for $ptr {
                fn is_null(&self) -> bool {
                    (**self).is_null()
                }
            }
        )*
    };
}

forward_nullable!(&T, &mut T, Box<T>, Rc<T>, Arc<T>);

/// A value that can be empty.
pub trait Measurable {
    /// Whether the value holds nothing.
    fn is_empty_value(&self) -> bool;
}

impl Measurable for str {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Measurable for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Measurable for [T] {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T, const N: usize> Measurable for [T; N] {
    fn is_empty_value(&self) -> bool {
        N == 0
    }
}

impl<T> Measurable for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Measurable for VecDeque<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> Measurable for HashMap<K, V, S> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T, S> Measurable for HashSet<T, S> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> Measurable for BTreeMap<K, V> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Measurable for BTreeSet<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

/// `None` counts as empty.
impl<T: Measurable> Measurable for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.as_ref().is_none_or(Measurable::is_empty_value)
    }
}

impl<B: ToOwned + Measurable + ?Sized> Measurable for Cow<'_, B> {
    fn is_empty_value(&self) -> bool {
        (**self).is_empty_value()
    }
}

macro_rules! forward_measurable {
    ($($ptr:ty),* $(,)?) => {
        $(
            impl<T: Measurable + ?Sized> Measurable for $ptr {
                fn is_empty_value(&self) -> bool {
                    (**self).is_empty_value()
                }
            }
        )*
    };
}

forward_measurable!(&T, &mut T, Box<T>, Rc<T>, Arc<T>);
