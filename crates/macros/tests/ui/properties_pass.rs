//! `#[derive(Properties)]` - successful cases.

use warden::Properties;

#[derive(Default, Properties)]
pub struct Person {
    #[not_null]
    name: Option<String>,

    #[in_range(min = 0, max = 150)]
    age: u8,

    #[property(readonly)]
    id: u64,

    #[property(skip)]
    cache: Vec<u8>,
}

#[derive(Properties)]
#[property(crate = "::warden", failure = "return")]
pub struct Wrapper<T: Clone> {
    #[not_null]
    inner: Option<T>,
}

fn main() {
    let mut person = Person::default();
    let _ = person.set_name(Some("Ada".to_owned()));
    let _ = person.set_age(30);
    let _: &u64 = person.id();
    let _: &Option<String> = person.name();
    let _ = &person.cache;

    let mut wrapper = Wrapper { inner: Some(1_u8) };
    let _ = wrapper.set_inner(None);
    let _ = wrapper.inner();
}
