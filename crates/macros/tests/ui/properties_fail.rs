//! `#[derive(Properties)]` rejecting member rules on fields.

#![allow(unused)]

use warden::Properties;

fn has_phone(_: &warden::ParameterSnapshot<'_>) -> bool {
    true
}

#[derive(Properties)]
pub struct Contact {
    #[any_not_null]
    email: Option<String>,

    #[requires(has_phone)]
    phone: Option<String>,
}

fn main() {}
