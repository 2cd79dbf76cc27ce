//! `#[weave]` rejecting misconfigured rules at build time.

#![allow(unused)]

use warden::weave;

// `not_null` on a type that can never be null
#[weave]
pub fn tally(#[not_null] count: u32) -> u32 {
    count
}

// `String` is not an exception type
#[weave]
pub fn label(#[not_empty(exception = String)] text: &str) -> String {
    text.to_owned()
}

// `failure = "return"` without a `Result` to return
#[weave(failure = "return")]
pub fn size(#[not_empty] items: &[u8]) -> usize {
    items.len()
}

// Rules on a trait method without a default body
#[weave]
pub trait Store {
    fn get(&self, #[not_empty] key: &str) -> Option<u8>;
}

fn main() {}
