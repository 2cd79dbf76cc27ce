//! Custom exceptions must implement `Exception`.

#![allow(unused)]

use warden::weave;

#[derive(Debug)]
pub struct NotAnException(String);

#[weave]
pub fn reserve(#[in_range(min = 1, max = 8, exception = NotAnException)] seats: u8) -> u8 {
    seats
}

fn main() {}
