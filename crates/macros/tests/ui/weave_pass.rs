//! `#[weave]` on free functions and impl blocks - successful cases.

use warden::{ValidationFailure, weave};

fn is_even(value: &u32) -> bool {
    value % 2 == 0
}

#[weave]
fn greet(#[not_null] name: Option<&str>, #[not_empty] greeting: &str) -> String {
    format!("{greeting}, {}!", name.unwrap_or_default())
}

#[weave(failure = "return")]
fn halve(#[check(is_even)] #[in_range(min = 2, max = 100)] value: u32) -> Result<u32, ValidationFailure> {
    Ok(value / 2)
}

pub struct Queue {
    items: Vec<String>,
}

#[weave]
impl Queue {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, #[not_empty(exception = Argument, priority = -1)] item: String) {
        self.items.push(item);
    }

    #[any_not_null]
    pub fn find(&self, prefix: Option<&str>, suffix: Option<&str>) -> Option<&String> {
        self.items.iter().find(|item| {
            prefix.is_none_or(|p| item.starts_with(p)) && suffix.is_none_or(|s| item.ends_with(s))
        })
    }

    pub fn into_items(self, #[in_range(min = 0, max = 10)] limit: usize) -> Vec<String> {
        self.items.into_iter().take(limit).collect()
    }
}

fn main() {
    let _ = greet(Some("Ada"), "Hello");
    let _ = halve(10);

    let mut queue = Queue::new();
    queue.push("job".to_owned());
    let _ = queue.find(Some("j"), None);
    let _ = queue.into_items(1);
}
