//! `#[weave]` on traits and inline modules - successful cases.

use warden::weave;

#[weave]
pub trait Store {
    fn get(&self, key: &str) -> Option<u32>;

    fn get_or(&self, #[not_empty] key: &str, fallback: u32) -> u32 {
        self.get(key).unwrap_or(fallback)
    }
}

#[weave(crate = "::warden", failure = "panic")]
mod billing {
    use warden::{ParameterSnapshot, ValidationFailure};

    fn positive(snapshot: &ParameterSnapshot) -> bool {
        snapshot.len() == 2 && snapshot.get::<u64>("cents").is_some_and(|cents| *cents > 0)
    }

    #[requires(positive)]
    pub fn charge(#[in_range(min = 1, max = 1_000)] cents: u64, memo: Option<&str>) -> u64 {
        let _ = memo;
        cents
    }

    pub struct Ledger;

    impl Ledger {
        #[all_not_null]
        pub fn post(self: Box<Self>, entry: Option<u64>) -> Result<u64, ValidationFailure> {
            Ok(entry.unwrap_or_default())
        }
    }
}

struct Memory;

impl Store for Memory {
    fn get(&self, _key: &str) -> Option<u32> {
        None
    }
}

fn main() {
    let _ = Memory.get_or("a", 1);
    let _ = billing::charge(5, None);
    let _ = Box::new(billing::Ledger).post(Some(1));
}
