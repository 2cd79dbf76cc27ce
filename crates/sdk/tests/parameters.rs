//! Parameter rules woven into free functions and methods.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::pin;
use std::task::{Context, Poll, Waker};

use pretty_assertions::assert_eq;
use warden::{Exception, FailureCategory, ValidationFailure, weave};

/// Runs `f`, which must unwind with a validation failure, and returns it.
fn raised<R>(f: impl FnOnce() -> R) -> ValidationFailure {
    let payload = panic::catch_unwind(AssertUnwindSafe(f))
        .err()
        .expect("woven call should have failed");
    *payload
        .downcast::<ValidationFailure>()
        .expect("panic payload should be a ValidationFailure")
}

#[weave]
fn greet(#[not_null] name: Option<&str>) -> String {
    format!("Hello, {}!", name.unwrap_or_default())
}

#[weave]
fn greet_custom(#[not_null(message = "custom")] name: Option<&str>) -> String {
    format!("Hello, {}!", name.unwrap_or_default())
}

#[test]
fn null_argument_raises_argument_null() {
    assert_eq!(greet(Some("Ada")), "Hello, Ada!");

    let failure = raised(|| greet(None));

    assert_eq!(failure.category(), FailureCategory::ArgumentNull);
    assert_eq!(failure.parameter(), Some("name"));
    assert!(failure.message().contains("name"));
    assert!(failure.message().contains("greet"));
}

#[test]
fn message_override_is_used_verbatim() {
    let failure = raised(|| greet_custom(None));

    assert_eq!(failure.message(), "custom");
    assert_eq!(failure.parameter(), Some("name"));
}

// ----------------------------------------------------------------------------
// Ordering
// ----------------------------------------------------------------------------

thread_local! {
    static SEEN: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
}

fn record(tag: &'static str) -> bool {
    SEEN.with(|seen| seen.borrow_mut().push(tag));
    true
}

fn first(_: &u32) -> bool {
    record("first")
}

fn second(_: &u32) -> bool {
    record("second")
}

fn third(_: &u32) -> bool {
    record("third")
}

fn fourth(_: &u32) -> bool {
    record("fourth")
}

#[weave]
fn stacked(#[check(first)] #[check(second)] a: u32, #[check(third)] b: u32) -> u32 {
    record("body");
    a + b
}

#[weave]
fn prioritized(
    #[check(fourth, priority = 5)]
    #[check(second)]
    a: u32,
    #[check(first, priority = -1)] b: u32,
    #[check(fn = third, priority = 1)] c: u32,
) -> u32 {
    a + b + c
}

fn take_seen() -> Vec<&'static str> {
    SEEN.with(|seen| seen.take())
}

#[test]
fn rules_run_in_declaration_order() {
    take_seen();

    assert_eq!(stacked(1, 2), 3);

    assert_eq!(take_seen(), ["first", "second", "third", "body"]);
}

#[test]
fn lower_priority_runs_first() {
    take_seen();

    prioritized(1, 2, 3);

    assert_eq!(take_seen(), ["first", "second", "third", "fourth"]);
}

// ----------------------------------------------------------------------------
// Failure modes
// ----------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("invalid input: {0}")]
    Invalid(#[from] ValidationFailure),
}

struct Account {
    balance: u64,
    touched: Cell<u32>,
}

#[weave]
impl Account {
    fn deposit(&mut self, #[in_range(min = 1, max = 10_000)] amount: u64) -> Result<u64, AppError> {
        self.touched.set(self.touched.get() + 1);
        self.balance += amount;
        Ok(self.balance)
    }

    fn rename(&self, #[not_empty] title: &str) -> Result<String, ValidationFailure> {
        self.touched.set(self.touched.get() + 1);
        Ok(title.to_uppercase())
    }

    fn withdraw(&mut self, #[in_range(min = 1, max = 500)] amount: u64) -> u64 {
        self.balance -= amount;
        self.balance
    }
}

fn account() -> Account {
    Account {
        balance: 100,
        touched: Cell::new(0),
    }
}

#[test]
fn result_members_return_the_failure_through_from() {
    let mut account = account();

    let err = account.deposit(0).unwrap_err();

    let AppError::Invalid(failure) = err;
    assert_eq!(failure.category(), FailureCategory::ArgumentOutOfRange);
    assert_eq!(failure.parameter(), Some("amount"));
    assert_eq!(failure.value(), Some("0"));
    assert_eq!(account.balance, 100);
    assert_eq!(account.touched.get(), 0);
}

#[test]
fn body_runs_once_validation_passes() {
    let mut account = account();

    assert_eq!(account.deposit(50).unwrap(), 150);
    assert_eq!(account.rename("savings").unwrap(), "SAVINGS");
    assert_eq!(account.touched.get(), 2);
}

#[test]
fn empty_strings_are_rejected() {
    let account = account();

    let failure = account.rename("").unwrap_err();

    assert_eq!(failure.category(), FailureCategory::Argument);
    assert_eq!(failure.parameter(), Some("title"));
    assert_eq!(account.touched.get(), 0);
}

#[test]
fn members_without_result_unwind() {
    let mut account = account();

    let failure = raised(|| account.withdraw(501));

    assert_eq!(failure.category(), FailureCategory::ArgumentOutOfRange);
    assert_eq!(account.balance, 100);
}

#[weave(failure = "panic")]
fn strict(#[not_empty] items: &[u8]) -> Result<usize, ValidationFailure> {
    Ok(items.len())
}

#[test]
fn panic_mode_unwinds_even_from_result_members() {
    assert_eq!(strict(&[1, 2]).unwrap(), 2);

    let failure = raised(|| strict(&[]));

    assert_eq!(failure.parameter(), Some("items"));
}

// ----------------------------------------------------------------------------
// Custom exceptions
// ----------------------------------------------------------------------------

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("quota exceeded: {0}")]
struct QuotaExceeded(String);

impl Exception for QuotaExceeded {
    fn from_message(message: String) -> Self {
        Self(message)
    }
}

#[weave]
fn reserve(
    #[in_range(min = 1, max = 8, exception = QuotaExceeded, message = "at most 8 seats")] seats: u8,
) -> Result<u8, ValidationFailure> {
    Ok(seats)
}

#[test]
fn custom_exceptions_are_built_from_the_message() {
    let failure = reserve(9).unwrap_err();

    assert_eq!(failure.category(), FailureCategory::Custom);
    assert_eq!(
        failure.downcast_ref::<QuotaExceeded>(),
        Some(&QuotaExceeded("at most 8 seats".to_owned()))
    );
    assert!(failure.exception_name().ends_with("QuotaExceeded"));
    assert_eq!(reserve(8).unwrap(), 8);
}

// ----------------------------------------------------------------------------
// Async
// ----------------------------------------------------------------------------

#[weave]
async fn lookup(#[not_empty] key: String) -> Result<usize, ValidationFailure> {
    Ok(key.len())
}

fn poll_once<F: Future>(future: F) -> Poll<F::Output> {
    let mut future = pin!(future);
    future.as_mut().poll(&mut Context::from_waker(Waker::noop()))
}

#[test]
fn async_prologue_runs_on_first_poll() {
    let pending = lookup(String::new());

    match poll_once(pending) {
        Poll::Ready(Err(failure)) => assert_eq!(failure.parameter(), Some("key")),
        other => panic!("expected an immediate failure, got {other:?}"),
    }
    assert!(matches!(poll_once(lookup("k".to_owned())), Poll::Ready(Ok(1))));
}
