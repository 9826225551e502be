//! Response conditions
//!
//! A condition decides whether polling may stop. Conditions are pure
//! predicates over a [`Response`]; combinators rely on that and may skip
//! evaluating some of their inputs.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::response::Response;

type Predicate = dyn Fn(&Response) -> bool + Send + Sync;

/// Boolean predicate over a response snapshot.
#[derive(Clone)]
pub struct Condition(Arc<Predicate>);

impl Condition {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Response) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    pub fn evaluate(&self, response: &Response) -> bool {
        (self.0)(response)
    }

    /// True when both conditions hold; `other` is skipped if `self` fails.
    pub fn and(self, other: Condition) -> Self {
        all_condition([self, other])
    }

    /// Decode the body as `T` and test it.
    ///
    /// A body that does not decode counts as "not yet", so polling continues.
    pub fn json<T, F>(predicate: F) -> Self
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::new(move |response| response.json::<T>().is_ok_and(|value| predicate(&value)))
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Condition(..)")
    }
}

/// Condition that holds only when every supplied condition holds.
///
/// Conditions run in order and evaluation stops at the first failure. An
/// empty list is always true.
pub fn all_condition<I>(conditions: I) -> Condition
where
    I: IntoIterator<Item = Condition>,
{
    let conditions: Vec<Condition> = conditions.into_iter().collect();
    Condition::new(move |response| conditions.iter().all(|condition| condition.evaluate(response)))
}

/// Condition on the exact response status.
pub fn status_is(status: u16) -> Condition {
    Condition::new(move |response| response.status() == status)
}
