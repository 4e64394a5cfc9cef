//! Composable operations over ordered dimension lists.
//!
//! Lists are plain slices of runtime descriptors. Every operation returns a
//! fresh list and leaves its inputs untouched, so the same dimension list can
//! feed several matrices.

use tracing::debug;

use crate::param::Tuple;

/// Ordered concatenation of every input list.
#[must_use]
pub fn concat<T: Clone, L: AsRef<[T]>>(lists: &[L]) -> Vec<T> {
    let total = lists.iter().map(|list| list.as_ref().len()).sum();
    let mut out = Vec::with_capacity(total);
    for list in lists {
        out.extend_from_slice(list.as_ref());
    }
    out
}

#[must_use]
pub fn map<T, U>(f: impl FnMut(&T) -> U, list: &[T]) -> Vec<U> {
    list.iter().map(f).collect()
}

/// [`map`] with a fallible transform. Stops at the first error.
pub fn try_map<T, U, E>(f: impl FnMut(&T) -> Result<U, E>, list: &[T]) -> Result<Vec<U>, E> {
    list.iter().map(f).collect()
}

#[must_use]
pub fn filter<T: Clone>(mut predicate: impl FnMut(&T) -> bool, list: &[T]) -> Vec<T> {
    list.iter().filter(|e| predicate(e)).cloned().collect()
}

pub fn negate<T: ?Sized>(predicate: impl Fn(&T) -> bool) -> impl Fn(&T) -> bool {
    move |value| !predicate(value)
}

/// Every ordered tuple taking one element from each list.
///
/// The first list is iterated outermost and the last list varies fastest. No
/// lists yield a single empty tuple; any empty list yields no tuples.
#[must_use]
pub fn cross_product<T: Clone, L: AsRef<[T]>>(lists: &[L]) -> Vec<Tuple<T>> {
    let mut tuples = vec![Tuple::empty()];
    for list in lists {
        let list = list.as_ref();
        let mut next = Vec::with_capacity(tuples.len().saturating_mul(list.len()));
        for prefix in &tuples {
            for element in list {
                let mut tuple = prefix.clone();
                tuple.push(element.clone());
                next.push(tuple);
            }
        }
        tuples = next;
    }
    debug!(
        dimensions = lists.len(),
        combinations = tuples.len(),
        "expanded cross product"
    );
    tuples
}

/// Tags every element of `list` with `op`.
#[must_use]
pub fn with_op<O: Clone, T: Clone>(op: &O, list: &[T]) -> Vec<(O, T)> {
    map(|element| (op.clone(), element.clone()), list)
}

/// True when every element equals the first. An empty list is trivially
/// uniform.
#[must_use]
pub fn all_same<T: PartialEq>(list: &[T]) -> bool {
    match list.split_first() {
        Some((first, rest)) => rest.iter().all(|element| element == first),
        None => true,
    }
}
