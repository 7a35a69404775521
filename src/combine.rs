//! Combinator adapters over [`Generator`].
//!
//! Each adapter is an explicit state record — one-shot flags, pull counters
//! and pending buffers are named fields, not captured closure state — so the
//! invariants can be tested in isolation.

use std::any::Any;
use std::collections::VecDeque;
use std::marker::PhantomData;

use crate::generator::{GenError, Generator};

/// Maps each produced value through a transform. See [`Generator::map`].
pub struct Map<G, F> {
    source: G,
    transform: F,
}

impl<G, F> Map<G, F> {
    pub(crate) fn new(source: G, transform: F) -> Self {
        Self { source, transform }
    }
}

impl<G, U, F> Generator for Map<G, F>
where
    G: Generator,
    F: FnMut(G::Item) -> U,
{
    type Item = U;

    fn next_value(&mut self) -> Result<U, GenError> {
        Ok((self.transform)(self.source.next_value()?))
    }
}

/// [`Map`] with a zero-based pull counter, incremented once per pull.
pub struct MapIndexed<G, F> {
    source: G,
    transform: F,
    index: u64,
}

impl<G, F> MapIndexed<G, F> {
    pub(crate) fn new(source: G, transform: F) -> Self {
        Self {
            source,
            transform,
            index: 0,
        }
    }
}

impl<G, U, F> Generator for MapIndexed<G, F>
where
    G: Generator,
    F: FnMut(G::Item, u64) -> U,
{
    type Item = U;

    fn next_value(&mut self) -> Result<U, GenError> {
        let value = self.source.next_value()?;
        let index = self.index;
        self.index += 1;
        Ok((self.transform)(value, index))
    }
}

/// Flattens a nested generator one pull deep. See [`Generator::flat_map`].
pub struct FlatMap<G, F> {
    source: G,
    selector: F,
}

impl<G, F> FlatMap<G, F> {
    pub(crate) fn new(source: G, selector: F) -> Self {
        Self { source, selector }
    }
}

impl<G, G2, F> Generator for FlatMap<G, F>
where
    G: Generator,
    G2: Generator,
    F: FnMut(G::Item) -> G2,
{
    type Item = G2::Item;

    fn next_value(&mut self) -> Result<G2::Item, GenError> {
        let value = self.source.next_value()?;
        let mut inner = (self.selector)(value);
        inner.next_value()
    }
}

/// [`FlatMap`] that combines source and nested values.
pub struct FlatMapWith<G, F, C> {
    source: G,
    selector: F,
    compose: C,
}

impl<G, F, C> FlatMapWith<G, F, C> {
    pub(crate) fn new(source: G, selector: F, compose: C) -> Self {
        Self {
            source,
            selector,
            compose,
        }
    }
}

impl<G, G2, F, C, V> Generator for FlatMapWith<G, F, C>
where
    G: Generator,
    G::Item: Clone,
    G2: Generator,
    F: FnMut(G::Item) -> G2,
    C: FnMut(G::Item, G2::Item) -> V,
{
    type Item = V;

    fn next_value(&mut self) -> Result<V, GenError> {
        let value = self.source.next_value()?;
        let mut inner = (self.selector)(value.clone());
        let nested = inner.next_value()?;
        Ok((self.compose)(value, nested))
    }
}

/// Drains one selected sequence per source value, one element per pull.
/// See [`Generator::flat_map_seq`].
pub struct FlatMapSeq<G, F, U> {
    source: G,
    selector: F,
    pending: VecDeque<U>,
}

impl<G, F, U> FlatMapSeq<G, F, U> {
    pub(crate) fn new(source: G, selector: F) -> Self {
        Self {
            source,
            selector,
            pending: VecDeque::new(),
        }
    }
}

impl<G, I, F, U> Generator for FlatMapSeq<G, F, U>
where
    G: Generator,
    I: IntoIterator<Item = U>,
    F: FnMut(G::Item) -> I,
{
    type Item = U;

    fn next_value(&mut self) -> Result<U, GenError> {
        if let Some(value) = self.pending.pop_front() {
            return Ok(value);
        }
        let source_value = self.source.next_value()?;
        self.pending = (self.selector)(source_value).into_iter().collect();
        self.pending.pop_front().ok_or_else(|| {
            GenError::InvalidArgument("sequence selector produced an empty sequence".to_string())
        })
    }
}

/// [`FlatMapSeq`] pairing each inner element with its source value.
pub struct FlatMapSeqWith<G: Generator, F, C, U> {
    source: G,
    selector: F,
    compose: C,
    pending: VecDeque<(G::Item, U)>,
}

impl<G: Generator, F, C, U> FlatMapSeqWith<G, F, C, U> {
    pub(crate) fn new(source: G, selector: F, compose: C) -> Self {
        Self {
            source,
            selector,
            compose,
            pending: VecDeque::new(),
        }
    }
}

impl<G, I, F, C, U, V> Generator for FlatMapSeqWith<G, F, C, U>
where
    G: Generator,
    G::Item: Clone,
    I: IntoIterator<Item = U>,
    F: FnMut(&G::Item) -> I,
    C: FnMut(G::Item, U) -> V,
{
    type Item = V;

    fn next_value(&mut self) -> Result<V, GenError> {
        if let Some((origin, inner)) = self.pending.pop_front() {
            return Ok((self.compose)(origin, inner));
        }
        let source_value = self.source.next_value()?;
        self.pending = (self.selector)(&source_value)
            .into_iter()
            .map(|inner| (source_value.clone(), inner))
            .collect();
        match self.pending.pop_front() {
            Some((origin, inner)) => Ok((self.compose)(origin, inner)),
            None => Err(GenError::InvalidArgument(
                "sequence selector produced an empty sequence".to_string(),
            )),
        }
    }
}

/// Pulls until the predicate holds, bounded by an attempt budget.
/// See [`Generator::filter`].
pub struct Filter<G, P> {
    source: G,
    predicate: P,
    attempts: u64,
}

impl<G, P> Filter<G, P> {
    pub(crate) fn new(source: G, predicate: P, attempts: u64) -> Self {
        Self {
            source,
            predicate,
            attempts,
        }
    }
}

impl<G, P> Generator for Filter<G, P>
where
    G: Generator,
    P: FnMut(&G::Item) -> bool,
{
    type Item = G::Item;

    fn next_value(&mut self) -> Result<G::Item, GenError> {
        for _ in 0..self.attempts {
            let value = self.source.next_value()?;
            if (self.predicate)(&value) {
                return Ok(value);
            }
        }
        Err(GenError::Exhausted {
            attempts: self.attempts,
        })
    }
}

/// Pulls two generators in lock-step. See [`Generator::zip`].
pub struct Zip<G1, G2, F> {
    first: G1,
    second: G2,
    compose: F,
}

impl<G1, G2, F> Zip<G1, G2, F> {
    pub(crate) fn new(first: G1, second: G2, compose: F) -> Self {
        Self {
            first,
            second,
            compose,
        }
    }
}

impl<G1, G2, F, V> Generator for Zip<G1, G2, F>
where
    G1: Generator,
    G2: Generator,
    F: FnMut(G1::Item, G2::Item) -> V,
{
    type Item = V;

    fn next_value(&mut self) -> Result<V, GenError> {
        let a = self.first.next_value()?;
        let b = self.second.next_value()?;
        Ok((self.compose)(a, b))
    }
}

/// Discards a fixed number of values on the first pull.
/// See [`Generator::skip_lazy`].
pub struct SkipLazy<G> {
    source: G,
    remaining: usize,
}

impl<G> SkipLazy<G> {
    pub(crate) fn new(source: G, remaining: usize) -> Self {
        Self { source, remaining }
    }
}

impl<G: Generator> Generator for SkipLazy<G> {
    type Item = G::Item;

    fn next_value(&mut self) -> Result<G::Item, GenError> {
        while self.remaining > 0 {
            self.source.next_value()?;
            self.remaining -= 1;
        }
        self.source.next_value()
    }
}

/// Skips values while the predicate holds; once it first fails, the
/// predicate is never consulted again. See [`Generator::skip_while`].
pub struct SkipWhile<G, P> {
    source: G,
    predicate: P,
    attempts: u64,
    settled: bool,
}

impl<G, P> SkipWhile<G, P> {
    pub(crate) fn new(source: G, predicate: P, attempts: u64) -> Self {
        Self {
            source,
            predicate,
            attempts,
            settled: false,
        }
    }
}

impl<G, P> Generator for SkipWhile<G, P>
where
    G: Generator,
    P: FnMut(&G::Item) -> bool,
{
    type Item = G::Item;

    fn next_value(&mut self) -> Result<G::Item, GenError> {
        if self.settled {
            return self.source.next_value();
        }
        for _ in 0..self.attempts {
            let value = self.source.next_value()?;
            if !(self.predicate)(&value) {
                self.settled = true;
                return Ok(value);
            }
        }
        Err(GenError::Exhausted {
            attempts: self.attempts,
        })
    }
}

/// Lazy sequence that stops permanently at the first failing value.
/// See [`Generator::take_while`].
pub struct TakeWhile<G, P> {
    source: G,
    predicate: P,
    done: bool,
}

impl<G, P> TakeWhile<G, P> {
    pub(crate) fn new(source: G, predicate: P) -> Self {
        Self {
            source,
            predicate,
            done: false,
        }
    }
}

impl<G, P> Iterator for TakeWhile<G, P>
where
    G: Generator,
    P: FnMut(&G::Item) -> bool,
{
    type Item = Result<G::Item, GenError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.source.next_value() {
            Ok(value) if (self.predicate)(&value) => Some(Ok(value)),
            Ok(_) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Observes values without changing them. See [`Generator::tap`].
pub struct Tap<G, F> {
    source: G,
    action: F,
}

impl<G, F> Tap<G, F> {
    pub(crate) fn new(source: G, action: F) -> Self {
        Self { source, action }
    }
}

impl<G, F> Generator for Tap<G, F>
where
    G: Generator,
    F: FnMut(&G::Item),
{
    type Item = G::Item;

    fn next_value(&mut self) -> Result<G::Item, GenError> {
        let value = self.source.next_value()?;
        (self.action)(&value);
        Ok(value)
    }
}

/// Narrows a `Box<dyn Any>` generator to a concrete type.
/// See [`Generator::narrow`].
pub struct Narrow<G, T> {
    source: G,
    _narrowed: PhantomData<fn() -> T>,
}

impl<G, T> Narrow<G, T> {
    pub(crate) fn new(source: G) -> Self {
        Self {
            source,
            _narrowed: PhantomData,
        }
    }
}

impl<G, T> Generator for Narrow<G, T>
where
    G: Generator<Item = Box<dyn Any>>,
    T: Any,
{
    type Item = T;

    fn next_value(&mut self) -> Result<T, GenError> {
        let value = self.source.next_value()?;
        value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| GenError::InvalidCast {
                expected: std::any::type_name::<T>(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{constant, from_fn, incrementer};
    use std::cell::Cell;

    #[test]
    fn test_map_transforms_every_value() {
        let mut doubled = incrementer(1).map(|n| n * 2);
        assert_eq!(doubled.take(3).unwrap(), vec![2, 4, 6]);
    }

    #[test]
    fn test_map_indexed_counts_pulls() {
        let mut indexed = constant("x").map_indexed(|v, i| format!("{v}{i}"));
        assert_eq!(
            indexed.take(3).unwrap(),
            vec!["x0".to_string(), "x1".to_string(), "x2".to_string()]
        );
    }

    #[test]
    fn test_map_is_lazy() {
        let calls = Cell::new(0u32);
        let mut mapped = incrementer(0).map(|n| {
            calls.set(calls.get() + 1);
            n
        });
        assert_eq!(calls.get(), 0);
        mapped.next_value().unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_flat_map_pulls_inner_once() {
        let mut nested = incrementer(0).flat_map(|n| incrementer(n * 10));
        assert_eq!(nested.next_value().unwrap(), 0);
        assert_eq!(nested.next_value().unwrap(), 10);
        assert_eq!(nested.next_value().unwrap(), 20);
    }

    #[test]
    fn test_flat_map_with_composes_source_and_nested() {
        let mut nested =
            incrementer(1).flat_map_with(|n| constant(n * 100), |source, inner| (source, inner));
        assert_eq!(nested.next_value().unwrap(), (1, 100));
        assert_eq!(nested.next_value().unwrap(), (2, 200));
    }

    #[test]
    fn test_flat_map_seq_drains_before_next_source_pull() {
        let mut letters = incrementer(0).flat_map_seq(|n| vec![(n, 'a'), (n, 'b')]);
        assert_eq!(letters.take(5).unwrap(), vec![
            (0, 'a'),
            (0, 'b'),
            (1, 'a'),
            (1, 'b'),
            (2, 'a')
        ]);
    }

    #[test]
    fn test_flat_map_seq_rejects_empty_sequence() {
        let mut empty = incrementer(0).flat_map_seq(|_| Vec::<i32>::new());
        assert!(matches!(
            empty.next_value(),
            Err(GenError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_flat_map_seq_with_pairs_origin() {
        let mut paired = incrementer(10)
            .flat_map_seq_with(|n| 0..*n % 3 + 1, |origin, inner| origin + inner);
        // source 10 yields offsets 0 and 1, source 11 yields 0..3.
        assert_eq!(paired.take(5).unwrap(), vec![10, 11, 11, 12, 13]);
    }

    #[test]
    fn test_filter_never_yields_failing_values() {
        let mut evens = incrementer(0).filter(|n| n % 2 == 0);
        assert_eq!(evens.take(5).unwrap(), vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_filter_exhausts_after_exact_budget() {
        let pulls = Cell::new(0u64);
        let mut never = from_fn(|| {
            pulls.set(pulls.get() + 1);
            0
        })
        .filter_with(|_| false, 25);
        assert!(matches!(
            never.next_value(),
            Err(GenError::Exhausted { attempts: 25 })
        ));
        assert_eq!(pulls.get(), 25);
    }

    #[test]
    fn test_zip_advances_both_sides_once_per_pull() {
        let mut zipped = incrementer(0).zip(incrementer(100), |a, b| (a, b));
        assert_eq!(zipped.next_value().unwrap(), (0, 100));
        assert_eq!(zipped.next_value().unwrap(), (1, 101));
    }

    #[test]
    fn test_release_is_eager() {
        let pulls = Cell::new(0u32);
        let counting = from_fn(|| {
            pulls.set(pulls.get() + 1);
            pulls.get()
        });
        let mut after = counting.release(3).unwrap();
        assert_eq!(pulls.get(), 3);
        assert_eq!(after.next_value().unwrap(), 4);
    }

    #[test]
    fn test_release_zero_is_noop() {
        let pulls = Cell::new(0u32);
        let counting = from_fn(|| {
            pulls.set(pulls.get() + 1);
            pulls.get()
        });
        let _after = counting.release(0).unwrap();
        assert_eq!(pulls.get(), 0);
    }

    #[test]
    fn test_skip_lazy_defers_discarding() {
        let pulls = Cell::new(0u32);
        let mut skipped = from_fn(|| {
            pulls.set(pulls.get() + 1);
            pulls.get()
        })
        .skip_lazy(3);
        assert_eq!(pulls.get(), 0);
        assert_eq!(skipped.next_value().unwrap(), 4);
        assert_eq!(skipped.next_value().unwrap(), 5);
    }

    #[test]
    fn test_skip_while_settles_after_first_false() {
        let checks = Cell::new(0u32);
        let mut skipped = incrementer(0).skip_while(|n| {
            checks.set(checks.get() + 1);
            *n < 20
        });
        assert_eq!(skipped.next_value().unwrap(), 20);
        let checks_after_first = checks.get();
        assert_eq!(skipped.next_value().unwrap(), 21);
        assert_eq!(skipped.next_value().unwrap(), 22);
        assert_eq!(skipped.next_value().unwrap(), 23);
        // Predicate never consulted again after the first false.
        assert_eq!(checks.get(), checks_after_first);
    }

    #[test]
    fn test_skip_while_exhausts_on_always_true() {
        let mut skipped = incrementer(0).skip_while_with(|_| true, 10);
        assert!(matches!(
            skipped.next_value(),
            Err(GenError::Exhausted { attempts: 10 })
        ));
    }

    #[test]
    fn test_take_while_stops_permanently() {
        let mut small = incrementer(0).take_while(|n| *n < 3);
        let values: Vec<i64> = small.by_ref().map(|r| r.unwrap()).collect();
        assert_eq!(values, vec![0, 1, 2]);
        // Once stopped, the sequence never restarts.
        assert!(small.next().is_none());
    }

    #[test]
    fn test_tap_observes_without_changing() {
        let seen = Cell::new(0i64);
        let mut tapped = incrementer(5).tap(|n| seen.set(*n));
        assert_eq!(seen.get(), 0);
        assert_eq!(tapped.next_value().unwrap(), 5);
        assert_eq!(seen.get(), 5);
    }

    #[test]
    fn test_narrow_succeeds_on_matching_values() {
        let mut narrowed = from_fn(|| Box::new(7i64) as Box<dyn std::any::Any>).narrow::<i64>();
        assert_eq!(narrowed.next_value().unwrap(), 7);
    }

    #[test]
    fn test_narrow_fails_lazily_on_mismatch() {
        let pulls = Cell::new(0u32);
        let mut narrowed = from_fn(|| {
            pulls.set(pulls.get() + 1);
            if pulls.get() == 1 {
                Box::new(1i64) as Box<dyn std::any::Any>
            } else {
                Box::new("oops".to_string()) as Box<dyn std::any::Any>
            }
        })
        .narrow::<i64>();
        // Wrapping alone never checks anything.
        assert_eq!(pulls.get(), 0);
        assert_eq!(narrowed.next_value().unwrap(), 1);
        assert!(matches!(
            narrowed.next_value(),
            Err(GenError::InvalidCast { .. })
        ));
    }

    #[test]
    fn test_to_map_rejects_duplicate_keys() {
        let mut source = constant(1);
        let result = source.to_map(2, |n| *n, |n| n);
        assert!(matches!(result, Err(GenError::InvalidArgument(_))));
    }

    #[test]
    fn test_to_map_zero_count_is_empty() {
        let mut source = incrementer(0);
        let map = source.to_map(0, |n| *n, |n| n).unwrap();
        assert!(map.is_empty());
    }
}
