//! Future-lifted combinators over generators of deferred values.
//!
//! These mirror the sync combinators for generators whose produced value is
//! a pending future. Pulling any lifted combinator returns a new, not yet
//! resolved future immediately; the wrapped transform, predicate, or side
//! effect runs only when the caller resolves that future.

use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use crate::generator::{DEFAULT_FILTER_ATTEMPTS, GenError, Generator};

/// A deferred value: resolving it yields the value or the error that
/// producing it ran into.
pub type FutureValue<T> = BoxFuture<'static, Result<T, GenError>>;

/// Lifts a sync generator; each pull yields an already-resolved future.
pub struct Lift<G> {
    source: G,
}

/// Lift `source` into the deferred-value world.
pub fn lift<G>(source: G) -> Lift<G> {
    Lift { source }
}

impl<G> Generator for Lift<G>
where
    G: Generator,
    G::Item: Send + 'static,
{
    type Item = FutureValue<G::Item>;

    fn next_value(&mut self) -> Result<FutureValue<G::Item>, GenError> {
        let value = self.source.next_value()?;
        Ok(future::ready(Ok(value)).boxed())
    }
}

/// Future-lifted map. See [`map_future`].
pub struct MapFuture<G, F> {
    source: G,
    transform: F,
}

/// Maps each deferred value through `transform`; the transform runs at
/// resolution time.
pub fn map_future<G, F>(source: G, transform: F) -> MapFuture<G, F> {
    MapFuture { source, transform }
}

impl<G, T, U, F> Generator for MapFuture<G, F>
where
    G: Generator<Item = FutureValue<T>>,
    T: Send + 'static,
    U: 'static,
    F: Fn(T) -> U + Clone + Send + Sync + 'static,
{
    type Item = FutureValue<U>;

    fn next_value(&mut self) -> Result<FutureValue<U>, GenError> {
        let deferred = self.source.next_value()?;
        let transform = self.transform.clone();
        Ok(async move { Ok(transform(deferred.await?)) }.boxed())
    }
}

/// Future-lifted flat-map. See [`flat_map_future`].
pub struct FlatMapFuture<G, F> {
    source: G,
    selector: F,
}

/// Chains each deferred value into the deferred value selected from it; the
/// selector runs at resolution time.
pub fn flat_map_future<G, F>(source: G, selector: F) -> FlatMapFuture<G, F> {
    FlatMapFuture { source, selector }
}

impl<G, T, U, F> Generator for FlatMapFuture<G, F>
where
    G: Generator<Item = FutureValue<T>>,
    T: Send + 'static,
    U: 'static,
    F: Fn(T) -> FutureValue<U> + Clone + Send + Sync + 'static,
{
    type Item = FutureValue<U>;

    fn next_value(&mut self) -> Result<FutureValue<U>, GenError> {
        let deferred = self.source.next_value()?;
        let selector = self.selector.clone();
        Ok(async move { selector(deferred.await?).await }.boxed())
    }
}

/// Future-lifted filter. See [`filter_future`].
pub struct FilterFuture<G, P> {
    source: Arc<Mutex<G>>,
    predicate: P,
    attempts: u64,
}

/// Filters deferred values with the default attempt budget.
///
/// The bounded retry loop — including its source pulls and the exhaustion
/// error — runs entirely at resolution time; pulling only hands back a
/// pending future.
pub fn filter_future<G, P>(source: G, predicate: P) -> FilterFuture<G, P> {
    filter_future_with(source, predicate, DEFAULT_FILTER_ATTEMPTS)
}

/// [`filter_future`] with an explicit attempt budget.
pub fn filter_future_with<G, P>(source: G, predicate: P, attempts: u64) -> FilterFuture<G, P> {
    FilterFuture {
        source: Arc::new(Mutex::new(source)),
        predicate,
        attempts,
    }
}

impl<G, T, P> Generator for FilterFuture<G, P>
where
    G: Generator<Item = FutureValue<T>> + Send + 'static,
    T: Send + 'static,
    P: Fn(&T) -> bool + Clone + Send + 'static,
{
    type Item = FutureValue<T>;

    fn next_value(&mut self) -> Result<FutureValue<T>, GenError> {
        let source = Arc::clone(&self.source);
        let predicate = self.predicate.clone();
        let attempts = self.attempts;
        Ok(async move {
            for _ in 0..attempts {
                let deferred = source
                    .lock()
                    .expect("async filter source lock poisoned")
                    .next_value();
                let candidate = deferred?.await?;
                if predicate(&candidate) {
                    return Ok(candidate);
                }
            }
            Err(GenError::Exhausted { attempts })
        }
        .boxed())
    }
}

/// Future-lifted tap. See [`tap_future`].
pub struct TapFuture<G, F> {
    source: G,
    action: F,
}

/// Observes each resolved value without changing it; the action runs at
/// resolution time.
pub fn tap_future<G, F>(source: G, action: F) -> TapFuture<G, F> {
    TapFuture { source, action }
}

impl<G, T, F> Generator for TapFuture<G, F>
where
    G: Generator<Item = FutureValue<T>>,
    T: Send + 'static,
    F: Fn(&T) + Clone + Send + 'static,
{
    type Item = FutureValue<T>;

    fn next_value(&mut self) -> Result<FutureValue<T>, GenError> {
        let deferred = self.source.next_value()?;
        let action = self.action.clone();
        Ok(async move {
            let value = deferred.await?;
            action(&value);
            Ok(value)
        }
        .boxed())
    }
}

/// Future-lifted zip. See [`zip_future`].
pub struct ZipFuture<G1, G2, F> {
    first: G1,
    second: G2,
    compose: F,
}

/// Pulls one deferred value from each side per pull; resolution awaits both
/// and composes the results.
pub fn zip_future<G1, G2, F>(first: G1, second: G2, compose: F) -> ZipFuture<G1, G2, F> {
    ZipFuture {
        first,
        second,
        compose,
    }
}

impl<G1, G2, A, B, V, F> Generator for ZipFuture<G1, G2, F>
where
    G1: Generator<Item = FutureValue<A>>,
    G2: Generator<Item = FutureValue<B>>,
    A: Send + 'static,
    B: Send + 'static,
    V: 'static,
    F: Fn(A, B) -> V + Clone + Send + 'static,
{
    type Item = FutureValue<V>;

    fn next_value(&mut self) -> Result<FutureValue<V>, GenError> {
        let first = self.first.next_value()?;
        let second = self.second.next_value()?;
        let compose = self.compose.clone();
        Ok(async move {
            let (a, b) = future::join(first, second).await;
            Ok(compose(a?, b?))
        }
        .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::incrementer;
    use futures::executor::block_on;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_lift_resolves_to_source_values() {
        let mut lifted = lift(incrementer(0));
        let first = lifted.next_value().unwrap();
        let second = lifted.next_value().unwrap();
        assert_eq!(block_on(first).unwrap(), 0);
        assert_eq!(block_on(second).unwrap(), 1);
    }

    #[test]
    fn test_map_future_defers_transform_until_resolution() {
        let calls = Arc::new(AtomicU32::new(0));
        let observed = Arc::clone(&calls);
        let mut mapped = map_future(lift(incrementer(1)), move |n: i64| {
            observed.fetch_add(1, Ordering::SeqCst);
            n * 10
        });
        let pending = mapped.next_value().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(block_on(pending).unwrap(), 10);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_flat_map_future_chains_deferred_values() {
        let mut chained = flat_map_future(lift(incrementer(2)), |n: i64| {
            future::ready(Ok(n * 100)).boxed()
        });
        let pending = chained.next_value().unwrap();
        assert_eq!(block_on(pending).unwrap(), 200);
    }

    #[test]
    fn test_filter_future_retries_at_resolution_time() {
        let mut evens = filter_future(lift(incrementer(1)), |n: &i64| n % 2 == 0);
        let pending = evens.next_value().unwrap();
        assert_eq!(block_on(pending).unwrap(), 2);
        let pending = evens.next_value().unwrap();
        assert_eq!(block_on(pending).unwrap(), 4);
    }

    #[test]
    fn test_filter_future_exhaustion_surfaces_on_resolution() {
        let mut never = filter_future_with(lift(incrementer(0)), |_: &i64| false, 8);
        // Pulling succeeds; only resolving reports the exhausted budget.
        let pending = never.next_value().unwrap();
        assert!(matches!(
            block_on(pending),
            Err(GenError::Exhausted { attempts: 8 })
        ));
    }

    #[test]
    fn test_tap_future_runs_action_on_resolution_only() {
        let seen = Arc::new(AtomicU32::new(0));
        let observed = Arc::clone(&seen);
        let mut tapped = tap_future(lift(incrementer(7)), move |n: &i64| {
            observed.store(*n as u32, Ordering::SeqCst);
        });
        let pending = tapped.next_value().unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert_eq!(block_on(pending).unwrap(), 7);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_zip_future_awaits_both_sides() {
        let mut zipped = zip_future(lift(incrementer(0)), lift(incrementer(100)), |a, b| {
            (a, b)
        });
        let pending = zipped.next_value().unwrap();
        assert_eq!(block_on(pending).unwrap(), (0, 100));
        let pending = zipped.next_value().unwrap();
        assert_eq!(block_on(pending).unwrap(), (1, 101));
    }
}
