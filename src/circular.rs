//! Unlimited replay of a one-shot sequence.
//!
//! The first pass caches each element as it is drawn from the live source;
//! once the source is exhausted every further read wraps over the cache, so
//! the source is evaluated at most once per element no matter how many
//! replay cycles or readers there are.

use std::sync::{Arc, Mutex};

use crate::generator::{GenError, Generator};

struct Shared<I: Iterator> {
    cache: Vec<I::Item>,
    live: Option<I>,
}

/// A reader over a shared replay cache.
///
/// Cache growth is guarded by one lock; each reader tracks its own position,
/// so independent readers over the same cache may interleave safely.
pub struct Circular<I: Iterator> {
    shared: Arc<Mutex<Shared<I>>>,
    position: usize,
}

impl<I: Iterator> Circular<I>
where
    I::Item: Clone,
{
    /// Wrap a possibly expensive one-shot source for unlimited replay.
    pub fn new<S>(source: S) -> Self
    where
        S: IntoIterator<IntoIter = I, Item = I::Item>,
    {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                cache: Vec::new(),
                live: Some(source.into_iter()),
            })),
            position: 0,
        }
    }

    /// An independent reader over the same cache, starting at the first
    /// element.
    pub fn reader(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            position: 0,
        }
    }
}

impl<T: Clone> Circular<std::vec::IntoIter<T>> {
    /// Wrap an already-materialized sequence, skipping the live pass so the
    /// values are not cached twice.
    pub fn prefilled(values: Vec<T>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                cache: values,
                live: None,
            })),
            position: 0,
        }
    }
}

impl<I: Iterator> Clone for Circular<I> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            position: self.position,
        }
    }
}

impl<I: Iterator> Generator for Circular<I>
where
    I::Item: Clone,
{
    type Item = I::Item;

    fn next_value(&mut self) -> Result<I::Item, GenError> {
        let mut shared = self.shared.lock().expect("circular cache lock poisoned");
        if self.position < shared.cache.len() {
            let value = shared.cache[self.position].clone();
            self.position += 1;
            return Ok(value);
        }
        if let Some(live) = shared.live.as_mut() {
            if let Some(value) = live.next() {
                shared.cache.push(value.clone());
                self.position = shared.cache.len();
                return Ok(value);
            }
            shared.live = None;
        }
        if shared.cache.is_empty() {
            return Err(GenError::InvalidArgument(
                "circular sequence is empty".to_string(),
            ));
        }
        self.position = 1;
        Ok(shared.cache[0].clone())
    }
}
