//! The `Generator` trait: pull-based producers of synthetic values.
//!
//! A generator exposes one operation, [`Generator::next_value`]. Everything
//! else — mapping, filtering, zipping, materializing — is built on top of it
//! and stays lazy: no closure runs before a pull.

use std::any::Any;
use std::collections::HashMap;
use std::hash::Hash;
use thiserror::Error;

use crate::combine::{
    Filter, FlatMap, FlatMapSeq, FlatMapSeqWith, FlatMapWith, Map, MapIndexed, Narrow, SkipLazy,
    SkipWhile, TakeWhile, Tap, Zip,
};

/// Errors that can occur while producing values.
#[derive(Error, Debug)]
pub enum GenError {
    /// A required input was empty, a count was malformed, or a range was
    /// inverted. Raised before any state mutation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A bounded retry loop spent its whole attempt budget.
    #[error("gave up after {attempts} attempts")]
    Exhausted { attempts: u64 },
    /// A counter crossed the bound of `i64`.
    #[error("counter crossed the i64 bound")]
    Overflow,
    /// A dynamically typed value could not be narrowed. Raised at the pull
    /// that produced the incompatible value, never earlier.
    #[error("produced value is not a {expected}")]
    InvalidCast { expected: &'static str },
}

/// Default attempt budget for [`Generator::filter`].
pub const DEFAULT_FILTER_ATTEMPTS: u64 = 10_000;
/// Default attempt budget for [`Generator::skip_while`].
pub const DEFAULT_SKIP_ATTEMPTS: u64 = 100_000;

/// A pull-based, potentially infinite producer of values.
pub trait Generator {
    type Item;

    /// Produce the next value, pulling through the whole combinator chain.
    fn next_value(&mut self) -> Result<Self::Item, GenError>;

    /// Transform every produced value.
    fn map<U, F>(self, transform: F) -> Map<Self, F>
    where
        Self: Sized,
        F: FnMut(Self::Item) -> U,
    {
        Map::new(self, transform)
    }

    /// Transform every produced value together with a zero-based pull
    /// counter private to this combinator.
    fn map_indexed<U, F>(self, transform: F) -> MapIndexed<Self, F>
    where
        Self: Sized,
        F: FnMut(Self::Item, u64) -> U,
    {
        MapIndexed::new(self, transform)
    }

    /// For each produced value, build a nested generator and pull it once.
    fn flat_map<G, F>(self, selector: F) -> FlatMap<Self, F>
    where
        Self: Sized,
        G: Generator,
        F: FnMut(Self::Item) -> G,
    {
        FlatMap::new(self, selector)
    }

    /// Like [`Generator::flat_map`], but combines the source value with the
    /// nested value.
    fn flat_map_with<G, F, C, V>(self, selector: F, compose: C) -> FlatMapWith<Self, F, C>
    where
        Self: Sized,
        Self::Item: Clone,
        G: Generator,
        F: FnMut(Self::Item) -> G,
        C: FnMut(Self::Item, G::Item) -> V,
    {
        FlatMapWith::new(self, selector, compose)
    }

    /// For each produced value, drain the selected sequence one element per
    /// pull before pulling the source again.
    fn flat_map_seq<I, F>(self, selector: F) -> FlatMapSeq<Self, F, I::Item>
    where
        Self: Sized,
        I: IntoIterator,
        F: FnMut(Self::Item) -> I,
    {
        FlatMapSeq::new(self, selector)
    }

    /// Like [`Generator::flat_map_seq`], pairing each inner element with its
    /// originating source value through `compose`.
    fn flat_map_seq_with<I, F, C, V>(
        self,
        selector: F,
        compose: C,
    ) -> FlatMapSeqWith<Self, F, C, I::Item>
    where
        Self: Sized,
        Self::Item: Clone,
        I: IntoIterator,
        F: FnMut(&Self::Item) -> I,
        C: FnMut(Self::Item, I::Item) -> V,
    {
        FlatMapSeqWith::new(self, selector, compose)
    }

    /// Pull until the predicate holds, up to [`DEFAULT_FILTER_ATTEMPTS`]
    /// times per pull.
    fn filter<P>(self, predicate: P) -> Filter<Self, P>
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool,
    {
        Filter::new(self, predicate, DEFAULT_FILTER_ATTEMPTS)
    }

    /// [`Generator::filter`] with an explicit attempt budget.
    fn filter_with<P>(self, predicate: P, attempts: u64) -> Filter<Self, P>
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool,
    {
        Filter::new(self, predicate, attempts)
    }

    /// Pull both generators exactly once per pull, in lock-step.
    fn zip<G, F, V>(self, other: G, compose: F) -> Zip<Self, G, F>
    where
        Self: Sized,
        G: Generator,
        F: FnMut(Self::Item, G::Item) -> V,
    {
        Zip::new(self, other, compose)
    }

    /// Pull exactly `count` times and collect the results in order.
    ///
    /// Zero is valid and yields an empty vector.
    fn take(&mut self, count: usize) -> Result<Vec<Self::Item>, GenError> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.next_value()?);
        }
        Ok(out)
    }

    /// Pull exactly `count` times and collect into a map.
    ///
    /// A duplicate key is an invalid argument: the key selector is expected
    /// to be injective over the pulled values.
    fn to_map<K, V, KF, VF>(
        &mut self,
        count: usize,
        mut key: KF,
        mut value: VF,
    ) -> Result<HashMap<K, V>, GenError>
    where
        K: Eq + Hash,
        KF: FnMut(&Self::Item) -> K,
        VF: FnMut(Self::Item) -> V,
    {
        let mut out = HashMap::with_capacity(count);
        for _ in 0..count {
            let item = self.next_value()?;
            let k = key(&item);
            if out.insert(k, value(item)).is_some() {
                return Err(GenError::InvalidArgument(
                    "key selector produced a duplicate key".to_string(),
                ));
            }
        }
        Ok(out)
    }

    /// Eagerly pull and discard `amount` values, then hand the generator
    /// back unchanged. Zero is a no-op.
    fn release(mut self, amount: usize) -> Result<Self, GenError>
    where
        Self: Sized,
    {
        for _ in 0..amount {
            self.next_value()?;
        }
        Ok(self)
    }

    /// Discard `amount` values, deferred to the first pull.
    fn skip_lazy(self, amount: usize) -> SkipLazy<Self>
    where
        Self: Sized,
    {
        SkipLazy::new(self, amount)
    }

    /// On the first pull, drive the source until the predicate first returns
    /// false and return that value; every later pull reads the source
    /// directly. Budget: [`DEFAULT_SKIP_ATTEMPTS`].
    fn skip_while<P>(self, predicate: P) -> SkipWhile<Self, P>
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool,
    {
        SkipWhile::new(self, predicate, DEFAULT_SKIP_ATTEMPTS)
    }

    /// [`Generator::skip_while`] with an explicit attempt budget.
    fn skip_while_with<P>(self, predicate: P, attempts: u64) -> SkipWhile<Self, P>
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool,
    {
        SkipWhile::new(self, predicate, attempts)
    }

    /// A lazy sequence that ends permanently at the first value failing the
    /// predicate. Runs forever if the predicate always holds.
    fn take_while<P>(self, predicate: P) -> TakeWhile<Self, P>
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool,
    {
        TakeWhile::new(self, predicate)
    }

    /// Observe every produced value without changing it. The action runs
    /// only as a direct consequence of a pull.
    fn tap<F>(self, action: F) -> Tap<Self, F>
    where
        Self: Sized,
        F: FnMut(&Self::Item),
    {
        Tap::new(self, action)
    }

    /// Narrow a dynamically typed generator to `T`, failing lazily at the
    /// pull that produces an incompatible value.
    fn narrow<T>(self) -> Narrow<Self, T>
    where
        Self: Sized + Generator<Item = Box<dyn Any>>,
        T: Any,
    {
        Narrow::new(self)
    }

    /// Borrow the generator; handy for chaining adapters without giving up
    /// ownership.
    fn by_ref(&mut self) -> &mut Self {
        self
    }
}

impl<G: Generator + ?Sized> Generator for &mut G {
    type Item = G::Item;

    fn next_value(&mut self) -> Result<Self::Item, GenError> {
        (**self).next_value()
    }
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    type Item = G::Item;

    fn next_value(&mut self) -> Result<Self::Item, GenError> {
        (**self).next_value()
    }
}
