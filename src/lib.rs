//! fount: composable pull-based generators and collision-free builders for
//! synthetic test data.
//!
//! A [`Generator`] exposes one operation — produce the next value — and a
//! set of lazy combinators (map, flat-map, filter, zip, skip, tap, narrow)
//! for deriving new generators from it. Leaf factories cover constants,
//! closures, counters, replayed sequences and bias-free range samplers; the
//! unique builders layer collision-free emails, numeric codes and date-keyed
//! identifiers on top.
//!
//! # Example
//!
//! ```
//! use fount::{Generator, incrementer};
//!
//! let mut evens = incrementer(0).filter(|n| n % 2 == 0);
//! assert_eq!(evens.take(5).unwrap(), vec![0, 2, 4, 6, 8]);
//! ```
//!
//! Predicate-driven combinators carry an explicit attempt budget: a filter
//! whose predicate never holds fails with an exhaustion error instead of
//! hanging, because a pull-based source offers no lookahead.

mod async_api;
mod circular;
mod combine;
mod generator;
mod sample;
mod source;
mod unique;

pub use async_api::{
    FilterFuture, FlatMapFuture, FutureValue, Lift, MapFuture, TapFuture, ZipFuture,
    filter_future, filter_future_with, flat_map_future, lift, map_future, tap_future, zip_future,
};
pub use circular::Circular;
pub use combine::{
    Filter, FlatMap, FlatMapSeq, FlatMapSeqWith, FlatMapWith, Map, MapIndexed, Narrow, SkipLazy,
    SkipWhile, TakeWhile, Tap, Zip,
};
pub use generator::{DEFAULT_FILTER_ATTEMPTS, DEFAULT_SKIP_ATTEMPTS, GenError, Generator};
pub use sample::{
    char_between, decimal_between, double_between, duration_between, float_between, int_between,
    long_between, timestamp_between,
};
pub use source::{
    CharRange, Constant, DecimalRange, Decrementer, DoubleRange, DurationRange, FloatRange,
    FromFn, Incrementer, IntRange, Lazy, LongRange, OneOf, TimestampRange, chars, chars_seeded,
    circular, constant, decimals, decimals_seeded, decrementer, doubles, doubles_seeded,
    durations, durations_seeded, floats, floats_seeded, from_fn, incrementer, ints, ints_seeded,
    lazy, longs, longs_seeded, one_of, one_of_seeded, timestamps, timestamps_seeded,
};
pub use unique::{
    CodeBuilder, DEFAULT_CODE_LENGTH, DEFAULT_DOMAINS, EmailBuilder, IdentifierBuilder,
};
