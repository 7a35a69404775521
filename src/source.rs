//! Leaf generator factories: constants, closures, counters, replay
//! sequences, and bias-free range samplers.
//!
//! Unseeded samplers draw from the thread-local RNG; every sampler also has
//! a `*_seeded` variant backed by `StdRng::seed_from_u64` for reproducible
//! runs.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::{StdRng, ThreadRng};
use rand::{RngCore, SeedableRng};

use crate::circular::Circular;
use crate::generator::{GenError, Generator};
use crate::sample;

/// A generator returning the same value on every pull.
pub struct Constant<T> {
    value: T,
}

/// Every pull clones `value`.
pub fn constant<T: Clone>(value: T) -> Constant<T> {
    Constant { value }
}

impl<T: Clone> Generator for Constant<T> {
    type Item = T;

    fn next_value(&mut self) -> Result<T, GenError> {
        Ok(self.value.clone())
    }
}

/// A generator re-invoking a closure on every pull.
pub struct FromFn<F> {
    produce: F,
}

/// Every pull re-invokes `produce`.
pub fn from_fn<T, F: FnMut() -> T>(produce: F) -> FromFn<F> {
    FromFn { produce }
}

impl<T, F: FnMut() -> T> Generator for FromFn<F> {
    type Item = T;

    fn next_value(&mut self) -> Result<T, GenError> {
        Ok((self.produce)())
    }
}

/// A generator that evaluates its initializer once, on the first pull.
pub struct Lazy<T, F> {
    init: Option<F>,
    value: Option<T>,
}

/// Defers `init` to the first pull; later pulls clone the cached result.
pub fn lazy<T: Clone, F: FnOnce() -> T>(init: F) -> Lazy<T, F> {
    Lazy {
        init: Some(init),
        value: None,
    }
}

impl<T: Clone, F: FnOnce() -> T> Generator for Lazy<T, F> {
    type Item = T;

    fn next_value(&mut self) -> Result<T, GenError> {
        if let Some(init) = self.init.take() {
            self.value = Some(init());
        }
        Ok(self
            .value
            .clone()
            .expect("lazy value is cached after the first pull"))
    }
}

/// Replays a finite sequence indefinitely through a [`Circular`] cache.
///
/// An empty sequence fails with an invalid-argument error at the first
/// pull, not at construction.
pub fn circular<I: IntoIterator>(sequence: I) -> Circular<I::IntoIter>
where
    I::Item: Clone,
{
    Circular::new(sequence)
}

/// A counter whose nth pull returns `start + n`.
///
/// The `next` field is `None` once the counter has passed `i64::MAX`; the
/// pull that would cross the bound fails with an overflow error.
pub struct Incrementer {
    next: Option<i64>,
}

/// Counts upward from `start` in steps of one.
pub fn incrementer(start: i64) -> Incrementer {
    Incrementer { next: Some(start) }
}

impl Generator for Incrementer {
    type Item = i64;

    fn next_value(&mut self) -> Result<i64, GenError> {
        let current = self.next.ok_or(GenError::Overflow)?;
        self.next = current.checked_add(1);
        Ok(current)
    }
}

/// A counter whose nth pull returns `start - n`.
pub struct Decrementer {
    next: Option<i64>,
}

/// Counts downward from `start` in steps of one.
pub fn decrementer(start: i64) -> Decrementer {
    Decrementer { next: Some(start) }
}

impl Generator for Decrementer {
    type Item = i64;

    fn next_value(&mut self) -> Result<i64, GenError> {
        let current = self.next.ok_or(GenError::Overflow)?;
        self.next = current.checked_sub(1);
        Ok(current)
    }
}

/// Uniform random picks from a fixed list.
pub struct OneOf<T, R> {
    values: Vec<T>,
    rng: R,
}

/// Picks a uniform random element per pull. An empty list is rejected
/// eagerly.
pub fn one_of<T: Clone>(values: Vec<T>) -> Result<OneOf<T, ThreadRng>, GenError> {
    if values.is_empty() {
        return Err(GenError::InvalidArgument(
            "element list is empty".to_string(),
        ));
    }
    Ok(OneOf {
        values,
        rng: rand::rng(),
    })
}

/// [`one_of`] with a fixed seed for reproducibility.
pub fn one_of_seeded<T: Clone>(values: Vec<T>, seed: u64) -> Result<OneOf<T, StdRng>, GenError> {
    if values.is_empty() {
        return Err(GenError::InvalidArgument(
            "element list is empty".to_string(),
        ));
    }
    Ok(OneOf {
        values,
        rng: StdRng::seed_from_u64(seed),
    })
}

impl<T: Clone, R: RngCore> Generator for OneOf<T, R> {
    type Item = T;

    fn next_value(&mut self) -> Result<T, GenError> {
        let index = sample::long_between(&mut self.rng, 0, self.values.len() as i64)? as usize;
        Ok(self.values[index].clone())
    }
}

/// Uniform `i64` values in `[min, max)`.
pub struct LongRange<R> {
    min: i64,
    max: i64,
    rng: R,
}

/// Samples `i64` in `[min, max)`; `min == max` always yields `min`.
pub fn longs(min: i64, max: i64) -> Result<LongRange<ThreadRng>, GenError> {
    check_order(min, max)?;
    Ok(LongRange {
        min,
        max,
        rng: rand::rng(),
    })
}

/// [`longs`] with a fixed seed.
pub fn longs_seeded(min: i64, max: i64, seed: u64) -> Result<LongRange<StdRng>, GenError> {
    check_order(min, max)?;
    Ok(LongRange {
        min,
        max,
        rng: StdRng::seed_from_u64(seed),
    })
}

impl<R: RngCore> Generator for LongRange<R> {
    type Item = i64;

    fn next_value(&mut self) -> Result<i64, GenError> {
        sample::long_between(&mut self.rng, self.min, self.max)
    }
}

/// Uniform `i32` values in `[min, max)`.
pub struct IntRange<R> {
    min: i32,
    max: i32,
    rng: R,
}

/// Samples `i32` in `[min, max)`.
pub fn ints(min: i32, max: i32) -> Result<IntRange<ThreadRng>, GenError> {
    check_order(min, max)?;
    Ok(IntRange {
        min,
        max,
        rng: rand::rng(),
    })
}

/// [`ints`] with a fixed seed.
pub fn ints_seeded(min: i32, max: i32, seed: u64) -> Result<IntRange<StdRng>, GenError> {
    check_order(min, max)?;
    Ok(IntRange {
        min,
        max,
        rng: StdRng::seed_from_u64(seed),
    })
}

impl<R: RngCore> Generator for IntRange<R> {
    type Item = i32;

    fn next_value(&mut self) -> Result<i32, GenError> {
        sample::int_between(&mut self.rng, self.min, self.max)
    }
}

/// Uniform `f64` values in `[min, max)`.
pub struct DoubleRange<R> {
    min: f64,
    max: f64,
    rng: R,
}

/// Samples `f64` in `[min, max)`.
pub fn doubles(min: f64, max: f64) -> Result<DoubleRange<ThreadRng>, GenError> {
    check_float_order(min, max)?;
    Ok(DoubleRange {
        min,
        max,
        rng: rand::rng(),
    })
}

/// [`doubles`] with a fixed seed.
pub fn doubles_seeded(min: f64, max: f64, seed: u64) -> Result<DoubleRange<StdRng>, GenError> {
    check_float_order(min, max)?;
    Ok(DoubleRange {
        min,
        max,
        rng: StdRng::seed_from_u64(seed),
    })
}

impl<R: RngCore> Generator for DoubleRange<R> {
    type Item = f64;

    fn next_value(&mut self) -> Result<f64, GenError> {
        sample::double_between(&mut self.rng, self.min, self.max)
    }
}

/// Uniform `f32` values in `[min, max)`.
pub struct FloatRange<R> {
    min: f32,
    max: f32,
    rng: R,
}

/// Samples `f32` in `[min, max)`.
pub fn floats(min: f32, max: f32) -> Result<FloatRange<ThreadRng>, GenError> {
    check_float_order(f64::from(min), f64::from(max))?;
    Ok(FloatRange {
        min,
        max,
        rng: rand::rng(),
    })
}

/// [`floats`] with a fixed seed.
pub fn floats_seeded(min: f32, max: f32, seed: u64) -> Result<FloatRange<StdRng>, GenError> {
    check_float_order(f64::from(min), f64::from(max))?;
    Ok(FloatRange {
        min,
        max,
        rng: StdRng::seed_from_u64(seed),
    })
}

impl<R: RngCore> Generator for FloatRange<R> {
    type Item = f32;

    fn next_value(&mut self) -> Result<f32, GenError> {
        sample::float_between(&mut self.rng, self.min, self.max)
    }
}

/// Uniform fixed-point decimals in `[min, max)` at a given scale.
pub struct DecimalRange<R> {
    min: f64,
    max: f64,
    scale: u32,
    rng: R,
}

/// Samples decimals in `[min, max)` rounded to `scale` fractional digits.
pub fn decimals(min: f64, max: f64, scale: u32) -> Result<DecimalRange<ThreadRng>, GenError> {
    check_float_order(min, max)?;
    Ok(DecimalRange {
        min,
        max,
        scale,
        rng: rand::rng(),
    })
}

/// [`decimals`] with a fixed seed.
pub fn decimals_seeded(
    min: f64,
    max: f64,
    scale: u32,
    seed: u64,
) -> Result<DecimalRange<StdRng>, GenError> {
    check_float_order(min, max)?;
    Ok(DecimalRange {
        min,
        max,
        scale,
        rng: StdRng::seed_from_u64(seed),
    })
}

impl<R: RngCore> Generator for DecimalRange<R> {
    type Item = f64;

    fn next_value(&mut self) -> Result<f64, GenError> {
        sample::decimal_between(&mut self.rng, self.min, self.max, self.scale)
    }
}

/// Uniform `char` values in `[min, max]`.
pub struct CharRange<R> {
    min: char,
    max: char,
    rng: R,
}

/// Samples `char` in the inclusive range `[min, max]`.
pub fn chars(min: char, max: char) -> Result<CharRange<ThreadRng>, GenError> {
    check_order(min, max)?;
    Ok(CharRange {
        min,
        max,
        rng: rand::rng(),
    })
}

/// [`chars`] with a fixed seed.
pub fn chars_seeded(min: char, max: char, seed: u64) -> Result<CharRange<StdRng>, GenError> {
    check_order(min, max)?;
    Ok(CharRange {
        min,
        max,
        rng: StdRng::seed_from_u64(seed),
    })
}

impl<R: RngCore> Generator for CharRange<R> {
    type Item = char;

    fn next_value(&mut self) -> Result<char, GenError> {
        sample::char_between(&mut self.rng, self.min, self.max)
    }
}

/// Uniform durations in `[min, max)` at millisecond resolution.
pub struct DurationRange<R> {
    min: Duration,
    max: Duration,
    rng: R,
}

/// Samples durations in `[min, max)`.
pub fn durations(min: Duration, max: Duration) -> Result<DurationRange<ThreadRng>, GenError> {
    check_order(min, max)?;
    Ok(DurationRange {
        min,
        max,
        rng: rand::rng(),
    })
}

/// [`durations`] with a fixed seed.
pub fn durations_seeded(
    min: Duration,
    max: Duration,
    seed: u64,
) -> Result<DurationRange<StdRng>, GenError> {
    check_order(min, max)?;
    Ok(DurationRange {
        min,
        max,
        rng: StdRng::seed_from_u64(seed),
    })
}

impl<R: RngCore> Generator for DurationRange<R> {
    type Item = Duration;

    fn next_value(&mut self) -> Result<Duration, GenError> {
        sample::duration_between(&mut self.rng, self.min, self.max)
    }
}

/// Uniform UTC timestamps in `[min, max)` at millisecond resolution.
pub struct TimestampRange<R> {
    min: DateTime<Utc>,
    max: DateTime<Utc>,
    rng: R,
}

/// Samples timestamps in `[min, max)`.
pub fn timestamps(
    min: DateTime<Utc>,
    max: DateTime<Utc>,
) -> Result<TimestampRange<ThreadRng>, GenError> {
    check_order(min, max)?;
    Ok(TimestampRange {
        min,
        max,
        rng: rand::rng(),
    })
}

/// [`timestamps`] with a fixed seed.
pub fn timestamps_seeded(
    min: DateTime<Utc>,
    max: DateTime<Utc>,
    seed: u64,
) -> Result<TimestampRange<StdRng>, GenError> {
    check_order(min, max)?;
    Ok(TimestampRange {
        min,
        max,
        rng: StdRng::seed_from_u64(seed),
    })
}

impl<R: RngCore> Generator for TimestampRange<R> {
    type Item = DateTime<Utc>;

    fn next_value(&mut self) -> Result<DateTime<Utc>, GenError> {
        sample::timestamp_between(&mut self.rng, self.min, self.max)
    }
}

fn check_order<T: PartialOrd + std::fmt::Debug>(min: T, max: T) -> Result<(), GenError> {
    if min > max {
        return Err(GenError::InvalidArgument(format!(
            "min {min:?} is greater than max {max:?}"
        )));
    }
    Ok(())
}

fn check_float_order(min: f64, max: f64) -> Result<(), GenError> {
    if !(min <= max) {
        return Err(GenError::InvalidArgument(format!(
            "min {min} is greater than max {max}"
        )));
    }
    Ok(())
}
