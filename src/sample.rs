//! Bias-free range sampling over a raw source of randomness.
//!
//! Every sampler reduces 64-bit draws into the requested range by rejection
//! sampling, never by a bare modulo, so narrow ranges stay uniform.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::RngCore;

use crate::generator::GenError;

/// Draw a uniform value in `[0, bound)`.
///
/// Draws above the largest multiple of `bound` that fits in 64 bits are
/// rejected and redrawn.
fn uniform_u64<R: RngCore + ?Sized>(rng: &mut R, bound: u64) -> u64 {
    debug_assert!(bound > 0);
    // 2^64 mod bound, computed without leaving u64.
    let rem = (u64::MAX % bound).wrapping_add(1) % bound;
    let limit = u64::MAX - rem;
    loop {
        let raw = rng.next_u64();
        if raw <= limit {
            return raw % bound;
        }
    }
}

/// Uniform `i64` in the half-open range `[min, max)`.
///
/// `min == max` returns `min`; `min > max` is an invalid argument.
pub fn long_between<R: RngCore + ?Sized>(rng: &mut R, min: i64, max: i64) -> Result<i64, GenError> {
    if min > max {
        return Err(GenError::InvalidArgument(format!(
            "min {min} is greater than max {max}"
        )));
    }
    if min == max {
        return Ok(min);
    }
    let span = max.wrapping_sub(min) as u64;
    Ok(min.wrapping_add(uniform_u64(rng, span) as i64))
}

/// Uniform `i32` in `[min, max)`.
pub fn int_between<R: RngCore + ?Sized>(rng: &mut R, min: i32, max: i32) -> Result<i32, GenError> {
    Ok(long_between(rng, i64::from(min), i64::from(max))? as i32)
}

/// Uniform `f64` in `[min, max)`, built from the top 53 bits of one draw.
pub fn double_between<R: RngCore + ?Sized>(
    rng: &mut R,
    min: f64,
    max: f64,
) -> Result<f64, GenError> {
    if !(min <= max) {
        return Err(GenError::InvalidArgument(format!(
            "min {min} is greater than max {max}"
        )));
    }
    if min == max {
        return Ok(min);
    }
    let unit = (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64);
    Ok(min + (max - min) * unit)
}

/// Uniform `f32` in `[min, max)`.
pub fn float_between<R: RngCore + ?Sized>(
    rng: &mut R,
    min: f32,
    max: f32,
) -> Result<f32, GenError> {
    Ok(double_between(rng, f64::from(min), f64::from(max))? as f32)
}

/// Uniform fixed-point decimal in `[min, max)` at the given scale.
///
/// The range is converted into whole units of `10^-scale`, a unit count is
/// sampled, and the result is scaled back, so every representable decimal in
/// the range is equally likely.
pub fn decimal_between<R: RngCore + ?Sized>(
    rng: &mut R,
    min: f64,
    max: f64,
    scale: u32,
) -> Result<f64, GenError> {
    if scale > 12 {
        return Err(GenError::InvalidArgument(format!(
            "scale {scale} is larger than 12"
        )));
    }
    if !(min <= max) {
        return Err(GenError::InvalidArgument(format!(
            "min {min} is greater than max {max}"
        )));
    }
    let factor = 10f64.powi(scale as i32);
    let lo = (min * factor).round() as i64;
    let hi = (max * factor).round() as i64;
    Ok(long_between(rng, lo, hi)? as f64 / factor)
}

/// Uniform `char` in the inclusive range `[min, max]`.
///
/// Code points that are not valid scalar values (the surrogate gap) are
/// rejected and redrawn; the endpoints are always valid, so the loop
/// terminates.
pub fn char_between<R: RngCore + ?Sized>(
    rng: &mut R,
    min: char,
    max: char,
) -> Result<char, GenError> {
    if min > max {
        return Err(GenError::InvalidArgument(format!(
            "min {min:?} is greater than max {max:?}"
        )));
    }
    loop {
        let v = long_between(rng, min as i64, max as i64 + 1)? as u32;
        if let Some(c) = char::from_u32(v) {
            return Ok(c);
        }
    }
}

/// Uniform duration in `[min, max)` at millisecond resolution.
pub fn duration_between<R: RngCore + ?Sized>(
    rng: &mut R,
    min: Duration,
    max: Duration,
) -> Result<Duration, GenError> {
    if min > max {
        return Err(GenError::InvalidArgument(format!(
            "min {min} is greater than max {max}"
        )));
    }
    let ms = long_between(rng, min.num_milliseconds(), max.num_milliseconds())?;
    Ok(Duration::milliseconds(ms))
}

/// Uniform UTC timestamp in `[min, max)` at millisecond resolution.
pub fn timestamp_between<R: RngCore + ?Sized>(
    rng: &mut R,
    min: DateTime<Utc>,
    max: DateTime<Utc>,
) -> Result<DateTime<Utc>, GenError> {
    if min > max {
        return Err(GenError::InvalidArgument(format!(
            "min {min} is greater than max {max}"
        )));
    }
    let ms = long_between(rng, min.timestamp_millis(), max.timestamp_millis())?;
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| GenError::InvalidArgument(format!("timestamp {ms}ms is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_long_between_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let v = long_between(&mut rng, -50, 50).unwrap();
            assert!((-50..50).contains(&v));
        }
    }

    #[test]
    fn test_long_between_degenerate_and_invalid() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(long_between(&mut rng, 7, 7).unwrap(), 7);
        assert!(matches!(
            long_between(&mut rng, 8, 7),
            Err(GenError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_long_between_full_width_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let v = long_between(&mut rng, i64::MIN, i64::MAX).unwrap();
            assert!(v < i64::MAX);
        }
    }

    #[test]
    fn test_small_range_covers_every_value() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.insert(long_between(&mut rng, 0, 3).unwrap());
        }
        assert_eq!(seen, HashSet::from([0, 1, 2]));
    }

    #[test]
    fn test_int_between_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let v = int_between(&mut rng, 10, 20).unwrap();
            assert!((10..20).contains(&v));
        }
    }

    #[test]
    fn test_double_between_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let v = double_between(&mut rng, 0.0, 100.0).unwrap();
            assert!((0.0..100.0).contains(&v));
        }
        assert_eq!(double_between(&mut rng, 2.5, 2.5).unwrap(), 2.5);
        assert!(matches!(
            double_between(&mut rng, 1.0, 0.0),
            Err(GenError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_decimal_between_respects_scale() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let v = decimal_between(&mut rng, 0.0, 100.0, 2).unwrap();
            assert!((0.0..=100.0).contains(&v));
            let cents = v * 100.0;
            assert!((cents - cents.round()).abs() < 1e-6);
        }
        assert!(matches!(
            decimal_between(&mut rng, 0.0, 1.0, 13),
            Err(GenError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_char_between_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let c = char_between(&mut rng, 'a', 'z').unwrap();
            assert!(('a'..='z').contains(&c));
        }
        // Range spanning the surrogate gap still yields valid chars.
        for _ in 0..100 {
            let c = char_between(&mut rng, '\u{D000}', '\u{E800}').unwrap();
            assert!(char::from_u32(c as u32).is_some());
        }
    }

    #[test]
    fn test_duration_between_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let lo = Duration::seconds(1);
        let hi = Duration::seconds(60);
        for _ in 0..200 {
            let d = duration_between(&mut rng, lo, hi).unwrap();
            assert!(d >= lo && d < hi);
        }
        assert!(matches!(
            duration_between(&mut rng, hi, lo),
            Err(GenError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_timestamp_between_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let lo = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let hi = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        for _ in 0..200 {
            let ts = timestamp_between(&mut rng, lo, hi).unwrap();
            assert!(ts >= lo && ts < hi);
        }
        assert_eq!(timestamp_between(&mut rng, lo, lo).unwrap(), lo);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        let xs: Vec<i64> = (0..20).map(|_| long_between(&mut a, 0, 1000).unwrap()).collect();
        let ys: Vec<i64> = (0..20).map(|_| long_between(&mut b, 0, 1000).unwrap()).collect();
        assert_eq!(xs, ys);
    }
}
