//! Fixed-point pricing routines used to propagate prices between rounds and to
//! estimate the clearing price of a round.
//!
//! Every value handled here is a `U256` scaled by [`SCALE`] (18 decimal places).

use crate::constants::SCALE;
use crate::errors::PricingError;
use alloy_primitives::U256;

/// Computes the floor of the square root of `x` through Newton's iteration.
///
/// # Arguments
///
/// * `x` - The value to take the square root of.
///
/// # Returns
///
/// The largest `r` such that `r * r <= x`. `integer_sqrt(0)` is zero.
pub fn integer_sqrt(x: U256) -> U256 {
    if x.is_zero() {
        return U256::ZERO;
    }

    let two = U256::from(2);
    // (x + 1) / 2 without overflowing at U256::MAX
    let mut z: U256 = x / two + x % two;
    let mut y: U256 = x;
    while z < y {
        y = z;
        z = (x / z + z) / two;
    }
    y
}

/// Multiplies two fixed-point values.
///
/// # Returns
///
/// `a * b / SCALE`, or `PricingError::Overflow` if the intermediate product does not fit.
pub fn mul_fixed(a: U256, b: U256) -> Result<U256, PricingError> {
    a.checked_mul(b)
        .map(|product| product / SCALE)
        .ok_or(PricingError::Overflow)
}

/// Raises a fixed-point `base` to an integer power by repeated fixed-point multiplication.
///
/// Saturates to `U256::MAX` when an intermediate product overflows, which keeps the result
/// ordered against any representable bound.
///
/// # Arguments
///
/// * `base` - The fixed-point base.
/// * `exp` - The integer exponent.
pub fn power(base: U256, exp: usize) -> U256 {
    let mut result: U256 = SCALE;
    for _ in 0..exp {
        match mul_fixed(result, base) {
            Ok(value) => result = value,
            Err(_) => return U256::MAX,
        }
    }
    result
}

/// Computes the fixed-point `n`-th root of `a` for `a >= SCALE`.
///
/// Binary search over `[SCALE, a]` for the largest `x` with `x^n <= a`, stopping when the
/// bracket collapses.
///
/// # Arguments
///
/// * `a` - The fixed-point radicand, at least `SCALE`.
/// * `n` - The degree of the root, at least one.
pub fn nth_root(a: U256, n: usize) -> U256 {
    if n <= 1 {
        return a;
    }
    if a <= SCALE {
        return SCALE;
    }

    let mut low: U256 = SCALE;
    let mut high: U256 = a;
    while low < high {
        // Upper median so `low = mid` always makes progress
        let mid: U256 = low + (high - low + U256::from(1)) / U256::from(2);
        if power(mid, n) <= a {
            low = mid;
        } else {
            high = mid - U256::from(1);
        }
    }
    low
}

/// Computes the geometric mean of `values` without forming their naive product.
///
/// Each value is first normalised against the minimum, and the `n`-th root of every ratio is
/// taken before multiplying: `min * prod(nth_root(values[i] / min))`. Every partial product is
/// then bounded by the largest ratio, so long trails with a wide spread do not overflow. The
/// roots are multiplied from largest to smallest, which makes the result independent of the
/// input order.
///
/// Returns zero when any value is zero.
///
/// # Errors
///
/// * `PricingError::EmptyInput` when `values` is empty.
/// * `PricingError::Overflow` when a ratio does not fit in a `U256`.
pub fn geometric_mean(values: &[U256]) -> Result<U256, PricingError> {
    let min: U256 = *values.iter().min().ok_or(PricingError::EmptyInput)?;
    if min.is_zero() {
        return Ok(U256::ZERO);
    }
    if values.len() == 1 {
        return Ok(min);
    }

    let mut roots: Vec<U256> = Vec::with_capacity(values.len());
    for value in values {
        let ratio: U256 = value
            .checked_mul(SCALE)
            .ok_or(PricingError::Overflow)?
            / min;
        roots.push(nth_root(ratio, values.len()));
    }
    sort_descending(&mut roots);

    let root: U256 = roots
        .into_iter()
        .try_fold(SCALE, |product: U256, root: U256| mul_fixed(product, root))?;
    mul_fixed(min, root)
}

/// Sorts `values` from highest to lowest in place.
///
/// Insertion sort: stable, so equal values keep their relative input order.
pub fn sort_descending(values: &mut [U256]) {
    for i in 1..values.len() {
        let mut j: usize = i;
        while j > 0 && values[j - 1] < values[j] {
            values.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Estimates the clearing price of a set of position prices.
///
/// The prices are sorted from highest to lowest and every `isqrt(k)`-th price is sampled
/// (indices `0, step, 2 * step, ...`), where `k` is the number of prices. The estimate is the
/// geometric mean of the sample, which spreads over the whole distribution instead of
/// favouring its top.
///
/// # Returns
///
/// Zero when `prices` is empty.
pub fn quantile_target(prices: &[U256]) -> Result<U256, PricingError> {
    let step: usize = integer_sqrt(U256::from(prices.len())).to::<usize>();
    if step == 0 {
        return Ok(U256::ZERO);
    }

    let mut sorted: Vec<U256> = prices.to_vec();
    sort_descending(&mut sorted);
    let sampled: Vec<U256> = sorted.into_iter().step_by(step).collect();

    geometric_mean(&sampled)
}
