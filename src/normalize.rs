//! Probability normalization that tolerates floating-point underflow.
//!
//! Every M-step and E-step ends by turning a non-negative accumulator into a
//! conditional distribution. Doing that with a plain `x / x.sum()` produces
//! NaN as soon as a slice underflows to zero, and the NaN then spreads through
//! every later contraction. The routines here apply one canonical policy:
//!
//! 1. entries below [`EPS`] are hard-zeroed,
//! 2. each slice along the normalization axis is summed,
//! 3. a slice whose sum is below [`EPS`] becomes all-zero and reports a
//!    divisor of `1.0`,
//! 4. the remaining slices are divided by their sum.
//!
//! The divisor array is returned alongside the normalized array. For the
//! E-step it *is* the model marginal `p̃(d, w)`, so the likelihood needs no
//! second pass over the joint tensor.
//!
//! ## Ownership
//!
//! [`normalize`] takes its input by value and rewrites it in place. The
//! un-normalized accumulator is gone afterwards, which is exactly what the hot
//! loop wants: no extra allocation, no stale alias.

use ndarray::{Array, Array2, ArrayView1, ArrayView2, Axis, Dimension, RemoveAxis, Zip};

/// Machine epsilon for `f64`; anything smaller is treated as exact zero.
pub const EPS: f64 = f64::EPSILON;

/// Normalize `array` along `axis`, returning the result and the per-slice divisors.
///
/// The divisor array has the shape of `array` with `axis` removed. All-zero
/// (or underflowed) slices map to all-zero slices with divisor `1.0`.
///
/// ```rust
/// use ndarray::{array, Axis};
/// use plsa::normalize::normalize;
///
/// let (p, norm) = normalize(array![[1.0, 0.0], [3.0, 0.0]], Axis(0));
/// assert_eq!(p, array![[0.25, 0.0], [0.75, 0.0]]);
/// assert_eq!(norm, array![4.0, 1.0]);
/// ```
pub fn normalize<D: RemoveAxis>(
    mut array: Array<f64, D>,
    axis: Axis,
) -> (Array<f64, D>, Array<f64, D::Smaller>) {
    let mut norm = Array::<f64, D::Smaller>::zeros(array.raw_dim().remove_axis(axis));
    Zip::from(array.lanes_mut(axis))
        .and(&mut norm)
        .for_each(|mut lane, n| {
            lane.mapv_inplace(clamp);
            let total = lane.sum();
            if total < EPS {
                lane.fill(0.0);
                *n = 1.0;
            } else {
                lane.mapv_inplace(|p| p / total);
                *n = total;
            }
        });
    (array, norm)
}

/// Normalize the whole array so that all entries sum to one.
///
/// Same clamping policy as [`normalize`]; returns the divisor that was used.
pub fn normalize_total<D: Dimension>(mut array: Array<f64, D>) -> (Array<f64, D>, f64) {
    array.mapv_inplace(clamp);
    let total = array.sum();
    if total < EPS {
        array.fill(0.0);
        return (array, 1.0);
    }
    array.mapv_inplace(|p| p / total);
    (array, total)
}

/// Bayesian inversion of a conditional distribution.
///
/// Given `conditional[[a, b]] = p(a|b)` and `marginal[b] = p(b)`, returns
/// `p(b|a)` laid out as `[[b, a]]`, normalized over `b` for every `a`.
///
/// Pure function: no engine state is touched.
pub fn invert(conditional: ArrayView2<'_, f64>, marginal: ArrayView1<'_, f64>) -> Array2<f64> {
    let joint = &conditional * &marginal;
    normalize(joint.reversed_axes(), Axis(0)).0
}

#[inline]
fn clamp(p: f64) -> f64 {
    if p < EPS {
        0.0
    } else {
        p
    }
}
