//! Multidimensional Newton-Raphson root finding (§4.6).
//!
//! The original `newton_raphson.cc` that survived distillation is a stale
//! one-dimensional secant solver whose call site nonetheless passes a
//! dimension argument — it never implements the N-dimensional algorithm the
//! rest of the original describes. This is a fresh implementation of that
//! N-dimensional algorithm (finite-difference Jacobian, dense solve), built
//! with `nalgebra` the way `examples/other_examples/manifests/eatikrh-kleis`
//! reaches for it to fill the same role `Eigen` plays in the original.

use nalgebra::{DMatrix, DVector};

/// Finds `x` with `max|F(x)| < tol`, or the best iterate after `max_iters`.
///
/// `f` maps an `n`-vector to an `n`-vector of residuals; `n` is the system's
/// dimension (the count of `Load`/`Check` pairs emitted by residual
/// selection, §4.4.3). The initial guess is all zeros, a deliberately crude
/// starting point (§4.6).
///
/// # Panics
///
/// Panics if `n < 1` — a residual system with no dimension is a broken
/// internal invariant (the spec's `ShapeError`), not a diagnosable input
/// error, so there is no `ErrorKind` variant for it.
pub fn newton_raphson<F>(mut f: F, n: usize, max_iters: u32, tol: f64) -> DVector<f64>
where
    F: FnMut(&DVector<f64>) -> DVector<f64>,
{
    assert!(n >= 1, "residual system dimension must be at least 1");

    let mut x = DVector::zeros(n);
    for iter in 0..max_iters {
        let y0 = f(&x);
        let max_residual = y0.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        if max_residual < tol {
            return x;
        }

        let mut jacobian = DMatrix::zeros(n, n);
        for j in 0..n {
            let mut probe = x.clone();
            probe[j] += 1.0;
            let yj = f(&probe);
            for i in 0..n {
                jacobian[(i, j)] = yj[i] - y0[i];
            }
        }

        let step = match jacobian.clone().try_inverse() {
            Some(inv) => inv * &y0,
            None => {
                log::warn!("newton-raphson: singular jacobian at iteration {}", iter);
                break;
            }
        };
        x -= step;
    }

    log::warn!("newton-raphson: did not converge within {} iterations", max_iters);
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_on_a_linear_system() {
        // F(x) = [x0 + x1 - 3, x0 - x1 - 1] has the unique root x = (2, 1).
        let f = |x: &DVector<f64>| DVector::from_vec(vec![x[0] + x[1] - 3.0, x[0] - x[1] - 1.0]);
        let root = newton_raphson(f, 2, 10, 1e-6);
        assert!((root[0] - 2.0).abs() < 1e-4);
        assert!((root[1] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn converges_on_a_single_quadratic_root() {
        // F(x) = x^2 - 4, starting from zero, should reach a root near ±2.
        let f = |x: &DVector<f64>| DVector::from_vec(vec![x[0] * x[0] - 4.0]);
        let root = newton_raphson(f, 1, 50, 1e-6);
        assert!((root[0].abs() - 2.0).abs() < 1e-3);
    }

    #[test]
    #[should_panic(expected = "dimension")]
    fn panics_on_zero_dimension() {
        let f = |x: &DVector<f64>| x.clone();
        newton_raphson(f, 0, 10, 1e-6);
    }
}
