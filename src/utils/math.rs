/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Numerical helpers shared by the QHA pipeline
//!
//! Finite-difference gradients on non-uniform grids, arithmetic progressions,
//! bracketing search and four-point Lagrange interpolation.

use ndarray::{Array1, Array2, ArrayView1, Axis};

use super::errors::{Result, UtilsError};

/// Generate `num` values `start, start + step, ...`
pub fn arange(start: f64, num: usize, step: f64) -> Vec<f64> {
    (0..num).map(|n| start + step * n as f64).collect()
}

/// Generate `num` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            let mut values: Vec<f64> = (0..num).map(|i| start + step * i as f64).collect();
            // Pin the endpoint so it is not subject to accumulated rounding
            values[num - 1] = end;
            values
        }
    }
}

/// Whether every consecutive pair strictly increases
pub fn is_strictly_increasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[1] > w[0])
}

/// Whether every consecutive pair strictly decreases
pub fn is_strictly_decreasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[1] < w[0])
}

/// Derivative of `f` with respect to `x`
///
/// Interior points use the second-order accurate central difference for
/// non-uniform spacing; the two end points use first-order one-sided
/// differences.
pub fn gradient(x: ArrayView1<f64>, f: ArrayView1<f64>) -> Result<Array1<f64>> {
    let n = x.len();
    if f.len() != n {
        return Err(UtilsError::DimensionMismatch(format!(
            "gradient: {} abscissae but {} ordinates",
            n,
            f.len()
        )));
    }
    if n < 2 {
        return Err(UtilsError::Math(
            "gradient needs at least two points".to_string(),
        ));
    }

    let mut result = Array1::<f64>::zeros(n);
    result[0] = (f[1] - f[0]) / (x[1] - x[0]);
    result[n - 1] = (f[n - 1] - f[n - 2]) / (x[n - 1] - x[n - 2]);

    for i in 1..n - 1 {
        let hs = x[i] - x[i - 1];
        let hd = x[i + 1] - x[i];
        result[i] = (hs * hs * f[i + 1] + (hd * hd - hs * hs) * f[i] - hd * hd * f[i - 1])
            / (hs * hd * (hd + hs));
    }

    Ok(result)
}

/// Apply [`gradient`] to every lane of `field` along `axis`
pub fn gradient_along(x: ArrayView1<f64>, field: &Array2<f64>, axis: Axis) -> Result<Array2<f64>> {
    let mut result = Array2::<f64>::zeros(field.raw_dim());
    for (lane, mut out) in field
        .lanes(axis)
        .into_iter()
        .zip(result.lanes_mut(axis).into_iter())
    {
        out.assign(&gradient(x, lane)?);
    }
    Ok(result)
}

/// Index `j` such that `value` lies in `[array[j], array[j + 1])`
///
/// `array` must be increasing. Values outside the array are clamped to the
/// first or last interval, so the result is always in `0..=len - 2`.
pub fn find_bracket(array: &[f64], value: f64) -> usize {
    let n = array.len();
    if n < 2 || value <= array[0] {
        return 0;
    }
    if value >= array[n - 1] {
        return n - 2;
    }

    let mut low = 0;
    let mut high = n - 1;
    while high - low > 1 {
        let mid = (high + low) / 2;
        if value >= array[mid] {
            low = mid;
        } else {
            high = mid;
        }
    }
    low
}

/// Weights `w` of the cubic Lagrange polynomial through `xs` evaluated at `x`
///
/// The interpolated value is `Σ w[i] * y[i]`. When `x` coincides with a node,
/// that node's weight is exactly one and all others are exactly zero.
pub fn lagrange4_weights(x: f64, xs: [f64; 4]) -> [f64; 4] {
    let mut weights = [1.0; 4];
    for (i, weight) in weights.iter_mut().enumerate() {
        for (j, &xj) in xs.iter().enumerate() {
            if i != j {
                *weight *= (x - xj) / (xs[i] - xj);
            }
        }
    }
    weights
}

/// Evaluate the cubic Lagrange polynomial through four points at `x`
pub fn lagrange4(x: f64, xs: [f64; 4], ys: [f64; 4]) -> f64 {
    lagrange4_weights(x, xs)
        .iter()
        .zip(ys.iter())
        .map(|(w, y)| w * y)
        .sum()
}

/// Trapezoidal integral of `y` over `x`
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xw, yw)| 0.5 * (xw[1] - xw[0]) * (yw[0] + yw[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_arange_and_linspace() {
        assert_eq!(arange(0.0, 4, 10.0), vec![0.0, 10.0, 20.0, 30.0]);
        let values = linspace(1.0, 2.0, 5);
        assert_eq!(values.len(), 5);
        assert_relative_eq!(values[1], 1.25);
        assert_eq!(values[4], 2.0);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_monotonicity() {
        assert!(is_strictly_increasing(&[1.0, 2.0, 4.0, 5.0, 9.0]));
        assert!(!is_strictly_increasing(&[1.0, 2.0, 2.0]));
        assert!(is_strictly_decreasing(&[2.0, -5.0, -10.0, -20.0]));
        assert!(!is_strictly_decreasing(&[1.0, 2.0]));
    }

    #[test]
    fn test_gradient_is_exact_for_quadratics_on_uneven_grid() {
        let x = array![0.0, 0.5, 1.5, 2.0, 3.5];
        let f = x.mapv(|v| 3.0 * v * v - v + 2.0);
        let df = gradient(x.view(), f.view()).unwrap();
        for i in 1..4 {
            assert_relative_eq!(df[i], 6.0 * x[i] - 1.0, epsilon = 1e-12);
        }
        // One-sided first-order at the edges
        assert_relative_eq!(df[0], (f[1] - f[0]) / 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_gradient_along_axes() {
        let t = array![0.0, 1.0, 2.0];
        let field = array![[0.0, 1.0], [2.0, 3.0], [4.0, 5.0]];
        let d = gradient_along(t.view(), &field, Axis(0)).unwrap();
        assert!(d.iter().all(|&v| (v - 2.0).abs() < 1e-12));

        let v = array![0.0, 0.5];
        let d = gradient_along(v.view(), &field, Axis(1)).unwrap();
        assert!(d.iter().all(|&x| (x - 2.0).abs() < 1e-12));
    }

    #[test]
    fn test_find_bracket() {
        let array = [1.0, 3.0, 4.0, 6.0, 9.0, 11.0];
        assert_eq!(find_bracket(&array, 3.5), 1);
        assert_eq!(find_bracket(&array, 0.0), 0);
        assert_eq!(find_bracket(&array, 12.0), 4);
        assert_eq!(find_bracket(&array, 6.0), 3);
    }

    #[test]
    fn test_lagrange4() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let cubic = |x: f64| x * x * x - 2.0 * x + 1.0;
        let ys = xs.map(cubic);
        assert_relative_eq!(lagrange4(1.7, xs, ys), cubic(1.7), epsilon = 1e-12);

        let weights = lagrange4_weights(2.0, xs);
        assert_eq!(weights, [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_trapezoid() {
        let x = linspace(0.0, 1.0, 101);
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v).collect();
        assert_relative_eq!(trapezoid(&x, &y), 1.0, epsilon = 1e-12);
    }
}
