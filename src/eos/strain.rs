/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Eulerian finite strain
//!
//! `f = ((V₀/V)^(2/3) − 1) / 2`. Large strain means small volume.

/// Eulerian strain of `volume` with respect to `reference_volume`
pub fn eulerian_strain(reference_volume: f64, volume: f64) -> f64 {
    0.5 * ((reference_volume / volume).powf(2.0 / 3.0) - 1.0)
}

/// Volume whose Eulerian strain with respect to `reference_volume` is `strain`
///
/// Inverse of [`eulerian_strain`]: `V = V₀ (2f + 1)^(−3/2)`.
pub fn volume_from_strain(reference_volume: f64, strain: f64) -> f64 {
    reference_volume * (2.0 * strain + 1.0).powf(-1.5)
}

/// `dV/df` is `-3V / (2f + 1)`; this returns `df/dV`
pub fn strain_volume_derivative(strain: f64, volume: f64) -> f64 {
    -(2.0 * strain + 1.0) / (3.0 * volume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_strain_round_trip() {
        let v0 = 270.0;
        for v in [200.0, 250.0, 270.0, 320.0] {
            let f = eulerian_strain(v0, v);
            assert_relative_eq!(volume_from_strain(v0, f), v, max_relative = 1e-13);
        }
        assert_eq!(eulerian_strain(v0, v0), 0.0);
        assert!(eulerian_strain(v0, 200.0) > 0.0);
        assert!(eulerian_strain(v0, 300.0) < 0.0);
    }

    #[test]
    fn test_strain_derivative_matches_finite_difference() {
        let (v0, v, h) = (270.0, 240.0, 1e-4);
        let numeric = (eulerian_strain(v0, v + h) - eulerian_strain(v0, v - h)) / (2.0 * h);
        let f = eulerian_strain(v0, v);
        assert_relative_eq!(strain_volume_derivative(f, v), numeric, max_relative = 1e-7);
    }
}
