/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Row-wise evaluation over temperature grids
//!
//! Every stage of the pipeline computes one temperature row independently of
//! the others, so rows are evaluated either sequentially or with Rayon and
//! then stacked into a `(rows, columns)` array.

use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::errors::UtilsError;

/// Execution backend for row-wise computations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Evaluate rows one after another
    Serial,
    /// Evaluate rows on the Rayon thread pool
    #[default]
    Parallel,
}

/// Evaluate `f(row)` for `row in 0..rows`, preserving row order
///
/// The first error encountered (in row order for the serial backend, in any
/// order for the parallel one) is returned.
pub fn map_rows<T, E, F>(target: Target, rows: usize, f: F) -> Result<Vec<T>, E>
where
    T: Send,
    E: Send,
    F: Fn(usize) -> Result<T, E> + Sync + Send,
{
    match target {
        Target::Serial => (0..rows).map(f).collect(),
        Target::Parallel => (0..rows).into_par_iter().map(f).collect(),
    }
}

/// Stack equally long rows into a two-dimensional array
pub fn stack_rows(rows: Vec<Vec<f64>>, columns: usize) -> Result<Array2<f64>, UtilsError> {
    let n_rows = rows.len();
    if let Some(bad) = rows.iter().position(|row| row.len() != columns) {
        return Err(UtilsError::DimensionMismatch(format!(
            "row {} has {} columns, expected {}",
            bad,
            rows[bad].len(),
            columns
        )));
    }
    let data: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n_rows, columns), data)
        .map_err(|e| UtilsError::DimensionMismatch(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backends_agree() {
        let f = |i: usize| -> Result<Vec<f64>, UtilsError> { Ok(vec![i as f64, (i * i) as f64]) };
        let serial = map_rows(Target::Serial, 50, f).unwrap();
        let parallel = map_rows(Target::Parallel, 50, f).unwrap();
        assert_eq!(serial, parallel);

        let stacked = stack_rows(serial, 2).unwrap();
        assert_eq!(stacked.dim(), (50, 2));
        assert_eq!(stacked[[7, 1]], 49.0);
    }

    #[test]
    fn test_errors_propagate() {
        let result: Result<Vec<f64>, String> = map_rows(Target::Parallel, 10, |i| {
            if i == 3 {
                Err("row 3".to_string())
            } else {
                Ok(i as f64)
            }
        });
        assert_eq!(result.unwrap_err(), "row 3");
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(stack_rows(rows, 2).is_err());
    }
}
