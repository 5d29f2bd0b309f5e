//! Correlation matrices with Cholesky decomposition.
//!
//! Given `n` independent standard normals `Z = [Z1, ..., Zn]`, correlated
//! normals are produced as
//!
//! ```text
//! W = L * Z
//! ```
//!
//! where `L` is the lower triangular Cholesky factor of the correlation
//! matrix `C = L * L^T`.
//!
//! ```
//! use roi_core::math::correlation::CorrelationMatrix;
//!
//! let corr = CorrelationMatrix::new(&[
//!     1.0, 0.5,
//!     0.5, 1.0,
//! ], 2).unwrap();
//!
//! let cholesky = corr.cholesky().unwrap();
//! let w = cholesky.transform(&[0.5, 0.8]);
//! assert_eq!(w.len(), 2);
//! assert_eq!(w[0], 0.5);
//! ```

use serde::{Deserialize, Serialize};

use crate::types::CorrelationError;

/// Symmetric-tolerance used for diagonal and symmetry validation.
const VALIDATION_EPSILON: f64 = 1e-10;

/// Square, symmetric correlation matrix with unit diagonal.
///
/// Stored row-major. Construction validates every invariant so downstream
/// code can rely on them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix", into = "RawMatrix")]
pub struct CorrelationMatrix {
    /// Matrix elements in row-major order
    data: Vec<f64>,
    /// Matrix dimension (n x n)
    dim: usize,
}

/// Unvalidated wire shape used by serde.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawMatrix {
    dim: usize,
    data: Vec<f64>,
}

impl TryFrom<RawMatrix> for CorrelationMatrix {
    type Error = CorrelationError;

    fn try_from(raw: RawMatrix) -> Result<Self, Self::Error> {
        CorrelationMatrix::new(&raw.data, raw.dim)
    }
}

impl From<CorrelationMatrix> for RawMatrix {
    fn from(matrix: CorrelationMatrix) -> Self {
        RawMatrix {
            dim: matrix.dim,
            data: matrix.data,
        }
    }
}

impl CorrelationMatrix {
    /// Create a new correlation matrix from a flat row-major array.
    ///
    /// # Validation
    ///
    /// - Must have exactly `dim * dim` elements
    /// - Diagonal elements must be 1.0
    /// - Must be symmetric
    /// - Off-diagonal elements must be in [-1, 1]
    pub fn new(data: &[f64], dim: usize) -> Result<Self, CorrelationError> {
        let expected = dim * dim;
        if data.len() != expected {
            return Err(CorrelationError::InvalidDimensions {
                expected,
                got: data.len(),
            });
        }

        for i in 0..dim {
            let diag = data[i * dim + i];
            if !diag.is_finite() || (diag - 1.0).abs() > VALIDATION_EPSILON {
                return Err(CorrelationError::InvalidDiagonal {
                    index: i,
                    value: diag,
                });
            }
        }

        for i in 0..dim {
            for j in (i + 1)..dim {
                let val_ij = data[i * dim + j];
                let val_ji = data[j * dim + i];

                if !val_ij.is_finite() || !(-1.0..=1.0).contains(&val_ij) {
                    return Err(CorrelationError::OutOfRange {
                        i,
                        j,
                        value: val_ij,
                    });
                }
                if (val_ij - val_ji).abs() > VALIDATION_EPSILON {
                    return Err(CorrelationError::NotSymmetric { i, j });
                }
            }
        }

        Ok(Self {
            data: data.to_vec(),
            dim,
        })
    }

    /// Create an identity correlation matrix (no correlation).
    pub fn identity(dim: usize) -> Self {
        let mut data = vec![0.0; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = 1.0;
        }
        Self { data, dim }
    }

    /// Get matrix dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Get element at (i, j).
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim + j]
    }

    /// Row-major view of all elements.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Compute the Cholesky decomposition (lower triangular `L` where `C = L * L^T`).
    ///
    /// # Errors
    ///
    /// [`CorrelationError::NotPositiveDefinite`] if the matrix is singular or
    /// indefinite (e.g. perfectly correlated variables).
    pub fn cholesky(&self) -> Result<CholeskyFactor, CorrelationError> {
        let n = self.dim;
        let mut lower = vec![0.0; n * n];

        for i in 0..n {
            for j in 0..=i {
                let mut sum = 0.0;

                if j == i {
                    for k in 0..j {
                        let l_jk = lower[j * n + k];
                        sum += l_jk * l_jk;
                    }
                    let diag = self.get(j, j) - sum;
                    if diag <= 0.0 {
                        return Err(CorrelationError::NotPositiveDefinite);
                    }
                    lower[j * n + j] = diag.sqrt();
                } else {
                    for k in 0..j {
                        sum += lower[i * n + k] * lower[j * n + k];
                    }
                    let l_jj = lower[j * n + j];
                    if l_jj <= 0.0 {
                        return Err(CorrelationError::NotPositiveDefinite);
                    }
                    lower[i * n + j] = (self.get(i, j) - sum) / l_jj;
                }
            }
        }

        Ok(CholeskyFactor {
            data: lower,
            dim: n,
        })
    }
}

/// Lower triangular Cholesky factor of a correlation matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct CholeskyFactor {
    /// Lower triangular matrix elements (row-major)
    data: Vec<f64>,
    /// Matrix dimension
    dim: usize,
}

impl CholeskyFactor {
    /// Get matrix dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Get element at (i, j). Zero above the diagonal.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if j > i {
            0.0
        } else {
            self.data[i * self.dim + j]
        }
    }

    /// Transform independent standard normals into correlated normals.
    ///
    /// # Panics
    ///
    /// Panics if `z.len() < self.dim()`.
    pub fn transform(&self, z: &[f64]) -> Vec<f64> {
        let mut w = vec![0.0; self.dim];
        self.transform_into(z, &mut w);
        w
    }

    /// Allocation-free variant of [`transform`](Self::transform).
    ///
    /// # Panics
    ///
    /// Panics if either slice is shorter than `self.dim()`.
    pub fn transform_into(&self, z: &[f64], out: &mut [f64]) {
        assert!(
            z.len() >= self.dim && out.len() >= self.dim,
            "Input vector length {} is less than matrix dimension {}",
            z.len().min(out.len()),
            self.dim
        );

        let n = self.dim;
        for i in 0..n {
            let row = &self.data[i * n..i * n + i + 1];
            out[i] = row.iter().zip(z).map(|(l, zj)| l * zj).sum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_correlation_matrix_valid() {
        let m = CorrelationMatrix::new(&[1.0, 0.5, 0.5, 1.0], 2).unwrap();
        assert_eq!(m.dim(), 2);
        assert_eq!(m.get(0, 1), 0.5);
        assert_eq!(m.row(1), &[0.5, 1.0]);
    }

    #[test]
    fn test_invalid_dimensions() {
        let result = CorrelationMatrix::new(&[1.0, 0.5, 0.5], 2);
        assert_eq!(
            result,
            Err(CorrelationError::InvalidDimensions {
                expected: 4,
                got: 3
            })
        );
    }

    #[test]
    fn test_invalid_diagonal() {
        let result = CorrelationMatrix::new(&[0.9, 0.0, 0.0, 1.0], 2);
        assert!(matches!(
            result,
            Err(CorrelationError::InvalidDiagonal { index: 0, .. })
        ));
    }

    #[test]
    fn test_not_symmetric() {
        let result = CorrelationMatrix::new(&[1.0, 0.3, 0.4, 1.0], 2);
        assert_eq!(result, Err(CorrelationError::NotSymmetric { i: 0, j: 1 }));
    }

    #[test]
    fn test_out_of_range() {
        let result = CorrelationMatrix::new(&[1.0, 1.5, 1.5, 1.0], 2);
        assert!(matches!(result, Err(CorrelationError::OutOfRange { .. })));
    }

    #[test]
    fn test_cholesky_reconstructs_matrix() {
        let data = [1.0, 0.6, 0.3, 0.6, 1.0, 0.2, 0.3, 0.2, 1.0];
        let m = CorrelationMatrix::new(&data, 3).unwrap();
        let l = m.cholesky().unwrap();

        for i in 0..3 {
            for j in 0..3 {
                let reconstructed: f64 = (0..3).map(|k| l.get(i, k) * l.get(j, k)).sum();
                assert_relative_eq!(reconstructed, m.get(i, j), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_cholesky_rejects_perfect_correlation() {
        let m = CorrelationMatrix::new(&[1.0, 1.0, 1.0, 1.0], 2).unwrap();
        assert_eq!(m.cholesky(), Err(CorrelationError::NotPositiveDefinite));
    }

    #[test]
    fn test_identity_transform_is_noop() {
        let l = CorrelationMatrix::identity(3).cholesky().unwrap();
        assert_eq!(l.transform(&[0.1, -0.2, 0.3]), vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn test_serde_validates_on_deserialise() {
        #[derive(Deserialize)]
        struct Doc {
            m: CorrelationMatrix,
        }
        let ok: Result<Doc, _> = toml::from_str("m = { dim = 2, data = [1.0, 0.2, 0.2, 1.0] }");
        assert!(ok.is_ok());

        let bad: Result<Doc, _> = toml::from_str("m = { dim = 2, data = [1.0, 0.2, 0.9, 1.0] }");
        assert!(bad.is_err());
    }
}
