//! Dense two-dimensional matrix of `f64` values.
//!
//! Cells are addressed as `(row, col)`, with row 0 at the top. Shape never
//! changes after construction; every operation that produces a different shape
//! returns a new matrix.
//!
//! Scalar arithmetic is exposed through the `std::ops` operators and cannot
//! fail. Matrix-matrix arithmetic can fail on incompatible shapes, so it is
//! exposed as methods returning [`Result`]:
//!
//! ```
//! use imgproc_core::Matrix;
//!
//! let a = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]])?;
//! let b = Matrix::identity(2);
//! let c = a.matmul(&b)?.checked_add(&(&a * 2.0))?;
//! assert_eq!(c[(1, 1)], 12.0);
//! assert_eq!(2.0 - &a, -(&a - 2.0));
//! # Ok::<(), imgproc_core::Error>(())
//! ```

use crate::error::{Dims, Error, Result};
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

/// Dense row-major matrix of `f64` values.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Matrix {
    height: usize,
    width: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a zero-filled matrix.
    pub fn new(height: usize, width: usize) -> Self {
        Self::filled(height, width, 0.0)
    }

    /// Create a matrix with every cell set to `value`.
    pub fn filled(height: usize, width: usize, value: f64) -> Self {
        Self {
            height,
            width,
            data: vec![value; height * width],
        }
    }

    /// Create a matrix from a literal list of rows.
    ///
    /// All rows must have the same length. An empty list yields a 0x0 matrix.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);

        let mut data = Vec::with_capacity(height * width);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != width {
                return Err(Error::RaggedRows {
                    row,
                    expected: width,
                    actual: values.len(),
                });
            }
            data.extend(values);
        }

        Ok(Self {
            height,
            width,
            data,
        })
    }

    /// Create a matrix by evaluating `f(row, col)` for every cell.
    pub fn from_fn<F>(height: usize, width: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(height * width);
        for y in 0..height {
            for x in 0..width {
                data.push(f(y, x));
            }
        }
        Self {
            height,
            width,
            data,
        }
    }

    /// Create an `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |y, x| if y == x { 1.0 } else { 0.0 })
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height and width.
    pub fn dims(&self) -> Dims {
        Dims::new(self.height, self.width)
    }

    /// Cell at `(row, col)`, if inside the matrix.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.height && col < self.width {
            Some(self.data[row * self.width + col])
        } else {
            None
        }
    }

    /// Set the cell at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        if row >= self.height || col >= self.width {
            return Err(Error::cell_out_of_bounds(row, col, self.dims()));
        }
        self.data[row * self.width + col] = value;
        Ok(())
    }

    /// Borrow one row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: usize) -> &[f64] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// Iterate over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }

    /// Row-major cell values.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Apply `f` to every cell, producing a matrix of the same shape.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: FnMut(f64) -> f64,
    {
        Self {
            height: self.height,
            width: self.width,
            data: self.data.iter().copied().map(f).collect(),
        }
    }

    fn zip_with<F>(&self, other: &Matrix, op: &'static str, f: F) -> Result<Self>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.dims() != other.dims() {
            return Err(Error::shape_mismatch(op, self.dims(), other.dims()));
        }
        Ok(Self {
            height: self.height,
            width: self.width,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Elementwise sum. Shapes must be identical.
    pub fn checked_add(&self, other: &Matrix) -> Result<Self> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    /// Elementwise difference. Shapes must be identical.
    pub fn checked_sub(&self, other: &Matrix) -> Result<Self> {
        self.zip_with(other, "subtract", |a, b| a - b)
    }

    /// Matrix product.
    ///
    /// Requires `self.width() == other.height()`; the result is
    /// `self.height() x other.width()`.
    pub fn matmul(&self, other: &Matrix) -> Result<Self> {
        if self.width != other.height {
            return Err(Error::shape_mismatch("multiply", self.dims(), other.dims()));
        }

        let mut result = Matrix::new(self.height, other.width);
        for y in 0..self.height {
            for x in 0..other.width {
                let mut sum = 0.0;
                for i in 0..self.width {
                    sum += self.data[y * self.width + i] * other.data[i * other.width + x];
                }
                result.data[y * other.width + x] = sum;
            }
        }
        Ok(result)
    }

    /// `self = self + other`.
    pub fn try_add_assign(&mut self, other: &Matrix) -> Result<()> {
        *self = self.checked_add(other)?;
        Ok(())
    }

    /// `self = self - other`.
    pub fn try_sub_assign(&mut self, other: &Matrix) -> Result<()> {
        *self = self.checked_sub(other)?;
        Ok(())
    }

    /// `self = self * other` (matrix product).
    pub fn try_mul_assign(&mut self, other: &Matrix) -> Result<()> {
        *self = self.matmul(other)?;
        Ok(())
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Self {
        Self::from_fn(self.width, self.height, |y, x| {
            self.data[x * self.width + y]
        })
    }

    /// Alias for [`Matrix::transpose`].
    #[allow(non_snake_case)]
    pub fn T(&self) -> Self {
        self.transpose()
    }

    /// Frobenius inner product: sum of elementwise products.
    pub fn dot(&self, other: &Matrix) -> Result<f64> {
        if self.dims() != other.dims() {
            return Err(Error::shape_mismatch("dot", self.dims(), other.dims()));
        }
        Ok(self.data.iter().zip(&other.data).map(|(a, b)| a * b).sum())
    }

    /// Extract the `h x w` block whose top-left corner is `(y, x)`.
    pub fn submatrix(&self, y: usize, x: usize, h: usize, w: usize) -> Result<Self> {
        let fits = |offset: usize, len: usize, extent: usize| {
            offset.checked_add(len).map_or(false, |end| end <= extent)
        };

        if !fits(y, h, self.height) || !fits(x, w, self.width) {
            return Err(Error::OutOfBounds {
                row: y,
                col: x,
                request: Dims::new(h, w),
                extent: self.dims(),
            });
        }

        Ok(Self::from_fn(h, w, |i, j| {
            self.data[(y + i) * self.width + x + j]
        }))
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.height && col < self.width,
            "matrix index ({row}, {col}) out of bounds for {}",
            self.dims()
        );
        &self.data[row * self.width + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(
            row < self.height && col < self.width,
            "matrix index ({row}, {col}) out of bounds for {}",
            self.dims()
        );
        &mut self.data[row * self.width + col]
    }
}

impl Neg for &Matrix {
    type Output = Matrix;

    fn neg(self) -> Matrix {
        self.map(|v| -v)
    }
}

impl Neg for Matrix {
    type Output = Matrix;

    fn neg(self) -> Matrix {
        -&self
    }
}

impl Add<f64> for &Matrix {
    type Output = Matrix;

    fn add(self, scalar: f64) -> Matrix {
        self.map(|v| v + scalar)
    }
}

impl Add<f64> for Matrix {
    type Output = Matrix;

    fn add(self, scalar: f64) -> Matrix {
        &self + scalar
    }
}

impl Sub<f64> for &Matrix {
    type Output = Matrix;

    fn sub(self, scalar: f64) -> Matrix {
        self + (-scalar)
    }
}

impl Sub<f64> for Matrix {
    type Output = Matrix;

    fn sub(self, scalar: f64) -> Matrix {
        &self - scalar
    }
}

impl Mul<f64> for &Matrix {
    type Output = Matrix;

    fn mul(self, scalar: f64) -> Matrix {
        self.map(|v| v * scalar)
    }
}

impl Mul<f64> for Matrix {
    type Output = Matrix;

    fn mul(self, scalar: f64) -> Matrix {
        &self * scalar
    }
}

impl Add<&Matrix> for f64 {
    type Output = Matrix;

    fn add(self, matrix: &Matrix) -> Matrix {
        matrix + self
    }
}

impl Add<Matrix> for f64 {
    type Output = Matrix;

    fn add(self, matrix: Matrix) -> Matrix {
        &matrix + self
    }
}

// s - M is defined as -(M - s).
impl Sub<&Matrix> for f64 {
    type Output = Matrix;

    fn sub(self, matrix: &Matrix) -> Matrix {
        -(matrix - self)
    }
}

impl Sub<Matrix> for f64 {
    type Output = Matrix;

    fn sub(self, matrix: Matrix) -> Matrix {
        self - &matrix
    }
}

impl Mul<&Matrix> for f64 {
    type Output = Matrix;

    fn mul(self, matrix: &Matrix) -> Matrix {
        matrix * self
    }
}

impl Mul<Matrix> for f64 {
    type Output = Matrix;

    fn mul(self, matrix: Matrix) -> Matrix {
        &matrix * self
    }
}

impl AddAssign<f64> for Matrix {
    fn add_assign(&mut self, scalar: f64) {
        *self = &*self + scalar;
    }
}

impl SubAssign<f64> for Matrix {
    fn sub_assign(&mut self, scalar: f64) {
        *self = &*self - scalar;
    }
}

impl MulAssign<f64> for Matrix {
    fn mul_assign(&mut self, scalar: f64) {
        *self = &*self * scalar;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: &[&[f64]]) -> Matrix {
        Matrix::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn test_new_and_filled() {
        let a = Matrix::new(2, 3);
        assert_eq!(a.height(), 2);
        assert_eq!(a.width(), 3);
        assert!(a.as_slice().iter().all(|&v| v == 0.0));

        let b = Matrix::filled(3, 1, 7.5);
        assert_eq!(b[(2, 0)], 7.5);
    }

    #[test]
    fn test_from_rows_ragged() {
        let err = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(
            err,
            Error::RaggedRows {
                row: 1,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_from_rows_empty() {
        let a = Matrix::from_rows(Vec::new()).unwrap();
        assert_eq!(a.dims(), Dims::new(0, 0));
    }

    #[test]
    fn test_negation() {
        let a = m(&[&[1.0, -2.0], &[0.5, 0.0]]);
        assert_eq!(-&a, m(&[&[-1.0, 2.0], &[-0.5, -0.0]]));
    }

    #[test]
    fn test_add_sub() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let b = m(&[&[10.0, 20.0], &[30.0, 40.0]]);
        assert_eq!(a.checked_add(&b).unwrap(), m(&[&[11.0, 22.0], &[33.0, 44.0]]));
        assert_eq!(b.checked_sub(&a).unwrap(), m(&[&[9.0, 18.0], &[27.0, 36.0]]));
    }

    #[test]
    fn test_add_shape_mismatch() {
        let a = Matrix::new(2, 3);
        let b = Matrix::new(3, 2);
        match a.checked_add(&b) {
            Err(Error::ShapeMismatch { left, right, .. }) => {
                assert_eq!(left, Dims::new(2, 3));
                assert_eq!(right, Dims::new(3, 2));
            }
            other => panic!("expected shape mismatch, got {other:?}"),
        }
        assert!(a.checked_sub(&b).is_err());
    }

    #[test]
    fn test_scalar_ops() {
        let a = m(&[&[1.0, 2.0]]);
        assert_eq!(&a + 1.0, m(&[&[2.0, 3.0]]));
        assert_eq!(&a - 1.0, m(&[&[0.0, 1.0]]));
        assert_eq!(&a * 3.0, m(&[&[3.0, 6.0]]));
        assert_eq!(1.0 + &a, m(&[&[2.0, 3.0]]));
        assert_eq!(3.0 * &a, m(&[&[3.0, 6.0]]));
        assert_eq!(5.0 - &a, m(&[&[4.0, 3.0]]));
        assert_eq!(5.0 - &a, -(&a - 5.0));
    }

    #[test]
    fn test_scalar_compound() {
        let mut a = m(&[&[1.0, 2.0]]);
        a += 1.0;
        a *= 2.0;
        a -= 4.0;
        assert_eq!(a, m(&[&[0.0, 2.0]]));
    }

    #[test]
    fn test_matmul() {
        let a = m(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        let b = m(&[&[7.0, 8.0], &[9.0, 10.0], &[11.0, 12.0]]);
        let c = a.matmul(&b).unwrap();
        assert_eq!(c, m(&[&[58.0, 64.0], &[139.0, 154.0]]));

        assert!(matches!(a.matmul(&a), Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_matmul_identity() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]);
        assert_eq!(a.matmul(&Matrix::identity(2)).unwrap(), a);
    }

    #[test]
    fn test_compound_matrix_ops() {
        let mut a = m(&[&[1.0, 2.0], &[3.0, 4.0]]);
        a.try_add_assign(&Matrix::filled(2, 2, 1.0)).unwrap();
        a.try_sub_assign(&Matrix::filled(2, 2, 2.0)).unwrap();
        assert_eq!(a, m(&[&[0.0, 1.0], &[2.0, 3.0]]));

        a.try_mul_assign(&Matrix::identity(2)).unwrap();
        assert_eq!(a, m(&[&[0.0, 1.0], &[2.0, 3.0]]));
    }

    #[test]
    fn test_compound_failure_leaves_receiver() {
        let mut a = m(&[&[1.0, 2.0]]);
        let before = a.clone();
        assert!(a.try_add_assign(&Matrix::new(2, 2)).is_err());
        assert!(a.try_mul_assign(&Matrix::new(3, 1)).is_err());
        assert_eq!(a, before);
    }

    #[test]
    fn test_transpose() {
        let a = m(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        let t = a.transpose();
        assert_eq!(t, m(&[&[1.0, 4.0], &[2.0, 5.0], &[3.0, 6.0]]));
        assert_eq!(a.T(), t);
        assert_eq!(t.transpose(), a);
    }

    #[test]
    fn test_dot() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let b = m(&[&[5.0, 6.0], &[7.0, 8.0]]);
        assert_eq!(a.dot(&b).unwrap(), 70.0);
        assert!(a.dot(&Matrix::new(1, 4)).is_err());
    }

    #[test]
    fn test_submatrix() {
        let a = Matrix::from_fn(4, 5, |y, x| (y * 10 + x) as f64);
        let s = a.submatrix(1, 2, 2, 3).unwrap();
        assert_eq!(s, m(&[&[12.0, 13.0, 14.0], &[22.0, 23.0, 24.0]]));
        assert_eq!(a.submatrix(0, 0, 4, 5).unwrap(), a);
        assert_eq!(a.submatrix(4, 5, 0, 0).unwrap().dims(), Dims::new(0, 0));
    }

    #[test]
    fn test_submatrix_out_of_bounds() {
        let a = Matrix::new(4, 5);
        assert!(matches!(a.submatrix(1, 0, 4, 5), Err(Error::OutOfBounds { .. })));
        assert!(matches!(a.submatrix(0, 1, 4, 5), Err(Error::OutOfBounds { .. })));
        assert!(matches!(
            a.submatrix(usize::MAX, 0, 2, 1),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_equality_is_exact() {
        let a = m(&[&[0.1 + 0.2]]);
        let b = m(&[&[0.3]]);
        assert_ne!(a, b);
        assert_ne!(Matrix::new(1, 2), Matrix::new(2, 1));
    }

    #[test]
    fn test_get_set() {
        let mut a = Matrix::new(2, 2);
        a.set(1, 0, 3.0).unwrap();
        assert_eq!(a.get(1, 0), Some(3.0));
        assert_eq!(a.get(2, 0), None);
        assert!(matches!(a.set(0, 2, 1.0), Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn test_rows_iter_zero_width() {
        let a = Matrix::new(3, 0);
        assert_eq!(a.rows().count(), 3);
        assert!(a.rows().all(|r| r.is_empty()));
    }
}
