use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;
use std::ops::Mul;

/// Dense row-major matrix. Batched tensors use one row per sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    pub fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Uniform samples in (0, 1] avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// He initialization: samples from N(0, sqrt(2 / rows)).
    ///
    /// Weights are stored as (fan_in, fan_out), so `rows` is the fan-in.
    /// Recommended before ReLU layers.
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::gaussian(rows, cols, (2.0 / rows.max(1) as f64).sqrt(), rng)
    }

    /// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / rows)).
    ///
    /// Recommended before Identity (logit) layers.
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::gaussian(rows, cols, (1.0 / rows.max(1) as f64).sqrt(), rng)
    }

    fn gaussian<R: Rng + ?Sized>(rows: usize, cols: usize, std_dev: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for x in row.iter_mut() {
                *x = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    /// Builds a matrix from rows. All rows must share one length.
    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        let cols = data.first().map_or(0, Vec::len);
        debug_assert!(data.iter().all(|row| row.len() == cols), "ragged matrix rows");
        Matrix {
            rows: data.len(),
            cols,
            data,
        }
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.shape(), other.shape(), "Matrices are of incorrect sizes");
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(row_a, row_b)| row_a.iter().zip(row_b.iter()).map(|(x, y)| x * y).collect())
            .collect();
        Matrix::from_data(data)
    }

    /// Adds a (1, cols) row vector to every row.
    pub fn add_row(&self, row: &Matrix) -> Matrix {
        assert_eq!(row.rows, 1, "broadcast operand must be a single row");
        assert_eq!(self.cols, row.cols, "Matrices are of incorrect sizes");
        let bias = &row.data[0];
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|r| r.iter().zip(bias.iter()).map(|(x, b)| x + b).collect())
                .collect(),
        }
    }

    /// Sums every column into a (1, cols) row vector.
    pub fn column_sums(&self) -> Matrix {
        let mut sums = vec![0.0; self.cols];
        for row in &self.data {
            for (s, x) in sums.iter_mut().zip(row.iter()) {
                *s += x;
            }
        }
        Matrix {
            rows: 1,
            cols: self.cols,
            data: vec![sums],
        }
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    /// Index of the largest entry in each row. NaN entries never win.
    pub fn argmax_rows(&self) -> Vec<usize> {
        self.data
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, &v)| {
                        if v > bv { (i, v) } else { (bi, bv) }
                    })
                    .0
            })
            .collect()
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().flatten().all(|x| x.is_finite())
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for k in 0..self.cols {
                let a = self.data[i][k];
                if a == 0.0 {
                    continue;
                }
                for j in 0..res.cols {
                    res.data[i][j] += a * rhs.data[k][j];
                }
            }
        }

        res
    }
}
