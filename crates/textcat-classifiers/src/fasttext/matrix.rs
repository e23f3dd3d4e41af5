//! Dense row-major f32 matrix

use rand::Rng;
use textcat_core::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Matrix with entries drawn uniformly from `[-bound, bound]`
    pub fn uniform(rows: usize, cols: usize, bound: f32, rng: &mut impl Rng) -> Self {
        let data = (0..rows * cols)
            .map(|_| rng.gen_range(-bound..=bound))
            .collect();
        Self { rows, cols, data }
    }

    pub fn from_raw(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        let expected = rows
            .checked_mul(cols)
            .ok_or_else(|| Error::model(format!("matrix {rows}x{cols} is too large")))?;
        if data.len() != expected {
            return Err(Error::model(format!(
                "matrix {rows}x{cols} needs {expected} values, got {}",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn dot_row(&self, i: usize, v: &[f32]) -> f32 {
        self.row(i).iter().zip(v).map(|(a, b)| a * b).sum()
    }

    /// `row(i) += scale * v`
    pub fn add_to_row(&mut self, i: usize, v: &[f32], scale: f32) {
        let cols = self.cols;
        let row = &mut self.data[i * cols..(i + 1) * cols];
        for (r, x) in row.iter_mut().zip(v) {
            *r += scale * x;
        }
    }

    /// `out += scale * row(i)`
    pub fn add_row_into(&self, i: usize, out: &mut [f32], scale: f32) {
        for (o, r) in out.iter_mut().zip(self.row(i)) {
            *o += scale * r;
        }
    }
}
