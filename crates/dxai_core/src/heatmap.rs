//! Two-dimensional saliency grids.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Row-major saliency grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl Heatmap {
    /// Grid from row-major values.
    pub fn new(width: usize, height: usize, values: Vec<f32>) -> Result<Self> {
        let expected = width * height;
        if values.len() != expected {
            return Err(CoreError::InvalidHeatmap {
                width,
                height,
                expected,
                got: values.len(),
            });
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// All-zero grid.
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
        }
    }

    /// Grid from rows of equal length.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let values: Vec<f32> = rows.iter().flatten().copied().collect();
        if rows.iter().any(|r| r.len() != width) {
            return Err(CoreError::InvalidHeatmap {
                width,
                height,
                expected: width * height,
                got: values.len(),
            });
        }
        Self::new(width, height, values)
    }

    /// Grid width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Value at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.values[y * self.width + x])
        } else {
            None
        }
    }

    /// Largest value (0 for an empty grid).
    pub fn max(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Smallest value (0 for an empty grid).
    pub fn min(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// Min-max scale into [0, 1].
    ///
    /// A flat grid maps to all ones when positive and all zeros otherwise.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let min = self.min();
        let max = self.max();
        let range = max - min;

        let values = if self.values.is_empty() {
            Vec::new()
        } else if range > 1e-8 {
            self.values.iter().map(|v| (v - min) / range).collect()
        } else {
            let fill = if max > 0.0 { 1.0 } else { 0.0 };
            vec![fill; self.values.len()]
        };

        Self {
            width: self.width,
            height: self.height,
            values,
        }
    }
}
