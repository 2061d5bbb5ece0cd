//!
//! # Sampling grids
//!
//! A [`Grid`] is one evenly spaced coordinate axis of the simulation volume.
//! Grids are built once per run from `(min, max, count)` and shared by every
//! iteration of a sweep; the solver gets them through
//! [`PropagationConfig`](crate::PropagationConfig) and the reducers use them
//! to map array indices back to physical positions.

use ndarray::{Array, Array1};
use serde::{Deserialize, Serialize};

use crate::Builder;

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("a grid needs at least 2 samples, got {0}")]
    TooFewSamples(usize),
    #[error("grid span [{0}, {1}] is reversed or empty")]
    EmptySpan(f64, f64),
    #[error("grid bounds must be finite, got [{0}, {1}]")]
    NonFiniteSpan(f64, f64),
}

/// `Grid` builder
///
/// Default properties:
///  - min   : -100µm
///  - max   :  100µm
///  - count :  512px
///
/// # Examples
///
/// ```
/// use zscan::{Builder, Grid};
/// let z0 = Grid::builder().span(-100.0, 100.0).count(512).build().unwrap();
/// assert_eq!(z0.len(), 512);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridBuilder {
    pub min: f64,
    pub max: f64,
    pub count: usize,
}
impl Default for GridBuilder {
    fn default() -> Self {
        GridBuilder {
            min: -100.0,
            max: 100.0,
            count: 512,
        }
    }
}
impl GridBuilder {
    /// Set the physical extent `[min, max]`
    pub fn span(self, min: f64, max: f64) -> Self {
        Self { min, max, ..self }
    }
    /// Set the number of samples
    pub fn count(self, count: usize) -> Self {
        Self { count, ..self }
    }
}
impl Builder for GridBuilder {
    type Component = Grid;
    /// Build the `Grid`
    fn build(self) -> crate::Result<Grid> {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(GridError::NonFiniteSpan(self.min, self.max).into());
        }
        if self.min >= self.max {
            return Err(GridError::EmptySpan(self.min, self.max).into());
        }
        if self.count < 2 {
            return Err(GridError::TooFewSamples(self.count).into());
        }
        let samples = Array::linspace(self.min, self.max, self.count);
        let step = (self.max - self.min) / (self.count - 1) as f64;
        Ok(Grid { samples, step })
    }
}

/// An ordered, strictly increasing, evenly spaced coordinate axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    samples: Array1<f64>,
    step: f64,
}
impl Grid {
    pub fn builder() -> GridBuilder {
        Default::default()
    }
    /// The number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    /// The first coordinate
    pub fn min(&self) -> f64 {
        self.samples.first().copied().unwrap_or_default()
    }
    /// The last coordinate
    pub fn max(&self) -> f64 {
        self.samples.last().copied().unwrap_or_default()
    }
    /// The sample spacing
    pub fn step(&self) -> f64 {
        self.step
    }
    /// The coordinate samples
    pub fn samples(&self) -> &Array1<f64> {
        &self.samples
    }
    /// The coordinate at `index`
    pub fn position(&self, index: usize) -> f64 {
        self.samples[index]
    }
    /// The index of the sample closest to `target` i.e. `argmin(|grid - target|)`
    ///
    /// Ties resolve to the lowest index; a `target` beyond either end clamps
    /// to the corresponding edge sample.
    pub fn nearest(&self, target: f64) -> usize {
        self.samples
            .iter()
            .map(|&x| (x - target).abs())
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(index, _)| index)
            .unwrap_or_default()
    }
}

/// `count` values evenly spaced from `start` to `stop` inclusive
///
/// Unlike a [`Grid`], the sequence may be decreasing; sweeps are commonly
/// declared from the far side of the volume inward.
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    Array::linspace(start, stop, count).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn grid_endpoints() {
        let grid = Grid::builder().span(-35.0, 35.0).count(256).build().unwrap();
        assert_eq!(grid.len(), 256);
        assert_relative_eq!(grid.min(), -35.0);
        assert_relative_eq!(grid.max(), 35.0);
        assert!(grid
            .samples()
            .iter()
            .zip(grid.samples().iter().skip(1))
            .all(|(a, b)| a < b));
    }

    #[test]
    fn grid_too_few_samples() {
        assert!(Grid::builder().count(1).build().is_err());
    }

    #[test]
    fn grid_reversed_span() {
        assert!(Grid::builder().span(10.0, -10.0).build().is_err());
        assert!(Grid::builder().span(5.0, 5.0).build().is_err());
    }

    #[test]
    fn nearest_snaps_and_clamps() {
        let grid = Grid::builder().span(0.0, 10.0).count(11).build().unwrap();
        assert_eq!(grid.nearest(3.2), 3);
        assert_eq!(grid.nearest(3.9), 4);
        assert_eq!(grid.nearest(-50.0), 0);
        assert_eq!(grid.nearest(50.0), 10);
    }

    #[test]
    fn nearest_tie_takes_lowest_index() {
        let grid = Grid::builder().span(0.0, 10.0).count(11).build().unwrap();
        // 3.5 is equidistant from samples 3 and 4
        assert_eq!(grid.nearest(3.5), 3);
    }

    #[test]
    fn linspace_may_decrease() {
        let z_s = linspace(60.0, -100.0, 100);
        assert_eq!(z_s.len(), 100);
        assert_relative_eq!(z_s[0], 60.0);
        assert_relative_eq!(z_s[99], -100.0);
        assert!(z_s[0] > z_s[99]);
    }
}
