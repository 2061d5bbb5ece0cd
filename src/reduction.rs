//!
//! # Field reduction
//!
//! Reduces one intensity field to the scalars the sweep records: the focus
//! position along an axis ([`IntensityField::focus`]) and the integrated
//! charge in an axial window ([`IntensityField::window_reduce`]).

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{Grid, IntensityField};

#[derive(Debug, thiserror::Error)]
pub enum ReductionError {
    #[error("all-zero intensity field, the focus profile cannot be normalized")]
    EmptyField,
    #[error("axis {axis} is out of bounds for a {ndim}-dimensional field")]
    AxisOutOfBounds { axis: usize, ndim: usize },
    #[error("field shape {shape:?} does not match the {expected}-sample grid on axis {axis}")]
    GridMismatch {
        shape: Vec<usize>,
        expected: usize,
        axis: usize,
    },
}

/// How the volume collapses to a 1-D profile before the focus search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileReduction {
    /// Average a band of 3 adjacent slices at the center of each transverse
    /// axis (axes shorter than 3 samples are averaged whole)
    CenterAverage,
    /// Take the raw maximum over the whole remaining volume
    MaxProject,
}

/// How the samples inside the window combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowReduction {
    Sum,
    Mean,
}

/// The focus estimate: argmax of the normalized axial profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Focus {
    /// Grid index of the profile maximum
    pub index: usize,
    /// Physical coordinate of the profile maximum
    pub position: f64,
}

/// A half-open axial interval `[start, start + width)` snapped to the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReductionWindow {
    pub start: f64,
    pub width: f64,
}
impl ReductionWindow {
    pub fn new(start: f64, width: f64) -> Self {
        Self { start, width }
    }
    pub fn end(&self) -> f64 {
        self.start + self.width
    }
    /// The index range `[nearest(start), nearest(start + width))`
    ///
    /// `None` when the window collapses after snapping, either because it
    /// lies outside the grid or its width is zero or negative.
    pub fn span(&self, grid: &Grid) -> Option<Range<usize>> {
        let start = grid.nearest(self.start);
        let end = grid.nearest(self.end());
        (end > start).then_some(start..end)
    }
}

impl IntensityField {
    /// Locates the focus along `axis`
    ///
    /// All other axes collapse per `profile`, the 1-D profile is normalized
    /// by its own maximum and the argmax is reported as a grid index and
    /// position. Ties break to the lowest index.
    pub fn focus(
        &self,
        grid: &Grid,
        axis: usize,
        profile: ProfileReduction,
    ) -> Result<Focus, ReductionError> {
        let ndim = self.data.ndim();
        if axis >= ndim {
            return Err(ReductionError::AxisOutOfBounds { axis, ndim });
        }
        if self.data.len_of(ndarray::Axis(axis)) != grid.len() {
            return Err(ReductionError::GridMismatch {
                shape: self.data.shape().to_vec(),
                expected: grid.len(),
                axis,
            });
        }
        let profile = self.axial_profile(axis, profile);
        let max = profile.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !(max > 0.0) {
            return Err(ReductionError::EmptyField);
        }
        let (index, _) = profile
            .iter()
            .map(|v| v / max)
            .enumerate()
            .fold((0usize, f64::NEG_INFINITY), |(bi, bv), (i, v)| {
                if v > bv {
                    (i, v)
                } else {
                    (bi, bv)
                }
            });
        Ok(Focus {
            index,
            position: grid.position(index),
        })
    }

    /// Integrates the field over an axial window on the last axis
    ///
    /// Samples are raised to `power` (1 for plain intensity, 2 for two-photon
    /// charge) and accumulated in `f64` per `mode`. A collapsed window is not
    /// an error: it contributes `0` and logs a warning, so every sweep point
    /// still gets a value.
    pub fn window_reduce(
        &self,
        grid: &Grid,
        window: &ReductionWindow,
        power: i32,
        mode: WindowReduction,
    ) -> Result<f64, ReductionError> {
        let axis = self.data.ndim().saturating_sub(1);
        if self.data.len_of(ndarray::Axis(axis)) != grid.len() {
            return Err(ReductionError::GridMismatch {
                shape: self.data.shape().to_vec(),
                expected: grid.len(),
                axis,
            });
        }
        let Some(span) = window.span(grid) else {
            log::warn!(
                "integration window [{}, {}) collapsed on the axial grid [{}, {}], charge set to 0",
                window.start,
                window.end(),
                grid.min(),
                grid.max(),
            );
            return Ok(0.0);
        };
        let slab = self
            .data
            .slice_axis(ndarray::Axis(axis), ndarray::Slice::from(span));
        let sum = slab.iter().map(|&v| f64::from(v).powi(power)).sum::<f64>();
        Ok(match mode {
            WindowReduction::Sum => sum,
            WindowReduction::Mean => sum / slab.len() as f64,
        })
    }

    fn axial_profile(&self, axis: usize, mode: ProfileReduction) -> Vec<f64> {
        let mut view = self.data.view();
        if let ProfileReduction::CenterAverage = mode {
            for ax in (0..self.data.ndim()).filter(|&ax| ax != axis) {
                let n = view.len_of(ndarray::Axis(ax));
                if n >= 3 {
                    let center = n / 2;
                    view.slice_axis_inplace(
                        ndarray::Axis(ax),
                        ndarray::Slice::from(center - 1..center + 2),
                    );
                }
            }
        }
        (0..view.len_of(ndarray::Axis(axis)))
            .map(|i| {
                let lane = view.index_axis(ndarray::Axis(axis), i);
                match mode {
                    ProfileReduction::CenterAverage => {
                        lane.iter().map(|&v| f64::from(v)).sum::<f64>() / lane.len().max(1) as f64
                    }
                    ProfileReduction::MaxProject => lane
                        .iter()
                        .map(|&v| f64::from(v))
                        .fold(f64::NEG_INFINITY, f64::max),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Builder;
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array2, Array3};

    fn axial_grid(count: usize) -> Grid {
        Grid::builder()
            .span(0.0, (count - 1) as f64)
            .count(count)
            .build()
            .unwrap()
    }

    #[test]
    fn focus_finds_known_maximum() {
        let grid = axial_grid(32);
        let mut data = Array2::<f32>::ones((8, 32));
        data[[4, 21]] = 9.0;
        let field = IntensityField::from(data);
        let focus = field.focus(&grid, 1, ProfileReduction::MaxProject).unwrap();
        assert_eq!(focus.index, 21);
        assert_relative_eq!(focus.position, 21.0);
    }

    #[test]
    fn focus_is_scale_invariant() {
        let grid = axial_grid(16);
        let mut data = Array2::<f32>::zeros((5, 16));
        data[[2, 7]] = 1.0;
        let scaled = {
            let mut d = data.clone();
            d.mapv_inplace(|v| v * 123.0);
            d
        };
        let a = IntensityField::from(data)
            .focus(&grid, 1, ProfileReduction::CenterAverage)
            .unwrap();
        let b = IntensityField::from(scaled)
            .focus(&grid, 1, ProfileReduction::CenterAverage)
            .unwrap();
        assert_eq!(a.index, b.index);
    }

    #[test]
    fn focus_center_average_uses_three_slices() {
        let grid = axial_grid(10);
        // peak lives outside the central band: the 3-slice average must not see it
        let mut data = Array2::<f32>::zeros((9, 10));
        data[[0, 8]] = 100.0;
        data[[4, 3]] = 1.0;
        let field = IntensityField::from(data);
        let center = field
            .focus(&grid, 1, ProfileReduction::CenterAverage)
            .unwrap();
        assert_eq!(center.index, 3);
        let max = field.focus(&grid, 1, ProfileReduction::MaxProject).unwrap();
        assert_eq!(max.index, 8);
    }

    #[test]
    fn focus_tie_takes_lowest_index() {
        let grid = axial_grid(6);
        let field = IntensityField::from(Array1::from(vec![0.0f32, 2.0, 0.0, 2.0, 0.0, 0.0]));
        assert_eq!(
            field
                .focus(&grid, 0, ProfileReduction::MaxProject)
                .unwrap()
                .index,
            1
        );
    }

    #[test]
    fn focus_rejects_all_zero_field() {
        let grid = axial_grid(8);
        let field = IntensityField::from(Array2::<f32>::zeros((4, 8)));
        assert!(matches!(
            field.focus(&grid, 1, ProfileReduction::MaxProject),
            Err(ReductionError::EmptyField)
        ));
    }

    #[test]
    fn focus_rejects_mismatched_grid() {
        let grid = axial_grid(9);
        let field = IntensityField::from(Array2::<f32>::ones((4, 8)));
        assert!(matches!(
            field.focus(&grid, 1, ProfileReduction::MaxProject),
            Err(ReductionError::GridMismatch { .. })
        ));
    }

    #[test]
    fn window_sum_of_ones_counts_cells() {
        let grid = axial_grid(16);
        let field = IntensityField::from(Array1::<f32>::ones(16));
        let window = ReductionWindow::new(5.0, 5.0);
        assert_eq!(window.span(&grid), Some(5..10));
        let charge = field
            .window_reduce(&grid, &window, 2, WindowReduction::Sum)
            .unwrap();
        assert_relative_eq!(charge, 5.0);
    }

    #[test]
    fn window_mean_over_transverse_extent() {
        let grid = axial_grid(10);
        let field = IntensityField::from(Array2::<f32>::from_elem((4, 10), 2.0));
        let charge = field
            .window_reduce(&grid, &ReductionWindow::new(2.0, 3.0), 2, WindowReduction::Mean)
            .unwrap();
        assert_relative_eq!(charge, 4.0);
    }

    #[test]
    fn window_beyond_grid_is_degenerate_not_fatal() {
        let grid = axial_grid(16);
        let field = IntensityField::from(Array1::<f32>::ones(16));
        let window = ReductionWindow::new(1000.0, 50.0);
        assert!(window.span(&grid).is_none());
        let charge = field
            .window_reduce(&grid, &window, 2, WindowReduction::Sum)
            .unwrap();
        assert_relative_eq!(charge, 0.0);
    }

    #[test]
    fn window_applies_power() {
        let grid = axial_grid(8);
        let field = IntensityField::from(Array1::from(vec![3.0f32; 8]));
        let window = ReductionWindow::new(0.0, 2.0);
        let plain = field
            .window_reduce(&grid, &window, 1, WindowReduction::Sum)
            .unwrap();
        let tpa = field
            .window_reduce(&grid, &window, 2, WindowReduction::Sum)
            .unwrap();
        assert_relative_eq!(plain, 6.0);
        assert_relative_eq!(tpa, 18.0);
    }

    #[test]
    fn window_on_3d_field_slices_last_axis() {
        let grid = axial_grid(6);
        let field = IntensityField::from(Array3::<f32>::ones((2, 3, 6)));
        let charge = field
            .window_reduce(&grid, &ReductionWindow::new(1.0, 2.0), 2, WindowReduction::Sum)
            .unwrap();
        // 2 x 3 transverse samples over 2 axial cells
        assert_relative_eq!(charge, 12.0);
    }
}
