//!
//! # Intensity fields
//!
//! An [`IntensityField`] owns the dense real-valued samples returned by one
//! solver call. Fields at the working resolutions (up to 512³) are the
//! dominant memory cost of a sweep, so they store `f32` samples, are powered
//! in place, and are dropped by the sweep driver before the next propagation
//! starts.

use ndarray::{Array1, Array2, Array3, ArrayD};

use crate::reduction::ReductionError;

/// The global maximum of a field
#[derive(Debug, Clone, PartialEq)]
pub struct Peak {
    /// The maximum sample value
    pub value: f32,
    /// The multi-dimensional index of the maximum, one entry per array axis
    pub index: Vec<usize>,
}

/// A dense intensity array over the sampling grids, produced fresh by the
/// field provider each iteration
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityField {
    pub(crate) data: ArrayD<f32>,
}
impl IntensityField {
    pub fn new(data: ArrayD<f32>) -> Self {
        Self { data }
    }
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }
    /// The total number of samples
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn as_array(&self) -> &ArrayD<f32> {
        &self.data
    }
    pub fn into_array(self) -> ArrayD<f32> {
        self.data
    }
    /// Raises every sample to `power` in place
    ///
    /// Power 2 turns plain intensity into the two-photon absorption rate;
    /// powering in place keeps a single field resident.
    pub fn powi_in_place(&mut self, power: i32) {
        if power != 1 {
            self.data.mapv_inplace(|v| v.powi(power));
        }
    }
    /// The value and multi-dimensional index of the global maximum
    ///
    /// Ties resolve to the first sample in row-major order. An all-zero or
    /// empty field has no meaningful maximum and fails with
    /// [`ReductionError::EmptyField`].
    pub fn peak(&self) -> Result<Peak, ReductionError> {
        let (flat, value) = self
            .data
            .iter()
            .enumerate()
            .fold((0usize, f32::NEG_INFINITY), |(bi, bv), (i, &v)| {
                if v > bv {
                    (i, v)
                } else {
                    (bi, bv)
                }
            });
        if !(value > 0.0) {
            return Err(ReductionError::EmptyField);
        }
        let mut index = vec![0; self.data.ndim()];
        let mut rest = flat;
        for (k, &n) in self.data.shape().iter().enumerate().rev() {
            index[k] = rest % n;
            rest /= n;
        }
        Ok(Peak { value, index })
    }
}
impl From<Array1<f32>> for IntensityField {
    fn from(data: Array1<f32>) -> Self {
        Self::new(data.into_dyn())
    }
}
impl From<Array2<f32>> for IntensityField {
    fn from(data: Array2<f32>) -> Self {
        Self::new(data.into_dyn())
    }
}
impl From<Array3<f32>> for IntensityField {
    fn from(data: Array3<f32>) -> Self {
        Self::new(data.into_dyn())
    }
}
