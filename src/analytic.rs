//!
//! # Analytic Gaussian provider
//!
//! A closed-form paraxial Gaussian beam standing in for a full wave solver:
//! waist growth `w(z) = w0 sqrt(1 + (z/zR)^2)` around the focus, on-axis
//! intensity falling off as `(w0/w)^2`, and a slab focal shift of
//! `t (1 - 1/n)` for the traversed thickness `t` of an inserted geometry.
//! Cheap and deterministic, it drives the demos and the end-to-end tests;
//! it is not a propagation solver.

use ndarray::{Array2, Array3};

use crate::{Geometry, IntensityField, Propagation, PropagationConfig, ZscanError};

#[derive(Debug, thiserror::Error)]
pub enum AnalyticError {
    #[error("the analytic provider needs 1 or 2 transverse axes, got {0}")]
    TransverseAxes(usize),
    #[error("the analytic provider needs a positive waist, got {0}")]
    Waist(f64),
}

/// Paraxial Gaussian beam intensity provider
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianBeam;
impl GaussianBeam {
    pub fn new() -> Self {
        Default::default()
    }

    /// Axial distance from the waist plane to the shifted focus
    ///
    /// The slab thickness traversed before the nominal focus shifts the
    /// focus deeper by `t (1 - 1/n)`.
    fn focal_shift(config: &PropagationConfig) -> f64 {
        let focus = config.source_position;
        let Some(geometry) = &config.geometry else {
            return 0.0;
        };
        let n = geometry.refractive_index();
        if !(n > 0.0) {
            return 0.0;
        }
        let traversed = match geometry {
            Geometry::SemiPlane { edge, .. } => (focus - edge).max(0.0),
            Geometry::Layer { front, depth, .. } => (focus - front).clamp(0.0, *depth),
            Geometry::Cube { center, size, .. } => {
                (focus - (center[2] - size[2] / 2.0)).clamp(0.0, size[2])
            }
        };
        traversed * (1.0 - 1.0 / n)
    }
}
impl Propagation for GaussianBeam {
    fn propagate(&mut self, config: &PropagationConfig) -> crate::Result<IntensityField> {
        let w0 = config.waist();
        if !(w0 > 0.0) {
            return Err(ZscanError::from_provider(AnalyticError::Waist(w0)));
        }
        let rayleigh = std::f64::consts::PI * w0 * w0 / config.wavelength;
        let z_focus = config.source_position + Self::focal_shift(config);
        let peak = config.amplitude * config.amplitude;
        let intensity = |r2: f64, z: f64| -> f32 {
            let u = (z - z_focus) / rayleigh;
            let w2 = w0 * w0 * (1.0 + u * u);
            (peak * (w0 * w0 / w2) * (-2.0 * r2 / w2).exp()) as f32
        };
        let z = &config.axial;
        match config.transverse.as_slice() {
            [x] => Ok(Array2::from_shape_fn((x.len(), z.len()), |(i, k)| {
                let xi = x.position(i);
                intensity(xi * xi, z.position(k))
            })
            .into()),
            [x, y] => Ok(
                Array3::from_shape_fn((x.len(), y.len(), z.len()), |(i, j, k)| {
                    let xi = x.position(i);
                    let yj = y.position(j);
                    intensity(xi * xi + yj * yj, z.position(k))
                })
                .into(),
            ),
            axes => Err(ZscanError::from_provider(AnalyticError::TransverseAxes(
                axes.len(),
            ))),
        }
    }
}
