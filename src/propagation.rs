//!
//! # Field provider boundary
//!
//! The propagation physics lives outside this crate: a solver (WPM or
//! otherwise) implements [`Propagation`] and turns one [`PropagationConfig`]
//! into one [`IntensityField`](crate::IntensityField). The call is assumed
//! expensive and possibly stateful, which is why the sweep driver is strictly
//! sequential and never holds more than one returned field.

use serde::{Deserialize, Serialize};

use crate::{Grid, IntensityField};

/// A field provider mutated by each propagation call
pub trait Propagation {
    /// Propagates the configured source through the configured medium and
    /// returns the intensity sampled on the configured grids
    ///
    /// Failures propagate unmodified through
    /// [`ZscanError::Propagation`](crate::ZscanError::Propagation).
    fn propagate(&mut self, config: &PropagationConfig) -> crate::Result<IntensityField>;
}

/// The beam focusing strength, as either a waist or a numerical aperture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BeamFocus {
    /// Waist radius `w0`, same units as the grids
    Waist(f64),
    /// Numerical aperture; the waist derives as `w0 = wavelength / (pi * NA)`
    NumericalAperture(f64),
}
impl BeamFocus {
    /// The beam waist radius at `wavelength`
    pub fn waist(&self, wavelength: f64) -> f64 {
        match self {
            BeamFocus::Waist(w0) => *w0,
            BeamFocus::NumericalAperture(na) => wavelength / (std::f64::consts::PI * na),
        }
    }
}

/// A refractive structure inserted in the propagation volume
///
/// Opaque to the pipeline: providers interpret it, the core only moves it
/// along the sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Half-space `z >= edge`
    SemiPlane { edge: f64, refractive_index: f64 },
    /// Axis-aligned cube
    Cube {
        center: [f64; 3],
        size: [f64; 3],
        refractive_index: f64,
    },
    /// Slab `front <= z < front + depth` spanning the transverse extent
    Layer {
        front: f64,
        depth: f64,
        refractive_index: f64,
    },
}
impl Geometry {
    pub fn refractive_index(&self) -> f64 {
        match self {
            Geometry::SemiPlane {
                refractive_index, ..
            }
            | Geometry::Cube {
                refractive_index, ..
            }
            | Geometry::Layer {
                refractive_index, ..
            } => *refractive_index,
        }
    }
}

/// The configuration record handed to the field provider: wavelength, grids,
/// beam, source position and inserted geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Wavelength, same units as the grids
    pub wavelength: f64,
    /// Transverse sampling axes, one (x) or two (x, y)
    pub transverse: Vec<Grid>,
    /// Axial sampling axis (z), always the last array axis of the field
    pub axial: Grid,
    pub beam: BeamFocus,
    /// Peak source amplitude
    pub amplitude: f64,
    /// Axial position of the beam waist plane
    pub source_position: f64,
    pub geometry: Option<Geometry>,
}
impl PropagationConfig {
    /// A configuration over the given grids with the constants of the
    /// production scans: 400nm wavelength, NA 0.328, unit amplitude, waist
    /// plane at the far end of the axial grid
    pub fn new(transverse: Vec<Grid>, axial: Grid) -> Self {
        let source_position = axial.max();
        Self {
            wavelength: 0.4,
            transverse,
            axial,
            beam: BeamFocus::NumericalAperture(0.328),
            amplitude: 1.0,
            source_position,
            geometry: None,
        }
    }
    pub fn wavelength(self, wavelength: f64) -> Self {
        Self { wavelength, ..self }
    }
    pub fn beam(self, beam: BeamFocus) -> Self {
        Self { beam, ..self }
    }
    pub fn amplitude(self, amplitude: f64) -> Self {
        Self { amplitude, ..self }
    }
    pub fn source_position(self, source_position: f64) -> Self {
        Self {
            source_position,
            ..self
        }
    }
    pub fn geometry(self, geometry: Geometry) -> Self {
        Self {
            geometry: Some(geometry),
            ..self
        }
    }
    pub fn clear_geometry(self) -> Self {
        Self {
            geometry: None,
            ..self
        }
    }
    /// The beam waist radius
    pub fn waist(&self) -> f64 {
        self.beam.waist(self.wavelength)
    }
    /// The expected field shape, transverse axes first, axial last
    pub fn field_shape(&self) -> Vec<usize> {
        self.transverse
            .iter()
            .map(Grid::len)
            .chain(std::iter::once(self.axial.len()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Builder;
    use approx::assert_relative_eq;

    #[test]
    fn numerical_aperture_sets_waist() {
        let beam = BeamFocus::NumericalAperture(0.1);
        assert_relative_eq!(beam.waist(0.4), 0.4 / (std::f64::consts::PI * 0.1));
        assert_relative_eq!(BeamFocus::Waist(1.5).waist(0.4), 1.5);
    }

    #[test]
    fn field_shape_is_transverse_then_axial() {
        let x = Grid::builder().span(-25.0, 25.0).count(64).build().unwrap();
        let z = Grid::builder().span(-100.0, 100.0).count(128).build().unwrap();
        let config = PropagationConfig::new(vec![x.clone(), x], z);
        assert_eq!(config.field_shape(), vec![64, 64, 128]);
        assert_relative_eq!(config.source_position, 100.0);
    }
}
