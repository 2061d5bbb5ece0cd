//!
//! # z-scan sweep & reduction pipeline
//!
//! Drives an external field solver over a parameter sweep and reduces each
//! propagated intensity field to a handful of scalars: the axial focus
//! position, the global intensity maximum and the two-photon absorption
//! charge integrated over an axial window tied to the sweep parameter. The
//! propagation physics stays outside the crate behind the [`Propagation`]
//! trait; pipeline elements are created with the builder associated to each
//! element.
//!
//! ```rust
//! use zscan::{analytic::GaussianBeam, linspace, Builder, Grid, Propagation,
//!     PropagationConfig, Sweep};
//!
//! # fn main() -> zscan::Result<()> {
//! let x0 = Grid::builder().span(-25.0, 25.0).count(64).build()?;
//! let z0 = Grid::builder().span(-100.0, 100.0).count(128).build()?;
//! let sweep = Sweep::builder()
//!     .parameters(linspace(60.0, -100.0, 10))
//!     .progress(false)
//!     .build()?;
//! let mut solver = GaussianBeam::new();
//! let series = sweep.run(&z0, |z_s| {
//!     let config = PropagationConfig::new(vec![x0.clone()], z0.clone())
//!         .source_position(z_s);
//!     solver.propagate(&config)
//! })?;
//! println!("charge at z = {}: {:?}", series.parameters()[0], series.charges()[0]);
//! # Ok(())
//! # }
//! ```

pub mod analytic;
pub mod error;
pub mod field;
pub mod grid;
pub mod manifest;
pub mod propagation;
pub mod reduction;
pub mod series;
pub mod sweep;

#[doc(inline)]
pub use self::error::ZscanError;
#[doc(inline)]
pub use self::field::{IntensityField, Peak};
#[doc(inline)]
pub use self::grid::{linspace, Grid, GridBuilder, GridError};
#[doc(inline)]
pub use self::manifest::{FieldDump, Manifest, ManifestEntry, ManifestError};
#[doc(inline)]
pub use self::propagation::{BeamFocus, Geometry, Propagation, PropagationConfig};
#[doc(inline)]
pub use self::reduction::{
    Focus, ProfileReduction, ReductionError, ReductionWindow, WindowReduction,
};
#[doc(inline)]
pub use self::series::{ScanCollector, ScanRecord, ScanSeries};
#[doc(inline)]
pub use self::sweep::{
    ErrorPolicy, FocusSpec, Sweep, SweepBuilder, SweepBuilderError, SweepError, WindowSpec,
};

pub type Result<T> = std::result::Result<T, ZscanError>;

/// Pipeline builder type trait
pub trait Builder: Default {
    type Component;
    fn new() -> Self {
        Default::default()
    }
    fn build(self) -> Result<Self::Component>;
}
