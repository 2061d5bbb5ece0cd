use crate::{
    grid::GridError,
    manifest::ManifestError,
    reduction::ReductionError,
    sweep::{SweepBuilderError, SweepError},
};

#[derive(Debug, thiserror::Error)]
pub enum ZscanError {
    #[error("cannot build `zscan::Grid`")]
    Grid(#[from] GridError),
    #[error("cannot reduce the intensity field")]
    Reduction(#[from] ReductionError),
    #[error("cannot build `zscan::Sweep`")]
    Sweep(#[from] SweepError),
    #[error("cannot load or save `zscan::SweepBuilder`")]
    SweepConfig(#[from] SweepBuilderError),
    #[error("cannot dump the field or its manifest")]
    Manifest(#[from] ManifestError),
    #[error("the field propagation failed")]
    Propagation(#[source] Box<dyn std::error::Error + Send + Sync>),
}
impl ZscanError {
    /// Wraps a field provider failure, leaving it unmodified behind the
    /// opaque solver boundary
    pub fn from_provider<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ZscanError::Propagation(Box::new(error))
    }
}
