//!
//! # Sweep driver
//!
//! [`Sweep`] iterates a parameter sequence, invokes the field provider once
//! per value and reduces each field to a [`ScanRecord`](crate::ScanRecord)
//! before the next propagation starts. The provider call is assumed
//! expensive and stateful: iterations are strictly sequential and at most
//! one intensity field is resident at a time.

use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Builder, FieldDump, Grid, IntensityField, ProfileReduction, ReductionWindow, ScanCollector,
    ScanRecord, ScanSeries, WindowReduction,
};

#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("the sweep parameter sequence is empty")]
    NoParameters,
    #[error("intensity power must be at least 1, got {0}")]
    InvalidPower(i32),
}

#[derive(Debug, thiserror::Error)]
pub enum SweepBuilderError {
    #[error("cannot open `zscan::SweepBuilder` toml file: {1}")]
    Open(#[source] std::io::Error, PathBuf),
    #[error("cannot create `zscan::SweepBuilder` toml file: {1}")]
    Create(#[source] std::io::Error, PathBuf),
    #[error("cannot read `zscan::SweepBuilder` toml file: {1}")]
    Read(#[source] std::io::Error, PathBuf),
    #[error("cannot write `zscan::SweepBuilder` toml file: {1}")]
    Write(#[source] std::io::Error, PathBuf),
    #[error("cannot deserialize `zscan::SweepBuilder` from toml")]
    Load(#[from] toml::de::Error),
    #[error("cannot serialize `zscan::SweepBuilder` into toml")]
    Save(#[from] toml::ser::Error),
}

/// What happens when one iteration fails (provider error or degenerate
/// reduction)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorPolicy {
    /// Record the point as missing and keep sweeping; one failed solver call
    /// must not lose the rest of the sweep
    #[default]
    Skip,
    /// Propagate the error and end the sweep
    Abort,
}

/// The axial integration window of one sweep point: it starts at the sweep
/// parameter and extends `width` deeper
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub width: f64,
    pub mode: WindowReduction,
}
impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            width: 50.0,
            mode: WindowReduction::Sum,
        }
    }
}

/// The focus measurement of one sweep point, taken along the axial (last)
/// axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSpec {
    pub profile: ProfileReduction,
}
impl Default for FocusSpec {
    fn default() -> Self {
        Self {
            profile: ProfileReduction::CenterAverage,
        }
    }
}

/// `Sweep` builder
///
/// Default properties:
///  - power     : 2 (two-photon absorption)
///  - window    : 50µm, summed
///  - focus     : center-averaged profile
///  - peak      : recorded
///  - on error  : skip the point
///  - dump      : none
///
/// The parameter sequence has no default; declare it with
/// [`parameters`](SweepBuilder::parameters).
///
/// # Examples
///
/// ```
/// use zscan::{linspace, Builder, Sweep};
/// let sweep = Sweep::builder()
///     .parameters(linspace(60.0, -100.0, 100))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepBuilder {
    pub parameters: Vec<f64>,
    pub power: i32,
    pub window: Option<WindowSpec>,
    pub focus: Option<FocusSpec>,
    pub peak: bool,
    pub on_error: ErrorPolicy,
    pub dump: Option<PathBuf>,
    pub progress: bool,
}
impl Default for SweepBuilder {
    fn default() -> Self {
        Self {
            parameters: vec![],
            power: 2,
            window: Some(Default::default()),
            focus: Some(Default::default()),
            peak: true,
            on_error: Default::default(),
            dump: None,
            progress: true,
        }
    }
}
impl SweepBuilder {
    /// Load the sweep builder from a toml file
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, SweepBuilderError> {
        let mut file =
            File::open(&path).map_err(|e| SweepBuilderError::Open(e, path.as_ref().to_path_buf()))?;
        let mut toml = String::new();
        file.read_to_string(&mut toml)
            .map_err(|e| SweepBuilderError::Read(e, path.as_ref().to_path_buf()))?;
        let builder: SweepBuilder = toml::from_str(&toml)?;
        Ok(builder)
    }
    /// Save the sweep builder to a toml file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), SweepBuilderError> {
        let toml = toml::to_string_pretty(self)?;
        let mut file = File::create(&path)
            .map_err(|e| SweepBuilderError::Create(e, path.as_ref().to_path_buf()))?;
        write!(file, "# zscan::SweepBuilder\n\n{}", toml)
            .map_err(|e| SweepBuilderError::Write(e, path.as_ref().to_path_buf()))?;
        Ok(())
    }
    /// Set the parameter sequence, iterated in this exact order
    pub fn parameters(self, parameters: Vec<f64>) -> Self {
        Self { parameters, ..self }
    }
    /// Set the element-wise intensity power (1: plain, 2: two-photon)
    pub fn power(self, power: i32) -> Self {
        Self { power, ..self }
    }
    /// Set the charge integration window
    pub fn window(self, window: WindowSpec) -> Self {
        Self {
            window: Some(window),
            ..self
        }
    }
    /// Skip the charge measurement
    pub fn no_window(self) -> Self {
        Self {
            window: None,
            ..self
        }
    }
    /// Set the focus measurement
    pub fn focus(self, focus: FocusSpec) -> Self {
        Self {
            focus: Some(focus),
            ..self
        }
    }
    /// Skip the focus measurement
    pub fn no_focus(self) -> Self {
        Self { focus: None, ..self }
    }
    /// Record the global intensity maximum of each iteration
    pub fn peak(self, peak: bool) -> Self {
        Self { peak, ..self }
    }
    /// Set the failed-iteration policy
    pub fn on_error(self, on_error: ErrorPolicy) -> Self {
        Self { on_error, ..self }
    }
    /// Dump each iteration's field to `dir` and keep a manifest there
    pub fn dump<P: AsRef<Path>>(self, dir: P) -> Self {
        Self {
            dump: Some(dir.as_ref().to_path_buf()),
            ..self
        }
    }
    /// Show a progress bar while sweeping
    pub fn progress(self, progress: bool) -> Self {
        Self { progress, ..self }
    }
}
impl Builder for SweepBuilder {
    type Component = Sweep;
    /// Build the `Sweep`
    fn build(self) -> crate::Result<Sweep> {
        if self.parameters.is_empty() {
            return Err(SweepError::NoParameters.into());
        }
        if self.power < 1 {
            return Err(SweepError::InvalidPower(self.power).into());
        }
        log::info!(
            "sweeping {} points in [{:.3}, {:.3}]",
            self.parameters.len(),
            self.parameters
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min),
            self.parameters
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max),
        );
        Ok(Sweep {
            parameters: self.parameters,
            power: self.power,
            window: self.window,
            focus: self.focus,
            peak: self.peak,
            on_error: self.on_error,
            dump: self.dump,
            progress: self.progress,
        })
    }
}

/// The sweep driver
pub struct Sweep {
    parameters: Vec<f64>,
    power: i32,
    window: Option<WindowSpec>,
    focus: Option<FocusSpec>,
    peak: bool,
    on_error: ErrorPolicy,
    dump: Option<PathBuf>,
    progress: bool,
}
impl Sweep {
    pub fn builder() -> SweepBuilder {
        Default::default()
    }
    /// The parameter sequence, in iteration order
    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }
    /// Runs the sweep: one `step` call per parameter, in declaration order
    ///
    /// `step` maps a sweep parameter to a freshly propagated field; the field
    /// is reduced against the `axial` grid and dropped before the next call.
    /// Returns the finalized series, sorted by parameter.
    pub fn run<F>(&self, axial: &Grid, mut step: F) -> crate::Result<ScanSeries>
    where
        F: FnMut(f64) -> crate::Result<IntensityField>,
    {
        let mut dump = self.dump.as_deref().map(FieldDump::new).transpose()?;
        let mut collector = ScanCollector::new();
        let pb = self.progress_bar();
        for &parameter in &self.parameters {
            let measured = self.measure(axial, parameter, &mut step, dump.as_mut());
            self.record(&mut collector, parameter, measured)?;
            pb.inc(1);
        }
        pb.finish_and_clear();
        Ok(collector.finalize())
    }

    /// Runs a differential sweep: each point propagates `step` and
    /// `reference` one after the other and records the signed axial focus
    /// shift between them
    ///
    /// The two fields are never resident together; the first is reduced and
    /// dropped before the reference propagates. Window and peak measurements
    /// do not apply here, only the focus specification does.
    pub fn run_shift<F, G>(
        &self,
        axial: &Grid,
        mut step: F,
        mut reference: G,
    ) -> crate::Result<ScanSeries>
    where
        F: FnMut(f64) -> crate::Result<IntensityField>,
        G: FnMut(f64) -> crate::Result<IntensityField>,
    {
        let spec = self.focus.unwrap_or_default();
        let mut collector = ScanCollector::new();
        let pb = self.progress_bar();
        for &parameter in &self.parameters {
            let measured = step(parameter)
                .and_then(|field| self.axial_focus(axial, &spec, field))
                .and_then(|focus| {
                    let free = self.axial_focus(axial, &spec, reference(parameter)?)?;
                    Ok(ScanRecord {
                        parameter,
                        focus: Some(focus - free),
                        peak: None,
                        charge: None,
                    })
                });
            self.record(&mut collector, parameter, measured)?;
            pb.inc(1);
        }
        pb.finish_and_clear();
        Ok(collector.finalize())
    }

    fn measure<F>(
        &self,
        axial: &Grid,
        parameter: f64,
        step: &mut F,
        dump: Option<&mut FieldDump>,
    ) -> crate::Result<ScanRecord>
    where
        F: FnMut(f64) -> crate::Result<IntensityField>,
    {
        let mut field = step(parameter)?;
        field.powi_in_place(self.power);
        if let Some(dump) = dump {
            dump.dump(parameter, &field)?;
        }
        let focus = match &self.focus {
            Some(spec) => Some(
                field
                    .focus(axial, field.ndim().saturating_sub(1), spec.profile)?
                    .position,
            ),
            None => None,
        };
        let peak = self
            .peak
            .then(|| field.peak().map(|peak| f64::from(peak.value)))
            .transpose()?;
        let charge = match &self.window {
            Some(spec) => Some(field.window_reduce(
                axial,
                &ReductionWindow::new(parameter, spec.width),
                1,
                spec.mode,
            )?),
            None => None,
        };
        drop(field);
        Ok(ScanRecord {
            parameter,
            focus,
            peak,
            charge,
        })
    }

    fn axial_focus(
        &self,
        axial: &Grid,
        spec: &FocusSpec,
        field: IntensityField,
    ) -> crate::Result<f64> {
        let focus = field.focus(axial, field.ndim().saturating_sub(1), spec.profile)?;
        Ok(focus.position)
    }

    fn record(
        &self,
        collector: &mut ScanCollector,
        parameter: f64,
        measured: crate::Result<ScanRecord>,
    ) -> crate::Result<()> {
        match measured {
            Ok(record) => collector.collect(record),
            Err(e) => match self.on_error {
                ErrorPolicy::Skip => {
                    log::warn!("sweep point {} failed: {}, recorded as missing", parameter, e);
                    collector.collect(ScanRecord::missing(parameter));
                }
                ErrorPolicy::Abort => return Err(e),
            },
        }
        Ok(())
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(self.parameters.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:50.cyan/blue} {pos:>4}/{len:4}")
                .unwrap(),
        );
        pb
    }
}
