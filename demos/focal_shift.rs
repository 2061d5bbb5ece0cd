//! Focal-point shift: sweep the source waist position and compare where the
//! beam focuses with and without a high-index layer in the way.

use zscan::{
    analytic::GaussianBeam, linspace, BeamFocus, Builder, Geometry, Grid, Propagation,
    PropagationConfig, Sweep,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let x0 = Grid::builder().span(-5.0, 5.0).count(512).build()?;
    let z0 = Grid::builder().span(0.0, 300.0).count(2048).build()?;

    let wavelength = 0.8;
    let rayleigh = 3.66;
    let w0 = (wavelength * rayleigh / std::f64::consts::PI).sqrt();

    let sweep = Sweep::builder()
        .parameters(linspace(0.0, 50.0, 50))
        .build()?;

    let mut masked = GaussianBeam::new();
    let mut free = GaussianBeam::new();
    let (xm, zm) = (x0.clone(), z0.clone());
    let (xf, zf) = (x0.clone(), z0.clone());
    let series = sweep.run_shift(
        &z0,
        move |z| {
            let config = PropagationConfig::new(vec![xm.clone()], zm.clone())
                .wavelength(wavelength)
                .beam(BeamFocus::Waist(w0))
                .source_position(150.0 + z)
                .geometry(Geometry::Layer {
                    front: 150.0,
                    depth: 300.0,
                    refractive_index: 2.6,
                });
            masked.propagate(&config)
        },
        move |z| {
            let config = PropagationConfig::new(vec![xf.clone()], zf.clone())
                .wavelength(wavelength)
                .beam(BeamFocus::Waist(w0))
                .source_position(150.0 + z);
            free.propagate(&config)
        },
    )?;

    println!("{:>10} {:>12}", "z", "|shift|");
    for record in series.records() {
        println!(
            "{:>10.2} {:>12.3}",
            record.parameter,
            record.focus.map(f64::abs).unwrap_or(f64::NAN),
        );
    }
    Ok(())
}
