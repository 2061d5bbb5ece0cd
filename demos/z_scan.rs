//! Axial z-scan: a cube of high-index material steps through the focal
//! region while the integration window follows it, one two-photon charge per
//! position.

use zscan::{
    analytic::GaussianBeam, linspace, BeamFocus, Builder, Geometry, Grid, Propagation,
    PropagationConfig, Sweep, WindowReduction, WindowSpec,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let n = 96;
    let x0 = Grid::builder().span(-25.0, 25.0).count(n).build()?;
    let y0 = Grid::builder().span(-25.0, 25.0).count(n).build()?;
    let z0 = Grid::builder().span(-100.0, 100.0).count(2 * n).build()?;
    let size = 1000.0;

    let sweep = Sweep::builder()
        .parameters(linspace(60.0, -100.0, 50))
        .power(2)
        .window(WindowSpec {
            width: 50.0,
            mode: WindowReduction::Sum,
        })
        .build()?;

    let mut solver = GaussianBeam::new();
    let series = sweep.run(&z0, |z_s| {
        let config = PropagationConfig::new(vec![x0.clone(), y0.clone()], z0.clone())
            .wavelength(0.4)
            .beam(BeamFocus::NumericalAperture(0.328))
            .source_position(100.0)
            .geometry(Geometry::Cube {
                center: [0.0, 0.0, z_s + size / 2.0],
                size: [size, size, size],
                refractive_index: 2.759,
            });
        solver.propagate(&config)
    })?;

    println!("{:>10} {:>12} {:>12} {:>12}", "z_s", "focus", "peak", "charge");
    for record in series.records() {
        println!(
            "{:>10.2} {:>12.2} {:>12.4e} {:>12.4e}",
            record.parameter,
            record.focus.unwrap_or(f64::NAN),
            record.peak.unwrap_or(f64::NAN),
            record.charge.unwrap_or(f64::NAN),
        );
    }
    Ok(())
}
