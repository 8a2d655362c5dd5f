//! Angle bracket with a counterbored base and a slotted wall.
//!
//! Run with `RUST_LOG=chisel=debug` to follow the chain.

use chisel::{All, Workplane};

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "chisel=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Base plate
    let base = Workplane::new("XY")?.box_with(60.0, 40.0, 4.0, (true, true, false), true)?;

    // Wall standing on the back edge
    let wall = base
        .faces(">Z")?
        .workplane(0.0, false)?
        .center(0.0, 18.0)?
        .rect(60.0, 4.0)?
        .extrude(36.0)?;

    // Mounting holes in the base
    let base_holes = wall
        .faces("<Z")?
        .workplane(4.0, true)?
        .push_points([(-20.0, -5.0), (20.0, -5.0)])
        .cbore_hole(6.0, 10.0, 2.0, None)?;

    // Slot through the wall
    let slotted = base_holes
        .faces(">Y")?
        .workplane(0.0, false)?
        .center(0.0, 6.0)?
        .rect(30.0, 6.0)?
        .cut_thru_all()?;

    let part = slotted.find_solid().ok_or(chisel::ChiselError::NoSolidFound)?;
    let bb = part.bounding_box();
    tracing::info!(
        volume = part.volume(),
        faces = slotted.faces(All)?.size(),
        "bracket {:.1} x {:.1} x {:.1}",
        bb.xlen(),
        bb.ylen(),
        bb.zlen()
    );
    println!("bracket volume: {:.1} mm^3", part.volume());
    Ok(())
}
