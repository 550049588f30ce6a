use std::error::Error;
use worldxform::{DVec3, Stage, TimeCode, TransformOp, resolve_world_position};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // /World is shifted 100 units along X
    let mut stage = Stage::new();
    let world = stage.define_xform("/World")?;
    stage.add_op(world, TransformOp::translate(DVec3::new(100.0, 0.0, 0.0)))?;

    // The cube sits at (10, 5, 0) relative to /World
    let cube = stage.define_xform("/World/Cube")?;
    stage.add_op(cube, TransformOp::translate(DVec3::new(10.0, 5.0, 0.0)))?;

    let position = resolve_world_position(&stage, cube, TimeCode::Default, None)?;
    println!("/World/Cube world position: {position}");

    Ok(())
}
