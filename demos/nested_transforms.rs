use std::error::Error;
use worldxform::{
    DVec3, RotationOrder, Stage, TimeCode, TransformCache, TransformOp, TransformResolver,
};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut stage = Stage::new();

    let robot = stage.define_xform("/Robot")?;
    stage.set_ops(
        robot,
        vec![
            TransformOp::scale(DVec3::splat(2.0)),
            TransformOp::rotate_y(90.0),
            TransformOp::translate(DVec3::new(0.0, 0.0, -10.0)),
        ],
    )?;

    let arm = stage.define_xform("/Robot/Arm")?;
    stage.set_ops(
        arm,
        vec![
            TransformOp::rotate_euler(RotationOrder::XYZ, DVec3::new(0.0, 0.0, 30.0)),
            TransformOp::translate(DVec3::new(1.0, 2.0, 0.0)),
        ],
    )?;

    // Grouping scopes add no transform of their own
    let gripper = stage.define_xform("/Robot/Arm/Tools/Gripper")?;
    stage.add_op(gripper, TransformOp::translate(DVec3::new(0.5, 0.0, 0.0)))?;

    // A HUD element that ignores everything above it
    let hud = stage.define_xform("/Robot/Arm/Hud")?;
    stage.add_op(hud, TransformOp::translate(DVec3::new(0.0, 1.0, 0.0)))?;
    stage.set_reset_xform_stack(hud, true)?;

    let resolver = TransformResolver::new(&stage);
    let mut cache = TransformCache::new();

    for prim in [robot, arm, gripper, hud] {
        let parts = resolver.world_components(prim, TimeCode::Default, Some(&mut cache))?;
        println!("{}", stage.path(prim).unwrap_or_default());
        println!("  translation: {:.3}", parts.translation);
        println!("  rotation:    {:.3} (XYZ degrees)", parts.euler_degrees());
        println!("  scale:       {:.3}", parts.scale);
        println!("  depth:       {}", resolver.depth(prim)?);
    }

    let stats = cache.stats();
    println!(
        "cache: {} entries, {} hits, {} misses",
        cache.len(),
        stats.hits,
        stats.misses
    );

    Ok(())
}
