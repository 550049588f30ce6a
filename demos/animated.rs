use std::error::Error;
use worldxform::{
    Animated, Axis, DVec3, OpKind, Stage, TimeCode, TimeSamples, TransformCache, TransformOp,
    TransformResolver,
};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut stage = Stage::new();

    // The platform slides from x = 0 to x = 20 over frames 0..=24
    let platform = stage.define_xform("/Platform")?;
    let slide =
        TimeSamples::from_samples([(0.0, DVec3::ZERO), (24.0, DVec3::new(20.0, 0.0, 0.0))])?;
    stage.add_op(
        platform,
        TransformOp::new(OpKind::Translate(Animated::sampled(slide))),
    )?;

    // The turret spins a full turn, with a default value for non-animated queries
    let turret = stage.define_xform("/Platform/Turret")?;
    let spin = Animated::constant(45.0)
        .with_sample(0.0, 0.0)?
        .with_sample(24.0, 360.0)?;
    stage.set_ops(
        turret,
        vec![
            TransformOp::new(OpKind::Rotate(Axis::Z, spin)),
            TransformOp::translate(DVec3::new(0.0, 2.0, 0.0)),
        ],
    )?;

    // The barrel tip sits 3 units along the turret's local X
    let tip = stage.define_xform("/Platform/Turret/Tip")?;
    stage.add_op(tip, TransformOp::translate(DVec3::new(3.0, 0.0, 0.0)))?;

    let resolver = TransformResolver::new(&stage);
    let mut cache = TransformCache::new();

    let rest = resolver.world_position(tip, TimeCode::Default, None)?;
    println!("default: {rest:.3}");
    for frame in (0..=30).step_by(6) {
        let time = TimeCode::at(frame as f64);
        let position = resolver.world_position(tip, time, Some(&mut cache))?;
        println!("frame {frame:>2}: {position:.3}");
    }

    // Drop one frame's transforms after editing, keep the rest
    cache.clear_time(TimeCode::at(12.0));
    println!("cached after clearing frame 12: {}", cache.len());

    Ok(())
}
