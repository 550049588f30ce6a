use std::error::Error;
use worldxform::{
    BatchResolver, DVec3, ResolverConfig, Stage, TimeCode, TransformCache, TransformOp,
};

const ROWS: usize = 10;
const COLUMNS: usize = 10;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut stage = Stage::new();
    let world = stage.define_xform("/World")?;
    stage.add_op(world, TransformOp::translate(DVec3::new(100.0, 0.0, 0.0)))?;

    // A grid of cubes under one row group each
    let mut cubes = Vec::with_capacity(ROWS * COLUMNS);
    for row in 0..ROWS {
        let group = stage.define_xform(&format!("/World/Row{row}"))?;
        stage.set_ops(
            group,
            vec![
                TransformOp::rotate_z(row as f64 * 9.0),
                TransformOp::translate(DVec3::new(0.0, row as f64 * 3.0, 0.0)),
            ],
        )?;
        for column in 0..COLUMNS {
            let cube = stage.define_xform(&format!("/World/Row{row}/Cube{column}"))?;
            stage.add_op(
                cube,
                TransformOp::translate(DVec3::new(column as f64 * 3.0, 0.0, 0.0)),
            )?;
            cubes.push(cube);
        }
    }

    // A scope in the middle of the batch fails on its own
    let looks = stage.define_prim("/World/Looks")?;
    cubes.insert(cubes.len() / 2, looks);

    let config = ResolverConfig::new().sort_batch_by_depth(true);
    let batch = BatchResolver::with_config(&stage, config);
    let mut cache = TransformCache::new();
    let results = batch.resolve_with_cache(&cubes, TimeCode::Default, &mut cache);

    let mut resolved = 0;
    for (prim, result) in cubes.iter().zip(&results) {
        match result {
            Ok(world) => {
                resolved += 1;
                if resolved <= 5 {
                    println!(
                        "{:<24} {:.3}",
                        stage.path(*prim).unwrap_or_default(),
                        world.translation()
                    );
                }
            }
            Err(e) => println!("{:<24} error: {e}", stage.path(*prim).unwrap_or_default()),
        }
    }

    let stats = cache.stats();
    println!(
        "{resolved}/{} resolved, {} cached transforms, {} hits, {} misses",
        cubes.len(),
        cache.len(),
        stats.hits,
        stats.misses
    );

    Ok(())
}
