use std::path::PathBuf;

use clap::Parser;

mod logging;
mod motor;
mod scene;
mod simulation;

use scene::Scene;

/// Steps a scripted 2D scene through the raycast motion engine
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scene file to load
    #[arg(default_value = "sim/scenes/demo.json")]
    scene: PathBuf,

    /// Override the number of frames the scene asks for
    #[arg(short, long)]
    frames: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let scene = Scene::load(&args.scene)?;
    let frames = args.frames.unwrap_or(scene.frames);
    let mut sim = scene.build()?;

    log::info!(
        "loaded {}: {} bodies, {} platforms",
        args.scene.display(),
        sim.bodies().len(),
        sim.platforms().len()
    );

    sim.run(frames)?;

    for body in sim.bodies() {
        let state = body.state();
        match sim.bounds_of(body) {
            Some(bounds) => log::info!(
                "body {} at ({:.3}, {:.3}) below={} above={} left={} right={}",
                body.id(),
                bounds.center().x,
                bounds.min.y,
                state.below,
                state.above,
                state.left,
                state.right
            ),
            None => log::warn!("body {} left the world", body.id()),
        }
    }
    log::info!("ran {} frames", sim.frame());
    Ok(())
}
