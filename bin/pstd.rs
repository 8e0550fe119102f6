//! PSTD scene runner
//!
//! Loads a TOML scene, runs the kernel and logs the pressure energy

use clap::Parser;
use pstdsim::engine::operations::backend_name;
use pstdsim::{create_solver, Scene, SceneConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Command-line arguments for the PSTD runner
#[derive(Parser, Debug)]
#[command(name = "pstd")]
#[command(
    about = "Pseudo-spectral time-domain acoustic simulation of a 2D scene",
    long_about = None
)]
struct Args {
    /// Scene description (TOML)
    #[arg(long)]
    config: PathBuf,

    /// Number of timesteps (default: render_time / dt)
    #[arg(long)]
    steps: Option<usize>,

    /// Evaluate domains on all cores
    #[arg(long, default_value_t = false)]
    multi_thread: bool,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: Level,
}

fn run(args: &Args) -> pstdsim::Result<()> {
    let config = SceneConfig::from_file(&args.config)?;
    let mut scene = Scene::new(&config)?;

    let steps = args.steps.unwrap_or_else(|| scene.settings().time_steps());
    let every = scene.settings().save_nth_frame;
    let solver = create_solver(args.multi_thread);
    info!(
        "{} domains, {} steps, backend {}",
        scene.domains().len(),
        steps,
        backend_name()
    );

    let start = Instant::now();
    solver.run(&mut scene, steps, &mut |frame, scene| {
        if (frame + 1) % every == 0 {
            info!(
                "frame {:>6}: energy {:.6e}, max |p| {:.4e}",
                frame + 1,
                scene.total_pressure_energy(),
                scene.max_pressure()
            );
        }
    });
    info!("Done in {:.2?}", start.elapsed());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to install the log subscriber");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
