//! Timestep drivers
//!
//! Every Runge-Kutta stage is split into a read phase, where the derivatives
//! of all domains are computed from the current fields, and a write phase that
//! commits them. Only the read phase differs between solvers.

use super::fields::LValues;
use super::scene::Scene;
use rayon::prelude::*;
use tracing::{debug, info};

/// Advances a scene in time
pub trait Solver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Derivatives of every domain, indexed like `scene.domains()`
    fn compute_l_values(&self, scene: &Scene) -> Vec<LValues>;

    /// One full timestep: snapshot, all Runge-Kutta stages, PML attenuation
    fn step(&self, scene: &mut Scene) {
        scene.push_values();
        let coefficients = scene.settings().rk_coefficients.clone();
        for coefficient in coefficients {
            let l_values = self.compute_l_values(scene);
            scene.update_fields(l_values, coefficient);
        }
        scene.apply_pml();
    }

    /// Run `steps` timesteps, calling `on_frame` after each one
    fn run(&self, scene: &mut Scene, steps: usize, on_frame: &mut dyn FnMut(usize, &Scene)) {
        info!("Running {} steps with the {} solver", steps, self.name());
        for frame in 0..steps {
            self.step(scene);
            on_frame(frame, scene);
        }
        debug!("Finished {} steps", steps);
    }
}

/// Evaluates the domains one after another
#[derive(Debug, Default, Clone, Copy)]
pub struct SingleThreadSolver;

impl Solver for SingleThreadSolver {
    fn name(&self) -> &'static str {
        "single-threaded"
    }

    fn compute_l_values(&self, scene: &Scene) -> Vec<LValues> {
        let domains = scene.domains();
        domains.iter().map(|d| d.compute_l_values(domains)).collect()
    }
}

/// Evaluates the domains on the rayon thread pool
#[derive(Debug, Default, Clone, Copy)]
pub struct MultiThreadSolver;

impl Solver for MultiThreadSolver {
    fn name(&self) -> &'static str {
        "multi-threaded"
    }

    fn compute_l_values(&self, scene: &Scene) -> Vec<LValues> {
        let domains = scene.domains();
        domains.par_iter().map(|d| d.compute_l_values(domains)).collect()
    }
}

pub fn create_solver(multi_threaded: bool) -> Box<dyn Solver> {
    if multi_threaded {
        Box::new(MultiThreadSolver)
    } else {
        Box::new(SingleThreadSolver)
    }
}
