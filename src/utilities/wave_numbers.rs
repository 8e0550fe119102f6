//! Wave number discretisation for spectral derivatives
//!
//! The derivative factors only depend on the grid spacing and the FFT length,
//! so they are computed once per `(dx, length)` pair and shared between all
//! domains through [`WaveNumberDiscretizer`].

use crate::engine::array::Complex64;
use crate::engine::operations::CalculationType;
use ndarray::Array1;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Angular wave numbers of an FFT of `length` samples spaced `grid_spacing` apart
pub fn wave_numbers(grid_spacing: f64, length: usize) -> Array1<f64> {
    let scale = 2.0 * PI / (length as f64 * grid_spacing);
    Array1::from_iter((0..length).map(|i| {
        if i <= length / 2 {
            scale * i as f64
        } else {
            scale * (i as f64 - length as f64)
        }
    }))
}

/// Staggered derivative factors `(pressure, velocity)`
///
/// Pressure input is differentiated half a cell backwards onto the velocity
/// nodes (`i k e^{-i k dx/2}`), velocity input half a cell forwards onto the
/// pressure nodes (`i k e^{i k dx/2}`).
pub fn derivative_factors(
    grid_spacing: f64,
    length: usize,
) -> (Array1<Complex64>, Array1<Complex64>) {
    let k = wave_numbers(grid_spacing, length);
    let half = grid_spacing / 2.0;
    let pressure = k.mapv(|k| Complex64::new(0.0, k) * Complex64::new(0.0, -k * half).exp());
    let velocity = k.mapv(|k| Complex64::new(0.0, k) * Complex64::new(0.0, k * half).exp());
    (pressure, velocity)
}

/// Derivative factors for one `(grid spacing, FFT length)` pair
#[derive(Debug, Clone)]
pub struct Discretization {
    pub grid_spacing: f64,
    pub length: usize,
    pub wave_numbers: Array1<f64>,
    pub pressure_factors: Array1<Complex64>,
    pub velocity_factors: Array1<Complex64>,
}

impl Discretization {
    pub fn new(grid_spacing: f64, length: usize) -> Self {
        let (pressure_factors, velocity_factors) = derivative_factors(grid_spacing, length);
        Self {
            grid_spacing,
            length,
            wave_numbers: wave_numbers(grid_spacing, length),
            pressure_factors,
            velocity_factors,
        }
    }

    /// Factors applied to an input field of the given kind
    pub fn factors(&self, kind: CalculationType) -> &Array1<Complex64> {
        match kind {
            CalculationType::Pressure => &self.pressure_factors,
            CalculationType::Velocity => &self.velocity_factors,
        }
    }
}

/// Thread-safe cache of [`Discretization`]s
#[derive(Debug, Default)]
pub struct WaveNumberDiscretizer {
    cache: RwLock<HashMap<(u64, usize), Arc<Discretization>>>,
}

impl WaveNumberDiscretizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derivative factors for `grid_spacing` and FFT `length`, computed on first use
    pub fn get_discretization(&self, grid_spacing: f64, length: usize) -> Arc<Discretization> {
        let key = (grid_spacing.to_bits(), length);
        if let Ok(cache) = self.cache.read() {
            if let Some(found) = cache.get(&key) {
                return Arc::clone(found);
            }
        }

        debug!("Discretising wave numbers for dx = {}, N = {}", grid_spacing, length);
        let computed = Arc::new(Discretization::new(grid_spacing, length));
        match self.cache.write() {
            Ok(mut cache) => Arc::clone(cache.entry(key).or_insert(computed)),
            Err(_) => computed,
        }
    }

    /// Number of cached discretisations
    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
