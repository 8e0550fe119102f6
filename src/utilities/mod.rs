//! Kernel functions shared by the domains: grid sizing, windows, PML ramps and sources

pub mod domain_sizing;
pub mod wave_numbers;

use crate::geometry::Point;
use ndarray::{Array1, Array2};

pub use domain_sizing::next_2_power;
pub use wave_numbers::{Discretization, WaveNumberDiscretizer};

/// Grid spacing resolving `max_frequency` with two cells per wavelength
///
/// `c / (2 f)` truncated to five significant digits, so the result never
/// exceeds the Nyquist spacing.
pub fn grid_spacing(sound_speed: f64, max_frequency: f64) -> f64 {
    let nyquist = sound_speed / (2.0 * max_frequency);
    if !nyquist.is_finite() || nyquist <= 0.0 {
        return nyquist;
    }
    let digits = 4 - nyquist.log10().floor() as i32;
    let scale = 10f64.powi(digits);
    // Relative nudge so exact decimals such as 0.0085 do not lose their last digit
    (nyquist * scale * (1.0 + 1e-12)).floor() / scale
}

/// Normalised impedance of a surface with absorption coefficient `alpha`
///
/// `alpha = 1` matches air, `alpha = 0` is infinitely hard.
pub fn impedance_from_alpha(alpha: f64) -> f64 {
    let reflection = (1.0 - alpha).sqrt();
    (1.0 + reflection) / (1.0 - reflection)
}

/// Tapering window used for the line extensions, `2 * window_size + 1` values
///
/// The edges are attenuated by `patch_error` dB relative to the centre.
pub fn window(window_size: usize, patch_error: f64) -> Array1<f64> {
    let width = window_size as f64;
    let a = (10f64.powf(patch_error / 20.0)).ln();
    Array1::from_iter((0..=2 * window_size).map(|n| {
        let x = (n as f64 - width) / width;
        (-a * x.powi(6)).exp()
    }))
}

/// One-dimensional PML multiplier profile
///
/// Pressure nodes sit at cell centres (`cells` values), velocity nodes on cell
/// faces (`cells + 1` values, the first on the interface with the parent). The
/// attenuation rises as the fourth power of depth; `scale` is the time step,
/// weighted by density for velocity nodes.
pub fn attenuation_profile(
    cells: usize,
    pml_attenuation: f64,
    scale: f64,
    velocity_nodes: bool,
    reversed: bool,
) -> Array1<f64> {
    let depth = cells as f64;
    let (len, offset) = if velocity_nodes {
        (cells + 1, 0.0)
    } else {
        (cells, 0.5)
    };

    let multiplier = |k: usize| {
        let s = (k as f64 + offset) / depth;
        let sigma = pml_attenuation * s.powi(4);
        (-sigma * scale).exp()
    };

    if reversed {
        Array1::from_iter((0..len).rev().map(multiplier))
    } else {
        Array1::from_iter((0..len).map(multiplier))
    }
}

/// Gaussian pressure pulse sampled on a domain grid
///
/// `center` is given in global grid coordinates, `top_left` places the
/// `(nx, ny)` samples in the same frame.
pub fn gaussian_pulse(
    center: [f64; 2],
    top_left: Point,
    shape: (usize, usize),
    grid_spacing: f64,
    bandwidth: f64,
) -> Array2<f64> {
    Array2::from_shape_fn(shape, |(i, j)| {
        let dx = (top_left.x as f64 + i as f64) - center[0];
        let dy = (top_left.y as f64 + j as f64) - center[1];
        (-bandwidth * (dx * dx + dy * dy) * grid_spacing * grid_spacing).exp()
    })
}
