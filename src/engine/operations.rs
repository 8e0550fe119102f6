//! Array operations for the PSTD kernels
//!
//! This module provides high-level array operations that dispatch to the global
//! compute backend, and the windowed spectral derivative that couples a domain
//! to its neighbours along one axis.

use crate::engine::array::Complex64;
use crate::engine::backend::{default_backend, ComputeBackend};
use ndarray::{s, Array2, ArrayView1, ArrayView2};
use num_traits::Zero;
use once_cell::sync::Lazy;
use std::sync::Arc;

// Global backend instance (thread-safe, initialized once)
static BACKEND: Lazy<Arc<Box<dyn ComputeBackend>>> = Lazy::new(|| Arc::new(default_backend()));

/// Name of the active backend
pub fn backend_name() -> &'static str {
    BACKEND.name()
}

/// Field whose derivative is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalculationType {
    /// Pressure nodes in, velocity nodes out (`n` values give `n + 1`)
    Pressure,
    /// Velocity nodes in, pressure nodes out (`n` values give `n - 1`)
    Velocity,
}

impl CalculationType {
    /// Staggering offset of the input grid: 0 for pressure, 1 for velocity
    fn shift(self) -> usize {
        match self {
            CalculationType::Pressure => 0,
            CalculationType::Velocity => 1,
        }
    }
}

/// Mix two fields: out = alpha * a + beta * b
pub fn mix(alpha: f64, a: &Array2<f64>, beta: f64, b: &Array2<f64>, out: &mut Array2<f64>) {
    assert_eq!(a.shape(), b.shape(), "mix operands differ in shape");
    assert_eq!(a.shape(), out.shape(), "mix output has the wrong shape");
    BACKEND.mix(alpha, a, beta, b, out);
}

/// Elementwise product, in place
pub fn multiply(data: &mut Array2<f64>, factors: &Array2<f64>) {
    assert_eq!(data.shape(), factors.shape(), "multiply operands differ in shape");
    BACKEND.multiply(data, factors);
}

/// Forward FFT of every row
pub fn fft_rows(data: &mut Array2<Complex64>) {
    BACKEND.fft_rows(data);
}

/// Normalised inverse FFT of every row
pub fn ifft_rows(data: &mut Array2<Complex64>) {
    BACKEND.ifft_rows(data);
}

/// Windowed spectral derivative of `own` along its rows
///
/// `lower`, `own` and `upper` are `[line, position]` arrays holding the same
/// lines of the lower neighbour, this domain and the upper neighbour. A missing
/// neighbour is passed as an array with zero columns. `rho` is the 4x2 coupling
/// table: rows 0 and 1 hold the reflection coefficients at the lower and upper
/// interface, rows 2 and 3 the transmission coefficients.
///
/// Each line is extended by `window_size` cells on both sides, zero padded to
/// `factors.len()`, differentiated in the wave number domain and cut back to the
/// staggered output grid.
#[allow(clippy::too_many_arguments)]
pub fn spatial_derivative(
    lower: ArrayView2<'_, f64>,
    own: ArrayView2<'_, f64>,
    upper: ArrayView2<'_, f64>,
    factors: ArrayView1<'_, Complex64>,
    rho: &[[f64; 2]; 4],
    window: ArrayView1<'_, f64>,
    window_size: usize,
    kind: CalculationType,
) -> Array2<f64> {
    let lines = own.nrows();
    let n = own.ncols();
    let n1 = lower.ncols();
    let n3 = upper.ncols();
    let w = window_size;
    let fft_len = factors.len();

    assert_eq!(lower.nrows(), lines, "lower neighbour line count mismatch");
    assert_eq!(upper.nrows(), lines, "upper neighbour line count mismatch");
    assert_eq!(window.len(), 2 * w + 1, "window length must be 2 * window_size + 1");
    assert!(fft_len >= n + 2 * w, "FFT length {} too short for {} + 2 * {}", fft_len, n, w);

    let shift = kind.shift();
    let out_len = match kind {
        CalculationType::Pressure => n + 1,
        CalculationType::Velocity => {
            assert!(n > 0, "velocity line must hold at least one node");
            n - 1
        }
    };

    let transmission_col = match kind {
        CalculationType::Pressure => 1,
        CalculationType::Velocity => 0,
    };
    let reflect_lower = rho[0][0];
    let reflect_upper = rho[1][0];
    let transmit_lower = rho[2][transmission_col];
    let transmit_upper = rho[3][transmission_col];

    let mut spectrum = Array2::from_elem((lines, fft_len), Complex64::zero());
    for line in 0..lines {
        let own_line = own.row(line);
        let lower_line = lower.row(line);
        let upper_line = upper.row(line);
        let mut target = spectrum.row_mut(line);

        for (i, &value) in own_line.iter().enumerate() {
            target[w + i] = Complex64::new(value, 0.0);
        }

        for k in 1..=w {
            let mut left = 0.0;
            if k - 1 + shift < n {
                left += reflect_lower * own_line[k - 1 + shift];
            }
            if k + shift <= n1 {
                left += transmit_lower * lower_line[n1 - shift - k];
            }
            target[w - k] = Complex64::new(left * window[w - k], 0.0);

            let mut right = 0.0;
            if k + shift <= n {
                right += reflect_upper * own_line[n - shift - k];
            }
            if k - 1 + shift < n3 {
                right += transmit_upper * upper_line[k - 1 + shift];
            }
            target[w + n - 1 + k] = Complex64::new(right * window[w + k], 0.0);
        }
    }

    fft_rows(&mut spectrum);
    for mut row in spectrum.rows_mut() {
        for (value, factor) in row.iter_mut().zip(factors.iter()) {
            *value *= factor;
        }
    }
    ifft_rows(&mut spectrum);

    spectrum
        .slice(s![.., w..w + out_len])
        .mapv(|v| v.re)
}
