//! RustFFT backend implementation
//!
//! Pure Rust implementation using the rustfft library.
//! This backend is available on all platforms.

use super::ComputeBackend;
use ndarray::{Array2, Axis, Zip};
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type Plan = Arc<dyn Fft<f64>>;

/// RustFFT-based compute backend
///
/// Plans are cached per `(length, inverse)` and shared between threads.
#[derive(Default)]
pub struct RustFFTBackend {
    plans: RwLock<HashMap<(usize, bool), Plan>>,
}

impl RustFFTBackend {
    /// Create a new RustFFT backend
    pub fn new() -> Self {
        Self::default()
    }

    fn plan(&self, len: usize, inverse: bool) -> Plan {
        let key = (len, inverse);
        if let Ok(plans) = self.plans.read() {
            if let Some(plan) = plans.get(&key) {
                return Arc::clone(plan);
            }
        }

        let mut planner = FftPlanner::new();
        let plan = if inverse {
            planner.plan_fft_inverse(len)
        } else {
            planner.plan_fft_forward(len)
        };
        match self.plans.write() {
            Ok(mut plans) => Arc::clone(plans.entry(key).or_insert(plan)),
            Err(_) => plan,
        }
    }

    /// Number of cached FFT plans
    pub fn cached_plans(&self) -> usize {
        self.plans.read().map(|p| p.len()).unwrap_or(0)
    }

    fn process_rows(fft: Arc<dyn Fft<f64>>, data: &mut Array2<Complex<f64>>) {
        if let Some(buffer) = data.as_slice_mut() {
            // Standard layout: rows are contiguous chunks of the buffer
            fft.process(buffer);
            return;
        }
        for mut row in data.axis_iter_mut(Axis(0)) {
            let mut line: Vec<Complex<f64>> = row.to_vec();
            fft.process(&mut line);
            for (dst, val) in row.iter_mut().zip(line) {
                *dst = val;
            }
        }
    }
}

impl ComputeBackend for RustFFTBackend {
    fn fft_rows(&self, data: &mut Array2<Complex<f64>>) {
        let len = data.ncols();
        if len == 0 || data.nrows() == 0 {
            return;
        }
        Self::process_rows(self.plan(len, false), data);
    }

    fn ifft_rows(&self, data: &mut Array2<Complex<f64>>) {
        let len = data.ncols();
        if len == 0 || data.nrows() == 0 {
            return;
        }
        Self::process_rows(self.plan(len, true), data);

        let normalization = 1.0 / len as f64;
        data.mapv_inplace(|v| v * normalization);
    }

    fn mix(
        &self,
        alpha: f64,
        a: &Array2<f64>,
        beta: f64,
        b: &Array2<f64>,
        output: &mut Array2<f64>,
    ) {
        Zip::from(output)
            .and(a)
            .and(b)
            .for_each(|o, &a_val, &b_val| *o = alpha * a_val + beta * b_val);
    }

    fn multiply(&self, data: &mut Array2<f64>, factors: &Array2<f64>) {
        Zip::from(data).and(factors).for_each(|d, &f| *d *= f);
    }

    fn name(&self) -> &'static str {
        "rustfft"
    }
}
