//! Compute backend abstraction layer
//!
//! The kernels only need batched 1D FFTs along rows and a handful of
//! elementwise field operations. Backends implement them behind
//! [`ComputeBackend`]; the RustFFT backend is available on all platforms.

use ndarray::Array2;
use num_complex::Complex;

mod rustfft;

pub use self::rustfft::RustFFTBackend;

/// Trait defining the compute backend interface
pub trait ComputeBackend: Send + Sync {
    /// Forward FFT of every row of `data`, in place
    fn fft_rows(&self, data: &mut Array2<Complex<f64>>);

    /// Normalised inverse FFT of every row of `data`, in place
    fn ifft_rows(&self, data: &mut Array2<Complex<f64>>);

    /// Mix two fields: output = alpha * a + beta * b
    fn mix(
        &self,
        alpha: f64,
        a: &Array2<f64>,
        beta: f64,
        b: &Array2<f64>,
        output: &mut Array2<f64>,
    );

    /// Elementwise product, in place: data *= factors
    fn multiply(&self, data: &mut Array2<f64>, factors: &Array2<f64>);

    /// Return the name of the backend for debugging/logging
    fn name(&self) -> &'static str;
}

/// Get the default compute backend
pub fn default_backend() -> Box<dyn ComputeBackend> {
    Box::new(RustFFTBackend::new())
}

/// Create a specific backend by name (useful for testing and benchmarking)
pub fn create_backend(name: &str) -> Option<Box<dyn ComputeBackend>> {
    match name {
        "rustfft" => Some(Box::new(RustFFTBackend::new())),
        _ => None,
    }
}
