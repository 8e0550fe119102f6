//! FFT sizing utilities
//!
//! Every spectral derivative runs on a line padded to a power of two so that
//! the discretisation cache is shared between domains of similar size.

/// Round up to the nearest power of 2
pub fn next_power_of_2(n: usize) -> usize {
    if n == 0 {
        return 1;
    }
    if n.is_power_of_two() {
        return n;
    }
    1 << (usize::BITS - (n - 1).leading_zeros())
}

/// Smallest power of two not below `n`, at least 1
pub fn next_2_power(n: f64) -> usize {
    if n.is_nan() || n <= 1.0 {
        return 1;
    }
    next_power_of_2(n.ceil() as usize)
}

/// FFT length for a line of `n` nodes extended by `window_size` on both sides
pub fn fft_length(n: usize, window_size: usize) -> usize {
    next_power_of_2(n + 2 * window_size)
}
