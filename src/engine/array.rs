//! Field array helpers
//!
//! Fields are stored as `Array2<f64>` indexed `[x, y]`. Spectral derivatives
//! work on lines along one axis, so these helpers move a band of lines between
//! a field and a `[line, position]` array in standard layout.

use crate::geometry::Axis;
use ndarray::{s, Array2, ArrayView2, Zip};
use num_complex::Complex;
use std::ops::Range;

/// Type alias for Complex64
pub type Complex64 = Complex<f64>;

/// Real 2D field, indexed `[x, y]`
pub type Field = Array2<f64>;

/// Copy the lines running along `axis` whose orthogonal index lies in `lines`
///
/// The result is `[lines.len(), field.len_of(axis)]` in standard layout.
pub fn extract_lines(field: ArrayView2<'_, f64>, axis: Axis, lines: Range<usize>) -> Array2<f64> {
    match axis {
        Axis::X => field.slice(s![.., lines]).t().as_standard_layout().into_owned(),
        Axis::Y => field.slice(s![lines, ..]).as_standard_layout().into_owned(),
    }
}

/// Write `values` (`[line, position]`) back into the lines of `field` along `axis`
pub fn assign_lines(
    field: &mut Array2<f64>,
    axis: Axis,
    lines: Range<usize>,
    values: ArrayView2<'_, f64>,
) {
    match axis {
        Axis::X => field.slice_mut(s![.., lines]).assign(&values.t()),
        Axis::Y => field.slice_mut(s![lines, ..]).assign(&values),
    }
}

/// Elementwise sum of two equally shaped fields
pub fn sum(a: &Field, b: &Field) -> Field {
    let mut out = Field::zeros(a.raw_dim());
    Zip::from(&mut out)
        .and(a)
        .and(b)
        .for_each(|o, &x, &y| *o = x + y);
    out
}

/// Sum of squares of all entries
pub fn norm_squared(field: &Field) -> f64 {
    field.iter().map(|v| v * v).sum()
}

/// Largest absolute entry, 0 for an empty field
pub fn max_abs(field: &Field) -> f64 {
    field.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
}
