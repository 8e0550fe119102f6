//! Spatial derivatives and field updates of a domain
//!
//! `calc` walks every pair of (lower, upper) edge segments along an axis,
//! clips this domain's lines to the ones both segments cover and runs the
//! windowed spectral derivative on that band with the matching rho table.

use super::fields::LValues;
use super::pstd_domain::{Domain, Segment};
use super::rho::RhoKey;
use crate::engine::array::{assign_lines, extract_lines, Field};
use crate::engine::operations::{mix, spatial_derivative, CalculationType};
use crate::geometry::{intersect, Axis};
use crate::utilities::domain_sizing::fft_length;
use ndarray::{Array2, CowArray, Ix2};
use std::ops::Range;

impl Domain {
    /// Field differentiated by `calc`: total pressure, or the velocity along `axis`
    pub fn field_for(&self, axis: Axis, kind: CalculationType) -> CowArray<'_, f64, Ix2> {
        match (kind, axis) {
            (CalculationType::Pressure, _) => CowArray::from(self.current_values.pressure()),
            (CalculationType::Velocity, Axis::X) => CowArray::from(self.current_values.u0.view()),
            (CalculationType::Velocity, Axis::Y) => CowArray::from(self.current_values.w0.view()),
        }
    }

    /// Shape of the derivative produced by `calc(axis, kind)`
    pub fn derivative_shape(&self, axis: Axis, kind: CalculationType) -> (usize, usize) {
        let (nx, ny) = self.shape();
        match (kind, axis) {
            (CalculationType::Pressure, Axis::X) => (nx + 1, ny),
            (CalculationType::Pressure, Axis::Y) => (nx, ny + 1),
            (CalculationType::Velocity, _) => (nx, ny),
        }
    }

    /// Spatial derivative of this domain's `kind` field along `axis`
    ///
    /// Neighbour fields are read from `domains`, the arena this domain belongs
    /// to. Lines are written into `dest` (zeros when `None`), which must have
    /// the shape given by [`Domain::derivative_shape`].
    pub fn calc(
        &self,
        domains: &[Domain],
        axis: Axis,
        kind: CalculationType,
        dest: Option<Field>,
    ) -> Field {
        let expected = self.derivative_shape(axis, kind);
        let mut dest = dest.unwrap_or_else(|| Array2::zeros(expected));
        assert_eq!(
            dest.dim(),
            expected,
            "destination for {:?} {:?} derivative of '{}' has the wrong shape",
            kind,
            axis,
            self.id
        );

        let orthogonal = axis.orthogonal();
        let own_range = self.get_range(orthogonal);
        let own_field = self.field_for(axis, kind);
        let own_len = own_field.len_of(ndarray::Axis(axis.index()));

        let window_size = self.context.settings.window_size;
        let discretization = self
            .context
            .discretizer
            .get_discretization(self.context.grid_spacing, fft_length(own_len, window_size));
        let factors = discretization.factors(kind);

        let (lower_side, upper_side) = axis.sides();
        let lowers = self.segments(lower_side);
        let uppers = self.segments(upper_side);

        for lower in &lowers {
            for upper in &uppers {
                let lines = intersect(&intersect(&own_range, &lower.extent), &upper.extent);
                if lines.is_empty() {
                    continue;
                }

                let local = to_local(&lines, own_range.start);
                let own_lines = extract_lines(own_field.view(), axis, local.clone());
                let lower_lines = neighbour_lines(domains, lower, axis, kind, &lines);
                let upper_lines = neighbour_lines(domains, upper, axis, kind, &lines);

                let key = RhoKey {
                    axis,
                    lower: lower.handle(),
                    upper: upper.handle(),
                };
                let rho = self.rho_array(&key).table(kind);

                let derivative = spatial_derivative(
                    lower_lines.view(),
                    own_lines.view(),
                    upper_lines.view(),
                    factors.view(),
                    rho,
                    self.context.window.view(),
                    window_size,
                    kind,
                );
                assign_lines(&mut dest, axis, local, derivative.view());
            }
        }
        dest
    }

    /// Derivatives for every axis this domain updates along
    pub fn compute_l_values(&self, domains: &[Domain]) -> LValues {
        let (nx, ny) = self.shape();
        let mut l = LValues::zeros(nx, ny);
        if self.should_update[Axis::X.index()] {
            l.lpx = self.calc(domains, Axis::X, CalculationType::Pressure, Some(l.lpx));
            l.lvx = self.calc(domains, Axis::X, CalculationType::Velocity, Some(l.lvx));
        }
        if self.should_update[Axis::Y.index()] {
            l.lpy = self.calc(domains, Axis::Y, CalculationType::Pressure, Some(l.lpy));
            l.lvy = self.calc(domains, Axis::Y, CalculationType::Velocity, Some(l.lvy));
        }
        l
    }

    /// Commit one low-storage Runge-Kutta stage from `previous_values`
    pub fn update_fields(&mut self, l: LValues, coefficient: f64) {
        let settings = &self.context.settings;
        let step = coefficient * self.context.time_step;
        let velocity_factor = -step / self.rho;
        let pressure_factor = -step * self.rho * settings.sound_speed * settings.sound_speed;

        let previous = &self.previous_values;
        let current = &mut self.current_values;
        if self.should_update[Axis::X.index()] {
            mix(1.0, &previous.u0, velocity_factor, &l.lpx, &mut current.u0);
            mix(1.0, &previous.px0, pressure_factor, &l.lvx, &mut current.px0);
        }
        if self.should_update[Axis::Y.index()] {
            mix(1.0, &previous.w0, velocity_factor, &l.lpy, &mut current.w0);
            mix(1.0, &previous.py0, pressure_factor, &l.lvy, &mut current.py0);
        }
        self.l_values = l;
    }
}

fn to_local(range: &Range<i64>, origin: i64) -> Range<usize> {
    (range.start - origin) as usize..(range.end - origin) as usize
}

/// Lines `lines` of a neighbour's field, or an empty band for a vacant segment
fn neighbour_lines(
    domains: &[Domain],
    segment: &Segment<'_>,
    axis: Axis,
    kind: CalculationType,
    lines: &Range<i64>,
) -> Array2<f64> {
    let count = (lines.end - lines.start) as usize;
    let Some(neighbour) = segment.neighbour else {
        return Array2::zeros((count, 0));
    };
    let other = &domains[neighbour.handle.0];
    let origin = other.top_left.get(axis.orthogonal());
    extract_lines(other.field_for(axis, kind).view(), axis, to_local(lines, origin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DomainEdges, PstdSettings};
    use crate::domain::pstd_domain::{DomainId, KernelContext};
    use crate::geometry::{Direction, Point, Rect};
    use std::sync::Arc;

    fn linked_pair() -> Vec<Domain> {
        let ctx = Arc::new(KernelContext::new(PstdSettings {
            window_size: 8,
            ..Default::default()
        }));
        let make = |id: &str, x: i64, handle: usize| {
            let mut d = Domain::new(
                Arc::clone(&ctx),
                id,
                1.0,
                Rect::new(Point::xy(x, 0), Point::xy(12, 6)),
                false,
                DomainEdges::default(),
                &[],
            );
            d.handle = DomainId(handle);
            d
        };
        let mut a = make("a", 0, 0);
        let mut b = make("b", 12, 1);
        a.add_neighbour_at(&b, Direction::Right);
        b.add_neighbour_at(&a, Direction::Left);
        for d in [&mut a, &mut b] {
            d.post_initialization([None, None]);
            d.compute_rho_arrays();
        }
        vec![a, b]
    }

    #[test]
    fn test_calc_shapes() {
        let domains = linked_pair();
        let a = &domains[0];
        assert_eq!(a.calc(&domains, Axis::X, CalculationType::Pressure, None).dim(), (13, 6));
        assert_eq!(a.calc(&domains, Axis::Y, CalculationType::Pressure, None).dim(), (12, 7));
        assert_eq!(a.calc(&domains, Axis::X, CalculationType::Velocity, None).dim(), (12, 6));
        assert_eq!(a.calc(&domains, Axis::Y, CalculationType::Velocity, None).dim(), (12, 6));
    }

    #[test]
    #[should_panic(expected = "wrong shape")]
    fn test_calc_rejects_misshaped_destination() {
        let domains = linked_pair();
        domains[0].calc(
            &domains,
            Axis::X,
            CalculationType::Pressure,
            Some(Array2::zeros((12, 6))),
        );
    }

    #[test]
    fn test_quiet_fields_give_zero_derivatives() {
        let domains = linked_pair();
        let l = domains[0].compute_l_values(&domains);
        assert!(l.lpx.iter().chain(l.lvy.iter()).all(|&v| v == 0.0));
    }

    #[test]
    fn test_neighbour_pressure_drives_interface_velocity() {
        let mut domains = linked_pair();
        domains[1].current_values.px0[[0, 3]] = 1.0;

        let lpx = domains[0].calc(&domains, Axis::X, CalculationType::Pressure, None);
        // The pulse sits just across the right interface of "a"
        let near = lpx[[12, 3]].abs();
        let far = lpx[[1, 3]].abs();
        assert!(near > 0.1);
        assert!(near > 10.0 * far);
        // Lines that see no pressure stay quiet
        assert!(lpx.column(0).iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn test_update_fields_follows_derivatives() {
        let mut domains = linked_pair();
        let mut l = LValues::zeros(12, 6);
        l.lpx[[5, 2]] = 1.0;
        l.lvy[[3, 3]] = 2.0;

        let a = &mut domains[0];
        a.update_fields(l, 0.5);

        let dt = a.context.time_step;
        let c = a.settings().sound_speed;
        assert!((a.current_values.u0[[5, 2]] + 0.5 * dt / 1.2).abs() < 1e-15);
        let expected = -0.5 * dt * 1.2 * c * c * 2.0;
        assert!((a.current_values.py0[[3, 3]] - expected).abs() < 1e-12);
        assert_eq!(a.l_values.lpx[[5, 2]], 1.0);
    }
}
