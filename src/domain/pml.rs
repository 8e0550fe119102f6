//! Perfectly matched layers
//!
//! A primary PML is attached to one vacant edge of an air domain and
//! attenuates along the axis normal to that edge. A secondary PML is attached
//! to other PMLs (typically in a scene corner) and attenuates along the axis
//! of each PML parent; with two parents on different axes it is a corner domain.

use super::fields::PmlArrays;
use super::pstd_domain::Domain;
use crate::engine::array::Field;
use crate::engine::operations::multiply;
use crate::geometry::Axis;
use crate::utilities::attenuation_profile;
use ndarray::Array1;
use tracing::warn;

/// Orientation of an attenuation ramp along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    /// Attenuation grows with the grid index (parent on the lower side)
    Ascending,
    /// Attenuation grows towards the lower index (parent on the upper side)
    Descending,
}

impl Ramp {
    pub fn is_reversed(self) -> bool {
        self == Ramp::Descending
    }
}

/// Expand a 1D profile along `axis` to a `(nx, ny)` multiplier array
pub fn create_attenuation_array(profile: &Array1<f64>, axis: Axis, shape: (usize, usize)) -> Field {
    match axis {
        Axis::X => Field::from_shape_fn(shape, |(i, _)| profile[i]),
        Axis::Y => Field::from_shape_fn(shape, |(_, j)| profile[j]),
    }
}

impl Domain {
    /// Attenuation orientation per axis, derived from the PML parents
    ///
    /// Parents of a secondary PML must already hold their own layout.
    pub fn attenuation_layout(&self, domains: &[Domain]) -> [Option<Ramp>; 2] {
        let mut layout = [None, None];
        if !self.is_pml {
            return layout;
        }

        for &parent in &self.pml_for_domain_list {
            match self.direction_of(parent) {
                Some(direction) => {
                    let ramp = if direction.is_lower() {
                        Ramp::Ascending
                    } else {
                        Ramp::Descending
                    };
                    layout[direction.axis().index()] = Some(ramp);
                }
                None => warn!(
                    "PML '{}' is not linked to its parent {}",
                    self.id, parent
                ),
            }
        }

        if self.is_secondary_pml {
            for &parent in &self.pml_for_domain_list {
                let Some(parent) = domains.get(parent.0) else {
                    continue;
                };
                if !parent.is_pml {
                    continue;
                }
                for axis in Axis::ALL {
                    if layout[axis.index()].is_none() {
                        layout[axis.index()] = parent.attenuation[axis.index()];
                    }
                }
            }
        }
        layout
    }

    /// Check the neighbour counts required before PML multipliers are applied
    pub fn pml_precondition(&self) -> Result<(), String> {
        if !self.is_pml {
            return Ok(());
        }
        if self.is_secondary_pml {
            if self.num_pml_neighbour_domains > 2 {
                return Err(format!(
                    "secondary PML has {} PML neighbours, at most 2 allowed",
                    self.num_pml_neighbour_domains
                ));
            }
        } else if self.num_non_pml_neighbour_domains() != 1 {
            return Err(format!(
                "primary PML needs exactly one non-PML neighbour, found {}",
                self.num_non_pml_neighbour_domains()
            ));
        }
        Ok(())
    }

    /// Build the attenuation multipliers; fields without attenuation get ones
    pub fn compute_pml_matrices(&mut self) {
        let (nx, ny) = self.shape();
        let settings = &self.context.settings;
        let dt = self.context.time_step;
        let velocity_scale = settings.density_of_air * dt / self.rho;
        let mut arrays = PmlArrays::ones(nx, ny);

        if let Some(ramp) = self.attenuation[Axis::X.index()] {
            let reversed = ramp.is_reversed();
            let pressure = attenuation_profile(nx, settings.pml_attenuation, dt, false, reversed);
            let velocity =
                attenuation_profile(nx, settings.pml_attenuation, velocity_scale, true, reversed);
            arrays.px = create_attenuation_array(&pressure, Axis::X, (nx, ny));
            arrays.u = create_attenuation_array(&velocity, Axis::X, (nx + 1, ny));
        }
        if let Some(ramp) = self.attenuation[Axis::Y.index()] {
            let reversed = ramp.is_reversed();
            let pressure = attenuation_profile(ny, settings.pml_attenuation, dt, false, reversed);
            let velocity =
                attenuation_profile(ny, settings.pml_attenuation, velocity_scale, true, reversed);
            arrays.py = create_attenuation_array(&pressure, Axis::Y, (nx, ny));
            arrays.w = create_attenuation_array(&velocity, Axis::Y, (nx, ny + 1));
        }

        self.pml_arrays = arrays;
    }

    /// Multiply the current fields by the attenuation multipliers
    ///
    /// Panics if the PML neighbour preconditions do not hold.
    pub fn apply_pml_matrices(&mut self) {
        if let Err(reason) = self.pml_precondition() {
            panic!("cannot apply PML on '{}': {}", self.id, reason);
        }
        multiply(&mut self.current_values.px0, &self.pml_arrays.px);
        multiply(&mut self.current_values.py0, &self.pml_arrays.py);
        multiply(&mut self.current_values.u0, &self.pml_arrays.u);
        multiply(&mut self.current_values.w0, &self.pml_arrays.w);
    }
}
