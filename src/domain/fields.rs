//! Staggered field storage of a domain
//!
//! For a domain of `nx` by `ny` cells the pressure components live on the cell
//! centres and each velocity component on the faces normal to its axis, so the
//! velocity arrays carry one extra node along their own axis.

use crate::engine::array::{self, Field};

/// Pressure and velocity state at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValues {
    /// Pressure component driven by the x derivative, `(nx, ny)`
    pub px0: Field,
    /// Pressure component driven by the y derivative, `(nx, ny)`
    pub py0: Field,
    /// Velocity along x, `(nx + 1, ny)`
    pub u0: Field,
    /// Velocity along y, `(nx, ny + 1)`
    pub w0: Field,
}

impl FieldValues {
    pub fn zeros(nx: usize, ny: usize) -> Self {
        Self {
            px0: Field::zeros((nx, ny)),
            py0: Field::zeros((nx, ny)),
            u0: Field::zeros((nx + 1, ny)),
            w0: Field::zeros((nx, ny + 1)),
        }
    }

    /// Total pressure `px0 + py0`
    pub fn pressure(&self) -> Field {
        array::sum(&self.px0, &self.py0)
    }
}

/// Spatial derivatives feeding one Runge-Kutta stage
#[derive(Debug, Clone, PartialEq)]
pub struct LValues {
    /// d/dx of pressure on the u nodes, `(nx + 1, ny)`
    pub lpx: Field,
    /// d/dy of pressure on the w nodes, `(nx, ny + 1)`
    pub lpy: Field,
    /// d/dx of u on the pressure nodes, `(nx, ny)`
    pub lvx: Field,
    /// d/dy of w on the pressure nodes, `(nx, ny)`
    pub lvy: Field,
}

impl LValues {
    pub fn zeros(nx: usize, ny: usize) -> Self {
        Self {
            lpx: Field::zeros((nx + 1, ny)),
            lpy: Field::zeros((nx, ny + 1)),
            lvx: Field::zeros((nx, ny)),
            lvy: Field::zeros((nx, ny)),
        }
    }
}

/// Multipliers applied to the fields after each timestep inside a PML
#[derive(Debug, Clone, PartialEq)]
pub struct PmlArrays {
    pub px: Field,
    pub py: Field,
    pub u: Field,
    pub w: Field,
}

impl PmlArrays {
    pub fn zeros(nx: usize, ny: usize) -> Self {
        Self {
            px: Field::zeros((nx, ny)),
            py: Field::zeros((nx, ny)),
            u: Field::zeros((nx + 1, ny)),
            w: Field::zeros((nx, ny + 1)),
        }
    }

    /// Multipliers that leave every field untouched
    pub fn ones(nx: usize, ny: usize) -> Self {
        Self {
            px: Field::ones((nx, ny)),
            py: Field::ones((nx, ny)),
            u: Field::ones((nx + 1, ny)),
            w: Field::ones((nx, ny + 1)),
        }
    }
}
