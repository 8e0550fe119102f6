//! Density coupling between neighbouring domains
//!
//! At an interface the line extension of a domain is a mix of its own mirrored
//! field (reflection) and the neighbour's field (transmission). The weights
//! follow from impedance continuity and only depend on the densities on both
//! sides, so they are tabulated once per neighbour pair.

use super::pstd_domain::{Domain, DomainId};
use crate::engine::operations::CalculationType;
use crate::geometry::Axis;
use tracing::trace;

/// 4x2 coupling table, rows: lower reflection, upper reflection, lower
/// transmission, upper transmission
pub type RhoTable = [[f64; 2]; 4];

/// Coupling tables for both derivative kinds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RhoArray {
    pub pressure: RhoTable,
    pub velocity: RhoTable,
}

impl RhoArray {
    pub fn table(&self, kind: CalculationType) -> &RhoTable {
        match kind {
            CalculationType::Pressure => &self.pressure,
            CalculationType::Velocity => &self.velocity,
        }
    }
}

/// Identifies the neighbour pair a table was built for; `None` marks a vacant side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RhoKey {
    pub axis: Axis,
    pub lower: Option<DomainId>,
    pub upper: Option<DomainId>,
}

/// Coupling coefficients between densities `rho1 | rho_self | rho2`
pub fn get_rho_array(rho1: f64, rho_self: f64, rho2: f64) -> RhoArray {
    let zn1 = rho1 / rho_self;
    let inv_zn1 = 1.0 / zn1;
    let zn2 = rho2 / rho_self;
    let inv_zn2 = 1.0 / zn2;

    let rlw1 = (zn1 - 1.0) / (zn1 + 1.0);
    let rlw2 = (inv_zn1 - 1.0) / (inv_zn1 + 1.0);
    let rlw3 = (zn2 - 1.0) / (zn2 + 1.0);
    let rlw4 = (inv_zn2 - 1.0) / (inv_zn2 + 1.0);

    let tlw1 = 2.0 * zn1 / (zn1 + 1.0);
    let tlw2 = 2.0 * inv_zn1 / (inv_zn1 + 1.0);
    let tlw3 = 2.0 * zn2 / (zn2 + 1.0);
    let tlw4 = 2.0 * inv_zn2 / (inv_zn2 + 1.0);

    RhoArray {
        pressure: [[rlw1, rlw2], [rlw3, rlw4], [tlw1, tlw2], [tlw3, tlw4]],
        velocity: [[-rlw1, -rlw2], [-rlw3, -rlw4], [tlw1, tlw2], [tlw3, tlw4]],
    }
}

impl Domain {
    /// Tabulate the coupling coefficients for every neighbour pair on both axes
    pub fn compute_rho_arrays(&mut self) {
        let density_of_air = self.context.settings.density_of_air;
        let edge_density = |side| self.edges.get(side).boundary_density(density_of_air);
        let mut tables = Vec::new();

        for axis in Axis::ALL {
            let (lower_side, upper_side) = axis.sides();
            let lowers = self.segments(lower_side);
            let uppers = self.segments(upper_side);

            for lower in &lowers {
                let rho1 = lower
                    .neighbour
                    .map_or_else(|| edge_density(lower_side), |n| n.rho);
                for upper in &uppers {
                    let rho2 = upper
                        .neighbour
                        .map_or_else(|| edge_density(upper_side), |n| n.rho);
                    let key = RhoKey {
                        axis,
                        lower: lower.handle(),
                        upper: upper.handle(),
                    };
                    tables.push((key, get_rho_array(rho1, self.rho, rho2)));
                }
            }
        }

        trace!("Domain '{}': {} rho tables", self.id, tables.len());
        self.rho_arrays = tables.into_iter().collect();
    }

    /// Coupling table for a neighbour pair
    ///
    /// Panics if the tables were not computed after the last topology change.
    pub fn rho_array(&self, key: &RhoKey) -> &RhoArray {
        match self.rho_arrays.get(key) {
            Some(array) => array,
            None => panic!(
                "domain '{}' has no rho array for {:?}; compute_rho_arrays must run after linking",
                self.id, key
            ),
        }
    }
}
