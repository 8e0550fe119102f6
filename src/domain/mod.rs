//! Domain decomposition for the PSTD kernel

pub mod calc;
pub mod fields;
pub mod pml;
pub mod pstd_domain;
pub mod rho;
pub mod scene;
pub mod solver;

pub use fields::{FieldValues, LValues, PmlArrays};
pub use pml::{create_attenuation_array, Ramp};
pub use pstd_domain::{Domain, DomainId, KernelContext, Neighbour};
pub use rho::{get_rho_array, RhoArray, RhoKey, RhoTable};
pub use scene::Scene;
pub use solver::{create_solver, MultiThreadSolver, SingleThreadSolver, Solver};
