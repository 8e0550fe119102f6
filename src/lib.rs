//! pstdsim - acoustic wave propagation with the Pseudo-Spectral Time-Domain method
//!
//! A 2D scene is split into rectangular domains of air, rigid material and
//! perfectly matched layers. Spatial derivatives are taken spectrally along
//! each line of a domain, extended into its neighbours with density weighted
//! reflection and transmission, and fields advance with a low-storage
//! Runge-Kutta scheme.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod utilities;

// Re-export commonly used types
pub use config::{
    DomainConfig, DomainEdges, EdgeParameters, PstdSettings, SceneConfig, SpeakerConfig,
};
pub use domain::{create_solver, Domain, DomainId, Scene, Solver};
pub use engine::array::{Complex64, Field};
pub use error::{PstdError, Result};

pub mod prelude {
    //! Common imports for using the pstdsim library
    pub use crate::config::{
        DomainConfig, DomainEdges, EdgeParameters, PstdSettings, SceneConfig, SpeakerConfig,
    };
    pub use crate::domain::{
        create_solver, Domain, DomainId, FieldValues, LValues, MultiThreadSolver, Scene,
        SingleThreadSolver, Solver,
    };
    pub use crate::engine::array::{Complex64, Field};
    pub use crate::engine::operations::CalculationType;
    pub use crate::error::{PstdError, Result};
    pub use crate::geometry::{Axis, Direction, Point, Rect};
}
