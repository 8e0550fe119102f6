//! Engine module containing field arrays and numeric operations

pub mod array;
pub mod backend;
pub mod operations;

pub use array::{Complex64, Field};
pub use operations::*;
