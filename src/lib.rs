pub mod bead;
pub mod error;
pub mod io;
pub mod math;
pub mod operations;
pub mod tessellation;
pub mod topology;

pub use error::{LockbeadError, Result};
