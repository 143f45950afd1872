mod bisect;
mod displace;

pub use bisect::{Bisect, HalfSpace};
pub use displace::DisplaceNoise;
