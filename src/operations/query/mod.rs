mod bounding_box;
mod is_watertight;
mod volume;

pub use bounding_box::{Aabb, BoundingBox};
pub use is_watertight::IsWatertight;
pub(crate) use volume::signed_volume_of;
pub use volume::Volume;
