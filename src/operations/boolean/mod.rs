mod bsp;
mod engine;
mod evaluator;
mod intersect_op;
mod select;
mod split;
mod subtract;
mod union;

pub use engine::boolean_execute;
pub use evaluator::{BspEvaluator, CsgEvaluator};
pub use intersect_op::Intersect;
pub use select::BooleanOp;
pub use split::{Plane, Polygon};
pub use subtract::Subtract;
pub use union::Union;
