mod make_box;
mod make_prism;
mod make_sphere;

pub use make_box::MakeBox;
pub use make_prism::MakePrism;
pub use make_sphere::MakeUvSphere;
