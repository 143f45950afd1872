//! Output side of a run: STL files and the directory they land in.

mod output;
mod stl;

pub use output::{resolve_output_dir, FALLBACK_DIR_NAME};
pub use stl::{write_stl, StlFormat, StlSink};
