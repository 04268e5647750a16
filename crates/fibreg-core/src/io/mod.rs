pub mod fileset;
pub mod image_io;

pub use fileset::{ensure_dir, FileSequence};
pub use image_io::{load_frame, save_as_sibling, save_gray8};
