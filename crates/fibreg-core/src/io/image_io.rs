use std::path::Path;

use image::GrayImage;
use ndarray::Array2;

use crate::error::{FibregError, Result};
use crate::frame::Frame;

/// Load a slice file as 8-bit grayscale.
///
/// Colour and 16-bit inputs are converted to 8-bit luma by the `image` crate.
pub fn load_frame(path: &Path, index: usize) -> Result<Frame> {
    let img = image::open(path).map_err(|source| FibregError::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;
    let gray = img.into_luma8();
    let (w, h) = gray.dimensions();
    let data = Array2::from_shape_vec((h as usize, w as usize), gray.into_raw())
        .map_err(|e| FibregError::InvalidConfig(format!("{}: {e}", path.display())))?;
    Ok(Frame::new(data, index, path))
}

/// Save an 8-bit array, choosing the format from the file extension.
pub fn save_gray8(data: &Array2<u8>, path: &Path) -> Result<()> {
    let (h, w) = data.dim();
    let pixels: Vec<u8> = data.iter().copied().collect();
    let img = GrayImage::from_raw(w as u32, h as u32, pixels).ok_or_else(|| {
        FibregError::InvalidConfig(format!(
            "pixel buffer does not match {w}x{h} for {}",
            path.display()
        ))
    })?;
    img.save(path).map_err(|source| FibregError::ImageWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Save `data` into `destination` under the file name of `source`.
pub fn save_as_sibling(data: &Array2<u8>, source: &Path, destination: &Path) -> Result<()> {
    let name = source.file_name().ok_or_else(|| {
        FibregError::InvalidConfig(format!("{} has no file name", source.display()))
    })?;
    save_gray8(data, &destination.join(name))
}
