use std::path::Path;

use image::{DynamicImage, ImageReader, imageops::FilterType};
use ndarray::Array4;

use crate::error::ClassifyError;

use super::registry::InputSize;

/// Decode an image from disk, sniffing the format from its contents rather
/// than trusting the extension.
pub fn decode_image(path: &Path) -> Result<DynamicImage, ClassifyError> {
    let reader = ImageReader::open(path)?
        .with_guessed_format()
        .map_err(|e| ClassifyError::Decode(e.to_string()))?;

    reader
        .decode()
        .map_err(|e| ClassifyError::Decode(e.to_string()))
}

/// Convert to RGB, resize to exactly `size`, scale intensities to `[0, 1]` and
/// add the batch axis. Output shape is `(1, height, width, 3)`.
pub fn to_input_tensor(image: &DynamicImage, size: InputSize) -> Array4<f32> {
    let rgb = image.to_rgb8();
    let resized = image::imageops::resize(&rgb, size.width, size.height, FilterType::CatmullRom);

    Array4::from_shape_fn(
        (1, size.height as usize, size.width as usize, 3),
        |(_, y, x, c)| resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0,
    )
}
