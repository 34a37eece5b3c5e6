use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;

pub const TARGET_SIZE: u32 = 224;

/// Resizes (ignoring aspect ratio) and scales to a [0, 1] batch of (1, 224, 224, 3).
pub fn to_input_tensor(image: &RgbImage) -> Array4<f32> {
    let resized = imageops::resize(image, TARGET_SIZE, TARGET_SIZE, FilterType::Triangle);

    let size = TARGET_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, size, size, 3));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for (channel, &value) in pixel.0.iter().enumerate() {
            tensor[[0, y as usize, x as usize, channel]] = f32::from(value) / 255.0;
        }
    }
    tensor
}
