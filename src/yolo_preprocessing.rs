use anyhow::Result;
use image::DynamicImage;
use ndarray::Array;

/// Gray used by YOLO exporters for letterbox padding.
const PAD_VALUE: u8 = 114;

/// Maps model-space coordinates back to the original image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub orig_width: u32,
    pub orig_height: u32,
}

impl Letterbox {
    /// Undo the resize and padding, clamping to the original image bounds.
    pub fn to_original(&self, x: f32, y: f32) -> (f32, f32) {
        let ox = ((x - self.pad_x) / self.scale).clamp(0.0, self.orig_width as f32);
        let oy = ((y - self.pad_y) / self.scale).clamp(0.0, self.orig_height as f32);
        (ox, oy)
    }
}

pub fn preprocess_image(
    img: &DynamicImage,
    target_size: u32,
) -> Result<(Array<f32, ndarray::IxDyn>, Letterbox)> {
    let rgb_img = img.to_rgb8();
    let (orig_width, orig_height) = rgb_img.dimensions();
    if orig_width == 0 || orig_height == 0 {
        return Err(anyhow::anyhow!(
            "Cannot run detection on an empty image ({orig_width}x{orig_height})"
        ));
    }

    let max_dim = orig_width.max(orig_height);
    let scale = (target_size as f32) / (max_dim as f32);
    let new_width = ((orig_width as f32 * scale) as u32).clamp(1, target_size);
    let new_height = ((orig_height as f32 * scale) as u32).clamp(1, target_size);

    let resized = image::imageops::resize(
        &rgb_img,
        new_width,
        new_height,
        image::imageops::FilterType::Triangle,
    );

    let mut letterboxed =
        image::RgbImage::from_pixel(target_size, target_size, image::Rgb([PAD_VALUE; 3]));

    // Center the resized image
    let x_offset = (target_size - new_width) / 2;
    let y_offset = (target_size - new_height) / 2;
    image::imageops::replace(&mut letterboxed, &resized, x_offset as i64, y_offset as i64);

    // NCHW: batch, channel, height, width
    let mut input_data = Vec::with_capacity((3 * target_size * target_size) as usize);
    for c in 0..3 {
        for y in 0..target_size {
            for x in 0..target_size {
                let pixel = letterboxed.get_pixel(x, y);
                input_data.push(pixel[c] as f32 / 255.0);
            }
        }
    }

    let input = Array::from_shape_vec(
        ndarray::IxDyn(&[1, 3, target_size as usize, target_size as usize]),
        input_data,
    )?;

    let letterbox = Letterbox {
        scale,
        pad_x: x_offset as f32,
        pad_y: y_offset as f32,
        orig_width,
        orig_height,
    };

    Ok((input, letterbox))
}
