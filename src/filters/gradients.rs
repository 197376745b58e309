use anyhow::{bail, Result};
use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::filter::{filter3x3, laplacian_filter, Kernel};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

/// Signed single-channel image holding raw filter responses
pub type SignedImage = Image<Luma<i16>>;

/// Direction of a first-order Sobel derivative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientDirection {
    /// d/dx, responds to vertical edges
    Horizontal,
    /// d/dy, responds to horizontal edges
    Vertical,
}

const LAPLACIAN_3: [i32; 9] = [2, 0, 2, 0, -8, 0, 2, 0, 2];

/// 3x3 Sobel derivative in one direction, border pixels replicated
pub fn sobel(image: &GrayImage, direction: GradientDirection) -> SignedImage {
    match direction {
        GradientDirection::Horizontal => horizontal_sobel(image),
        GradientDirection::Vertical => vertical_sobel(image),
    }
}

/// Laplacian with aperture 1, 3 or 5
pub fn laplacian(image: &GrayImage, ksize: u32) -> Result<SignedImage> {
    match ksize {
        1 => Ok(laplacian_filter(image)),
        3 => Ok(filter3x3::<_, i32, i16>(image, &LAPLACIAN_3)),
        5 => {
            let data = laplacian_5x5();
            let kernel = Kernel::new(&data, 5, 5);
            Ok(kernel.filter(image, |channel: &mut i16, acc: i32| {
                *channel = acc.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
            }))
        }
        other => bail!("Unsupported Laplacian kernel size: {} (expected 1, 3 or 5)", other),
    }
}

/// Sum of the 5-tap second-derivative Sobel kernels in x and y
fn laplacian_5x5() -> [i32; 25] {
    const SMOOTH: [i32; 5] = [1, 4, 6, 4, 1];
    const SECOND: [i32; 5] = [1, 0, -2, 0, 1];

    let mut kernel = [0i32; 25];
    for y in 0..5 {
        for x in 0..5 {
            kernel[y * 5 + x] = SMOOTH[y] * SECOND[x] + SECOND[y] * SMOOTH[x];
        }
    }
    kernel
}

/// Absolute value saturated to u8
pub fn abs_saturate(responses: &SignedImage) -> GrayImage {
    let (width, height) = responses.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let value = responses.get_pixel(x, y)[0].unsigned_abs().min(255);
        Luma([value as u8])
    })
}

/// Weighted sum `a * first + b * second`, rounded and saturated to u8
pub fn blend_weighted(first: &GrayImage, a: f32, second: &GrayImage, b: f32) -> Result<GrayImage> {
    if first.dimensions() != second.dimensions() {
        bail!(
            "Cannot blend images of different sizes: {:?} vs {:?}",
            first.dimensions(),
            second.dimensions()
        );
    }

    let (width, height) = first.dimensions();
    Ok(GrayImage::from_fn(width, height, |x, y| {
        let value = a * first.get_pixel(x, y)[0] as f32 + b * second.get_pixel(x, y)[0] as f32;
        Luma([value.round().clamp(0.0, 255.0) as u8])
    }))
}
