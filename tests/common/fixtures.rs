#![allow(dead_code)]

use image::{GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// A colour photograph stand-in with strong edges: dark background, bright square
pub fn textured_image(width: u32, height: u32, shade: u8) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let inside = x > width / 4 && x < 3 * width / 4 && y > height / 4 && y < 3 * height / 4;
        if inside {
            Rgb([250, 250, shade])
        } else {
            Rgb([10, shade / 2, 10])
        }
    })
}

/// Uniform grayscale image
pub fn flat_image(width: u32, height: u32, value: u8) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([value]))
}

/// Dark left half, `high` from column `at` onwards; every row identical
pub fn vertical_step(width: u32, height: u32, at: u32, low: u8, high: u8) -> GrayImage {
    GrayImage::from_fn(width, height, |x, _| Luma([if x < at { low } else { high }]))
}

/// Save as JPEG regardless of the extension's case
pub fn write_jpeg(path: &Path, img: &RgbImage) {
    std::fs::create_dir_all(path.parent().expect("path has a parent")).expect("Failed to create directory");
    img.save_with_format(path, ImageFormat::Jpeg)
        .expect("Failed to save test image");
}

pub fn write_png(path: &Path, img: &RgbImage) {
    std::fs::create_dir_all(path.parent().expect("path has a parent")).expect("Failed to create directory");
    img.save_with_format(path, ImageFormat::Png)
        .expect("Failed to save test image");
}

/// A file with an image extension but garbage contents
pub fn write_corrupt(path: &Path) {
    std::fs::create_dir_all(path.parent().expect("path has a parent")).expect("Failed to create directory");
    std::fs::write(path, b"\xFF\xD8\xFF\xE0 definitely not a jpeg").expect("Failed to write file");
}

/// Creates `<root>/<category>/<file>` JPEGs; returns the written paths
pub fn create_category(root: &Path, category: &str, files: &[&str]) -> Vec<PathBuf> {
    files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let path = root.join(category).join(file);
            write_jpeg(&path, &textured_image(48 + 8 * i as u32, 40, (i as u8).wrapping_mul(30)));
            path
        })
        .collect()
}

/// Sorted file names directly inside `dir`
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
