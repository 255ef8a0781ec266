use std::path::{Path, PathBuf};
use image::{GrayImage, RgbImage, RgbaImage};

use crate::model::{DecodedImage, PixelFormat, TextureHandle, TextureUpload};

/// Stands in for the GPU: hands out sequential handles and records what the
/// registry asked of it.
#[derive(Debug, Default)]
pub struct RecordingUploader {
    pub uploads: Vec<(String, u32, u32, PixelFormat)>,
    pub bound: Vec<(usize, TextureHandle)>,
    pub released: Vec<TextureHandle>,
    next_handle: u32,
}

impl TextureUpload for RecordingUploader {
    fn upload(&mut self, image: &DecodedImage, label: &str) -> TextureHandle {
        self.next_handle += 1;
        self.uploads
            .push((label.to_string(), image.width(), image.height(), image.format()));
        TextureHandle(self.next_handle)
    }

    fn bind(&mut self, slot: usize, handle: TextureHandle) {
        self.bound.push((slot, handle));
    }

    fn release(&mut self, handle: TextureHandle) {
        self.released.push(handle);
    }
}

pub fn write_rgb_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30]))
        .save(&path)
        .unwrap();
    path
}

pub fn write_rgba_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 128]))
        .save(&path)
        .unwrap();
    path
}

pub fn write_gray_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    GrayImage::from_pixel(width, height, image::Luma([77]))
        .save(&path)
        .unwrap();
    path
}
