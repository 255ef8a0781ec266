use std::path::Path;
use image::{imageops::FilterType, DynamicImage, GenericImageView, RgbaImage};

use crate::error::TextureError;

/// Texture units available to the scene shader.
pub const MAX_TEXTURE_SLOTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn channels(self) -> u8 {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// Decoded pixels ready for upload. Rows are stored bottom-up so that
/// v = 0 samples the bottom edge of the source picture.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    image: DynamicImage,
}

impl DecodedImage {
    pub fn decode(path: &Path) -> Result<Self, TextureError> {
        let image = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_dynamic(image, path)
    }

    pub fn from_dynamic(image: DynamicImage, path: &Path) -> Result<Self, TextureError> {
        let image = match image.color().channel_count() {
            3 => DynamicImage::ImageRgb8(image.flipv().to_rgb8()),
            4 => DynamicImage::ImageRgba8(image.flipv().to_rgba8()),
            channels => {
                return Err(TextureError::UnsupportedChannels {
                    path: path.to_path_buf(),
                    channels,
                })
            }
        };
        Ok(Self { image })
    }

    pub fn from_rgba(image: RgbaImage) -> Self {
        Self {
            image: DynamicImage::ImageRgba8(image),
        }
    }

    /// Grey checkerboard used in place of a texture that could not be loaded.
    pub fn checkerboard(size: u32, squares_per_side: u32) -> Self {
        let square_size = (size / squares_per_side.max(1)).max(1);
        let image = RgbaImage::from_fn(size, size, |x, y| {
            let is_light = (x / square_size + y / square_size) % 2 == 0;
            if is_light {
                image::Rgba([200, 200, 200, 255])
            } else {
                image::Rgba([120, 120, 120, 255])
            }
        });
        Self::from_rgba(image)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn format(&self) -> PixelFormat {
        match self.image {
            DynamicImage::ImageRgb8(_) => PixelFormat::Rgb8,
            _ => PixelFormat::Rgba8,
        }
    }

    pub fn pixels(&self) -> &[u8] {
        self.image.as_bytes()
    }

    pub fn to_rgba8(&self) -> RgbaImage {
        self.image.to_rgba8()
    }

    pub fn mip_level_count(&self) -> u32 {
        let largest = self.width().max(self.height()).max(1);
        u32::BITS - largest.leading_zeros()
    }

    /// Full mip chain, level 0 first, halving each axis down to 1x1.
    pub fn mip_chain(&self) -> Vec<RgbaImage> {
        let mut levels = vec![self.to_rgba8()];
        loop {
            let previous = &levels[levels.len() - 1];
            let (width, height) = previous.dimensions();
            if width <= 1 && height <= 1 {
                break;
            }
            let next = image::imageops::resize(
                previous,
                (width / 2).max(1),
                (height / 2).max(1),
                FilterType::Triangle,
            );
            levels.push(next);
        }
        levels
    }
}

/// Opaque identifier of an uploaded texture, issued by a [`TextureUpload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// GPU side of the texture registry.
pub trait TextureUpload {
    fn upload(&mut self, image: &DecodedImage, label: &str) -> TextureHandle;
    fn bind(&mut self, slot: usize, handle: TextureHandle);
    fn release(&mut self, handle: TextureHandle);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureEntry {
    pub tag: String,
    pub handle: TextureHandle,
}

/// Tagged textures in load order. An entry's index is the texture unit it is
/// bound to by [`TextureRegistry::bind_all`].
#[derive(Debug, Default)]
pub struct TextureRegistry {
    entries: Vec<TextureEntry>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(
        &mut self,
        path: &Path,
        tag: &str,
        uploader: &mut impl TextureUpload,
    ) -> Result<TextureHandle, TextureError> {
        self.ensure_free_slot(tag)?;

        let image = DecodedImage::decode(path).map_err(|e| {
            log::error!("Could not load image: {}", e);
            e
        })?;
        log::info!(
            "Loaded image {}: width {}, height {}, channels {}",
            path.display(),
            image.width(),
            image.height(),
            image.format().channels()
        );

        self.register(tag, &image, uploader)
    }

    pub fn register(
        &mut self,
        tag: &str,
        image: &DecodedImage,
        uploader: &mut impl TextureUpload,
    ) -> Result<TextureHandle, TextureError> {
        self.ensure_free_slot(tag)?;

        let handle = uploader.upload(image, tag);
        self.entries.push(TextureEntry {
            tag: tag.to_string(),
            handle,
        });
        Ok(handle)
    }

    pub fn find_handle(&self, tag: &str) -> Option<TextureHandle> {
        self.entries
            .iter()
            .find(|entry| entry.tag == tag)
            .map(|entry| entry.handle)
    }

    pub fn find_slot(&self, tag: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.tag == tag)
    }

    pub fn bind_all(&self, uploader: &mut impl TextureUpload) {
        for (slot, entry) in self.entries.iter().enumerate() {
            uploader.bind(slot, entry.handle);
        }
    }

    pub fn release_all(&mut self, uploader: &mut impl TextureUpload) {
        for entry in self.entries.drain(..) {
            uploader.release(entry.handle);
        }
    }

    pub fn entries(&self) -> &[TextureEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ensure_free_slot(&self, tag: &str) -> Result<(), TextureError> {
        if self.entries.len() >= MAX_TEXTURE_SLOTS {
            return Err(TextureError::SlotsExhausted {
                tag: tag.to_string(),
                max: MAX_TEXTURE_SLOTS,
            });
        }
        Ok(())
    }
}

pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &DecodedImage,
        label: Option<&str>,
    ) -> Self {
        let levels = image.mip_chain();

        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, pixels) in levels.iter().enumerate() {
            write_mip_level(queue, &texture, level as u32, pixels);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Scene Texture Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

fn write_mip_level(queue: &wgpu::Queue, texture: &wgpu::Texture, level: u32, pixels: &RgbaImage) {
    let (width, height) = pixels.dimensions();
    let bytes_per_row = width * 4;
    let aligned_bytes_per_row = (bytes_per_row + 255) & !255;
    let mut aligned_data = vec![0u8; aligned_bytes_per_row as usize * height as usize];

    let raw = pixels.as_raw();
    for y in 0..height {
        let src_start = (y * bytes_per_row) as usize;
        let src_end = src_start + bytes_per_row as usize;
        let dst_start = (y * aligned_bytes_per_row) as usize;
        let dst_end = dst_start + bytes_per_row as usize;
        aligned_data[dst_start..dst_end].copy_from_slice(&raw[src_start..src_end]);
    }

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: level,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &aligned_data,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(aligned_bytes_per_row),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}
