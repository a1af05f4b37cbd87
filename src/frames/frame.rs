use std::sync::Arc;

use crate::foundation::error::{FxError, FxResult};

/// One decoded image: straight (non-premultiplied) RGBA8, row-major.
///
/// Pixel storage is shared, so cloning a `Frame` is a reference copy. Frames are never
/// mutated after construction; transforms always build a new one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Arc<[u8]>,
}

impl Frame {
    /// Wrap raw RGBA8 pixels. `data.len()` must equal `width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> FxResult<Self> {
        let expected = rgba_len(width, height)?;
        if data.len() != expected {
            return Err(FxError::config(format!(
                "frame data length {} does not match {width}x{height}x4 = {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data: data.into(),
        })
    }

    /// A frame where every pixel is `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> FxResult<Self> {
        let len = rgba_len(width, height)?;
        Self::new(width, height, rgba.repeat(len / 4))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGBA quadruple at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// `true` when both frames share the same pixel storage.
    pub fn shares_pixels_with(&self, other: &Frame) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Copy the pixels into an [`image::RgbaImage`] for resampling.
    pub fn to_rgba_image(&self) -> FxResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data.to_vec())
            .ok_or_else(|| FxError::pipeline("frame buffer does not fit its dimensions"))
    }

    /// Take ownership of an [`image::RgbaImage`].
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw().into(),
        }
    }
}

pub(crate) fn rgba_len(width: u32, height: u32) -> FxResult<usize> {
    if width == 0 || height == 0 {
        return Err(FxError::config("frame width/height must be non-zero"));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| FxError::config("frame buffer size overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/frames/frame.rs"]
mod tests;
