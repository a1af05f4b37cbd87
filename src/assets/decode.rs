use std::{
    io::Cursor,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;

use crate::{
    foundation::error::{FxError, FxResult},
    frames::{frame::Frame, sequence::FrameSource},
};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp"];

/// Decode one encoded image (PNG, JPEG, WebP, BMP) into a straight-alpha RGBA8 frame.
pub fn decode_frame(bytes: &[u8]) -> FxResult<Frame> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(Frame::from_rgba_image(dyn_img.to_rgba8()))
}

fn probe_dimensions(bytes: &[u8]) -> FxResult<(u32, u32)> {
    let dims = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("guess image format")?
        .into_dimensions()
        .context("read image dimensions")?;
    Ok(dims)
}

/// A sequence of still-encoded images, decoded lazily one frame at a time.
///
/// Dimensions are probed from the first image header; every decoded frame must match them.
#[derive(Clone, Debug)]
pub struct EncodedSequence {
    width: u32,
    height: u32,
    frames: Vec<Arc<[u8]>>,
}

impl EncodedSequence {
    /// Wrap encoded images in order.
    pub fn new(frames: Vec<Vec<u8>>) -> FxResult<Self> {
        let (width, height) = match frames.first() {
            Some(first) => probe_dimensions(first)
                .map_err(|e| FxError::decode(0, format!("unreadable image header: {e}")))?,
            None => (0, 0),
        };
        Ok(Self {
            width,
            height,
            frames: frames.into_iter().map(Arc::from).collect(),
        })
    }

    /// Load every image file in `dir`, ordered by file name.
    #[tracing::instrument]
    pub fn from_dir(dir: &Path) -> FxResult<Self> {
        let paths = list_image_files(dir)?;
        if paths.is_empty() {
            return Err(FxError::config(format!(
                "no image files found in '{}'",
                dir.display()
            )));
        }
        let mut frames = Vec::with_capacity(paths.len());
        for path in &paths {
            let bytes =
                std::fs::read(path).with_context(|| format!("read frame '{}'", path.display()))?;
            frames.push(bytes);
        }
        tracing::debug!(count = frames.len(), "loaded encoded frames");
        Self::new(frames)
    }
}

impl FrameSource for EncodedSequence {
    fn len(&self) -> usize {
        self.frames.len()
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame(&self, index: usize) -> FxResult<Frame> {
        let bytes = self.frames.get(index).ok_or_else(|| {
            FxError::decode(
                index,
                format!("index out of range for {} frames", self.frames.len()),
            )
        })?;
        let frame = decode_frame(bytes).map_err(|e| FxError::decode(index, e.to_string()))?;
        if frame.dimensions() != (self.width, self.height) {
            return Err(FxError::decode(
                index,
                format!(
                    "decoded {}x{}, expected {}x{}",
                    frame.width(),
                    frame.height(),
                    self.width,
                    self.height
                ),
            ));
        }
        Ok(frame)
    }
}

pub(crate) fn list_image_files(dir: &Path) -> FxResult<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read directory '{}'", dir.display()))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("read directory entry in '{}'", dir.display()))?
            .path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if is_image && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
