use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::{
        core::Fps,
        error::{FxError, FxResult},
    },
    frames::sequence::FrameSequence,
};

/// Consumes the completed output sequence once, after the last frame completes.
pub trait OutputAssembler: Send {
    /// What a successful assembly produces.
    type Artifact: Send;

    /// Turn the finished frames into an artifact. An error fails the run.
    fn assemble(&mut self, frames: FrameSequence, fps: Fps) -> FxResult<Self::Artifact>;
}

/// Hands the output sequence back unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct CollectFrames;

impl OutputAssembler for CollectFrames {
    type Artifact = FrameSequence;

    fn assemble(&mut self, frames: FrameSequence, _fps: Fps) -> FxResult<FrameSequence> {
        Ok(frames)
    }
}

/// Writes `frame_00000.png`, `frame_00001.png`, ... into a directory.
#[derive(Clone, Debug)]
pub struct PngSequenceAssembler {
    dir: PathBuf,
}

impl PngSequenceAssembler {
    /// Write into `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputAssembler for PngSequenceAssembler {
    type Artifact = Vec<PathBuf>;

    #[tracing::instrument(skip_all, fields(dir = %self.dir.display(), frames = frames.len()))]
    fn assemble(&mut self, frames: FrameSequence, _fps: Fps) -> FxResult<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;

        let mut written = Vec::with_capacity(frames.len());
        for (i, frame) in frames.iter().enumerate() {
            let path = self.dir.join(format!("frame_{i:05}.png"));
            image::save_buffer_with_format(
                &path,
                frame.data(),
                frame.width(),
                frame.height(),
                image::ColorType::Rgba8,
                image::ImageFormat::Png,
            )
            .map_err(|e| FxError::encode(format!("write png '{}': {e}", path.display())))?;
            written.push(path);
        }
        tracing::debug!(count = written.len(), "png sequence written");
        Ok(written)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/assembler.rs"]
mod tests;
