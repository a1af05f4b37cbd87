use std::sync::Arc;

use crate::{
    foundation::{
        core::Fps,
        error::{FxError, FxResult},
    },
    frames::frame::Frame,
};

/// Ordered, fixed-length, 0-indexed collection of decoded frames of equal size.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    /// Build a sequence. All frames must share the same dimensions.
    pub fn new(frames: Vec<Frame>) -> FxResult<Self> {
        if let Some(first) = frames.first() {
            let dims = first.dimensions();
            if let Some((i, f)) = frames
                .iter()
                .enumerate()
                .find(|(_, f)| f.dimensions() != dims)
            {
                return Err(FxError::config(format!(
                    "frame {i} is {}x{}, expected {}x{}",
                    f.width(),
                    f.height(),
                    dims.0,
                    dims.1
                )));
            }
        }
        Ok(Self { frames })
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when the sequence holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame at `index`.
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Borrow all frames in order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Iterate frames in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Frame dimensions, or `None` for an empty sequence.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.frames.first().map(Frame::dimensions)
    }

    /// Unwrap into the underlying frames.
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Decoder-side view of an input: a fixed-length, indexable source of frames.
///
/// `frame` is the per-frame decode step. It may be slow (lazy image decode, IO) and
/// may fail; a failure is fatal to the run that requested it.
pub trait FrameSource: Send + Sync {
    /// Number of frames in the source.
    fn len(&self) -> usize;

    /// `true` when the source has no frames.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensions every decoded frame is expected to have. `(0, 0)` when empty.
    fn dimensions(&self) -> (u32, u32);

    /// Decode frame `index`.
    fn frame(&self, index: usize) -> FxResult<Frame>;
}

impl FrameSource for FrameSequence {
    fn len(&self) -> usize {
        self.frames.len()
    }

    fn dimensions(&self) -> (u32, u32) {
        FrameSequence::dimensions(self).unwrap_or((0, 0))
    }

    fn frame(&self, index: usize) -> FxResult<Frame> {
        self.frames.get(index).cloned().ok_or_else(|| {
            FxError::decode(
                index,
                format!("index out of range for {} frames", self.frames.len()),
            )
        })
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn frame(&self, index: usize) -> FxResult<Frame> {
        (**self).frame(index)
    }
}

/// The sources a run reads from, plus the frame rate used for second-based parameters.
#[derive(Clone)]
pub struct Inputs {
    primary: Arc<dyn FrameSource>,
    secondary: Option<Arc<dyn FrameSource>>,
    fps: Fps,
}

impl Inputs {
    /// Inputs with only a primary source.
    pub fn new(primary: impl FrameSource + 'static, fps: Fps) -> Self {
        Self {
            primary: Arc::new(primary),
            secondary: None,
            fps,
        }
    }

    /// Attach the secondary source (required by cross-fade).
    pub fn with_secondary(mut self, secondary: impl FrameSource + 'static) -> Self {
        self.secondary = Some(Arc::new(secondary));
        self
    }

    /// Primary source (`input1`).
    pub fn primary(&self) -> &dyn FrameSource {
        self.primary.as_ref()
    }

    /// Secondary source (`input2`), or a configuration error when it was not supplied.
    pub fn secondary(&self) -> FxResult<&dyn FrameSource> {
        self.secondary
            .as_deref()
            .ok_or_else(|| FxError::config("this effect requires a second input"))
    }

    /// Frame rate of the inputs.
    pub fn fps(&self) -> Fps {
        self.fps
    }
}

impl std::fmt::Debug for Inputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inputs")
            .field("primary_len", &self.primary.len())
            .field("secondary_len", &self.secondary.as_ref().map(|s| s.len()))
            .field("fps", &self.fps)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frames/sequence.rs"]
mod tests;
