use std::collections::VecDeque;

use rayon::prelude::*;

use crate::{
    effects::{Completed, Effect, FrameTicket, decode_checked, require_frames},
    foundation::{
        error::{FxError, FxResult},
        math::to_channel,
    },
    frames::{frame::Frame, sequence::Inputs},
};

/// Averages each frame with the frames just before it.
///
/// Keeps a FIFO window of the last `blur_frames` decoded frames. The divisor is the
/// current window occupancy, so the first `blur_frames - 1` outputs average fewer frames.
#[derive(Clone, Debug)]
pub struct MotionBlur {
    blur_frames: usize,
    window: VecDeque<Frame>,
    dims: (u32, u32),
}

impl MotionBlur {
    /// Window size in frames. Must be at least 1.
    pub fn new(blur_frames: u32) -> Self {
        Self {
            blur_frames: blur_frames as usize,
            window: VecDeque::new(),
            dims: (0, 0),
        }
    }

    /// Number of frames currently held in the window.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    fn push(&mut self, frame: Frame) {
        self.window.push_back(frame);
        while self.window.len() > self.blur_frames {
            self.window.pop_front();
        }
    }
}

impl Effect for MotionBlur {
    fn name(&self) -> &'static str {
        "motion_blur"
    }

    fn configure(&mut self, inputs: &Inputs) -> FxResult<usize> {
        if self.blur_frames == 0 {
            return Err(FxError::config("motion blur window must be >= 1 frame"));
        }
        let len = require_frames(inputs.primary(), "input")?;
        self.dims = inputs.primary().dimensions();
        self.window = VecDeque::with_capacity(self.blur_frames);
        Ok(len)
    }

    fn process_frame(&mut self, ticket: FrameTicket, inputs: &Inputs) -> FxResult<Completed> {
        let frame = decode_checked(inputs.primary(), ticket.index(), self.dims)?;
        self.push(frame);
        let out = average_window(&self.window, self.dims)?;
        tracing::trace!(
            index = ticket.index(),
            window = self.window.len(),
            "motion blur frame"
        );
        Ok(ticket.complete(out))
    }
}

fn average_window(window: &VecDeque<Frame>, (width, height): (u32, u32)) -> FxResult<Frame> {
    let n = window.len();
    if n == 0 {
        return Err(FxError::pipeline("motion blur window is empty"));
    }
    let row_len = width as usize * 4;
    let mut data = vec![0u8; row_len * height as usize];
    let sources: Vec<&[u8]> = window.iter().map(Frame::data).collect();

    data.par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let row_start = y * row_len;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let off = row_start + x * 4;
                let mut sum = [0u32; 3];
                for src in &sources {
                    sum[0] += u32::from(src[off]);
                    sum[1] += u32::from(src[off + 1]);
                    sum[2] += u32::from(src[off + 2]);
                }
                for c in 0..3 {
                    px[c] = to_channel(f64::from(sum[c]) / n as f64);
                }
                px[3] = 255;
            }
        });

    Frame::new(width, height, data)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/motion_blur.rs"]
mod tests;
