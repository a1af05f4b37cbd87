use rayon::prelude::*;

use crate::{
    effects::{Completed, Effect, FrameTicket, decode_checked, require_frames},
    foundation::{
        error::{FxError, FxResult},
        math::{lerp, scale_channel, to_channel},
    },
    frames::{frame::Frame, sequence::Inputs},
};

/// Where an output index falls in a cross-fade.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Region {
    /// Copy of `input1[index]`.
    Before {
        /// Index into the primary input.
        index: usize,
    },
    /// Both inputs contribute.
    Transition {
        /// Index into the primary input.
        first: usize,
        /// Index into the secondary input.
        second: usize,
        /// Transition progress: 0 at the first blended frame, approaching 1 at the last.
        t: f64,
    },
    /// Copy of `input2[index]`.
    After {
        /// Index into the secondary input.
        index: usize,
    },
}

/// Overlaps the end of the primary input with the start of the secondary one.
#[derive(Clone, Debug)]
pub struct CrossFade {
    duration_secs: f64,
    transition: usize,
    first_len: usize,
    dims: (u32, u32),
}

impl CrossFade {
    /// Transition length in seconds; converted to frames with the input frame rate.
    pub fn new(duration_secs: f64) -> Self {
        Self {
            duration_secs,
            transition: 0,
            first_len: 0,
            dims: (0, 0),
        }
    }

    /// Transition length in frames, as computed by the last `configure`.
    pub fn transition_frames(&self) -> usize {
        self.transition
    }

    /// Classify output `index`.
    pub fn region(&self, index: usize) -> Region {
        let start = self.first_len - self.transition;
        if index < start {
            Region::Before { index }
        } else if index >= self.first_len {
            Region::After {
                index: index - start,
            }
        } else {
            Region::Transition {
                first: index,
                second: index - start,
                t: (index - start) as f64 / self.transition as f64,
            }
        }
    }
}

impl Effect for CrossFade {
    fn name(&self) -> &'static str {
        "cross_fade"
    }

    fn configure(&mut self, inputs: &Inputs) -> FxResult<usize> {
        let first = inputs.primary();
        let second = inputs.secondary()?;
        let first_len = require_frames(first, "first input")?;
        let second_len = require_frames(second, "second input")?;
        let transition = inputs.fps().secs_to_frames_round(self.duration_secs)?;

        if transition > first_len.min(second_len) {
            return Err(FxError::config(format!(
                "cross-fade of {transition} frames is longer than an input ({first_len} and {second_len} frames)"
            )));
        }
        if first.dimensions() != second.dimensions() {
            let (a, b) = (first.dimensions(), second.dimensions());
            return Err(FxError::config(format!(
                "cross-fade inputs differ in size: {}x{} vs {}x{}",
                a.0, a.1, b.0, b.1
            )));
        }

        self.transition = transition;
        self.first_len = first_len;
        self.dims = first.dimensions();
        tracing::debug!(transition, first_len, second_len, "cross-fade configured");
        Ok(first_len + second_len - transition)
    }

    fn process_frame(&mut self, ticket: FrameTicket, inputs: &Inputs) -> FxResult<Completed> {
        let region = self.region(ticket.index());
        tracing::debug!(index = ticket.index(), ?region, "cross-fade frame");
        let frame = match region {
            Region::Before { index } => inputs.primary().frame(index)?,
            Region::After { index } => inputs.secondary()?.frame(index)?,
            Region::Transition { first, second, t } => {
                let second_src = inputs.secondary()?;
                let (a, b) = rayon::join(
                    || decode_checked(inputs.primary(), first, self.dims),
                    || decode_checked(second_src, second, self.dims),
                );
                additive_blend(&a?, &b?, lerp(1.0, 0.0, t), lerp(0.0, 1.0, t))?
            }
        };
        Ok(ticket.complete(frame))
    }
}

/// `out = b * mb + a * ma` on R,G,B; alpha comes from `b`.
///
/// `a * ma` is stored as an 8-bit value before `b`'s contribution is added, and the sum is
/// clamped. This is not a normalized blend.
pub(crate) fn additive_blend(a: &Frame, b: &Frame, ma: f64, mb: f64) -> FxResult<Frame> {
    if a.dimensions() != b.dimensions() {
        return Err(FxError::pipeline("additive_blend expects equal-size frames"));
    }
    let row_len = a.width() as usize * 4;
    let mut data = b.data().to_vec();
    data.par_chunks_exact_mut(row_len)
        .zip(a.data().par_chunks_exact(row_len))
        .for_each(|(out_row, a_row)| {
            for (o, s) in out_row.chunks_exact_mut(4).zip(a_row.chunks_exact(4)) {
                for c in 0..3 {
                    let base = scale_channel(s[c], ma);
                    o[c] = to_channel(f64::from(o[c]) * mb + f64::from(base));
                }
            }
        });
    Frame::new(b.width(), b.height(), data)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/crossfade.rs"]
mod tests;
