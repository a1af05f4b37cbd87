use rayon::prelude::*;

use crate::{
    effects::{Completed, Effect, FrameTicket, decode_checked, require_frames},
    foundation::{
        error::FxResult,
        math::{lerp, scale_channel},
    },
    frames::{frame::Frame, sequence::Inputs},
};

/// Fades the primary input in from black and back out to black.
#[derive(Clone, Debug)]
pub struct FadeInOut {
    fade_in_secs: f64,
    fade_out_secs: f64,
    fade_in_frames: usize,
    fade_out_frames: usize,
    output_duration: usize,
    dims: (u32, u32),
}

impl FadeInOut {
    /// Fade durations in seconds; converted to frames with the input frame rate.
    pub fn new(fade_in_secs: f64, fade_out_secs: f64) -> Self {
        Self {
            fade_in_secs,
            fade_out_secs,
            fade_in_frames: 0,
            fade_out_frames: 0,
            output_duration: 0,
            dims: (0, 0),
        }
    }

    /// `(fade_in, fade_out)` in frames, as computed by the last `configure`.
    pub fn fade_frames(&self) -> (usize, usize) {
        (self.fade_in_frames, self.fade_out_frames)
    }

    /// Brightness multiplier for output `index` under the current configuration.
    pub fn multiplier(&self, index: usize) -> f64 {
        fade_multiplier(
            index,
            self.output_duration,
            self.fade_in_frames,
            self.fade_out_frames,
        )
    }
}

/// Ramp 0→1 over `[0, fade_in)`, 1→0 once `index > duration - fade_out`, 1 in between.
///
/// The fade-out ramp is anchored at `duration - fade_out - 1` so the last frame is black.
pub(crate) fn fade_multiplier(
    index: usize,
    duration: usize,
    fade_in: usize,
    fade_out: usize,
) -> f64 {
    let i = index as f64;
    let d = duration as f64;
    let fin = fade_in as f64;
    let fout = fade_out as f64;

    if index < fade_in {
        lerp(0.0, 1.0, i / fin)
    } else if i > d - fout {
        let x0 = d - fout - 1.0;
        let t = (i - x0) / ((d - 1.0) - x0);
        lerp(1.0, 0.0, t)
    } else {
        1.0
    }
}

impl Effect for FadeInOut {
    fn name(&self) -> &'static str {
        "fade_in_out"
    }

    fn configure(&mut self, inputs: &Inputs) -> FxResult<usize> {
        let fps = inputs.fps();
        self.fade_in_frames = fps.secs_to_frames_round(self.fade_in_secs)?;
        self.fade_out_frames = fps.secs_to_frames_round(self.fade_out_secs)?;
        self.output_duration = require_frames(inputs.primary(), "input")?;
        self.dims = inputs.primary().dimensions();
        tracing::debug!(
            fade_in = self.fade_in_frames,
            fade_out = self.fade_out_frames,
            "fade configured"
        );
        Ok(self.output_duration)
    }

    fn process_frame(&mut self, ticket: FrameTicket, inputs: &Inputs) -> FxResult<Completed> {
        let m = self.multiplier(ticket.index());
        let src = decode_checked(inputs.primary(), ticket.index(), self.dims)?;
        if m == 1.0 {
            return Ok(ticket.complete(src));
        }
        let out = scale_rgb(&src, m)?;
        Ok(ticket.complete(out))
    }
}

fn scale_rgb(src: &Frame, m: f64) -> FxResult<Frame> {
    let mut data = src.data().to_vec();
    let row_len = src.width() as usize * 4;
    data.par_chunks_exact_mut(row_len).for_each(|row| {
        for px in row.chunks_exact_mut(4) {
            px[0] = scale_channel(px[0], m);
            px[1] = scale_channel(px[1], m);
            px[2] = scale_channel(px[2], m);
        }
    });
    Frame::new(src.width(), src.height(), data)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/fade.rs"]
mod tests;
