use image::imageops::{self, FilterType};
use rand::{Rng as _, SeedableRng as _, rngs::StdRng};

use crate::{
    effects::{Completed, Effect, FrameTicket, decode_checked, require_frames},
    foundation::error::{FxError, FxResult},
    frames::{frame::Frame, sequence::Inputs},
};

/// Source rectangle sampled for one jittered frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge in source pixels.
    pub x: u32,
    /// Top edge in source pixels.
    pub y: u32,
    /// Crop width (`W - 2S`).
    pub width: u32,
    /// Crop height (`H - 2S`).
    pub height: u32,
}

/// "Earthquake" shake: every frame is a randomly placed crop stretched back to full size.
#[derive(Debug)]
pub struct Jitter {
    strength: u32,
    seed: Option<u64>,
    rng: Option<StdRng>,
    dims: (u32, u32),
}

impl Jitter {
    /// Shake strength in pixels; `seed` makes the offsets reproducible.
    pub fn new(strength: u32, seed: Option<u64>) -> Self {
        Self {
            strength,
            seed,
            rng: None,
            dims: (0, 0),
        }
    }

    /// Draw the crop for the next frame. Offsets are whole pixels, uniform in `[0, 2S)`.
    pub fn next_crop(&mut self) -> FxResult<CropRect> {
        let rng = self
            .rng
            .as_mut()
            .ok_or_else(|| FxError::pipeline("jitter used before configure"))?;
        let span = 2 * self.strength;
        let (x, y) = if span == 0 {
            (0, 0)
        } else {
            (rng.random_range(0..span), rng.random_range(0..span))
        };
        Ok(CropRect {
            x,
            y,
            width: self.dims.0 - span,
            height: self.dims.1 - span,
        })
    }
}

impl Effect for Jitter {
    fn name(&self) -> &'static str {
        "jitter"
    }

    fn configure(&mut self, inputs: &Inputs) -> FxResult<usize> {
        let len = require_frames(inputs.primary(), "input")?;
        let (w, h) = inputs.primary().dimensions();
        if u64::from(self.strength) * 2 >= u64::from(w.min(h)) {
            return Err(FxError::config(format!(
                "jitter strength {} must be less than half of min({w}, {h})",
                self.strength
            )));
        }
        self.dims = (w, h);
        self.rng = Some(match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        });
        Ok(len)
    }

    fn process_frame(&mut self, ticket: FrameTicket, inputs: &Inputs) -> FxResult<Completed> {
        let crop = self.next_crop()?;
        let src = decode_checked(inputs.primary(), ticket.index(), self.dims)?;
        if self.strength == 0 {
            return Ok(ticket.complete(src));
        }
        tracing::trace!(index = ticket.index(), x = crop.x, y = crop.y, "jitter crop");

        let img = src.to_rgba_image()?;
        let cropped = imageops::crop_imm(&img, crop.x, crop.y, crop.width, crop.height).to_image();
        let stretched = imageops::resize(&cropped, self.dims.0, self.dims.1, FilterType::Triangle);
        Ok(ticket.complete(Frame::from_rgba_image(stretched)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/jitter.rs"]
mod tests;
