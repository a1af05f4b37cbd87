use crate::foundation::error::{FxError, FxResult};

/// Rational frame rate supplied by the decoder.
///
/// Used to convert user-facing durations (seconds) into frame counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds). Must be > 0.
    pub den: u32,
}

impl Fps {
    /// Build a validated frame rate.
    pub fn new(num: u32, den: u32) -> FxResult<Self> {
        if den == 0 {
            return Err(FxError::config("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(FxError::config("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Parse an ffmpeg-style ratio (`"30000/1001"`) or a plain integer (`"25"`).
    pub fn parse(s: &str) -> FxResult<Self> {
        let s = s.trim();
        let (num, den) = match s.split_once('/') {
            Some((a, b)) => (a.trim(), b.trim()),
            None => (s, "1"),
        };
        let num = num
            .parse::<u32>()
            .map_err(|_| FxError::config(format!("invalid frame rate '{s}'")))?;
        let den = den
            .parse::<u32>()
            .map_err(|_| FxError::config(format!("invalid frame rate '{s}'")))?;
        Self::new(num, den)
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert a frame count into seconds.
    pub fn frames_to_secs(self, frames: usize) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds into a whole number of frames, rounding half up.
    ///
    /// Negative or non-finite durations are configuration errors.
    pub fn secs_to_frames_round(self, secs: f64) -> FxResult<usize> {
        if !secs.is_finite() {
            return Err(FxError::config("duration must be finite"));
        }
        if secs < 0.0 {
            return Err(FxError::config("duration must be >= 0"));
        }
        let frames = (secs * self.as_f64() + 0.5).floor();
        if frames > usize::MAX as f64 {
            return Err(FxError::config("duration is out of range"));
        }
        Ok(frames as usize)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

impl std::fmt::Display for Fps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
