use serde::{Deserialize, Serialize};

use crate::{
    effects::{
        Effect, crossfade::CrossFade, fade::FadeInOut, jitter::Jitter, motion_blur::MotionBlur,
        reverse::Reverse,
    },
    foundation::error::{FxError, FxResult},
};

/// Untyped effect request: a kind name plus a JSON object of parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectInstance {
    /// Effect name, e.g. `fadeInOut` or `earthquake`.
    pub kind: String,
    /// Parameter object. Missing means no parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl EffectInstance {
    /// Pair a kind with its parameters.
    pub fn new(kind: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            params,
        }
    }
}

/// Validated effect parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectSpec {
    /// Play the input backwards.
    Reverse,
    /// Ramp from black at the start and back to black at the end.
    FadeInOut {
        /// Fade-in length in seconds.
        fade_in_secs: f64,
        /// Fade-out length in seconds.
        fade_out_secs: f64,
    },
    /// Average each frame with up to `blur_frames - 1` predecessors.
    MotionBlur {
        /// Window size in frames, at least 1.
        blur_frames: u32,
    },
    /// Randomly shifted crop stretched back to full size.
    Jitter {
        /// Maximum shift in pixels.
        strength: u32,
        /// RNG seed. `None` seeds from the OS.
        seed: Option<u64>,
    },
    /// Blend the tail of the first input into the head of the second.
    CrossFade {
        /// Overlap length in seconds.
        duration_secs: f64,
    },
}

impl EffectSpec {
    /// Whether the effect reads a second input.
    pub fn requires_secondary(&self) -> bool {
        matches!(self, Self::CrossFade { .. })
    }
}

/// Validate an [`EffectInstance`] into an [`EffectSpec`].
///
/// Kind names are matched case-insensitively with `_` and `-` ignored, so `fadeInOut`,
/// `fade_in_out` and `fade-in-out` are the same effect. `earthquake` is an alias for
/// `jitter`. Parameters may be JSON numbers or numeric strings.
pub fn parse_effect(inst: &EffectInstance) -> FxResult<EffectSpec> {
    let kind: String = inst
        .kind
        .trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect();
    if kind.is_empty() {
        return Err(FxError::config("effect kind must be non-empty"));
    }

    let p = &inst.params;
    match kind.as_str() {
        "reverse" => Ok(EffectSpec::Reverse),
        "fadeinout" | "fade" => Ok(EffectSpec::FadeInOut {
            fade_in_secs: get_secs(p, "fade_in_secs")?,
            fade_out_secs: get_secs(p, "fade_out_secs")?,
        }),
        "motionblur" => {
            let blur_frames = get_u32(p, "blur_frames")?;
            if blur_frames == 0 {
                return Err(FxError::config("MotionBlur.blur_frames must be >= 1"));
            }
            Ok(EffectSpec::MotionBlur { blur_frames })
        }
        "jitter" | "earthquake" => Ok(EffectSpec::Jitter {
            strength: get_u32(p, "strength")?,
            seed: match p.get("seed") {
                Some(serde_json::Value::Null) | None => None,
                Some(_) => Some(get_u64(p, "seed")?),
            },
        }),
        "crossfade" => Ok(EffectSpec::CrossFade {
            duration_secs: get_secs(p, "duration_secs")?,
        }),
        _ => Err(FxError::config(format!(
            "unknown effect kind '{}'",
            inst.kind
        ))),
    }
}

/// Construct a fresh, unconfigured effect.
pub fn build_effect(spec: &EffectSpec) -> Box<dyn Effect> {
    match *spec {
        EffectSpec::Reverse => Box::new(Reverse::new()),
        EffectSpec::FadeInOut {
            fade_in_secs,
            fade_out_secs,
        } => Box::new(FadeInOut::new(fade_in_secs, fade_out_secs)),
        EffectSpec::MotionBlur { blur_frames } => Box::new(MotionBlur::new(blur_frames)),
        EffectSpec::Jitter { strength, seed } => Box::new(Jitter::new(strength, seed)),
        EffectSpec::CrossFade { duration_secs } => Box::new(CrossFade::new(duration_secs)),
    }
}

fn get_number(obj: &serde_json::Value, key: &str) -> FxResult<f64> {
    let Some(v) = obj.get(key) else {
        return Err(FxError::config(format!("missing effect param '{key}'")));
    };
    let n = match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
        .ok_or_else(|| FxError::config(format!("effect param '{key}' must be a number")))
}

fn get_secs(obj: &serde_json::Value, key: &str) -> FxResult<f64> {
    let n = get_number(obj, key)?;
    if n < 0.0 {
        return Err(FxError::config(format!("effect param '{key}' must be >= 0")));
    }
    Ok(n)
}

fn get_u64(obj: &serde_json::Value, key: &str) -> FxResult<u64> {
    if let Some(n) = obj.get(key).and_then(serde_json::Value::as_u64) {
        return Ok(n);
    }
    let n = get_number(obj, key)?;
    if n < 0.0 || n.fract() != 0.0 || n > u64::MAX as f64 {
        return Err(FxError::config(format!(
            "effect param '{key}' must be a non-negative integer"
        )));
    }
    Ok(n as u64)
}

fn get_u32(obj: &serde_json::Value, key: &str) -> FxResult<u32> {
    let n = get_u64(obj, key)?;
    u32::try_from(n)
        .map_err(|_| FxError::config(format!("effect param '{key}' is out of range")))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/spec.rs"]
mod tests;
