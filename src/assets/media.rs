use std::path::{Path, PathBuf};

use crate::{
    foundation::{
        core::Fps,
        error::{FxError, FxResult},
    },
    frames::sequence::FrameSequence,
};

/// Stream metadata reported by `ffprobe` for a source video.
#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    /// Path that was probed.
    pub source_path: PathBuf,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Source frame rate.
    pub fps: Fps,
    /// Container duration in seconds (0 when unknown).
    pub duration_sec: f64,
}

impl VideoSourceInfo {
    /// Approximate frame count derived from duration and frame rate.
    pub fn estimated_frames(&self) -> usize {
        (self.duration_sec * self.fps.as_f64()).round().max(0.0) as usize
    }
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    std::process::Command::new("ffprobe")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Probe a video file with `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path) -> FxResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| FxError::config(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(FxError::config(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| FxError::serde(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| FxError::config("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| FxError::config("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| FxError::config("missing video height from ffprobe"))?;
    let fps = Fps::parse(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps,
        duration_sec,
    })
}

/// Probe a video file with `ffprobe`.
#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe_video(_source_path: &Path) -> FxResult<VideoSourceInfo> {
    Err(FxError::config(
        "video inputs require the 'media-ffmpeg' feature",
    ))
}

/// Decode every frame of a video into memory as straight RGBA8.
///
/// Returns the frames and the source frame rate.
#[cfg(feature = "media-ffmpeg")]
#[tracing::instrument]
pub fn decode_video(source_path: &Path) -> FxResult<(FrameSequence, Fps)> {
    let info = probe_video(source_path)?;

    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(source_path)
        .args(["-an", "-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
        .output()
        .map_err(|e| FxError::config(format!("failed to run ffmpeg for video decode: {e}")))?;
    if !out.status.success() {
        return Err(FxError::decode(
            0,
            format!(
                "ffmpeg video decode failed for '{}': {}",
                source_path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }

    let frames = split_raw_frames(&out.stdout, info.width, info.height)?;
    tracing::info!(
        frames = frames.len(),
        width = info.width,
        height = info.height,
        fps = %info.fps,
        "decoded video"
    );
    Ok((FrameSequence::new(frames)?, info.fps))
}

/// Decode every frame of a video into memory as straight RGBA8.
#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_video(_source_path: &Path) -> FxResult<(FrameSequence, Fps)> {
    Err(FxError::config(
        "video inputs require the 'media-ffmpeg' feature",
    ))
}

#[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
pub(crate) fn split_raw_frames(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> FxResult<Vec<crate::Frame>> {
    let frame_len = crate::frames::frame::rgba_len(width, height)?;
    if !bytes.len().is_multiple_of(frame_len) {
        return Err(FxError::decode(
            bytes.len() / frame_len,
            format!(
                "raw video stream has {} trailing bytes (frame size {frame_len})",
                bytes.len() % frame_len
            ),
        ));
    }
    bytes
        .chunks_exact(frame_len)
        .map(|chunk| crate::Frame::new(width, height, chunk.to_vec()))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
