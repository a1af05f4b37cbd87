use std::{
    io::Read as _,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::{
    encode::assembler::OutputAssembler,
    foundation::{
        core::Fps,
        error::{FxError, FxResult},
        math::mul_div255_u16,
    },
    frames::{frame::Frame, sequence::FrameSequence},
};

/// Settings for one MP4 encode.
#[derive(Clone, Debug)]
pub struct EncodeConfig {
    /// Output width in pixels. Must be even.
    pub width: u32,
    /// Output height in pixels. Must be even.
    pub height: u32,
    /// Output frame rate.
    pub fps: Fps,
    /// Destination `.mp4` path.
    pub out_path: PathBuf,
    /// Replace `out_path` if it exists.
    pub overwrite: bool,
}

impl EncodeConfig {
    /// Check dimensions and frame rate before spawning `ffmpeg`.
    pub fn validate(&self) -> FxResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FxError::config("encode width/height must be non-zero"));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(FxError::config("encode fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(FxError::config(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

/// Encodes the output sequence to H.264 MP4 through the system `ffmpeg` binary.
///
/// Frames carry straight alpha and are flattened over `bg_rgba` before encoding.
#[derive(Clone, Debug)]
pub struct Mp4Assembler {
    out_path: PathBuf,
    overwrite: bool,
    bg_rgba: [u8; 4],
}

impl Mp4Assembler {
    /// Encode to `out_path`, overwriting it, over an opaque black background.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }

    /// Whether an existing output file may be replaced.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Background the straight-alpha frames are flattened over.
    pub fn background(mut self, bg_rgba: [u8; 4]) -> Self {
        self.bg_rgba = bg_rgba;
        self
    }
}

impl OutputAssembler for Mp4Assembler {
    type Artifact = PathBuf;

    #[tracing::instrument(skip_all, fields(out = %self.out_path.display(), frames = frames.len()))]
    fn assemble(&mut self, frames: FrameSequence, fps: Fps) -> FxResult<PathBuf> {
        let Some((width, height)) = frames.dimensions() else {
            return Err(FxError::encode("cannot encode an empty sequence"));
        };
        let cfg = EncodeConfig {
            width,
            height,
            fps,
            out_path: self.out_path.clone(),
            overwrite: self.overwrite,
        };

        let mut enc = FfmpegEncoder::spawn(cfg, self.bg_rgba)?;
        for frame in &frames {
            enc.push_frame(frame)?;
        }
        enc.finish()?;
        tracing::info!("mp4 written");
        Ok(self.out_path.clone())
    }
}

struct FfmpegEncoder {
    cfg: EncodeConfig,
    bg_rgba: [u8; 4],
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    scratch: Vec<u8>,
}

impl FfmpegEncoder {
    fn spawn(cfg: EncodeConfig, bg_rgba: [u8; 4]) -> FxResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;
        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(FxError::config(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(FxError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if cfg.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            // Input rate goes before `-i` for rawvideo.
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            FxError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| FxError::encode("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| FxError::encode("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        Ok(Self {
            scratch: vec![0u8; cfg.width as usize * cfg.height as usize * 4],
            cfg,
            bg_rgba,
            child,
            stdin: Some(stdin),
            stderr_drain: Some(stderr_drain),
        })
    }

    fn push_frame(&mut self, frame: &Frame) -> FxResult<()> {
        if frame.dimensions() != (self.cfg.width, self.cfg.height) {
            return Err(FxError::encode(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                self.cfg.width,
                self.cfg.height
            )));
        }
        flatten_straight_over_bg(&mut self.scratch, frame.data(), self.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(FxError::encode("ffmpeg encoder is already finalized"));
        };
        use std::io::Write as _;
        stdin
            .write_all(&self.scratch)
            .map_err(|e| FxError::encode(format!("failed to write frame to ffmpeg stdin: {e}")))
    }

    fn finish(mut self) -> FxResult<()> {
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|e| FxError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| FxError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| FxError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(FxError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl Drop for FfmpegEncoder {
    // Reached without `finish` when a frame write fails: stop ffmpeg and reap it.
    fn drop(&mut self) {
        drop(self.stdin.take());
        if matches!(self.child.try_wait(), Ok(None)) {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}

/// Composite straight-alpha RGBA8 over an opaque background.
fn flatten_straight_over_bg(dst: &mut [u8], src: &[u8], bg_rgba: [u8; 4]) -> FxResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(FxError::encode(
            "flatten_straight_over_bg expects equal-length rgba8 buffers",
        ));
    }
    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let v = mul_div255_u16(u16::from(s[c]), a) + mul_div255_u16(bg[c], inv);
            d[c] = v.min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> FxResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
