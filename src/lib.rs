//! reelfx applies frame-sequence effects to decoded video.
//!
//! A run takes one or two decoded inputs, drives an [`Effect`] over them one output frame
//! at a time, and hands the finished sequence to an [`OutputAssembler`].
//!
//! # Pipeline overview
//!
//! 1. **Decode**: inputs are [`FrameSource`]s (in-memory [`FrameSequence`], lazily decoded
//!    [`EncodedSequence`], or video decoded through `ffmpeg`).
//! 2. **Configure**: the effect validates its parameters and reports the output length.
//! 3. **Process**: the [`Scheduler`] starts frame `i + 1` only after frame `i` completed,
//!    reporting progress and honoring cancellation between frames.
//! 4. **Assemble**: the output sequence becomes an artifact (frames in memory, a PNG
//!    sequence, or an MP4 through the system `ffmpeg` binary).
//!
//! Effects: [`Reverse`], [`FadeInOut`], [`MotionBlur`], [`Jitter`] and [`CrossFade`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod effects;
mod encode;
mod foundation;
mod frames;
mod pipeline;

pub use assets::decode::{EncodedSequence, decode_frame};
pub use assets::media::{VideoSourceInfo, decode_video, is_ffprobe_on_path, probe_video};
pub use effects::crossfade::{CrossFade, Region};
pub use effects::fade::FadeInOut;
pub use effects::jitter::{CropRect, Jitter};
pub use effects::motion_blur::MotionBlur;
pub use effects::reverse::Reverse;
pub use effects::spec::{EffectInstance, EffectSpec, build_effect, parse_effect};
pub use effects::{Completed, Effect, FrameTicket};
pub use encode::assembler::{CollectFrames, OutputAssembler, PngSequenceAssembler};
pub use encode::ffmpeg::{EncodeConfig, Mp4Assembler, ensure_parent_dir, is_ffmpeg_on_path};
pub use foundation::core::Fps;
pub use foundation::error::{FxError, FxResult};
pub use foundation::math::lerp;
pub use frames::frame::Frame;
pub use frames::sequence::{FrameSequence, FrameSource, Inputs};
pub use pipeline::progress::{NoProgress, ProgressFn, ProgressLog, ProgressSink};
pub use pipeline::scheduler::{CancelHandle, Outcome, RunStats, Scheduler, Step};
pub use pipeline::worker::{ChannelProgress, PipelineEvent, PipelineHandle, spawn_pipeline};
