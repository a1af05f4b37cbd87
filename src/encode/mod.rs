//! Output assemblers: turn the finished output sequence into an artifact.

pub(crate) mod assembler;
pub(crate) mod ffmpeg;
