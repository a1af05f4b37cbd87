//! The effect family: a shared configure/process contract and its five implementations.

pub(crate) mod crossfade;
pub(crate) mod fade;
pub(crate) mod jitter;
pub(crate) mod motion_blur;
pub(crate) mod reverse;
pub(crate) mod spec;

use crate::{
    foundation::error::{FxError, FxResult},
    frames::{
        frame::Frame,
        sequence::{FrameSource, Inputs},
    },
};

/// Permission to produce output frame `index`, handed out by the scheduler.
///
/// A ticket is move-only and can be redeemed exactly once via [`FrameTicket::complete`],
/// which is how an effect signals that its output slot has been written.
#[must_use = "a frame ticket must be completed to advance the pipeline"]
#[derive(Debug)]
pub struct FrameTicket {
    index: usize,
}

impl FrameTicket {
    pub(crate) fn new(index: usize) -> Self {
        Self { index }
    }

    /// Output index this ticket is for.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Hand the finished output frame back to the scheduler.
    pub fn complete(self, frame: Frame) -> Completed {
        Completed {
            index: self.index,
            frame,
        }
    }
}

/// Completion signal for one output index, carrying the written frame.
#[must_use = "return the completion to the scheduler"]
#[derive(Debug)]
pub struct Completed {
    index: usize,
    frame: Frame,
}

impl Completed {
    /// Output index that was completed.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The output frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub(crate) fn into_parts(self) -> (usize, Frame) {
        (self.index, self.frame)
    }
}

/// A frame-sequence transform.
///
/// The scheduler calls [`configure`](Effect::configure) once per run, then
/// [`process_frame`](Effect::process_frame) for every output index in increasing order,
/// never with two frames in flight.
pub trait Effect: Send {
    /// Stable effect name, used in logs.
    fn name(&self) -> &'static str;

    /// Validate parameters against the inputs, reset per-run state, and return the
    /// number of output frames.
    fn configure(&mut self, inputs: &Inputs) -> FxResult<usize>;

    /// Produce the output frame for `ticket.index()` and complete the ticket.
    fn process_frame(&mut self, ticket: FrameTicket, inputs: &Inputs) -> FxResult<Completed>;
}

/// Decode `index` from `source` and check it against the dimensions fixed at configure time.
pub(crate) fn decode_checked(
    source: &dyn FrameSource,
    index: usize,
    expected: (u32, u32),
) -> FxResult<Frame> {
    let frame = source.frame(index)?;
    if frame.dimensions() != expected {
        return Err(FxError::decode(
            index,
            format!(
                "decoded {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                expected.0,
                expected.1
            ),
        ));
    }
    Ok(frame)
}

pub(crate) fn require_frames(source: &dyn FrameSource, what: &str) -> FxResult<usize> {
    let len = source.len();
    if len == 0 {
        return Err(FxError::config(format!(
            "{what} must contain at least one frame"
        )));
    }
    Ok(len)
}

/// Configure `effect` and process every index in order, outside the scheduler.
#[cfg(test)]
pub(crate) fn drive(effect: &mut dyn Effect, inputs: &Inputs) -> FxResult<Vec<Frame>> {
    let len = effect.configure(inputs)?;
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let done = effect.process_frame(FrameTicket::new(i), inputs)?;
        assert_eq!(done.index(), i);
        out.push(done.into_parts().1);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/mod.rs"]
mod tests;
