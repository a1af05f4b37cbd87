use crate::{
    effects::{Completed, Effect, FrameTicket, require_frames},
    foundation::error::{FxError, FxResult},
    frames::sequence::Inputs,
};

/// Plays the primary input backwards.
#[derive(Clone, Debug, Default)]
pub struct Reverse {
    output_duration: usize,
}

impl Reverse {
    /// Create the effect. It takes no parameters.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for Reverse {
    fn name(&self) -> &'static str {
        "reverse"
    }

    fn configure(&mut self, inputs: &Inputs) -> FxResult<usize> {
        self.output_duration = require_frames(inputs.primary(), "input")?;
        Ok(self.output_duration)
    }

    fn process_frame(&mut self, ticket: FrameTicket, inputs: &Inputs) -> FxResult<Completed> {
        let src = self
            .output_duration
            .checked_sub(ticket.index() + 1)
            .ok_or_else(|| {
                FxError::pipeline(format!(
                    "reverse: index {} is past the output end",
                    ticket.index()
                ))
            })?;
        let frame = inputs.primary().frame(src)?;
        Ok(ticket.complete(frame))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/reverse.rs"]
mod tests;
