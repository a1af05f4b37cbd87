use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    effects::{Completed, Effect, FrameTicket},
    encode::assembler::OutputAssembler,
    foundation::error::{FxError, FxResult},
    frames::{
        frame::Frame,
        sequence::{FrameSequence, Inputs},
    },
    pipeline::progress::ProgressSink,
};

/// Shared cancellation flag for a [`Scheduler`].
///
/// May be set from any thread at any time. The scheduler only samples it after a frame
/// completes, so the in-flight frame always finishes.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// A fresh, unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the run stop at the next frame boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested and not yet consumed.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Frame bookkeeping for a run.
///
/// `completed_frames <= current_frame <= output_duration` always holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Number of output frames the effect reported at configure time.
    pub output_duration: usize,
    /// Next output index to start.
    pub current_frame: usize,
    /// Frames whose output slot has been written.
    pub completed_frames: usize,
}

/// How a run ended without error.
#[derive(Debug)]
pub enum Outcome<T> {
    /// Every frame completed and the assembler produced an artifact.
    Finished {
        /// What the assembler produced.
        artifact: T,
        /// Final bookkeeping.
        stats: RunStats,
    },
    /// Cancellation was observed at a frame boundary. No artifact.
    Cancelled(RunStats),
}

/// Result of driving the scheduler by one frame.
#[derive(Debug)]
pub enum Step<T> {
    /// A frame completed; the host should call [`Scheduler::advance_one`] again.
    Continue {
        /// Percentage reported for the frame that just completed.
        progress: f64,
    },
    /// The run ended; the scheduler is idle again.
    Done(Outcome<T>),
}

struct PipelineRun {
    effect: Box<dyn Effect>,
    inputs: Inputs,
    slots: Vec<Option<Frame>>,
    stats: RunStats,
}

/// Drives one effect over its inputs, one frame at a time.
///
/// At most one run is active and at most one frame is in flight. Frame `i + 1` is never
/// started before frame `i` has completed. After a run finishes, is cancelled or fails, the
/// scheduler is idle again, its cancel flag is clear and the progress sink has been closed.
pub struct Scheduler<A, P> {
    assembler: A,
    progress: P,
    cancel: CancelHandle,
    run: Option<PipelineRun>,
}

impl<A: OutputAssembler, P: ProgressSink> Scheduler<A, P> {
    /// An idle scheduler writing to `assembler` and reporting to `progress`.
    pub fn new(assembler: A, progress: P) -> Self {
        Self {
            assembler,
            progress,
            cancel: CancelHandle::new(),
            run: None,
        }
    }

    /// A handle sharing this scheduler's cancellation flag.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Whether a run is active.
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Bookkeeping of the active run, if any.
    pub fn stats(&self) -> Option<RunStats> {
        self.run.as_ref().map(|r| r.stats)
    }

    /// The progress sink.
    pub fn progress(&self) -> &P {
        &self.progress
    }

    /// The output assembler.
    pub fn assembler(&self) -> &A {
        &self.assembler
    }

    /// Configure `effect`, allocate the output slots and process frame 0.
    ///
    /// Configuration errors are returned before anything is reported to the progress sink.
    #[tracing::instrument(skip_all, fields(effect = effect.name()))]
    pub fn start(
        &mut self,
        mut effect: Box<dyn Effect>,
        inputs: Inputs,
    ) -> FxResult<Step<A::Artifact>> {
        if self.run.is_some() {
            return Err(FxError::pipeline("a run is already active"));
        }
        self.cancel.clear();

        let output_duration = effect.configure(&inputs)?;
        if output_duration == 0 {
            return Err(FxError::config("effect produced an empty output"));
        }
        tracing::info!(output_duration, fps = %inputs.fps(), "run started");

        self.run = Some(PipelineRun {
            effect,
            inputs,
            slots: vec![None; output_duration],
            stats: RunStats {
                output_duration,
                ..RunStats::default()
            },
        });
        self.progress.report(0.0);
        self.advance_one()
    }

    /// Start the next frame and wait for its completion.
    pub fn advance_one(&mut self) -> FxResult<Step<A::Artifact>> {
        let Some(run) = self.run.as_mut() else {
            return Err(FxError::pipeline("advance_one called with no active run"));
        };
        if run.stats.current_frame >= run.stats.output_duration {
            return Err(self.fail(FxError::pipeline("all frames already started")));
        }

        let index = run.stats.current_frame;
        run.stats.current_frame += 1;
        tracing::debug!(index, "frame started");

        match run.effect.process_frame(FrameTicket::new(index), &run.inputs) {
            Ok(done) => self.on_frame_complete(done),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Drive a whole run on the current thread, yielding between frames.
    pub fn run(
        &mut self,
        effect: Box<dyn Effect>,
        inputs: Inputs,
    ) -> FxResult<Outcome<A::Artifact>> {
        let mut step = self.start(effect, inputs)?;
        loop {
            match step {
                Step::Done(outcome) => return Ok(outcome),
                Step::Continue { .. } => {
                    std::thread::yield_now();
                    step = self.advance_one()?;
                }
            }
        }
    }

    fn on_frame_complete(&mut self, done: Completed) -> FxResult<Step<A::Artifact>> {
        let (index, frame) = done.into_parts();
        let Some(run) = self.run.as_mut() else {
            return Err(FxError::pipeline("frame completed with no active run"));
        };
        let in_flight = run.stats.current_frame.checked_sub(1) == Some(index);
        let Some(slot) = run
            .slots
            .get_mut(index)
            .filter(|slot| in_flight && slot.is_none())
        else {
            return Err(self.fail(FxError::pipeline(format!(
                "unexpected completion for frame {index}"
            ))));
        };
        *slot = Some(frame);
        run.stats.completed_frames += 1;
        let stats = run.stats;
        tracing::debug!(index, completed = stats.completed_frames, "frame complete");

        if stats.completed_frames == stats.output_duration {
            return self.finish();
        }

        if self.cancel.is_cancelled() {
            self.run = None;
            self.cancel.clear();
            self.progress.close();
            tracing::info!(
                completed = stats.completed_frames,
                output_duration = stats.output_duration,
                "run cancelled"
            );
            return Ok(Step::Done(Outcome::Cancelled(stats)));
        }

        let progress = stats.completed_frames as f64 / stats.output_duration as f64 * 100.0;
        self.progress.report(progress);
        Ok(Step::Continue { progress })
    }

    fn finish(&mut self) -> FxResult<Step<A::Artifact>> {
        let Some(run) = self.run.take() else {
            return Err(FxError::pipeline("finish called with no active run"));
        };
        let stats = run.stats;
        let fps = run.inputs.fps();

        let assembled = run
            .slots
            .into_iter()
            .collect::<Option<Vec<Frame>>>()
            .ok_or_else(|| FxError::pipeline("output slot left empty"))
            .and_then(FrameSequence::new)
            .and_then(|frames| self.assembler.assemble(frames, fps));
        let artifact = match assembled {
            Ok(a) => a,
            Err(err) => return Err(self.fail(err)),
        };

        self.progress.report(100.0);
        self.progress.close();
        self.cancel.clear();
        tracing::info!(frames = stats.output_duration, "run finished");
        Ok(Step::Done(Outcome::Finished { artifact, stats }))
    }

    fn fail(&mut self, err: FxError) -> FxError {
        self.run = None;
        self.cancel.clear();
        self.progress.close();
        tracing::warn!(error = %err, "run failed");
        err
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/scheduler.rs"]
mod tests;
