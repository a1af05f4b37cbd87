use crossbeam_channel::{Receiver, Sender};

use crate::{
    effects::Effect,
    encode::assembler::OutputAssembler,
    foundation::error::{FxError, FxResult},
    frames::sequence::Inputs,
    pipeline::{
        progress::ProgressSink,
        scheduler::{CancelHandle, Outcome, RunStats, Scheduler},
    },
};

/// Notifications posted by a background run, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum PipelineEvent {
    /// Progress percentage, as passed to [`ProgressSink::report`].
    Progress(f64),
    /// The progress display can be dismissed. Sent once, before the terminal event.
    Closed,
    /// The artifact was produced.
    Finished(RunStats),
    /// Cancellation was observed at a frame boundary.
    Cancelled(RunStats),
    /// The run failed; the message is the error's display text.
    Failed(String),
}

/// Forwards progress to a channel.
#[derive(Clone, Debug)]
pub struct ChannelProgress {
    tx: Sender<PipelineEvent>,
}

impl ChannelProgress {
    /// Send events to `tx`. Disconnected receivers are ignored.
    pub fn new(tx: Sender<PipelineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgress {
    fn report(&mut self, percent: f64) {
        let _ = self.tx.send(PipelineEvent::Progress(percent));
    }

    fn close(&mut self) {
        let _ = self.tx.send(PipelineEvent::Closed);
    }
}

/// A run executing on its own thread.
#[derive(Debug)]
pub struct PipelineHandle<T> {
    events: Receiver<PipelineEvent>,
    cancel: CancelHandle,
    thread: std::thread::JoinHandle<FxResult<Outcome<T>>>,
}

impl<T> PipelineHandle<T> {
    /// Events in the order the run posted them.
    pub fn events(&self) -> &Receiver<PipelineEvent> {
        &self.events
    }

    /// Stop at the next frame boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A handle sharing the run's cancellation flag.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the run to end and take its outcome.
    pub fn join(self) -> FxResult<Outcome<T>> {
        self.thread
            .join()
            .map_err(|_| FxError::pipeline("pipeline thread panicked"))?
    }
}

/// Run `effect` on a dedicated thread, reporting through [`PipelineHandle::events`].
///
/// Configuration errors are reported through the event channel and `join`, like any other
/// failure.
pub fn spawn_pipeline<A>(
    effect: Box<dyn Effect>,
    inputs: Inputs,
    assembler: A,
) -> FxResult<PipelineHandle<A::Artifact>>
where
    A: OutputAssembler + 'static,
    A::Artifact: 'static,
{
    let (tx, events) = crossbeam_channel::unbounded();
    let mut scheduler = Scheduler::new(assembler, ChannelProgress::new(tx.clone()));
    let cancel = scheduler.cancel_handle();
    let name = effect.name();

    let thread = std::thread::Builder::new()
        .name(format!("reelfx-{name}"))
        .spawn(move || {
            let result = scheduler.run(effect, inputs);
            let event = match &result {
                Ok(Outcome::Finished { stats, .. }) => PipelineEvent::Finished(*stats),
                Ok(Outcome::Cancelled(stats)) => PipelineEvent::Cancelled(*stats),
                Err(err) => PipelineEvent::Failed(err.to_string()),
            };
            let _ = tx.send(event);
            result
        })
        .map_err(|e| FxError::pipeline(format!("failed to spawn pipeline thread: {e}")))?;

    tracing::debug!(effect = name, "pipeline thread spawned");
    Ok(PipelineHandle {
        events,
        cancel,
        thread,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/worker.rs"]
mod tests;
