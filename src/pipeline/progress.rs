/// Receives run progress as a percentage in `[0, 100]`.
pub trait ProgressSink: Send {
    /// Latest progress, non-decreasing within a run.
    fn report(&mut self, percent: f64);

    /// The run ended (finished, cancelled or failed). Called exactly once per started run.
    fn close(&mut self) {}
}

impl<P: ProgressSink + ?Sized> ProgressSink for Box<P> {
    fn report(&mut self, percent: f64) {
        (**self).report(percent);
    }

    fn close(&mut self) {
        (**self).close();
    }
}

/// Discards progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent: f64) {}
}

/// Adapts a closure into a [`ProgressSink`].
pub struct ProgressFn<F>(pub F);

impl<F: FnMut(f64) + Send> ProgressSink for ProgressFn<F> {
    fn report(&mut self, percent: f64) {
        (self.0)(percent);
    }
}

impl<F> std::fmt::Debug for ProgressFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ProgressFn(..)")
    }
}

/// Logs progress through `tracing` every time it crosses another `step` percent.
#[derive(Clone, Debug)]
pub struct ProgressLog {
    step: f64,
    next: f64,
}

impl ProgressLog {
    /// Log every `step` percent. Non-positive or non-finite steps fall back to 10.
    pub fn new(step: f64) -> Self {
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            10.0
        };
        Self { step, next: 0.0 }
    }
}

impl Default for ProgressLog {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl ProgressSink for ProgressLog {
    fn report(&mut self, percent: f64) {
        if percent >= self.next {
            tracing::info!(percent = format_args!("{percent:.1}"), "progress");
            self.next = (percent / self.step).floor() * self.step + self.step;
        }
    }

    fn close(&mut self) {
        self.next = 0.0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/progress.rs"]
mod tests;
