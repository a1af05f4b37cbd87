use super::*;
use crate::{
    CollectFrames, CrossFade, Fps, FrameSource, MotionBlur, Reverse,
    encode::assembler::OutputAssembler,
};

#[derive(Default)]
struct Recorder {
    values: Vec<f64>,
    closes: usize,
}

impl ProgressSink for Recorder {
    fn report(&mut self, percent: f64) {
        self.values.push(percent);
    }

    fn close(&mut self) {
        self.closes += 1;
    }
}

/// Decodes like its inner sequence, except at `bad_at`.
struct Flaky {
    inner: FrameSequence,
    bad_at: usize,
}

impl FrameSource for Flaky {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn dimensions(&self) -> (u32, u32) {
        FrameSource::dimensions(&self.inner)
    }

    fn frame(&self, index: usize) -> FxResult<Frame> {
        if index == self.bad_at {
            return Err(FxError::decode(index, "corrupt frame"));
        }
        self.inner.frame(index)
    }
}

struct FailingAssembler;

impl OutputAssembler for FailingAssembler {
    type Artifact = ();

    fn assemble(&mut self, _frames: FrameSequence, _fps: crate::Fps) -> FxResult<()> {
        Err(FxError::encode("disk full"))
    }
}

fn numbered(n: u8) -> FrameSequence {
    FrameSequence::new(
        (0..n)
            .map(|v| Frame::filled(1, 1, [v, v, v, 255]).unwrap())
            .collect(),
    )
    .unwrap()
}

fn scheduler() -> Scheduler<CollectFrames, Recorder> {
    Scheduler::new(CollectFrames, Recorder::default())
}

#[test]
fn reverse_run_reports_progress_and_assembles() {
    let mut sched = scheduler();
    let outcome = sched
        .run(Box::new(Reverse::new()), Inputs::new(numbered(4), Fps::default()))
        .unwrap();

    let Outcome::Finished { artifact, stats } = outcome else {
        panic!("expected a finished run");
    };
    let order: Vec<u8> = artifact.iter().map(|f| f.data()[0]).collect();
    assert_eq!(order, vec![3, 2, 1, 0]);
    assert_eq!(
        stats,
        RunStats {
            output_duration: 4,
            current_frame: 4,
            completed_frames: 4
        }
    );
    assert_eq!(sched.progress().values, vec![0.0, 25.0, 50.0, 75.0, 100.0]);
    assert_eq!(sched.progress().closes, 1);
    assert!(!sched.is_running());
}

#[test]
fn stepping_keeps_bookkeeping_ordered() {
    let mut sched = scheduler();
    let mut step = sched
        .start(Box::new(MotionBlur::new(2)), Inputs::new(numbered(5), Fps::default()))
        .unwrap();
    let mut seen = 0;
    while let Step::Continue { progress } = step {
        let stats = sched.stats().unwrap();
        assert!(stats.completed_frames <= stats.current_frame);
        assert!(stats.current_frame <= stats.output_duration);
        assert_eq!(stats.completed_frames, stats.current_frame);
        seen += 1;
        assert!((progress - seen as f64 * 20.0).abs() < 1e-9);
        step = sched.advance_one().unwrap();
    }
    assert_eq!(seen, 4);
    assert!(matches!(step, Step::Done(Outcome::Finished { .. })));
}

#[test]
fn cancel_stops_after_the_in_flight_frame() {
    let mut sched = scheduler();
    let cancel = sched.cancel_handle();
    let step = sched
        .start(Box::new(Reverse::new()), Inputs::new(numbered(6), Fps::default()))
        .unwrap();
    assert!(matches!(step, Step::Continue { .. }));

    cancel.cancel();
    let Step::Done(Outcome::Cancelled(stats)) = sched.advance_one().unwrap() else {
        panic!("expected cancellation");
    };
    assert_eq!(stats.completed_frames, 2);
    assert_eq!(stats.current_frame, 2);
    assert!(!sched.is_running());
    assert!(!cancel.is_cancelled());
    assert_eq!(sched.progress().closes, 1);
    assert_eq!(sched.progress().values, vec![0.0, 1.0 / 6.0 * 100.0]);
}

#[test]
fn cancel_during_last_frame_still_finishes() {
    let mut sched = scheduler();
    let cancel = sched.cancel_handle();
    sched
        .start(Box::new(Reverse::new()), Inputs::new(numbered(2), Fps::default()))
        .unwrap();
    cancel.cancel();
    assert!(matches!(
        sched.advance_one().unwrap(),
        Step::Done(Outcome::Finished { .. })
    ));
    assert!(!cancel.is_cancelled());
}

#[test]
fn cancel_before_start_is_ignored() {
    let mut sched = scheduler();
    sched.cancel_handle().cancel();
    let outcome = sched
        .run(Box::new(Reverse::new()), Inputs::new(numbered(3), Fps::default()))
        .unwrap();
    assert!(matches!(outcome, Outcome::Finished { .. }));
}

#[test]
fn decode_failure_ends_the_run_and_resets() {
    let mut sched = scheduler();
    let cancel = sched.cancel_handle();
    let flaky = Flaky {
        inner: numbered(4),
        bad_at: 2,
    };
    sched
        .start(Box::new(Reverse::new()), Inputs::new(flaky, Fps::default()))
        .unwrap();
    cancel.cancel();

    // Reverse reads source index 2 for output index 1.
    match sched.advance_one() {
        Err(FxError::Decode { index, .. }) => assert_eq!(index, 2),
        other => panic!("expected decode error, got {other:?}"),
    }
    assert!(!sched.is_running());
    assert!(!cancel.is_cancelled());
    assert_eq!(sched.progress().closes, 1);

    let outcome = sched
        .run(Box::new(Reverse::new()), Inputs::new(numbered(2), Fps::default()))
        .unwrap();
    assert!(matches!(outcome, Outcome::Finished { .. }));
    assert_eq!(sched.progress().closes, 2);
}

#[test]
fn config_error_never_starts_the_run() {
    let mut sched = scheduler();
    let err = sched
        .start(Box::new(CrossFade::new(1.0)), Inputs::new(numbered(3), Fps::default()))
        .unwrap_err();
    assert!(err.is_config());
    assert!(!sched.is_running());
    assert!(sched.progress().values.is_empty());
    assert_eq!(sched.progress().closes, 0);
}

#[test]
fn protocol_errors() {
    let mut sched = scheduler();
    assert!(matches!(sched.advance_one(), Err(FxError::Pipeline(_))));

    sched
        .start(Box::new(Reverse::new()), Inputs::new(numbered(3), Fps::default()))
        .unwrap();
    assert!(matches!(
        sched.start(Box::new(Reverse::new()), Inputs::new(numbered(3), Fps::default())),
        Err(FxError::Pipeline(_))
    ));
    assert!(sched.is_running());
}

#[test]
fn assembler_failure_surfaces_as_encode_error() {
    let mut sched = Scheduler::new(FailingAssembler, Recorder::default());
    let err = sched
        .run(Box::new(Reverse::new()), Inputs::new(numbered(2), Fps::default()))
        .unwrap_err();
    assert!(matches!(err, FxError::Encode(_)));
    assert!(!sched.is_running());
    assert_eq!(sched.progress().closes, 1);
    assert!(!sched.progress().values.contains(&100.0));
}
