use super::*;

#[test]
fn progress_fn_forwards_values() {
    let mut seen = Vec::new();
    {
        let mut sink = ProgressFn(|p| seen.push(p));
        sink.report(0.0);
        sink.report(50.0);
        sink.close();
    }
    assert_eq!(seen, vec![0.0, 50.0]);
}

#[test]
fn progress_log_throttles_by_step() {
    let mut sink = ProgressLog::new(25.0);
    sink.report(0.0);
    assert_eq!(sink.next, 25.0);
    sink.report(10.0);
    assert_eq!(sink.next, 25.0);
    sink.report(60.0);
    assert_eq!(sink.next, 75.0);
    sink.close();
    assert_eq!(sink.next, 0.0);
}

#[test]
fn progress_log_rejects_bad_step() {
    assert_eq!(ProgressLog::new(0.0).step, 10.0);
    assert_eq!(ProgressLog::new(f64::NAN).step, 10.0);
}

#[test]
fn boxed_sink_delegates() {
    let mut boxed: Box<dyn ProgressSink> = Box::new(NoProgress);
    boxed.report(1.0);
    boxed.close();
}
