use super::*;
use crate::{FrameSequence, foundation::core::Fps};

#[test]
fn ticket_completes_with_its_own_index() {
    let frame = Frame::filled(1, 1, [0, 0, 0, 255]).unwrap();
    let done = FrameTicket::new(5).complete(frame.clone());
    assert_eq!(done.index(), 5);
    assert!(done.frame().shares_pixels_with(&frame));
}

#[test]
fn decode_checked_rejects_wrong_dimensions() {
    let seq = FrameSequence::new(vec![Frame::filled(2, 2, [0, 0, 0, 255]).unwrap()]).unwrap();
    assert!(decode_checked(&seq, 0, (2, 2)).is_ok());
    match decode_checked(&seq, 0, (4, 4)) {
        Err(FxError::Decode { index, message }) => {
            assert_eq!(index, 0);
            assert!(message.contains("expected 4x4"));
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn require_frames_rejects_empty_source() {
    let inputs = Inputs::new(FrameSequence::default(), Fps::default());
    assert!(require_frames(inputs.primary(), "input").unwrap_err().is_config());
}
