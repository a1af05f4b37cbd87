use super::*;
use crate::{assets::decode::decode_frame, frames::frame::Frame};

fn seq(values: &[u8]) -> FrameSequence {
    FrameSequence::new(
        values
            .iter()
            .map(|&v| Frame::filled(2, 1, [v, 0, 0, 255]).unwrap())
            .collect(),
    )
    .unwrap()
}

#[test]
fn collect_frames_returns_the_sequence() {
    let input = seq(&[1, 2, 3]);
    let out = CollectFrames.assemble(input.clone(), Fps::default()).unwrap();
    assert_eq!(out, input);
}

#[test]
fn png_sequence_writes_numbered_files() {
    let dir = std::env::temp_dir().join(format!("reelfx_png_seq_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let mut asm = PngSequenceAssembler::new(&dir);
    let paths = asm.assemble(seq(&[10, 20]), Fps::default()).unwrap();

    assert_eq!(paths.len(), 2);
    assert!(paths[0].ends_with("frame_00000.png"));
    assert!(paths[1].ends_with("frame_00001.png"));
    let back = decode_frame(&std::fs::read(&paths[1]).unwrap()).unwrap();
    assert_eq!(back.pixel(1, 0), Some([20, 0, 0, 255]));

    std::fs::remove_dir_all(&dir).unwrap();
}
