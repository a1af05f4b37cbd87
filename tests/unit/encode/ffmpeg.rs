use super::*;

fn cfg(width: u32, height: u32) -> EncodeConfig {
    cfg_at(width, height, Path::new("out/clip.mp4"))
}

fn cfg_at(width: u32, height: u32, out_path: &Path) -> EncodeConfig {
    EncodeConfig {
        width,
        height,
        fps: Fps::default(),
        out_path: out_path.to_path_buf(),
        overwrite: true,
    }
}

#[test]
fn config_validation_catches_bad_values() {
    assert!(cfg(0, 10).validate().unwrap_err().is_config());
    assert!(cfg(11, 10).validate().unwrap_err().is_config());
    assert!(cfg(10, 7).validate().unwrap_err().is_config());
    assert!(cfg(10, 10).validate().is_ok());
}

#[test]
fn flatten_opaque_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_straight_over_bg(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_transparent_returns_bg() {
    let src = vec![200u8, 200, 200, 0];
    let mut dst = vec![0u8; 4];
    flatten_straight_over_bg(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_half_alpha_over_black() {
    let src = vec![255u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_straight_over_bg(&mut dst, &src, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128, 0, 0, 255]);
}

#[test]
fn empty_sequence_is_an_encode_error() {
    let err = Mp4Assembler::new("unused.mp4")
        .assemble(FrameSequence::default(), Fps::default())
        .unwrap_err();
    assert!(matches!(err, FxError::Encode(_)));
}

#[test]
fn mp4_roundtrip_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let out = std::env::temp_dir().join(format!("reelfx_mp4_{}.mp4", std::process::id()));
    let frames = FrameSequence::new(vec![Frame::filled(4, 4, [0, 128, 255, 255]).unwrap(); 3]).unwrap();
    let path = Mp4Assembler::new(&out).assemble(frames, Fps::default()).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
    std::fs::remove_file(&path).unwrap();
}

#[cfg(target_os = "linux")]
#[test]
fn abandoned_encoder_reaps_ffmpeg() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let out = std::env::temp_dir().join(format!("reelfx_abandon_{}.mp4", std::process::id()));
    let mut enc = FfmpegEncoder::spawn(cfg_at(4, 4, &out), [0, 0, 0, 255]).unwrap();
    let pid = enc.child.id();
    let wrong_size = Frame::filled(2, 2, [0, 0, 0, 255]).unwrap();
    assert!(matches!(enc.push_frame(&wrong_size), Err(FxError::Encode(_))));
    drop(enc);

    assert!(!Path::new(&format!("/proc/{pid}")).exists());
    let _ = std::fs::remove_file(&out);
}
