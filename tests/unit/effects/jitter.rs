use super::*;
use crate::{Fps, FrameSequence, effects::drive};

fn solid_seq(w: u32, h: u32, n: usize, rgba: [u8; 4]) -> FrameSequence {
    FrameSequence::new((0..n).map(|_| Frame::filled(w, h, rgba).unwrap()).collect()).unwrap()
}

#[test]
fn offsets_stay_in_range_and_crop_stays_inside() {
    let inputs = Inputs::new(solid_seq(10, 8, 1, [0, 0, 0, 255]), Fps::default());
    let mut fx = Jitter::new(3, Some(7));
    fx.configure(&inputs).unwrap();

    for _ in 0..500 {
        let c = fx.next_crop().unwrap();
        assert!(c.x < 6 && c.y < 6);
        assert_eq!((c.width, c.height), (4, 2));
        assert!(c.x + c.width <= 10);
        assert!(c.y + c.height <= 8);
    }
}

#[test]
fn same_seed_draws_same_offsets() {
    let inputs = Inputs::new(solid_seq(32, 32, 1, [0, 0, 0, 255]), Fps::default());
    let mut a = Jitter::new(5, Some(42));
    let mut b = Jitter::new(5, Some(42));
    a.configure(&inputs).unwrap();
    b.configure(&inputs).unwrap();
    for _ in 0..20 {
        assert_eq!(a.next_crop().unwrap(), b.next_crop().unwrap());
    }
}

#[test]
fn strength_must_be_below_half_the_short_side() {
    let inputs = Inputs::new(solid_seq(8, 12, 1, [0, 0, 0, 255]), Fps::default());
    assert!(Jitter::new(4, None).configure(&inputs).unwrap_err().is_config());
    assert!(Jitter::new(3, None).configure(&inputs).is_ok());
}

#[test]
fn output_keeps_canvas_size() {
    let inputs = Inputs::new(solid_seq(16, 12, 3, [80, 120, 160, 255]), Fps::default());
    let out = drive(&mut Jitter::new(2, Some(1)), &inputs).unwrap();
    assert_eq!(out.len(), 3);
    for f in &out {
        assert_eq!(f.dimensions(), (16, 12));
        assert_eq!(f.pixel(15, 11), Some([80, 120, 160, 255]));
    }
}

#[test]
fn zero_strength_is_identity() {
    let seq = solid_seq(4, 4, 2, [9, 8, 7, 255]);
    let inputs = Inputs::new(seq.clone(), Fps::default());
    let mut fx = Jitter::new(0, None);
    fx.configure(&inputs).unwrap();
    assert_eq!(
        fx.next_crop().unwrap(),
        CropRect {
            x: 0,
            y: 0,
            width: 4,
            height: 4
        }
    );

    let out = drive(&mut fx, &inputs).unwrap();
    assert!(out[1].shares_pixels_with(seq.get(1).unwrap()));
}

#[test]
fn next_crop_before_configure_fails() {
    assert!(Jitter::new(1, None).next_crop().is_err());
}

#[test]
fn output_is_the_drawn_crop_stretched_to_full_size() {
    let (w, h) = (12, 10);
    let gradient = |i: u8| {
        let data = (0..h)
            .flat_map(|y| (0..w).flat_map(move |x| [x as u8 * 20, y as u8 * 25, i * 40, 255]))
            .collect();
        Frame::new(w, h, data).unwrap()
    };
    let seq = FrameSequence::new((0..4).map(gradient).collect()).unwrap();
    let inputs = Inputs::new(seq.clone(), Fps::default());

    let mut crops = Jitter::new(2, Some(5));
    crops.configure(&inputs).unwrap();
    let out = drive(&mut Jitter::new(2, Some(5)), &inputs).unwrap();

    for (i, frame) in out.iter().enumerate() {
        let c = crops.next_crop().unwrap();
        let src = seq.get(i).unwrap().to_rgba_image().unwrap();
        let cropped = imageops::crop_imm(&src, c.x, c.y, c.width, c.height).to_image();
        let expected = imageops::resize(&cropped, w, h, FilterType::Triangle);
        assert_eq!(frame.data(), expected.as_raw().as_slice(), "frame {i}, {c:?}");
    }
}
