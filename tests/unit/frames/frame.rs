use super::*;

#[test]
fn new_checks_buffer_length() {
    assert!(Frame::new(2, 2, vec![0u8; 16]).is_ok());
    assert!(Frame::new(2, 2, vec![0u8; 15]).unwrap_err().is_config());
    assert!(Frame::new(0, 2, Vec::new()).is_err());
}

#[test]
fn pixel_addresses_row_major() {
    let data: Vec<u8> = (0u8..24).collect();
    let f = Frame::new(3, 2, data).unwrap();
    assert_eq!(f.pixel(0, 0), Some([0, 1, 2, 3]));
    assert_eq!(f.pixel(2, 0), Some([8, 9, 10, 11]));
    assert_eq!(f.pixel(0, 1), Some([12, 13, 14, 15]));
    assert_eq!(f.pixel(3, 0), None);
    assert_eq!(f.pixel(0, 2), None);
}

#[test]
fn clone_is_a_reference_copy() {
    let f = Frame::filled(4, 4, [1, 2, 3, 255]).unwrap();
    let g = f.clone();
    assert!(f.shares_pixels_with(&g));

    let h = Frame::filled(4, 4, [1, 2, 3, 255]).unwrap();
    assert_eq!(f, h);
    assert!(!f.shares_pixels_with(&h));
}

#[test]
fn rgba_image_conversion_keeps_pixels() {
    let f = Frame::new(2, 1, vec![10, 20, 30, 40, 50, 60, 70, 80]).unwrap();
    let img = f.to_rgba_image().unwrap();
    assert_eq!(img.dimensions(), (2, 1));
    let back = Frame::from_rgba_image(img);
    assert_eq!(back, f);
}
