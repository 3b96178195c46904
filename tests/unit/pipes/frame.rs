use super::*;

fn solid(w: u32, h: u32, v: u8) -> image::RgbImage {
    image::RgbImage::from_pixel(w, h, image::Rgb([v, v, v]))
}

#[test]
fn declares_rawvideo_input_from_first_frame() {
    let frames = (0..3u8).map(|i| solid(4, 2, i));
    let src = RawVideoPipeSource::new(frames)
        .unwrap()
        .with_fps(Fps::integer(30).unwrap());
    assert_eq!(src.frame_size(), FrameSize::new(4, 2));
    assert_eq!(
        src.stream_args(),
        vec!["-f", "rawvideo", "-pix_fmt", "rgb24", "-s", "4x2", "-r", "30"]
    );
}

#[test]
fn empty_sequence_is_rejected() {
    let err = RawVideoPipeSource::new(std::iter::empty::<RawFrame>())
        .err()
        .expect("empty source must fail");
    assert!(matches!(err, FfError::Configuration(_)));
}

#[test]
fn writes_every_frame() {
    let mut src = RawVideoPipeSource::new((0..5u8).map(|i| solid(2, 2, i))).unwrap();
    let mut stdin = Vec::new();
    src.write_to(&mut stdin, &CancelToken::new()).unwrap();
    assert_eq!(stdin.len(), 5 * 2 * 2 * 3);
    assert_eq!(src.frames_written(), 5);
    assert_eq!(stdin[12], 1);
}

#[test]
fn geometry_mismatch_is_invalid_data() {
    let frames = vec![solid(2, 2, 0), solid(4, 4, 0)];
    let mut src = RawVideoPipeSource::new(frames).unwrap();
    let mut stdin = Vec::new();
    let err = src.write_to(&mut stdin, &CancelToken::new()).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert_eq!(src.frames_written(), 1);
}

#[test]
fn rgba_and_raw_frames_report_their_format() {
    let rgba = image::RgbaImage::new(3, 1);
    assert_eq!(rgba.pixel_format(), "rgba");
    assert_eq!(rgba.data().len(), 12);

    let raw = RawFrame {
        size: FrameSize::new(2, 2),
        pixel_format: "gray".to_string(),
        data: vec![0; 4],
    };
    let src = RawVideoPipeSource::new(vec![raw]).unwrap();
    assert_eq!(src.pixel_format(), "gray");
}

#[test]
fn cancelled_source_writes_nothing() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut src = RawVideoPipeSource::new(vec![solid(2, 2, 0)]).unwrap();
    let mut stdin = Vec::new();
    src.write_to(&mut stdin, &cancel).unwrap();
    assert!(stdin.is_empty());
}
