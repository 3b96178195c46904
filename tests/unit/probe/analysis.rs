use super::*;

const SAMPLE: &str = r#"{
    "streams": [
        {
            "index": 0,
            "codec_name": "mpeg4",
            "codec_type": "video",
            "width": 128,
            "height": 128,
            "pix_fmt": "yuv420p",
            "r_frame_rate": "25/1",
            "duration": "5.120000"
        },
        {
            "index": 1,
            "codec_name": "aac",
            "codec_type": "audio",
            "r_frame_rate": "0/0"
        }
    ],
    "format": {
        "format_name": "matroska,webm",
        "duration": "5.120000",
        "size": "12345"
    }
}"#;

#[test]
fn parses_streams_and_format() {
    let analysis = MediaAnalysis::from_json(SAMPLE.as_bytes()).unwrap();
    assert_eq!(analysis.format_name.as_deref(), Some("matroska,webm"));
    assert_eq!(analysis.duration, Some(Duration::from_millis(5120)));

    let video = analysis.primary_video().unwrap();
    assert_eq!(video.frame_size(), Some(FrameSize::new(128, 128)));
    assert_eq!(video.frame_rate, Some(25.0));
    assert_eq!(video.pixel_format.as_deref(), Some("yuv420p"));

    let audio = analysis.primary_audio().unwrap();
    assert_eq!(audio.codec_name.as_deref(), Some("aac"));
    assert_eq!(audio.frame_rate, None);
    assert_eq!(audio.frame_size(), None);
}

#[test]
fn missing_sections_are_tolerated() {
    let analysis = MediaAnalysis::from_json(br#"{}"#).unwrap();
    assert!(analysis.streams.is_empty());
    assert!(analysis.primary_video().is_none());
    assert!(analysis.duration.is_none());
}

#[test]
fn garbage_is_a_probe_error() {
    let err = MediaAnalysis::from_json(b"not json").unwrap_err();
    assert!(matches!(err, FfError::Probe(_)));
}
