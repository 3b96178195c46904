use super::*;

#[test]
fn parses_stats_line() {
    let line = "frame=  128 fps=0.0 q=-0.0 Lsize=     215kB time=00:00:05.12 bitrate= 343.2kbits/s speed=12.1x";
    assert_eq!(parse_elapsed(line), Some(Duration::from_millis(5120)));
}

#[test]
fn parses_progress_key_value_output() {
    assert_eq!(
        parse_elapsed("out_time=00:01:02.500000"),
        Some(Duration::from_millis(62_500))
    );
    assert_eq!(parse_elapsed("out_time_us=62500000"), None);
    assert_eq!(parse_elapsed("out_time_ms=62500000"), None);
}

#[test]
fn ignores_unavailable_and_unrelated_lines() {
    assert_eq!(parse_elapsed("frame=    0 fps=0.0 time=N/A bitrate=N/A"), None);
    assert_eq!(parse_elapsed("Stream #0:0: Video: rawvideo, rgb24, 128x128"), None);
    assert_eq!(parse_elapsed(""), None);
}

#[test]
fn negative_time_clamps_to_zero() {
    assert_eq!(
        parse_elapsed("size=0kB time=-00:00:00.04 bitrate=N/A"),
        Some(Duration::ZERO)
    );
}

#[test]
fn fraction_is_clamped() {
    let total = Duration::from_secs(10);
    assert_eq!(fraction(Duration::from_secs(5), total), Some(0.5));
    assert_eq!(fraction(Duration::from_secs(20), total), Some(1.0));
    assert_eq!(fraction(Duration::from_secs(1), Duration::ZERO), None);
}
