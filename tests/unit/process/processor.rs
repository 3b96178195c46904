use super::*;
use crate::pipes::sink::{SharedBuffer, StreamPipeSink};

#[test]
fn command_line_uses_configured_binary() {
    let processor = Arguments::from_file("in.mkv")
        .with_video_codec("mpeg4")
        .output_to_file("out.mkv", true)
        .with_config(EngineConfig::default().with_binary_folder("/opt/ff"));
    let cmd = processor.command_line().unwrap();
    assert_eq!(cmd.program, EngineConfig::default().with_binary_folder("/opt/ff").ffmpeg_path());
    assert_eq!(cmd.args, vec!["-i", "in.mkv", "-c:v", "mpeg4", "-y", "out.mkv"]);
}

#[test]
fn zero_total_fraction_observer_is_rejected() {
    let err = Arguments::from_file("in.mkv")
        .output_to_file("out.mkv", true)
        .notify_on_fraction(Duration::ZERO, |_| {})
        .unwrap_err();
    assert!(matches!(err, FfError::Configuration(_)));
}

#[test]
fn configuration_errors_surface_before_spawn() {
    let mut processor = Arguments::from_file("in.mkv")
        .force_format("mp4")
        .output_to_pipe(StreamPipeSink::new(SharedBuffer::new()))
        .with_config(EngineConfig::default().with_binary_folder("/nonexistent"));
    let err = processor.run().unwrap_err();
    assert!(matches!(err, FfError::Configuration(_)), "{err}");
}

#[test]
fn cancellable_through_shares_the_callers_token() {
    let token = CancelToken::new();
    let mut processor = Arguments::from_file("in.mkv")
        .output_to_file("out.mkv", true)
        .with_config(EngineConfig::default().with_binary_folder("/nonexistent"))
        .cancellable_through(&token);
    token.cancel();
    assert!(processor.cancel_token().is_cancelled());

    let result = processor.run().unwrap();
    assert!(result.cancelled);
    assert!(!result.success);
}

#[test]
fn run_async_needs_a_runtime() {
    let err = Arguments::from_file("in.mkv")
        .output_to_file("out.mkv", true)
        .run_async()
        .unwrap_err();
    assert!(err.to_string().contains("tokio runtime"));
}
