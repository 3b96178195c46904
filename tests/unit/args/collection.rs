use super::*;
use crate::pipes::sink::{SharedBuffer, StreamPipeSink};
use crate::pipes::source::StreamPipeSource;
use std::io::Cursor;

fn pipe_source() -> StreamPipeSource<Cursor<Vec<u8>>> {
    StreamPipeSource::new(Cursor::new(Vec::new()))
}

fn with_pipe_output(mut args: Arguments, sink: impl PipeSink + 'static) -> Arguments {
    args.set_output(Output::Pipe(Box::new(sink)));
    args
}

#[test]
fn find_returns_first_in_declaration_order() {
    let args = Arguments::from_file("in.mkv")
        .scale(Some(64), None)
        .with_video_codec("mpeg4")
        .scale(Some(32), Some(32));
    assert_eq!(args.find::<Scale>(), Some(&Scale::to_width(64)));
    assert_eq!(args.find::<VideoCodec>().map(|c| c.0.as_str()), Some("mpeg4"));
    assert!(args.find::<AudioCodec>().is_none());
}

#[test]
fn predict_frame_size_uses_first_scale() {
    let src = FrameSize::new(128, 128);
    let plain = Arguments::from_file("in.mkv");
    assert_eq!(plain.predict_frame_size(src), src);

    let scaled = Arguments::from_file("in.mkv").scale(Some(64), None);
    assert_eq!(scaled.predict_frame_size(src), FrameSize::new(64, 64));
}

#[test]
fn missing_input_or_output_is_rejected() {
    let mut no_input = Arguments::new();
    no_input.set_output(Output::File {
        path: "out.mkv".into(),
        overwrite: true,
    });
    assert!(no_input.validate().unwrap_err().to_string().contains("no input"));

    let no_output = Arguments::from_file("in.mkv");
    assert!(
        no_output
            .validate()
            .unwrap_err()
            .to_string()
            .contains("no output")
    );
}

#[test]
fn only_one_pipe_input_is_allowed() {
    let mut args = Arguments::from_pipe(pipe_source()).add_pipe_input(pipe_source());
    args.set_output(Output::File {
        path: "out.mkv".into(),
        overwrite: true,
    });
    assert!(matches!(args.validate(), Err(FfError::Configuration(_))));
}

#[test]
fn invalid_scales_are_rejected() {
    for args in [
        Arguments::from_file("a").scale(None, None),
        Arguments::from_file("a").scale(Some(0), Some(10)),
    ] {
        let mut args = args;
        args.set_output(Output::File {
            path: "b".into(),
            overwrite: true,
        });
        assert!(matches!(args.validate(), Err(FfError::Configuration(_))));
    }
}

#[test]
fn pipe_output_needs_a_format() {
    let args = with_pipe_output(
        Arguments::from_file("in.mkv"),
        StreamPipeSink::new(SharedBuffer::new()),
    );
    let err = args.validate().unwrap_err();
    assert!(err.to_string().contains("-f"));

    let forced = with_pipe_output(
        Arguments::from_file("in.mkv").force_format("matroska"),
        StreamPipeSink::new(SharedBuffer::new()),
    );
    forced.validate().unwrap();

    let sink_format = with_pipe_output(
        Arguments::from_file("in.mkv"),
        StreamPipeSink::new(SharedBuffer::new()).with_format("nut"),
    );
    sink_format.validate().unwrap();
}

#[test]
fn seekable_only_container_cannot_stream_without_fragmentation() {
    let mp4 = with_pipe_output(
        Arguments::from_file("in.mkv").force_format("MP4"),
        StreamPipeSink::new(SharedBuffer::new()),
    );
    assert!(matches!(mp4.validate(), Err(FfError::Configuration(_))));

    let fragmented = with_pipe_output(
        Arguments::from_file("in.mkv")
            .force_format("mp4")
            .with_movflags("+frag_keyframe+empty_moov"),
        StreamPipeSink::new(SharedBuffer::new()),
    );
    fragmented.validate().unwrap();

    let custom = with_pipe_output(
        Arguments::from_file("in.mkv")
            .force_format("mov")
            .with_custom(["-movflags", "frag_keyframe"]),
        StreamPipeSink::new(SharedBuffer::new()),
    );
    custom.validate().unwrap();
}

#[test]
fn pipe_endpoints_are_lent_out() {
    let mut args = with_pipe_output(
        Arguments::from_file("a.mkv").add_pipe_input(pipe_source()),
        StreamPipeSink::new(SharedBuffer::new()).with_format("nut"),
    );
    let (source, sink) = args.pipe_endpoints();
    assert!(source.is_some());
    assert!(sink.is_some());

    let mut files = Arguments::from_files(["a.mkv", "b.mkv"]);
    let (source, sink) = files.pipe_endpoints();
    assert!(source.is_none() && sink.is_none());
    assert_eq!(files.inputs().len(), 2);
}

#[test]
fn last_forced_format_is_the_one_validated() {
    let mp4_last = with_pipe_output(
        Arguments::from_file("in.mkv")
            .force_format("matroska")
            .force_format("mp4"),
        StreamPipeSink::new(SharedBuffer::new()),
    );
    assert!(matches!(mp4_last.validate(), Err(FfError::Configuration(_))));

    let matroska_last = with_pipe_output(
        Arguments::from_file("in.mkv")
            .force_format("mp4")
            .force_format("matroska"),
        StreamPipeSink::new(SharedBuffer::new()),
    );
    matroska_last.validate().unwrap();

    let custom_overrides = with_pipe_output(
        Arguments::from_file("in.mkv")
            .force_format("matroska")
            .with_custom(["-f", "mov"]),
        StreamPipeSink::new(SharedBuffer::new()),
    );
    assert!(matches!(
        custom_overrides.validate(),
        Err(FfError::Configuration(_))
    ));
}

#[test]
fn custom_format_tokens_satisfy_pipe_output() {
    let custom = with_pipe_output(
        Arguments::from_file("in.mkv").with_custom(["-f", "matroska"]),
        StreamPipeSink::new(SharedBuffer::new()),
    );
    custom.validate().unwrap();

    // An input-side `-f` says nothing about the output container.
    let pre_input = with_pipe_output(
        Arguments::from_file("in.mkv").with(CustomArgument::pre_input(["-f", "matroska"])),
        StreamPipeSink::new(SharedBuffer::new()),
    );
    assert!(matches!(pre_input.validate(), Err(FfError::Configuration(_))));
}
