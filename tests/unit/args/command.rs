use super::*;
use crate::args::argument::{CustomArgument, Scale};
use crate::pipes::frame::RawVideoPipeSource;
use crate::pipes::sink::{SharedBuffer, StreamPipeSink};
use std::time::Duration;

fn render(args: &Arguments) -> Vec<String> {
    CommandLine::render(args, &EngineConfig::default())
        .unwrap()
        .args
}

#[test]
fn file_to_file_ordering() {
    let mut args = Arguments::from_file("in.mkv")
        .with_video_codec("mpeg4")
        .seek(Duration::from_secs(2))
        .with(CustomArgument::pre_input(["-hide_banner"]));
    args.set_output(Output::File {
        path: "out.mkv".into(),
        overwrite: true,
    });
    assert_eq!(
        render(&args),
        vec![
            "-ss",
            "00:00:02.000",
            "-hide_banner",
            "-i",
            "in.mkv",
            "-c:v",
            "mpeg4",
            "-y",
            "out.mkv"
        ]
    );
}

#[test]
fn no_overwrite_renders_n() {
    let mut args = Arguments::from_file("in.mkv");
    args.set_output(Output::File {
        path: "out.mkv".into(),
        overwrite: false,
    });
    assert_eq!(render(&args), vec!["-i", "in.mkv", "-n", "out.mkv"]);
}

#[test]
fn pipes_render_reserved_tokens_and_stream_args() {
    let frames = (0..2).map(|_| image::RgbImage::new(8, 6));
    let source = RawVideoPipeSource::new(frames).unwrap();
    let mut args = Arguments::from_pipe(source).with_video_codec("mpeg4");
    args.set_output(Output::Pipe(Box::new(
        StreamPipeSink::new(SharedBuffer::new()).with_format("matroska"),
    )));
    assert_eq!(
        render(&args),
        vec![
            "-f", "rawvideo", "-pix_fmt", "rgb24", "-s", "8x6", "-r", "25", "-i", "pipe:0", "-c:v",
            "mpeg4", "-f", "matroska", "pipe:1"
        ]
    );
}

#[test]
fn filters_merge_into_one_chain() {
    let mut args = Arguments::from_file("in.mkv")
        .with(Scale::to_width(64))
        .with_video_codec("mpeg4")
        .with_video_filter("hflip");
    args.set_output(Output::File {
        path: "o.mkv".into(),
        overwrite: true,
    });
    assert_eq!(
        render(&args),
        vec![
            "-i",
            "in.mkv",
            "-vf",
            "scale=64:-1,hflip",
            "-c:v",
            "mpeg4",
            "-y",
            "o.mkv"
        ]
    );
}

#[test]
fn program_comes_from_config() {
    let mut args = Arguments::from_file("in.mkv");
    args.set_output(Output::File {
        path: "out file.mkv".into(),
        overwrite: true,
    });
    let cfg = EngineConfig::default().with_binary_folder("/opt/ff");
    let cmd = CommandLine::render(&args, &cfg).unwrap();
    assert_eq!(cmd.program, cfg.ffmpeg_path());
    assert!(cmd.to_string().ends_with("-y \"out file.mkv\""));
}

#[test]
fn invalid_collection_is_not_rendered() {
    let args = Arguments::from_file("in.mkv");
    assert!(CommandLine::render(&args, &EngineConfig::default()).is_err());
}
