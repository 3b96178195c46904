use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use ffweave::{Arguments, CancelToken, EngineConfig, Output, RunResult};

#[derive(Parser, Debug)]
#[command(name = "ffweave", version)]
struct Cli {
    /// Engine config JSON (defaults plus FFWEAVE_BINARY_FOLDER when omitted).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transcode with ffmpeg; `-` binds stdin/stdout as pipes.
    Run(RunArgs),
    /// Print ffprobe analysis as JSON; `-` reads the media from stdin.
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input path, or `-` for stdin.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Input format, required by most demuxers when reading stdin.
    #[arg(long)]
    in_format: Option<String>,

    /// Output path, or `-` for stdout.
    #[arg(long)]
    out: PathBuf,

    /// Output container (`-f`), required when writing to stdout.
    #[arg(long)]
    format: Option<String>,

    /// Video codec (`-c:v`).
    #[arg(long)]
    codec: Option<String>,

    /// Scale to `WxH`; either side may be `auto`.
    #[arg(long, value_parser = parse_scale)]
    scale: Option<(Option<u32>, Option<u32>)>,

    /// Limit output duration, in seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Seek the input, in seconds.
    #[arg(long)]
    seek: Option<f64>,

    /// Cancel the run after this many seconds.
    #[arg(long)]
    timeout: Option<f64>,

    /// Refuse to replace an existing output file.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Media path, or `-` for stdin.
    path: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = load_config(cli.config.as_deref()).and_then(|config| match cli.cmd {
        Command::Run(args) => cmd_run(args, config),
        Command::Probe(args) => cmd_probe(args, config),
    });
    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::from_path(path)?),
        None => Ok(EngineConfig::from_env()),
    }
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn parse_scale(raw: &str) -> Result<(Option<u32>, Option<u32>), String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{raw}'"))?;
    let side = |s: &str| -> Result<Option<u32>, String> {
        match s {
            "auto" | "-1" => Ok(None),
            _ => s
                .parse::<u32>()
                .map(Some)
                .map_err(|e| format!("invalid scale side '{s}': {e}")),
        }
    };
    Ok((side(w)?, side(h)?))
}

fn seconds(value: f64, what: &str) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(value).with_context(|| format!("invalid {what} '{value}'"))
}

fn cmd_run(args: RunArgs, config: EngineConfig) -> anyhow::Result<ExitCode> {
    let mut collection = if is_stdio(&args.in_path) {
        let mut source = ffweave::StreamPipeSource::new(std::io::stdin());
        if let Some(format) = &args.in_format {
            source = source.with_format(format.clone());
        }
        Arguments::from_pipe(source)
    } else {
        Arguments::from_file(&args.in_path)
    };
    if let Some(seek) = args.seek {
        collection = collection.seek(seconds(seek, "seek")?);
    }
    if let Some((width, height)) = args.scale {
        collection = collection.scale(width, height);
    }
    if let Some(codec) = &args.codec {
        collection = collection.with_video_codec(codec.clone());
    }
    if let Some(duration) = args.duration {
        collection = collection.with_duration(seconds(duration, "duration")?);
    }
    if let Some(format) = &args.format {
        collection = collection.force_format(format.clone());
    }
    if is_stdio(&args.out) {
        collection.set_output(Output::Pipe(Box::new(ffweave::StreamPipeSink::new(
            std::io::stdout(),
        ))));
    } else {
        collection.set_output(Output::File {
            path: args.out.clone(),
            overwrite: !args.no_overwrite,
        });
    }

    let cancel = CancelToken::new();
    let mut processor = ffweave::FfmpegProcessor::new(collection)
        .with_config(config)
        .cancellable_through(&cancel)
        .notify_on_elapsed(|d| eprint!("\rprocessed {}", ffweave::format_timestamp(d)));
    let command = processor.command_line()?;
    tracing::debug!(%command, "starting run");

    let done = CancelToken::new();
    let timer = match args.timeout {
        Some(timeout) => {
            let timeout = seconds(timeout, "timeout")?;
            let (cancel, done) = (cancel.clone(), done.clone());
            Some(std::thread::spawn(move || {
                if !done.wait_timeout(timeout) {
                    tracing::info!(?timeout, "timeout reached, cancelling run");
                    cancel.cancel();
                }
            }))
        }
        None => None,
    };

    let result = processor.run();
    done.cancel();
    if let Some(timer) = timer
        && timer.join().is_err()
    {
        tracing::warn!("timeout thread panicked");
    }
    eprintln!();
    Ok(report(&result?, &args.out))
}

fn report(result: &RunResult, out: &Path) -> ExitCode {
    if result.success {
        if !is_stdio(out) {
            eprintln!("wrote {}", out.display());
        }
        return ExitCode::SUCCESS;
    }
    if result.cancelled {
        eprintln!("cancelled after {:.2}s", result.elapsed.as_secs_f64());
        return ExitCode::from(130);
    }
    match &result.failure {
        Some(failure) => eprintln!("failed: {failure}"),
        None => eprintln!("failed"),
    }
    let code = result
        .exit_code
        .and_then(|c| u8::try_from(c).ok())
        .filter(|c| *c != 0)
        .unwrap_or(1);
    ExitCode::from(code)
}

fn cmd_probe(args: ProbeArgs, config: EngineConfig) -> anyhow::Result<ExitCode> {
    let analysis = if is_stdio(&args.path) {
        let mut data = Vec::new();
        std::io::stdin()
            .read_to_end(&mut data)
            .context("read media from stdin")?;
        ffweave::probe_bytes(&config, &data)?
    } else {
        ffweave::probe_file(&config, &args.path)?
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&analysis).context("serialize analysis")?
    );
    Ok(ExitCode::SUCCESS)
}
