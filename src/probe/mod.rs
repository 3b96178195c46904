//! Thin `ffprobe` wrapper for inspecting engine output.

pub(crate) mod analysis;

use std::io::Write as _;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use crate::foundation::config::EngineConfig;
use crate::foundation::error::{FfError, FfResult};
use crate::probe::analysis::MediaAnalysis;

fn probe_command(config: &EngineConfig) -> Command {
    let mut cmd = Command::new(config.ffprobe_path());
    cmd.args([
        "-v",
        "error",
        "-print_format",
        "json",
        "-show_format",
        "-show_streams",
    ]);
    if let Some(dir) = &config.working_directory {
        cmd.current_dir(dir);
    }
    cmd
}

fn spawn_error(config: &EngineConfig, e: std::io::Error) -> FfError {
    FfError::spawn(config.ffprobe_path().display().to_string(), e)
}

fn finish(output: Output, what: &str) -> FfResult<MediaAnalysis> {
    if !output.status.success() {
        return Err(FfError::probe(format!(
            "ffprobe failed for {what} ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    MediaAnalysis::from_json(&output.stdout)
}

/// Probe a file on disk.
#[tracing::instrument(skip_all, fields(path = ?path.as_ref()))]
pub fn probe_file(config: &EngineConfig, path: impl AsRef<Path>) -> FfResult<MediaAnalysis> {
    let path = path.as_ref();
    let output = probe_command(config)
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_error(config, e))?;
    finish(output, &format!("'{}'", path.display()))
}

/// Probe in-memory media (for example the contents of a pipe sink), fed through stdin.
#[tracing::instrument(skip_all, fields(len = data.len()))]
pub fn probe_bytes(config: &EngineConfig, data: &[u8]) -> FfResult<MediaAnalysis> {
    let mut child = probe_command(config)
        .arg("pipe:0")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error(config, e))?;
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| FfError::probe("failed to open ffprobe stdin"))?;

    let output = std::thread::scope(|scope| {
        scope.spawn(move || {
            // ffprobe may stop reading once it has seen enough; a broken pipe here is expected.
            if let Err(e) = stdin.write_all(data) {
                tracing::trace!(error = %e, "ffprobe stopped reading stdin");
            }
        });
        child.wait_with_output()
    })?;
    finish(output, "stdin")
}
