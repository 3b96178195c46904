use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::ScopedJoinHandle;
use std::time::Instant;

use crate::args::command::CommandLine;
use crate::foundation::cancel::CancelToken;
use crate::foundation::config::EngineConfig;
use crate::foundation::error::{FfError, FfResult};
use crate::pipes::pump::{CountingReader, CountingWriter};
use crate::pipes::sink::PipeSink;
use crate::pipes::source::PipeSource;
use crate::process::diagnostics::{DiagnosticLog, for_each_line};
use crate::process::outcome::{
    PumpEndpoint, PumpFault, RunResult, RunStats, Verdict, classify,
};
use crate::process::terminate::terminate;
use crate::progress::monitor::ProgressMonitor;

/// Pipe endpoints lent to one run.
#[derive(Default)]
pub(crate) struct RunIo<'a> {
    pub(crate) source: Option<&'a mut dyn PipeSource>,
    pub(crate) sink: Option<&'a mut dyn PipeSink>,
}

/// Lifecycle of one run, traced at debug level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RunState {
    Created,
    Spawning,
    Running,
    Completed,
    Cancelled,
    Faulted,
}

fn transition(state: &mut RunState, next: RunState) {
    tracing::debug!(from = ?*state, to = ?next, "run state");
    *state = next;
}

#[derive(Default)]
struct RunCounters {
    bytes_in: AtomicU64,
    bytes_out: AtomicU64,
    diagnostic_lines: AtomicU64,
    progress_events: AtomicU64,
}

impl RunCounters {
    fn snapshot(&self) -> RunStats {
        RunStats {
            bytes_in: self.bytes_in.load(Ordering::Relaxed),
            bytes_out: self.bytes_out.load(Ordering::Relaxed),
            diagnostic_lines: self.diagnostic_lines.load(Ordering::Relaxed),
            progress_events: self.progress_events.load(Ordering::Relaxed),
        }
    }
}

/// Everything the scoped phase of a run hands back to the classifier.
struct Finished {
    status: io::Result<ExitStatus>,
    cancelled: bool,
    faults: Vec<PumpFault>,
    log: DiagnosticLog,
}

/// Spawn `cmd`, pump its standard streams and wait for it to exit or for `cancel` to fire.
///
/// Source pump, sink pump and diagnostic reader run on scoped threads; the calling thread
/// watches for exit. The result is produced only after all of them have finished.
pub(crate) fn execute(
    cmd: &CommandLine,
    io: RunIo<'_>,
    monitor: &mut ProgressMonitor,
    config: &EngineConfig,
    cancel: &CancelToken,
) -> FfResult<RunResult> {
    let started = Instant::now();
    let mut state = RunState::Created;
    transition(&mut state, RunState::Spawning);
    if cancel.is_cancelled() {
        transition(&mut state, RunState::Cancelled);
        return Ok(RunResult::cancelled_before_spawn());
    }

    let mut command = Command::new(&cmd.program);
    command
        .args(&cmd.args)
        .stdin(piped_if(io.source.is_some()))
        .stdout(piped_if(io.sink.is_some()))
        .stderr(Stdio::piped());
    if let Some(dir) = &config.working_directory {
        command.current_dir(dir);
    }
    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            transition(&mut state, RunState::Faulted);
            return Err(FfError::spawn(cmd.program.display().to_string(), e));
        }
    };
    transition(&mut state, RunState::Running);
    tracing::debug!(pid = child.id(), command = %cmd, "engine spawned");

    let counters = RunCounters::default();
    let finished = run_spawned(&mut child, io, monitor, config, cancel, &counters);
    let status = finished.status.map_err(|e| {
        transition(&mut state, RunState::Faulted);
        FfError::Io(e)
    })?;

    let diagnostics = finished.log.tail();
    let exit_code = status.code();
    let verdict = classify(exit_code, &finished.faults, finished.cancelled, &diagnostics);
    let failure = match verdict {
        Verdict::Succeeded => {
            let delivered = monitor.finish();
            counters
                .progress_events
                .fetch_add(delivered, Ordering::Relaxed);
            transition(&mut state, RunState::Completed);
            None
        }
        Verdict::Cancelled => {
            transition(&mut state, RunState::Cancelled);
            None
        }
        Verdict::Failed(failure) => {
            tracing::debug!(%failure, "engine run failed");
            transition(&mut state, RunState::Completed);
            Some(failure)
        }
    };

    Ok(RunResult {
        success: failure.is_none() && !finished.cancelled,
        exit_code,
        cancelled: finished.cancelled,
        diagnostics,
        failure,
        pump_faults: finished.faults,
        stats: counters.snapshot(),
        elapsed: started.elapsed(),
    })
}

fn piped_if(piped: bool) -> Stdio {
    if piped { Stdio::piped() } else { Stdio::null() }
}

fn run_spawned(
    child: &mut Child,
    io: RunIo<'_>,
    monitor: &mut ProgressMonitor,
    config: &EngineConfig,
    cancel: &CancelToken,
    counters: &RunCounters,
) -> Finished {
    // Fired once the engine has exited (or on cancel); the engine reads no more input after that.
    let input_stop = CancelToken::new();
    // Fired only on cancel: after a natural exit the sink must still drain buffered output.
    let output_stop = CancelToken::new();

    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    std::thread::scope(|scope| {
        let input_stop_ref = &input_stop;
        let output_stop_ref = &output_stop;

        let source_pump = match (io.source, stdin) {
            (Some(source), Some(mut stdin)) => Some(scope.spawn(move || {
                let result = {
                    let mut writer = CountingWriter::new(&mut stdin, &counters.bytes_in);
                    source.write_to(&mut writer, input_stop_ref)
                };
                // Closing stdin is the end-of-input signal.
                drop(stdin);
                result
            })),
            _ => None,
        };

        let sink_pump = match (io.sink, stdout) {
            (Some(sink), Some(mut stdout)) => Some(scope.spawn(move || {
                let mut reader = CountingReader::new(&mut stdout, &counters.bytes_out);
                sink.read_from(&mut reader, output_stop_ref)
            })),
            _ => None,
        };

        let diagnostic_reader = stderr.map(|mut stderr| {
            scope.spawn(move || {
                let mut log = DiagnosticLog::new(config.diagnostic_tail_lines);
                let read = for_each_line(&mut stderr, |line| {
                    counters.diagnostic_lines.fetch_add(1, Ordering::Relaxed);
                    match monitor.observe_line(line) {
                        Some(delivered) => {
                            counters
                                .progress_events
                                .fetch_add(delivered, Ordering::Relaxed);
                        }
                        None => {
                            tracing::trace!(target: "ffweave::engine", "{line}");
                            log.push(line);
                        }
                    }
                });
                if let Err(e) = read {
                    tracing::warn!(error = %e, "diagnostic stream read failed");
                }
                log
            })
        });

        let (status, cancelled) = watch_exit(child, config, cancel, &input_stop, &output_stop);
        input_stop.cancel();

        let mut faults = Vec::new();
        join_pump(source_pump, PumpEndpoint::Source, &mut faults);
        join_pump(sink_pump, PumpEndpoint::Sink, &mut faults);
        let log = match diagnostic_reader.map(ScopedJoinHandle::join) {
            Some(Ok(log)) => log,
            Some(Err(_)) => {
                tracing::warn!("diagnostic reader panicked");
                DiagnosticLog::new(config.diagnostic_tail_lines)
            }
            None => DiagnosticLog::new(config.diagnostic_tail_lines),
        };
        for fault in &faults {
            tracing::debug!(%fault, "pump fault");
        }

        Finished {
            status,
            cancelled,
            faults,
            log,
        }
    })
}

/// Poll for exit while blocking on `cancel`; on cancel, stop the pumps and terminate the engine.
fn watch_exit(
    child: &mut Child,
    config: &EngineConfig,
    cancel: &CancelToken,
    input_stop: &CancelToken,
    output_stop: &CancelToken,
) -> (io::Result<ExitStatus>, bool) {
    let poll = config.poll_interval();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                tracing::debug!(%status, "engine exited");
                return (Ok(status), false);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "waiting on engine failed, killing it");
                let _ = child.kill();
                return (child.wait().map_err(|_| e), false);
            }
        }
        if cancel.wait_timeout(poll) {
            tracing::debug!(pid = child.id(), "cancellation requested");
            input_stop.cancel();
            output_stop.cancel();
            let status = terminate(child, config.termination_grace(), poll);
            return (status, true);
        }
    }
}

fn join_pump(
    handle: Option<ScopedJoinHandle<'_, io::Result<()>>>,
    endpoint: PumpEndpoint,
    faults: &mut Vec<PumpFault>,
) {
    let Some(handle) = handle else {
        return;
    };
    match handle.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => faults.push(PumpFault::from_io(endpoint, &e)),
        Err(_) => faults.push(PumpFault::panicked(endpoint)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/process/runner.rs"]
mod tests;
