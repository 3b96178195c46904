use std::time::Duration;

use crate::args::collection::Arguments;
use crate::args::command::CommandLine;
use crate::foundation::cancel::CancelToken;
use crate::foundation::config::EngineConfig;
use crate::foundation::error::{FfError, FfResult};
use crate::process::handle::RunHandle;
use crate::process::outcome::RunResult;
use crate::process::runner::{RunIo, execute};
use crate::progress::monitor::ProgressMonitor;

/// Runs one [`Arguments`] collection through the engine.
///
/// Built by [`Arguments::output_to_file`] / [`Arguments::output_to_pipe`]. Progress observers and
/// the cancellation token are attached here. Running again re-renders the collection; pipe
/// endpoints are single-use, so a consumed source feeds nothing the second time. A fired token
/// stays fired, so later runs on the same processor resolve as cancelled without spawning.
#[derive(Debug)]
pub struct FfmpegProcessor {
    arguments: Arguments,
    config: EngineConfig,
    monitor: ProgressMonitor,
    cancel: CancelToken,
}

impl FfmpegProcessor {
    /// Wrap a collection; configuration comes from [`EngineConfig::from_env`].
    pub fn new(arguments: Arguments) -> Self {
        Self {
            arguments,
            config: EngineConfig::from_env(),
            monitor: ProgressMonitor::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Replace the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Observe completed fraction of `total` media time. A zero `total` is rejected.
    pub fn notify_on_fraction(
        mut self,
        total: Duration,
        callback: impl FnMut(f64) + Send + 'static,
    ) -> FfResult<Self> {
        self.monitor.on_fraction(total, callback)?;
        Ok(self)
    }

    /// Observe processed media time.
    pub fn notify_on_elapsed(mut self, callback: impl FnMut(Duration) + Send + 'static) -> Self {
        self.monitor.on_elapsed(callback);
        self
    }

    /// Cancel runs through a caller-held token.
    pub fn cancellable_through(mut self, token: &CancelToken) -> Self {
        self.cancel = token.clone();
        self
    }

    /// Handle to this processor's cancellation signal.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Borrow the argument collection.
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// Borrow the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Render the invocation without running it.
    pub fn command_line(&self) -> FfResult<CommandLine> {
        CommandLine::render(&self.arguments, &self.config)
    }

    /// Run to completion on the calling thread.
    ///
    /// Configuration and spawn problems are `Err`; engine failures and cancellation are reported
    /// in the [`RunResult`].
    #[tracing::instrument(skip_all, fields(program = ?self.config.ffmpeg_path()))]
    pub fn run(&mut self) -> FfResult<RunResult> {
        self.config.validate()?;
        let cmd = CommandLine::render(&self.arguments, &self.config)?;
        let (source, sink) = self.arguments.pipe_endpoints();
        let result = execute(
            &cmd,
            RunIo { source, sink },
            &mut self.monitor,
            &self.config,
            &self.cancel,
        )?;
        tracing::debug!(
            success = result.success,
            cancelled = result.cancelled,
            exit_code = ?result.exit_code,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "run finished"
        );
        Ok(result)
    }

    /// Like [`run`](Self::run), but a failed run becomes [`FfError::Runtime`].
    pub fn run_checked(&mut self) -> FfResult<RunResult> {
        self.run()?.into_checked()
    }

    /// Run on tokio's blocking pool; the returned handle resolves to the same result as
    /// [`run`](Self::run) and can cancel the run.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run_async(mut self) -> FfResult<RunHandle> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| FfError::configuration(format!("run_async needs a tokio runtime: {e}")))?;
        let cancel = self.cancel.clone();
        let join = runtime.spawn_blocking(move || self.run());
        Ok(RunHandle::new(join, cancel))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/process/processor.rs"]
mod tests;
