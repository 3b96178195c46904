use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::foundation::cancel::CancelToken;
use crate::foundation::error::FfResult;
use crate::process::outcome::RunResult;

/// In-flight asynchronous run; resolves to the run's result.
///
/// Dropping the handle detaches the run; it keeps going until the engine exits.
#[derive(Debug)]
pub struct RunHandle {
    join: tokio::task::JoinHandle<FfResult<RunResult>>,
    cancel: CancelToken,
}

impl RunHandle {
    pub(crate) fn new(
        join: tokio::task::JoinHandle<FfResult<RunResult>>,
        cancel: CancelToken,
    ) -> Self {
        Self { join, cancel }
    }

    /// Request cancellation; the handle then resolves with `cancelled = true`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token shared with the run.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Whether the run has resolved.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

impl Future for RunHandle {
    type Output = FfResult<RunResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.join).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(join_err)) => Poll::Ready(Err(anyhow::Error::new(join_err)
                .context("engine run task failed")
                .into())),
        }
    }
}
