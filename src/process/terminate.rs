use std::io;
use std::process::{Child, ExitStatus};
use std::time::{Duration, Instant};

/// Stop `child`: graceful request first, forceful kill once `grace` has elapsed.
pub(crate) fn terminate(
    child: &mut Child,
    grace: Duration,
    poll: Duration,
) -> io::Result<ExitStatus> {
    if request_stop(child) {
        let deadline = Instant::now() + grace;
        loop {
            if let Some(status) = child.try_wait()? {
                tracing::debug!(pid = child.id(), %status, "engine stopped gracefully");
                return Ok(status);
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(poll.min(deadline - now));
        }
        tracing::debug!(pid = child.id(), ?grace, "grace period elapsed, killing engine");
    }

    match child.kill() {
        Ok(()) => {}
        // Already exited and reaped between the last poll and the kill.
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => {}
        Err(e) => return Err(e),
    }
    child.wait()
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn request_stop(child: &Child) -> bool {
    let Ok(pid) = libc::pid_t::try_from(child.id()) else {
        return false;
    };
    // SAFETY: `kill(2)` has no memory-safety preconditions. `pid` belongs to a child we have not
    // reaped yet, so it cannot refer to a recycled process.
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc != 0 {
        tracing::debug!(pid, error = %io::Error::last_os_error(), "SIGTERM failed");
        return false;
    }
    true
}

#[cfg(not(unix))]
fn request_stop(_child: &Child) -> bool {
    false
}
