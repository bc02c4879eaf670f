//! Foreground job supervision and signal policy.
//!
//! The interpreter runs at most one foreground child at a time. Its pid lives
//! in a process-wide atomic slot that is set immediately before the blocking
//! wait begins and cleared immediately after the wait resolves; while the slot
//! is set, a single wall-clock deadline is armed. On expiry the watchdog reads
//! the slot and sends one SIGKILL — it never does more work than that, so a
//! late firing races only against the slot being cleared, never against the
//! interpreter's own state.

use anyhow::Result;
use log::debug;
use nix::sys::signal::{SigHandler, Signal, kill, signal};
use nix::unistd::Pid;
use std::io;
use std::process::{Child, ExitStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

/// Wall-clock budget for a foreground command before it is forcibly killed.
pub const FOREGROUND_DEADLINE: Duration = Duration::from_secs(10);

/// Sentinel stored in the foreground slot while no wait is in progress.
const NO_FOREGROUND: i32 = -1;

/// Ignore the interactive interrupt signal in the interpreter itself.
///
/// Ctrl-C is delivered to the whole foreground process group; with this policy
/// only the child (which restores the default disposition before exec) dies,
/// while the interpreter survives and re-prompts.
pub fn install_signal_policy() -> Result<()> {
    unsafe { signal(Signal::SIGINT, SigHandler::SigIgn) }?;
    Ok(())
}

/// Restore default signal dispositions in a child, between fork and exec.
///
/// Ignored dispositions are inherited across exec, so without this an external
/// program would be immune to Ctrl-C.
pub(crate) fn reset_child_signals() -> io::Result<()> {
    unsafe { signal(Signal::SIGINT, SigHandler::SigDfl) }.map_err(io::Error::from)?;
    Ok(())
}

/// Supervises the single foreground child and detaches background ones.
pub struct JobController {
    foreground: Arc<AtomicI32>,
    deadline: Duration,
}

impl JobController {
    pub fn new() -> Self {
        Self::with_deadline(FOREGROUND_DEADLINE)
    }

    /// Controller with a custom deadline; used by tests to avoid waiting the
    /// full budget.
    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            foreground: Arc::new(AtomicI32::new(NO_FOREGROUND)),
            deadline,
        }
    }

    /// Block until the foreground child exits, is signaled, or overruns the
    /// deadline and gets killed by the watchdog.
    ///
    /// The foreground slot is occupied for exactly the duration of this call.
    pub fn wait_foreground(&self, mut child: Child) -> Result<ExitStatus> {
        self.foreground.store(child.id() as i32, Ordering::SeqCst);
        let watchdog = self.arm_watchdog();

        let result = child.wait();

        // The slot still names the child for the instant between the kernel
        // reaping it inside `wait` and this store; a deadline expiring in that
        // window signals an already-reaped pid. Closing it fully would need a
        // pidfd; until then the worst case is a stray SIGKILL under immediate
        // pid reuse, the same window alarm-based shells have.
        self.foreground.store(NO_FOREGROUND, Ordering::SeqCst);
        drop(watchdog);
        Ok(result?)
    }

    /// Arm the deadline for the pid currently in the foreground slot.
    ///
    /// The returned guard disarms the watchdog when dropped. If the deadline
    /// expires first, whatever pid is still in the slot receives SIGKILL; the
    /// blocked wait then observes the child as signaled.
    fn arm_watchdog(&self) -> WatchdogGuard {
        let (disarm, expiry) = mpsc::channel();
        let slot = Arc::clone(&self.foreground);
        let deadline = self.deadline;
        let thread = thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = expiry.recv_timeout(deadline) {
                let pid = slot.load(Ordering::SeqCst);
                if pid > 0 {
                    debug!("watchdog: deadline expired, killing pid {pid}");
                    let _ = kill(Pid::from_raw(pid), Signal::SIGKILL);
                }
            }
        });
        WatchdogGuard {
            disarm,
            thread: Some(thread),
        }
    }
}

impl Default for JobController {
    fn default() -> Self {
        Self::new()
    }
}

/// At most one of these exists at a time, matching the single armed deadline.
struct WatchdogGuard {
    disarm: Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for WatchdogGuard {
    fn drop(&mut self) {
        // A send failure means the watchdog already fired and exited.
        let _ = self.disarm.send(());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Hand a background child off to a detached reaper and return its pid.
///
/// The interpreter reports the pid once and never tracks the job again; the
/// reaper thread exists only to collect the exit status so long sessions do
/// not accumulate kernel process records.
pub fn detach_background(mut child: Child) -> u32 {
    let pid = child.id();
    thread::spawn(move || {
        let _ = child.wait();
        debug!("background pid {pid} reaped");
    });
    pid
}
