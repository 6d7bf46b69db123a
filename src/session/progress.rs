//! Typing indicator shown while an exchange is pending
//!
//! The indicator cycles through [`PHASE_COUNT`] phases on a fixed period.
//! Its timer only exists while a [`TypingGuard`] is alive: starting the
//! indicator resets the phase to 0 and spawns the ticking task, dropping the
//! guard aborts the task and hides the indicator.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};

/// Number of animation phases
pub const PHASE_COUNT: usize = 3;

/// Default animation period
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(750);

/// Shortest accepted period; a zero period is raised to this
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Renders a phase as its dot string (`●`, `● ●`, `● ● ●`)
///
/// # Examples
///
/// ```
/// use aita::session::progress::render_phase;
///
/// assert_eq!(render_phase(0), "●");
/// assert_eq!(render_phase(2), "● ● ●");
/// ```
pub fn render_phase(phase: usize) -> &'static str {
    match phase % PHASE_COUNT {
        0 => "●",
        1 => "● ●",
        _ => "● ● ●",
    }
}

/// Source of the typing animation for one session
///
/// Observers call [`ProgressIndicator::subscribe`] and read `Some(phase)`
/// while the indicator runs, `None` while it is hidden.
#[derive(Debug)]
pub struct ProgressIndicator {
    period: Duration,
    phase: Arc<watch::Sender<Option<usize>>>,
    /// Ticking task of the latest `start`
    active: Mutex<Option<AbortHandle>>,
}

impl ProgressIndicator {
    pub fn new(period: Duration) -> Self {
        if period < MIN_PERIOD {
            tracing::warn!(period_ms = period.as_millis() as u64, "Typing interval too short, using 1ms");
        }
        let (tx, _rx) = watch::channel(None);
        Self {
            period: period.max(MIN_PERIOD),
            phase: Arc::new(tx),
            active: Mutex::new(None),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Receiver for phase updates; `None` means not rendered
    pub fn subscribe(&self) -> watch::Receiver<Option<usize>> {
        self.phase.subscribe()
    }

    /// Current phase, `None` when hidden
    pub fn current(&self) -> Option<usize> {
        *self.phase.borrow()
    }

    /// Starts the animation at phase 0
    ///
    /// Must be called from within a tokio runtime. The timer lives exactly
    /// as long as the returned guard.
    pub fn start(&self) -> TypingGuard {
        self.phase.send_replace(Some(0));

        let phase = Arc::clone(&self.phase);
        let period = self.period;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                phase.send_modify(|p| {
                    if let Some(current) = p {
                        *current = (*current + 1) % PHASE_COUNT;
                    }
                });
            }
        });

        let previous = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task.abort_handle());
        if let Some(previous) = previous {
            previous.abort();
        }

        tracing::trace!(period_ms = period.as_millis() as u64, "Typing indicator started");
        TypingGuard {
            task: Some(task),
            phase: Arc::clone(&self.phase),
        }
    }

    /// Stops the running animation, if any, and hides the indicator
    ///
    /// Used on teardown while a [`TypingGuard`] is still held elsewhere.
    /// Releasing that guard later leaves the indicator hidden.
    pub fn stop(&self) {
        let active = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = active {
            task.abort();
            tracing::trace!("Typing indicator stopped on teardown");
        }
        self.phase.send_replace(None);
    }
}

impl Default for ProgressIndicator {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

/// Scoped ownership of the indicator's timer
///
/// Dropping the guard stops the ticking task and hides the indicator.
#[derive(Debug)]
pub struct TypingGuard {
    task: Option<JoinHandle<()>>,
    phase: Arc<watch::Sender<Option<usize>>>,
}

impl TypingGuard {
    /// Stops the animation now instead of at end of scope
    pub fn stop(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            self.phase.send_replace(None);
            tracing::trace!("Typing indicator stopped");
        }
    }
}

impl Drop for TypingGuard {
    fn drop(&mut self) {
        self.release();
    }
}
