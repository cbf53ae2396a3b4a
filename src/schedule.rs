//! Timer scheduling for countdown instances.
//!
//! A countdown advances by arming one timer at a time: a callback that, when
//! it fires, may arm exactly one successor. This module captures that minimal
//! contract in the [`Scheduler`] trait: `schedule(delay, callback)` returning
//! an opaque cancellable [`TimerHandle`], plus a monotonic millisecond clock,
//! so the countdown driver never talks to a concrete timer facility directly.
//!
//! Two implementations are provided:
//!
//! - [`TokioScheduler`]: the default, backed by `tokio::time::sleep`. A
//!   process-wide shared instance is available via
//!   [`TokioScheduler::shared`].
//! - [`VirtualScheduler`]: a deterministic scheduler with a manually advanced
//!   clock, intended for tests.
//!
//! # Examples
//!
//! ```rust
//! use countdown_widget::schedule::{Scheduler, VirtualScheduler};
//! use std::time::Duration;
//!
//! let scheduler = VirtualScheduler::new();
//! let handle = scheduler.schedule(Duration::from_secs(1), Box::new(|| {}));
//! assert_eq!(scheduler.pending(), 1);
//! scheduler.cancel(handle);
//! assert_eq!(scheduler.pending(), 0);
//! ```

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Callback invoked when an armed timer fires.
pub type TimerFn = Box<dyn FnOnce() + Send + 'static>;

/// Opaque handle to a scheduled timer, used to cancel it before it fires.
///
/// Handles are unique across all schedulers for the lifetime of the process;
/// a handle is spent once its timer has fired or been cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(0);

fn next_handle() -> TimerHandle {
    TimerHandle(NEXT_HANDLE.fetch_add(1, Ordering::SeqCst) + 1)
}

/// A source of one-shot timers and the clock they are measured against.
///
/// The countdown driver is written entirely against this trait, which lets
/// tests substitute a [`VirtualScheduler`] and drive time by hand. The clock
/// is monotonic and reported in milliseconds; its zero point is arbitrary.
pub trait Scheduler: Send + Sync {
    /// Arms a one-shot timer that invokes `callback` after `delay`.
    fn schedule(&self, delay: Duration, callback: TimerFn) -> TimerHandle;

    /// Cancels a previously armed timer. Cancelling a handle that has
    /// already fired or been cancelled is a no-op.
    fn cancel(&self, handle: TimerHandle);

    /// Milliseconds elapsed on this scheduler's monotonic clock.
    fn now_ms(&self) -> u64;
}

/// Default scheduler backed by the tokio runtime.
///
/// Each armed timer is a spawned task that sleeps for the requested delay and
/// then invokes its callback; cancelling aborts the task. A tokio runtime
/// must be active whenever a timer is armed, which is the case inside any
/// async host application.
///
/// Most callers never construct one directly; the countdown widget uses
/// [`TokioScheduler::shared`] unless a scheduler is injected.
pub struct TokioScheduler {
    epoch: Instant,
    tasks: Arc<Mutex<HashMap<TimerHandle, tokio::task::AbortHandle>>>,
}

impl TokioScheduler {
    /// Creates a scheduler with its clock anchored at the moment of creation.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the process-wide shared scheduler instance.
    pub fn shared() -> Arc<Self> {
        static SHARED: Lazy<Arc<TokioScheduler>> = Lazy::new(|| Arc::new(TokioScheduler::new()));
        Arc::clone(&SHARED)
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, callback: TimerFn) -> TimerHandle {
        let handle = next_handle();
        let tasks = Arc::clone(&self.tasks);

        // Hold the registry lock across the spawn so the task cannot fire
        // and look itself up before its abort handle is registered.
        let mut registry = self.tasks.lock().expect("timer registry poisoned");
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tasks.lock().expect("timer registry poisoned").remove(&handle);
            callback();
        });
        registry.insert(handle, task.abort_handle());
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(task) = self
            .tasks
            .lock()
            .expect("timer registry poisoned")
            .remove(&handle)
        {
            task.abort();
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

struct VirtualEntry {
    handle: TimerHandle,
    due_ms: u64,
    callback: TimerFn,
}

struct VirtualState {
    now_ms: u64,
    queue: Vec<VirtualEntry>,
}

/// Deterministic scheduler with a manually advanced clock.
///
/// Nothing fires on its own: [`advance`](VirtualScheduler::advance) moves the
/// clock forward and delivers every timer that comes due along the way, in
/// deadline order. Timers armed by a firing callback land in the same queue,
/// so self-rescheduling chains play out step by step under test control.
///
/// # Examples
///
/// ```rust
/// use countdown_widget::schedule::{Scheduler, VirtualScheduler};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let scheduler = VirtualScheduler::new();
/// let fired = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&fired);
/// scheduler.schedule(
///     Duration::from_millis(250),
///     Box::new(move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///     }),
/// );
///
/// scheduler.advance(Duration::from_millis(200));
/// assert_eq!(fired.load(Ordering::SeqCst), 0);
/// scheduler.advance(Duration::from_millis(100));
/// assert_eq!(fired.load(Ordering::SeqCst), 1);
/// ```
pub struct VirtualScheduler {
    state: Mutex<VirtualState>,
}

impl VirtualScheduler {
    /// Creates a virtual scheduler with its clock at zero.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(VirtualState {
                now_ms: 0,
                queue: Vec::new(),
            }),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VirtualState> {
        self.state.lock().expect("virtual scheduler poisoned")
    }

    /// Moves the clock forward by `step`, firing every timer that comes due.
    ///
    /// Timers fire in deadline order (ties break by arming order) with the
    /// clock set to their own deadline, so a callback that reads
    /// [`now_ms`](Scheduler::now_ms) observes the instant it was armed for.
    /// The lock is not held while a callback runs, so callbacks are free to
    /// arm or cancel timers on this same scheduler.
    pub fn advance(&self, step: Duration) {
        let target = self.lock().now_ms + step.as_millis() as u64;
        loop {
            let entry = {
                let mut state = self.lock();
                let next = state
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.due_ms <= target)
                    .min_by_key(|(_, e)| (e.due_ms, e.handle.0))
                    .map(|(i, _)| i);
                match next {
                    Some(i) => {
                        let entry = state.queue.remove(i);
                        state.now_ms = state.now_ms.max(entry.due_ms);
                        entry
                    }
                    None => {
                        state.now_ms = target;
                        break;
                    }
                }
            };
            (entry.callback)();
        }
    }

    /// Number of timers currently armed.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Delay until the earliest armed timer, or `None` when nothing is armed.
    pub fn next_due(&self) -> Option<Duration> {
        let state = self.lock();
        state
            .queue
            .iter()
            .map(|e| e.due_ms.saturating_sub(state.now_ms))
            .min()
            .map(Duration::from_millis)
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule(&self, delay: Duration, callback: TimerFn) -> TimerHandle {
        let handle = next_handle();
        let mut state = self.lock();
        let due_ms = state.now_ms + delay.as_millis() as u64;
        state.queue.push(VirtualEntry {
            handle,
            due_ms,
            callback,
        });
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        self.lock().queue.retain(|e| e.handle != handle);
    }

    fn now_ms(&self) -> u64 {
        self.lock().now_ms
    }
}
