//! Countdown display widget.
//!
//! A countdown owns one remaining-time value and drives it down on a fixed
//! cadence with a self-rescheduling timer: each tick measures the wall-clock
//! time actually elapsed since the previous tick, subtracts it from the
//! remaining time, and arms the next tick with a drift-corrected delay so the
//! long-run cadence stays aligned despite per-tick scheduler jitter.
//!
//! Each tick emits exactly one outward notification, either a progress callback
//! with the new remaining time, or (once the value reaches zero after at
//! least one prior tick) a single completion callback, never both.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use countdown_widget::countdown::new;
//! use std::time::Duration;
//!
//! let mut countdown = new(Duration::from_secs(90))
//!     .with_on_tick(|remaining| println!("{}s left", remaining.as_secs()))
//!     .with_on_elapsed(|| println!("time's up"));
//!
//! countdown.start(); // requires a tokio runtime with the default scheduler
//! assert_eq!(countdown.view(), "01:30");
//! ```
//!
//! # Host Lifecycle
//!
//! The widget consumes four events from its host, mapped onto methods:
//!
//! | Host event | Method |
//! |---|---|
//! | mount | [`Model::start`] |
//! | initial-duration change | [`Model::reset`] |
//! | post-render refresh | [`Model::refreshed`] |
//! | unmount | [`Model::stop`] (also runs on drop) |
//!
//! A reset leaves the countdown primed but not ticking; the next
//! [`refreshed`](Model::refreshed) call re-arms it. Stopping is idempotent
//! and cancels the armed timer, so a stopped widget never mutates state or
//! reschedules again.
//!
//! # Deterministic Testing
//!
//! Inject a [`VirtualScheduler`](crate::schedule::VirtualScheduler) to drive
//! the countdown on a manual clock:
//!
//! ```rust
//! use countdown_widget::countdown::new;
//! use countdown_widget::schedule::VirtualScheduler;
//! use std::time::Duration;
//!
//! let scheduler = VirtualScheduler::new();
//! let mut countdown = new(Duration::from_secs(3)).with_scheduler(scheduler.clone());
//!
//! countdown.start();
//! scheduler.advance(Duration::from_secs(2));
//! assert_eq!(countdown.remaining(), Duration::from_secs(1));
//! ```

use crate::format::{format_remaining, FormatFn};
use crate::schedule::{Scheduler, TimerHandle, TokioScheduler};
use lipgloss_extras::prelude::*;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Default cadence between ticks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Callback fired on every non-terminal tick with the new remaining time.
pub type TickFn = Arc<dyn Fn(Duration) + Send + Sync>;

/// Callback fired exactly once per run when the countdown completes.
pub type ElapsedFn = Arc<dyn Fn() + Send + Sync>;

/// Lifecycle phase of a countdown.
///
/// Transitions are one-way apart from reset: `Unstarted -> Running` on
/// [`start`](Model::start), `Running -> Stopped` on [`stop`](Model::stop),
/// and `Running -> Running` on [`reset`](Model::reset) (the countdown is
/// re-primed without leaving the running phase). Tick processing is a no-op
/// once `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created but not yet started by the host.
    Unstarted,
    /// Actively counting down, or primed to resume after a reset.
    Running,
    /// Stopped by the host; no further state changes occur.
    Stopped,
}

/// Per-run configuration. Replaced when the host supplies a new initial
/// duration; callbacks and cadence carry over.
struct Config {
    initial: Duration,
    interval: Duration,
    format: Option<FormatFn>,
    on_tick: Option<TickFn>,
    on_elapsed: Option<ElapsedFn>,
}

/// Mutable countdown state, shared between the widget and in-flight ticks.
struct Core {
    config: Config,
    /// Time left in milliseconds. Non-increasing while running, floored at 0.
    remaining_ms: u64,
    /// Scheduler-clock instant of the previous tick. `None` before the first
    /// tick and immediately after a reset.
    last_tick_ms: Option<u64>,
    /// Handle of the armed next tick. `Some` only while running and not yet
    /// complete; at most one timer is ever outstanding.
    pending: Option<TimerHandle>,
    phase: Phase,
}

/// Notification computed by a tick, emitted after the state lock is released.
enum Notify {
    Tick(TickFn, Duration),
    Elapsed(ElapsedFn),
}

/// A countdown-timer display widget.
///
/// The model pairs the countdown driver (remaining time, cadence, lifecycle)
/// with the rendering hints the host passes through: a lipgloss [`Style`]
/// applied to the formatted string and an `allow_font_scaling` flag the core
/// never interprets.
///
/// State is held behind a mutex shared with the armed timer callback, so the
/// widget can be queried and controlled from the host while ticks fire on the
/// scheduler. All callbacks are invoked outside that lock.
pub struct Model {
    scheduler: Arc<dyn Scheduler>,
    core: Arc<Mutex<Core>>,
    /// Style applied to the rendered remaining-time string.
    pub style: Style,
    /// Font-scaling hint forwarded to the host's text renderer untouched.
    pub allow_font_scaling: bool,
}

/// Creates a countdown with the default one-second cadence.
///
/// # Examples
///
/// ```rust
/// use countdown_widget::countdown::{new, Phase, DEFAULT_INTERVAL};
/// use std::time::Duration;
///
/// let countdown = new(Duration::from_secs(30));
/// assert_eq!(countdown.remaining(), Duration::from_secs(30));
/// assert_eq!(countdown.interval(), DEFAULT_INTERVAL);
/// assert_eq!(countdown.phase(), Phase::Unstarted);
/// ```
pub fn new(initial: Duration) -> Model {
    new_with_interval(initial, DEFAULT_INTERVAL)
}

/// Creates a countdown with a custom cadence between ticks.
///
/// Shorter intervals give smoother displays at the cost of more wakeups; the
/// drift correction keeps either cadence honest against scheduler jitter.
///
/// # Examples
///
/// ```rust
/// use countdown_widget::countdown::new_with_interval;
/// use std::time::Duration;
///
/// let countdown = new_with_interval(Duration::from_secs(10), Duration::from_millis(250));
/// assert_eq!(countdown.interval(), Duration::from_millis(250));
/// ```
pub fn new_with_interval(initial: Duration, interval: Duration) -> Model {
    Model {
        scheduler: TokioScheduler::shared(),
        core: Arc::new(Mutex::new(Core {
            config: Config {
                initial,
                interval,
                format: None,
                on_tick: None,
                on_elapsed: None,
            },
            remaining_ms: to_ms(initial),
            last_tick_ms: None,
            pending: None,
            phase: Phase::Unstarted,
        })),
        style: Style::new(),
        allow_font_scaling: true,
    }
}

impl Model {
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().expect("countdown state poisoned")
    }

    /// Replaces the timer scheduler. Intended for injecting a
    /// [`VirtualScheduler`](crate::schedule::VirtualScheduler) in tests;
    /// must be called before [`start`](Model::start).
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Replaces the default `[HH:]MM:SS` formatter. The function receives the
    /// raw remaining duration and its output is displayed verbatim.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use countdown_widget::countdown::new;
    /// use std::time::Duration;
    ///
    /// let countdown = new(Duration::from_secs(5))
    ///     .with_format(|remaining| format!("{}ms", remaining.as_millis()));
    /// assert_eq!(countdown.view(), "5000ms");
    /// ```
    pub fn with_format<F>(self, format: F) -> Self
    where
        F: Fn(Duration) -> String + Send + Sync + 'static,
    {
        self.lock().config.format = Some(Arc::new(format));
        self
    }

    /// Sets the progress callback, fired on every non-terminal tick with the
    /// new remaining time.
    pub fn with_on_tick<F>(self, on_tick: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.lock().config.on_tick = Some(Arc::new(on_tick));
        self
    }

    /// Sets the completion callback, fired exactly once per run when the
    /// remaining time reaches zero.
    pub fn with_on_elapsed<F>(self, on_elapsed: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.lock().config.on_elapsed = Some(Arc::new(on_elapsed));
        self
    }

    /// Sets the lipgloss style applied to the rendered string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use countdown_widget::countdown::new;
    /// use lipgloss_extras::prelude::*;
    /// use std::time::Duration;
    ///
    /// let countdown = new(Duration::from_secs(10))
    ///     .with_style(Style::new().foreground(Color::from("red")));
    /// ```
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Sets the font-scaling pass-through hint.
    pub fn with_font_scaling(mut self, allow: bool) -> Self {
        self.allow_font_scaling = allow;
        self
    }

    /// Starts the countdown. Invoked once when the host mounts the widget.
    ///
    /// The first tick runs immediately: it observes no prior tick baseline
    /// (`dt = 0`), so it never completes the countdown, not even one created
    /// with a zero duration, and arms the next tick one full interval out.
    /// Calling `start` on a countdown that is already running or stopped is
    /// a no-op.
    pub fn start(&mut self) {
        {
            let mut core = self.lock();
            if core.phase != Phase::Unstarted {
                return;
            }
            core.phase = Phase::Running;
        }
        run_tick(&self.scheduler, &self.core);
    }

    /// Re-primes the countdown with a new initial duration.
    ///
    /// Invoked when the host's configuration changes while mounted: the armed
    /// timer is cancelled, the tick baseline is cleared, and the remaining
    /// time is set to `initial`. The countdown stays in the running phase but
    /// does not tick again until the next [`refreshed`](Model::refreshed)
    /// call re-arms it, so no stale completion can fire for the old value.
    /// Ignored once stopped.
    pub fn reset(&mut self, initial: Duration) {
        let mut core = self.lock();
        if core.phase == Phase::Stopped {
            return;
        }
        if let Some(handle) = core.pending.take() {
            self.scheduler.cancel(handle);
        }
        core.config.initial = initial;
        core.remaining_ms = to_ms(initial);
        core.last_tick_ms = None;
    }

    /// Resume-on-update hook, invoked by the host after each render refresh.
    ///
    /// Re-arms the tick loop when a reset has left the countdown primed but
    /// idle. Guarded exactly on: running, no tick baseline recorded, and
    /// positive remaining time. A refresh during normal ticking (or after
    /// completion) never double-schedules.
    pub fn refreshed(&mut self) {
        {
            let core = self.lock();
            if core.phase != Phase::Running
                || core.last_tick_ms.is_some()
                || core.remaining_ms == 0
            {
                return;
            }
        }
        run_tick(&self.scheduler, &self.core);
    }

    /// Stops the countdown. Invoked when the host unmounts the widget.
    ///
    /// Cancels the armed timer and moves to [`Phase::Stopped`]; idempotent.
    /// A tick already in flight on the scheduler performs no state mutation
    /// and arms nothing once the countdown is stopped, though a notification
    /// it had already computed may still be delivered.
    pub fn stop(&mut self) {
        let mut core = self.lock();
        core.phase = Phase::Stopped;
        if let Some(handle) = core.pending.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Time left on the countdown.
    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.lock().remaining_ms)
    }

    /// Nominal cadence between ticks.
    pub fn interval(&self) -> Duration {
        self.lock().config.interval
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Whether the countdown is actively ticking. `false` before start,
    /// after stop, and once the countdown has completed.
    pub fn running(&self) -> bool {
        let core = self.lock();
        core.phase == Phase::Running && !(core.last_tick_ms.is_some() && core.remaining_ms == 0)
    }

    /// Whether the countdown has reached zero after at least one tick
    /// baseline was recorded.
    pub fn completed(&self) -> bool {
        let core = self.lock();
        core.last_tick_ms.is_some() && core.remaining_ms == 0
    }

    /// Renders the remaining time as a styled string.
    ///
    /// Uses the custom formatter when one was supplied, otherwise the default
    /// `[HH:]MM:SS` renderer, and applies the widget's style to the result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use countdown_widget::countdown::new;
    /// use std::time::Duration;
    ///
    /// assert_eq!(new(Duration::from_secs(75)).view(), "01:15");
    /// assert_eq!(new(Duration::from_secs(3600)).view(), "01:00:00");
    /// ```
    pub fn view(&self) -> String {
        let (remaining, format) = {
            let core = self.lock();
            (
                Duration::from_millis(core.remaining_ms),
                core.config.format.clone(),
            )
        };
        let text = match format {
            Some(format) => format(remaining),
            None => format_remaining(remaining),
        };
        self.style.render(&text)
    }
}

impl Default for Model {
    /// A 60-second countdown with the default cadence and rendering.
    fn default() -> Self {
        new(Duration::from_secs(60))
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.lock();
        f.debug_struct("Model")
            .field("remaining_ms", &core.remaining_ms)
            .field("interval", &core.config.interval)
            .field("phase", &core.phase)
            .field("allow_font_scaling", &self.allow_font_scaling)
            .finish()
    }
}

impl Drop for Model {
    /// Unmount-on-drop: cancels any armed timer so a discarded widget never
    /// ticks again.
    fn drop(&mut self) {
        self.stop();
    }
}

/// One advancement of the countdown.
///
/// Runs synchronously on start and on the resume-on-update hook, and from the
/// scheduler on every armed tick thereafter. The state mutation and the
/// rescheduling are gated on the running phase; the single outward
/// notification is computed alongside but emitted after the lock is released,
/// so a stop racing an in-flight tick suppresses the state change without
/// clawing back the notification.
fn run_tick(scheduler: &Arc<dyn Scheduler>, core: &Arc<Mutex<Core>>) {
    let now = scheduler.now_ms();

    let notify = {
        let mut state = core.lock().expect("countdown state poisoned");

        let dt = match state.last_tick_ms {
            Some(previous) => now.saturating_sub(previous),
            None => 0,
        };
        let interval = to_ms(state.config.interval).max(1);
        let delay = next_delay(dt, interval);
        let remaining = state.remaining_ms.saturating_sub(dt);
        // The first tick has no baseline and can never complete, even when
        // the countdown was created with zero remaining.
        let complete = state.last_tick_ms.is_some() && remaining == 0;

        if state.phase == Phase::Running {
            if let Some(handle) = state.pending.take() {
                scheduler.cancel(handle);
            }
            if !complete {
                let next_scheduler = Arc::clone(scheduler);
                let next_core = Arc::clone(core);
                state.pending = Some(scheduler.schedule(
                    Duration::from_millis(delay),
                    Box::new(move || run_tick(&next_scheduler, &next_core)),
                ));
            }
            state.remaining_ms = remaining;
            state.last_tick_ms = Some(now);
        }

        if complete {
            state.config.on_elapsed.clone().map(Notify::Elapsed)
        } else {
            state
                .config
                .on_tick
                .clone()
                .map(|on_tick| Notify::Tick(on_tick, Duration::from_millis(remaining)))
        }
    };

    match notify {
        Some(Notify::Elapsed(on_elapsed)) => on_elapsed(),
        Some(Notify::Tick(on_tick, remaining)) => on_tick(remaining),
        None => {}
    }
}

/// Computes the drift-corrected delay before the next tick.
///
/// `phase` is how much of the nominal cadence remains after the elapsed time
/// since the previous tick. A phase under half an interval means this tick
/// fired early; skipping one full interval ahead avoids a near-immediate
/// refire while keeping ticks aligned to the nominal cadence.
fn next_delay(dt_ms: u64, interval_ms: u64) -> u64 {
    let phase = interval_ms - (dt_ms % interval_ms);
    if phase * 2 < interval_ms {
        phase + interval_ms
    } else {
        phase
    }
}

fn to_ms(duration: Duration) -> u64 {
    duration.as_millis().min(u64::MAX as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::VirtualScheduler;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Probe {
        ticks: Arc<Mutex<Vec<u64>>>,
        elapsed: Arc<AtomicUsize>,
    }

    impl Probe {
        fn new() -> Self {
            Self {
                ticks: Arc::new(Mutex::new(Vec::new())),
                elapsed: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn attach(&self, model: Model) -> Model {
            let ticks = Arc::clone(&self.ticks);
            let elapsed = Arc::clone(&self.elapsed);
            model
                .with_on_tick(move |remaining| {
                    ticks.lock().unwrap().push(remaining.as_millis() as u64)
                })
                .with_on_elapsed(move || {
                    elapsed.fetch_add(1, Ordering::SeqCst);
                })
        }

        fn ticks(&self) -> Vec<u64> {
            self.ticks.lock().unwrap().clone()
        }

        fn elapsed(&self) -> usize {
            self.elapsed.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn new_defaults() {
        let countdown = new(Duration::from_secs(30));
        assert_eq!(countdown.remaining(), Duration::from_secs(30));
        assert_eq!(countdown.interval(), Duration::from_secs(1));
        assert_eq!(countdown.phase(), Phase::Unstarted);
        assert!(!countdown.running());
        assert!(!countdown.completed());
    }

    #[test]
    fn default_is_sixty_seconds() {
        let countdown = Model::default();
        assert_eq!(countdown.remaining(), Duration::from_secs(60));
        assert_eq!(countdown.interval(), DEFAULT_INTERVAL);
    }

    #[test]
    fn start_ticks_immediately_and_arms_full_interval() {
        let scheduler = VirtualScheduler::new();
        let probe = Probe::new();
        let mut countdown =
            probe.attach(new(Duration::from_secs(5)).with_scheduler(scheduler.clone()));

        countdown.start();

        // First tick: dt = 0, remaining unchanged, next tick one interval out.
        assert_eq!(probe.ticks(), vec![5000]);
        assert_eq!(probe.elapsed(), 0);
        assert!(countdown.running());
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.next_due(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn start_is_only_honored_once() {
        let scheduler = VirtualScheduler::new();
        let probe = Probe::new();
        let mut countdown =
            probe.attach(new(Duration::from_secs(5)).with_scheduler(scheduler.clone()));

        countdown.start();
        countdown.start();

        assert_eq!(probe.ticks().len(), 1);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn counts_down_monotonically_to_zero() {
        let scheduler = VirtualScheduler::new();
        let probe = Probe::new();
        let mut countdown =
            probe.attach(new(Duration::from_millis(3500)).with_scheduler(scheduler.clone()));

        countdown.start();
        scheduler.advance(Duration::from_secs(5));

        let ticks = probe.ticks();
        assert_eq!(ticks, vec![3500, 2500, 1500, 500]);
        assert!(ticks.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(countdown.remaining(), Duration::ZERO);
        assert_eq!(probe.elapsed(), 1);
        assert!(countdown.completed());
        assert!(!countdown.running());
    }

    #[test]
    fn completion_fires_exactly_once_with_no_ticks_after() {
        let scheduler = VirtualScheduler::new();
        let probe = Probe::new();
        let mut countdown =
            probe.attach(new(Duration::from_secs(2)).with_scheduler(scheduler.clone()));

        countdown.start();
        scheduler.advance(Duration::from_secs(30));

        assert_eq!(probe.elapsed(), 1);
        let ticks_at_completion = probe.ticks().len();
        assert_eq!(scheduler.pending(), 0);

        scheduler.advance(Duration::from_secs(30));
        assert_eq!(probe.elapsed(), 1);
        assert_eq!(probe.ticks().len(), ticks_at_completion);
    }

    #[test]
    fn first_tick_never_completes_a_zero_countdown() {
        let scheduler = VirtualScheduler::new();
        let probe = Probe::new();
        let mut countdown = probe.attach(new(Duration::ZERO).with_scheduler(scheduler.clone()));

        countdown.start();

        // The very first tick has no baseline: progress, not completion.
        assert_eq!(probe.ticks(), vec![0]);
        assert_eq!(probe.elapsed(), 0);
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(Duration::from_secs(1));
        assert_eq!(probe.elapsed(), 1);
        assert_eq!(probe.ticks(), vec![0]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn stop_cancels_pending_and_is_idempotent() {
        let scheduler = VirtualScheduler::new();
        let probe = Probe::new();
        let mut countdown =
            probe.attach(new(Duration::from_secs(10)).with_scheduler(scheduler.clone()));

        countdown.start();
        scheduler.advance(Duration::from_secs(2));
        let seen = probe.ticks().len();
        let remaining = countdown.remaining();

        countdown.stop();
        countdown.stop();
        assert_eq!(countdown.phase(), Phase::Stopped);
        assert_eq!(scheduler.pending(), 0);

        scheduler.advance(Duration::from_secs(30));
        assert_eq!(probe.ticks().len(), seen);
        assert_eq!(probe.elapsed(), 0);
        assert_eq!(countdown.remaining(), remaining);
    }

    #[test]
    fn drop_cancels_pending() {
        let scheduler = VirtualScheduler::new();
        let probe = Probe::new();
        let mut countdown =
            probe.attach(new(Duration::from_secs(10)).with_scheduler(scheduler.clone()));

        countdown.start();
        assert_eq!(scheduler.pending(), 1);
        drop(countdown);

        assert_eq!(scheduler.pending(), 0);
        scheduler.advance(Duration::from_secs(30));
        assert_eq!(probe.ticks(), vec![10_000]);
        assert_eq!(probe.elapsed(), 0);
    }

    #[test]
    fn reset_reprimes_without_stale_completion() {
        let scheduler = VirtualScheduler::new();
        let probe = Probe::new();
        let mut countdown =
            probe.attach(new(Duration::from_millis(5000)).with_scheduler(scheduler.clone()));

        countdown.start();
        scheduler.advance(Duration::from_secs(2));
        assert_eq!(countdown.remaining(), Duration::from_millis(3000));

        countdown.reset(Duration::from_millis(10_000));
        assert_eq!(countdown.remaining(), Duration::from_millis(10_000));
        assert_eq!(countdown.phase(), Phase::Running);
        assert_eq!(scheduler.pending(), 0);

        // Primed but idle until the host's next render refresh.
        scheduler.advance(Duration::from_secs(3));
        assert_eq!(countdown.remaining(), Duration::from_millis(10_000));
        assert_eq!(probe.elapsed(), 0);

        countdown.refreshed();
        assert!(probe.ticks().ends_with(&[10_000]));
        scheduler.advance(Duration::from_secs(11));
        assert_eq!(countdown.remaining(), Duration::ZERO);
        assert_eq!(probe.elapsed(), 1);
    }

    #[test]
    fn refreshed_is_a_noop_while_ticking_normally() {
        let scheduler = VirtualScheduler::new();
        let probe = Probe::new();
        let mut countdown =
            probe.attach(new(Duration::from_secs(5)).with_scheduler(scheduler.clone()));

        countdown.start();
        let seen = probe.ticks().len();

        countdown.refreshed();
        assert_eq!(probe.ticks().len(), seen);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn refreshed_guards_unstarted_stopped_and_completed() {
        let scheduler = VirtualScheduler::new();
        let probe = Probe::new();
        let mut countdown =
            probe.attach(new(Duration::from_secs(1)).with_scheduler(scheduler.clone()));

        // Unstarted: nothing to resume.
        countdown.refreshed();
        assert_eq!(scheduler.pending(), 0);

        countdown.start();
        scheduler.advance(Duration::from_secs(2));
        assert!(countdown.completed());

        // Completed: zero remaining must not re-arm.
        countdown.reset(Duration::ZERO);
        countdown.refreshed();
        assert_eq!(scheduler.pending(), 0);

        countdown.stop();
        countdown.refreshed();
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn reset_after_stop_is_ignored() {
        let scheduler = VirtualScheduler::new();
        let mut countdown = new(Duration::from_secs(5)).with_scheduler(scheduler.clone());

        countdown.start();
        countdown.stop();
        countdown.reset(Duration::from_secs(99));

        assert_eq!(countdown.remaining(), Duration::from_secs(5));
        assert_eq!(countdown.phase(), Phase::Stopped);
    }

    #[test]
    fn custom_interval_sets_cadence() {
        let scheduler = VirtualScheduler::new();
        let probe = Probe::new();
        let mut countdown = probe.attach(
            new_with_interval(Duration::from_secs(3), Duration::from_millis(500))
                .with_scheduler(scheduler.clone()),
        );

        countdown.start();
        scheduler.advance(Duration::from_secs(1));

        assert_eq!(probe.ticks(), vec![3000, 2500, 2000]);
    }

    #[test]
    fn missing_callbacks_are_skipped() {
        let scheduler = VirtualScheduler::new();
        let mut countdown = new(Duration::from_secs(2)).with_scheduler(scheduler.clone());

        countdown.start();
        scheduler.advance(Duration::from_secs(5));

        assert!(countdown.completed());
    }

    #[test]
    fn view_uses_default_formatter() {
        assert_eq!(new(Duration::from_secs(60)).view(), "01:00");
        assert_eq!(new(Duration::from_secs(3661)).view(), "01:01:01");
        assert_eq!(new(Duration::ZERO).view(), "00:00");
    }

    #[test]
    fn view_uses_custom_formatter_verbatim() {
        let countdown = new(Duration::from_secs(5))
            .with_format(|remaining| format!("{} ms to go", remaining.as_millis()));
        assert_eq!(countdown.view(), "5000 ms to go");
    }

    #[test]
    fn view_tracks_remaining_while_running() {
        let scheduler = VirtualScheduler::new();
        let mut countdown = new(Duration::from_secs(90)).with_scheduler(scheduler.clone());

        countdown.start();
        assert_eq!(countdown.view(), "01:30");
        scheduler.advance(Duration::from_secs(30));
        assert_eq!(countdown.view(), "01:00");
    }

    #[test]
    fn font_scaling_hint_is_passed_through() {
        let countdown = new(Duration::from_secs(1)).with_font_scaling(false);
        assert!(!countdown.allow_font_scaling);
        assert!(new(Duration::from_secs(1)).allow_font_scaling);
    }

    #[test]
    fn drift_correction_delay() {
        // 1200ms elapsed against a 1000ms cadence: 800ms to realign.
        assert_eq!(next_delay(1200, 1000), 800);
        // On-time and first ticks wait one full interval.
        assert_eq!(next_delay(0, 1000), 1000);
        assert_eq!(next_delay(1000, 1000), 1000);
        // An early fire would leave a near-zero phase; skip a full interval.
        assert_eq!(next_delay(800, 1000), 1200);
        assert_eq!(next_delay(2600, 1000), 1400);
        // A long stall still lands back on the nominal grid.
        assert_eq!(next_delay(2500, 1000), 500);
    }

    #[test]
    fn ticks_arm_exactly_one_timer() {
        let scheduler = VirtualScheduler::new();
        let mut countdown = new(Duration::from_secs(10)).with_scheduler(scheduler.clone());

        countdown.start();
        for _ in 0..5 {
            assert_eq!(scheduler.pending(), 1);
            scheduler.advance(Duration::from_secs(1));
        }
    }
}
