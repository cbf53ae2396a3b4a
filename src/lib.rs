#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/countdown-widget/")]

//! # countdown-widget
//!
//! A countdown-timer display widget: give it an initial duration and it
//! decrements a remaining-time value on a fixed cadence, renders a formatted
//! `[HH:]MM:SS` string, and notifies observers on each tick and upon
//! completion.
//!
//! ## Overview
//!
//! The widget is a single stateful scheduling loop. Each tick measures the
//! wall-clock time actually elapsed since the previous tick, not the nominal
//! interval, subtracts it from the remaining time, and re-arms itself with a
//! drift-corrected delay so the cadence stays aligned despite scheduler
//! jitter. The host drives the widget through four lifecycle methods (start,
//! reset, refreshed, stop) mirroring mount, configuration change, render
//! refresh, and unmount.
//!
//! ## Features
//!
//! - **Drift-corrected cadence** that self-realigns after late or early ticks
//! - **Exactly one notification per tick**: progress or completion, never both
//! - **Pluggable formatting** with a clock-style `[HH:]MM:SS` default
//! - **Injectable scheduling** for deterministic, virtual-clock tests
//! - **Styling pass-through** via lipgloss, opaque to the countdown core
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use countdown_widget::prelude::*;
//! use std::time::Duration;
//!
//! let mut countdown = countdown_new(Duration::from_secs(300))
//!     .with_on_tick(|remaining| println!("{}s to go", remaining.as_secs()))
//!     .with_on_elapsed(|| println!("done"));
//!
//! countdown.start();
//! println!("{}", countdown.view()); // "05:00"
//! ```
//!
//! ## Deterministic Testing
//!
//! The countdown never talks to a timer facility directly; it goes through
//! the [`schedule::Scheduler`] trait. Tests inject a
//! [`schedule::VirtualScheduler`] and advance its clock by hand:
//!
//! ```rust
//! use countdown_widget::prelude::*;
//! use std::time::Duration;
//!
//! let scheduler = VirtualScheduler::new();
//! let mut countdown =
//!     countdown_new(Duration::from_secs(10)).with_scheduler(scheduler.clone());
//!
//! countdown.start();
//! scheduler.advance(Duration::from_secs(4));
//! assert_eq!(countdown.view(), "00:06");
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`countdown`] | The countdown driver and widget model |
//! | [`format`] | Default `[HH:]MM:SS` formatter and the `FormatFn` alias |
//! | [`schedule`] | Scheduler trait, tokio default, virtual test scheduler |

pub mod countdown;
pub mod format;
pub mod schedule;

pub use countdown::{
    new as countdown_new, new_with_interval as countdown_new_with_interval, ElapsedFn,
    Model as Countdown, Phase, TickFn, DEFAULT_INTERVAL,
};
pub use format::{format_remaining, FormatFn};
pub use schedule::{Scheduler, TimerFn, TimerHandle, TokioScheduler, VirtualScheduler};

/// Prelude module for convenient imports.
///
/// Re-exports the countdown model, its constructors, and the scheduling types
/// most applications and tests touch.
///
/// # Usage
///
/// ```rust
/// use countdown_widget::prelude::*;
/// use std::time::Duration;
///
/// let countdown = countdown_new(Duration::from_secs(30));
/// assert_eq!(countdown.view(), "00:30");
/// ```
pub mod prelude {
    pub use crate::countdown::{
        new as countdown_new, new_with_interval as countdown_new_with_interval, ElapsedFn,
        Model as Countdown, Phase, TickFn, DEFAULT_INTERVAL,
    };
    pub use crate::format::{format_remaining, FormatFn};
    pub use crate::schedule::{Scheduler, TimerFn, TimerHandle, TokioScheduler, VirtualScheduler};
}
