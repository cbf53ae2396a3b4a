//! Remaining-time formatting for countdown displays.
//!
//! The default renderer produces clock-style `[HH:]MM:SS` strings: the
//! remaining time is rounded to the nearest whole second, minutes and seconds
//! are always two zero-padded digits, and the hours field (with its trailing
//! separator) appears only when it is non-zero.
//!
//! A countdown can swap the default out for any function matching
//! [`FormatFn`]; see
//! [`Model::with_format`](crate::countdown::Model::with_format).
//!
//! # Examples
//!
//! ```rust
//! use countdown_widget::format::format_remaining;
//! use std::time::Duration;
//!
//! assert_eq!(format_remaining(Duration::from_secs(59)), "00:59");
//! assert_eq!(format_remaining(Duration::from_secs(60)), "01:00");
//! assert_eq!(format_remaining(Duration::from_secs(3600)), "01:00:00");
//! ```

use std::sync::Arc;
use std::time::Duration;

/// Function used to turn remaining time into display text.
///
/// A custom formatter fully replaces the default rendering; its return value
/// is displayed verbatim.
pub type FormatFn = Arc<dyn Fn(Duration) -> String + Send + Sync>;

/// Formats remaining time as `[HH:]MM:SS`.
///
/// The duration is rounded to the nearest whole second before decomposition,
/// so `1500ms` renders as `00:02` while `1499ms` renders as `00:01`. Hours
/// are omitted entirely (separator included) when zero, and grow past two
/// digits when the countdown runs long enough.
///
/// # Examples
///
/// ```rust
/// use countdown_widget::format::format_remaining;
/// use std::time::Duration;
///
/// assert_eq!(format_remaining(Duration::ZERO), "00:00");
/// assert_eq!(format_remaining(Duration::from_millis(90_500)), "01:31");
/// ```
pub fn format_remaining(remaining: Duration) -> String {
    let ms = remaining.as_millis() as u64;
    let total_secs = (ms + 500) / 1000;

    let seconds = total_secs % 60;
    let minutes = (total_secs / 60) % 60;
    let hours = total_secs / 3600;

    if hours == 0 {
        format!("{:02}:{:02}", minutes, seconds)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}
