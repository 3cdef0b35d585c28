//! Human-readable sizes, speeds and durations.

use std::time::Duration;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Pick the unit for `bytes`: each step up happens at a factor of 1024.
#[allow(clippy::cast_precision_loss)]
const fn pick_unit(bytes: u64) -> (f64, &'static str) {
    if bytes >= GB {
        (GB as f64, "GB")
    } else if bytes >= MB {
        (MB as f64, "MB")
    } else if bytes >= KB {
        (KB as f64, "KB")
    } else {
        (1.0, "B")
    }
}

/// Format a byte count, e.g. `512 B`, `1.50 MB`.
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    let (divisor, unit) = pick_unit(bytes);
    if unit == "B" {
        format!("{bytes} B")
    } else {
        format!("{:.2} {unit}", bytes as f64 / divisor)
    }
}

/// Format a throughput in bytes per second.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn format_speed(bytes_per_sec: f64) -> String {
    if !bytes_per_sec.is_finite() || bytes_per_sec <= 0.0 {
        return "-- B/s".to_string();
    }
    let rounded = bytes_per_sec as u64;
    let (divisor, unit) = pick_unit(rounded);
    if unit == "B" {
        format!("{rounded} B/s")
    } else {
        format!("{:.2} {unit}/s", bytes_per_sec / divisor)
    }
}

/// Format a duration as `hh:mm:ss`. Hours are not wrapped.
pub fn format_hms(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
