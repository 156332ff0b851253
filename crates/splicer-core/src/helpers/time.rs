// crates/splicer-core/src/helpers/time.rs
//
// Human-readable durations for the clip list and the combine summary.

/// Compact duration: `H:MM:SS` from an hour up, `M:SS` from a minute up,
/// otherwise seconds with one decimal.
///
/// ```
/// use splicer_core::helpers::time::format_duration;
/// assert_eq!(format_duration(4.2),    "4.2s");
/// assert_eq!(format_duration(187.0),  "3:07");
/// assert_eq!(format_duration(3875.0), "1:04:35");
/// ```
pub fn format_duration(secs: f64) -> String {
    let secs = secs.max(0.0);
    let whole = secs as u64;
    if whole >= 3600 {
        format!("{}:{:02}:{:02}", whole / 3600, (whole % 3600) / 60, whole % 60)
    } else if whole >= 60 {
        format!("{}:{:02}", whole / 60, whole % 60)
    } else {
        format!("{secs:.1}s")
    }
}
