/// Format a duration in seconds as a zero-padded `HH:MM:SS` string.
///
/// Fractional seconds are truncated, not rounded. The hours field is
/// unbounded and grows past two digits for durations of 100 hours or more.
/// Negative input saturates to `"00:00:00"`.
pub fn seconds_to_time(seconds: f64) -> String {
    let total = if seconds.is_sign_negative() || seconds.is_nan() {
        0
    } else {
        seconds as u64
    };
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}
