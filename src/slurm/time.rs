/// Sentinel used for unlimited time limits and for the time left of jobs without a limit
pub const INFINITE: i64 = -1;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Formats a number of seconds as `[D-]HH:MM:SS`, matching `squeue` output.
///
/// Zero is formatted as `00:00:00`, while negative values (the [`INFINITE`]
/// sentinel, but also clock skew or overruns) are formatted as `Infinite`.
pub fn format_duration(seconds: i64) -> String {
    if seconds == 0 {
        return "00:00:00".to_string();
    } else if seconds < 0 {
        return "Infinite".to_string();
    }

    let days = seconds / DAY;
    let hours = (seconds % DAY) / HOUR;
    let minutes = (seconds % HOUR) / MINUTE;
    let seconds = seconds % MINUTE;

    if days > 0 {
        format!("{}-{:02}:{:02}:{:02}", days, hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}
