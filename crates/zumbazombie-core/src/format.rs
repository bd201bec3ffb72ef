//! Duration labels shown on the home screen and the settings menu.

/// Formats milliseconds as `MM:SS`, truncating partial seconds.
///
/// Minutes are not wrapped into hours.
pub fn format_time(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// "1 minute", "15 minutes".
pub fn format_minutes(minutes: u32) -> String {
    if minutes == 1 {
        "1 minute".to_string()
    } else {
        format!("{minutes} minutes")
    }
}
