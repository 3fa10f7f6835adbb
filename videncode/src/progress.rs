use std::io::Write;

/**
    Percentage of video frames decoded, if the total is known and non-zero.
*/
pub fn percent(decoded: u64, total: Option<u64>) -> Option<f64> {
    match total {
        Some(total) if total > 0 => Some(decoded as f64 / total as f64 * 100.0),
        _ => None,
    }
}

/**
    Overwrite the progress line on stdout.
*/
pub fn report(decoded: u64, total: Option<u64>) {
    if let Some(percent) = percent(decoded, total) {
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "Progress: {percent:.2}%\r");
        let _ = stdout.flush();
    }
}
