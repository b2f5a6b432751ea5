//! Utility functions for filenames, captions and temp paths

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Characters stripped from filenames before delivery
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Monotonic counter so temp paths created in the same millisecond stay unique
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Strip characters that are invalid in filenames on common filesystems
///
/// # Examples
///
/// ```
/// use tune_dl::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename("AC/DC: Back in Black?"), "ACDC Back in Black");
/// assert_eq!(sanitize_filename("plain title"), "plain title");
/// ```
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !INVALID_FILENAME_CHARS.contains(c))
        .collect()
}

/// Truncate a string to at most `max_chars` characters, respecting char boundaries
///
/// # Examples
///
/// ```
/// use tune_dl::utils::truncate_chars;
///
/// assert_eq!(truncate_chars("hello", 10), "hello");
/// assert_eq!(truncate_chars("hello", 3), "hel");
/// ```
#[must_use]
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Format a duration in seconds as `m:ss`
///
/// # Examples
///
/// ```
/// use tune_dl::utils::format_duration;
///
/// assert_eq!(format_duration(0), "0:00");
/// assert_eq!(format_duration(215), "3:35");
/// ```
#[must_use]
pub fn format_duration(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Produce a unique `.mp3` path under `dir` for an in-flight fetch
///
/// Combines a millisecond timestamp with a process-wide counter so
/// concurrent workers never collide.
#[must_use]
pub fn unique_audio_path(dir: &Path) -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    dir.join(format!("fetch-{millis}-{seq}.mp3"))
}
