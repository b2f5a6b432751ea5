//! Text rendering for result pages

use crate::pager::PageView;
use crate::types::ResultSet;
use crate::utils::format_duration;
use std::fmt::Write;

/// Render a result page for the user
///
/// Items are numbered by their absolute index so selection replies stay
/// valid across pages.
pub(crate) fn page_text(result_set: &ResultSet, view: &PageView<'_>) -> String {
    let mut text = String::new();
    if let Some(label) = &result_set.label {
        let _ = writeln!(text, "📂 {label}");
    }
    let _ = writeln!(text, "Select a track by number:");
    for (offset, item) in view.items.iter().enumerate() {
        let _ = writeln!(
            text,
            "{}. {} by {} ({})",
            view.start_index + offset + 1,
            item.title,
            item.uploader,
            format_duration(item.duration_secs)
        );
    }
    let _ = writeln!(text);
    let _ = write!(
        text,
        "Send a number to fetch, 'all' for everything, or 'discard' to cancel."
    );
    if view.has_next {
        let _ = write!(
            text,
            "\nSend {} for the next page.",
            view.last_absolute_index() + 1
        );
    }
    text
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::pager;
    use crate::test_helpers::direct_item;

    fn result_set(n: usize, label: Option<&str>) -> ResultSet {
        let items = (1..=n).map(|i| direct_item(&format!("Track {i}"))).collect();
        ResultSet::new(items, label.map(str::to_string))
    }

    #[test]
    fn first_page_numbers_from_one_and_hints_next() {
        let rs = result_set(15, None);
        let view = pager::page(&rs, 0, 10).unwrap();
        let text = page_text(&rs, &view);
        assert!(text.contains("1. Track 1 by Test Artist (3:35)"));
        assert!(text.contains("10. Track 10"));
        assert!(!text.contains("11. Track 11"));
        assert!(text.contains("Send 11 for the next page."));
    }

    #[test]
    fn second_page_keeps_absolute_numbering() {
        let rs = result_set(15, None);
        let view = pager::page(&rs, 1, 10).unwrap();
        let text = page_text(&rs, &view);
        assert!(text.contains("11. Track 11"));
        assert!(text.contains("15. Track 15"));
        assert!(!text.contains("next page"), "last page has no hint");
    }

    #[test]
    fn label_renders_as_a_heading() {
        let rs = result_set(3, Some("Road Trip Mix"));
        let view = pager::page(&rs, 0, 10).unwrap();
        let text = page_text(&rs, &view);
        assert!(text.starts_with("📂 Road Trip Mix\n"));
    }
}
