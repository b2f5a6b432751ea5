//! Reply grammar for selection replies
//!
//! Parses a user's text reply against their active session into a tagged
//! [`SelectionAction`]. Parsing is pure; the dispatcher applies the action
//! under the per-user lock.

use crate::error::{Error, Result};
use crate::pager;
use crate::types::Session;

/// What a parsed reply asks the engine to do
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionAction {
    /// Advance the session to the next page
    AdvancePage,
    /// Move the session back one page
    RetreatPage,
    /// Discard the session without fetching
    Discard,
    /// Fetch these items, as 1-based absolute indices in reply order
    SelectIndices(Vec<usize>),
    /// Treat the text as a fresh search or reference
    NewSearch(String),
}

/// Parse a text reply against the user's session state
///
/// Without a session every reply is a new search. With a session the
/// grammar accepts `all`, `discard`, a comma-separated index list, a single
/// index, or the next-page shortcut (one past the last visible index when
/// more pages exist). Anything else is [`Error::InvalidSelection`] and the
/// session must be left untouched by the caller.
///
/// A comma list keeps only the tokens that parse to in-range indices,
/// preserving reply order. A list in which NO token survives falls through
/// to a new search, while a single out-of-range index is an error. The
/// asymmetry is deliberate and load-bearing for replies like
/// `songs by a, b and c`, which would otherwise be rejected instead of
/// searched.
pub fn parse_reply(
    text: &str,
    session: Option<&Session>,
    page_size: usize,
) -> Result<SelectionAction> {
    let trimmed = text.trim();
    let Some(session) = session else {
        return Ok(SelectionAction::NewSearch(trimmed.to_string()));
    };

    let total = session.result_set.len();
    let lowered = trimmed.to_lowercase();

    if lowered == "discard" {
        return Ok(SelectionAction::Discard);
    }
    if lowered == "all" {
        return Ok(SelectionAction::SelectIndices((1..=total).collect()));
    }

    if trimmed.contains(',') {
        let indices: Vec<usize> = trimmed
            .split(',')
            .filter_map(|token| token.trim().parse::<usize>().ok())
            .filter(|&n| n >= 1 && n <= total)
            .collect();
        if indices.is_empty() {
            return Ok(SelectionAction::NewSearch(trimmed.to_string()));
        }
        return Ok(SelectionAction::SelectIndices(indices));
    }

    if let Ok(n) = trimmed.parse::<usize>() {
        let view = pager::page(&session.result_set, session.page_index, page_size)?;
        if view.has_next && n == view.last_absolute_index() + 1 {
            return Ok(SelectionAction::AdvancePage);
        }
        if n >= 1 && n <= total {
            return Ok(SelectionAction::SelectIndices(vec![n]));
        }
        return Err(Error::InvalidSelection {
            input: trimmed.to_string(),
        });
    }

    Err(Error::InvalidSelection {
        input: trimmed.to_string(),
    })
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CandidateItem, MediaSource, ResultSet, UserId};

    fn session(n: usize, page_index: usize) -> Session {
        let items = (0..n)
            .map(|i| CandidateItem {
                title: format!("Track {i}"),
                uploader: "Artist".into(),
                duration_secs: 180,
                source: MediaSource::Direct(format!("https://youtube.com/watch?v={i}")),
                source_artist: None,
                source_album: None,
            })
            .collect();
        let mut s = Session::new(UserId(1), ResultSet::new(items, None));
        s.page_index = page_index;
        s
    }

    #[test]
    fn no_session_means_new_search() {
        let action = parse_reply("  never gonna give you up  ", None, 10).unwrap();
        assert_eq!(
            action,
            SelectionAction::NewSearch("never gonna give you up".into())
        );
    }

    #[test]
    fn even_a_number_is_a_search_without_a_session() {
        let action = parse_reply("7", None, 10).unwrap();
        assert_eq!(action, SelectionAction::NewSearch("7".into()));
    }

    #[test]
    fn discard_is_case_insensitive() {
        let s = session(5, 0);
        assert_eq!(
            parse_reply("DISCARD", Some(&s), 10).unwrap(),
            SelectionAction::Discard
        );
    }

    #[test]
    fn all_selects_every_index_regardless_of_page() {
        let s = session(25, 2);
        let action = parse_reply("all", Some(&s), 10).unwrap();
        assert_eq!(
            action,
            SelectionAction::SelectIndices((1..=25).collect())
        );
    }

    #[test]
    fn comma_list_preserves_reply_order() {
        let s = session(25, 0);
        let action = parse_reply("9, 2,5", Some(&s), 10).unwrap();
        assert_eq!(action, SelectionAction::SelectIndices(vec![9, 2, 5]));
    }

    #[test]
    fn comma_list_drops_invalid_tokens() {
        let s = session(10, 0);
        let action = parse_reply("2, x, 99, 5", Some(&s), 10).unwrap();
        assert_eq!(action, SelectionAction::SelectIndices(vec![2, 5]));
    }

    #[test]
    fn comma_list_with_no_valid_tokens_becomes_a_search() {
        let s = session(10, 0);
        let action = parse_reply("songs by a, b and c", Some(&s), 10).unwrap();
        assert_eq!(
            action,
            SelectionAction::NewSearch("songs by a, b and c".into())
        );
    }

    #[test]
    fn single_in_range_index_selects() {
        let s = session(25, 1);
        let action = parse_reply("15", Some(&s), 10).unwrap();
        assert_eq!(action, SelectionAction::SelectIndices(vec![15]));
    }

    #[test]
    fn next_page_shortcut_is_one_past_the_visible_window() {
        // Page 0 shows items 1..=10 of 25, so 11 advances
        let s = session(25, 0);
        assert_eq!(
            parse_reply("11", Some(&s), 10).unwrap(),
            SelectionAction::AdvancePage
        );
        // 11 is a plain selection when page 1 is showing it
        let s = session(25, 1);
        assert_eq!(
            parse_reply("11", Some(&s), 10).unwrap(),
            SelectionAction::SelectIndices(vec![11])
        );
    }

    #[test]
    fn no_next_page_shortcut_on_the_last_page() {
        // Page 2 shows items 21..=25 of 25; 26 is simply out of range
        let s = session(25, 2);
        let err = parse_reply("26", Some(&s), 10).unwrap_err();
        assert!(matches!(err, Error::InvalidSelection { .. }));
    }

    #[test]
    fn zero_and_out_of_range_are_invalid() {
        let s = session(10, 0);
        assert!(parse_reply("0", Some(&s), 10).is_err());
        assert!(parse_reply("99", Some(&s), 10).is_err());
    }

    #[test]
    fn plain_text_with_a_session_is_invalid() {
        let s = session(10, 0);
        let err = parse_reply("play something else", Some(&s), 10).unwrap_err();
        assert!(matches!(err, Error::InvalidSelection { .. }));
    }
}
