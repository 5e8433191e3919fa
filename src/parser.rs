//! Message stream building and enrichment.
//!
//! The builder walks physical lines exactly once, keeping a single open
//! message that continuation lines are merged into. Enrichment then derives
//! the per-message metadata; everything except the sequence id and the
//! inter-message delta is independent per message, so that part runs on a
//! rayon parallel iterator.

use chrono::{Datelike, NaiveDateTime, Timelike};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::classifier::classify_line;
use crate::datetime::normalize_timestamp;
use crate::models::{Message, ParseOptions, RawMessage};

/// Walks all physical lines and emits the ordered raw message stream.
///
/// A line that matches a dialect header opens a new message; anything else
/// extends the currently open message body with an embedded line break.
/// Blank lines are skipped entirely, and a continuation arriving before any
/// header has opened a message is dropped. Strictly single pass: a
/// misclassified header-shaped continuation cannot be repaired retroactively.
pub fn build_raw_stream(lines: &[&str], options: &ParseOptions) -> Vec<RawMessage> {
    let mut stream: Vec<RawMessage> = Vec::new();

    for raw_line in lines {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        match classify_line(line, &options.lexicon) {
            Some(header) => stream.push(header.into()),
            None => match stream.last_mut() {
                Some(open) => {
                    open.body.push('\n');
                    open.body.push_str(line);
                }
                None => debug!(line, "dropping continuation line with no open message"),
            },
        }
    }

    stream
}

/// Symbolic (emoji) characters in `text`, in order of appearance.
pub fn extract_glyphs(text: &str) -> Vec<char> {
    let mut buf = [0u8; 4];
    text.chars()
        .filter(|&c| emojis::get(c.encode_utf8(&mut buf)).is_some())
        .collect()
}

/// Turns the raw stream into fully populated [`Message`]s.
///
/// Sender forcing happens here: a system-flagged raw message gets the
/// literal `"System"` sender no matter what the header carried. The
/// inter-message delta is the raw physical gap to the previous message in
/// the stream, regardless of sender.
pub fn enrich_messages(raw: &[RawMessage], options: &ParseOptions) -> Vec<Message> {
    let mut messages: Vec<Message> = raw
        .par_iter()
        .map(|m| {
            let ts = normalize_timestamp(
                &m.date_token,
                &m.time_token,
                m.meridiem.as_deref(),
                options.day_first,
            );
            let sender = match &m.sender {
                Some(s) if !m.system => s.clone(),
                _ => "System".to_string(),
            };
            Message {
                sequence_id: 0,
                timestamp: ts.at,
                timestamp_degraded: ts.degraded,
                sender,
                is_system: m.system,
                is_media: options.lexicon.is_media_body(&m.body),
                glyphs: extract_glyphs(&m.body),
                char_length: m.body.chars().count(),
                word_count: m.body.split_whitespace().count(),
                hour: ts.at.hour(),
                weekday: ts.at.weekday(),
                date: ts.at.date(),
                seconds_since_previous: None,
                body: m.body.clone(),
            }
        })
        .collect();

    let mut previous: Option<NaiveDateTime> = None;
    for (i, msg) in messages.iter_mut().enumerate() {
        msg.sequence_id = i;
        msg.seconds_since_previous =
            previous.map(|p| (msg.timestamp - p).num_milliseconds() as f64 / 1000.0);
        if msg.timestamp_degraded {
            warn!(
                sequence_id = i,
                sender = %msg.sender,
                "unparseable timestamp, degraded to current time"
            );
        }
        previous = Some(msg.timestamp);
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};

    fn build(lines: &[&str]) -> Vec<RawMessage> {
        build_raw_stream(lines, &ParseOptions::default())
    }

    fn parse(lines: &[&str]) -> Vec<Message> {
        let options = ParseOptions::default();
        enrich_messages(&build_raw_stream(lines, &options), &options)
    }

    #[test]
    fn test_multiline_merge() {
        let raw = build(&["23/06/2018, 01:55 - Loris: one", "two"]);
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].body, "one\ntwo");
    }

    #[test]
    fn test_three_line_body_keeps_two_breaks() {
        let raw = build(&["1/5/24, 10:00 - Alice: first", "second", "third"]);
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].body, "first\nsecond\nthird");
    }

    #[test]
    fn test_blank_lines_skipped() {
        let raw = build(&["1/5/24, 10:00 - Alice: hi", "", "   ", "1/5/24, 10:01 - Bob: hey"]);
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0].body, "hi");
    }

    #[test]
    fn test_orphan_continuation_dropped() {
        let raw = build(&["stray line", "1/5/24, 10:00 - Alice: hi"]);
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].body, "hi");
    }

    #[test]
    fn test_system_flag_from_notice_and_keyword() {
        let raw = build(&[
            "06/03/2017, 00:45 - You created group \"Trip\"",
            "1/5/24, 10:05 - Alice: Bob joined using an invite link",
            "1/5/24, 10:06 - Alice: lunch?",
        ]);
        assert!(raw[0].system);
        assert!(raw[1].system);
        assert!(!raw[2].system);
    }

    #[test]
    fn test_sequence_ids_are_gapless() {
        let msgs = parse(&[
            "1/5/24, 10:00 - Alice: one",
            "1/5/24, 10:01 - Bob: two",
            "1/5/24, 10:02 - Alice: three",
        ]);
        for (i, m) in msgs.iter().enumerate() {
            assert_eq!(m.sequence_id, i);
        }
    }

    #[test]
    fn test_sender_forced_for_system_messages() {
        let msgs = parse(&["1/5/24, 10:05 - Alice: Bob joined using an invite link"]);
        assert!(msgs[0].is_system);
        assert_eq!(msgs[0].sender, "System");
    }

    #[test]
    fn test_derived_fields() {
        let msgs = parse(&["1/5/24, 14:30 - Alice: hello there 😊"]);
        let m = &msgs[0];
        assert_eq!(m.hour, 14);
        assert_eq!(m.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(m.weekday, Weekday::Fri);
        assert_eq!(m.word_count, 3);
        assert_eq!(m.char_length, m.body.chars().count());
        assert_eq!(m.glyphs, vec!['😊']);
    }

    #[test]
    fn test_media_flag() {
        let msgs = parse(&[
            "1/5/24, 10:00 - Alice: <Media omitted>",
            "1/5/24, 10:01 - Bob: image omitted",
            "1/5/24, 10:02 - Alice: no media here",
        ]);
        assert!(msgs[0].is_media);
        assert!(msgs[1].is_media);
        assert!(!msgs[2].is_media);
    }

    #[test]
    fn test_seconds_since_previous_is_raw_gap() {
        let msgs = parse(&[
            "1/5/24, 10:00 - Alice: one",
            "1/5/24, 10:05 - Alice: two",
            "1/5/24, 10:04 - Bob: clock went backwards",
        ]);
        assert_eq!(msgs[0].seconds_since_previous, None);
        assert_eq!(msgs[1].seconds_since_previous, Some(300.0));
        // Out-of-order clocks yield a negative delta; sequence order still
        // follows physical line order.
        assert_eq!(msgs[2].seconds_since_previous, Some(-60.0));
    }

    #[test]
    fn test_degraded_timestamp_does_not_block_stream() {
        let msgs = parse(&[
            "1/5/24, 10:00 - Alice: fine",
            "99/99/99, 99:99 - Bob: broken clock",
            "1/5/24, 10:02 - Alice: still fine",
        ]);
        assert_eq!(msgs.len(), 3);
        assert!(!msgs[0].timestamp_degraded);
        assert!(msgs[1].timestamp_degraded);
        assert!(!msgs[2].timestamp_degraded);
    }

    #[test]
    fn test_empty_body_word_count() {
        let msgs = parse(&["03/02/17, 18:42 - Luke: "]);
        assert_eq!(msgs[0].word_count, 0);
        assert_eq!(msgs[0].char_length, 0);
    }

    #[test]
    fn test_word_count_spans_embedded_breaks() {
        let msgs = parse(&["1/5/24, 10:00 - Alice: one two", "three four"]);
        assert_eq!(msgs[0].word_count, 4);
    }
}
