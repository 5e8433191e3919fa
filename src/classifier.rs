//! Line classification against the supported export dialects.
//!
//! Every pattern is composed from the same date/time/meridiem fragments and
//! compiled once. The table order matters: the bracketed forms are more
//! specific and must be tried before the looser unbracketed ones, and the
//! system-notice form (no `sender:` segment) comes last. First match wins.

use lazy_static::lazy_static;
use regex::Regex;

use crate::lexicon::Lexicon;
use crate::models::{Dialect, ParsedHeader};

lazy_static! {
    static ref DIALECTS: Vec<(Regex, Dialect)> = {
        // Shared fragments. Date separators may be /, - or .; times accept
        // : or . between components; meridiem markers tolerate dots and
        // spacing ("p.m.", "P. M.", "AM").
        let date = r"\d{1,4}[./\-]\s?\d{1,4}[./\-]\s?\d{1,4}";
        let date_slash = r"\d{1,4}/\d{1,4}/\d{1,4}";
        let date_dotdash = r"\d{1,4}[.\-]\d{1,4}[.\-]\d{1,4}";
        let time = r"\d{1,2}[.:]\d{2}(?:[.:]\d{2})?";
        let ampm = r"[AaPp](?:\.\s?|\s?)[Mm]\.?";
        // Exports sometimes prefix lines with directional marks.
        let marks = r"(?:\u{200E}|\u{200F})*";

        let table = [
            (
                format!(
                    r"^{marks}\[(?P<date>{date}),?\s+(?P<time>{time})[\s\u{{202F}}](?P<ampm>{ampm})\]\s*(?P<sender>[^:]+?):\s*(?P<body>.*)$"
                ),
                Dialect::BracketedMeridiem,
            ),
            (
                format!(
                    r"^{marks}\[(?P<date>{date}),?\s+(?P<time>{time})\]\s*(?P<sender>[^:]+?):\s*(?P<body>.*)$"
                ),
                Dialect::Bracketed,
            ),
            (
                format!(
                    r"^{marks}(?P<date>{date_slash}),?\s+(?P<time>{time})(?:[\s\u{{202F}}](?P<ampm>{ampm}))?\s*-\s*(?P<sender>[^:]+?):\s*(?P<body>.*)$"
                ),
                Dialect::UsDash,
            ),
            (
                format!(
                    r"^{marks}(?P<date>{date_dotdash}),?\s+(?P<time>{time})\s*-\s*(?P<sender>[^:]+?):\s*(?P<body>.*)$"
                ),
                Dialect::EuDash,
            ),
            (
                format!(
                    r"^{marks}(?:\[(?P<date>{date}),?\s+(?P<time>{time})(?:[\s\u{{202F}}](?P<ampm>{ampm}))?\]|(?P<date2>{date}),?\s+(?P<time2>{time})(?:[\s\u{{202F}}](?P<ampm2>{ampm}))?\s+-)\s*(?P<body>.*)$"
                ),
                Dialect::SystemNotice,
            ),
        ];

        table
            .into_iter()
            .map(|(pattern, dialect)| (Regex::new(&pattern).unwrap(), dialect))
            .collect()
    };
}

fn clean_body(body: &str) -> String {
    body.replace(['\u{200E}', '\u{200F}'], "").trim().to_string()
}

/// Matches one line against the dialect table.
///
/// Returns a [`ParsedHeader`] when the line starts a new message, `None`
/// when it is a continuation of whatever message preceded it. A header
/// whose body contains a system/service phrase is reclassified as a system
/// message regardless of which dialect matched; the sender string itself is
/// forced to `"System"` later, at enrichment.
///
/// Known limitation, kept deliberately: a pasted continuation line that
/// happens to look like a header will open a new message. Classification is
/// strictly line-local, with no lookahead.
pub fn classify_line(line: &str, lexicon: &Lexicon) -> Option<ParsedHeader> {
    for (regex, dialect) in DIALECTS.iter() {
        if let Some(caps) = regex.captures(line) {
            let sender = caps.name("sender").map(|m| m.as_str().trim().to_string());
            let body = clean_body(caps.name("body").map_or("", |m| m.as_str()));
            let system = sender.is_none() || lexicon.is_system_body(&body);
            return Some(ParsedHeader {
                dialect: *dialect,
                date_token: caps
                    .name("date")
                    .or_else(|| caps.name("date2"))
                    .unwrap()
                    .as_str()
                    .to_string(),
                time_token: caps
                    .name("time")
                    .or_else(|| caps.name("time2"))
                    .unwrap()
                    .as_str()
                    .to_string(),
                meridiem: caps
                    .name("ampm")
                    .or_else(|| caps.name("ampm2"))
                    .map(|m| m.as_str().to_string()),
                sender,
                body,
                system,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> Option<ParsedHeader> {
        classify_line(line, &Lexicon::default())
    }

    #[test]
    fn test_bracketed_meridiem() {
        let h = classify("[1/15/24, 10:30:45 AM] Alice: Hello everyone!").unwrap();
        assert_eq!(h.dialect, Dialect::BracketedMeridiem);
        assert_eq!(h.date_token, "1/15/24");
        assert_eq!(h.time_token, "10:30:45");
        assert_eq!(h.meridiem.as_deref(), Some("AM"));
        assert_eq!(h.sender.as_deref(), Some("Alice"));
        assert_eq!(h.body, "Hello everyone!");
        assert!(!h.system);
    }

    #[test]
    fn test_bracketed_without_meridiem() {
        let h = classify("[15/01/24, 10:30:45] Bob: Hi").unwrap();
        assert_eq!(h.dialect, Dialect::Bracketed);
        assert_eq!(h.meridiem, None);
    }

    #[test]
    fn test_us_dash() {
        let h = classify("1/5/24, 10:00 - Alice: Hi there").unwrap();
        assert_eq!(h.dialect, Dialect::UsDash);
        assert_eq!(h.sender.as_deref(), Some("Alice"));
        assert_eq!(h.body, "Hi there");
    }

    #[test]
    fn test_us_dash_with_meridiem() {
        let h = classify("3/6/18, 1:55\u{202F}PM - a: m").unwrap();
        assert_eq!(h.dialect, Dialect::UsDash);
        assert_eq!(h.meridiem.as_deref(), Some("PM"));
    }

    #[test]
    fn test_eu_dash_dotted_date() {
        let h = classify("26.10.2025, 20:40 - Priya: see you then").unwrap();
        assert_eq!(h.dialect, Dialect::EuDash);
        assert_eq!(h.date_token, "26.10.2025");
    }

    #[test]
    fn test_system_notice_without_sender() {
        let h = classify("06/03/2017, 00:45 - You created group \"Trip\"").unwrap();
        assert_eq!(h.dialect, Dialect::SystemNotice);
        assert_eq!(h.sender, None);
        assert!(h.system);
        assert_eq!(h.body, "You created group \"Trip\"");
    }

    #[test]
    fn test_bracketed_system_notice() {
        let h = classify("[06/03/2017, 00:45] Messages and calls are end-to-end encrypted. Tap for more info.").unwrap();
        assert_eq!(h.dialect, Dialect::SystemNotice);
        assert!(h.system);
    }

    #[test]
    fn test_keyword_reclassification_keeps_original_sender_token() {
        // Matches the normal sender-header pattern, but the join phrase
        // forces the system flag. The sender token survives here; it is
        // replaced during enrichment.
        let h = classify("1/5/24, 10:05 - Alice: Bob joined using an invite link").unwrap();
        assert_eq!(h.dialect, Dialect::UsDash);
        assert_eq!(h.sender.as_deref(), Some("Alice"));
        assert!(h.system);
    }

    #[test]
    fn test_plain_text_is_continuation() {
        assert!(classify("This is a continuation").is_none());
        assert!(classify("see you at 10:30 maybe").is_none());
    }

    #[test]
    fn test_bare_datetime_line_is_continuation() {
        // Neither bracketed nor dash-separated: stays part of the previous
        // message body.
        assert!(classify("2016-04-29 10:30:00").is_none());
    }

    #[test]
    fn test_directional_mark_prefix_tolerated() {
        let h = classify("\u{200E}[23/10/21, 18:44:02] Iago: \u{200E}sticker omitted").unwrap();
        assert_eq!(h.sender.as_deref(), Some("Iago"));
        assert_eq!(h.body, "sticker omitted");
    }

    #[test]
    fn test_header_shaped_paste_opens_new_message() {
        // The documented misclassification: a pasted line shaped like a
        // header is indistinguishable from a real one.
        let h = classify("1/1/20, 09:00 - Eve: quoted text");
        assert!(h.is_some());
    }

    #[test]
    fn test_dialect_order_prefers_bracketed() {
        // A bracketed line must not be picked up by the looser forms.
        let h = classify("[3/6/18 1:55:00 p. m.] a: m").unwrap();
        assert_eq!(h.dialect, Dialect::BracketedMeridiem);
    }
}
