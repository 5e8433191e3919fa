//! chatscope parses exported chat logs into an enriched message stream and
//! derives heuristic conversation statistics from it.
//!
//! The parser tolerates the common export dialects (bracketed and
//! unbracketed timestamps, 12h/24h clocks, several date orderings, embedded
//! system notices, multi-line messages, mixed text encodings) and always
//! produces one canonical [`ChatParseResult`] per input file. The scoring
//! layer in [`analysis`] consumes that result opaquely; report rendering
//! and retrieval layers are external consumers of the same structure.

pub mod analysis;
pub mod batch;
pub mod classifier;
pub mod datetime;
pub mod error;
pub mod lexicon;
pub mod models;
pub mod parser;

pub use error::ParseError;
pub use models::{ChatParseResult, DateSpan, Message, ParseOptions};

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::lexicon::Lexicon;

/// Decodes raw file bytes, trying encodings in a fixed priority order:
/// UTF-8 (with or without a byte-order mark), then WHATWG windows-1252,
/// which subsumes Latin-1. The first encoding that decodes without error
/// wins.
fn decode_bytes(bytes: &[u8]) -> Option<Cow<'_, str>> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Some(Cow::Borrowed(s.strip_prefix('\u{FEFF}').unwrap_or(s)));
    }
    let (text, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
    if !had_errors {
        return Some(text);
    }
    None
}

/// Parses a chat export file into a [`ChatParseResult`].
///
/// The file is memory-mapped rather than copied into an intermediate
/// `String`, which keeps peak memory low on very large exports. Encoding
/// detection follows the priority chain in [`decode_bytes`]; a file no
/// supported encoding can decode yields [`ParseError::Decode`]. A file that
/// decodes but contains no recognizable messages yields an empty result,
/// not an error.
pub fn parse_file<P: AsRef<Path>>(
    path: P,
    options: &ParseOptions,
) -> Result<ChatParseResult, ParseError> {
    let path = path.as_ref();
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("chat")
        .to_string();

    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(parse_str(&stem, "", options));
    }
    let mmap = unsafe { Mmap::map(&file)? };
    let text = decode_bytes(&mmap).ok_or_else(|| ParseError::Decode {
        path: path.to_path_buf(),
    })?;
    Ok(parse_str(&stem, &text, options))
}

/// Parses chat export text into a [`ChatParseResult`].
///
/// `source_name` is the file stem (or any display name) used by the
/// chat-name heuristic.
pub fn parse_str(source_name: &str, text: &str, options: &ParseOptions) -> ChatParseResult {
    let lines: Vec<&str> = text.split('\n').collect();
    let raw = parser::build_raw_stream(&lines, options);
    let messages = parser::enrich_messages(&raw, options);

    let participants = extract_participants(&messages);
    let chat_name = derive_chat_name(source_name, &participants, &options.lexicon);
    let date_span = derive_date_span(&messages);

    ChatParseResult {
        chat_name,
        participants,
        messages,
        date_span,
    }
}

/// Sorted distinct non-system senders.
fn extract_participants(messages: &[Message]) -> Vec<String> {
    let set: BTreeSet<&str> = messages
        .iter()
        .filter(|m| !m.is_system)
        .map(|m| m.sender.as_str())
        .collect();
    set.into_iter().map(String::from).collect()
}

/// Chat display name: a `Chat with X` filename pattern wins; a two-person
/// chat is named after whichever participant does not look like the
/// exporting user; larger chats become `Group Chat (N participants)`; the
/// bare file stem is the fallback.
fn derive_chat_name(source_name: &str, participants: &[String], lexicon: &Lexicon) -> String {
    for prefix in ["WhatsApp Chat with ", "Chat with "] {
        if let Some(rest) = source_name.strip_prefix(prefix) {
            return rest.trim().to_string();
        }
    }
    match participants.len() {
        2 => participants
            .iter()
            .find(|p| !lexicon.is_self_identifier(p))
            .cloned()
            .unwrap_or_else(|| source_name.to_string()),
        n if n > 2 => format!("Group Chat ({n} participants)"),
        _ => source_name.to_string(),
    }
}

fn derive_date_span(messages: &[Message]) -> Option<DateSpan> {
    let first = messages.first()?;
    let mut span = DateSpan {
        start: first.timestamp,
        end: first.timestamp,
    };
    for m in messages {
        span.start = span.start.min(m.timestamp);
        span.end = span.end.max(m.timestamp);
    }
    Some(span)
}
