use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;

use crate::lexicon::Lexicon;

/// Which line-format variant matched a header line.
///
/// Patterns are tried in the order these variants are declared; the
/// bracketed forms are more specific and must win over the looser
/// unbracketed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dialect {
    /// `[1/15/24, 10:30:45 AM] Name: Message`
    BracketedMeridiem,
    /// `[15/01/24, 10:30:45] Name: Message`
    Bracketed,
    /// `1/15/24, 10:30 - Name: Message` (meridiem optional)
    UsDash,
    /// `15.01.24, 10:30 - Name: Message`
    EuDash,
    /// Same date/time prefix but no `Name:` segment, e.g.
    /// `1/15/24, 10:30 - You created group "Trip"`.
    SystemNotice,
}

/// The result of matching one line against the dialect table. Transient:
/// immediately folded into a [`RawMessage`] by the stream builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedHeader {
    pub dialect: Dialect,
    pub date_token: String,
    pub time_token: String,
    pub meridiem: Option<String>,
    /// `None` for the standalone system-notice dialect.
    pub sender: Option<String>,
    pub body: String,
    pub system: bool,
}

/// A message as accumulated by the stream builder: header fields plus a
/// body that grows as continuation lines are appended.
#[derive(Debug, PartialEq)]
pub struct RawMessage {
    pub dialect: Dialect,
    pub date_token: String,
    pub time_token: String,
    pub meridiem: Option<String>,
    pub sender: Option<String>,
    pub body: String,
    pub system: bool,
}

impl From<ParsedHeader> for RawMessage {
    fn from(h: ParsedHeader) -> Self {
        Self {
            dialect: h.dialect,
            date_token: h.date_token,
            time_token: h.time_token,
            meridiem: h.meridiem,
            sender: h.sender,
            body: h.body,
            system: h.system,
        }
    }
}

/// A fully enriched message. Created once during parsing and never mutated
/// afterwards; every derived field is a pure function of the timestamp, the
/// body and the position in the stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// Position in the stream, 0-based, gapless.
    pub sequence_id: usize,
    /// Naive local timestamp. When no date/time layout combination parsed
    /// the header tokens this holds the wall-clock moment of parsing and
    /// `timestamp_degraded` is set.
    pub timestamp: NaiveDateTime,
    /// True when `timestamp` is the now-sentinel rather than a parsed value.
    pub timestamp_degraded: bool,
    /// The literal `"System"` for service events, otherwise the sender name
    /// exactly as exported.
    pub sender: String,
    /// Message text. Continuation lines are joined with embedded `'\n'`.
    pub body: String,
    pub is_system: bool,
    /// True if the body contains a media placeholder.
    pub is_media: bool,
    /// Symbolic (emoji) characters found in the body, in order.
    pub glyphs: Vec<char>,
    pub char_length: usize,
    pub word_count: usize,
    pub hour: u32,
    pub weekday: Weekday,
    pub date: NaiveDate,
    /// Raw physical gap to the previous message in the stream, in seconds.
    /// `None` for the first message. Deliberately sender-blind; turn-aware
    /// reply times are derived downstream.
    pub seconds_since_previous: Option<f64>,
}

/// First and last message timestamps of a chat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DateSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// The terminal artifact of parsing one export file. Owns its messages
/// exclusively; every downstream consumer takes this by reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatParseResult {
    pub chat_name: String,
    /// Sorted distinct non-system senders.
    pub participants: Vec<String>,
    pub messages: Vec<Message>,
    /// `None` when the file produced no messages.
    pub date_span: Option<DateSpan>,
}

impl ChatParseResult {
    /// A file that decoded fine but contained no recognizable messages
    /// yields an empty result rather than an error; callers check this.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Parsing configuration, built once and shared across files.
#[derive(Debug, Default)]
pub struct ParseOptions {
    /// Whether dates in the export start with the day (`Some(true)`) or the
    /// month (`Some(false)`). `None` keeps the default month-first priority
    /// when trying date layouts.
    pub day_first: Option<bool>,
    /// Keyword tables used for system/media detection and scoring.
    pub lexicon: Lexicon,
}
