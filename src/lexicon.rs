//! Keyword tables shared by the classifier, the enricher and the scoring
//! layer.
//!
//! All of this is plain immutable data: a [`Lexicon`] is built once (usually
//! via [`Default`]) and passed by reference wherever keyword matching
//! happens, so a single instance can serve a whole batch run across worker
//! threads.

/// A named keyword category used by the scoring layer to count topic hits.
#[derive(Debug, Clone)]
pub struct Category {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

/// Immutable keyword configuration for parsing and scoring.
#[derive(Debug, Clone)]
pub struct Lexicon {
    /// Phrases that mark a service event (join/leave, encryption notice,
    /// subject change, deleted message, missed call). A message body
    /// containing any of these is reclassified as a system message.
    pub system_phrases: Vec<&'static str>,
    /// Placeholder substrings chat apps insert for stripped media.
    pub media_markers: Vec<&'static str>,
    /// Tokens that identify the exporting user in a two-person chat, used
    /// by the chat-name heuristic to pick "the other person".
    pub self_identifiers: Vec<&'static str>,
    /// Topic categories scored by the analysis layer.
    pub categories: Vec<Category>,
    /// Glyphs treated as positive signal when averaging glyph sentiment.
    pub positive_glyphs: &'static [char],
    /// Glyphs treated as negative signal.
    pub negative_glyphs: &'static [char],
}

const SYSTEM_PHRASES: &[&str] = &[
    "Messages and calls are end-to-end encrypted",
    "created group",
    "added",
    "removed",
    "left",
    "joined",
    "changed the subject",
    "changed this group",
    "changed the group description",
    "security code changed",
    "You're now an admin",
    "You deleted this message",
    "This message was deleted",
    "Missed voice call",
    "Missed video call",
];

const MEDIA_MARKERS: &[&str] = &[
    "<Media omitted>",
    "image omitted",
    "video omitted",
    "audio omitted",
    "document omitted",
    "sticker omitted",
    "GIF omitted",
];

const SELF_IDENTIFIERS: &[&str] = &["You", "you", "Me", "+1"];

const CATEGORIES: &[Category] = &[
    Category {
        name: "affection",
        keywords: &["love", "miss you", "proud of you", "thinking of you", "<3"],
    },
    Category {
        name: "banter",
        keywords: &["lol", "haha", "lmao", "rofl", "dead", "no way"],
    },
    Category {
        name: "support",
        keywords: &["sorry", "here for you", "hope you", "congrats", "good luck", "feel better"],
    },
    Category {
        name: "plans",
        keywords: &["let's", "tomorrow", "tonight", "this weekend", "wanna", "are you free"],
    },
    Category {
        name: "logistics",
        keywords: &["meeting", "schedule", "deadline", "invoice", "project", "report"],
    },
    Category {
        name: "conflict",
        keywords: &["whatever", "annoyed", "angry", "seriously?", "forget it"],
    },
];

const POSITIVE_GLYPHS: &[char] = &[
    '😀', '😃', '😄', '😁', '😊', '😍', '🥰', '😘', '🤗', '🤩', '🥳', '😎', '👍', '👌', '💪',
    '🙌', '👏', '🔥', '💯', '💕', '💖', '💗',
];

const NEGATIVE_GLYPHS: &[char] = &[
    '😢', '😭', '😞', '😔', '😟', '😕', '🙁', '😣', '😖', '😫', '😩', '🥺', '😠', '😡', '🤬',
    '😤', '💔', '👎', '😰', '😨', '😱', '🤮',
];

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            system_phrases: SYSTEM_PHRASES.to_vec(),
            media_markers: MEDIA_MARKERS.to_vec(),
            self_identifiers: SELF_IDENTIFIERS.to_vec(),
            categories: CATEGORIES.to_vec(),
            positive_glyphs: POSITIVE_GLYPHS,
            negative_glyphs: NEGATIVE_GLYPHS,
        }
    }
}

impl Lexicon {
    /// True if `body` contains any system/service phrase.
    pub fn is_system_body(&self, body: &str) -> bool {
        self.system_phrases.iter().any(|p| body.contains(p))
    }

    /// True if `body` contains any media placeholder.
    pub fn is_media_body(&self, body: &str) -> bool {
        self.media_markers.iter().any(|m| body.contains(m))
    }

    /// True if `name` looks like the exporting user rather than a contact.
    pub fn is_self_identifier(&self, name: &str) -> bool {
        self.self_identifiers.iter().any(|k| name.contains(k))
    }
}
