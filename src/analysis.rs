//! Heuristic scoring over a parsed chat.
//!
//! Everything here is deliberate point-scoring over keyword hits and
//! message cadence, not a model: the outputs rank tendencies, they do not
//! claim linguistic correctness. The parser's [`Message`] records are
//! consumed opaquely; nothing in this module reaches into parser internals.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::lexicon::Lexicon;
use crate::models::{ChatParseResult, Message};

/// A reply under five minutes counts as fast.
const FAST_REPLY_SECS: f64 = 300.0;
/// A reply over an hour counts as slow.
const SLOW_REPLY_SECS: f64 = 3600.0;
/// A physical gap over an hour opens a new conversation.
const CONVERSATION_GAP_SECS: f64 = 3600.0;

const GLYPH_POSITIVE_WEIGHT: f64 = 0.8;
const GLYPH_NEGATIVE_WEIGHT: f64 = -0.8;

/// Reply-time statistics for one directed sender pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponsePattern {
    pub from: String,
    pub to: String,
    pub median_seconds: f64,
    pub mean_seconds: f64,
    pub fast_replies: usize,
    pub slow_replies: usize,
    pub total: usize,
}

/// Everything the scoring layer derives from one chat.
#[derive(Debug, Clone, Serialize)]
pub struct ChatAnalysis {
    pub chat_name: String,
    /// Messages hitting each keyword category at least once.
    pub category_hits: BTreeMap<String, usize>,
    pub response_patterns: Vec<ResponsePattern>,
    /// Messages per sender that opened a conversation after a long gap.
    pub conversation_starters: BTreeMap<String, usize>,
    /// Mean glyph polarity per sender, over recognized glyphs only.
    pub glyph_sentiment: BTreeMap<String, f64>,
    /// Relationship-type label to accumulated points.
    pub relationship_scores: BTreeMap<String, i64>,
    pub strength_label: String,
    pub insights: Vec<String>,
}

fn median(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Messages whose body mentions any keyword of each category.
fn count_category_hits(messages: &[&Message], lexicon: &Lexicon) -> BTreeMap<String, usize> {
    let mut hits = BTreeMap::new();
    for category in &lexicon.categories {
        let count = messages
            .iter()
            .filter(|m| {
                let body = m.body.to_lowercase();
                category.keywords.iter().any(|k| body.contains(k))
            })
            .count();
        hits.insert(category.name.to_string(), count);
    }
    hits
}

/// Directed reply-time statistics between consecutive messages from
/// different senders. Uses the stream's physical gap; turn filtering is the
/// sender-differs check.
fn response_patterns(messages: &[&Message]) -> Vec<ResponsePattern> {
    let mut by_pair: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
    for pair in messages.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        if cur.sender == prev.sender {
            continue;
        }
        if let Some(delta) = cur.seconds_since_previous {
            if delta >= 0.0 {
                by_pair
                    .entry((prev.sender.clone(), cur.sender.clone()))
                    .or_default()
                    .push(delta);
            }
        }
    }

    by_pair
        .into_iter()
        .map(|((from, to), mut times)| {
            times.sort_by(f64::total_cmp);
            let total = times.len();
            let mean = times.iter().sum::<f64>() / total as f64;
            ResponsePattern {
                from,
                to,
                median_seconds: median(&times),
                mean_seconds: mean,
                fast_replies: times.iter().filter(|&&t| t < FAST_REPLY_SECS).count(),
                slow_replies: times.iter().filter(|&&t| t > SLOW_REPLY_SECS).count(),
                total,
            }
        })
        .collect()
}

/// Messages opening a conversation after a gap above the threshold.
fn conversation_starters(messages: &[&Message]) -> BTreeMap<String, usize> {
    let mut starters = BTreeMap::new();
    for m in messages {
        if m.seconds_since_previous
            .is_some_and(|d| d > CONVERSATION_GAP_SECS)
        {
            *starters.entry(m.sender.clone()).or_insert(0) += 1;
        }
    }
    starters
}

/// Mean polarity of recognized glyphs per sender.
fn glyph_sentiment(messages: &[&Message], lexicon: &Lexicon) -> BTreeMap<String, f64> {
    let mut scores: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for m in messages {
        for glyph in &m.glyphs {
            let weight = if lexicon.positive_glyphs.contains(glyph) {
                GLYPH_POSITIVE_WEIGHT
            } else if lexicon.negative_glyphs.contains(glyph) {
                GLYPH_NEGATIVE_WEIGHT
            } else {
                continue;
            };
            scores.entry(m.sender.clone()).or_default().push(weight);
        }
    }
    scores
        .into_iter()
        .map(|(sender, values)| {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            (sender, mean)
        })
        .collect()
}

fn relationship_scores(
    category_hits: &BTreeMap<String, usize>,
    patterns: &[ResponsePattern],
    message_count: usize,
) -> BTreeMap<String, i64> {
    let hits = |name: &str| category_hits.get(name).copied().unwrap_or(0) as i64;
    let fast_total: i64 = patterns.iter().map(|p| p.fast_replies as i64).sum();

    let mut scores = BTreeMap::new();
    scores.insert(
        "close friends".to_string(),
        2 * hits("banter") + 2 * hits("support") + fast_total,
    );
    scores.insert(
        "romantic".to_string(),
        3 * hits("affection") + hits("plans"),
    );
    scores.insert("professional".to_string(), 2 * hits("logistics"));
    scores.insert(
        "acquaintance".to_string(),
        (20 - (message_count as i64) / 10).max(0),
    );
    scores
}

fn strength_label(engagement: i64) -> &'static str {
    match engagement {
        e if e >= 100 => "Very Strong",
        e if e >= 50 => "Strong",
        e if e >= 20 => "Moderate",
        e if e >= 5 => "Weak",
        _ => "Very Weak",
    }
}

fn build_insights(
    messages: &[&Message],
    category_hits: &BTreeMap<String, usize>,
    patterns: &[ResponsePattern],
    label: &str,
) -> Vec<String> {
    let mut insights = Vec::new();

    let mut per_sender: BTreeMap<&str, usize> = BTreeMap::new();
    for m in messages {
        *per_sender.entry(m.sender.as_str()).or_insert(0) += 1;
    }
    if let Some((sender, count)) = per_sender.iter().max_by_key(|entry| entry.1) {
        insights.push(format!("Most active participant: {sender} ({count} messages)"));
    }

    if let Some(fastest) = patterns
        .iter()
        .min_by(|a, b| a.median_seconds.total_cmp(&b.median_seconds))
    {
        insights.push(format!(
            "Fastest replies: {} -> {} (median {:.1} min)",
            fastest.from,
            fastest.to,
            fastest.median_seconds / 60.0
        ));
    }

    if let Some((name, count)) = category_hits
        .iter()
        .filter(|entry| *entry.1 > 0)
        .max_by_key(|entry| entry.1)
    {
        insights.push(format!("Dominant topic: {name} ({count} messages)"));
    }

    insights.push(format!("Engagement: {label}"));
    insights
}

/// Scores one parsed chat. System messages are excluded throughout.
pub fn analyze_chat(chat: &ChatParseResult, lexicon: &Lexicon) -> ChatAnalysis {
    let regular: Vec<&Message> = chat.messages.iter().filter(|m| !m.is_system).collect();

    let category_hits = count_category_hits(&regular, lexicon);
    let patterns = response_patterns(&regular);
    let starters = conversation_starters(&regular);
    let sentiment = glyph_sentiment(&regular, lexicon);
    let scores = relationship_scores(&category_hits, &patterns, regular.len());

    let fast_total: i64 = patterns.iter().map(|p| p.fast_replies as i64).sum();
    let hit_total: i64 = category_hits.values().map(|&c| c as i64).sum();
    let engagement = hit_total + 2 * fast_total + (regular.len() as i64) / 25;
    let label = strength_label(engagement);

    let insights = build_insights(&regular, &category_hits, &patterns, label);

    ChatAnalysis {
        chat_name: chat.chat_name.clone(),
        category_hits,
        response_patterns: patterns,
        conversation_starters: starters,
        glyph_sentiment: sentiment,
        relationship_scores: scores,
        strength_label: label.to_string(),
        insights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParseOptions;
    use crate::parse_str;

    fn parsed(text: &str) -> ChatParseResult {
        parse_str("test", text, &ParseOptions::default())
    }

    const SAMPLE: &str = "\
1/5/24, 10:00 - Alice: lol that was great
1/5/24, 10:01 - Bob: haha yes
1/5/24, 10:02 - Alice: let's do it again tomorrow
1/5/24, 12:30 - Bob: good luck with the meeting
1/5/24, 12:31 - Alice: thanks 😊
1/5/24, 12:35 - Carol: This message was deleted
1/6/24, 09:00 - Alice: morning!";

    #[test]
    fn test_category_hits() {
        let chat = parsed(SAMPLE);
        let analysis = analyze_chat(&chat, &Lexicon::default());
        assert_eq!(analysis.category_hits["banter"], 2);
        assert_eq!(analysis.category_hits["plans"], 1);
        assert_eq!(analysis.category_hits["support"], 1);
        assert_eq!(analysis.category_hits["conflict"], 0);
    }

    #[test]
    fn test_response_patterns_directed() {
        let chat = parsed(SAMPLE);
        let analysis = analyze_chat(&chat, &Lexicon::default());
        let alice_to_bob = analysis
            .response_patterns
            .iter()
            .find(|p| p.from == "Alice" && p.to == "Bob")
            .unwrap();
        // 10:00 -> 10:01 (60 s) and 10:02 -> 12:30 (8880 s).
        assert_eq!(alice_to_bob.total, 2);
        assert_eq!(alice_to_bob.fast_replies, 1);
        assert_eq!(alice_to_bob.slow_replies, 1);
        assert_eq!(alice_to_bob.median_seconds, (60.0 + 8880.0) / 2.0);
    }

    #[test]
    fn test_same_sender_runs_are_not_replies() {
        let chat = parsed(
            "1/5/24, 10:00 - Alice: one\n1/5/24, 10:01 - Alice: two\n1/5/24, 10:02 - Alice: three",
        );
        let analysis = analyze_chat(&chat, &Lexicon::default());
        assert!(analysis.response_patterns.is_empty());
    }

    #[test]
    fn test_conversation_starters() {
        let chat = parsed(SAMPLE);
        let analysis = analyze_chat(&chat, &Lexicon::default());
        // Bob at 12:30 (gap > 1 h) and Alice the next morning.
        assert_eq!(analysis.conversation_starters["Bob"], 1);
        assert_eq!(analysis.conversation_starters["Alice"], 1);
    }

    #[test]
    fn test_glyph_sentiment_positive() {
        let chat = parsed(SAMPLE);
        let analysis = analyze_chat(&chat, &Lexicon::default());
        assert!(analysis.glyph_sentiment["Alice"] > 0.0);
    }

    #[test]
    fn test_relationship_scores_present() {
        let chat = parsed(SAMPLE);
        let analysis = analyze_chat(&chat, &Lexicon::default());
        assert!(analysis.relationship_scores["close friends"] > 0);
        assert!(analysis.relationship_scores.contains_key("romantic"));
        assert!(analysis.relationship_scores.contains_key("professional"));
        assert!(analysis.relationship_scores.contains_key("acquaintance"));
    }

    #[test]
    fn test_strength_label_buckets() {
        assert_eq!(strength_label(120), "Very Strong");
        assert_eq!(strength_label(60), "Strong");
        assert_eq!(strength_label(20), "Moderate");
        assert_eq!(strength_label(5), "Weak");
        assert_eq!(strength_label(0), "Very Weak");
    }

    #[test]
    fn test_empty_chat_analyzes_cleanly() {
        let chat = parsed("");
        let analysis = analyze_chat(&chat, &Lexicon::default());
        assert!(analysis.response_patterns.is_empty());
        assert!(analysis.insights.iter().any(|i| i.contains("Very Weak")));
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[5.0]), 5.0);
        assert_eq!(median(&[1.0, 3.0]), 2.0);
        assert_eq!(median(&[1.0, 2.0, 10.0]), 2.0);
    }
}
