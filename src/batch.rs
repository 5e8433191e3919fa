//! Batch processing of a directory of chat exports.
//!
//! Files are independent, so they are parsed on a rayon worker pool; each
//! worker owns its own result and nothing is shared. A file that fails to
//! parse is logged and skipped; one corrupt export never halts the run.
//! Within a file, parsing stays strictly sequential.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::analysis;
use crate::error::ParseError;
use crate::models::{ChatParseResult, DateSpan, ParseOptions};
use crate::parse_file;

/// Per-chat entry in the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSummary {
    pub name: String,
    pub participants: Vec<String>,
    pub message_count: usize,
    pub date_span: Option<DateSpan>,
}

/// What a directory run produced.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total_chats: usize,
    pub total_messages: usize,
    /// Union of participants across all chats, sorted.
    pub participants: Vec<String>,
    pub chats: Vec<ChatSummary>,
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '(' | ')') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn write_artifacts(
    chat: &ChatParseResult,
    output_dir: &Path,
    options: &ParseOptions,
) -> io::Result<()> {
    let stem = sanitize_name(&chat.chat_name);

    let chat_json = serde_json::to_string_pretty(chat).map_err(io::Error::other)?;
    fs::write(output_dir.join(format!("{stem}_processed.json")), chat_json)?;

    let analysis = analysis::analyze_chat(chat, &options.lexicon);
    let analysis_json = serde_json::to_string_pretty(&analysis).map_err(io::Error::other)?;
    fs::write(output_dir.join(format!("{stem}_analysis.json")), analysis_json)?;

    Ok(())
}

fn summarize(chats: &[ChatParseResult]) -> BatchSummary {
    let mut participants: Vec<String> = chats
        .iter()
        .flat_map(|c| c.participants.iter().cloned())
        .collect();
    participants.sort();
    participants.dedup();

    BatchSummary {
        total_chats: chats.len(),
        total_messages: chats.iter().map(|c| c.messages.len()).sum(),
        participants,
        chats: chats
            .iter()
            .map(|c| ChatSummary {
                name: c.chat_name.clone(),
                participants: c.participants.clone(),
                message_count: c.messages.len(),
                date_span: c.date_span,
            })
            .collect(),
    }
}

/// Parses every `*.txt` export in `input_dir`, writes per-chat JSON
/// artifacts plus a `processing_summary.json` into `output_dir`, and
/// returns the summary.
///
/// Per-file failures are logged and skipped; empty parses are logged and
/// skipped; the rest proceed independently.
pub fn process_directory(
    input_dir: &Path,
    output_dir: &Path,
    options: &ParseOptions,
) -> Result<BatchSummary, ParseError> {
    fs::create_dir_all(output_dir)?;

    let mut files: Vec<PathBuf> = fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();
    info!(count = files.len(), dir = %input_dir.display(), "found chat export files");

    let chats: Vec<ChatParseResult> = files
        .par_iter()
        .filter_map(|path| match parse_file(path, options) {
            Ok(chat) if chat.is_empty() => {
                warn!(path = %path.display(), "no messages parsed, skipping");
                None
            }
            Ok(chat) => {
                if let Err(e) = write_artifacts(&chat, output_dir, options) {
                    error!(path = %path.display(), error = %e, "failed to write artifacts");
                }
                Some(chat)
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to parse chat export");
                None
            }
        })
        .collect();

    let summary = summarize(&chats);
    let summary_json = serde_json::to_string_pretty(&summary).map_err(io::Error::other)?;
    fs::write(output_dir.join("processing_summary.json"), summary_json)?;
    info!(
        chats = summary.total_chats,
        messages = summary.total_messages,
        "batch processing complete"
    );

    Ok(summary)
}
