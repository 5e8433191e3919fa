use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by [`parse_file`](crate::parse_file).
///
/// Timestamp parse failures are not represented here: they degrade to a
/// sentinel value inside the stream (see
/// [`NormalizedTimestamp`](crate::datetime::NormalizedTimestamp)) and never
/// propagate. An export that yields zero messages is likewise not an error;
/// callers check [`ChatParseResult::is_empty`](crate::models::ChatParseResult::is_empty).
#[derive(Debug, Error)]
pub enum ParseError {
    /// No supported text encoding could decode the file. Fatal for that
    /// file; the batch driver logs it and moves on.
    #[error("could not decode {} with any supported encoding", .path.display())]
    Decode { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
