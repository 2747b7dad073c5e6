//! Stream continuation bookkeeping.

use tracing::warn;

/// What to request after a chunk has been merged.
#[derive(Debug, Clone, PartialEq)]
pub enum Continuation {
    /// Re-send the scene model with this chunk id.
    Model { chunk_id: serde_json::Value },
    /// File-load mode: GET the next numbered file.
    File { url: String },
    Done,
}

/// Tracks the chunk id of an in-progress stream.
#[derive(Debug, Clone, Default)]
pub struct ChunkCursor {
    pending: Option<serde_json::Value>,
    file_url: Option<String>,
}

impl ChunkCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the file URL for file-load mode. Continuations then advance the
    /// numeric suffix of this URL rather than re-sending a model.
    pub fn set_file_url(&mut self, url: Option<String>) {
        self.file_url = url;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn reset(&mut self) {
        self.pending = None;
    }

    /// The continuation of a stream whose next chunk was never received,
    /// for example because a pick request replaced it in flight.
    pub fn resume(&self) -> Continuation {
        match (&self.pending, &self.file_url) {
            (None, _) => Continuation::Done,
            (Some(_), Some(url)) => Continuation::File { url: url.clone() },
            (Some(chunk_id), None) => Continuation::Model {
                chunk_id: chunk_id.clone(),
            },
        }
    }

    /// Called once per merged chunk. Yields exactly one continuation when
    /// `more` is set, otherwise ends the stream.
    pub fn advance(&mut self, chunk_id: &serde_json::Value, more: bool) -> Continuation {
        if !more {
            self.pending = None;
            return Continuation::Done;
        }

        match self.file_url.as_deref() {
            Some(current) => match next_indexed_url(current) {
                Some(next) => {
                    self.file_url = Some(next.clone());
                    self.pending = Some(chunk_id.clone());
                    Continuation::File { url: next }
                }
                None => {
                    warn!(url = current, "file-load url has no numeric suffix; stream stopped");
                    self.pending = None;
                    Continuation::Done
                }
            },
            None => {
                self.pending = Some(chunk_id.clone());
                Continuation::Model {
                    chunk_id: chunk_id.clone(),
                }
            }
        }
    }
}

/// Increments the trailing number of the last path segment's file stem,
/// keeping zero padding: `scene_009.json` becomes `scene_010.json`.
pub fn next_indexed_url(url: &str) -> Option<String> {
    let path_end = url.find(['?', '#']).unwrap_or(url.len());
    let (path, suffix) = url.split_at(path_end);

    let segment_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let segment = &path[segment_start..];
    let stem_len = match segment.rfind('.') {
        Some(dot) if dot > 0 => dot,
        _ => segment.len(),
    };
    let stem = &segment[..stem_len];

    let digits = stem.len() - stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let number_start = segment_start + stem_len - digits;
    let number_end = segment_start + stem_len;
    let current: u64 = path[number_start..number_end].parse().ok()?;
    let next = current.checked_add(1)?;

    Some(format!(
        "{}{:0width$}{}{}",
        &path[..number_start],
        next,
        &path[number_end..],
        suffix,
        width = digits
    ))
}
