use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::feed::model::Feed;
use crate::feed::rss::to_rss_string;
use crate::util::feed_file_name;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to encode feed: {0}")]
    Encode(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to write feed: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for feeds as soon as a node is assembled.
pub trait FeedSink {
    fn emit(&mut self, feed: &Feed) -> Result<(), SinkError>;
}

fn encode(feed: &Feed) -> Result<String, SinkError> {
    to_rss_string(feed).map_err(|e| SinkError::Encode(e.into()))
}

/// Writes every document to a stream, one after another, flushing after each.
pub struct WriterSink<W: Write> {
    out: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl WriterSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> FeedSink for WriterSink<W> {
    fn emit(&mut self, feed: &Feed) -> Result<(), SinkError> {
        let document = encode(feed)?;
        self.out.write_all(document.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Writes each feed to `<dir>/<last path segment>.xml`, replacing older files.
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Paths written so far, in emission order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FeedSink for DirectorySink {
    fn emit(&mut self, feed: &Feed) -> Result<(), SinkError> {
        let document = encode(feed)?;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(feed_file_name(feed.url()));
        if self.written.contains(&path) {
            tracing::warn!(
                path = %path.display(),
                url = %feed.url(),
                "Feed file already written in this run, replacing it"
            );
        }
        write_atomically(&path, document.as_bytes())?;
        tracing::info!(path = %path.display(), items = feed.items.len(), "Wrote feed");
        self.written.push(path);
        Ok(())
    }
}

/// Writes to a sibling temp file, syncs it, then renames over `path`, so a
/// reader never sees a half-written feed.
fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", suffix));

    let result = (|| {
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}
