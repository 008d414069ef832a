//! Destinations for exported artifacts.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::export::Artifact;

/// Accepts finished bytes with a suggested filename and MIME type.
///
/// Delivery is fire-and-forget from the pipeline's point of view;
/// implementations report their own failures.
pub trait DownloadSink {
    fn deliver(&self, bytes: &[u8], filename: &str, mime: &str);

    fn deliver_artifact(&self, artifact: &Artifact) {
        self.deliver(&artifact.bytes, &artifact.filename, artifact.mime);
    }
}

/// Writes each delivery as a file inside a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, bytes: &[u8], filename: &str, mime: &str) {
        // Only the final path component is honoured.
        let Some(name) = Path::new(filename).file_name() else {
            tracing::error!(filename, "Refusing to write artifact without a file name");
            return;
        };
        let path = self.dir.join(name);
        let result = fs::create_dir_all(&self.dir).and_then(|()| fs::write(&path, bytes));
        match result {
            Ok(()) => tracing::info!(path = %path.display(), mime, size = bytes.len(), "Saved artifact"),
            Err(err) => tracing::error!(path = %path.display(), error = %err, "Failed to save artifact"),
        }
    }
}

/// A delivery recorded by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: String,
}

/// Keeps deliveries in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    deliveries: Mutex<Vec<Delivery>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&self, bytes: &[u8], filename: &str, mime: &str) {
        self.deliveries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(Delivery {
                bytes: bytes.to_vec(),
                filename: filename.to_string(),
                mime: mime.to_string(),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("out"));
        sink.deliver(b"hello", "qr-code-1.png", "image/png");
        assert_eq!(fs::read(dir.path().join("out/qr-code-1.png")).unwrap(), b"hello");
    }

    #[test]
    fn test_directory_sink_strips_directories() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        sink.deliver(b"x", "../escape.svg", "image/svg+xml");
        assert!(dir.path().join("escape.svg").exists());
    }

    #[test]
    fn test_memory_sink_records() {
        let sink = MemorySink::new();
        let artifact = Artifact {
            bytes: vec![1, 2, 3],
            filename: "qr-code-5.pdf".into(),
            mime: "application/pdf",
        };
        sink.deliver_artifact(&artifact);
        let deliveries = sink.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].filename, "qr-code-5.pdf");
        assert_eq!(deliveries[0].mime, "application/pdf");
        assert_eq!(deliveries[0].bytes, vec![1, 2, 3]);
    }
}
