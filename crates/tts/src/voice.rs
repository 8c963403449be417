use std::path::{Path, PathBuf};

/// Optional reference sample used to condition the generated voice
///
/// Existence is checked on every job, so a sample can be added or removed
/// while the worker runs. A missing file disables conditioning without error.
#[derive(Debug, Clone)]
pub struct VoiceReference {
    path: PathBuf,
}

impl VoiceReference {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The reference path if it currently points at a regular file
    pub async fn resolve(&self) -> Option<PathBuf> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_file() => Some(self.path.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_resolves_to_none() {
        let voice = VoiceReference::new("/definitely/not/here.wav");
        assert_eq!(voice.resolve().await, None);
    }

    #[tokio::test]
    async fn directory_is_not_a_reference() {
        let dir = tempfile::tempdir().unwrap();
        let voice = VoiceReference::new(dir.path());
        assert_eq!(voice.resolve().await, None);
    }

    #[tokio::test]
    async fn existence_is_rechecked_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrator.wav");
        let voice = VoiceReference::new(&path);

        assert_eq!(voice.resolve().await, None);

        std::fs::write(&path, b"RIFF").unwrap();
        assert_eq!(voice.resolve().await, Some(path.clone()));

        std::fs::remove_file(&path).unwrap();
        assert_eq!(voice.resolve().await, None);
    }
}
