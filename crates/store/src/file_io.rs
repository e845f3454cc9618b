//! Letter file I/O

use crate::{Result, StoreError};
use doc_model::LetterFile;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write `bytes` to a sibling temp file and rename it over `path`
///
/// Readers see either the old file or the complete new one. The temp file
/// is removed on failure.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let temp_path = temp_path_for(path);
    let written = write_synced(&temp_path, bytes).and_then(|()| fs::rename(&temp_path, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "untitled".into());
    name.push(".tmp");
    path.with_file_name(name)
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(StoreError::FileNotFound(path.display().to_string()))
    }
}

/// Save a letter file
pub async fn save_letter(letter: &LetterFile, path: impl AsRef<Path>) -> Result<()> {
    let json = letter.to_json()?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Load a letter file
pub async fn load_letter(path: impl AsRef<Path>) -> Result<LetterFile> {
    let path = path.as_ref();
    ensure_exists(path)?;
    let json = tokio::fs::read_to_string(path).await?;
    Ok(LetterFile::from_json(&json)?)
}

/// Save a letter file synchronously, replacing any existing file in one step
pub fn save_letter_sync(letter: &LetterFile, path: impl AsRef<Path>) -> Result<()> {
    let json = letter.to_json()?;
    write_atomic(path.as_ref(), json.as_bytes())?;
    Ok(())
}

/// Load a letter file synchronously
pub fn load_letter_sync(path: impl AsRef<Path>) -> Result<LetterFile> {
    let path = path.as_ref();
    ensure_exists(path)?;
    let json = std::fs::read_to_string(path)?;
    Ok(LetterFile::from_json(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_sync() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("letter.json");
        let mut letter = LetterFile::default();
        letter.content.subject = "Quarterly review".into();

        save_letter_sync(&letter, &path).unwrap();
        let loaded = load_letter_sync(&path).unwrap();
        assert_eq!(loaded.content.subject, "Quarterly review");
        assert_eq!(loaded.profile, letter.profile);
    }

    #[test]
    fn test_write_atomic_failure_cleans_up() {
        let dir = TempDir::new().unwrap();
        // Renaming a file over a directory fails after the temp file is written
        let target = dir.path().join("occupied");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), b"x").unwrap();

        assert!(write_atomic(&target, b"data").is_err());
        assert!(!dir.path().join("occupied.tmp").exists());
        assert!(target.is_dir());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_letter_sync(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, StoreError::FileNotFound(_)));
    }

    #[test]
    fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_letter_sync(&path), Err(StoreError::DocModel(_))));
    }

    #[tokio::test]
    async fn test_round_trip_async() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("letter.json");
        save_letter(&LetterFile::default(), &path).await.unwrap();
        let loaded = load_letter(&path).await.unwrap();
        assert_eq!(loaded.profile, LetterFile::default().profile);
    }
}
