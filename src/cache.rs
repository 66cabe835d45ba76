use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Result, WortlautError};

/// Cache key for one synthesized speech clip
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClipKey {
    pub column: String,
    pub row: usize,
}

impl ClipKey {
    pub fn new<S: Into<String>>(column: S, row: usize) -> Self {
        Self {
            column: column.into(),
            row,
        }
    }

    pub fn filename(&self) -> String {
        format!("{}_{}.mp3", self.column, self.row)
    }
}

#[derive(Debug, Clone)]
pub struct CachedClip {
    pub filename: String,
    pub size: u64,
    /// Unix timestamp of the last modification
    pub modified: Option<u64>,
}

#[derive(Debug)]
pub struct CacheInfo {
    pub total_files: u64,
    pub total_size: u64,
    pub speech_files: u64,
    pub silence_files: u64,
    pub oldest_entry: Option<u64>,
    pub newest_entry: Option<u64>,
}

/// Key-addressed store for generated audio clips.
///
/// Speech clips are keyed by (column, row), silence clips by duration.
/// A clip present at its expected path is reused as-is; content is not
/// re-validated. `get_or_create` guarantees at most one generation per
/// key as long as the cache directory is untouched.
pub struct ClipCache {
    dir: PathBuf,
}

impl ClipCache {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| WortlautError::Cache(format!("Failed to create cache dir: {}", e)))?;

        Ok(Self { dir })
    }

    pub fn speech_path(&self, key: &ClipKey) -> PathBuf {
        self.dir.join(key.filename())
    }

    pub fn silence_path(&self, duration_ms: u64) -> PathBuf {
        self.dir.join(format!("silence_{}.mp3", duration_ms))
    }

    /// Path of the cached clip for a key, if it already exists
    pub fn get(&self, key: &ClipKey) -> Option<PathBuf> {
        let path = self.speech_path(key);
        path.exists().then_some(path)
    }

    /// Return the cached clip for a key, generating and persisting it
    /// through `create` on a miss.
    pub async fn get_or_create<F, Fut>(&self, key: &ClipKey, create: F) -> Result<PathBuf>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>>>,
    {
        let path = self.speech_path(key);
        if path.exists() {
            debug!("Cache hit: {}", path.display());
            return Ok(path);
        }

        info!("Cache miss, generating: {}", path.display());
        let bytes = create().await?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| WortlautError::Cache(format!("Failed to write clip: {}", e)))?;

        Ok(path)
    }

    /// Return the cached silence clip for a duration, generating it
    /// through `create` (which writes the file itself) on a miss.
    pub async fn get_or_create_silence<F, Fut>(
        &self,
        duration_ms: u64,
        create: F,
    ) -> Result<PathBuf>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let path = self.silence_path(duration_ms);
        if path.exists() {
            debug!("Cache hit: {}", path.display());
            return Ok(path);
        }

        info!("Cache miss, generating silence clip: {}", path.display());
        create(path.clone()).await?;

        if !path.exists() {
            return Err(WortlautError::Cache(format!(
                "Silence generation produced no file at {}",
                path.display()
            )));
        }

        Ok(path)
    }

    /// List all cached clips
    pub fn list(&self) -> Result<Vec<CachedClip>> {
        let mut clips = Vec::new();

        for entry in WalkDir::new(&self.dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let filename = entry.file_name().to_string_lossy().to_string();
            if !filename.ends_with(".mp3") {
                continue;
            }

            let metadata = entry
                .metadata()
                .map_err(|e| WortlautError::Cache(format!("Failed to stat clip: {}", e)))?;
            let modified = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs());

            clips.push(CachedClip {
                filename,
                size: metadata.len(),
                modified,
            });
        }

        clips.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(clips)
    }

    /// Delete all cached clips, returning the number removed
    pub fn clear(&self) -> Result<u64> {
        let mut deleted = 0;
        for clip in self.list()? {
            std::fs::remove_file(self.dir.join(&clip.filename))
                .map_err(|e| WortlautError::Cache(format!("Failed to delete clip: {}", e)))?;
            deleted += 1;
        }

        info!("Cleared {} cached clips", deleted);
        Ok(deleted)
    }

    /// Aggregate cache statistics
    pub fn info(&self) -> Result<CacheInfo> {
        let clips = self.list()?;

        let silence_files = clips
            .iter()
            .filter(|c| c.filename.starts_with("silence_"))
            .count() as u64;

        Ok(CacheInfo {
            total_files: clips.len() as u64,
            total_size: clips.iter().map(|c| c.size).sum(),
            speech_files: clips.len() as u64 - silence_files,
            silence_files,
            oldest_entry: clips.iter().filter_map(|c| c.modified).min(),
            newest_entry: clips.iter().filter_map(|c| c.modified).max(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_get_or_create_generates_at_most_once() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ClipCache::new(dir.path()).unwrap();
        let key = ClipKey::new("de", 1);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let path = cache
                .get_or_create(&key, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(b"fake-mp3".to_vec())
                })
                .await
                .unwrap();
            assert!(path.exists());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            std::fs::read(cache.speech_path(&key)).unwrap(),
            b"fake-mp3"
        );
    }

    #[tokio::test]
    async fn test_generation_failure_leaves_no_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ClipCache::new(dir.path()).unwrap();
        let key = ClipKey::new("ru", 2);

        let result = cache
            .get_or_create(&key, || async {
                Err(WortlautError::Synthesis("service down".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert!(cache.get(&key).is_none());
    }

    #[tokio::test]
    async fn test_silence_clip_keyed_by_duration() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ClipCache::new(dir.path()).unwrap();

        let path = cache
            .get_or_create_silence(1000, |path| async move {
                tokio::fs::write(&path, b"silence").await?;
                Ok(())
            })
            .await
            .unwrap();

        assert!(path.ends_with("silence_1000.mp3"));

        // second call must not regenerate
        let again = cache
            .get_or_create_silence(1000, |_| async {
                panic!("should not be called on a cache hit")
            })
            .await
            .unwrap();
        assert_eq!(again, path);
    }

    #[tokio::test]
    async fn test_list_clear_info() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ClipCache::new(dir.path()).unwrap();

        cache
            .get_or_create(&ClipKey::new("de", 1), || async { Ok(vec![0u8; 10]) })
            .await
            .unwrap();
        cache
            .get_or_create_silence(2000, |path| async move {
                tokio::fs::write(&path, vec![0u8; 5]).await?;
                Ok(())
            })
            .await
            .unwrap();

        let info = cache.info().unwrap();
        assert_eq!(info.total_files, 2);
        assert_eq!(info.speech_files, 1);
        assert_eq!(info.silence_files, 1);
        assert_eq!(info.total_size, 15);

        assert_eq!(cache.clear().unwrap(), 2);
        assert_eq!(cache.list().unwrap().len(), 0);
    }

    #[test]
    fn test_clip_key_filename() {
        assert_eq!(ClipKey::new("b1_de", 4).filename(), "b1_de_4.mp3");
    }
}
