// # File Record Cache
//
// File-based implementation of RecordCache.
//
// ## Layout
//
// One JSON file per cached record, named `{domain}-{type}.json`, inside a
// cache directory (by default `<user cache dir>/cloudflare-ddns/`).
//
// ## Crash Safety
//
// - Atomic writes: new content is written to a `.tmp` file, then renamed
// - Corruption detection: a file that fails to parse is reported as an error
//   so the caller can fall back to the provider
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "cached_at": "2025-01-09T12:00:00Z",
//   "record": {
//     "id": "a3bf",
//     "type": "A",
//     "name": "home.example.com",
//     "content": "192.0.2.7"
//   }
// }
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::traits::{Record, RecordCache, RecordType};

/// Cache file format version
const CACHE_FILE_VERSION: &str = "1.0";

/// Directory created under the user cache directory
const CACHE_DIR_NAME: &str = "cloudflare-ddns";

/// File-based record cache
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::state::FileRecordCache;
/// use ddns_core::traits::{RecordCache, RecordType};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let cache = FileRecordCache::in_user_cache_dir()?;
///
///     if let Some(record) = cache.get_record("home.example.com", RecordType::A).await? {
///         println!("last seen content: {}", record.content);
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileRecordCache {
    dir: PathBuf,
}

/// Serializable cache file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct CacheFileFormat {
    version: String,
    cached_at: chrono::DateTime<chrono::Utc>,
    record: Record,
}

impl FileRecordCache {
    /// Create a cache storing files in `dir`
    ///
    /// The directory is created on first save.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Create a cache under the platform's user cache directory
    pub fn in_user_cache_dir() -> Result<Self, Error> {
        let base = dirs::cache_dir()
            .ok_or_else(|| Error::cache("could not determine the user cache directory"))?;
        Ok(Self::new(base.join(CACHE_DIR_NAME)))
    }

    /// Directory holding the cache files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file caching `domain` / `record_type`
    pub fn path_for(&self, domain: &str, record_type: RecordType) -> Result<PathBuf, Error> {
        if domain.is_empty() || domain.contains(['/', '\\']) || domain.starts_with('.') {
            return Err(Error::invalid_input(format!(
                "cannot derive a cache file name from domain {:?}",
                domain
            )));
        }
        Ok(self.dir.join(format!("{}-{}.json", domain, record_type)))
    }

    async fn write_atomic(&self, path: &Path, json: &str) -> Result<(), Error> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::cache(format!(
                "could not create cache directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut temp_path = path.to_path_buf();
        temp_path.set_extension("tmp");
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::cache(format!(
                    "could not open {} for writing: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::cache(format!("could not write {}: {}", temp_path.display(), e))
            })?;

            file.flush().await.map_err(|e| {
                Error::cache(format!("could not flush {}: {}", temp_path.display(), e))
            })?;
        }

        fs::rename(&temp_path, path).await.map_err(|e| {
            Error::cache(format!(
                "could not rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl RecordCache for FileRecordCache {
    async fn get_record(
        &self,
        domain: &str,
        record_type: RecordType,
    ) -> Result<Option<Record>, Error> {
        let path = self.path_for(domain, record_type)?;
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Cache file does not exist: {}", path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::cache(format!(
                    "could not read cache file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let cache_file: CacheFileFormat = serde_json::from_str(&content).map_err(|e| {
            Error::cache(format!(
                "could not parse cache file {}: {}",
                path.display(),
                e
            ))
        })?;

        if cache_file.version != CACHE_FILE_VERSION {
            tracing::warn!(
                "Cache file version mismatch: expected {}, got {}. Loading anyway.",
                CACHE_FILE_VERSION,
                cache_file.version
            );
        }

        Ok(Some(cache_file.record))
    }

    async fn save_record(&self, record: &Record) -> Result<(), Error> {
        let path = self.path_for(&record.name, record.record_type)?;

        let cache_file = CacheFileFormat {
            version: CACHE_FILE_VERSION.to_string(),
            cached_at: chrono::Utc::now(),
            record: record.clone(),
        };
        let json = serde_json::to_string_pretty(&cache_file)
            .map_err(|e| Error::cache(format!("could not serialize record: {}", e)))?;

        self.write_atomic(&path, &json).await?;

        tracing::trace!("Record cached at {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(content: &str) -> Record {
        Record {
            id: "a3bf".to_string(),
            record_type: RecordType::A,
            name: "home.nenad.dev".to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_file_cache_roundtrip() {
        let dir = tempdir().unwrap();
        let cache = FileRecordCache::new(dir.path().join("nested"));

        assert_eq!(
            cache.get_record("home.nenad.dev", RecordType::A).await.unwrap(),
            None
        );

        cache.save_record(&record("192.0.2.1")).await.unwrap();
        assert!(dir.path().join("nested/home.nenad.dev-A.json").exists());

        let reloaded = FileRecordCache::new(dir.path().join("nested"));
        let cached = reloaded
            .get_record("home.nenad.dev", RecordType::A)
            .await
            .unwrap();
        assert_eq!(cached, Some(record("192.0.2.1")));

        // A different type is a different entry
        assert_eq!(
            reloaded
                .get_record("home.nenad.dev", RecordType::AAAA)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_file_cache_overwrite() {
        let dir = tempdir().unwrap();
        let cache = FileRecordCache::new(dir.path());

        for i in 0..5 {
            cache
                .save_record(&record(&format!("192.0.2.{}", i)))
                .await
                .unwrap();
        }

        let cached = cache.get_record("home.nenad.dev", RecordType::A).await.unwrap();
        assert_eq!(cached.unwrap().content, "192.0.2.4");
        assert!(!dir.path().join("home.nenad.dev-A.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_cache_corruption_is_an_error() {
        let dir = tempdir().unwrap();
        let cache = FileRecordCache::new(dir.path());
        fs::write(dir.path().join("home.nenad.dev-A.json"), b"corrupted json data")
            .await
            .unwrap();

        let err = cache
            .get_record("home.nenad.dev", RecordType::A)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cache(_)));
    }

    #[tokio::test]
    async fn test_file_cache_unreadable_entry_is_an_error() {
        let dir = tempdir().unwrap();
        let cache = FileRecordCache::new(dir.path());
        fs::create_dir(dir.path().join("home.nenad.dev-A.json"))
            .await
            .unwrap();

        let err = cache
            .get_record("home.nenad.dev", RecordType::A)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cache(_)));
    }

    #[test]
    fn test_path_traversal_rejected() {
        let cache = FileRecordCache::new("/tmp/cache");
        assert!(cache.path_for("../etc/passwd", RecordType::A).is_err());
        assert!(cache.path_for("", RecordType::A).is_err());
    }
}
