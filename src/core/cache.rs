use crate::core::errors::{Error, Result};
use crate::core::prefix::parse_cidr;
use chrono::{DateTime, Utc};
use ipnetwork::IpNetwork;
use log::info;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/*-------------------------------------------------------------------------------------------------
  Cache Location
-------------------------------------------------------------------------------------------------*/

const CACHE_DIR_NAME: &str = "urlipranges";

/// Directory holding derived cache files: the platform data directory, or the
/// current working directory when no data directory can be resolved.
pub fn cache_dir() -> PathBuf {
    dirs::data_dir()
        .map(|data_dir| data_dir.join(CACHE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Deterministic cache filename for an ordered list of source URLs.
pub fn cache_filename<S: AsRef<str>>(urls: &[S]) -> String {
    let mut hasher = Sha256::new();
    for (index, url) in urls.iter().enumerate() {
        if index > 0 {
            hasher.update(b"\n");
        }
        hasher.update(url.as_ref().as_bytes());
    }
    format!("{:x}.json", hasher.finalize())
}

/// Resolve the cache file path: the explicit override when given, otherwise a
/// filename derived from the URL list inside [cache_dir].
pub fn resolve_path<S: AsRef<str>>(urls: &[S], cache_file: Option<&Path>) -> PathBuf {
    match cache_file {
        Some(cache_file) => cache_file.to_path_buf(),
        None => cache_dir().join(cache_filename(urls)),
    }
}

/*-------------------------------------------------------------------------------------------------
  Cache Record
-------------------------------------------------------------------------------------------------*/

/// On-disk representation of the last known good prefix set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub prefixes: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/*-------------------------------------------------------------------------------------------------
  Cache Store
-------------------------------------------------------------------------------------------------*/

/// Persists and restores a prefix set at a fixed path.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached prefix set. Any invalid entry rejects the whole file.
    pub fn load(&self) -> Result<Vec<IpNetwork>> {
        let record = self.read_record()?;

        let prefixes = record
            .prefixes
            .iter()
            .map(|prefix| {
                parse_cidr(prefix).map_err(|_| Error::CachePrefix {
                    path: self.path.clone(),
                    line: prefix.clone(),
                })
            })
            .collect::<Result<Vec<IpNetwork>>>()?;

        info!(
            "Loaded {} cached prefix(es) from {:?}, last updated {}",
            prefixes.len(),
            &self.path,
            record.updated_at
        );
        Ok(prefixes)
    }

    /// Read and decode the raw cache record without validating its prefixes.
    pub fn read_record(&self) -> Result<CacheRecord> {
        let file = fs::File::open(&self.path).map_err(|source| self.io_error(source))?;
        serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| {
            Error::CacheFormat {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Write the prefix set with the current time. The record is written to a
    /// temporary sibling file and renamed into place.
    pub fn save(&self, prefixes: &[IpNetwork]) -> Result<()> {
        let record = CacheRecord {
            prefixes: prefixes.iter().map(ToString::to_string).collect(),
            updated_at: Utc::now(),
        };

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|source| self.io_error(source))?;

        let mut temp_file =
            tempfile::NamedTempFile::new_in(&parent).map_err(|source| self.io_error(source))?;
        serde_json::to_writer(&mut temp_file, &record).map_err(|source| Error::CacheFormat {
            path: self.path.clone(),
            source,
        })?;
        temp_file
            .flush()
            .and_then(|_| temp_file.as_file().sync_all())
            .map_err(|source| self.io_error(source))?;
        temp_file
            .persist(&self.path)
            .map_err(|error| self.io_error(error.error))?;

        info!(
            "Cached {} prefix(es) to {:?}",
            record.prefixes.len(),
            &self.path
        );
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> Error {
        Error::Cache {
            path: self.path.clone(),
            source,
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
