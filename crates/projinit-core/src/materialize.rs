//! File materialization: copy a local file or download a remote one into
//! the new project, never overwriting what is already there.

use crate::config::FileEntry;
use crate::env::{process_env, EnvTable};
use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Mode used for downloaded files, which carry no permission metadata
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Where a file's content comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Absolute http(s) URL
    Remote(Url),
    /// Filesystem path, after `$NAME` expansion
    Local(Utf8PathBuf),
}

impl Source {
    /// Classify a raw source string. Only absolute `http`/`https` URLs are
    /// remote; anything else is treated as a path.
    pub fn classify(raw: &str) -> Self {
        Self::classify_with(raw, &process_env())
    }

    /// Classify `raw`, expanding local paths against `env`. URLs are kept verbatim.
    pub fn classify_with(raw: &str, env: &EnvTable) -> Self {
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            _ => Self::Local(Utf8PathBuf::from(env.expand(raw))),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{}", url),
            Self::Local(path) => write!(f, "{}", path),
        }
    }
}

/// Result of a single materialization that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Destination was created
    Written {
        path: Utf8PathBuf,
        bytes: usize,
        mode: u32,
    },
    /// Destination already existed and was left untouched
    AlreadyExists { path: Utf8PathBuf },
}

impl CopyOutcome {
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::Written { path, .. } | Self::AlreadyExists { path } => path,
        }
    }
}

/// Fetches file sources and writes them to their destinations
#[derive(Debug, Clone)]
pub struct FileMaterializer {
    client: reqwest::Client,
    env: Arc<EnvTable>,
}

impl Default for FileMaterializer {
    fn default() -> Self {
        Self::with_client(reqwest::Client::new())
    }
}

impl FileMaterializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured HTTP client for remote sources
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            env: process_env(),
        }
    }

    /// Expand `$NAME` in paths from `env` instead of the process snapshot
    pub fn with_env(mut self, env: Arc<EnvTable>) -> Self {
        self.env = env;
        self
    }

    /// Materialize one entry
    pub async fn copy(&self, entry: &FileEntry) -> Result<CopyOutcome> {
        let source = Source::classify_with(&entry.source, &self.env);
        let (data, mode) = match &source {
            Source::Remote(url) => {
                tracing::info!("  * Downloading {}", url);
                (self.download(url).await?, DEFAULT_FILE_MODE)
            }
            Source::Local(path) => {
                tracing::info!("  * Reading {}", path);
                read_local(path).await?
            }
        };

        let destination = Utf8PathBuf::from(self.env.expand(&entry.destination));
        tracing::info!("  * Writing to {}", destination);
        write_new(&destination, &data, mode).await
    }

    /// Materialize entries in order, continuing past failures
    pub async fn copy_all(&self, entries: &[FileEntry]) -> Vec<Result<CopyOutcome>> {
        let mut results = Vec::with_capacity(entries.len());

        for entry in entries {
            let result = self.copy(entry).await;
            match &result {
                Ok(CopyOutcome::AlreadyExists { path }) => {
                    tracing::info!("    {} already exists, skipping", path)
                }
                Ok(CopyOutcome::Written { .. }) => {}
                Err(e) => tracing::warn!("{}", e),
            }
            results.push(result);
        }

        results
    }

    async fn download(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::file_fetch(url.as_str(), e))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(Error::file_fetch(
                url.as_str(),
                format!("server returned {}", response.status()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::file_fetch(url.as_str(), e))?;

        Ok(body.to_vec())
    }
}

async fn read_local(path: &Utf8Path) -> Result<(Vec<u8>, u32)> {
    let metadata = fs::metadata(path)
        .await
        .map_err(|e| Error::file_read(path.as_str(), e))?;
    let data = fs::read(path)
        .await
        .map_err(|e| Error::file_read(path.as_str(), e))?;

    Ok((data, permission_mode(&metadata)))
}

#[cfg(unix)]
fn permission_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_mode(_metadata: &std::fs::Metadata) -> u32 {
    DEFAULT_FILE_MODE
}

/// Write `data` to `path` unless something already exists there.
///
/// Missing parent directories are created. On unix the file ends up with
/// exactly `mode`, independent of the process umask.
pub async fn write_new(path: &Utf8Path, data: &[u8], mode: u32) -> Result<CopyOutcome> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::file_write(parent.as_str(), e))?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(mode);

    let mut file = match options.open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Ok(CopyOutcome::AlreadyExists {
                path: path.to_owned(),
            });
        }
        Err(e) => return Err(Error::file_write(path.as_str(), e)),
    };

    let written = async {
        file.write_all(data).await?;
        file.flush().await?;
        set_mode(path, mode).await
    }
    .await;

    if let Err(e) = written {
        let _ = fs::remove_file(path).await;
        return Err(Error::file_write(path.as_str(), e));
    }

    Ok(CopyOutcome::Written {
        path: path.to_owned(),
        bytes: data.len(),
        mode,
    })
}

#[cfg(unix)]
async fn set_mode(path: &Utf8Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await
}

#[cfg(not(unix))]
async fn set_mode(_path: &Utf8Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
