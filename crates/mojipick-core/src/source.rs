//! Where the `emoji-test.txt` feed comes from

use crate::error::{CoreError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Official location of the latest feed
pub const EMOJI_TEST_URL: &str = "https://unicode.org/Public/emoji/latest/emoji-test.txt";

/// A provider of `emoji-test.txt` content
pub trait EmojiSource {
    /// Human readable origin, for logs
    fn describe(&self) -> String;

    /// Fetch the whole feed; any failure is `SourceUnavailable`
    fn fetch(&self) -> Result<String>;
}

/// A feed already on disk
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EmojiSource for LocalFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<String> {
        std::fs::read_to_string(&self.path).map_err(|e| {
            CoreError::SourceUnavailable(format!("{}: {}", self.path.display(), e))
        })
    }
}

/// A feed downloaded over HTTP
#[derive(Debug, Clone)]
pub struct RemoteFeed {
    url: String,
}

impl RemoteFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl EmojiSource for RemoteFeed {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<String> {
        let unavailable = |reason: String| CoreError::SourceUnavailable(format!("{}: {}", self.url, reason));

        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("mojipick/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| unavailable(e.to_string()))?;

        info!("Downloading {}", self.url);
        let response = client
            .get(&self.url)
            .send()
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(format!("HTTP {}", response.status())));
        }

        let text = response.text().map_err(|e| unavailable(e.to_string()))?;
        debug!("Downloaded {} bytes", text.len());
        Ok(text)
    }
}

/// The local copy when present, otherwise a download that refreshes it
#[derive(Debug, Clone)]
pub struct CachedFeed {
    cache: PathBuf,
    remote: RemoteFeed,
}

impl CachedFeed {
    pub fn new(cache: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            cache: cache.into(),
            remote: RemoteFeed::new(url),
        }
    }

    fn save_copy(&self, text: &str) {
        let result = self
            .cache
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|_| std::fs::write(&self.cache, text));

        match result {
            Ok(()) => info!("Saved a local copy to {}", self.cache.display()),
            Err(e) => warn!("Could not save {}: {}", self.cache.display(), e),
        }
    }
}

impl EmojiSource for CachedFeed {
    fn describe(&self) -> String {
        format!("{} (or {})", self.cache.display(), self.remote.describe())
    }

    fn fetch(&self) -> Result<String> {
        if self.cache.exists() {
            debug!("Using local {}", self.cache.display());
            return LocalFile::new(&self.cache).fetch();
        }

        let text = self.remote.fetch()?;
        self.save_copy(&text);
        Ok(text)
    }
}

/// Feed text the caller already holds
#[derive(Debug, Clone)]
pub struct InMemory {
    text: String,
}

impl InMemory {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl EmojiSource for InMemory {
    fn describe(&self) -> String {
        "in-memory feed".to_string()
    }

    fn fetch(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Pick a source for an optional user argument
///
/// URLs are downloaded, other arguments are read as files, and no argument
/// means the cached copy with `url` as fallback.
pub fn source_for(argument: Option<&str>, cache: &Path, url: &str) -> Box<dyn EmojiSource> {
    match argument {
        Some(arg) if arg.starts_with("http://") || arg.starts_with("https://") => {
            Box::new(RemoteFeed::new(arg))
        }
        Some(arg) => Box::new(LocalFile::new(arg)),
        None => Box::new(CachedFeed::new(cache, url)),
    }
}
