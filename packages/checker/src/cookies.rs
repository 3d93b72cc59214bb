//! On-disk cookie jar shared by the requests of one lookup.
//!
//! The jar is a JSON file in the `cookie_store` format. It is read once when
//! the fetcher is built and written back after the lookup. Concurrent
//! processes writing the same file will overwrite each other.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use cookie_store::{CookieStore, RawCookie};
use reqwest::header::HeaderValue;
use url::Url;

/// Cookie provider for `reqwest` backed by a file.
#[derive(Debug)]
pub struct CookieJar {
    path: PathBuf,
    store: Mutex<CookieStore>,
}

impl CookieJar {
    /// Load the jar at `path`.
    ///
    /// A missing file yields an empty jar. An unreadable or corrupt file is
    /// logged and also yields an empty jar; the next save replaces it.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let store = match File::open(&path) {
            Ok(file) => cookie_store::serde::json::load_all(BufReader::new(file))
                .unwrap_or_else(|e| {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable cookie file");
                    CookieStore::default()
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CookieStore::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot open cookie file");
                CookieStore::default()
            }
        };

        Self {
            path,
            store: Mutex::new(store),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all cookies, session cookies included, back to disk.
    ///
    /// Creates the parent directory when it does not exist yet.
    pub fn save(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(&self.path)?);
        cookie_store::serde::json::save_incl_expired_and_nonpersistent(&self.lock(), &mut writer)
            .map_err(std::io::Error::other)?;
        tracing::debug!(path = %self.path.display(), "Saved cookies");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, CookieStore> {
        // A poisoned lock still holds a usable store.
        self.store
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl reqwest::cookie::CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let cookies = cookie_headers.filter_map(|value| {
            let text = value.to_str().ok()?;
            RawCookie::parse(text).ok().map(RawCookie::into_owned)
        });
        self.lock().store_response_cookies(cookies, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self
            .lock()
            .get_request_values(url)
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");

        if header.is_empty() {
            return None;
        }
        HeaderValue::from_str(&header).ok()
    }
}
