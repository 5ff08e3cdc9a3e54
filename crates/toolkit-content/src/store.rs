//! Local content directory.
//!
//! Downloaded files are named after a SHA-256 prefix of their URL plus the
//! URL's last path segment, so two URLs never collide and the same URL always
//! maps to the same file.

use std::fs;
use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};
use toolkit_model::{Result, ToolkitError};

/// Hex characters of the URL hash kept in file names.
const HASH_PREFIX_LEN: usize = 16;

/// File name used when a URL has no usable last segment.
const FALLBACK_NAME: &str = "download";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the download of `url` is stored.
    pub fn path_for(&self, url: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(url.as_bytes()));
        let name = file_name_from_url(url);
        self.root
            .join(format!("{}-{name}", &digest[..HASH_PREFIX_LEN]))
    }

    /// The stored copy of `url`, if it was downloaded before.
    pub fn local_file(&self, url: &str) -> Option<PathBuf> {
        let path = self.path_for(url);
        path.is_file().then_some(path)
    }

    /// Read the markdown document at `relative` inside the store.
    ///
    /// Paths that would leave the content directory are rejected.
    pub fn read_markdown(&self, relative: &str) -> Result<String> {
        let relative = Path::new(relative);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(ToolkitError::Io(format!(
                "{} is outside the content directory",
                relative.display()
            )));
        }

        let path = self.root.join(relative);
        fs::read_to_string(&path)
            .map_err(|e| ToolkitError::Io(format!("read {}: {e}", path.display())))
    }
}

fn file_name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let path = path.split_once("://").map_or(path, |(_, rest)| rest);
    let segment = match path.split_once('/') {
        Some((_, rest)) => rest.rsplit('/').next().unwrap_or_default(),
        None => "",
    };

    let name: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if name.trim_matches('.').is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}
