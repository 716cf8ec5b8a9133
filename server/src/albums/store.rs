//! Album repository backed by the album root directory.
//!
//! The file system is the sole durable store: every directory directly
//! under the root is an album, and the files directly inside an album are
//! its photos. There is no cache or index; every operation re-reads the
//! tree, so concurrent requests only share what the OS guarantees
//! (atomic rename, consistent directory listings).

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::scan::scan_dir;

#[derive(Error, Debug)]
pub enum AlbumError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("no such album: {0}")]
    NoSuchAlbum(String),
    #[error("no such photo: {0}")]
    NoSuchPhoto(String),
    #[error("invalid name: {0}")]
    InvalidName(String),
}

/// A directory directly under the album root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumEntry {
    pub name: String,
}

/// A file directly inside an album directory.
///
/// `desc` mirrors `filename` until descriptions are stored somewhere real.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoEntry {
    pub filename: String,
    pub desc: String,
}

/// Pagination window applied after enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page_num: usize,
    pub page_size: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page_num: 0,
            page_size: 1000,
        }
    }
}

/// One page of an album's photo listing, built fresh per request.
#[derive(Debug, Clone, Serialize)]
pub struct AlbumContents {
    pub short_name: String,
    pub photos: Vec<PhotoEntry>,
}

/// Validate an album or photo identifier taken from a request.
///
/// An identifier names exactly one path component under the album root.
/// Anything that could resolve outside it (separators, `.`/`..`, NUL,
/// control characters) is rejected; identifiers are never joined into a
/// path before passing this check.
pub fn validate_name(name: &str) -> Result<(), AlbumError> {
    if name.is_empty() {
        return Err(AlbumError::InvalidName("empty name".to_string()));
    }
    if name == "." || name == ".." {
        return Err(AlbumError::InvalidName(name.to_string()));
    }
    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(AlbumError::InvalidName(name.to_string()));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(AlbumError::InvalidName(name.to_string()));
    }
    Ok(())
}

pub struct AlbumStore {
    root: PathBuf,
}

impl AlbumStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn album_path(&self, name: &str) -> Result<PathBuf, AlbumError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }

    /// List every album: the directories directly under the root.
    pub async fn list_albums(&self) -> Result<Vec<AlbumEntry>, AlbumError> {
        let entries = scan_dir(&self.root).await?;
        Ok(entries
            .into_iter()
            .filter(|e| e.is_dir)
            .map(|e| AlbumEntry { name: e.name })
            .collect())
    }

    /// List one page of an album's photos: the files directly inside it.
    ///
    /// A window starting past the end of the listing yields an empty page,
    /// not an error, and so does `page_size == 0`.
    pub async fn album_contents(
        &self,
        name: &str,
        page: Page,
    ) -> Result<AlbumContents, AlbumError> {
        let path = self.album_path(name)?;
        let entries = match scan_dir(&path).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(AlbumError::NoSuchAlbum(name.to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        let start = page.page_num.saturating_mul(page.page_size);
        let photos = entries
            .into_iter()
            .filter(|e| !e.is_dir)
            .map(|e| {
                let filename = format!("{}/{}", name, e.name);
                PhotoEntry {
                    desc: filename.clone(),
                    filename,
                }
            })
            .skip(start)
            .take(page.page_size)
            .collect();

        Ok(AlbumContents {
            short_name: name.to_string(),
            photos,
        })
    }

    /// Rename an album.
    ///
    /// Atomic at the file-system-rename granularity: a concurrent
    /// `list_albums` sees the old name or the new one, never a half-moved
    /// tree. Destination collision behavior is whatever the file system
    /// does for `rename(2)`.
    pub async fn rename_album(&self, old: &str, new: &str) -> Result<(), AlbumError> {
        let old_path = self.album_path(old)?;
        let new_path = self.album_path(new)?;

        match tokio::fs::rename(&old_path, &new_path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(AlbumError::NoSuchAlbum(old.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Read a photo's raw bytes for serving.
    ///
    /// The album is checked first so that a missing album and a missing
    /// photo report differently.
    pub async fn read_photo(&self, album: &str, filename: &str) -> Result<Vec<u8>, AlbumError> {
        validate_name(filename)?;
        let dir = self.album_path(album)?;

        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(AlbumError::NoSuchAlbum(album.to_string())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(AlbumError::NoSuchAlbum(album.to_string()));
            }
            Err(err) => return Err(err.into()),
        }

        match tokio::fs::read(dir.join(filename)).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(AlbumError::NoSuchPhoto(format!("{}/{}", album, filename)))
            }
            Err(err) => Err(err.into()),
        }
    }
}
