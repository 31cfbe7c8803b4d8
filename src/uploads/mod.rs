//! Upload Tray
//!
//! Transient attachments for the local-data path. Binary content stays on
//! this side of the network boundary: only names ever reach the send flow.

use base64::Engine;
use futures::future::join_all;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Most attachments of one kind (files or images) held at a time.
pub const MAX_UPLOADS: usize = 3;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload limit reached ({limit} per kind)")]
    LimitReached { limit: usize },
    #[error("failed to read '{name}': {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Metadata for one attached file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMeta {
    pub name: String,
    pub size: u64,
    pub kind: String,
}

/// An attached image with its locally retained data-URL payload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub meta: UploadMeta,
    pub data_url: String,
}

#[derive(Debug)]
pub struct UploadTray {
    files: Vec<UploadMeta>,
    images: Vec<ImageUpload>,
    max_per_kind: usize,
}

impl Default for UploadTray {
    fn default() -> Self {
        Self::new(MAX_UPLOADS)
    }
}

impl UploadTray {
    pub fn new(max_per_kind: usize) -> Self {
        Self {
            files: Vec::new(),
            images: Vec::new(),
            max_per_kind,
        }
    }

    /// Attach files by path, keeping metadata only. Paths beyond the
    /// remaining slots are ignored; with no slots left the call is rejected.
    pub async fn attach_files(&mut self, paths: &[PathBuf]) -> Result<Vec<UploadMeta>, UploadError> {
        let remaining = self.max_per_kind.saturating_sub(self.files.len());
        if remaining == 0 {
            return Err(UploadError::LimitReached {
                limit: self.max_per_kind,
            });
        }

        let accepted = &paths[..paths.len().min(remaining)];
        let mut added = Vec::new();
        for path in accepted {
            let meta = read_meta(path).await?;
            self.files.push(meta.clone());
            added.push(meta);
        }
        Ok(added)
    }

    /// Attach images by path. Payloads are read concurrently and recorded
    /// in the order the reads settle.
    pub async fn attach_images(
        &mut self,
        paths: &[PathBuf],
    ) -> Result<Vec<UploadMeta>, UploadError> {
        let remaining = self.max_per_kind.saturating_sub(self.images.len());
        if remaining == 0 {
            return Err(UploadError::LimitReached {
                limit: self.max_per_kind,
            });
        }

        let accepted = &paths[..paths.len().min(remaining)];
        let reads = join_all(accepted.iter().map(|path| read_image(path))).await;

        let mut added = Vec::new();
        for read in reads {
            let image = read?;
            added.push(image.meta.clone());
            self.images.push(image);
        }
        Ok(added)
    }

    pub fn remove_file(&mut self, index: usize) -> Option<UploadMeta> {
        if index < self.files.len() {
            Some(self.files.remove(index))
        } else {
            None
        }
    }

    pub fn remove_image(&mut self, index: usize) -> Option<UploadMeta> {
        if index < self.images.len() {
            Some(self.images.remove(index).meta)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.images.clear();
    }

    pub fn files(&self) -> &[UploadMeta] {
        &self.files
    }

    pub fn images(&self) -> &[ImageUpload] {
        &self.images
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.images.is_empty()
    }

    pub fn file_names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.name.clone()).collect()
    }

    pub fn image_names(&self) -> Vec<String> {
        self.images.iter().map(|i| i.meta.name.clone()).collect()
    }
}

async fn read_meta(path: &Path) -> Result<UploadMeta, UploadError> {
    let name = display_name(path);
    let metadata = fs::metadata(path).await.map_err(|source| UploadError::Read {
        name: name.clone(),
        source,
    })?;

    Ok(UploadMeta {
        name,
        size: metadata.len(),
        kind: content_kind(path),
    })
}

async fn read_image(path: &Path) -> Result<ImageUpload, UploadError> {
    let meta = read_meta(path).await?;
    let bytes = fs::read(path).await.map_err(|source| UploadError::Read {
        name: meta.name.clone(),
        source,
    })?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    let data_url = format!("data:{};base64,{}", meta.kind, encoded);

    Ok(ImageUpload { meta, data_url })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn content_kind(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "doc" | "docx" => "application/msword",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_attach_file_records_metadata() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "notes.txt", b"hello").await;

        let mut tray = UploadTray::new(MAX_UPLOADS);
        let added = tray.attach_files(&[path]).await.unwrap();

        assert_eq!(added.len(), 1);
        assert_eq!(added[0].name, "notes.txt");
        assert_eq!(added[0].size, 5);
        assert_eq!(added[0].kind, "text/plain");
        assert_eq!(tray.file_names(), vec!["notes.txt"]);
    }

    #[tokio::test]
    async fn test_limit_truncates_then_rejects() {
        let dir = TempDir::new().unwrap();
        let mut paths = Vec::new();
        for i in 0..4 {
            paths.push(write_file(&dir, &format!("f{}.txt", i), b"x").await);
        }

        let mut tray = UploadTray::new(MAX_UPLOADS);
        let added = tray.attach_files(&paths).await.unwrap();
        assert_eq!(added.len(), MAX_UPLOADS);
        assert_eq!(tray.files().len(), MAX_UPLOADS);

        let rejected = tray.attach_files(&paths[3..]).await;
        assert!(matches!(
            rejected,
            Err(UploadError::LimitReached { limit: MAX_UPLOADS })
        ));
    }

    #[tokio::test]
    async fn test_attach_image_builds_data_url() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "antenna.png", &[0x89, 0x50, 0x4e, 0x47]).await;

        let mut tray = UploadTray::new(MAX_UPLOADS);
        tray.attach_images(&[path]).await.unwrap();

        let image = &tray.images()[0];
        assert!(image.data_url.starts_with("data:image/png;base64,"));
        assert_eq!(image.meta.name, "antenna.png");
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "a.txt", b"a").await;
        let image = write_file(&dir, "b.png", b"b").await;

        let mut tray = UploadTray::new(MAX_UPLOADS);
        tray.attach_files(&[file]).await.unwrap();
        tray.attach_images(&[image]).await.unwrap();

        assert!(tray.remove_file(0).is_some());
        assert!(tray.remove_file(0).is_none());
        assert_eq!(tray.images().len(), 1);

        tray.clear();
        assert!(tray.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let mut tray = UploadTray::new(MAX_UPLOADS);
        let result = tray
            .attach_files(&[PathBuf::from("/definitely/not/here.txt")])
            .await;
        assert!(matches!(result, Err(UploadError::Read { .. })));
    }
}
