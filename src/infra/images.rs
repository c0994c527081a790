//! Product image storage on the local filesystem.
//!
//! Layout: `<root>/<product name>/<n>.webp`, with `n` counting up from 1
//! without gaps.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::fs;

use crate::config::{IMAGE_EXTENSION, IMAGE_URL_PREFIX};
use crate::domain::validate_product_name;
use crate::errors::{AppError, AppResult};

static IMAGE_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([1-9][0-9]{0,5})\.webp$").expect("valid image file regex"));

const SWAP_FILE: &str = "swap.tmp";

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn product_dir(&self, name: &str) -> AppResult<PathBuf> {
        validate_product_name(name)?;
        Ok(self.root.join(name))
    }

    fn image_path(dir: &Path, index: u32) -> PathBuf {
        dir.join(format!("{}.{}", index, IMAGE_EXTENSION))
    }

    fn url(name: &str, index: u32) -> String {
        format!("{}/{}/{}.{}", IMAGE_URL_PREFIX, name, index, IMAGE_EXTENSION)
    }

    /// Image indexes present for a product, ascending
    async fn indexes(dir: &Path) -> AppResult<Vec<u32>> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut indexes = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(index) = parse_index(file_name) {
                indexes.push(index);
            }
        }
        indexes.sort_unstable();
        Ok(indexes)
    }

    /// URLs of every image of a product, ordered by index.
    pub async fn list(&self, name: &str) -> AppResult<Vec<String>> {
        let dir = self.product_dir(name)?;
        Ok(Self::indexes(&dir)
            .await?
            .into_iter()
            .map(|index| Self::url(name, index))
            .collect())
    }

    /// URL of one image.
    pub async fn find(&self, name: &str, index: u32) -> AppResult<String> {
        let dir = self.product_dir(name)?;
        if !exists(&Self::image_path(&dir, index)).await? {
            return Err(AppError::not_found("Image"));
        }
        Ok(Self::url(name, index))
    }

    /// Store an image after the last one. Returns its index.
    pub async fn upload(&self, name: &str, bytes: &[u8]) -> AppResult<u32> {
        let dir = self.product_dir(name)?;
        fs::create_dir_all(&dir).await?;

        let next = Self::indexes(&dir).await?.last().copied().unwrap_or(0) + 1;
        fs::write(Self::image_path(&dir, next), bytes).await?;

        tracing::info!(product = %name, index = next, "Image uploaded");
        Ok(next)
    }

    /// Remove one image and move every later image down by one.
    pub async fn delete(&self, name: &str, index: u32) -> AppResult<()> {
        let dir = self.product_dir(name)?;
        match fs::remove_file(Self::image_path(&dir, index)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(AppError::not_found("Image")),
            Err(e) => return Err(e.into()),
        }

        for later in Self::indexes(&dir).await?.into_iter().filter(|i| *i > index) {
            fs::rename(
                Self::image_path(&dir, later),
                Self::image_path(&dir, later - 1),
            )
            .await?;
        }
        Ok(())
    }

    /// Exchange the positions of two images.
    pub async fn swap(&self, name: &str, first: u32, second: u32) -> AppResult<()> {
        let dir = self.product_dir(name)?;
        let a = Self::image_path(&dir, first);
        let b = Self::image_path(&dir, second);

        if !exists(&a).await? || !exists(&b).await? {
            return Err(AppError::not_found("Image"));
        }
        if first == second {
            return Ok(());
        }

        let temp = dir.join(SWAP_FILE);
        fs::rename(&a, &temp).await?;
        fs::rename(&b, &a).await?;
        fs::rename(&temp, &b).await?;
        Ok(())
    }

    /// Raw bytes of an image file such as `2.webp`.
    pub async fn read(&self, name: &str, file: &str) -> AppResult<Vec<u8>> {
        let index = parse_index(file).ok_or_else(|| AppError::not_found("Image"))?;
        let dir = self.product_dir(name)?;

        match fs::read(Self::image_path(&dir, index)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::not_found("Image")),
            Err(e) => Err(e.into()),
        }
    }

    /// Move a product's images to its new name. A missing folder is not an error.
    pub async fn rename_folder(&self, from: &str, to: &str) -> AppResult<()> {
        let source = self.product_dir(from)?;
        let target = self.product_dir(to)?;

        if !exists(&source).await? {
            return Ok(());
        }
        if exists(&target).await? {
            return Err(AppError::conflict(format!("Image folder {}", to)));
        }
        fs::rename(source, target).await?;
        Ok(())
    }

    /// Remove every image of a product.
    pub async fn delete_folder(&self, name: &str) -> AppResult<()> {
        let dir = self.product_dir(name)?;
        match fs::remove_dir_all(dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn parse_index(file_name: &str) -> Option<u32> {
    IMAGE_FILE
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

async fn exists(path: &Path) -> AppResult<bool> {
    Ok(fs::try_exists(path).await?)
}
