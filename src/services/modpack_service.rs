//! Builds `mods.zip` from the latest Modrinth modpack.

use std::sync::Arc;

use async_trait::async_trait;

use super::container::parallel;
use crate::errors::{AppError, AppResult};
use crate::infra::modrinth::{unpack, write_archive};
use crate::infra::PackSource;

/// Concurrent mod downloads
const DOWNLOAD_CONCURRENCY: usize = 8;

#[async_trait]
pub trait ModpackService: Send + Sync {
    /// Zip of every mod jar of the current pack, flattened
    async fn build_archive(&self) -> AppResult<Vec<u8>>;
}

pub struct ModpackBuilder {
    source: Arc<dyn PackSource>,
}

impl ModpackBuilder {
    pub fn new(source: Arc<dyn PackSource>) -> Self {
        Self { source }
    }
}

fn join_error(e: tokio::task::JoinError) -> AppError {
    AppError::internal(format!("Modpack task failed: {}", e))
}

#[async_trait]
impl ModpackService for ModpackBuilder {
    async fn build_archive(&self) -> AppResult<Vec<u8>> {
        let pack = self.source.latest_pack().await?;
        let unpacked = tokio::task::spawn_blocking(move || unpack(&pack))
            .await
            .map_err(join_error)??;

        let downloads: Vec<_> = unpacked
            .downloads
            .into_iter()
            .map(|(name, url)| {
                let source = Arc::clone(&self.source);
                async move {
                    let data = source.download(&url).await?;
                    Ok::<_, AppError>((name, data))
                }
            })
            .collect();
        let downloaded = parallel::join_all_limited(downloads, DOWNLOAD_CONCURRENCY).await?;

        tracing::info!(
            bundled = unpacked.bundled.len(),
            downloaded = downloaded.len(),
            "Modpack archive assembled"
        );

        let mut files = unpacked.bundled;
        files.extend(downloaded);
        tokio::task::spawn_blocking(move || write_archive(files))
            .await
            .map_err(join_error)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::modrinth::sample_pack;
    use crate::infra::MockPackSource;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_archive_merges_bundled_and_downloaded_mods() {
        let index = r#"{"files": [{"path": "mods/lithium.jar", "downloads": ["https://cdn.test/lithium.jar"]}]}"#;
        let pack = sample_pack(Some(index), &[("overrides/mods/local.jar", b"local")]);

        let mut source = MockPackSource::new();
        source.expect_latest_pack().returning(move || Ok(pack.clone()));
        source
            .expect_download()
            .withf(|url| url == "https://cdn.test/lithium.jar")
            .returning(|_| Ok(b"lithium".to_vec()));

        let bytes = ModpackBuilder::new(Arc::new(source)).build_archive().await.unwrap();

        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();
        assert_eq!(names, vec!["lithium.jar", "local.jar"]);
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let mut source = MockPackSource::new();
        source
            .expect_latest_pack()
            .returning(|| Err(AppError::upstream("modrinth down")));

        let result = ModpackBuilder::new(Arc::new(source)).build_archive().await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_failed_download_fails_archive() {
        let index = r#"{"files": [
            {"path": "mods/a.jar", "downloads": ["https://cdn.test/a.jar"]},
            {"path": "mods/b.jar", "downloads": ["https://cdn.test/b.jar"]}
        ]}"#;
        let pack = sample_pack(Some(index), &[]);

        let mut source = MockPackSource::new();
        source.expect_latest_pack().returning(move || Ok(pack.clone()));
        source.expect_download().returning(|url| {
            if url.ends_with("b.jar") {
                Err(AppError::upstream("cdn unavailable"))
            } else {
                Ok(b"a".to_vec())
            }
        });

        let result = ModpackBuilder::new(Arc::new(source)).build_archive().await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }
}
