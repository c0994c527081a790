//! Modrinth modpack download and repackaging.
//!
//! A `.mrpack` is a zip holding `modrinth.index.json` plus an `overrides/`
//! tree. The storefront serves a flat `mods.zip` with every bundled mod jar
//! and every jar listed in the index.

use std::io::{Cursor, Read, Write};

use async_trait::async_trait;
use serde::Deserialize;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipArchive, ZipWriter};

use crate::config::{Config, MRPACK_INDEX_FILE, MRPACK_MODS_PREFIX, MRPACK_OVERRIDE_MODS_PREFIX};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PackSource: Send + Sync {
    /// Raw `.mrpack` of the newest project version
    async fn latest_pack(&self) -> AppResult<Vec<u8>>;

    async fn download(&self, url: &str) -> AppResult<Vec<u8>>;
}

#[derive(Debug, Deserialize)]
struct ProjectVersion {
    files: Vec<VersionFile>,
}

#[derive(Debug, Deserialize)]
struct VersionFile {
    url: String,
}

#[derive(Debug, Deserialize)]
struct PackIndex {
    #[serde(default)]
    files: Vec<IndexFile>,
}

#[derive(Debug, Deserialize)]
struct IndexFile {
    path: String,
    #[serde(default)]
    downloads: Vec<String>,
}

pub struct ModrinthClient {
    http: reqwest::Client,
    api_base: String,
    project_id: String,
}

impl ModrinthClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.modrinth_api_base.trim_end_matches('/').to_string(),
            project_id: config.modrinth_project_id.clone(),
        }
    }
}

#[async_trait]
impl PackSource for ModrinthClient {
    async fn latest_pack(&self) -> AppResult<Vec<u8>> {
        let versions: Vec<ProjectVersion> = self
            .http
            .get(format!("{}/v2/project/{}/version", self.api_base, self.project_id))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let url = versions
            .first()
            .and_then(|version| version.files.first())
            .map(|file| file.url.clone())
            .ok_or_else(|| AppError::upstream("Modrinth project has no files"))?;

        self.download(&url).await
    }

    async fn download(&self, url: &str) -> AppResult<Vec<u8>> {
        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}

/// Contents pulled out of a `.mrpack`
#[derive(Debug, Default, PartialEq)]
pub struct UnpackedPack {
    /// Mod jars shipped inside the pack, by file name
    pub bundled: Vec<(String, Vec<u8>)>,
    /// Mod jars to fetch, as (file name, download url)
    pub downloads: Vec<(String, String)>,
}

fn zip_error(e: zip::result::ZipError) -> AppError {
    AppError::internal(format!("Modpack archive error: {}", e))
}

/// File name of `path` when it sits directly inside `prefix`.
fn flatten<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)
        .filter(|name| !name.is_empty() && !name.contains('/'))
}

/// Read the bundled mods and the index of a `.mrpack`.
pub fn unpack(pack: &[u8]) -> AppResult<UnpackedPack> {
    let mut archive = ZipArchive::new(Cursor::new(pack)).map_err(zip_error)?;
    let mut unpacked = UnpackedPack::default();
    let mut index: Option<PackIndex> = None;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(zip_error)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();

        if name == MRPACK_INDEX_FILE {
            let mut raw = Vec::new();
            entry.read_to_end(&mut raw)?;
            index = Some(
                serde_json::from_slice(&raw)
                    .map_err(|e| AppError::internal(format!("Invalid modpack index: {}", e)))?,
            );
        } else if let Some(file_name) = flatten(&name, MRPACK_OVERRIDE_MODS_PREFIX) {
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            unpacked.bundled.push((file_name.to_string(), data));
        }
    }

    let index = index.ok_or_else(|| AppError::internal("Modpack index missing"))?;
    unpacked.downloads = index
        .files
        .into_iter()
        .filter_map(|file| {
            let name = flatten(&file.path, MRPACK_MODS_PREFIX)?.to_string();
            let url = file.downloads.into_iter().next()?;
            Some((name, url))
        })
        .collect();

    Ok(unpacked)
}

/// Zip files into a flat archive.
pub fn write_archive(files: Vec<(String, Vec<u8>)>) -> AppResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, data) in files {
        writer.start_file(name, options).map_err(zip_error)?;
        writer.write_all(&data)?;
    }

    Ok(writer.finish().map_err(zip_error)?.into_inner())
}

#[cfg(test)]
pub(crate) fn sample_pack(index: Option<&str>, entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut files: Vec<(String, Vec<u8>)> = entries
        .iter()
        .map(|(name, data)| (name.to_string(), data.to_vec()))
        .collect();
    if let Some(index) = index {
        files.push((MRPACK_INDEX_FILE.to_string(), index.as_bytes().to_vec()));
    }
    write_archive(files).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"{
        "formatVersion": 1,
        "files": [
            {"path": "mods/sodium.jar", "downloads": ["https://cdn.test/sodium.jar"]},
            {"path": "config/sodium.json", "downloads": ["https://cdn.test/sodium.json"]},
            {"path": "mods/empty.jar", "downloads": []}
        ]
    }"#;

    #[test]
    fn test_unpack_collects_bundled_and_listed_mods() {
        let pack = sample_pack(
            Some(INDEX),
            &[
                ("overrides/mods/custom.jar", b"custom"),
                ("overrides/config/custom.toml", b"cfg"),
                ("overrides/mods/nested/deep.jar", b"deep"),
            ],
        );

        let unpacked = unpack(&pack).unwrap();
        assert_eq!(
            unpacked.bundled,
            vec![("custom.jar".to_string(), b"custom".to_vec())]
        );
        assert_eq!(
            unpacked.downloads,
            vec![(
                "sodium.jar".to_string(),
                "https://cdn.test/sodium.jar".to_string()
            )]
        );
    }

    #[test]
    fn test_missing_index_is_internal_error() {
        let pack = sample_pack(None, &[("overrides/mods/custom.jar", b"custom")]);
        assert!(matches!(unpack(&pack), Err(AppError::Internal(_))));
    }

    #[test]
    fn test_write_archive_is_flat() {
        let bytes = write_archive(vec![
            ("a.jar".to_string(), b"a".to_vec()),
            ("b.jar".to_string(), b"b".to_vec()),
        ])
        .unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["a.jar", "b.jar"]);

        let mut content = String::new();
        archive.by_name("b.jar").unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "b");
    }
}
