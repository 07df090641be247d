use std::fs;
use std::path::{Path, PathBuf};

use inventory_core::naming::INDEX_DOCUMENT;
use inventory_core::site::{content_type_for, render_index, HTML_CONTENT_TYPE};
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::control_plane::ControlPlane;
use crate::error::DeployError;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("failed to read site file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to walk site directory: {0}")]
    Walk(#[from] walkdir::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteAsset {
    pub key: String,
    pub path: PathBuf,
    pub content_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitePublication {
    pub index_uploaded: bool,
    pub assets_uploaded: usize,
}

/// Every file below `web_dir` except the root index template, keyed by its
/// `/`-separated relative path.
pub fn collect_assets(web_dir: &Path) -> Result<Vec<SiteAsset>, SiteError> {
    let mut assets = Vec::new();
    for entry in WalkDir::new(web_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(web_dir) else {
            continue;
        };
        let key = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if key == INDEX_DOCUMENT {
            continue;
        }
        assets.push(SiteAsset {
            key,
            path: entry.path().to_path_buf(),
            content_type: content_type_for(entry.path()),
        });
    }
    Ok(assets)
}

/// Renders the index template against `api_url` and uploads the whole site.
///
/// Nothing is uploaded when the template is missing.
pub fn publish_site(
    cloud: &impl ControlPlane,
    bucket: &str,
    web_dir: &Path,
    api_url: &str,
) -> Result<SitePublication, DeployError> {
    let index_path = web_dir.join(INDEX_DOCUMENT);
    if !index_path.is_file() {
        warn!(path = %index_path.display(), "site template not found; skipping site upload");
        return Ok(SitePublication::default());
    }

    let template = fs::read_to_string(&index_path).map_err(|source| SiteError::Read {
        path: index_path.clone(),
        source,
    })?;
    let rendered = render_index(&template, api_url);
    cloud
        .put_object(
            bucket,
            INDEX_DOCUMENT,
            rendered.into_bytes(),
            Some(HTML_CONTENT_TYPE),
        )
        .map_err(|source| DeployError::cloud("upload site index", source))?;

    let assets = collect_assets(web_dir)?;
    for asset in &assets {
        let body = fs::read(&asset.path).map_err(|source| SiteError::Read {
            path: asset.path.clone(),
            source,
        })?;
        cloud
            .put_object(bucket, &asset.key, body, Some(asset.content_type.as_str()))
            .map_err(|source| {
                DeployError::cloud(format!("upload site asset {}", asset.key), source)
            })?;
    }

    info!(bucket, assets = assets.len(), "site published");
    Ok(SitePublication {
        index_uploaded: true,
        assets_uploaded: assets.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_nested_assets_with_forward_slash_keys() {
        let web = tempfile::tempdir().expect("web dir");
        fs::write(web.path().join(INDEX_DOCUMENT), "<html></html>").expect("index");
        fs::create_dir_all(web.path().join("css")).expect("css dir");
        fs::create_dir_all(web.path().join("img/icons")).expect("img dir");
        fs::write(web.path().join("css/styles.css"), "body {}").expect("css");
        fs::write(web.path().join("img/icons/logo.png"), [0x89, b'P']).expect("png");
        fs::write(web.path().join("LICENSE"), "text").expect("license");

        let assets = collect_assets(web.path()).expect("walk succeeds");
        let keys: Vec<(&str, &str)> = assets
            .iter()
            .map(|asset| (asset.key.as_str(), asset.content_type.as_str()))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("LICENSE", "text/plain"),
                ("css/styles.css", "text/css"),
                ("img/icons/logo.png", "image/png"),
            ]
        );
    }

    #[test]
    fn nested_index_files_are_regular_assets() {
        let web = tempfile::tempdir().expect("web dir");
        fs::create_dir_all(web.path().join("docs")).expect("docs dir");
        fs::write(web.path().join("docs/index.html"), "<p>docs</p>").expect("nested index");

        let assets = collect_assets(web.path()).expect("walk succeeds");
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].key, "docs/index.html");
        assert_eq!(assets[0].content_type, "text/html");
    }
}
