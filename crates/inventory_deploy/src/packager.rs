use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Entry point file name the `provided` runtimes execute.
pub const HANDLER_FILE: &str = "bootstrap";

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("failed to read handler binary '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write function archive '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to build function archive '{}': {source}", path.display())]
    Zip {
        path: PathBuf,
        source: zip::result::ZipError,
    },
}

/// Zips `<source_dir>/bootstrap` into `<output_dir>/<function_name>.zip`.
///
/// Returns `Ok(None)` without touching `output_dir` when the handler binary
/// is absent.
pub fn package_function(
    source_dir: &Path,
    output_dir: &Path,
    function_name: &str,
) -> Result<Option<PathBuf>, PackageError> {
    let binary_path = source_dir.join(HANDLER_FILE);
    if !binary_path.is_file() {
        return Ok(None);
    }

    let binary = fs::read(&binary_path).map_err(|source| PackageError::Read {
        path: binary_path.clone(),
        source,
    })?;

    let zip_path = output_dir.join(format!("{function_name}.zip"));
    let file = fs::File::create(&zip_path).map_err(|source| PackageError::Write {
        path: zip_path.clone(),
        source,
    })?;

    let zip_error = |source| PackageError::Zip {
        path: zip_path.clone(),
        source,
    };

    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file(HANDLER_FILE, options).map_err(zip_error)?;
    zip.write_all(&binary).map_err(|source| PackageError::Write {
        path: zip_path.clone(),
        source,
    })?;
    zip.finish().map_err(zip_error)?;

    Ok(Some(zip_path))
}
