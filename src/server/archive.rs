//! Zip archives of solution directories.

use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{AppError, Result};

/// Zip the contents of `dir` (not the directory itself) into memory.
pub async fn zip_directory(dir: PathBuf) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || zip_directory_blocking(&dir))
        .await
        .map_err(|e| AppError::Io(std::io::Error::other(e)))?
}

fn zip_directory_blocking(dir: &Path) -> Result<Vec<u8>> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| AppError::Io(std::io::Error::other(e)))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            writer.add_directory(format!("{name}/"), options)?;
        } else if entry.file_type().is_file() {
            writer.start_file(name, options)?;
            let mut file = File::open(entry.path())?;
            std::io::copy(&mut file, &mut writer)?;
        }
    }

    Ok(writer.finish()?.into_inner())
}
