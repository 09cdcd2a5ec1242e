//! Input resolution and zip extraction for the image upload.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::UploadError;

/// What the user pointed the upload at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedInput {
    /// A zip archive that should be extracted first.
    Archive(PathBuf),
    Directory(PathBuf),
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("zip"))
}

/// Classify the input path.
///
/// With extraction disabled a zip file is not a valid input.
pub fn resolve_input(path: &Path, extract: bool) -> Result<ResolvedInput, UploadError> {
    if !path.exists() {
        return Err(UploadError::PathNotFound(path.to_path_buf()));
    }

    if extract && is_zip(path) && path.is_file() {
        Ok(ResolvedInput::Archive(path.to_path_buf()))
    } else if path.is_dir() {
        Ok(ResolvedInput::Directory(path.to_path_buf()))
    } else {
        Err(UploadError::InvalidInput(path.to_path_buf()))
    }
}

/// Sibling directory an archive is extracted into: `photos.zip` -> `photos/`.
pub fn extraction_dir(archive: &Path) -> PathBuf {
    let stem = archive.file_stem().unwrap_or_default();
    archive
        .parent()
        .map_or_else(|| PathBuf::from(stem), |parent| parent.join(stem))
}

/// Extract every entry of `archive` under `dest`, returning the number of files written.
///
/// Existing files with the same name are overwritten, anything else already in
/// `dest` is left alone. Entries whose names would escape `dest` are skipped.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<usize, UploadError> {
    let fail = |reason: String| UploadError::Extract {
        path: archive.to_path_buf(),
        reason,
    };

    let file = File::open(archive).map_err(|e| fail(e.to_string()))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| fail(e.to_string()))?;
    fs::create_dir_all(dest).map_err(|e| fail(e.to_string()))?;

    let mut written = 0;
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| fail(e.to_string()))?;
        let Some(relative) = entry.enclosed_name() else {
            warn!(entry = entry.name(), "skipping archive entry with unsafe path");
            continue;
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| fail(e.to_string()))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| fail(e.to_string()))?;
        }
        let mut out = File::create(&out_path).map_err(|e| fail(e.to_string()))?;
        io::copy(&mut entry, &mut out).map_err(|e| fail(e.to_string()))?;
        written += 1;
    }

    debug!(archive = %archive.display(), files = written, "extracted archive");
    Ok(written)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io::Write;

    use super::*;
    use zip::write::SimpleFileOptions;

    /// Write a zip holding `files` (name, contents).
    pub fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for (name, contents) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents).unwrap();
        }
        writer.finish().unwrap();
    }
}
