//! File utilities for image discovery.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::UploadError;
use crate::models::UploadTask;

/// Extensions (lowercase, without the dot) selected for upload.
pub const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg", "ico"];

/// Check if a path has an image extension, ignoring case.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// MIME type sent with an uploaded file.
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "ico" => "image/vnd.microsoft.icon",
        _ => "application/octet-stream",
    }
}

/// Object key for a file: `prefix` followed by the relative path with `/` separators.
pub fn object_key(prefix: &str, relative: &Path) -> String {
    let relative = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
        .replace('\\', "/");
    format!("{prefix}{relative}")
}

/// Recursively collect the images under `root`, sorted by key.
///
/// Files matching any of the `exclude` glob patterns are skipped. Symlinks to
/// files are included under the link's own path; symlinked directories are
/// not descended into.
pub fn find_images(
    root: &Path,
    prefix: &str,
    exclude: &[String],
) -> Result<Vec<UploadTask>, UploadError> {
    let patterns: Vec<glob::Pattern> = exclude
        .iter()
        .filter_map(|p| glob::Pattern::new(p).ok())
        .collect();

    let mut tasks = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| UploadError::WalkError(e.to_string()))?;
        let entry_path = entry.path();

        if !entry_path.is_file() || !is_image_file(entry_path) {
            continue;
        }

        let path_str = entry_path.to_string_lossy();
        if patterns.iter().any(|p| p.matches(&path_str)) {
            continue;
        }

        let Ok(relative) = entry_path.strip_prefix(root) else {
            continue;
        };
        tasks.push(UploadTask::new(entry_path, object_key(prefix, relative)));
    }

    tasks.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(tasks)
}

/// Total size in bytes of the files behind `tasks`.
pub fn total_size(tasks: &[UploadTask]) -> std::io::Result<u64> {
    tasks
        .iter()
        .map(|t| fs::metadata(&t.local_path).map(|m| m.len()))
        .sum()
}

/// Format a byte count as gigabytes with two decimals.
pub fn format_gb(bytes: u64) -> String {
    format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn touch(path: &Path, bytes: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("a.jpg")));
        assert!(is_image_file(Path::new("dir/B.JPEG")));
        assert!(is_image_file(Path::new("icon.Ico")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("jpg")));
        assert!(!is_image_file(Path::new("archive.zip")));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(content_type(Path::new("a.svg")), "image/svg+xml");
        assert_eq!(content_type(Path::new("a.bin")), "application/octet-stream");
        assert_eq!(content_type(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_object_key() {
        let relative: PathBuf = ["nested", "deep", "a.png"].iter().collect();
        assert_eq!(object_key("images/", &relative), "images/nested/deep/a.png");
        assert_eq!(object_key("", Path::new("a.png")), "a.png");
        assert_eq!(object_key("p/", Path::new("dir\\b.png")), "p/dir/b.png");
    }

    #[test]
    fn test_find_images_filters_by_extension() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("a.jpg"), b"a");
        touch(&root.join("sub/B.PNG"), b"bb");
        touch(&root.join("sub/readme.txt"), b"text");
        touch(&root.join("sub/deeper/c.webp"), b"ccc");
        fs::create_dir_all(root.join("empty.jpg")).unwrap();

        let tasks = find_images(root, "images/", &[]).unwrap();
        let keys: Vec<&str> = tasks.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["images/a.jpg", "images/sub/B.PNG", "images/sub/deeper/c.webp"]
        );
        assert_eq!(total_size(&tasks).unwrap(), 6);
    }

    #[test]
    fn test_find_images_is_deterministic() {
        let dir = tempdir().unwrap();
        for name in ["z.gif", "m/a.bmp", "b.svg"] {
            touch(&dir.path().join(name), b"x");
        }
        let first = find_images(dir.path(), "x/", &[]).unwrap();
        let second = find_images(dir.path(), "x/", &[]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_find_images_honours_exclude() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("keep/a.jpg"), b"x");
        touch(&dir.path().join("thumbs/a.jpg"), b"x");

        let tasks = find_images(dir.path(), "", &["**/thumbs/**".to_string()]).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].key, "keep/a.jpg");
    }

    #[cfg(unix)]
    #[test]
    fn test_find_images_includes_symlinked_files() {
        use std::os::unix::fs::symlink;

        let outside = tempdir().unwrap();
        let target = outside.path().join("shared.jpg");
        touch(&target, b"linked");

        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.jpg"), b"x");
        symlink(&target, dir.path().join("b.jpg")).unwrap();
        symlink(outside.path(), dir.path().join("elsewhere")).unwrap();

        let tasks = find_images(dir.path(), "images/", &[]).unwrap();
        let keys: Vec<&str> = tasks.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["images/a.jpg", "images/b.jpg"]);
        assert_eq!(total_size(&tasks).unwrap(), 7);
    }

    #[test]
    fn test_format_gb() {
        assert_eq!(format_gb(0), "0.00 GB");
        assert_eq!(format_gb(3 * 1024 * 1024 * 1024 / 2), "1.50 GB");
    }
}
