//! Utility modules.

pub mod archive;
pub mod file;

pub use archive::{ResolvedInput, extract_archive, extraction_dir, resolve_input};
pub use file::{IMAGE_EXTENSIONS, content_type, find_images, format_gb, is_image_file, object_key};
