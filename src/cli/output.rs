use std::fmt::Write as FmtWrite;

use serde::Serialize;

use crate::models::OutputFormat;
use crate::services::{CollectionInfo, LoadStats, UploadSummary};

/// Failed uploads listed individually before the rest are summarised.
const MAX_LISTED_ERRORS: usize = 10;

pub trait Formatter {
    fn format_load(&self, stats: &LoadStats, collection: Option<&CollectionInfo>) -> String;
    fn format_upload_summary(&self, summary: &UploadSummary) -> String;
    fn format_status(&self, status: &StatusInfo) -> String;
    fn format_message(&self, message: &str) -> String;
    fn format_error(&self, error: &str) -> String;
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    pub vector_store_url: String,
    pub vector_store_connected: bool,
    pub collection: String,
    /// `None` when the collection does not exist yet.
    pub points: Option<u64>,
    pub embedding_url: String,
    pub embedding_connected: bool,
    pub bucket: String,
    pub prefix: String,
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_load(&self, stats: &LoadStats, collection: Option<&CollectionInfo>) -> String {
        let mut output = String::new();
        writeln!(output, "Load Complete").unwrap();
        writeln!(output, "-------------").unwrap();
        writeln!(output, "Rows upserted: {}", stats.rows).unwrap();
        writeln!(output, "Batches: {}", stats.batches).unwrap();
        if stats.embedded > 0 {
            writeln!(output, "Dense vectors embedded: {}", stats.embedded).unwrap();
        }
        if stats.missing_dense > 0 {
            writeln!(output, "Rows without dense vector: {}", stats.missing_dense).unwrap();
        }
        writeln!(output, "Duration: {}ms", stats.duration_ms).unwrap();

        if let Some(info) = collection {
            writeln!(output).unwrap();
            writeln!(output, "Collection info:").unwrap();
            writeln!(output, "  Name:     {}", info.name).unwrap();
            writeln!(output, "  Status:   {}", info.status).unwrap();
            writeln!(output, "  Points:   {}", info.points_count).unwrap();
            writeln!(output, "  Indexed:  {}", info.indexed_vectors_count).unwrap();
            writeln!(output, "  Segments: {}", info.segments_count).unwrap();
            for (name, size) in &info.dense_vectors {
                writeln!(output, "  Dense:    {} (size {}, cosine)", name, size).unwrap();
            }
            for name in &info.sparse_vectors {
                writeln!(output, "  Sparse:   {}", name).unwrap();
            }
        }

        output
    }

    fn format_upload_summary(&self, summary: &UploadSummary) -> String {
        let report = &summary.report;
        let rule = "=".repeat(60);

        let mut output = String::new();
        writeln!(output, "\n{}", rule).unwrap();
        writeln!(output, "Upload Complete!").unwrap();
        writeln!(output, "{}", rule).unwrap();
        writeln!(output, "✓ Successful: {}", report.successful.len()).unwrap();

        if !report.failed.is_empty() {
            writeln!(output, "✗ Failed: {}", report.failed.len()).unwrap();
            writeln!(output, "\nErrors:").unwrap();
            for (task, error) in report.failed.iter().take(MAX_LISTED_ERRORS) {
                writeln!(output, "  {}: {}", task.local_path.display(), error).unwrap();
            }
            if report.failed.len() > MAX_LISTED_ERRORS {
                writeln!(
                    output,
                    "  ... and {} more errors",
                    report.failed.len() - MAX_LISTED_ERRORS
                )
                .unwrap();
            }
        }

        if let Some(ref urls) = summary.urls {
            writeln!(output, "\nYour images are now publicly accessible!").unwrap();
            writeln!(output, "\nExample URL format:").unwrap();
            writeln!(output, "{}", urls.global).unwrap();
            if let Some(ref regional) = urls.regional {
                writeln!(output, "\nOr using regional domain:").unwrap();
                writeln!(output, "{}", regional).unwrap();
            }
        }

        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "Status").unwrap();
        writeln!(output, "------").unwrap();

        let vector_status = if status.vector_store_connected {
            "[CONNECTED]"
        } else {
            "[DISCONNECTED]"
        };
        writeln!(output, "Qdrant:        {}", vector_status).unwrap();
        writeln!(output, "  URL:         {}", status.vector_store_url).unwrap();
        writeln!(output, "  Collection:  {}", status.collection).unwrap();
        if status.vector_store_connected {
            match status.points {
                Some(points) => writeln!(output, "  Points:      {}", points).unwrap(),
                None => writeln!(output, "  Points:      (collection missing)").unwrap(),
            }
        }
        writeln!(output).unwrap();

        let embedding_status = if status.embedding_connected {
            "[CONNECTED]"
        } else {
            "[DISCONNECTED]"
        };
        writeln!(output, "Embedding:     {}", embedding_status).unwrap();
        writeln!(output, "  URL:         {}", status.embedding_url).unwrap();
        writeln!(output).unwrap();

        writeln!(
            output,
            "Image bucket:  s3://{}/{}",
            status.bucket, status.prefix
        )
        .unwrap();

        output
    }

    fn format_message(&self, message: &str) -> String {
        format!("{}\n", message)
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}\n", error)
    }
}

pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render(&self, value: &serde_json::Value) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}

impl Formatter for JsonFormatter {
    fn format_load(&self, stats: &LoadStats, collection: Option<&CollectionInfo>) -> String {
        self.render(&serde_json::json!({
            "stats": stats,
            "collection": collection,
        }))
    }

    fn format_upload_summary(&self, summary: &UploadSummary) -> String {
        let report = &summary.report;
        let errors: Vec<serde_json::Value> = report
            .failed
            .iter()
            .map(|(task, error)| {
                serde_json::json!({
                    "path": task.local_path,
                    "key": task.key,
                    "error": error,
                })
            })
            .collect();

        self.render(&serde_json::json!({
            "bucket": summary.bucket,
            "total": report.total,
            "successful": report.successful.len(),
            "failed": report.failed.len(),
            "errors": errors,
            "example_url": summary.urls,
        }))
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        self.render(&serde_json::json!(status))
    }

    fn format_message(&self, message: &str) -> String {
        serde_json::json!({"message": message}).to_string()
    }

    fn format_error(&self, error: &str) -> String {
        serde_json::json!({"error": error}).to_string()
    }
}

pub struct MarkdownFormatter;

impl Formatter for MarkdownFormatter {
    fn format_load(&self, stats: &LoadStats, collection: Option<&CollectionInfo>) -> String {
        let mut output = String::new();
        writeln!(output, "## Load Complete\n").unwrap();
        writeln!(output, "| Metric | Value |").unwrap();
        writeln!(output, "|--------|-------|").unwrap();
        writeln!(output, "| Rows upserted | {} |", stats.rows).unwrap();
        writeln!(output, "| Batches | {} |", stats.batches).unwrap();
        writeln!(output, "| Dense vectors embedded | {} |", stats.embedded).unwrap();
        writeln!(output, "| Rows without dense vector | {} |", stats.missing_dense).unwrap();
        writeln!(output, "| Duration | {}ms |", stats.duration_ms).unwrap();

        if let Some(info) = collection {
            writeln!(output, "\n### Collection `{}`\n", info.name).unwrap();
            writeln!(output, "- **Status:** {}", info.status).unwrap();
            writeln!(output, "- **Points:** {}", info.points_count).unwrap();
            writeln!(output, "- **Indexed vectors:** {}", info.indexed_vectors_count).unwrap();
            writeln!(output, "- **Segments:** {}", info.segments_count).unwrap();
            for (name, size) in &info.dense_vectors {
                writeln!(output, "- **Dense `{}`:** size {}, cosine", name, size).unwrap();
            }
            for name in &info.sparse_vectors {
                writeln!(output, "- **Sparse:** `{}`", name).unwrap();
            }
        }

        output
    }

    fn format_upload_summary(&self, summary: &UploadSummary) -> String {
        let report = &summary.report;

        let mut output = String::new();
        writeln!(output, "## Upload Complete\n").unwrap();
        writeln!(output, "| Metric | Value |").unwrap();
        writeln!(output, "|--------|-------|").unwrap();
        writeln!(output, "| Bucket | `{}` |", summary.bucket).unwrap();
        writeln!(output, "| Successful | {} |", report.successful.len()).unwrap();
        writeln!(output, "| Failed | {} |", report.failed.len()).unwrap();

        if !report.failed.is_empty() {
            writeln!(output, "\n### Errors\n").unwrap();
            for (task, error) in report.failed.iter().take(MAX_LISTED_ERRORS) {
                writeln!(output, "- `{}`: {}", task.local_path.display(), error).unwrap();
            }
            if report.failed.len() > MAX_LISTED_ERRORS {
                writeln!(
                    output,
                    "- ... and {} more errors",
                    report.failed.len() - MAX_LISTED_ERRORS
                )
                .unwrap();
            }
        }

        if let Some(ref urls) = summary.urls {
            writeln!(output, "\n### Example URL\n").unwrap();
            writeln!(output, "- {}", urls.global).unwrap();
            if let Some(ref regional) = urls.regional {
                writeln!(output, "- {}", regional).unwrap();
            }
        }

        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "## Status\n").unwrap();

        let vector_status = if status.vector_store_connected {
            "✅"
        } else {
            "❌"
        };
        writeln!(output, "### Qdrant {}\n", vector_status).unwrap();
        writeln!(output, "- **URL:** `{}`", status.vector_store_url).unwrap();
        writeln!(output, "- **Collection:** {}", status.collection).unwrap();
        if let Some(points) = status.points {
            writeln!(output, "- **Points:** {}", points).unwrap();
        }
        writeln!(output).unwrap();

        let embedding_status = if status.embedding_connected {
            "✅"
        } else {
            "❌"
        };
        writeln!(output, "### Embedding Server {}\n", embedding_status).unwrap();
        writeln!(output, "- **URL:** `{}`", status.embedding_url).unwrap();
        writeln!(output).unwrap();

        writeln!(output, "### Image Bucket\n").unwrap();
        writeln!(output, "- `s3://{}/{}`", status.bucket, status.prefix).unwrap();

        output
    }

    fn format_message(&self, message: &str) -> String {
        format!("> {}\n", message)
    }

    fn format_error(&self, error: &str) -> String {
        format!("> ⚠️ **Error:** {}\n", error)
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{UploadReport, UploadTask};
    use crate::services::object_urls;

    fn summary(successful: &[&str], failed: &[(&str, &str)]) -> UploadSummary {
        let mut report = UploadReport::with_total(successful.len() + failed.len());
        report.successful = successful
            .iter()
            .map(|name| UploadTask::new(format!("/data/{name}"), format!("images/{name}")))
            .collect();
        report.failed = failed
            .iter()
            .map(|(name, error)| {
                (
                    UploadTask::new(format!("/data/{name}"), format!("images/{name}")),
                    error.to_string(),
                )
            })
            .collect();

        let urls = successful
            .first()
            .map(|name| object_urls("bucket", &format!("images/{name}"), Some("eu-west-1")));
        UploadSummary {
            bucket: "bucket".to_string(),
            report,
            urls,
        }
    }

    #[test]
    fn test_text_report_all_successful() {
        let text = TextFormatter.format_upload_summary(&summary(&["a.jpg", "b.jpg", "c.jpg"], &[]));

        assert!(text.contains(&"=".repeat(60)));
        assert!(text.contains("Upload Complete!"));
        assert!(text.contains("✓ Successful: 3"));
        assert!(!text.contains("Failed"));
        assert!(!text.contains("Errors:"));
        assert!(text.contains("Example URL format:\nhttps://bucket.s3.amazonaws.com/images/a.jpg"));
        assert!(text.contains(
            "Or using regional domain:\nhttps://bucket.s3.eu-west-1.amazonaws.com/images/a.jpg"
        ));
    }

    #[test]
    fn test_text_report_lists_failures() {
        let text = TextFormatter
            .format_upload_summary(&summary(&["a.jpg"], &[("b.jpg", "Access Denied")]));

        assert!(text.contains("✓ Successful: 1"));
        assert!(text.contains("✗ Failed: 1"));
        assert!(text.contains("Errors:"));
        assert!(text.contains("  /data/b.jpg: Access Denied"));
        assert!(!text.contains("more errors"));
    }

    #[test]
    fn test_text_report_truncates_error_list() {
        let names: Vec<String> = (0..13).map(|i| format!("{i}.png")).collect();
        let failed: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "boom")).collect();
        let text = TextFormatter.format_upload_summary(&summary(&[], &failed));

        assert_eq!(text.matches(": boom").count(), MAX_LISTED_ERRORS);
        assert!(text.contains("  ... and 3 more errors"));
        assert!(!text.contains("Example URL"));
    }

    #[test]
    fn test_error_rendering_per_format() {
        let message = "upload error: path photos.zip does not exist";
        assert_eq!(
            TextFormatter.format_error(message),
            format!("Error: {message}\n")
        );

        let json: serde_json::Value =
            serde_json::from_str(&JsonFormatter::new(true).format_error(message)).unwrap();
        assert_eq!(json["error"], message);

        assert!(MarkdownFormatter.format_error(message).contains(message));
    }

    #[test]
    fn test_json_report_counts() {
        let json = JsonFormatter::new(false)
            .format_upload_summary(&summary(&["a.jpg"], &[("b.jpg", "Access Denied")]));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["successful"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["errors"][0]["key"], "images/b.jpg");
    }
}
