use std::fmt::Write as FmtWrite;
use std::path::PathBuf;

use serde::Serialize;

use crate::models::OutputFormat;
use crate::services::TokenEstimate;

pub trait Formatter {
    fn format_estimate(&self, estimate: &TokenEstimate) -> String;
    fn format_run_stats(&self, stats: &RunStats) -> String;
    fn format_file_list(&self, files: &[PathBuf]) -> String;
    fn format_message(&self, message: &str) -> String;
    fn format_error(&self, error: &str) -> String;
}

/// Summary of one `embed` run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub documents: u64,
    pub batches: u64,
    pub total_tokens: u64,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_estimate(&self, estimate: &TokenEstimate) -> String {
        let mut output = String::new();
        writeln!(output, "Token Estimate").unwrap();
        writeln!(output, "--------------").unwrap();
        writeln!(output, "Files:          {}", estimate.files).unwrap();
        writeln!(output, "Total tokens:   {}", estimate.total_tokens).unwrap();
        writeln!(output, "Estimated cost: ${:.6}", estimate.estimated_cost_usd).unwrap();

        if !estimate.per_file.is_empty() {
            writeln!(output).unwrap();
            for file in &estimate.per_file {
                writeln!(output, "  {:>8}  {}", file.tokens, file.path.display()).unwrap();
            }
        }
        output
    }

    fn format_run_stats(&self, stats: &RunStats) -> String {
        let mut output = String::new();
        writeln!(output, "Embedding Complete").unwrap();
        writeln!(output, "------------------").unwrap();
        writeln!(output, "Documents: {}", stats.documents).unwrap();
        writeln!(output, "Batches: {}", stats.batches).unwrap();
        writeln!(output, "Tokens used: {}", stats.total_tokens).unwrap();
        writeln!(output, "Duration: {}ms", stats.duration_ms).unwrap();
        if let Some(ref path) = stats.output {
            writeln!(output, "Output: {}", path).unwrap();
        }
        output
    }

    fn format_file_list(&self, files: &[PathBuf]) -> String {
        if files.is_empty() {
            return "No files to embed.\n".to_string();
        }

        let mut output = String::new();
        writeln!(output, "Files to embed ({})", files.len()).unwrap();
        for file in files {
            writeln!(output, "  {}", file.display()).unwrap();
        }
        output
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }
}

pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render(&self, value: &impl Serialize) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        let mut output = rendered.unwrap_or_else(|e| serde_json::json!({"error": e.to_string()}).to_string());
        output.push('\n');
        output
    }
}

impl Formatter for JsonFormatter {
    fn format_estimate(&self, estimate: &TokenEstimate) -> String {
        self.render(estimate)
    }

    fn format_run_stats(&self, stats: &RunStats) -> String {
        self.render(stats)
    }

    fn format_file_list(&self, files: &[PathBuf]) -> String {
        let files: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
        self.render(&serde_json::json!({"count": files.len(), "files": files}))
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
    fn format_estimate(&self, estimate: &TokenEstimate) -> String {
        let mut output = String::new();
        writeln!(output, "## Token Estimate\n").unwrap();
        writeln!(output, "| Metric | Value |").unwrap();
        writeln!(output, "|--------|-------|").unwrap();
        writeln!(output, "| Files | {} |", estimate.files).unwrap();
        writeln!(output, "| Total tokens | {} |", estimate.total_tokens).unwrap();
        writeln!(output, "| Estimated cost | ${:.6} |", estimate.estimated_cost_usd).unwrap();

        if !estimate.per_file.is_empty() {
            writeln!(output, "\n### Files\n").unwrap();
            writeln!(output, "| File | Tokens |").unwrap();
            writeln!(output, "|------|--------|").unwrap();
            for file in &estimate.per_file {
                writeln!(output, "| `{}` | {} |", file.path.display(), file.tokens).unwrap();
            }
        }
        output
    }

    fn format_run_stats(&self, stats: &RunStats) -> String {
        let mut output = String::new();
        writeln!(output, "## Embedding Complete\n").unwrap();
        writeln!(output, "| Metric | Value |").unwrap();
        writeln!(output, "|--------|-------|").unwrap();
        writeln!(output, "| Documents | {} |", stats.documents).unwrap();
        writeln!(output, "| Batches | {} |", stats.batches).unwrap();
        writeln!(output, "| Tokens used | {} |", stats.total_tokens).unwrap();
        writeln!(output, "| Duration | {}ms |", stats.duration_ms).unwrap();
        if let Some(ref path) = stats.output {
            writeln!(output, "| Output | `{}` |", path).unwrap();
        }
        output
    }

    fn format_file_list(&self, files: &[PathBuf]) -> String {
        if files.is_empty() {
            return "## Files to embed\n\n*No files found.*\n".to_string();
        }

        let mut output = String::new();
        writeln!(output, "## Files to embed ({})\n", files.len()).unwrap();
        for file in files {
            writeln!(output, "- `{}`", file.display()).unwrap();
        }
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
    use crate::services::FileEstimate;

    fn estimate() -> TokenEstimate {
        TokenEstimate {
            files: 2,
            total_tokens: 1500,
            estimated_cost_usd: 0.00015,
            per_file: vec![
                FileEstimate {
                    path: PathBuf::from("docs/a.md"),
                    tokens: 1000,
                },
                FileEstimate {
                    path: PathBuf::from("docs/b.md"),
                    tokens: 500,
                },
            ],
        }
    }

    #[test]
    fn test_text_estimate() {
        let output = TextFormatter.format_estimate(&estimate());
        assert!(output.contains("Total tokens:   1500"));
        assert!(output.contains("docs/b.md"));
    }

    #[test]
    fn test_json_run_stats() {
        let stats = RunStats {
            documents: 3,
            batches: 2,
            total_tokens: 42,
            duration_ms: 10,
            output: None,
        };
        let output = JsonFormatter::new(false).format_run_stats(&stats);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["documents"], 3);
        assert_eq!(value["batches"], 2);
        assert!(value.get("output").is_none());
    }

    #[test]
    fn test_markdown_file_list() {
        let files = vec![PathBuf::from("a.md"), PathBuf::from("b.md")];
        let output = MarkdownFormatter.format_file_list(&files);
        assert!(output.starts_with("## Files to embed (2)"));
        assert!(output.contains("- `b.md`"));
        assert!(MarkdownFormatter.format_file_list(&[]).contains("No files found"));
    }
}
