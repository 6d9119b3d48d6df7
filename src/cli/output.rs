use std::fmt::Write as FmtWrite;

use serde::Serialize;

use crate::models::{IngestProgress, OutputFormat, SearchHit, SearchResults};

pub trait Formatter {
    fn format_search_results(&self, results: &SearchResults) -> String;
    fn format_ingest(&self, summary: &IngestSummary) -> String;
    fn format_status(&self, status: &StatusInfo) -> String;
    fn format_message(&self, message: &str) -> String;
    fn format_error(&self, error: &str) -> String;
}

/// Outcome of one ingest command.
#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub collection: String,
    pub progress: IngestProgress,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackendStatus {
    pub url: String,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    pub record_store: BackendStatus,
    pub collections: Option<u64>,
    pub hadiths: Option<u64>,
    pub embedder: BackendStatus,
    pub embedding_model: Option<String>,
    pub vector_store: BackendStatus,
    pub collection: String,
    pub points: Option<u64>,
}

impl StatusInfo {
    pub fn all_connected(&self) -> bool {
        self.record_store.connected && self.embedder.connected && self.vector_store.connected
    }
}

fn hit_title(hit: &SearchHit) -> &str {
    hit.payload_str("title").unwrap_or("(untitled)")
}

fn count_or_dash(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub struct TextFormatter;

impl TextFormatter {
    fn backend_line(output: &mut String, label: &str, backend: &BackendStatus) {
        let state = if backend.connected {
            "[CONNECTED]"
        } else {
            "[DISCONNECTED]"
        };
        let _ = writeln!(output, "{:<14} {} ({})", label, state, backend.url);
        if let Some(ref error) = backend.error {
            let _ = writeln!(output, "  Error:       {}", error);
        }
    }
}

impl Formatter for TextFormatter {
    fn format_search_results(&self, results: &SearchResults) -> String {
        if results.is_empty() {
            return format!("No results found for: {}\n", results.query);
        }

        let mut output = String::new();
        let _ = writeln!(output, "Search results for: \"{}\"", results.query);
        let _ = writeln!(
            output,
            "Found {} results in {}ms\n",
            results.len(),
            results.duration_ms
        );

        for (i, hit) in results.results.iter().enumerate() {
            let _ = writeln!(output, "{}. [Score: {:.3}] {}", i + 1, hit.score, hit_title(hit));
            if let Some(lang) = hit.payload_str("lang") {
                let _ = writeln!(output, "   Language: {}", lang);
            }
            let _ = writeln!(output, "   Id: {}", hit.id);
            let _ = writeln!(output, "   ---");
            for line in hit.payload_str("snippet").unwrap_or_default().lines() {
                let _ = writeln!(output, "   {}", line);
            }
            let _ = writeln!(output);
        }

        output
    }

    fn format_ingest(&self, summary: &IngestSummary) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "Ingestion Complete");
        let _ = writeln!(output, "------------------");
        let _ = writeln!(output, "Collection: {}", summary.collection);
        let _ = writeln!(output, "Inserted:   {}", summary.progress.inserted_count);
        let _ = writeln!(output, "Embedded:   {}", summary.progress.embedded_count);
        let _ = writeln!(output, "Duration:   {}ms", summary.duration_ms);
        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "Status");
        let _ = writeln!(output, "------");

        Self::backend_line(&mut output, "PostgreSQL:", &status.record_store);
        if status.record_store.connected {
            let _ = writeln!(output, "  Collections: {}", count_or_dash(status.collections));
            let _ = writeln!(output, "  Hadiths:     {}", count_or_dash(status.hadiths));
        }
        let _ = writeln!(output);

        Self::backend_line(&mut output, "Embedder:", &status.embedder);
        if let Some(ref model) = status.embedding_model {
            let _ = writeln!(output, "  Model:       {}", model);
        }
        let _ = writeln!(output);

        Self::backend_line(&mut output, "Qdrant:", &status.vector_store);
        if status.vector_store.connected {
            let _ = writeln!(output, "  Collection:  {}", status.collection);
            let _ = writeln!(output, "  Points:      {}", count_or_dash(status.points));
        }

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

    fn render<T: Serialize>(&self, value: &T) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}

impl Formatter for JsonFormatter {
    fn format_search_results(&self, results: &SearchResults) -> String {
        self.render(results)
    }

    fn format_ingest(&self, summary: &IngestSummary) -> String {
        self.render(&summary.progress)
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        self.render(status)
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
    fn format_search_results(&self, results: &SearchResults) -> String {
        if results.is_empty() {
            return format!("## No results found\n\nQuery: `{}`\n", results.query);
        }

        let mut output = String::new();
        let _ = writeln!(output, "## Search Results\n");
        let _ = writeln!(output, "**Query:** `{}`\n", results.query);
        let _ = writeln!(
            output,
            "Found {} results in {}ms\n",
            results.len(),
            results.duration_ms
        );

        for (i, hit) in results.results.iter().enumerate() {
            let _ = writeln!(
                output,
                "### {}. {} (score {:.3})\n",
                i + 1,
                hit_title(hit),
                hit.score
            );
            if let Some(lang) = hit.payload_str("lang") {
                let _ = writeln!(output, "**Language:** `{}`\n", lang);
            }
            for line in hit.payload_str("snippet").unwrap_or_default().lines() {
                let _ = writeln!(output, "> {}", line);
            }
            let _ = writeln!(output);
        }

        output
    }

    fn format_ingest(&self, summary: &IngestSummary) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "## Ingestion Complete\n");
        let _ = writeln!(output, "| Metric | Value |");
        let _ = writeln!(output, "|--------|-------|");
        let _ = writeln!(output, "| Collection | `{}` |", summary.collection);
        let _ = writeln!(output, "| Inserted | {} |", summary.progress.inserted_count);
        let _ = writeln!(output, "| Embedded | {} |", summary.progress.embedded_count);
        let _ = writeln!(output, "| Duration | {}ms |", summary.duration_ms);
        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mark = |connected: bool| if connected { "✅" } else { "❌" };

        let mut output = String::new();
        let _ = writeln!(output, "## Status\n");
        let _ = writeln!(output, "| Backend | URL | Connected |");
        let _ = writeln!(output, "|---------|-----|-----------|");
        for (name, backend) in [
            ("PostgreSQL", &status.record_store),
            ("Embedder", &status.embedder),
            ("Qdrant", &status.vector_store),
        ] {
            let _ = writeln!(
                output,
                "| {} | `{}` | {} |",
                name,
                backend.url,
                mark(backend.connected)
            );
        }
        let _ = writeln!(output);
        let _ = writeln!(output, "- **Collections:** {}", count_or_dash(status.collections));
        let _ = writeln!(output, "- **Hadiths:** {}", count_or_dash(status.hadiths));
        if let Some(ref model) = status.embedding_model {
            let _ = writeln!(output, "- **Model:** {}", model);
        }
        let _ = writeln!(output, "- **Index collection:** {}", status.collection);
        let _ = writeln!(output, "- **Points:** {}", count_or_dash(status.points));
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
