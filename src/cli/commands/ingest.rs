//! Ingest command implementation.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::cli::output::{IngestSummary, get_formatter};
use crate::models::{Config, OutputFormat, UploadDocument};
use crate::services::{Services, validate_request};

/// Arguments for the ingest command.
#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Path to the upload document (use - for stdin)
    #[arg()]
    pub file: PathBuf,

    /// Only parse and validate the document, without writing anything
    #[arg(long)]
    pub validate_only: bool,
}

pub async fn handle_ingest(args: IngestArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

    let input = read_input(&args.file)?;
    let upload = parse_upload(&input)?;
    let count = upload.hadiths.len();

    if verbose {
        eprintln!(
            "Collection '{}' ({}): {} hadiths",
            upload.collection.code, upload.collection.title, count
        );
    }

    if args.validate_only {
        validate_request(&upload.collection, &upload.hadiths, config.ingest.max_records)?;
        println!(
            "{}",
            formatter.format_message(&format!(
                "Validation successful: {} hadiths ready for collection '{}'",
                count, upload.collection.code
            ))
        );
        return Ok(());
    }

    let services = Services::connect(&config).await?;
    let pipeline = services.ingest_pipeline();

    let spinner = (format == OutputFormat::Text).then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(format!(
            "Ingesting {} hadiths into '{}'",
            count, upload.collection.code
        ));
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    });

    let start = Instant::now();
    let result = pipeline.ingest(&upload.collection, upload.hadiths).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    services.close().await;

    match result {
        Ok(progress) => {
            let summary = IngestSummary {
                collection: upload.collection.code,
                progress,
                duration_ms,
            };
            print!("{}", formatter.format_ingest(&summary));
            Ok(())
        }
        Err(e) => {
            if let Some(progress) = e.progress() {
                eprintln!(
                    "{}",
                    formatter.format_error(&format!(
                        "stopped after {} inserted, {} embedded; resubmitting will insert those rows again",
                        progress.inserted_count, progress.embedded_count
                    ))
                );
            }
            Err(e.into())
        }
    }
}

/// Read input from file or stdin.
fn read_input(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        return Ok(input);
    }
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

fn parse_upload(input: &str) -> Result<UploadDocument> {
    serde_json::from_str(input.trim()).context("failed to parse upload document")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const UPLOAD: &str = r#"{
        "collection": {"code": "bukhari", "title": "Sahih al-Bukhari"},
        "hadiths": [
            {"number": "1", "text_ru": "Дела оцениваются по намерениям", "grade": "sahih"},
            {"number": "2", "text_en": "Faith has over seventy branches", "topics": ["faith"]}
        ]
    }"#;

    #[test]
    fn test_parse_upload() {
        let upload = parse_upload(UPLOAD).unwrap();
        assert_eq!(upload.collection.code, "bukhari");
        assert_eq!(upload.hadiths.len(), 2);
        assert_eq!(upload.hadiths[0].text_en, "");
        assert_eq!(upload.hadiths[1].topics, vec!["faith".to_string()]);
    }

    #[test]
    fn test_upload_checked_without_connecting() {
        let upload = parse_upload(UPLOAD).unwrap();
        assert!(validate_request(&upload.collection, &upload.hadiths, 2000).is_ok());

        let untitled =
            parse_upload(r#"{"collection": {"code": "bukhari"}, "hadiths": [{}]}"#).unwrap();
        assert!(validate_request(&untitled.collection, &untitled.hadiths, 2000).is_err());
    }

    #[test]
    fn test_parse_upload_rejects_garbage() {
        assert!(parse_upload("not json").is_err());
    }

    #[test]
    fn test_read_input_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(UPLOAD.as_bytes()).unwrap();
        let input = read_input(file.path()).unwrap();
        assert!(input.contains("bukhari"));
    }
}
