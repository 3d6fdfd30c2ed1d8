//! docsift - extract text from documents and images.
//!
//! Each subcommand takes a local path or an HTTP(S) URL and prints the
//! extraction result as JSON on stdout. Logs go to stderr; set `RUST_LOG`
//! to change the level.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docsift_core::{DocsiftConfig, MemoryCache, Source, TokenCache};
use docsift_extractors::{
    ExtractionPipeline, ExtractorFactory, OcrClient, OfficeOcrClient, OfficeReader,
};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "docsift", author, version, about)]
struct Args {
    /// Configuration file (.toml, .json or .yaml); environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Redis URL for the OCR token cache (needs the `redis` feature)
    #[arg(long, global = true)]
    redis: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// OCR an image
    Image { source: String },
    /// OCR a PDF page by page
    Pdf { source: String },
    /// Paragraph text of a Word document
    Word { source: String },
    /// Question/answer pairs from a spreadsheet
    Excel { source: String },
    /// Full spreadsheet tables, header rows included
    ExcelTable { source: String },
    /// Slide text of a presentation
    Ppt { source: String },
    /// Plain text file
    Text { source: String },
    /// OCR a remote image through the office-OCR service
    OfficeImage { url: String },
    /// OCR a remote PDF through the office-OCR service
    OfficePdf { url: String },
    /// Describe a remote image with the vision model
    Describe { url: String },
    /// Route by file suffix to whichever extractor handles it
    Auto { source: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let cache = token_cache(args.redis.as_deref()).await?;

    let output = run(args.command, &config, cache).await?;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<DocsiftConfig> {
    match path {
        Some(path) => {
            let mut config = DocsiftConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.apply_env();
            debug!(path = %path.display(), "Loaded configuration file");
            Ok(config)
        }
        None => Ok(DocsiftConfig::from_env()),
    }
}

async fn token_cache(redis_url: Option<&str>) -> Result<Arc<dyn TokenCache>> {
    match redis_url {
        #[cfg(feature = "redis")]
        Some(url) => {
            tracing::info!("Using Redis token cache");
            Ok(Arc::new(docsift_core::RedisCache::connect(url).await?))
        }
        #[cfg(not(feature = "redis"))]
        Some(_) => anyhow::bail!("--redis needs docsift built with the `redis` feature"),
        None => Ok(Arc::new(MemoryCache::new())),
    }
}

async fn run(
    command: Command,
    config: &DocsiftConfig,
    cache: Arc<dyn TokenCache>,
) -> Result<Value> {
    let fetcher = ExtractorFactory::fetcher(config);

    let value = match command {
        Command::Image { source } => {
            let client = OcrClient::connect(fetcher, config, cache).await?;
            let result = match Source::parse(&source) {
                Source::Path(path) => client.image(&path).await?,
                Source::Url(url) => client.image_url(&url).await?,
            };
            serde_json::to_value(result)?
        }
        Command::Pdf { source } => {
            let client = OcrClient::connect(fetcher, config, cache).await?;
            let result = match Source::parse(&source) {
                Source::Path(path) => client.pdf(&path).await?,
                Source::Url(url) => client.pdf_url(&url).await?,
            };
            serde_json::to_value(result)?
        }
        Command::Word { source } => {
            serde_json::to_value(OfficeReader::new(fetcher).word(&Source::parse(&source)).await?)?
        }
        Command::Excel { source } => serde_json::to_value(
            OfficeReader::new(fetcher)
                .excel_pairs(&Source::parse(&source))
                .await?,
        )?,
        Command::ExcelTable { source } => serde_json::to_value(
            OfficeReader::new(fetcher)
                .excel_tables(&Source::parse(&source))
                .await?,
        )?,
        Command::Ppt { source } => serde_json::to_value(
            OfficeReader::new(fetcher)
                .presentation(&Source::parse(&source))
                .await?,
        )?,
        Command::Text { source } => {
            serde_json::to_value(OfficeReader::new(fetcher).text(&Source::parse(&source)).await?)?
        }
        Command::OfficeImage { url } => serde_json::to_value(
            OfficeOcrClient::new(fetcher, config.office_ocr.clone())?
                .image_url(&url)
                .await?,
        )?,
        Command::OfficePdf { url } => serde_json::to_value(
            OfficeOcrClient::new(fetcher, config.office_ocr.clone())?
                .pdf_url(&url)
                .await?,
        )?,
        Command::Describe { url } => describe(config, &url).await?,
        Command::Auto { source } => serde_json::to_value(
            ExtractionPipeline::from_config(config, cache)?
                .extract(&Source::parse(&source))
                .await?,
        )?,
    };

    Ok(value)
}

#[cfg(feature = "vision")]
async fn describe(config: &DocsiftConfig, url: &str) -> Result<Value> {
    let content = ExtractorFactory::vision(config)?.describe(url).await?;
    Ok(serde_json::json!({ "content": content }))
}

#[cfg(not(feature = "vision"))]
async fn describe(_config: &DocsiftConfig, _url: &str) -> Result<Value> {
    anyhow::bail!("describe needs docsift built with the `vision` feature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_subcommand_names() {
        let args =
            Args::try_parse_from(["docsift", "excel-table", "book.xlsx", "--pretty"]).unwrap();
        assert!(args.pretty);
        assert_eq!(
            args.command,
            Command::ExcelTable {
                source: "book.xlsx".to_string()
            }
        );

        let args =
            Args::try_parse_from(["docsift", "office-pdf", "https://example.com/a.pdf"]).unwrap();
        assert_eq!(
            args.command,
            Command::OfficePdf {
                url: "https://example.com/a.pdf".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_run_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "hello\nworld").unwrap();

        let config = DocsiftConfig::default().with_scratch_dir(dir.path());
        let value = run(
            Command::Text {
                source: path.to_string_lossy().into_owned(),
            },
            &config,
            Arc::new(MemoryCache::new()),
        )
        .await
        .unwrap();

        assert_eq!(value["content"], "hello world");
        assert_eq!(value["suffix"], "txt");
        assert_eq!(value["size"], 11);
    }

    #[tokio::test]
    async fn test_image_without_credentials() {
        let err = run(
            Command::Image {
                source: "scan.png".to_string(),
            },
            &DocsiftConfig::default(),
            Arc::new(MemoryCache::new()),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("OCR credentials not found"));
    }
}
