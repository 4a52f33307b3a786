use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use lexscan_analysis::{write_artifacts, ContractAnalyzer, ANALYSIS_FILE, EXTRACTED_TEXT_FILE};
use lexscan_core::{AnalysisKind, AppConfig, DocumentReference};
use lexscan_generation::BedrockGenerationClient;
use lexscan_ocr::TextractOcrService;
use lexscan_storage::S3ObjectStore;

#[derive(Parser)]
#[command(name = "lexscan")]
#[command(about = "Upload contracts, OCR them with Textract and analyze them with Bedrock")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

/// Flags that override the `LEXSCAN_*` environment.
#[derive(Args)]
struct Settings {
    /// Bucket holding uploaded documents
    #[arg(long, global = true)]
    bucket: Option<String>,

    /// AWS region for S3, Textract and Bedrock
    #[arg(long, global = true)]
    region: Option<String>,

    /// Bedrock model id used for analysis
    #[arg(long, global = true)]
    model_id: Option<String>,

    /// Give up waiting on an OCR job after this many seconds
    #[arg(long, global = true)]
    ocr_timeout_secs: Option<u64>,

    /// Seconds between OCR job status checks
    #[arg(long, global = true)]
    poll_interval_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a local document to the bucket
    Upload {
        /// Path to the document
        path: PathBuf,
    },
    /// Extract a stored document's text (OCR, or read as-is for .txt) and save it
    Extract {
        /// File name as uploaded, an object key containing '/', or a full s3:// reference
        document: String,

        #[arg(short, long, default_value = EXTRACTED_TEXT_FILE)]
        output: PathBuf,
    },
    /// Analyze previously extracted text
    Analyze {
        #[arg(short, long, default_value = EXTRACTED_TEXT_FILE)]
        input: PathBuf,

        #[arg(short, long, default_value = ANALYSIS_FILE)]
        output: PathBuf,

        #[command(flatten)]
        selection: Selection,
    },
    /// Upload, extract and analyze a local document in one go
    Run {
        /// Path to the document
        path: PathBuf,

        #[command(flatten)]
        selection: Selection,

        /// Directory for extracted text and the report
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Args)]
struct Selection {
    /// Comma-separated analyses to run (summary, key_clauses, risks); default all
    #[arg(long, value_delimiter = ',')]
    only: Vec<AnalysisKind>,
}

impl Selection {
    fn kinds(&self) -> Vec<AnalysisKind> {
        if self.only.is_empty() {
            AnalysisKind::ALL.to_vec()
        } else {
            AnalysisKind::in_report_order(&self.only)
        }
    }
}

impl Settings {
    fn load_config(&self) -> Result<AppConfig> {
        let overrides = [
            ("LEXSCAN_BUCKET", self.bucket.clone()),
            ("AWS_REGION", self.region.clone()),
            ("LEXSCAN_MODEL_ID", self.model_id.clone()),
            ("LEXSCAN_OCR_TIMEOUT_SECS", self.ocr_timeout_secs.map(|s| s.to_string())),
            ("LEXSCAN_POLL_INTERVAL_SECS", self.poll_interval_secs.map(|s| s.to_string())),
        ];
        let config = AppConfig::from_lookup(|name| {
            overrides
                .iter()
                .find(|(key, _)| *key == name)
                .and_then(|(_, value)| value.clone())
                .or_else(|| std::env::var(name).ok())
        })?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lexscan=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.settings.load_config()?;
    let analyzer = build_analyzer(&config).await;

    match cli.command {
        Commands::Upload { path } => {
            let reference = upload(&analyzer, &path).await?;
            println!("Uploaded {} as {reference}", path.display());
        }
        Commands::Extract { document, output } => {
            let reference = analyzer.resolve(&document)?;
            let text = analyzer.extract(&reference).await?;
            tokio::fs::write(&output, &text)
                .await
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Text extracted from {reference} and saved to {}", output.display());
        }
        Commands::Analyze {
            input,
            output,
            selection,
        } => {
            let text = tokio::fs::read_to_string(&input)
                .await
                .with_context(|| format!("failed to read contract text from {}", input.display()))?;
            let sections = analyzer.analyze_text(&text, &selection.kinds()).await?;
            tokio::fs::write(&output, sections.render())
                .await
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Document analysis complete. Results saved to {}", output.display());
        }
        Commands::Run {
            path,
            out_dir,
            selection,
        } => {
            let reference = upload(&analyzer, &path).await?;
            let report = analyzer
                .analyze_document(&reference, &selection.kinds())
                .await?;
            tokio::fs::create_dir_all(&out_dir).await?;
            write_artifacts(&out_dir, &report).await?;
            println!(
                "Analysis of {reference} saved to {}",
                out_dir.join(ANALYSIS_FILE).display()
            );
        }
    }

    Ok(())
}

async fn build_analyzer(config: &AppConfig) -> ContractAnalyzer {
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;

    info!(
        region = %config.aws_region,
        bucket = %config.bucket,
        model = %config.model_id,
        "AWS clients configured"
    );

    ContractAnalyzer::new(
        Arc::new(S3ObjectStore::new(&sdk_config)),
        Arc::new(TextractOcrService::new(&sdk_config)),
        Arc::new(BedrockGenerationClient::new(&sdk_config, config.model_id.clone())),
        config.poller,
        config.bucket.clone(),
        config.upload_prefix.clone(),
    )
}

async fn upload(analyzer: &ContractAnalyzer, path: &Path) -> Result<DocumentReference> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} is not a file path", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(analyzer.upload(file_name, bytes).await?)
}
