use crate::generate::{GeminiClient, GeminiConfig, LogoGenerator};
use crate::model::LogoPrompt;
use crate::storage::{self, SavedLogoStore};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "logo-studio",
    version,
    about = "AI-assisted logo design wizard with optional TUI"
)]
pub struct Cli {
    /// Base URL for the generative API
    #[arg(long, default_value = "https://generativelanguage.googleapis.com")]
    pub base_url: String,

    /// API key; falls back to the GEMINI_API_KEY environment variable
    #[arg(long)]
    pub api_key: Option<String>,

    /// Text model used for prompt generation and refinement
    #[arg(long, default_value = "gemini-2.5-flash")]
    pub text_model: String,

    /// Image model used for logo rendering
    #[arg(long, default_value = "imagen-3.0-generate-002")]
    pub image_model: String,

    /// Data directory for saved logos (default: platform data dir)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Headless: generate from --answer flags and print JSON (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Headless: generate from --answer flags and print a text summary (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Print the saved logo collection as JSON and exit
    #[arg(long)]
    pub list_saved: bool,

    /// Answer to one questionnaire question, in question order (repeat 5 times)
    #[arg(long = "answer")]
    pub answers: Vec<String>,

    /// Headless: stop after prompt generation, do not render images
    #[arg(long)]
    pub skip_images: bool,

    /// Directory that downloaded PNG files are written to
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

pub async fn run(args: Cli) -> Result<()> {
    if args.json && args.text {
        return Err(anyhow::anyhow!("--json and --text are mutually exclusive"));
    }
    if args.skip_images && !(args.json || args.text) {
        return Err(anyhow::anyhow!("--skip-images requires --json or --text"));
    }

    if args.list_saved {
        return run_list_saved(&args);
    }

    if args.json || args.text {
        return run_headless(args).await;
    }

    #[cfg(feature = "tui")]
    {
        crate::tui::run(args).await
    }
    #[cfg(not(feature = "tui"))]
    {
        // Fallback when built without TUI support.
        Err(anyhow::anyhow!(
            "built without the tui feature; use --json or --text"
        ))
    }
}

/// Resolve the data directory for saved logos.
pub fn data_dir(args: &Cli) -> PathBuf {
    args.data_dir
        .clone()
        .unwrap_or_else(storage::default_data_dir)
}

/// Build the generation client config from CLI arguments and environment.
pub fn build_config(args: &Cli) -> GeminiConfig {
    let api_key = args
        .api_key
        .clone()
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .unwrap_or_default();
    GeminiConfig {
        base_url: args.base_url.clone(),
        api_key,
        text_model: args.text_model.clone(),
        image_model: args.image_model.clone(),
        user_agent: format!("logo-studio/{}", env!("CARGO_PKG_VERSION")),
    }
}

fn run_list_saved(args: &Cli) -> Result<()> {
    let store = SavedLogoStore::open(&data_dir(args));
    let out = serde_json::to_string_pretty(store.logos())?;
    println!("{}", out);
    Ok(())
}

/// One-shot generation for scripting: answers come from --answer flags,
/// results go to stdout, progress notes to stderr.
async fn run_headless(args: Cli) -> Result<()> {
    let question_count = crate::model::default_questions().len();
    if args.answers.len() != question_count {
        return Err(anyhow::anyhow!(
            "expected {} --answer flags in question order, got {}",
            question_count,
            args.answers.len()
        ));
    }

    let client = GeminiClient::new(build_config(&args)).context("build generation client")?;

    eprintln!("Generating logo concepts…");
    let prompts = client
        .generate_prompts(&args.answers)
        .await
        .context("generate logo concepts")?;

    if args.skip_images {
        print_prompts(&args, &prompts)?;
        return Ok(());
    }

    eprintln!("Rendering {} image(s)…", prompts.len());
    let batch = client.generate_images(&prompts).await;
    if batch.had_failures() {
        eprintln!(
            "Some images could not be generated ({} failed). Results may be incomplete.",
            batch.failed
        );
    }
    if batch.logos.is_empty() && batch.had_failures() {
        let detail = batch
            .last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".into());
        return Err(anyhow::anyhow!("no images could be generated: {detail}"));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&batch.logos)?);
    } else {
        for logo in &batch.logos {
            let path = storage::write_png(logo, &args.out_dir)?;
            println!("[{}] {}", logo.style, logo.prompt);
            println!("  -> {}", path.display());
        }
    }
    Ok(())
}

fn print_prompts(args: &Cli, prompts: &[LogoPrompt]) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(prompts)?);
    } else {
        for p in prompts {
            println!("[{}] {}", p.style, p.prompt);
        }
    }
    Ok(())
}
