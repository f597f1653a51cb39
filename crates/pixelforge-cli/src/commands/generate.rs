//! Single-shot generation

use anyhow::Result;
use clap::Args;
use pixelforge_gen::config::resolve_credential;
use pixelforge_gen::providers::{create_provider, requires_credential};
use pixelforge_gen::single::{generate_single, SINGLE_DEFAULT_ASPECT, SINGLE_DEFAULT_MODEL};
use pixelforge_gen::task::DEFAULT_SIZE;
use pixelforge_gen::{ForgeConfig, ImageRequest};
use std::path::PathBuf;

#[derive(Args)]
pub struct GenerateArgs {
    /// Prompt text
    #[arg(long)]
    pub prompt: String,

    /// Output image path (default: images/pixelforge-<timestamp>.<ext>)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Model name
    #[arg(long, default_value = SINGLE_DEFAULT_MODEL)]
    pub model: String,

    /// Aspect ratio
    #[arg(long, default_value = SINGLE_DEFAULT_ASPECT)]
    pub aspect: String,

    /// Image size (1K, 2K, 4K)
    #[arg(long, default_value = DEFAULT_SIZE)]
    pub size: String,

    /// Provider to use (gemini, mock)
    #[arg(long)]
    pub provider: Option<String>,

    /// Project root for the default output directory and .env lookup
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    if args.prompt.trim().is_empty() {
        anyhow::bail!("Config error: --prompt must not be empty");
    }

    let config = ForgeConfig::load(&args.root)?;
    let provider_name = args.provider.as_deref().unwrap_or(config.provider_name());
    let credential = if requires_credential(provider_name) {
        resolve_credential(&args.root)
    } else {
        None
    };
    let provider = create_provider(provider_name, &config, credential)?;

    let size = args.size.to_uppercase();
    let request = ImageRequest {
        prompt: &args.prompt,
        model: &args.model,
        aspect: &args.aspect,
        size: &size,
    };

    println!(
        "Generating via {} (model: {}, aspect: {}, size: {})...",
        provider.name(),
        request.model,
        request.aspect,
        request.size
    );

    let result = generate_single(provider.as_ref(), &request, &args.root, args.out.as_deref())?;

    println!("Saved: {}", result.saved.path.display());
    println!("MIME: {}", result.saved.mime_type);
    println!("Hash: {}", result.saved.hash.to_prefixed_hex());
    if let Some(text) = &result.text {
        println!("Model text:");
        println!("{}", text);
    }
    Ok(())
}
