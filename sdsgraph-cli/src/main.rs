use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// Import from sdsgraph-core
use sdsgraph_core::ConfigManager;

// Import CLI utilities
use sdsgraph::{collect_inputs, run_batch, BatchOptions};

#[derive(Parser)]
#[command(name = "sdsgraph")]
#[command(about = "Reconstructs GHS-structured safety data sheets from layout dumps")]
struct Args {
    /// Layout dump files (*.json) or directories containing them
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Directory for <name>.sds.json, <name>.fields.json and the batch summary
    #[arg(short, long, default_value = "sdsgraph_output")]
    output_dir: String,

    /// Also evaluate the field catalogue and write <name>.fields.json
    #[arg(long)]
    fields: bool,

    /// Skip cache and force fresh processing (useful for development/testing)
    #[arg(long)]
    skip_cache: bool,

    /// Result cache directory (default: <user cache dir>/sdsgraph)
    #[arg(long)]
    cache_dir: Option<String>,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Number of documents processed in parallel (default: one per core)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Print the outline of every assembled document
    #[arg(long)]
    outline: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    println!("🦀 SDSGraph Safety Data Sheet Parser");

    let mut config = ConfigManager::new().resolve(args.config.as_deref());
    if let Some(config_path) = &args.config {
        println!("📋 Loaded config from: {}", config_path);
    } else {
        println!("📋 Using default config ({})", config.supplier);
    }

    // Apply CLI overrides to config
    if args.fields {
        config.output.include_fields = true;
    }

    let inputs = collect_inputs(&args.inputs)?;
    if inputs.is_empty() {
        println!("⚠️  No layout dumps found in: {}", args.inputs.join(", "));
        return Ok(());
    }

    let options = BatchOptions {
        output_dir: PathBuf::from(&args.output_dir),
        cache_dir: Some(resolve_cache_dir(args.cache_dir.as_deref())?),
        skip_cache: args.skip_cache,
        profile: args.profile,
        outline: args.outline,
        jobs: args.jobs,
    };

    println!("📄 Processing {} document(s)", inputs.len());
    let summary = run_batch(&inputs, &config, &options)?;

    println!("\n📊 Batch {}:", summary.run_id);
    println!("   - Succeeded: {}", summary.succeeded);
    println!("   - Failed: {}", summary.failed);
    println!("   - Output: {}", options.output_dir.display());

    if summary.failed > 0 {
        eprintln!("❌ {} document(s) failed", summary.failed);
        std::process::exit(1);
    }
    println!("✅ All documents processed");
    Ok(())
}

fn resolve_cache_dir(explicit: Option<&str>) -> Result<String> {
    if let Some(dir) = explicit {
        return Ok(dir.to_string());
    }
    let base = dirs::cache_dir().ok_or_else(|| anyhow!("Could not determine cache directory"))?;
    Ok(base.join("sdsgraph").to_string_lossy().to_string())
}
