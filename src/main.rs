//! # WebP Tree Converter - Main Entry Point
//!
//! Punto di ingresso dell'applicazione.
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (directory, output, workers, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Carica la configurazione da file e applica gli override della CLI
//! 4. Risolve i tool esterni (cwebp, gif2webp)
//! 5. Prepara le root e avvia la conversione
//!
//! Solo gli errori di setup terminano il processo con codice non zero:
//! gli errori sui singoli file finiscono nelle statistiche.
//!
//! ## Esempio di utilizzo:
//! ```bash
//! webp-converter ./pending --output ./output --workers 4 --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use webp_tree_converter::{
    json_output::JsonMessage,
    tool_resolver::{CWEBP, GIF2WEBP},
    Config, ToolPathResolver, TreeConverter, WebpToolchain,
};

#[derive(Parser)]
#[command(name = "webp-converter")]
#[command(about = "Convert an image tree to WebP, mirroring its directory structure")]
struct Args {
    /// Directory containing images to convert (default: ./pending)
    pending_dir: Option<PathBuf>,

    /// Output directory mirroring the pending tree (default: ./output)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum number of concurrent encoder runs
    #[arg(short, long)]
    workers: Option<usize>,

    /// Skip files whose converted output already exists
    #[arg(long)]
    skip_existing: bool,

    /// Emit JSON events on stdout instead of a progress bar
    #[arg(long)]
    json: bool,

    /// Config file (default: <config dir>/webp-converter/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    save_config: bool,

    /// Print encoder availability and exit (non-zero if an encoder is missing)
    #[arg(long)]
    check_tools: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout belongs to the JSON events in --json mode
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!json)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn load_config(args: &Args) -> Result<(Config, Option<PathBuf>)> {
    let config_path = args.config.clone().or_else(Config::default_path);
    let mut config = match config_path {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };

    if let Some(ref pending_dir) = args.pending_dir {
        config.pending_dir = pending_dir.clone();
    }
    if let Some(ref output) = args.output {
        config.output_dir = output.clone();
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    config.skip_existing |= args.skip_existing;
    config.json_output |= args.json;

    config.validate()?;
    Ok((config, config_path))
}

async fn run(args: Args) -> Result<()> {
    let (config, config_path) = load_config(&args).await?;

    if args.save_config {
        let path = config_path.ok_or_else(|| anyhow::anyhow!("No config directory available, pass --config"))?;
        config.save_to_file(&path).await?;
        info!("Configuration saved to {}", path.display());
        return Ok(());
    }

    let resolver = ToolPathResolver::new();
    if args.check_tools {
        println!("{}", resolver.get_tools_report());
        let missing: Vec<String> = [CWEBP, GIF2WEBP]
            .into_iter()
            .filter_map(|tool| resolver.check_tool_with_instructions(tool).err())
            .collect();
        if !missing.is_empty() {
            return Err(anyhow::anyhow!(missing.join("\n")));
        }
        return Ok(());
    }

    let encoder = WebpToolchain::new(&resolver);
    encoder.check_dependencies();

    let converter = TreeConverter::new(config, encoder).await?;
    converter.run().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let json = args.json;
    init_logging(args.verbose, json)?;

    if let Err(e) = run(args).await {
        error!("Setup failed: {:#}", e);
        if json {
            JsonMessage::error("Setup failed".to_string(), Some(format!("{:#}", e))).emit();
        }
        return Err(e);
    }

    Ok(())
}
