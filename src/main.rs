use anyhow::Result;
use clap::Parser;
use neuroscan::{config::Config, web::serve};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "neuroscan")]
#[command(about = "Brain MRI tumor classification service")]
struct Args {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0:8000")]
    bind: String,

    /// Number of worker threads
    #[arg(long)]
    workers: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Directory searched for model files
    #[arg(long, default_value = ".")]
    model_dir: String,

    /// Candidate model file, tried in order (repeatable)
    #[arg(long = "model")]
    models: Vec<String>,

    /// Static asset directory
    #[arg(long, default_value = "static")]
    static_dir: String,

    /// Enable development mode
    #[arg(long)]
    dev: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志系统
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_target(false)
        .init();

    let config = Config::new(
        args.bind,
        args.model_dir,
        args.models,
        args.static_dir,
        args.workers,
        args.dev,
    )?;

    tracing::info!("Starting brain tumor classification service...");
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Model directory: {}", config.model_dir.display());
    tracing::info!("Worker threads: {}", config.workers);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers)
        .enable_all()
        .build()?;

    runtime.block_on(serve(config))?;

    Ok(())
}
