use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use neuroscan::download::{
    download_model, manual_instructions, DownloadOutcome, ProgressCallback, DEFAULT_MODEL_URL,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "download-model")]
#[command(about = "Download the pre-trained brain tumor classifier")]
struct Args {
    /// Model download URL
    #[arg(long, default_value = DEFAULT_MODEL_URL)]
    url: String,

    /// Destination file
    #[arg(long, default_value = "best_model.onnx")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    println!("NeuroScan - Model Download");
    println!("{}", "=".repeat(40));

    let pb = Arc::new(ProgressBar::new(0));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .map_err(|e| anyhow::anyhow!("Invalid progress template: {e}"))?
            .progress_chars("#>-"),
    );

    let pb_clone = Arc::clone(&pb);
    let progress: ProgressCallback = Box::new(move |downloaded, total| {
        if let Some(t) = total {
            pb_clone.set_length(t);
        }
        pb_clone.set_position(downloaded);
    });

    let filename = args
        .output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.output.display().to_string());

    if !args.output.exists() {
        println!("Downloading model from: {}", args.url);
        println!("This may take a few minutes...");
    }

    match download_model(&args.url, &args.output, Some(&progress)).await {
        Ok(DownloadOutcome::AlreadyPresent) => {
            pb.finish_and_clear();
            println!("Model file '{}' already exists!", args.output.display());
        }
        Ok(DownloadOutcome::Downloaded { bytes }) => {
            pb.finish_and_clear();
            println!("Model downloaded successfully: {}", args.output.display());
            println!("File size: {:.1} MB", bytes as f64 / (1024.0 * 1024.0));
        }
        Err(e) => {
            pb.abandon();
            eprintln!("Download failed: {e:#}");
            eprintln!();
            eprintln!("{}", manual_instructions(&filename));
        }
    }

    Ok(())
}
