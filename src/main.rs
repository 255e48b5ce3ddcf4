// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use qr_analyzer::Config;
use qr_analyzer::backends::camera::CameraBackendType;
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser)]
#[command(name = "qr-analyzer")]
#[command(about = "Decode QR codes from image files, the clipboard or a camera")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// Config file (default: ~/.config/qr-analyzer/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an image file ("-" reads standard input, no path opens a file picker)
    Decode { path: Option<PathBuf> },

    /// Decode the image currently on the clipboard
    Paste,

    /// Capture one camera frame and decode it
    Camera {
        /// Device path (from 'qr-analyzer list'), or the image for the file backend
        #[arg(short, long)]
        device: Option<String>,

        /// Camera backend: v4l2 or file
        #[arg(short, long)]
        backend: Option<CameraBackendType>,

        /// Also write the captured frame to this directory
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// List available cameras
    List,

    /// Interactive session (default)
    Interactive,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Initialize logging
    // RUST_LOG wins over the configured filter
    // Examples: RUST_LOG=debug, RUST_LOG=qr_analyzer=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.log_filter))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        match cli.command {
            Some(Commands::Decode { path }) => cli::decode(config, path).await,
            Some(Commands::Paste) => cli::paste(config).await,
            Some(Commands::Camera {
                device,
                backend,
                save,
            }) => cli::camera(config, device, backend, save).await,
            Some(Commands::List) => cli::list_cameras(config),
            Some(Commands::Interactive) | None => cli::interactive(config).await,
        }
    })
}
