//! maskpaint - paint binary masks over JPEG images
//!
//! Gestures come from a stroke script (see [`script`]) and go through the
//! same editor session an interactive front end would drive.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use maskpaint_config::EditorConfig;
use painting::MaskFormat;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;
mod script;

use commands::AppError;

#[derive(Parser, Debug)]
#[command(name = "maskpaint", about = "Paint binary masks over images")]
struct Cli {
    /// JSON configuration file; MASKPAINT_* variables still override it
    #[arg(long, env = "MASKPAINT_CONFIG")]
    config: Option<PathBuf>,

    /// API root of the image service
    #[arg(long)]
    api_url: Option<String>,

    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a mask locally and write it to a file
    Render {
        image: PathBuf,
        #[arg(long)]
        strokes: PathBuf,
        /// Output file; defaults to the mask name next to the image
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Upload an image, optionally painting and saving its mask
    Upload {
        image: PathBuf,
        #[arg(long)]
        strokes: Option<PathBuf>,
    },
    /// Paint and save the mask of an image already on the service
    Open {
        id: u64,
        #[arg(long)]
        strokes: PathBuf,
    },
    /// List uploaded images that have no mask yet
    Pending,
    /// Report whether a mask exists for an image file name
    Check { filename: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
}

impl From<FormatArg> for MaskFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => MaskFormat::Png,
            FormatArg::Jpeg => MaskFormat::Jpeg,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<EditorConfig, AppError> {
    let mut config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::from_env(),
    };
    if let Some(url) = &cli.api_url {
        config.service.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(format) = cli.format {
        config.mask.format = format.into();
    }
    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = load_config(&cli)?;
    match cli.command {
        Command::Render {
            image,
            strokes,
            out,
        } => commands::render(config, &image, &strokes, out.as_deref()).await,
        Command::Upload { image, strokes } => {
            commands::upload(config, &image, strokes.as_deref()).await
        }
        Command::Open { id, strokes } => commands::open(config, id, &strokes).await,
        Command::Pending => commands::pending(&config).await,
        Command::Check { filename } => commands::check(&config, &filename).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
