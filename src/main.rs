//! TruthLens - Misinformation detection workbench
//!
//! Sends text, images, camera captures and article URLs to a
//! classification backend and presents the normalized verdicts.

mod app;
mod capture;
mod config;
mod gateway;
mod normalize;
mod report;
mod shared;
mod shell;
mod storage;
mod voice;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::app::Workbench;
use crate::capture::ImageFileCamera;
use crate::config::AppConfig;
use crate::gateway::UploadFile;
use crate::normalize::DetectionResult;
use crate::shared::Notice;
use crate::voice::UnavailableRecognizer;

/// TruthLens - Misinformation detection workbench
#[derive(Parser, Debug)]
#[command(name = "truthlens")]
#[command(about = "Check text, images, documents and articles for misinformation")]
struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the backend base address
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a piece of text
    Text {
        /// Text to classify
        text: Option<String>,

        /// Append one dictated utterance before submitting
        #[arg(long)]
        dictate: bool,
    },
    /// Reverse-image search a picture
    Image {
        /// Image file to upload
        path: PathBuf,
    },
    /// Capture a still from a frame source and run OCR on it
    Ocr {
        /// Still image used as the camera frame source
        #[arg(long)]
        frame: PathBuf,

        /// Retake and predict again when a prediction fails
        #[arg(long, default_value = "1")]
        attempts: u32,
    },
    /// Analyze a news article URL
    Url {
        /// Article address
        url: String,
    },
    /// Show the top headlines
    News,
    /// Write the effective configuration to the config file
    InitConfig,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = load_or_create_config(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        config.backend.base_url = base_url;
    }

    if let Command::InitConfig = args.command {
        let path = match args.config {
            Some(path) => path,
            None => storage::default_config_path()?,
        };
        config::save_config(&config, &path)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        println!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    // Single cooperative event loop
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run(args.command, config))
}

/// Load configuration from an explicit path, the default location, or defaults
fn load_or_create_config(path: Option<&std::path::Path>) -> Result<AppConfig> {
    if let Some(path) = path {
        let config = config::load_config(path)?;
        info!("Loaded configuration from {:?}", path);
        return Ok(config);
    }

    if let Ok(config_path) = storage::default_config_path() {
        if config_path.exists() {
            match config::load_config(&config_path) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", config_path);
                    return Ok(config);
                }
                Err(e) => tracing::warn!("Ignoring unreadable configuration: {:#}", e),
            }
        }
    }
    info!("Using default configuration");
    Ok(AppConfig::default())
}

async fn run(command: Command, config: AppConfig) -> Result<()> {
    let camera_path = match &command {
        Command::Ocr { frame, .. } => frame.clone(),
        _ => PathBuf::new(),
    };
    let mut app = Workbench::new(
        &config,
        Box::new(ImageFileCamera::new(camera_path)),
        Box::new(UnavailableRecognizer),
    )?;

    match command {
        Command::Text { text, dictate } => {
            app.text.set_text(text.unwrap_or_default());
            if dictate {
                app.text.dictate().await;
                for fragment in app.text.dictated().fragments() {
                    info!("Dictated: {}", fragment);
                }
                print_notice(app.text.notice());
            }
            if !until_interrupted(app.submit_text()).await {
                return interrupted(&mut app);
            }
            match app.text.result() {
                Some(result) => println!("{}", report::render(&DetectionResult::Text(result.clone()))),
                None => print_notice(app.text.notice()),
            }
        }
        Command::Image { path } => {
            let file = UploadFile::from_path(&path)?;
            app.image.select_file(Some(file));
            if !until_interrupted(app.submit_image()).await {
                return interrupted(&mut app);
            }
            match app.image.result() {
                Some(result) => println!("{}", report::render(&DetectionResult::Image(result.clone()))),
                None => print_notice(app.image.notice()),
            }
        }
        Command::Ocr { attempts, .. } => {
            app.ocr.start_camera().await;
            if app.ocr.notice().is_some() {
                print_notice(app.ocr.notice());
                return Ok(());
            }
            if !app.ocr.capture().await {
                println!("Could not capture a still from the frame source");
                app.ocr.stop_camera();
                return Ok(());
            }

            for attempt in 1..=attempts.max(1) {
                if let Some(artifact) = app.ocr.camera().artifact() {
                    let (width, height) = artifact.dimensions;
                    info!("Scanning {} ({}x{}), attempt {}", artifact.url.href(), width, height, attempt);
                }
                if !until_interrupted(app.predict_ocr()).await {
                    return interrupted(&mut app);
                }
                if app.ocr.result().is_some() || attempt >= attempts {
                    break;
                }
                print_notice(app.ocr.notice());
                app.ocr.retake().await;
                if !app.ocr.capture().await {
                    break;
                }
            }

            match app.ocr.result() {
                Some(result) => println!("{}", report::render(&DetectionResult::Ocr(result.clone()))),
                None => print_notice(app.ocr.notice()),
            }
            app.ocr.stop_camera();
        }
        Command::Url { url } => {
            app.url.set_url(url);
            if !until_interrupted(app.analyze_url()).await {
                return interrupted(&mut app);
            }
            match app.url.result() {
                Some(result) => {
                    let warning = app.url.warning();
                    println!("{}", report::render_url(result, app.url.prediction_label(), warning));
                    if warning {
                        info!("Article flagged as potentially unreliable");
                    }
                }
                None => print_notice(app.url.notice()),
            }
        }
        Command::News => {
            if !until_interrupted(app.refresh_news()).await {
                return interrupted(&mut app);
            }
            if let Some(notice) = app.news.notice() {
                println!("{}", report::render_notice(notice));
            } else {
                println!("{}", report::render_news(app.news.articles()));
            }
        }
        Command::InitConfig => {}
    }

    Ok(())
}

/// Drive `work` to completion unless Ctrl-C arrives first
async fn until_interrupted(work: impl std::future::Future<Output = ()>) -> bool {
    tokio::select! {
        _ = work => true,
        _ = tokio::signal::ctrl_c() => false,
    }
}

fn interrupted(app: &mut Workbench) -> Result<()> {
    app.cancel_all();
    println!("Interrupted");
    Ok(())
}

fn print_notice(notice: Option<&Notice>) {
    if let Some(notice) = notice {
        println!("{}", report::render_notice(notice));
    }
}
