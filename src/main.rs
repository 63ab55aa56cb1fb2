use clap::Parser;
use scene_gate::config::Settings;
use scene_gate::error::AppError;
use scene_gate::factory::build_analyzer;
use std::path::PathBuf;
use tracing::Level;
use uuid::Uuid;

/// Describe a sequence of images, skipping those whose detected objects
/// match the previous scene.
#[derive(Parser, Debug)]
#[command(name = "scene-gate", version)]
struct Cli {
    /// Settings file (defaults to an optional ./scene-gate.toml)
    #[arg(short, long, env = "SCENE_GATE_CONFIG")]
    config: Option<PathBuf>,

    /// User the images belong to; a fresh id is generated when omitted
    #[arg(short, long)]
    user: Option<String>,

    /// Forget the user's history after the last image
    #[arg(long)]
    refresh: bool,

    /// Attach the annotated image to each report as a base64 PNG
    #[arg(long)]
    with_image: bool,

    /// Images to analyze, in order
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

fn init_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    init_logging(settings.max_log_level()?);

    let analyzer = build_analyzer(&settings)?;
    let user = cli.user.unwrap_or_else(|| Uuid::new_v4().to_string());
    tracing::info!("Analyzing {} images for user {}", cli.images.len(), user);

    for path in &cli.images {
        let image = image::open(path)?;
        let described = analyzer.analyze(&user, image).await?;
        let report = if cli.with_image {
            described.report_with_image()?
        } else {
            described.report()
        };
        println!("{}", serde_json::to_string(&report)?);
    }

    if cli.refresh {
        analyzer.refresh(&user);
    }
    Ok(())
}
