use anyhow::Result;
use clap::Parser;
use image_storyteller::app::App;
use image_storyteller::models::{Config, Language};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "image-storyteller")]
#[command(about = "Generate a short AI story from an image")]
struct CliArgs {
    /// Image to tell a story about (jpg, jpeg, png, or webp, up to 10 MB).
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Story language: english, amharic, or chinese.
    #[arg(long, default_value = "english", value_parser = parse_language_arg)]
    language: Language,

    /// Gemini API key; takes precedence over GEMINI_API_KEY.
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,
}

fn parse_language_arg(input: &str) -> std::result::Result<Language, String> {
    Language::parse(input)
        .ok_or_else(|| format!("Unknown language '{}'. Expected: english, amharic, chinese", input))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_storyteller=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let config = Config::from_env();
    let app = App::new(&config);

    match app
        .run(&args.image, args.language, args.api_key.as_deref())
        .await
    {
        Ok(outcome) => {
            if outcome.is_error() {
                error!("{}", outcome.render());
                std::process::exit(1);
            }
            info!("Story generated in {}", args.language);
            println!("{}", outcome.render());
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
