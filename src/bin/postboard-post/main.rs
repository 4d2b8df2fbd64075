use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use spdlog::warn;

use postboard::category;
use postboard::config::open_config;
use postboard::logger::configure_logger;
use postboard::post::{Draft, ImageUpload};
use postboard::store::StoreBackend;

/// Publishes a post through the configured store
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long)]
    title: String,

    #[arg(short, long)]
    description: String,

    /// Post date as YYYY-MM-DD. Today if empty
    #[arg(long)]
    date: Option<String>,

    #[arg(long)]
    category: String,

    /// Image file attached to the post
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,
}

fn read_image(path: &PathBuf) -> Result<ImageUpload> {
    let bytes = fs::read(path).with_context(|| format!("Error reading image {}", path.display()))?;
    let file_name = path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(ImageUpload {
        content_type: ImageUpload::content_type_from_name(&file_name).to_string(),
        file_name,
        bytes,
    })
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = open_config(args.config_path.map(PathBuf::from))?;

    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    let image = match args.image {
        Some(ref path) => Some(read_image(path)?),
        None => None,
    };
    let draft = Draft {
        title: args.title,
        description: args.description,
        date: args.date.unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string()),
        category: args.category.trim().to_string(),
        image,
    };

    let backend = StoreBackend::from_config(&config)?;
    let mut store = backend.open();
    store.load().await.context("Error loading posts")?;

    let known = category::merge(&config.defaults.categories, store.categories().iter().map(|c| c.as_str()));
    if !known.contains(&draft.category) {
        println!("New category: {}", draft.category);
    }

    let post = store.create(draft).await.context("Error publishing post")?;
    println!("{}", post.id);
    Ok(())
}
