use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::BlogOrchestrator;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod shell;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(about = "Terminal client for the blog user, post and comment services")]
struct Args {
    /// TOML settings file; defaults to ./blog.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    user_service_url: Option<String>,
    #[arg(long)]
    post_service_url: Option<String>,
    #[arg(long)]
    comment_service_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Default)]
enum Command {
    /// Interactive session (default).
    #[default]
    Shell,
    /// Print the post list once and exit.
    Posts,
}

impl Args {
    fn apply_to(&self, settings: &mut Settings) {
        if let Some(url) = &self.user_service_url {
            settings.user_service_url = url.clone();
        }
        if let Some(url) = &self.post_service_url {
            settings.post_service_url = url.clone();
        }
        if let Some(url) = &self.comment_service_url {
            settings.comment_service_url = url.clone();
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    args.apply_to(&mut settings);
    init_tracing(&settings.log_filter);

    let endpoints = settings
        .endpoints()
        .context("invalid service configuration")?;
    info!(
        user = %endpoints.user_service(),
        post = %endpoints.post_service(),
        comment = %endpoints.comment_service(),
        "blog client starting"
    );

    let app = BlogOrchestrator::new(endpoints);
    // A failed initial load is shown as the posts banner.
    let _ = app.start().await;

    match args.command.unwrap_or_default() {
        Command::Posts => print!("{}", render::render_posts(&app.view().await)),
        Command::Shell => shell::run(app, tokio::io::BufReader::new(tokio::io::stdin())).await?,
    }
    Ok(())
}
